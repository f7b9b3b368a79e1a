//! Research operations
//!
//! Each operation owns one agent session from open to close: research,
//! follow-up, parallel investigation and cross-topic synthesis. Transport
//! failures propagate to the caller without retry; a missing workspace or an
//! empty topic list is reported to the operator and ends the operation before
//! any session is opened.

use anyhow::{Context, Result};
use research_agent_sdk::{AgentRole, AgentRuntime, SessionConfig};
use std::io::Write;
use std::sync::Arc;

use crate::config::Settings;
use crate::console::Console;
use crate::domain::{parse_domain_response, Domain};
use crate::driver::{print_header, print_summary, DriverOptions, SessionDriver};
use crate::input::LineSource;
use crate::prompts::{self, Prompts};
use crate::tools::{COORDINATION_TOOLS, RESEARCH_TOOLS};
use crate::workspace::Workspace;

pub const RESEARCH_MAX_TURNS: u32 = 50;
pub const FOLLOW_UP_MAX_TURNS: u32 = 30;
pub const PARALLEL_MAX_TURNS: u32 = 100;
pub const SYNTHESIS_MAX_TURNS: u32 = 50;

/// Sub-agent role the lead agent dispatches angles to
pub const SUBAGENT_ROLE: &str = "researcher";

const FOLLOW_UP_PROMPT: &str = "Follow-up: ";

pub struct Researcher {
    runtime: Arc<dyn AgentRuntime>,
    settings: Settings,
    workspace: Workspace,
    prompts: Prompts,
}

impl Researcher {
    pub fn new(runtime: Arc<dyn AgentRuntime>, settings: Settings) -> Self {
        Self {
            workspace: settings.workspace(),
            prompts: settings.prompts(),
            runtime,
            settings,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Ask the agent which domain a topic belongs to
    ///
    /// Single turn, no tools. Any reply outside the known labels, and any
    /// transport failure, yields [`Domain::General`].
    pub async fn detect_domain(&self, topic: &str) -> Domain {
        let instruction = prompts::classification_instruction(topic);
        match self.runtime.query_once("", &instruction).await {
            Ok(reply) => {
                let domain = parse_domain_response(&reply);
                tracing::debug!(%domain, reply = %reply.trim(), "domain classified");
                domain
            }
            Err(e) => {
                tracing::warn!(error = %e, "domain detection failed, using default");
                Domain::default()
            }
        }
    }

    /// Domain for a new investigation: forced, detected, or the default
    pub async fn resolve_domain(&self, forced: Option<Domain>, topic: &str) -> Domain {
        if let Some(domain) = forced.or(self.settings.domain) {
            return domain;
        }
        if self.settings.detect_domain {
            return self.detect_domain(topic).await;
        }
        self.settings.default_domain
    }

    async fn open<'c, W: Write>(
        &self,
        config: SessionConfig,
        console: &'c mut Console<W>,
        options: DriverOptions,
    ) -> Result<SessionDriver<'c, W>> {
        tracing::info!(
            max_turns = config.max_turns,
            tools = config.allowed_tools.len(),
            agents = config.agents.len(),
            "opening agent session"
        );
        let session = self
            .runtime
            .open(config)
            .await
            .context("Failed to open agent session")?;
        Ok(SessionDriver::new(session, console, options))
    }

    /// Research a topic and save notes to its workspace
    pub async fn research<W: Write>(
        &self,
        console: &mut Console<W>,
        topic: &str,
        domain: Option<Domain>,
    ) -> Result<()> {
        let topic_dir = self
            .workspace
            .topic_dir(topic)
            .with_context(|| format!("Failed to create workspace for: {}", topic))?;
        let domain = self.resolve_domain(domain, topic).await;
        self.workspace.record_domain(&topic_dir, domain)?;

        print_header(
            console,
            &format!("Research Topic: {}", topic),
            &[
                ("Domain", domain.to_string()),
                ("Output Directory", topic_dir.display().to_string()),
            ],
        )?;

        let config = SessionConfig::new(self.prompts.system_prompt(domain), RESEARCH_MAX_TURNS)
            .allow(RESEARCH_TOOLS);
        let mut driver = self
            .open(config, console, DriverOptions::batch(self.settings.idle_timeout))
            .await?;

        let outcome = async {
            let report = driver
                .run_turn(&prompts::research_instruction(topic, &topic_dir))
                .await?;
            print_summary(driver.console(), "Research complete!", &topic_dir, &report)?;
            anyhow::Ok(())
        }
        .await;

        finish(driver, outcome).await
    }

    /// Answer follow-up questions against an existing workspace
    pub async fn follow_up<W: Write>(
        &self,
        console: &mut Console<W>,
        input: &mut dyn LineSource,
        topic: &str,
    ) -> Result<()> {
        let Some(topic_dir) = self.workspace.find_topic_dir(topic) else {
            console.line(&format!("No existing research found for topic: {}", topic))?;
            console.line("Run initial research first.")?;
            return Ok(());
        };

        let domain = self
            .workspace
            .recorded_domain(&topic_dir)
            .unwrap_or(self.settings.default_domain);

        print_header(
            console,
            &format!("Follow-up Session: {}", topic),
            &[("Research Directory", topic_dir.display().to_string())],
        )?;

        let config = SessionConfig::new(self.prompts.system_prompt(domain), FOLLOW_UP_MAX_TURNS)
            .allow(RESEARCH_TOOLS);
        let mut driver = self
            .open(
                config,
                console,
                DriverOptions::interactive(self.settings.idle_timeout),
            )
            .await?;

        let outcome = async {
            let report = driver
                .run_turn(&prompts::follow_up_instruction(&topic_dir))
                .await?;
            driver.report_turn(&report)?;
            if !report.finished {
                return anyhow::Ok(());
            }
            driver.converse(input, FOLLOW_UP_PROMPT).await?;
            anyhow::Ok(())
        }
        .await;

        finish(driver, outcome).await
    }

    /// Decompose a topic into angles researched by parallel sub-agents
    pub async fn parallel<W: Write>(
        &self,
        console: &mut Console<W>,
        input: &mut dyn LineSource,
        topic: &str,
        domain: Option<Domain>,
    ) -> Result<()> {
        let topic_dir = self
            .workspace
            .topic_dir(topic)
            .with_context(|| format!("Failed to create workspace for: {}", topic))?;
        let domain = self.resolve_domain(domain, topic).await;
        self.workspace.record_domain(&topic_dir, domain)?;

        print_header(
            console,
            &format!("Parallel Research: {}", topic),
            &[
                ("Domain", domain.to_string()),
                ("Output Directory", topic_dir.display().to_string()),
            ],
        )?;

        let role = AgentRole {
            name: SUBAGENT_ROLE.to_string(),
            description: "Investigates one angle of a research topic and writes notes for it"
                .to_string(),
            prompt: self.prompts.system_prompt(domain),
            tools: RESEARCH_TOOLS.iter().map(|t| t.to_string()).collect(),
            model: self.settings.subagent_model.clone(),
        };
        let config = SessionConfig::new(
            self.prompts.orchestrator_prompt(topic, &topic_dir),
            PARALLEL_MAX_TURNS,
        )
        .allow(RESEARCH_TOOLS)
        .allow(COORDINATION_TOOLS)
        .agent(role);

        let mut driver = self
            .open(
                config,
                console,
                DriverOptions::interactive(self.settings.idle_timeout),
            )
            .await?;

        let outcome = async {
            let report = driver
                .run_turn(&prompts::parallel_instruction(topic, &topic_dir))
                .await?;
            print_summary(
                driver.console(),
                "Parallel research complete!",
                &topic_dir,
                &report,
            )?;
            if report.finished {
                driver.converse(input, FOLLOW_UP_PROMPT).await?;
            }
            anyhow::Ok(())
        }
        .await;

        finish(driver, outcome).await
    }

    /// Find connections, patterns and tensions across every researched topic
    pub async fn synthesize<W: Write>(&self, console: &mut Console<W>) -> Result<()> {
        let topics = self
            .workspace
            .list_topics()
            .context("Failed to list research topics")?;
        if topics.is_empty() {
            console.line("No research topics found.")?;
            console.line("Run research on at least one topic first.")?;
            return Ok(());
        }

        let topics_dir = self.workspace.topics_dir();
        let synthesis_dir = self
            .workspace
            .synthesis_dir()
            .context("Failed to create synthesis directory")?;

        print_header(
            console,
            "Cross-Topic Synthesis",
            &[
                ("Topics", topics.len().to_string()),
                ("Output Directory", synthesis_dir.display().to_string()),
            ],
        )?;

        let config = SessionConfig::new(
            self.prompts.synthesis_prompt(&topics_dir, &synthesis_dir),
            SYNTHESIS_MAX_TURNS,
        )
        .allow(RESEARCH_TOOLS);
        let mut driver = self
            .open(config, console, DriverOptions::batch(self.settings.idle_timeout))
            .await?;

        let outcome = async {
            let report = driver
                .run_turn(&prompts::synthesis_instruction(
                    &topics,
                    &topics_dir,
                    &synthesis_dir,
                ))
                .await?;
            print_summary(driver.console(), "Synthesis complete!", &synthesis_dir, &report)?;
            anyhow::Ok(())
        }
        .await;

        finish(driver, outcome).await
    }
}

/// Release the session whatever the operation's outcome
///
/// The operation's own error wins over a failure to close.
async fn finish<W: Write>(driver: SessionDriver<'_, W>, outcome: Result<()>) -> Result<()> {
    let closed = driver.close().await;
    match (outcome, closed) {
        (Err(e), Err(close_err)) => {
            tracing::warn!(error = %close_err, "failed to close session after error");
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(()), closed) => closed.context("Failed to close agent session"),
    }
}
