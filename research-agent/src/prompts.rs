//! Prompt assembly from template files
//!
//! Templates are plain markdown files read from the prompts directory on every
//! call, so edits take effect without a rebuild. A missing template is never an
//! error: the assembler falls back to the general domain, and if that is also
//! missing the agent simply runs without system prompt augmentation.

use std::path::{Path, PathBuf};

use crate::domain::Domain;

/// Separator placed between the core block and the domain block
pub const SEPARATOR: &str = "\n\n---\n\n";

const CORE_TEMPLATE: &str = "core.md";
const DOMAINS_DIR: &str = "domains";
const ORCHESTRATOR_TEMPLATE: &str = "orchestrator.md";
const SYNTHESIZER_TEMPLATE: &str = "synthesizer.md";

/// Substitute `{key}` placeholders in `template`
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{}}}", key), value)
    })
}

#[derive(Debug, Clone)]
pub struct Prompts {
    dir: PathBuf,
}

impl Prompts {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Read a template by relative name, `None` if it cannot be read
    pub fn template(&self, name: &str) -> Option<String> {
        let path = self.dir.join(name);
        match std::fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "template unavailable");
                None
            }
        }
    }

    fn domain_template(&self, domain: Domain) -> Option<String> {
        let name = format!("{}/{}.md", DOMAINS_DIR, domain.as_str());
        self.template(&name).or_else(|| {
            if domain == Domain::General {
                return None;
            }
            tracing::warn!(%domain, "no template for domain, using general");
            self.template(&format!("{}/{}.md", DOMAINS_DIR, Domain::General.as_str()))
        })
    }

    /// Core instructions joined with the instructions for `domain`
    pub fn system_prompt(&self, domain: Domain) -> String {
        let Some(domain_part) = self.domain_template(domain) else {
            tracing::warn!(dir = %self.dir.display(), %domain, "no domain template found");
            return String::new();
        };

        [self.template(CORE_TEMPLATE), Some(domain_part)]
            .into_iter()
            .flatten()
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(SEPARATOR)
    }

    /// System prompt for the lead agent of a parallel investigation
    pub fn orchestrator_prompt(&self, topic: &str, topic_dir: &Path) -> String {
        self.template(ORCHESTRATOR_TEMPLATE)
            .map(|t| {
                render(
                    &t,
                    &[
                        ("topic", topic),
                        ("topic_dir", &topic_dir.display().to_string()),
                    ],
                )
            })
            .unwrap_or_default()
    }

    /// System prompt for cross-topic synthesis
    pub fn synthesis_prompt(&self, topics_dir: &Path, synthesis_dir: &Path) -> String {
        self.template(SYNTHESIZER_TEMPLATE)
            .map(|t| {
                render(
                    &t,
                    &[
                        ("topics_dir", &topics_dir.display().to_string()),
                        ("synthesis_dir", &synthesis_dir.display().to_string()),
                    ],
                )
            })
            .unwrap_or_default()
    }
}

// ============================================================================
// Per-operation instructions
// ============================================================================

pub fn research_instruction(topic: &str, topic_dir: &Path) -> String {
    format!(
        r#"Research topic: {topic}

Save your findings to: {dir}
- overview.md: Main summary and recommendations
- sources.md: List of sources with key excerpts
- notes/: Detailed notes on subtopics

Start by stating the clarifying questions that matter most for this topic, answer them with your best assumptions, then research."#,
        topic = topic,
        dir = topic_dir.display()
    )
}

pub fn follow_up_instruction(topic_dir: &Path) -> String {
    format!(
        r#"You have existing research notes in: {dir}

Read the existing notes to understand what has been researched.
Then wait for the user's follow-up question."#,
        dir = topic_dir.display()
    )
}

pub fn parallel_instruction(topic: &str, topic_dir: &Path) -> String {
    format!(
        r#"Research topic: {topic}

Decompose this topic into 3-5 independent angles that can be investigated separately.
Dispatch one researcher sub-agent per angle using the Task tool, all at once so they run in parallel.
Each sub-agent writes its notes to: {dir}/notes/<angle-slug>.md

When every sub-agent has finished, read their notes and write:
- {dir}/overview.md: Synthesis across angles with recommendations
- {dir}/sources.md: Combined list of sources with key excerpts"#,
        topic = topic,
        dir = topic_dir.display()
    )
}

pub fn synthesis_instruction(topics: &[String], topics_dir: &Path, synthesis_dir: &Path) -> String {
    let listing = topics
        .iter()
        .map(|t| format!("- {}/{}", topics_dir.display(), t))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Synthesize across these researched topics:
{listing}

Read each topic's overview.md, sources.md and notes/, then write to {out}:
- connections.md: Links and shared ideas between topics
- patterns.md: Recurring themes and approaches
- tensions.md: Contradictions and open disagreements
- questions.md: Open questions worth researching next"#,
        listing = listing,
        out = synthesis_dir.display()
    )
}

/// Single-shot domain classification request
pub fn classification_instruction(topic: &str) -> String {
    format!(
        "Classify the following research topic into exactly one of these domains: {labels}.\n\
         Respond with only the domain label and nothing else.\n\nTopic: {topic}",
        labels = Domain::labels(),
        topic = topic
    )
}
