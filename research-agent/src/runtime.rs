//! Claude Code runtime adapter
//!
//! Implements the session contract on top of `claude_agent_sdk`. Each SDK
//! message is flattened into [`SessionEvent`]s: one event per text or tool-use
//! content block, and a terminal event for the result message. Other messages
//! (system notices, tool results, thinking blocks) are not surfaced.

use claude_agent_sdk::{
    query, AgentDefinition, ClaudeAgentOptions, ClaudeSDKClient, ContentBlock, Message,
    PermissionMode,
};
use futures::StreamExt;
use research_agent_sdk::{
    async_trait, AgentRuntime, AgentSession, PermissionPolicy, SessionConfig, SessionError,
    SessionEvent, SessionResult,
};
use std::collections::VecDeque;
use std::path::PathBuf;

/// Built-in tools denied to single-shot queries
const BUILTIN_TOOLS: [&str; 13] = [
    "Task",
    "Bash",
    "Glob",
    "Grep",
    "LS",
    "Read",
    "Edit",
    "MultiEdit",
    "Write",
    "NotebookEdit",
    "WebFetch",
    "WebSearch",
    "TodoWrite",
];

fn transport(e: impl std::fmt::Display) -> SessionError {
    SessionError::Transport(e.to_string())
}

fn permission_mode(policy: PermissionPolicy) -> PermissionMode {
    match policy {
        PermissionPolicy::Prompt => PermissionMode::Default,
        PermissionPolicy::AcceptEdits => PermissionMode::AcceptEdits,
    }
}

fn build_options(config: &SessionConfig) -> ClaudeAgentOptions {
    let mut options_builder = ClaudeAgentOptions::builder()
        .allowed_tools(config.allowed_tools.clone())
        .max_turns(config.max_turns)
        .permission_mode(permission_mode(config.permission));

    if !config.system_prompt.is_empty() {
        options_builder = options_builder.system_prompt(config.system_prompt.clone());
    }

    for role in &config.agents {
        options_builder = options_builder.add_agent(
            role.name.clone(),
            AgentDefinition {
                description: role.description.clone(),
                prompt: role.prompt.clone(),
                tools: Some(role.tools.clone()),
                model: role.model.clone(),
            },
        );
    }

    options_builder.build()
}

/// Flatten one SDK message into session events
fn events_from_message(message: Message) -> Vec<SessionEvent> {
    match message {
        Message::Assistant { message, .. } => message
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(SessionEvent::AssistantText { text }),
                ContentBlock::ToolUse { name, input, .. } => {
                    Some(SessionEvent::ToolInvocation { name, input })
                }
                _ => None,
            })
            .collect(),
        Message::Result {
            total_cost_usd,
            is_error,
            result,
            subtype,
            ..
        } => {
            let error = is_error.then(|| result.unwrap_or(subtype));
            vec![SessionEvent::TerminalResult {
                cost_usd: total_cost_usd,
                error,
            }]
        }
        _ => Vec::new(),
    }
}

/// Agent runtime backed by the Claude Code CLI
#[derive(Debug, Clone, Default)]
pub struct ClaudeRuntime {
    cli_path: Option<PathBuf>,
}

impl ClaudeRuntime {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }
}

#[async_trait]
impl AgentRuntime for ClaudeRuntime {
    async fn open(&self, config: SessionConfig) -> SessionResult<Box<dyn AgentSession>> {
        let options = build_options(&config);
        let client = ClaudeSDKClient::new(options, self.cli_path.clone())
            .await
            .map_err(transport)?;

        Ok(Box::new(ClaudeSession {
            client: Some(client),
            pending: VecDeque::new(),
        }))
    }

    async fn query_once(&self, system_prompt: &str, prompt: &str) -> SessionResult<String> {
        let mut options_builder = ClaudeAgentOptions::builder()
            .max_turns(1)
            .allowed_tools(Vec::new())
            .disallowed_tools(BUILTIN_TOOLS.iter().map(|t| t.to_string()).collect());
        if !system_prompt.is_empty() {
            options_builder = options_builder.system_prompt(system_prompt.to_string());
        }

        let stream = query(prompt, Some(options_builder.build()))
            .await
            .map_err(transport)?;
        let mut stream = Box::pin(stream);

        let mut reply = String::new();
        while let Some(message) = stream.next().await {
            match message.map_err(transport)? {
                Message::Assistant { message, .. } => {
                    for block in &message.content {
                        if let ContentBlock::Text { text } = block {
                            reply.push_str(text);
                        }
                    }
                }
                Message::Result { .. } => break,
                _ => {}
            }
        }

        Ok(reply)
    }
}

/// One live Claude Code conversation
///
/// A single SDK message can hold several content blocks, so converted events
/// are queued and handed out one at a time.
struct ClaudeSession {
    client: Option<ClaudeSDKClient>,
    pending: VecDeque<SessionEvent>,
}

#[async_trait]
impl AgentSession for ClaudeSession {
    async fn send(&mut self, prompt: &str) -> SessionResult<()> {
        let client = self.client.as_mut().ok_or(SessionError::Closed)?;
        client.send_message(prompt).await.map_err(transport)
    }

    async fn next_event(&mut self) -> SessionResult<Option<SessionEvent>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(Some(event));
            }

            let client = self.client.as_mut().ok_or(SessionError::Closed)?;
            match client.next_message().await {
                Some(message) => {
                    let message = message.map_err(transport)?;
                    self.pending.extend(events_from_message(message));
                }
                None => return Ok(None),
            }
        }
    }

    async fn close(&mut self) -> SessionResult<()> {
        if let Some(mut client) = self.client.take() {
            tracing::info!("closing agent session");
            client.close().await.map_err(transport)?;
        }
        Ok(())
    }
}
