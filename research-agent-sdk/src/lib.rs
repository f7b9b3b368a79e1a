//! Session contract shared by research agent front-ends.
//!
//! The agent runtime itself lives outside this crate. Everything here describes
//! how a client talks to it: the configuration of a session, the closed set of
//! events a session emits, and the traits a runtime adapter implements.

// Re-export async trait for convenience
pub use async_trait::async_trait;

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Events emitted by an agent session, in arrival order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A fragment of assistant narrative
    AssistantText { text: String },
    /// The agent invoked one of its tools
    ToolInvocation {
        name: String,
        input: serde_json::Value,
    },
    /// The turn is over
    TerminalResult {
        cost_usd: Option<f64>,
        error: Option<String>,
    },
}

impl SessionEvent {
    pub fn text(text: impl Into<String>) -> Self {
        SessionEvent::AssistantText { text: text.into() }
    }

    pub fn tool(name: impl Into<String>, input: serde_json::Value) -> Self {
        SessionEvent::ToolInvocation {
            name: name.into(),
            input,
        }
    }

    pub fn done(cost_usd: Option<f64>) -> Self {
        SessionEvent::TerminalResult {
            cost_usd,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        SessionEvent::TerminalResult {
            cost_usd: None,
            error: Some(error.into()),
        }
    }
}

/// How the runtime treats file edits requested by the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionPolicy {
    /// Ask before every edit
    #[default]
    Prompt,
    /// Apply edits without asking
    AcceptEdits,
}

/// A named delegate the primary agent may hand work to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRole {
    pub name: String,
    pub description: String,
    pub prompt: String,
    pub tools: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Everything a runtime needs to open one session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Appended system prompt; empty means no augmentation
    pub system_prompt: String,
    /// Tool names the agent may use
    pub allowed_tools: Vec<String>,
    pub max_turns: u32,
    pub permission: PermissionPolicy,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agents: Vec<AgentRole>,
}

impl SessionConfig {
    pub fn new(system_prompt: impl Into<String>, max_turns: u32) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            max_turns,
            permission: PermissionPolicy::AcceptEdits,
            ..Default::default()
        }
    }

    pub fn allow<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_tools.extend(tools.into_iter().map(Into::into));
        self
    }

    pub fn agent(mut self, role: AgentRole) -> Self {
        self.agents.push(role);
        self
    }
}

/// Errors raised while talking to an agent runtime
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("no event received for {}s", .0.as_secs())]
    IdleTimeout(Duration),

    #[error("session already closed")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// One open conversation with the agent
///
/// Implementations must make [`AgentSession::next_event`] cancel-safe: the
/// driver races it against a heartbeat timer and drops the future when the
/// timer wins, so an event must never be lost by dropping a pending call.
#[async_trait]
pub trait AgentSession: Send {
    /// Send one outbound instruction, starting a turn
    async fn send(&mut self, prompt: &str) -> SessionResult<()>;

    /// Next event of the current turn, `None` once the stream has ended
    async fn next_event(&mut self) -> SessionResult<Option<SessionEvent>>;

    /// Release the session
    async fn close(&mut self) -> SessionResult<()>;
}

/// Factory for agent sessions
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Open a session configured with `config`
    async fn open(&self, config: SessionConfig) -> SessionResult<Box<dyn AgentSession>>;

    /// Single-turn query with no tool access, returning the reply text
    async fn query_once(&self, system_prompt: &str, prompt: &str) -> SessionResult<String>;
}

// ============================================================================
// Console Logging Macros
// ============================================================================
// Colored operator-facing output for the CLI. Diagnostics go through
// `tracing`; these are for messages the operator is meant to read.
// ============================================================================

/// Logs an informational message.
///
/// # Example
/// ```
/// use research_agent_sdk::log_info;
/// log_info!("Loading prompts");
/// let topics = 3;
/// log_info!("Found {} topics", topics);
/// ```
///
/// Outputs:
/// ```text
/// ℹ Loading prompts
/// ℹ Found 3 topics
/// ```
#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        println!("\x1b[36mℹ {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[36mℹ {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs a warning message.
///
/// # Example
/// ```
/// use research_agent_sdk::log_warning;
/// log_warning!("No config file found");
/// ```
///
/// Outputs:
/// ```text
/// ⚠ Warning: No config file found
/// ```
#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        println!("\x1b[33m⚠ Warning: {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[33m⚠ Warning: {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs an error message to stderr.
///
/// # Example
/// ```
/// use research_agent_sdk::log_error;
/// log_error!("session failed: {}", "connection refused");
/// ```
///
/// Outputs:
/// ```text
/// ✗ Error: session failed: connection refused
/// ```
#[macro_export]
macro_rules! log_error {
    ($message:expr) => {
        eprintln!("\x1b[31m✗ Error: {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        eprintln!("\x1b[31m✗ Error: {}\x1b[0m", format!($fmt, $($arg)*));
    };
}
