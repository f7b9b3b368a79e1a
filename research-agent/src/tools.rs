//! Known agent tools and how their invocations are summarized
//!
//! Tool names arrive as strings on the event stream. They are mapped onto a
//! closed set once, so a tool this client has never heard of lands in
//! [`ToolKind::Other`] and is displayed by name with no detail.

use serde_json::Value;
use std::path::Path;

/// Longest fetch URL shown before truncation, ellipsis included
pub const MAX_URL_DISPLAY: usize = 60;

/// Tools available to single-topic sessions
pub const RESEARCH_TOOLS: [&str; 6] = ["WebSearch", "WebFetch", "Read", "Write", "Glob", "Grep"];

/// Extra tools the lead agent of a parallel investigation needs
pub const COORDINATION_TOOLS: [&str; 2] = ["Task", "TodoWrite"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolKind {
    WebSearch,
    WebFetch,
    Read,
    Write,
    Edit,
    Glob,
    Grep,
    Ls,
    Task,
    TodoWrite,
    Other(String),
}

impl ToolKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "WebSearch" => ToolKind::WebSearch,
            "WebFetch" => ToolKind::WebFetch,
            "Read" => ToolKind::Read,
            "Write" => ToolKind::Write,
            "Edit" | "MultiEdit" => ToolKind::Edit,
            "Glob" => ToolKind::Glob,
            "Grep" => ToolKind::Grep,
            "LS" => ToolKind::Ls,
            "Task" => ToolKind::Task,
            "TodoWrite" => ToolKind::TodoWrite,
            other => ToolKind::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ToolKind::WebSearch => "WebSearch",
            ToolKind::WebFetch => "WebFetch",
            ToolKind::Read => "Read",
            ToolKind::Write => "Write",
            ToolKind::Edit => "Edit",
            ToolKind::Glob => "Glob",
            ToolKind::Grep => "Grep",
            ToolKind::Ls => "LS",
            ToolKind::Task => "Task",
            ToolKind::TodoWrite => "TodoWrite",
            ToolKind::Other(name) => name,
        }
    }

    /// Short human-readable summary of an invocation's input
    pub fn detail(&self, input: &Value) -> String {
        let field = |key: &str| input.get(key).and_then(Value::as_str).unwrap_or("");

        match self {
            ToolKind::WebSearch => field("query").to_string(),
            ToolKind::WebFetch => truncate_url(field("url")),
            ToolKind::Read | ToolKind::Write | ToolKind::Edit => base_name(field("file_path")),
            ToolKind::Glob | ToolKind::Grep => field("pattern").to_string(),
            ToolKind::Ls => base_name(field("path")),
            ToolKind::Task => {
                let description = field("description");
                if description.is_empty() {
                    field("subagent_type").to_string()
                } else {
                    description.to_string()
                }
            }
            ToolKind::TodoWrite | ToolKind::Other(_) => String::new(),
        }
    }
}

/// Shorten a URL to [`MAX_URL_DISPLAY`] characters, ending in `...` when cut
pub fn truncate_url(url: &str) -> String {
    if url.chars().count() <= MAX_URL_DISPLAY {
        return url.to_string();
    }
    let kept: String = url.chars().take(MAX_URL_DISPLAY - 3).collect();
    format!("{}...", kept)
}

fn base_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
