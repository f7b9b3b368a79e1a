//! CLI argument parsing

use clap::Parser;
use std::path::PathBuf;

use crate::commands::Command;
use crate::domain::Domain;

/// Research Agent CLI Arguments
///
/// With no topic words the agent starts an interactive prompt.
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "research-agent",
    version,
    about = "Research topics with an AI agent and build a local knowledge base"
)]
pub struct Args {
    /// Topic to research. A leading `follow`, `parallel` or `synthesize` selects that operation
    #[arg(trailing_var_arg = true)]
    pub words: Vec<String>,

    /// Root directory for topic workspaces and synthesis output
    #[arg(short, long, env = "RESEARCH_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Directory containing prompt templates
    #[arg(long, env = "RESEARCH_PROMPTS_DIR")]
    pub prompts_dir: Option<PathBuf>,

    /// Research domain (tech, policy, thought-leadership, general)
    #[arg(short, long)]
    pub domain: Option<Domain>,

    /// Skip automatic domain detection and use the configured default
    #[arg(long)]
    pub no_detect: bool,

    /// YAML config file (default: user config directory)
    #[arg(short, long, env = "RESEARCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the Claude Code CLI
    #[arg(long, env = "CLAUDE_CLI_PATH")]
    pub claude_path: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Operation requested on the command line, `None` for interactive mode
    pub fn command(&self) -> Option<Command> {
        Command::from_args(&self.words)
    }
}
