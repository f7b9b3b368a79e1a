use anyhow::Result;
use clap::Parser;
use research_agent_sdk::{log_error, log_info, log_warning};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use research_agent::cli::Args;
use research_agent::config::Settings;
use research_agent::console::Console;
use research_agent::input::StdinSource;
use research_agent::repl;
use research_agent::research::Researcher;
use research_agent::runtime::ClaudeRuntime;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> Result<()> {
    let settings = Settings::load(&args)?;
    tracing::debug!(?settings, "settings resolved");

    if !settings.prompts_dir.is_dir() {
        log_warning!(
            "Prompt directory not found, running without system prompts: {}",
            settings.prompts_dir.display()
        );
    }

    let runtime = Arc::new(ClaudeRuntime::new(settings.claude_path.clone()));
    let researcher = Researcher::new(runtime, settings);
    let mut console = Console::stdout();
    let mut input = StdinSource::default();

    match args.command() {
        Some(command) => {
            log_info!("Output directory: {}", researcher.workspace().root().display());
            repl::execute(&researcher, &mut console, &mut input, command).await?;
        }
        None => repl::run_interactive(&researcher, &mut console, &mut input).await?,
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args).await {
        log_error!("{:#}", e);
        std::process::exit(1);
    }
}
