//! Interactive command loop

use anyhow::Result;
use std::io::Write;

use crate::commands::{Command, HELP};
use crate::console::Console;
use crate::input::LineSource;
use crate::research::Researcher;

const PROMPT: &str = ">>> ";

/// Whether the loop keeps reading commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Run one command to completion
///
/// Errors from the operation are returned; the interactive loop reports them
/// and keeps going, the one-shot entry point exits with them.
pub async fn execute<W: Write>(
    researcher: &Researcher,
    console: &mut Console<W>,
    input: &mut dyn LineSource,
    command: Command,
) -> Result<Flow> {
    match command {
        Command::Research(topic) => researcher.research(console, &topic, None).await?,
        Command::Follow(topic) => researcher.follow_up(console, input, &topic).await?,
        Command::Parallel(topic) => researcher.parallel(console, input, &topic, None).await?,
        Command::Synthesize => researcher.synthesize(console).await?,
        Command::Help => console.line(HELP)?,
        Command::Usage(usage) => console.line(&format!("Usage: {}", usage))?,
        Command::Quit => return Ok(Flow::Exit),
    }
    Ok(Flow::Continue)
}

fn is_operation(command: &Command) -> bool {
    matches!(
        command,
        Command::Research(_) | Command::Follow(_) | Command::Parallel(_) | Command::Synthesize
    )
}

pub async fn run_interactive<W: Write>(
    researcher: &Researcher,
    console: &mut Console<W>,
    input: &mut dyn LineSource,
) -> Result<()> {
    console.rule()?;
    console.line("Research Agent - Interactive Mode")?;
    console.rule()?;
    console.line(&format!(
        "Output directory: {}",
        researcher.workspace().root().display()
    ))?;
    console.line("")?;
    console.line(HELP)?;
    console.line("")?;

    loop {
        let Some(line) = input.read_line(PROMPT).await? else {
            console.line("\nGoodbye!")?;
            break;
        };
        let Some(command) = Command::parse(&line) else {
            continue;
        };

        let operation = is_operation(&command);
        match execute(researcher, console, input, command).await {
            Ok(Flow::Exit) => {
                console.line("Goodbye!")?;
                break;
            }
            Ok(Flow::Continue) => {}
            Err(e) => {
                tracing::error!(error = %e, "command failed");
                console.line(&format!("Error: {:#}", e))?;
            }
        }

        if operation {
            console.line("")?;
            console.line("Ready for next command.")?;
        }
    }

    Ok(())
}
