//! Operator input
//!
//! All prompts in a process share one stdin reader so buffered input is never
//! lost between the command loop and a follow-up loop.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Source of operator lines
#[async_trait]
pub trait LineSource: Send {
    /// Show `prompt` and read one line
    ///
    /// Returns `None` on end-of-input or when the operator interrupts.
    async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Line reader over the process stdin, interruptible with Ctrl-C
pub struct StdinSource {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinSource {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LineSource for StdinSource {
    async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        {
            let mut stdout = io::stdout();
            write!(stdout, "{}", prompt)?;
            stdout.flush()?;
        }

        tokio::select! {
            line = self.lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("input interrupted");
                Ok(None)
            }
        }
    }
}

/// Pre-recorded lines, for non-interactive runs and tests
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

#[async_trait]
impl LineSource for ScriptedInput {
    async fn read_line(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}
