//! Tool call progress reporting
//!
//! The tracker turns a stream of tool starts into a serialized narrative of
//! `start` / `complete` lines with wall-clock timestamps. Only one call is
//! tracked at a time: starting a new call completes the previous one first, so
//! every start line is paired with a completion line.
//!
//! Elapsed time is measured with the tokio clock, which lets tests pause and
//! advance time deterministically.

use std::io::{self, Write};
use std::time::Duration;
use tokio::time::Instant;

use crate::console::Console;

/// Elapsed time after which a call is reported as slow
pub const SLOW_THRESHOLD: Duration = Duration::from_secs(30);

/// Format a duration as `45s` or `2m 5s`
pub fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

#[derive(Debug, Clone)]
struct ToolCallRecord {
    name: String,
    detail: String,
    started: Instant,
}

#[derive(Debug, Default)]
pub struct ProgressTracker {
    current: Option<ToolCallRecord>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Name of the open call, if any
    pub fn current_tool(&self) -> Option<&str> {
        self.current.as_ref().map(|r| r.name.as_str())
    }

    pub fn start<W: Write>(
        &mut self,
        console: &mut Console<W>,
        name: &str,
        detail: &str,
    ) -> io::Result<()> {
        self.complete(console)?;

        let line = if detail.is_empty() {
            format!("[{}] {}...", timestamp(), name)
        } else {
            format!("[{}] {}: {}...", timestamp(), name, detail)
        };
        console.line(&line)?;

        self.current = Some(ToolCallRecord {
            name: name.to_string(),
            detail: detail.to_string(),
            started: Instant::now(),
        });
        Ok(())
    }

    /// Close the open call; a no-op when idle
    pub fn complete<W: Write>(&mut self, console: &mut Console<W>) -> io::Result<()> {
        let Some(record) = self.current.take() else {
            return Ok(());
        };

        tracing::debug!(tool = %record.name, detail = %record.detail, "tool call complete");
        console.line(&format!(
            "[{}] {} complete ({})",
            timestamp(),
            record.name,
            format_duration(record.started.elapsed())
        ))
    }

    /// Heartbeat for a call running past [`SLOW_THRESHOLD`]
    ///
    /// Prints on every invocation while the condition holds.
    pub fn check_slow<W: Write>(&self, console: &mut Console<W>) -> io::Result<()> {
        let Some(record) = &self.current else {
            return Ok(());
        };

        let elapsed = record.started.elapsed();
        if elapsed > SLOW_THRESHOLD {
            console.line(&format!(
                "[{}] Still working on {}... ({} elapsed)",
                timestamp(),
                record.name,
                format_duration(elapsed)
            ))?;
        }
        Ok(())
    }
}
