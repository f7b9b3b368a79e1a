//! Session driving: one instruction out, a stream of events back
//!
//! [`SessionDriver`] owns one agent session and its [`ProgressTracker`] for the
//! lifetime of an operation. Each turn sends exactly one instruction, then
//! drains events until the terminal result:
//!
//! - assistant text is written verbatim, after closing any open tool line
//! - tool invocations are summarized through [`ToolKind`] and start a tracker record
//! - the terminal result closes the open record and ends the turn
//!
//! Interactive operations enable a heartbeat: a poll timer raced against the
//! event wait that reports tool calls running past the slowness threshold.

use research_agent_sdk::{AgentSession, SessionError, SessionEvent, SessionResult};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;
use tokio::time::{interval_at, timeout_at, Instant, Interval, MissedTickBehavior};

use crate::console::Console;
use crate::input::LineSource;
use crate::tools::ToolKind;
use crate::tracker::ProgressTracker;

/// How often an interactive driver checks for slow tool calls
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverOptions {
    /// Poll period for slow-call heartbeats, disabled when `None`
    pub heartbeat: Option<Duration>,
    /// Fail the turn if no event arrives within this window
    pub idle_timeout: Option<Duration>,
}

impl DriverOptions {
    pub fn batch(idle_timeout: Option<Duration>) -> Self {
        Self {
            heartbeat: None,
            idle_timeout,
        }
    }

    pub fn interactive(idle_timeout: Option<Duration>) -> Self {
        Self {
            heartbeat: Some(POLL_INTERVAL),
            idle_timeout,
        }
    }
}

/// Outcome of one driven turn
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnReport {
    pub cost_usd: Option<f64>,
    pub error: Option<String>,
    /// Whether a terminal result was received before the stream ended
    pub finished: bool,
}

enum Wake {
    Event(SessionResult<Option<SessionEvent>>),
    Heartbeat,
}

pub struct SessionDriver<'c, W: Write> {
    session: Box<dyn AgentSession>,
    tracker: ProgressTracker,
    console: &'c mut Console<W>,
    options: DriverOptions,
}

impl<'c, W: Write> SessionDriver<'c, W> {
    pub fn new(
        session: Box<dyn AgentSession>,
        console: &'c mut Console<W>,
        options: DriverOptions,
    ) -> Self {
        Self {
            session,
            tracker: ProgressTracker::new(),
            console,
            options,
        }
    }

    pub fn console(&mut self) -> &mut Console<W> {
        &mut *self.console
    }

    /// Send one instruction and drain the turn's events
    pub async fn run_turn(&mut self, prompt: &str) -> SessionResult<TurnReport> {
        tracing::debug!(chars = prompt.len(), "sending instruction");
        self.session.send(prompt).await?;

        let mut heartbeat = self.options.heartbeat.map(|period| {
            let mut poll = interval_at(Instant::now() + period, period);
            poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
            poll
        });
        let mut last_event = Instant::now();

        loop {
            let deadline = self
                .options
                .idle_timeout
                .map(|window| (last_event + window, window));

            let wake = tokio::select! {
                event = next_event(self.session.as_mut(), deadline) => Wake::Event(event),
                _ = tick(&mut heartbeat) => Wake::Heartbeat,
            };

            let event = match wake {
                Wake::Heartbeat => {
                    self.tracker.check_slow(&mut *self.console)?;
                    continue;
                }
                Wake::Event(event) => event?,
            };
            last_event = Instant::now();

            let Some(event) = event else {
                self.tracker.complete(&mut *self.console)?;
                self.console.end_line()?;
                tracing::warn!("event stream ended without a result");
                return Ok(TurnReport::default());
            };

            if let Some(report) = self.dispatch(event)? {
                return Ok(report);
            }
        }
    }

    fn dispatch(&mut self, event: SessionEvent) -> io::Result<Option<TurnReport>> {
        let console = &mut *self.console;

        match event {
            SessionEvent::AssistantText { text } => {
                tracing::trace!(chars = text.len(), "assistant text");
                self.tracker.complete(console)?;
                console.text(&text)?;
                Ok(None)
            }
            SessionEvent::ToolInvocation { name, input } => {
                tracing::debug!(tool = %name, %input, "tool invocation");
                let kind = ToolKind::from_name(&name);
                let detail = kind.detail(&input);
                self.tracker.start(console, kind.name(), &detail)?;
                Ok(None)
            }
            SessionEvent::TerminalResult { cost_usd, error } => {
                tracing::debug!(?cost_usd, ?error, "terminal result");
                self.tracker.complete(console)?;
                console.end_line()?;
                Ok(Some(TurnReport {
                    cost_usd,
                    error,
                    finished: true,
                }))
            }
        }
    }

    /// Answer operator questions on this session until they are done
    ///
    /// Ends on `done`/`quit`/`exit`, end-of-input or interrupt. Blank lines are
    /// skipped.
    pub async fn converse(&mut self, input: &mut dyn LineSource, prompt: &str) -> SessionResult<()> {
        self.console.line("")?;
        self.console
            .line("Ready for follow-up questions. Type 'done' to exit.")?;
        self.console.line("")?;

        loop {
            let Some(line) = input.read_line(prompt).await? else {
                self.console.line("\nSession ended.")?;
                return Ok(());
            };

            let question = line.trim();
            if question.is_empty() {
                continue;
            }
            if matches!(question.to_lowercase().as_str(), "done" | "quit" | "exit") {
                self.console.line("Session ended.")?;
                return Ok(());
            }

            let report = self.run_turn(question).await?;
            self.report_turn(&report)?;
        }
    }

    /// Tell the operator when a turn did not end cleanly
    pub fn report_turn(&mut self, report: &TurnReport) -> io::Result<()> {
        if let Some(error) = &report.error {
            self.console.line(&format!("Turn ended with error: {}", error))?;
        }
        if !report.finished {
            self.console
                .line("Session ended before a final result was received.")?;
        }
        Ok(())
    }

    /// Close the open tool line and release the session
    pub async fn close(mut self) -> SessionResult<()> {
        self.tracker.complete(&mut *self.console)?;
        self.session.close().await
    }
}

async fn next_event(
    session: &mut dyn AgentSession,
    deadline: Option<(Instant, Duration)>,
) -> SessionResult<Option<SessionEvent>> {
    match deadline {
        Some((at, window)) => timeout_at(at, session.next_event())
            .await
            .map_err(|_| SessionError::IdleTimeout(window))?,
        None => session.next_event().await,
    }
}

async fn tick(heartbeat: &mut Option<Interval>) {
    match heartbeat {
        Some(poll) => {
            poll.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Opening banner for an operation
pub fn print_header<W: Write>(
    console: &mut Console<W>,
    title: &str,
    fields: &[(&str, String)],
) -> io::Result<()> {
    console.line("")?;
    console.rule()?;
    console.line(title)?;
    for (label, value) in fields {
        console.line(&format!("{}: {}", label, value))?;
    }
    console.rule()?;
    console.line("")
}

/// Closing banner with the output location and cost of a turn
pub fn print_summary<W: Write>(
    console: &mut Console<W>,
    title: &str,
    location: &Path,
    report: &TurnReport,
) -> io::Result<()> {
    console.line("")?;
    console.rule()?;
    console.line(title)?;
    console.line(&format!("Notes saved to: {}", location.display()))?;
    if let Some(cost) = report.cost_usd.filter(|c| *c > 0.0) {
        console.line(&format!("Cost: ${:.4}", cost))?;
    }
    if let Some(error) = &report.error {
        console.line(&format!("Finished with error: {}", error))?;
    }
    if !report.finished {
        console.line("Session ended before a final result was received.")?;
    }
    console.rule()?;
    console.line("")
}
