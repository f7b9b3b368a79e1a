//! Common test utilities: a scripted agent runtime and temp-dir settings

use research_agent::config::{default_prompts_dir, Settings};
use research_agent::console::Console;
use research_agent_sdk::{
    async_trait, AgentRuntime, AgentSession, SessionConfig, SessionError, SessionEvent,
    SessionResult,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::Instant;

/// One scripted step of a turn
#[derive(Debug, Clone)]
pub enum Step {
    Event(SessionEvent),
    /// Hold the next step back for this long
    Delay(Duration),
    /// Fail the pending `next_event` with a transport error
    Fail(String),
}

pub fn text(s: &str) -> Step {
    Step::Event(SessionEvent::text(s))
}

pub fn tool(name: &str, input: serde_json::Value) -> Step {
    Step::Event(SessionEvent::tool(name, input))
}

pub fn done(cost: f64) -> Step {
    Step::Event(SessionEvent::done(Some(cost)))
}

pub fn wait(secs: u64) -> Step {
    Step::Delay(Duration::from_secs(secs))
}

/// Everything the runtime observed
#[derive(Debug, Default)]
pub struct Record {
    pub opened: Vec<SessionConfig>,
    pub sent: Vec<String>,
    pub closed: usize,
    pub queries: Vec<String>,
}

/// Agent runtime that replays scripted turns
///
/// Each opened session takes the next script; each `send` on that session
/// starts its next turn. A session with no turns left ends its stream.
pub struct MockRuntime {
    sessions: Mutex<VecDeque<Vec<Vec<Step>>>>,
    reply: Mutex<Result<String, String>>,
    pub record: Arc<Mutex<Record>>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(VecDeque::new()),
            reply: Mutex::new(Ok("general".to_string())),
            record: Arc::new(Mutex::new(Record::default())),
        }
    }

    /// Queue a session made of these turns
    pub fn session(self, turns: Vec<Vec<Step>>) -> Self {
        self.sessions.lock().unwrap().push_back(turns);
        self
    }

    /// Reply returned by single-shot queries
    pub fn reply(self, reply: &str) -> Self {
        *self.reply.lock().unwrap() = Ok(reply.to_string());
        self
    }

    pub fn failing_queries(self, error: &str) -> Self {
        *self.reply.lock().unwrap() = Err(error.to_string());
        self
    }

    pub fn opened(&self) -> Vec<SessionConfig> {
        self.record.lock().unwrap().opened.clone()
    }

    pub fn sent(&self) -> Vec<String> {
        self.record.lock().unwrap().sent.clone()
    }

    pub fn closed(&self) -> usize {
        self.record.lock().unwrap().closed
    }

    pub fn queries(&self) -> Vec<String> {
        self.record.lock().unwrap().queries.clone()
    }
}

#[async_trait]
impl AgentRuntime for MockRuntime {
    async fn open(&self, config: SessionConfig) -> SessionResult<Box<dyn AgentSession>> {
        let turns = self
            .sessions
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| SessionError::Transport("no scripted session".to_string()))?;
        self.record.lock().unwrap().opened.push(config);

        Ok(Box::new(MockSession {
            turns: turns.into_iter().map(VecDeque::from).collect(),
            current: VecDeque::new(),
            wait_until: None,
            record: Arc::clone(&self.record),
        }))
    }

    async fn query_once(&self, _system_prompt: &str, prompt: &str) -> SessionResult<String> {
        self.record.lock().unwrap().queries.push(prompt.to_string());
        self.reply
            .lock()
            .unwrap()
            .clone()
            .map_err(SessionError::Transport)
    }
}

struct MockSession {
    turns: VecDeque<VecDeque<Step>>,
    current: VecDeque<Step>,
    /// Deadline of an in-progress delay, kept across cancelled waits
    wait_until: Option<Instant>,
    record: Arc<Mutex<Record>>,
}

#[async_trait]
impl AgentSession for MockSession {
    async fn send(&mut self, prompt: &str) -> SessionResult<()> {
        self.record.lock().unwrap().sent.push(prompt.to_string());
        self.current = self.turns.pop_front().unwrap_or_default();
        Ok(())
    }

    async fn next_event(&mut self) -> SessionResult<Option<SessionEvent>> {
        loop {
            match self.current.front().cloned() {
                None => return Ok(None),
                Some(Step::Delay(period)) => {
                    let at = *self.wait_until.get_or_insert_with(|| Instant::now() + period);
                    tokio::time::sleep_until(at).await;
                    self.wait_until = None;
                    self.current.pop_front();
                }
                Some(Step::Event(event)) => {
                    self.current.pop_front();
                    return Ok(Some(event));
                }
                Some(Step::Fail(error)) => {
                    self.current.pop_front();
                    return Err(SessionError::Transport(error));
                }
            }
        }
    }

    async fn close(&mut self) -> SessionResult<()> {
        self.record.lock().unwrap().closed += 1;
        Ok(())
    }
}

/// Settings rooted in a fresh temp dir, with detection off
pub fn test_settings() -> (TempDir, Settings) {
    let temp = TempDir::new().unwrap();
    let settings = Settings {
        output_dir: temp.path().join("output"),
        prompts_dir: default_prompts_dir(),
        detect_domain: false,
        ..Settings::default()
    };
    (temp, settings)
}

pub fn buffer_console() -> Console<Vec<u8>> {
    Console::new(Vec::new())
}

pub fn output(console: &Console<Vec<u8>>) -> String {
    String::from_utf8(console.get_ref().clone()).unwrap()
}
