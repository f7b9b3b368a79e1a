//! Tests for session driving: rendering, progress lines and heartbeats

use super::common::*;
use research_agent::driver::{print_summary, DriverOptions, SessionDriver, TurnReport};
use research_agent::input::ScriptedInput;
use research_agent_sdk::{AgentRuntime, AgentSession, SessionConfig, SessionError, SessionEvent};
use serde_json::json;
use std::path::Path;
use std::time::Duration;

async fn open(runtime: &MockRuntime) -> Box<dyn AgentSession> {
    runtime.open(SessionConfig::default()).await.unwrap()
}

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("{:?} not found in:\n{}", needle, haystack))
}

// ============================================================================
// Rendering
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_tool_line_closed_before_text() {
    let runtime = MockRuntime::new().session(vec![vec![
        tool("WebSearch", json!({"query": "quantum error correction"})),
        text("Surface codes dominate."),
        done(0.0123),
    ]]);
    let mut console = buffer_console();

    let report = {
        let mut driver = SessionDriver::new(open(&runtime).await, &mut console, DriverOptions::default());
        driver.run_turn("go").await.unwrap()
    };

    assert_eq!(
        report,
        TurnReport {
            cost_usd: Some(0.0123),
            error: None,
            finished: true,
        }
    );

    let out = output(&console);
    let started = position(&out, "WebSearch: quantum error correction...");
    let completed = position(&out, "WebSearch complete (0s)");
    let narrative = position(&out, "Surface codes dominate.");
    assert!(started < completed && completed < narrative);
    assert_eq!(runtime.sent(), vec!["go"]);
}

#[tokio::test(start_paused = true)]
async fn test_consecutive_tools_complete_in_order() {
    let runtime = MockRuntime::new().session(vec![vec![
        tool("Read", json!({"file_path": "/out/topics/x/overview.md"})),
        tool("Grep", json!({"pattern": "latency"})),
        done(0.5),
    ]]);
    let mut console = buffer_console();

    {
        let mut driver = SessionDriver::new(open(&runtime).await, &mut console, DriverOptions::default());
        driver.run_turn("go").await.unwrap();
    }

    let out = output(&console);
    let read_start = position(&out, "Read: overview.md...");
    let read_done = position(&out, "Read complete");
    let grep_start = position(&out, "Grep: latency...");
    let grep_done = position(&out, "Grep complete");
    assert!(read_start < read_done && read_done < grep_start && grep_start < grep_done);
}

#[tokio::test(start_paused = true)]
async fn test_long_url_is_truncated() {
    let url = format!("https://example.com/{}", "a".repeat(80));
    assert_eq!(url.len(), 100);

    let runtime = MockRuntime::new().session(vec![vec![
        tool("WebFetch", json!({"url": url})),
        done(0.0),
    ]]);
    let mut console = buffer_console();

    {
        let mut driver = SessionDriver::new(open(&runtime).await, &mut console, DriverOptions::default());
        driver.run_turn("go").await.unwrap();
    }

    let out = output(&console);
    let shown = format!("{}...", &url[..57]);
    assert_eq!(shown.len(), 60);
    assert!(out.contains(&format!("WebFetch: {}...", shown)));
    assert!(!out.contains(&url));
}

#[tokio::test(start_paused = true)]
async fn test_text_fragments_are_verbatim() {
    let runtime = MockRuntime::new().session(vec![vec![
        text("Part one, "),
        text("part two."),
        done(0.0),
    ]]);
    let mut console = buffer_console();

    {
        let mut driver = SessionDriver::new(open(&runtime).await, &mut console, DriverOptions::default());
        driver.run_turn("go").await.unwrap();
    }

    assert_eq!(output(&console), "Part one, part two.\n");
}

#[tokio::test(start_paused = true)]
async fn test_error_result_is_reported() {
    let runtime = MockRuntime::new().session(vec![vec![Step::Event(SessionEvent::failed(
        "error_max_turns",
    ))]]);
    let mut console = buffer_console();

    let report = {
        let mut driver = SessionDriver::new(open(&runtime).await, &mut console, DriverOptions::default());
        driver.run_turn("go").await.unwrap()
    };

    assert!(report.finished);
    assert_eq!(report.error.as_deref(), Some("error_max_turns"));
}

// ============================================================================
// Stream termination and failures
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_stream_end_without_result() {
    let runtime = MockRuntime::new().session(vec![vec![tool("Glob", json!({"pattern": "**/*.md"}))]]);
    let mut console = buffer_console();

    let report = {
        let mut driver = SessionDriver::new(open(&runtime).await, &mut console, DriverOptions::default());
        driver.run_turn("go").await.unwrap()
    };

    assert_eq!(report, TurnReport::default());
    assert!(output(&console).contains("Glob complete"));
}

#[tokio::test(start_paused = true)]
async fn test_transport_error_propagates() {
    let runtime = MockRuntime::new().session(vec![vec![
        text("Starting"),
        Step::Fail("connection reset".to_string()),
    ]]);
    let mut console = buffer_console();

    let mut driver = SessionDriver::new(open(&runtime).await, &mut console, DriverOptions::default());
    let err = driver.run_turn("go").await.unwrap_err();
    assert!(matches!(err, SessionError::Transport(ref msg) if msg == "connection reset"));
}

#[tokio::test(start_paused = true)]
async fn test_idle_timeout_fails_turn() {
    let runtime = MockRuntime::new().session(vec![vec![wait(120), done(0.0)]]);
    let mut console = buffer_console();

    let mut driver = SessionDriver::new(
        open(&runtime).await,
        &mut console,
        DriverOptions::batch(Some(Duration::from_secs(60))),
    );
    let err = driver.run_turn("go").await.unwrap_err();
    assert!(matches!(err, SessionError::IdleTimeout(d) if d == Duration::from_secs(60)));
}

// ============================================================================
// Heartbeat
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_heartbeat_reports_slow_tool() {
    let runtime = MockRuntime::new().session(vec![vec![
        tool("Task", json!({"description": "Research costs"})),
        wait(45),
        done(0.2),
    ]]);
    let mut console = buffer_console();

    {
        let mut driver = SessionDriver::new(
            open(&runtime).await,
            &mut console,
            DriverOptions::interactive(None),
        );
        driver.run_turn("go").await.unwrap();
    }

    let out = output(&console);
    assert_eq!(out.matches("Still working on Task...").count(), 1);
    assert!(out.contains("Still working on Task... (40s elapsed)"));
    assert!(out.contains("Task complete (45s)"));
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_repeats_while_slow() {
    let runtime = MockRuntime::new().session(vec![vec![
        tool("WebSearch", json!({"query": "q"})),
        wait(75),
        done(0.0),
    ]]);
    let mut console = buffer_console();

    {
        let mut driver = SessionDriver::new(
            open(&runtime).await,
            &mut console,
            DriverOptions::interactive(None),
        );
        driver.run_turn("go").await.unwrap();
    }

    // Ticks at 40s, 50s, 60s and 70s are past the threshold
    assert_eq!(output(&console).matches("Still working on WebSearch").count(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_batch_mode_has_no_heartbeat() {
    let runtime = MockRuntime::new().session(vec![vec![
        tool("Task", json!({"description": "Research costs"})),
        wait(45),
        done(0.0),
    ]]);
    let mut console = buffer_console();

    {
        let mut driver = SessionDriver::new(open(&runtime).await, &mut console, DriverOptions::batch(None));
        driver.run_turn("go").await.unwrap();
    }

    assert!(!output(&console).contains("Still working"));
}

// ============================================================================
// Follow-up conversation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_converse_until_done() {
    let runtime = MockRuntime::new().session(vec![
        vec![text("Read the notes."), done(0.01)],
        vec![text("Costs fell 40%."), done(0.02)],
    ]);
    let mut console = buffer_console();
    let mut input = ScriptedInput::new(["", "what about costs?", "done", "never read"]);

    {
        let mut driver = SessionDriver::new(open(&runtime).await, &mut console, DriverOptions::default());
        driver.run_turn("load notes").await.unwrap();
        driver.converse(&mut input, "Follow-up: ").await.unwrap();
        driver.close().await.unwrap();
    }

    assert_eq!(runtime.sent(), vec!["load notes", "what about costs?"]);
    assert_eq!(input.remaining(), 1);
    assert_eq!(runtime.closed(), 1);

    let out = output(&console);
    assert!(out.contains("Ready for follow-up questions. Type 'done' to exit."));
    assert!(out.contains("Costs fell 40%."));
    assert!(out.contains("Session ended."));
}

#[tokio::test(start_paused = true)]
async fn test_converse_ends_on_eof() {
    let runtime = MockRuntime::new().session(vec![vec![done(0.0)]]);
    let mut console = buffer_console();
    let mut input = ScriptedInput::new(Vec::<String>::new());

    {
        let mut driver = SessionDriver::new(open(&runtime).await, &mut console, DriverOptions::default());
        driver.converse(&mut input, "Follow-up: ").await.unwrap();
    }

    assert!(runtime.sent().is_empty());
    assert!(output(&console).ends_with("\nSession ended.\n"));
}

// ============================================================================
// Summary banner
// ============================================================================

#[test]
fn test_summary_shows_cost_and_location() {
    let mut console = buffer_console();
    let report = TurnReport {
        cost_usd: Some(0.0123),
        error: None,
        finished: true,
    };

    print_summary(&mut console, "Research complete!", Path::new("/out/topics/x"), &report).unwrap();

    let out = output(&console);
    assert!(out.contains("Research complete!"));
    assert!(out.contains("Notes saved to: /out/topics/x"));
    assert!(out.contains("Cost: $0.0123"));
    assert!(!out.contains("Session ended before"));
}

#[test]
fn test_summary_omits_zero_cost() {
    let mut console = buffer_console();
    let report = TurnReport {
        cost_usd: Some(0.0),
        error: None,
        finished: true,
    };

    print_summary(&mut console, "Synthesis complete!", Path::new("/o"), &report).unwrap();

    assert!(!output(&console).contains("Cost:"));
}

#[test]
fn test_summary_for_unfinished_turn() {
    let mut console = buffer_console();

    print_summary(&mut console, "Research complete!", Path::new("/o"), &TurnReport::default()).unwrap();

    let out = output(&console);
    assert!(!out.contains("Cost:"));
    assert!(out.contains("Session ended before a final result was received."));
}
