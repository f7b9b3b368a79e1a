//! Command grammar for the interactive prompt and one-shot invocation

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Research(String),
    Follow(String),
    Parallel(String),
    Synthesize,
    Help,
    Quit,
    /// A verb given without its required topic
    Usage(&'static str),
}

impl Command {
    /// Parse one line typed at the interactive prompt
    ///
    /// Text that does not start with a known verb is researched as a topic.
    /// Returns `None` for blank input.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (verb, arg) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let with_topic = |make: fn(String) -> Command, usage: &'static str| {
            if arg.is_empty() {
                Command::Usage(usage)
            } else {
                make(arg.to_string())
            }
        };

        Some(match verb.to_lowercase().as_str() {
            "quit" | "exit" | "q" => Command::Quit,
            "help" | "?" => Command::Help,
            "synthesize" => Command::Synthesize,
            "research" => with_topic(Command::Research, "research <topic>"),
            "follow" => with_topic(Command::Follow, "follow <topic>"),
            "parallel" => with_topic(Command::Parallel, "parallel <topic>"),
            _ => Command::Research(line.to_string()),
        })
    }

    /// Interpret trailing command-line words
    ///
    /// `follow`/`parallel` need at least one more word to be treated as verbs;
    /// anything else is a topic. Returns `None` when no words were given.
    pub fn from_args(words: &[String]) -> Option<Self> {
        let (first, rest) = words.split_first()?;

        Some(match (first.as_str(), rest.is_empty()) {
            ("follow", false) => Command::Follow(rest.join(" ")),
            ("parallel", false) => Command::Parallel(rest.join(" ")),
            ("synthesize", true) => Command::Synthesize,
            _ => Command::Research(words.join(" ")),
        })
    }
}

pub const HELP: &str = "\
Commands:
  research <topic>  - Start new research on a topic
  follow <topic>    - Continue with follow-up questions
  parallel <topic>  - Research sub-angles with parallel sub-agents
  synthesize        - Find connections across all researched topics
  quit              - Exit

Examples:
  research Compare MCP servers for Postgres access
  parallel State of small modular reactors
  follow mcp-servers";
