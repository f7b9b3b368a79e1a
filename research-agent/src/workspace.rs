//! Topic workspaces on disk
//!
//! Layout under the output root:
//!
//! ```text
//! <output>/
//! ├── topics/
//! │   └── <slug>/
//! │       ├── notes/
//! │       ├── overview.md
//! │       ├── sources.md
//! │       └── .domain
//! └── synthesis/
//!     ├── connections.md
//!     ├── patterns.md
//!     ├── tensions.md
//!     └── questions.md
//! ```
//!
//! The markdown files are written by the agent; this module only owns the
//! directories and the `.domain` marker.

use std::io;
use std::path::{Path, PathBuf};

use crate::domain::Domain;

/// Maximum slug length in characters
pub const MAX_SLUG_LEN: usize = 50;

const UNTITLED: &str = "untitled";
const DOMAIN_MARKER: &str = ".domain";

/// Convert a topic into a filesystem-safe slug
///
/// Lowercases and trims, drops everything except ASCII word characters,
/// whitespace and `-`, collapses whitespace/underscore runs into one `-`,
/// then truncates to [`MAX_SLUG_LEN`].
pub fn slugify(topic: &str) -> String {
    let lowered = topic.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut in_gap = false;

    for c in lowered
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
    {
        if c.is_whitespace() || c == '_' {
            if !in_gap {
                slug.push('-');
                in_gap = true;
            }
        } else {
            slug.push(c);
            in_gap = false;
        }
    }

    slug.chars().take(MAX_SLUG_LEN).collect()
}

/// Root of all research output
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn topics_dir(&self) -> PathBuf {
        self.root.join("topics")
    }

    fn topic_path(&self, topic: &str) -> PathBuf {
        let slug = slugify(topic);
        let slug = if slug.is_empty() { UNTITLED.to_string() } else { slug };
        self.topics_dir().join(slug)
    }

    /// Get or create the directory for a research topic
    pub fn topic_dir(&self, topic: &str) -> io::Result<PathBuf> {
        let dir = self.topic_path(topic);
        std::fs::create_dir_all(dir.join("notes"))?;
        Ok(dir)
    }

    /// Existing directory for a topic, without creating anything
    pub fn find_topic_dir(&self, topic: &str) -> Option<PathBuf> {
        let dir = self.topic_path(topic);
        dir.is_dir().then_some(dir)
    }

    /// Slugs of every researched topic, sorted
    pub fn list_topics(&self) -> io::Result<Vec<String>> {
        let dir = self.topics_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut topics = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                topics.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        topics.sort();
        Ok(topics)
    }

    /// Get or create the cross-topic synthesis directory
    pub fn synthesis_dir(&self) -> io::Result<PathBuf> {
        let dir = self.root.join("synthesis");
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    pub fn record_domain(&self, topic_dir: &Path, domain: Domain) -> io::Result<()> {
        std::fs::write(topic_dir.join(DOMAIN_MARKER), domain.as_str())
    }

    /// Domain recorded when the topic was first researched
    pub fn recorded_domain(&self, topic_dir: &Path) -> Option<Domain> {
        std::fs::read_to_string(topic_dir.join(DOMAIN_MARKER))
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }
}
