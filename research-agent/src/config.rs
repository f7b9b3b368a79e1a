//! Layered settings
//!
//! Values come from, in order of precedence: command-line flags and their
//! environment variables (a `.env` file is loaded first), an optional YAML
//! config file, then built-in defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Args;
use crate::domain::Domain;
use crate::prompts::Prompts;
use crate::workspace::Workspace;

const DEFAULT_OUTPUT_DIR: &str = "output";
const DEFAULT_SUBAGENT_MODEL: &str = "sonnet";

/// Templates shipped with the crate
pub fn default_prompts_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("prompts")
}

/// Per-user config file location
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "research-agent", "research-agent")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
}

/// Contents of the YAML config file
///
/// ```yaml
/// output_dir: ~/research
/// default_domain: tech
/// detect_domain: false
/// subagent_model: sonnet
/// idle_timeout_secs: 600
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub output_dir: Option<PathBuf>,
    pub prompts_dir: Option<PathBuf>,
    pub default_domain: Option<Domain>,
    pub detect_domain: Option<bool>,
    pub subagent_model: Option<String>,
    pub idle_timeout_secs: Option<u64>,
    pub claude_path: Option<PathBuf>,
}

impl FileConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("Failed to parse config YAML")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Load `explicit` if given, else the user config file if one exists
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match user_config_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "loading user config");
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub prompts_dir: PathBuf,
    /// Domain forced on the command line
    pub domain: Option<Domain>,
    /// Domain used when none is forced and detection is off or inconclusive
    pub default_domain: Domain,
    pub detect_domain: bool,
    pub subagent_model: Option<String>,
    pub idle_timeout: Option<Duration>,
    pub claude_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            prompts_dir: default_prompts_dir(),
            domain: None,
            default_domain: Domain::General,
            detect_domain: true,
            subagent_model: Some(DEFAULT_SUBAGENT_MODEL.to_string()),
            idle_timeout: None,
            claude_path: None,
        }
    }
}

impl Settings {
    pub fn load(args: &Args) -> Result<Self> {
        let file = FileConfig::discover(args.config.as_deref())?;
        Ok(Self::resolve(args, file))
    }

    pub fn resolve(args: &Args, file: FileConfig) -> Self {
        let defaults = Self::default();

        Self {
            output_dir: args
                .output_dir
                .clone()
                .or(file.output_dir)
                .unwrap_or(defaults.output_dir),
            prompts_dir: args
                .prompts_dir
                .clone()
                .or(file.prompts_dir)
                .unwrap_or(defaults.prompts_dir),
            domain: args.domain,
            default_domain: file.default_domain.unwrap_or(defaults.default_domain),
            detect_domain: !args.no_detect && file.detect_domain.unwrap_or(defaults.detect_domain),
            subagent_model: file.subagent_model.or(defaults.subagent_model),
            idle_timeout: file.idle_timeout_secs.map(Duration::from_secs),
            claude_path: args.claude_path.clone().or(file.claude_path),
        }
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::new(&self.output_dir)
    }

    pub fn prompts(&self) -> Prompts {
        Prompts::new(&self.prompts_dir)
    }
}
