//! Research domains that steer which instruction template is used

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    Tech,
    Policy,
    ThoughtLeadership,
    #[default]
    General,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Domain::Tech,
        Domain::Policy,
        Domain::ThoughtLeadership,
        Domain::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Tech => "tech",
            Domain::Policy => "policy",
            Domain::ThoughtLeadership => "thought-leadership",
            Domain::General => "general",
        }
    }

    /// Comma-separated list of every label, for prompts and help text
    pub fn labels() -> String {
        Self::ALL
            .iter()
            .map(Domain::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == wanted)
            .ok_or_else(|| format!("unknown domain '{}' (expected one of: {})", s, Self::labels()))
    }
}

/// Interpret a classifier reply, falling back to [`Domain::General`]
pub fn parse_domain_response(response: &str) -> Domain {
    response.trim().parse().unwrap_or_default()
}
