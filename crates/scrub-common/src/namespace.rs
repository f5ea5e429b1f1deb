//! Option namespaces attached to a project.

use serde::{Deserialize, Serialize};

/// The option namespaces the sanitizer touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Namespace {
    /// General program information (creator, tool, hostname).
    #[serde(rename = "Program Information")]
    ProgramInformation,
    /// Auto-analysis settings.
    #[serde(rename = "Analysis")]
    Analysis,
    /// Free-form user properties.
    #[serde(rename = "User Properties")]
    UserProperties,
}

impl Namespace {
    /// All namespaces, in sanitization order.
    pub const ALL: [Namespace; 3] = [
        Namespace::ProgramInformation,
        Namespace::Analysis,
        Namespace::UserProperties,
    ];

    /// The host-visible namespace name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::ProgramInformation => "Program Information",
            Namespace::Analysis => "Analysis",
            Namespace::UserProperties => "User Properties",
        }
    }
}

impl std::str::FromStr for Namespace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ns| ns.as_str() == s)
            .ok_or_else(|| format!("unknown namespace: {}", s))
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
