//! Core domain types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Engine-assigned identifier for one active composition session.
///
/// The coordinator never creates or destroys sessions; it only echoes the
/// id back to the engine when resolving session-scoped state such as
/// option labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stage of an engine redeployment cycle, as reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployStage {
    Start,
    Success,
    Failure,
}

impl DeployStage {
    /// Map the engine's raw notification value to a stage.
    ///
    /// Values other than `start`/`success`/`failure` carry no stage.
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "start" => Some(DeployStage::Start),
            "success" => Some(DeployStage::Success),
            "failure" => Some(DeployStage::Failure),
            _ => None,
        }
    }
}

/// Identity the coordinator registers with the engine at setup.
///
/// The engine echoes these strings in its own logs and deployment
/// records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    /// Machine-readable code name
    pub code_name: String,
    /// Display name shown by engine tooling
    pub name: String,
    /// Version string reported to the engine
    pub version: String,
}

impl Default for Distribution {
    fn default() -> Self {
        Self {
            code_name: "Stoat".to_string(),
            name: "Stoat".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
