//! Engine status notices, parsed once at the callback boundary

use serde::{Deserialize, Serialize};

use crate::types::DeployStage;

// ─────────────────────────────────────────────────────────
// Notice Kinds
// ─────────────────────────────────────────────────────────

/// Raw kind tag for redeployment progress reports
pub const KIND_DEPLOY: &str = "deploy";
/// Raw kind tag for schema switch reports
pub const KIND_SCHEMA: &str = "schema";
/// Raw kind tag for option toggle reports
pub const KIND_OPTION: &str = "option";

// ─────────────────────────────────────────────────────────
// EngineNotice Enum
// ─────────────────────────────────────────────────────────

/// Typed status notice emitted by the engine.
///
/// The engine reports status as a raw `(kind, value)` string pair on its
/// callback thread. [`EngineNotice::parse`] is the only place that pair
/// is interpreted; everything downstream operates on this enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineNotice {
    /// Redeployment progress report
    Deploy(DeployStage),
    /// Active input schema changed; `name` is the display text, `schema_id`
    /// selects the per-schema settings to load
    SchemaChanged { schema_id: String, name: String },
    /// Runtime option toggled on or off
    OptionToggled { name: String, state: bool },
}

impl EngineNotice {
    /// Parse the raw callback pair into a typed notice.
    ///
    /// Returns `None` for absent or unrecognized kinds and for malformed
    /// values. The engine emits more kinds than the coordinator
    /// understands, so unknown input is dropped without logging.
    pub fn parse(kind: Option<&str>, value: Option<&str>) -> Option<Self> {
        match kind? {
            KIND_DEPLOY => DeployStage::from_value(value?).map(EngineNotice::Deploy),
            KIND_SCHEMA => {
                let (schema_id, name) = split_schema_value(value?)?;
                Some(EngineNotice::SchemaChanged {
                    schema_id: schema_id.to_string(),
                    name: name.to_string(),
                })
            }
            KIND_OPTION => {
                let (name, state) = split_option_value(value?);
                Some(EngineNotice::OptionToggled {
                    name: name.to_string(),
                    state,
                })
            }
            _ => None,
        }
    }

    /// Get a human-readable summary
    pub fn summary(&self) -> String {
        match self {
            EngineNotice::Deploy(stage) => format!("Deploy {:?}", stage),
            EngineNotice::SchemaChanged { name, .. } => {
                format!("Schema changed: {}", name)
            }
            EngineNotice::OptionToggled { name, state } => {
                format!("Option {} -> {}", name, state)
            }
        }
    }
}

// ─────────────────────────────────────────────────────────
// Pure Split Functions
// ─────────────────────────────────────────────────────────

/// Split a schema notice value `"<id>/<display name>"` at the first slash.
///
/// Everything after the first slash is the display name, even when it
/// contains further slashes. A value without a slash carries no display
/// name and yields `None`.
pub fn split_schema_value(value: &str) -> Option<(&str, &str)> {
    value.split_once('/')
}

/// Split an option notice value into `(name, state)`.
///
/// A leading `!` negates the option and is stripped from the name.
pub fn split_option_value(value: &str) -> (&str, bool) {
    match value.strip_prefix('!') {
        Some(name) => (name, false),
        None => (value, true),
    }
}
