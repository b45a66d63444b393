//! Messages handled by the coordinator loop

use stoat_core::DeployStage;

/// Everything the coordinator reacts to, from engine notices to process
/// signals. Producers on different threads send these over one channel and
/// the loop consumes them in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A deployment crossed a stage boundary inside the engine
    DeployStatus(DeployStage),
    /// The active composition schema changed
    SchemaChanged { schema_id: String, name: String },
    /// Transient status text in long and short form
    StatusUpdate { long: String, short: String },
    /// A reload signal asked for a full redeploy
    ReloadRequested,
    /// A sync signal asked for a user-data sync
    SyncRequested,
    /// The host is powering off; shut the engine down in place
    PowerOff,
    /// The process was asked to terminate; clean up sessions first
    Terminate,
}
