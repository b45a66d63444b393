//! Typed surface of the embedded composition engine

use std::path::PathBuf;

use stoat_core::types::{Distribution, SessionId};

use crate::callback::ContextToken;

/// Engine notification callback: `(context, session, kind, value)`.
///
/// The engine invokes it from its own thread; the token resolves to the
/// observer registered at setup time via [`crate::callback`].
pub type NotificationHandler = fn(ContextToken, SessionId, Option<&str>, Option<&str>);

/// Startup parameter block handed to [`EngineApi::setup`].
///
/// Mirrors the engine's traits struct: the directory roots it operates
/// in plus the distribution identity it reports in its own logs and
/// deployment records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineTraits {
    /// Read-only data shipped with the distribution
    pub shared_data_dir: PathBuf,
    /// User configuration, dictionaries, and deployment output
    pub user_data_dir: PathBuf,
    /// Engine-side log files
    pub log_dir: PathBuf,
    pub distribution_code_name: String,
    pub distribution_name: String,
    pub distribution_version: String,
    /// Identifier the engine namespaces its state under
    pub app_id: String,
}

impl EngineTraits {
    pub fn new(
        shared_data_dir: impl Into<PathBuf>,
        user_data_dir: impl Into<PathBuf>,
        log_dir: impl Into<PathBuf>,
        distribution: &Distribution,
        app_id: impl Into<String>,
    ) -> Self {
        Self {
            shared_data_dir: shared_data_dir.into(),
            user_data_dir: user_data_dir.into(),
            log_dir: log_dir.into(),
            distribution_code_name: distribution.code_name.clone(),
            distribution_name: distribution.name.clone(),
            distribution_version: distribution.version.clone(),
            app_id: app_id.into(),
        }
    }
}

/// Operations the embedded engine exposes to the coordinator.
///
/// All calls are fast and blocking. The engine reports failure through
/// boolean results; it never panics across this boundary.
pub trait EngineApi: Send + Sync + 'static {
    /// One-time process setup with directory roots and distribution
    /// identity. Valid engine use begins here.
    fn setup(&self, traits: &EngineTraits);

    /// Register the process-wide notification callback. Must be called
    /// before `setup` so deployment notices from the first maintenance
    /// pass are not lost.
    fn set_notification_handler(&self, handler: NotificationHandler, context: ContextToken);

    /// Bring the engine online after setup or a shutdown
    fn initialize(&self);

    /// Take the engine offline; invalidates all sessions
    fn finalize(&self);

    /// Run a maintenance pass over installed schemas and user data.
    /// `full_check` forces re-indexing even when the engine believes its
    /// data is current. Returns whether maintenance actually ran.
    fn start_maintenance(&self, full_check: bool) -> bool;

    /// Ask the engine to redeploy one configuration file it tracks under
    /// `version_key`
    fn deploy_config_file(&self, file_name: &str, version_key: &str) -> bool;

    /// Persist user dictionaries and custom settings
    fn sync_user_data(&self) -> bool;

    /// Release every live composition session
    fn cleanup_all_sessions(&self);

    /// Human-readable label for an option in a given state, absent when
    /// the schema defines none. `abbreviated` selects the short form.
    fn state_label(
        &self,
        session: SessionId,
        option: &str,
        state: bool,
        abbreviated: bool,
    ) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_traits_from_distribution() {
        let dist = Distribution {
            code_name: "Stoat".to_string(),
            name: "Stoat".to_string(),
            version: "0.3.2".to_string(),
        };
        let traits = EngineTraits::new("/usr/share/stoat", "/home/u/.stoat", "/tmp/logs", &dist, "stoat");
        assert_eq!(traits.shared_data_dir, PathBuf::from("/usr/share/stoat"));
        assert_eq!(traits.distribution_code_name, "Stoat");
        assert_eq!(traits.distribution_version, "0.3.2");
        assert_eq!(traits.app_id, "stoat");
    }
}
