//! Engine deployment and settings lifecycle
//!
//! The deployer owns the engine session, the base configuration scope, and
//! the status sink, and sequences every transition between them. A deploy
//! is always shutdown, start, reload settings, in that order, so the
//! engine never sees a half-open configuration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use stoat_core::prelude::*;
use stoat_engine::{EngineApi, EngineSession, EngineTraits, RawObserver};

use crate::config::ConfigStore;
use crate::status::StatusSink;

/// Key controlling the notification gate. Any value other than `"never"`,
/// including an absent key, leaves notifications enabled.
pub const SHOW_NOTIFICATIONS_KEY: &str = "show_notifications_when";

/// Section a schema must define itself for its scope to drive the status
/// presentation
const STYLE_SECTION: &str = "style";

/// Where the deployer is inside a deploy cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployPhase {
    Idle,
    ShuttingDown,
    Starting,
    ReloadingConfig,
    /// A start or settings reload did not complete; transient, the machine
    /// settles back in [`DeployPhase::Idle`]
    Failed,
}

/// Sequences engine lifecycle transitions and settings reloads.
pub struct Deployer<E: EngineApi> {
    session: EngineSession<E>,
    config: ConfigStore,
    status: Box<dyn StatusSink>,
    notifications_enabled: Arc<AtomicBool>,
    phase: DeployPhase,
}

impl<E: EngineApi> Deployer<E> {
    pub fn new(
        session: EngineSession<E>,
        config: ConfigStore,
        status: Box<dyn StatusSink>,
        notifications_enabled: Arc<AtomicBool>,
    ) -> Self {
        Self {
            session,
            config,
            status,
            notifications_enabled,
            phase: DeployPhase::Idle,
        }
    }

    pub fn phase(&self) -> DeployPhase {
        self.phase
    }

    /// One-time engine setup; see [`EngineSession::setup`]
    pub fn setup_engine(
        &mut self,
        traits: EngineTraits,
        observer: Arc<dyn RawObserver>,
    ) -> Result<()> {
        self.session.setup(traits, observer)
    }

    /// Initial engine start outside a deploy cycle
    pub fn start_engine(&self, full_check: bool) -> bool {
        self.session.start(full_check)
    }

    /// Full redeploy: take the engine down, start it with a maintenance
    /// pass, and reload settings on top of the rebuilt workspace. A failed
    /// start or reload is recorded as a `Failed` transition on the way
    /// back to idle.
    pub fn deploy(&mut self, full_check: bool) -> bool {
        info!("Redeploying engine workspace (full check: {})", full_check);
        self.set_phase(DeployPhase::ShuttingDown);
        self.shutdown();
        self.set_phase(DeployPhase::Starting);
        let started = self.session.start(full_check);
        if !started {
            debug!("Engine maintenance did not run during redeploy");
        }
        self.set_phase(DeployPhase::ReloadingConfig);
        let reloaded = self.load_settings();
        let succeeded = started && reloaded;
        if !succeeded {
            self.set_phase(DeployPhase::Failed);
        }
        self.set_phase(DeployPhase::Idle);
        succeeded
    }

    /// Close the configuration scope and take the engine offline
    pub fn shutdown(&mut self) {
        self.config.close();
        self.session.finalize();
    }

    /// Reload the base settings scope. On success the notification gate is
    /// recomputed and both appearance variants are pushed to the status
    /// sink. On failure the previous scope and gate remain in effect.
    pub fn load_settings(&mut self) -> bool {
        if !self.config.open_base() {
            debug!("Base settings unavailable; keeping current state");
            return false;
        }
        let enabled = self.config.get_string(SHOW_NOTIFICATIONS_KEY).as_deref() != Some("never");
        self.notifications_enabled.store(enabled, Ordering::Release);
        debug!("Notifications enabled: {}", enabled);

        self.status.load(&self.config, false);
        self.status.load(&self.config, true);
        true
    }

    /// Reload settings for the newly active schema. The schema scope is
    /// used only when it opens over the base and carries its own style
    /// section; otherwise the base scope is pushed unchanged.
    pub fn load_settings_for(&mut self, schema_id: &str) -> bool {
        if !self.config.is_open() {
            debug!("Base scope not open; skipping settings for {}", schema_id);
            return false;
        }
        let mut schema = ConfigStore::new(self.config.config_dir());
        let use_schema =
            schema.open_schema(schema_id, &self.config) && schema.has_section(STYLE_SECTION);

        let scope = if use_schema { &schema } else { &self.config };
        self.status.load(scope, false);
        self.status.load(scope, true);
        schema.close();
        true
    }

    /// Push transient status text, skipping when there is nothing to show
    pub fn update_status(&mut self, long: &str, short: &str) {
        if long.is_empty() && short.is_empty() {
            return;
        }
        self.status.update_status(long, short);
    }

    pub fn sync_user_data(&self) {
        self.session.sync_user_data();
    }

    pub fn cleanup_sessions(&self) {
        self.session.cleanup_all_sessions();
    }

    fn set_phase(&mut self, phase: DeployPhase) {
        trace!("Deploy phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::MockStatusSink;
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;
    use stoat_core::types::{Distribution, SessionId};
    use stoat_engine::NullEngine;
    use tempfile::TempDir;

    struct Quiet;

    impl RawObserver for Quiet {
        fn on_notification(&self, _: SessionId, _: Option<&str>, _: Option<&str>) {}
    }

    /// Status sink that records a marker key from every pushed scope
    struct RecordingSink {
        loads: Arc<Mutex<Vec<(Option<String>, bool)>>>,
    }

    impl StatusSink for RecordingSink {
        fn update_status(&mut self, _long: &str, _short: &str) {}

        fn load(&mut self, config: &ConfigStore, dark: bool) {
            self.loads
                .lock()
                .unwrap()
                .push((config.get_string("style/marker"), dark));
        }
    }

    fn traits_in(dir: &Path) -> EngineTraits {
        EngineTraits::new(
            dir.join("shared"),
            dir.join("user"),
            dir.join("log"),
            &Distribution::default(),
            "stoat",
        )
    }

    fn deployer_with(
        dir: &TempDir,
        status: Box<dyn StatusSink>,
    ) -> (Arc<NullEngine>, Arc<AtomicBool>, Deployer<NullEngine>) {
        let engine = Arc::new(NullEngine::new());
        let enabled = Arc::new(AtomicBool::new(false));
        let deployer = Deployer::new(
            EngineSession::new(Arc::clone(&engine)),
            ConfigStore::new(dir.path()),
            status,
            Arc::clone(&enabled),
        );
        (engine, enabled, deployer)
    }

    fn quiet_mock() -> Box<MockStatusSink> {
        let mut mock = MockStatusSink::new();
        mock.expect_load().return_const(());
        mock.expect_update_status().return_const(());
        Box::new(mock)
    }

    #[test]
    fn test_deploy_runs_lifecycle_in_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("stoat.toml"), "a = 1\n").unwrap();
        let (engine, _enabled, mut deployer) = deployer_with(&dir, quiet_mock());
        deployer
            .setup_engine(traits_in(dir.path()), Arc::new(Quiet))
            .unwrap();

        assert!(deployer.deploy(true));

        assert_eq!(
            engine.ops(),
            vec![
                "set_notification_handler",
                "setup",
                "finalize",
                "initialize",
                "start_maintenance(true)",
                "deploy_config_file(stoat.toml, config_version)",
            ]
        );
        assert_eq!(deployer.phase(), DeployPhase::Idle);
    }

    #[test]
    fn test_failed_deploy_returns_to_idle() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("stoat.toml"), "a = 1\n").unwrap();
        let (engine, _enabled, mut deployer) = deployer_with(&dir, quiet_mock());
        engine.set_maintenance_result(false);
        deployer
            .setup_engine(traits_in(dir.path()), Arc::new(Quiet))
            .unwrap();

        assert!(!deployer.deploy(true));
        assert_eq!(deployer.phase(), DeployPhase::Idle);
    }

    #[test]
    fn test_deploy_without_settings_reports_failure() {
        // no configuration file at all: the start succeeds but the reload
        // cannot, and the cycle still ends idle
        let dir = tempfile::tempdir().unwrap();
        let (_engine, _enabled, mut deployer) = deployer_with(&dir, quiet_mock());
        deployer
            .setup_engine(traits_in(dir.path()), Arc::new(Quiet))
            .unwrap();

        assert!(!deployer.deploy(false));
        assert_eq!(deployer.phase(), DeployPhase::Idle);
    }

    #[test]
    fn test_load_settings_missing_base_pushes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockStatusSink::new();
        mock.expect_load().times(0);
        let (_engine, enabled, mut deployer) = deployer_with(&dir, Box::new(mock));
        enabled.store(true, Ordering::Release);

        assert!(!deployer.load_settings());
        // the gate keeps its previous value
        assert!(enabled.load(Ordering::Acquire));
    }

    #[test]
    fn test_load_settings_recomputes_notification_gate() {
        let dir = tempfile::tempdir().unwrap();
        let (_engine, enabled, mut deployer) = deployer_with(&dir, quiet_mock());

        fs::write(
            dir.path().join("stoat.toml"),
            "show_notifications_when = \"never\"\n",
        )
        .unwrap();
        assert!(deployer.load_settings());
        assert!(!enabled.load(Ordering::Acquire));

        fs::write(
            dir.path().join("stoat.toml"),
            "show_notifications_when = \"appropriate\"\n",
        )
        .unwrap();
        assert!(deployer.load_settings());
        assert!(enabled.load(Ordering::Acquire));

        // an absent key leaves notifications on
        fs::write(dir.path().join("stoat.toml"), "a = 1\n").unwrap();
        assert!(deployer.load_settings());
        assert!(enabled.load(Ordering::Acquire));
    }

    #[test]
    fn test_load_settings_pushes_both_appearance_variants() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("stoat.toml"),
            "[style]\nmarker = \"base\"\n",
        )
        .unwrap();
        let loads = Arc::new(Mutex::new(Vec::new()));
        let sink = RecordingSink { loads: loads.clone() };
        let (_engine, _enabled, mut deployer) = deployer_with(&dir, Box::new(sink));

        assert!(deployer.load_settings());

        assert_eq!(
            *loads.lock().unwrap(),
            vec![
                (Some("base".to_string()), false),
                (Some("base".to_string()), true),
            ]
        );
    }

    #[test]
    fn test_schema_with_style_drives_status() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("stoat.toml"),
            "[style]\nmarker = \"base\"\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("luna_pinyin.schema.toml"),
            "[style]\nmarker = \"schema\"\n",
        )
        .unwrap();
        let loads = Arc::new(Mutex::new(Vec::new()));
        let sink = RecordingSink { loads: loads.clone() };
        let (_engine, _enabled, mut deployer) = deployer_with(&dir, Box::new(sink));
        assert!(deployer.load_settings());
        loads.lock().unwrap().clear();

        assert!(deployer.load_settings_for("luna_pinyin"));

        assert_eq!(
            *loads.lock().unwrap(),
            vec![
                (Some("schema".to_string()), false),
                (Some("schema".to_string()), true),
            ]
        );
    }

    #[test]
    fn test_schema_without_style_falls_back_to_base() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("stoat.toml"),
            "[style]\nmarker = \"base\"\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("bare.schema.toml"),
            "candidates = 5\n",
        )
        .unwrap();
        let loads = Arc::new(Mutex::new(Vec::new()));
        let sink = RecordingSink { loads: loads.clone() };
        let (_engine, _enabled, mut deployer) = deployer_with(&dir, Box::new(sink));
        assert!(deployer.load_settings());
        loads.lock().unwrap().clear();

        // falls back for a style-less schema and for a reserved id alike
        assert!(deployer.load_settings_for("bare"));
        assert!(deployer.load_settings_for(".default"));

        let recorded = loads.lock().unwrap().clone();
        assert_eq!(recorded.len(), 4);
        assert!(recorded
            .iter()
            .all(|(marker, _)| marker.as_deref() == Some("base")));
    }

    #[test]
    fn test_load_settings_for_requires_open_base() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockStatusSink::new();
        mock.expect_load().times(0);
        let (_engine, _enabled, mut deployer) = deployer_with(&dir, Box::new(mock));

        assert!(!deployer.load_settings_for("luna_pinyin"));
    }

    #[test]
    fn test_update_status_skips_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockStatusSink::new();
        mock.expect_update_status()
            .withf(|long, short| long == "ASCII mode" && short == "A")
            .times(1)
            .return_const(());
        let (_engine, _enabled, mut deployer) = deployer_with(&dir, Box::new(mock));

        deployer.update_status("", "");
        deployer.update_status("ASCII mode", "A");
    }

    #[test]
    fn test_shutdown_before_setup_is_safe() {
        let dir = tempfile::tempdir().unwrap();
        let (engine, _enabled, mut deployer) = deployer_with(&dir, quiet_mock());

        deployer.shutdown();

        assert!(engine.ops().is_empty());
    }
}
