//! Inert engine backend for bring-up and tests

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use stoat_core::types::SessionId;

use crate::api::{EngineApi, EngineTraits, NotificationHandler};
use crate::callback::ContextToken;

/// Engine stand-in that records every call and can replay notifications
/// through the registered handler.
///
/// The shipped binary drives this backend until a real engine binding is
/// linked in; tests use it to observe call ordering and to script
/// maintenance, sync, and label results.
pub struct NullEngine {
    inner: Mutex<Inner>,
}

struct Inner {
    ops: Vec<String>,
    handler: Option<(NotificationHandler, ContextToken)>,
    maintenance_result: bool,
    deploy_file_result: bool,
    sync_result: bool,
    labels: HashMap<(String, bool), LabelPair>,
}

#[derive(Clone, Default)]
struct LabelPair {
    long: Option<String>,
    short: Option<String>,
}

impl NullEngine {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                ops: Vec::new(),
                handler: None,
                maintenance_result: true,
                deploy_file_result: true,
                sync_result: true,
                labels: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of every engine call made so far, in order
    pub fn ops(&self) -> Vec<String> {
        self.lock().ops.clone()
    }

    pub fn set_maintenance_result(&self, result: bool) {
        self.lock().maintenance_result = result;
    }

    pub fn set_deploy_file_result(&self, result: bool) {
        self.lock().deploy_file_result = result;
    }

    pub fn set_sync_result(&self, result: bool) {
        self.lock().sync_result = result;
    }

    /// Script the labels returned for `(option, state)` lookups
    pub fn set_label(&self, option: &str, state: bool, long: Option<&str>, short: Option<&str>) {
        self.lock().labels.insert(
            (option.to_string(), state),
            LabelPair {
                long: long.map(str::to_string),
                short: short.map(str::to_string),
            },
        );
    }

    /// Deliver a raw notification through the registered handler, as the
    /// real engine would from its callback thread. Dropped when no
    /// handler is registered.
    pub fn emit(&self, session: SessionId, kind: Option<&str>, value: Option<&str>) {
        // resolve outside the lock: the handler may call back into the engine
        let handler = self.lock().handler;
        if let Some((handler, token)) = handler {
            handler(token, session, kind, value);
        }
    }
}

impl Default for NullEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineApi for NullEngine {
    fn setup(&self, _traits: &EngineTraits) {
        self.lock().ops.push("setup".to_string());
    }

    fn set_notification_handler(&self, handler: NotificationHandler, context: ContextToken) {
        let mut inner = self.lock();
        inner.ops.push("set_notification_handler".to_string());
        inner.handler = Some((handler, context));
    }

    fn initialize(&self) {
        self.lock().ops.push("initialize".to_string());
    }

    fn finalize(&self) {
        self.lock().ops.push("finalize".to_string());
    }

    fn start_maintenance(&self, full_check: bool) -> bool {
        let mut inner = self.lock();
        inner.ops.push(format!("start_maintenance({})", full_check));
        inner.maintenance_result
    }

    fn deploy_config_file(&self, file_name: &str, version_key: &str) -> bool {
        let mut inner = self.lock();
        inner
            .ops
            .push(format!("deploy_config_file({}, {})", file_name, version_key));
        inner.deploy_file_result
    }

    fn sync_user_data(&self) -> bool {
        let mut inner = self.lock();
        inner.ops.push("sync_user_data".to_string());
        inner.sync_result
    }

    fn cleanup_all_sessions(&self) {
        self.lock().ops.push("cleanup_all_sessions".to_string());
    }

    fn state_label(
        &self,
        _session: SessionId,
        option: &str,
        state: bool,
        abbreviated: bool,
    ) -> Option<String> {
        let inner = self.lock();
        let pair = inner.labels.get(&(option.to_string(), state))?;
        if abbreviated {
            pair.short.clone()
        } else {
            pair.long.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::{self, RawObserver};
    use std::sync::Arc;

    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<(Option<String>, Option<String>)>>,
    }

    impl RawObserver for Recording {
        fn on_notification(&self, _session: SessionId, kind: Option<&str>, value: Option<&str>) {
            self.seen
                .lock()
                .unwrap()
                .push((kind.map(str::to_string), value.map(str::to_string)));
        }
    }

    #[test]
    fn test_ops_recorded_in_order() {
        let engine = NullEngine::new();
        engine.initialize();
        assert!(engine.start_maintenance(true));
        engine.finalize();
        assert_eq!(
            engine.ops(),
            vec!["initialize", "start_maintenance(true)", "finalize"]
        );
    }

    #[test]
    fn test_scripted_results() {
        let engine = NullEngine::new();
        engine.set_maintenance_result(false);
        engine.set_sync_result(false);
        assert!(!engine.start_maintenance(true));
        assert!(!engine.sync_user_data());
    }

    #[test]
    fn test_state_label_lookup() {
        let engine = NullEngine::new();
        engine.set_label("ascii_mode", false, Some("中文"), Some("中"));
        assert_eq!(
            engine.state_label(SessionId(1), "ascii_mode", false, false),
            Some("中文".to_string())
        );
        assert_eq!(
            engine.state_label(SessionId(1), "ascii_mode", false, true),
            Some("中".to_string())
        );
        assert_eq!(engine.state_label(SessionId(1), "ascii_mode", true, false), None);
    }

    #[test]
    fn test_emit_without_handler_is_dropped() {
        let engine = NullEngine::new();
        engine.emit(SessionId(1), Some("deploy"), Some("start"));
        assert!(engine.ops().is_empty());
    }

    #[test]
    fn test_emit_routes_through_registry() {
        let engine = NullEngine::new();
        let observer = Arc::new(Recording::default());
        let token = callback::register_observer(observer.clone());
        engine.set_notification_handler(callback::dispatch_notification, token);

        engine.emit(SessionId(9), Some("option"), Some("!ascii_mode"));

        let seen = observer.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0.as_deref(), Some("option"));
        assert_eq!(seen[0].1.as_deref(), Some("!ascii_mode"));
        drop(seen);
        callback::unregister_observer(token);
    }
}
