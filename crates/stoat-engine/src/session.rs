//! Engine session lifecycle

use std::sync::Arc;

use stoat_core::prelude::*;

use crate::api::{EngineApi, EngineTraits};
use crate::callback::{self, ContextToken, RawObserver};

/// The coordinator's own configuration file inside the engine's tracked set
pub const OWN_CONFIG_FILE: &str = "stoat.toml";
/// Version key the engine compares when deciding whether to redeploy it
pub const OWN_CONFIG_VERSION_KEY: &str = "config_version";

/// Owns the one engine handle in the process.
///
/// `setup` runs exactly once; every other operation is a logged no-op
/// until it has. Engine-side failures never escalate past a log line, so
/// a broken engine cannot block process shutdown.
pub struct EngineSession<E: EngineApi> {
    engine: Arc<E>,
    set_up: bool,
    token: Option<ContextToken>,
}

impl<E: EngineApi> EngineSession<E> {
    pub fn new(engine: Arc<E>) -> Self {
        Self {
            engine,
            set_up: false,
            token: None,
        }
    }

    /// Shared handle to the underlying engine, for label lookups on the
    /// callback thread
    pub fn engine(&self) -> Arc<E> {
        Arc::clone(&self.engine)
    }

    pub fn is_set_up(&self) -> bool {
        self.set_up
    }

    /// One-time engine setup: ensures the writable directories exist,
    /// registers `observer` for callbacks, and hands the engine its
    /// traits. The callback is registered before `setup` so notices from
    /// the first maintenance pass are not lost.
    ///
    /// Directory creation failures are logged and left for the engine to
    /// surface; a second call fails without touching the engine.
    pub fn setup(&mut self, traits: EngineTraits, observer: Arc<dyn RawObserver>) -> Result<()> {
        if self.set_up {
            return Err(Error::engine("engine setup requested twice"));
        }

        for dir in [&traits.user_data_dir, &traits.log_dir] {
            if let Err(e) = std::fs::create_dir_all(dir) {
                warn!("Could not create {}: {}", dir.display(), e);
            }
        }

        let token = callback::register_observer(observer);
        self.engine
            .set_notification_handler(callback::dispatch_notification, token);
        self.engine.setup(&traits);

        self.token = Some(token);
        self.set_up = true;
        info!(
            "Engine set up (user data: {}, shared data: {})",
            traits.user_data_dir.display(),
            traits.shared_data_dir.display()
        );
        Ok(())
    }

    /// Initialize the engine and run a maintenance pass. When maintenance
    /// reports success the coordinator's own configuration file is
    /// redeployed. Returns the maintenance outcome.
    pub fn start(&self, full_check: bool) -> bool {
        if !self.set_up {
            warn!("Engine start requested before setup");
            return false;
        }
        info!("Initializing engine (full check: {})", full_check);
        self.engine.initialize();
        let maintained = self.engine.start_maintenance(full_check);
        if maintained {
            if !self
                .engine
                .deploy_config_file(OWN_CONFIG_FILE, OWN_CONFIG_VERSION_KEY)
            {
                warn!("Engine declined to redeploy {}", OWN_CONFIG_FILE);
            }
        } else {
            debug!("Engine maintenance skipped or failed");
        }
        maintained
    }

    /// Take the engine offline; safe before setup ever ran
    pub fn finalize(&self) {
        if !self.set_up {
            debug!("Engine finalize requested before setup");
            return;
        }
        info!("Finalizing engine");
        self.engine.finalize();
    }

    /// Fire-and-forget user data sync; outcome surfaces as one log line
    pub fn sync_user_data(&self) {
        if !self.set_up {
            warn!("User data sync requested before setup");
            return;
        }
        info!("Engine user data sync requested");
        if !self.engine.sync_user_data() {
            warn!("Engine rejected user data sync");
        }
    }

    /// Release every live composition session at process teardown
    pub fn cleanup_all_sessions(&self) {
        if !self.set_up {
            debug!("Session cleanup requested before setup");
            return;
        }
        info!("Releasing all engine sessions");
        self.engine.cleanup_all_sessions();
    }
}

impl<E: EngineApi> Drop for EngineSession<E> {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            callback::unregister_observer(token);
        }
    }
}
