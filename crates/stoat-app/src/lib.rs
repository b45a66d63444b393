//! # stoat-app - Coordinator Orchestration
//!
//! Ties the engine boundary to the outside world: configuration scopes,
//! the deployment state machine, the notification relay, the
//! cross-process signal bus, and the run loop that serializes all of it
//! on one execution context.
//!
//! ## Public API
//!
//! - [`ConfigStore`] - Layered TOML configuration scopes
//! - [`Deployer`] - Deploy/settings state machine owning the engine session
//! - [`LaunchGuard`] - Rapid-relaunch detection
//! - [`NotificationRelay`] - Engine callback thread to loop bridge
//! - [`SignalBus`] - Watches `ReloadSignal`/`SyncSignal` files
//! - [`Coordinator`] - The run loop itself

pub mod config;
pub mod deploy;
pub mod guard;
pub mod handler;
pub mod message;
pub mod paths;
pub mod relay;
pub mod runtime;
pub mod signals;
pub mod status;

// Re-export the main types for event loop integration
pub use config::ConfigStore;
pub use deploy::{DeployPhase, Deployer};
pub use guard::LaunchGuard;
pub use handler::Flow;
pub use message::Message;
pub use paths::{AppDirs, DirOverrides};
pub use relay::NotificationRelay;
pub use runtime::{Coordinator, CoordinatorHandle};
pub use signals::{SignalBus, RELOAD_SIGNAL, SYNC_SIGNAL};
pub use status::{BannerSink, LogBannerSink, LogStatusSink, StatusSink};
