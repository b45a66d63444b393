//! Process startup and component wiring
//!
//! Builds the coordinator out of its parts, applies the relaunch guard,
//! and runs the loop to completion. The engine seam is wired to the null
//! engine here; an embedding with a real engine swaps in its own
//! [`stoat_engine::EngineApi`] implementation at this one spot.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use stoat_app::{
    signals, AppDirs, BannerSink, ConfigStore, Coordinator, Deployer, DirOverrides, LaunchGuard,
    LogBannerSink, LogStatusSink, NotificationRelay, SignalBus,
};
use stoat_core::logging;
use stoat_core::prelude::*;
use stoat_core::types::Distribution;
use stoat_engine::{EngineSession, EngineTraits, NullEngine};

/// Application identifier handed to the engine
pub const APP_ID: &str = "org.stoat.Stoat";

/// Startup options collected from the command line.
#[derive(Debug, Default, Clone)]
pub struct LaunchOptions {
    pub dirs: DirOverrides,
    /// Run the first maintenance pass as a full workspace check
    pub full_check: bool,
}

/// Run the coordinator until a shutdown signal or message arrives.
pub async fn run_coordinator(options: LaunchOptions) -> Result<()> {
    // Initialize error handling
    color_eyre::install().map_err(|e| Error::startup(e.to_string()))?;

    let dirs = AppDirs::resolve(&options.dirs);
    logging::init(&dirs.log_dir)?;
    info!("User data: {}", dirs.user_data_dir.display());
    info!("Shared data: {}", dirs.shared_data_dir.display());
    info!("Runtime dir: {}", dirs.runtime_dir.display());

    let engine = Arc::new(NullEngine::new());
    let notifications_enabled = Arc::new(AtomicBool::new(false));

    let deployer = Deployer::new(
        EngineSession::new(Arc::clone(&engine)),
        ConfigStore::new(&dirs.user_data_dir),
        Box::new(LogStatusSink),
        Arc::clone(&notifications_enabled),
    );

    let guard_fired = LaunchGuard::new().problematic_launch_detected();
    let mut banner: Box<dyn BannerSink> = Box::new(LogBannerSink);
    if guard_fired {
        warn!("Relaunch loop detected; engine start will be skipped");
        banner.post("Abnormal relaunch detected", Some("engine start skipped"));
    }

    let mut coordinator = Coordinator::new(deployer, banner);
    let relay = Arc::new(NotificationRelay::new(
        Arc::clone(&engine),
        Arc::clone(&notifications_enabled),
        coordinator.sender(),
    ));

    // Setup always runs so a later reload signal can bring the engine up;
    // only the automatic start is withheld after a relaunch loop.
    let traits = EngineTraits::new(
        dirs.shared_data_dir.clone(),
        dirs.user_data_dir.clone(),
        dirs.log_dir.clone(),
        &Distribution::default(),
        APP_ID,
    );
    coordinator
        .deployer_mut()
        .setup_engine(traits, relay)
        .context("engine setup")?;
    if !guard_fired {
        coordinator.deployer_mut().start_engine(options.full_check);
        coordinator.deployer_mut().load_settings();
    }

    let mut signal_bus = SignalBus::new(&dirs.runtime_dir);
    signal_bus
        .start(coordinator.sender())
        .with_context(|| format!("watching {}", dirs.runtime_dir.display()))?;

    let result = coordinator.run().await;
    signal_bus.stop();

    if let Err(ref e) = result {
        error!("Coordinator error: {:?}", e);
    }
    info!("Stoat exiting");
    result
}

/// Raise a control signal for a coordinator running elsewhere.
pub fn raise_signal(overrides: &DirOverrides, signal: &str) -> Result<()> {
    let dirs = AppDirs::resolve(overrides);
    signals::post(&dirs.runtime_dir, signal)?;
    println!("Raised {} in {}", signal, dirs.runtime_dir.display());
    Ok(())
}
