//! External control signals delivered through the runtime directory
//!
//! Companion processes ask for a redeploy or a user data sync by touching
//! well-known files in the runtime directory. The bus watches that
//! directory with a debounced watcher and turns touches into coordinator
//! messages, so several rapid touches collapse into one request.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::RecursiveMode;
use notify_debouncer_full::{new_debouncer, DebounceEventResult};
use stoat_core::prelude::*;
use tokio::sync::mpsc;

use crate::message::Message;

/// Touching this file requests a full redeploy
pub const RELOAD_SIGNAL: &str = "ReloadSignal";

/// Touching this file requests a user data sync
pub const SYNC_SIGNAL: &str = "SyncSignal";

/// Debounce window for signal file touches, in milliseconds
pub const SIGNAL_DEBOUNCE_MS: u64 = 500;

/// Watches the runtime directory for signal file touches.
pub struct SignalBus {
    runtime_dir: PathBuf,
    stop_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl SignalBus {
    pub fn new(runtime_dir: impl Into<PathBuf>) -> Self {
        Self {
            runtime_dir: runtime_dir.into(),
            stop_tx: None,
        }
    }

    /// Start watching; sends `ReloadRequested` and `SyncRequested` to the
    /// channel. Must be called from within a tokio runtime.
    pub fn start(&mut self, message_tx: mpsc::Sender<Message>) -> Result<()> {
        if self.is_running() {
            return Err(Error::signal_watch("signal watcher is already running"));
        }

        std::fs::create_dir_all(&self.runtime_dir)
            .map_err(|e| Error::signal_watch(format!("cannot create runtime dir: {}", e)))?;

        let runtime_dir = self.runtime_dir.clone();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel();
        self.stop_tx = Some(stop_tx);

        tokio::task::spawn_blocking(move || {
            run_watcher(runtime_dir, message_tx, stop_rx);
        });

        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }

    pub fn is_running(&self) -> bool {
        self.stop_tx.is_some()
    }
}

impl Drop for SignalBus {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Raise a signal by touching its file. This is the sender side, used by
/// companion processes and the CLI.
pub fn post(runtime_dir: &Path, signal: &str) -> Result<()> {
    std::fs::create_dir_all(runtime_dir)?;
    let path = runtime_dir.join(signal);
    std::fs::write(&path, chrono::Utc::now().to_rfc3339())?;
    debug!("Raised signal {}", path.display());
    Ok(())
}

/// Message for a touched signal file, `None` for unrelated paths
fn signal_message(path: &Path) -> Option<Message> {
    match path.file_name()?.to_str()? {
        RELOAD_SIGNAL => Some(Message::ReloadRequested),
        SYNC_SIGNAL => Some(Message::SyncRequested),
        _ => None,
    }
}

fn run_watcher(
    runtime_dir: PathBuf,
    message_tx: mpsc::Sender<Message>,
    mut stop_rx: tokio::sync::oneshot::Receiver<()>,
) {
    let tx_clone = message_tx.clone();

    let debouncer_result = new_debouncer(
        Duration::from_millis(SIGNAL_DEBOUNCE_MS),
        None,
        move |result: DebounceEventResult| match result {
            Ok(events) => {
                // one message per signal, however many touches landed in
                // the debounce window
                let mut raised: Vec<Message> = Vec::new();
                for event in &events {
                    for message in event.paths.iter().filter_map(|p| signal_message(p)) {
                        if !raised.contains(&message) {
                            raised.push(message);
                        }
                    }
                }
                for message in raised {
                    debug!("Signal received: {:?}", message);
                    let _ = tx_clone.blocking_send(message);
                }
            }
            Err(errors) => {
                for error in errors {
                    warn!("Signal watcher error: {:?}", error);
                }
            }
        },
    );

    let mut debouncer = match debouncer_result {
        Ok(d) => d,
        Err(e) => {
            error!("Failed to create signal watcher: {}", e);
            return;
        }
    };

    if let Err(e) = debouncer.watch(&runtime_dir, RecursiveMode::NonRecursive) {
        error!("Failed to watch {}: {}", runtime_dir.display(), e);
        return;
    }
    info!("Watching for signals in {}", runtime_dir.display());

    // keep the debouncer alive until the stop signal
    loop {
        match stop_rx.try_recv() {
            Ok(()) | Err(tokio::sync::oneshot::error::TryRecvError::Closed) => {
                info!("Signal watcher stopping");
                break;
            }
            Err(tokio::sync::oneshot::error::TryRecvError::Empty) => {
                std::thread::sleep(Duration::from_millis(100));
            }
        }
    }
}
