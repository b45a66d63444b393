//! The coordinator loop
//!
//! One task owns the deployer and consumes the message queue, so every
//! lifecycle transition is serialized no matter which thread produced the
//! message. Process signals are adapted onto the same queue: SIGTERM means
//! the host is going down and maps to `PowerOff`, Ctrl-C is an ordinary
//! termination request and maps to `Terminate`.

use stoat_core::prelude::*;
use stoat_engine::EngineApi;
use tokio::sync::mpsc;

use crate::deploy::Deployer;
use crate::handler::{self, Flow};
use crate::message::Message;
use crate::status::BannerSink;

/// Queue depth; producers block briefly when the loop falls behind
pub const CHANNEL_CAPACITY: usize = 64;

/// Cloneable sending side of the coordinator queue.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<Message>,
}

impl CoordinatorHandle {
    pub async fn post(&self, message: Message) -> Result<()> {
        self.tx
            .send(message)
            .await
            .map_err(|e| Error::channel_send(e.to_string()))
    }
}

/// Owns the deployer and runs the message loop to completion.
pub struct Coordinator<E: EngineApi> {
    deployer: Deployer<E>,
    banner: Box<dyn BannerSink>,
    tx: mpsc::Sender<Message>,
    rx: mpsc::Receiver<Message>,
}

impl<E: EngineApi> Coordinator<E> {
    pub fn new(deployer: Deployer<E>, banner: Box<dyn BannerSink>) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        Self {
            deployer,
            banner,
            tx,
            rx,
        }
    }

    pub fn handle(&self) -> CoordinatorHandle {
        CoordinatorHandle {
            tx: self.tx.clone(),
        }
    }

    /// Raw sender for producers that live on non-async threads
    pub fn sender(&self) -> mpsc::Sender<Message> {
        self.tx.clone()
    }

    pub fn deployer_mut(&mut self) -> &mut Deployer<E> {
        &mut self.deployer
    }

    /// Consume messages until a shutdown message arrives or every sender
    /// is gone. The engine is offline when this returns.
    pub async fn run(mut self) -> Result<()> {
        spawn_signal_listener(self.tx.clone());

        while let Some(message) = self.rx.recv().await {
            trace!("Handling {:?}", message);
            if handler::update(&mut self.deployer, self.banner.as_mut(), message)
                == Flow::Shutdown
            {
                break;
            }
        }
        info!("Coordinator loop finished");
        Ok(())
    }
}

/// Spawn a task that listens for OS signals and sends shutdown messages
fn spawn_signal_listener(tx: mpsc::Sender<Message>) {
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(message) => {
                info!("Shutdown signal received");
                let _ = tx.send(message).await;
            }
            Err(e) => error!("Signal listener error: {}", e),
        }
    });
}

/// Wait for a termination signal and map it to the shutdown message it
/// stands for: SIGTERM means the host is going down, SIGINT is an
/// ordinary termination request
async fn wait_for_signal() -> Result<Message> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())
            .map_err(|e| Error::startup(format!("Failed to create SIGINT handler: {}", e)))?;
        let mut sigterm = signal(SignalKind::terminate())
            .map_err(|e| Error::startup(format!("Failed to create SIGTERM handler: {}", e)))?;

        tokio::select! {
            _ = sigint.recv() => {
                info!("Received SIGINT");
                Ok(Message::Terminate)
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
                Ok(Message::PowerOff)
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .map_err(|e| Error::startup(format!("Failed to listen for Ctrl+C: {}", e)))?;
        info!("Received Ctrl+C");
        Ok(Message::Terminate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigStore;
    use crate::status::MockStatusSink;
    use std::sync::atomic::AtomicBool;
    use std::sync::{Arc, Mutex};
    use stoat_core::types::DeployStage;
    use stoat_engine::{EngineSession, NullEngine};

    /// Banner fake sharing its record with the test after the loop
    /// consumes the sink
    #[derive(Default)]
    struct RecordingBanner {
        posts: Arc<Mutex<Vec<String>>>,
    }

    impl BannerSink for RecordingBanner {
        fn post(&mut self, message: &str, _subtitle: Option<&str>) {
            self.posts.lock().unwrap().push(message.to_string());
        }
    }

    fn coordinator_with(
        banner: Box<dyn BannerSink>,
    ) -> (Arc<NullEngine>, Coordinator<NullEngine>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let engine = Arc::new(NullEngine::new());
        let mut status = MockStatusSink::new();
        status.expect_load().return_const(());
        status.expect_update_status().return_const(());
        let deployer = Deployer::new(
            EngineSession::new(Arc::clone(&engine)),
            ConfigStore::new(dir.path()),
            Box::new(status),
            Arc::new(AtomicBool::new(true)),
        );
        let coordinator = Coordinator::new(deployer, banner);
        (engine, coordinator, dir)
    }

    #[tokio::test]
    async fn test_terminate_stops_the_loop() {
        let (engine, coordinator, _dir) = coordinator_with(Box::new(RecordingBanner::default()));
        let handle = coordinator.handle();

        handle.post(Message::Terminate).await.unwrap();
        coordinator.run().await.unwrap();

        // sessions are cleaned up on terminate; engine was never set up
        // here so the null engine records nothing
        assert!(engine.ops().is_empty());
    }

    #[tokio::test]
    async fn test_messages_are_handled_in_order() {
        let banner = RecordingBanner::default();
        let posts = Arc::clone(&banner.posts);
        let (_engine, coordinator, _dir) = coordinator_with(Box::new(banner));
        let handle = coordinator.handle();

        handle
            .post(Message::DeployStatus(DeployStage::Start))
            .await
            .unwrap();
        handle.post(Message::PowerOff).await.unwrap();
        coordinator.run().await.unwrap();

        assert_eq!(*posts.lock().unwrap(), vec!["Deployment started"]);
    }

    #[tokio::test]
    async fn test_signal_listener_spawns_quietly() {
        let (tx, mut rx) = mpsc::channel::<Message>(1);

        spawn_signal_listener(tx);

        // give it a moment to start; no signal means no message
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_post_after_shutdown_fails() {
        let (_engine, coordinator, _dir) = coordinator_with(Box::new(RecordingBanner::default()));
        let handle = coordinator.handle();

        handle.post(Message::Terminate).await.unwrap();
        coordinator.run().await.unwrap();

        let err = handle.post(Message::SyncRequested).await.unwrap_err();
        assert!(matches!(err, Error::ChannelSend { .. }));
    }
}
