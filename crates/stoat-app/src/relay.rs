//! Bridge from engine callback threads to the coordinator queue
//!
//! The engine invokes observers on its own maintenance threads. The relay
//! parses each notice right there, applies the notification gate, resolves
//! option labels while the session id is still valid, and hands the result
//! to the coordinator loop over the channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use stoat_core::prelude::*;
use stoat_core::{EngineNotice, SessionId};
use stoat_engine::{EngineApi, RawObserver};
use tokio::sync::mpsc;

use crate::message::Message;

/// Observer that forwards parsed engine notices to the coordinator.
pub struct NotificationRelay<E: EngineApi> {
    engine: Arc<E>,
    enabled: Arc<AtomicBool>,
    tx: mpsc::Sender<Message>,
}

impl<E: EngineApi> NotificationRelay<E> {
    pub fn new(engine: Arc<E>, enabled: Arc<AtomicBool>, tx: mpsc::Sender<Message>) -> Self {
        Self { engine, enabled, tx }
    }

    fn forward(&self, message: Message) {
        if self.tx.blocking_send(message).is_err() {
            warn!("Coordinator loop is gone; dropping engine notice");
        }
    }

    fn option_labels(&self, session: SessionId, name: &str, state: bool) -> (String, String) {
        let long = self
            .engine
            .state_label(session, name, state, false)
            .unwrap_or_default();
        let short = self
            .engine
            .state_label(session, name, state, true)
            .unwrap_or_default();
        (long, short)
    }
}

impl<E: EngineApi> RawObserver for NotificationRelay<E> {
    fn on_notification(&self, session: SessionId, kind: Option<&str>, value: Option<&str>) {
        let Some(notice) = EngineNotice::parse(kind, value) else {
            trace!("Ignoring unrecognized engine notice {:?}", kind);
            return;
        };
        match notice {
            // deploy status drives the coordinator's own state and is
            // exempt from the notification gate
            EngineNotice::Deploy(stage) => self.forward(Message::DeployStatus(stage)),
            _ if !self.enabled.load(Ordering::Acquire) => {
                trace!("Notifications disabled; dropping {}", notice.summary());
            }
            EngineNotice::SchemaChanged { schema_id, name } => {
                self.forward(Message::SchemaChanged { schema_id, name });
            }
            EngineNotice::OptionToggled { name, state } => {
                let (long, short) = self.option_labels(session, &name, state);
                if long.is_empty() && short.is_empty() {
                    return;
                }
                self.forward(Message::StatusUpdate { long, short });
            }
        }
    }
}
