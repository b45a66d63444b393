//! Observer registry resolving engine callbacks to typed observers
//!
//! The engine carries one opaque context value and echoes it back on every
//! notification. Instead of smuggling a raw pointer through that value,
//! the coordinator registers its observer here and hands the engine the
//! registry key; [`dispatch_notification`] is the trampoline that looks
//! the key up on each invocation and forwards to the observer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use stoat_core::types::SessionId;

/// Opaque registry key the engine carries in place of a context pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextToken(u64);

/// Receives raw engine notifications on the engine's callback thread
pub trait RawObserver: Send + Sync {
    fn on_notification(&self, session: SessionId, kind: Option<&str>, value: Option<&str>);
}

fn registry() -> &'static Mutex<HashMap<u64, Arc<dyn RawObserver>>> {
    static REGISTRY: OnceLock<Mutex<HashMap<u64, Arc<dyn RawObserver>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Register `observer` and return the token the engine should echo back
pub fn register_observer(observer: Arc<dyn RawObserver>) -> ContextToken {
    let token = ContextToken(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed));
    registry()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(token.0, observer);
    token
}

/// Drop a registration; stale tokens are ignored
pub fn unregister_observer(token: ContextToken) {
    registry()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&token.0);
}

/// Trampoline the engine invokes on its callback thread.
///
/// Unknown tokens are dropped silently: the engine may deliver a late
/// callback after the observer unregistered during shutdown.
pub fn dispatch_notification(
    token: ContextToken,
    session: SessionId,
    kind: Option<&str>,
    value: Option<&str>,
) {
    let observer = registry()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&token.0)
        .cloned();
    if let Some(observer) = observer {
        observer.on_notification(session, kind, value);
    }
}
