//! # stoat-engine - Engine Boundary
//!
//! Wraps the embedded composition engine behind a typed surface:
//!
//! - [`EngineApi`] models the engine's C-style API as a trait; a real
//!   engine binding implements it, tests and bring-up use [`NullEngine`].
//! - [`EngineSession`] owns the one engine handle per process and
//!   enforces the setup-exactly-once lifecycle.
//! - [`callback`] holds the process-wide observer registry that resolves
//!   engine callbacks back to a typed observer without raw context
//!   pointers.

pub mod api;
pub mod callback;
pub mod null;
pub mod session;

pub use api::{EngineApi, EngineTraits, NotificationHandler};
pub use callback::{
    dispatch_notification, register_observer, unregister_observer, ContextToken, RawObserver,
};
pub use null::NullEngine;
pub use session::EngineSession;
