//! Stoat Library
//!
//! Lifecycle and notification coordinator for an embedded composition
//! engine.

// Module declarations
pub mod launch;

// Re-export main entry points
pub use launch::{raise_signal, run_coordinator, LaunchOptions, APP_ID};
