//! # stoat-core - Core Domain Types
//!
//! Foundation crate for Stoat. Provides domain types, error handling,
//! engine notice parsing, and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`SessionId`] - Engine-assigned composition session identifier
//! - [`DeployStage`] - Stage of an engine redeployment (Start, Success, Failure)
//! - [`Distribution`] - Identity the coordinator registers with the engine
//!
//! ### Notices (`notices`)
//! - [`EngineNotice`] - Status notices parsed from the raw `(kind, value)`
//!   string pair the engine emits on its callback thread
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ### Logging (`logging`)
//! - [`logging::init`] - Daily-rolling file logging, filtered via `STOAT_LOG`
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use stoat_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod notices;
pub mod types;

/// Prelude for common imports used throughout all Stoat crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use error::{Error, Result, ResultExt};
pub use notices::{split_option_value, split_schema_value, EngineNotice};
pub use types::{DeployStage, Distribution, SessionId};
