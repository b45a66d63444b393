//! Directory resolution for configuration, logs, and signals
//!
//! Precedence per directory: explicit override (CLI), then the matching
//! `STOAT_*` environment variable, then the platform default.

use std::env;
use std::path::PathBuf;

/// Environment overrides, checked before platform defaults
pub const USER_DIR_ENV: &str = "STOAT_USER_DIR";
pub const SHARED_DIR_ENV: &str = "STOAT_SHARED_DIR";
pub const LOG_DIR_ENV: &str = "STOAT_LOG_DIR";
pub const RUNTIME_DIR_ENV: &str = "STOAT_RUNTIME_DIR";

/// System-wide data shipped with the distribution
const DEFAULT_SHARED_DIR: &str = "/usr/share/stoat";

/// Explicit directory overrides, typically from the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirOverrides {
    pub user_dir: Option<PathBuf>,
    pub shared_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub runtime_dir: Option<PathBuf>,
}

/// Resolved directory roots for one coordinator process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    /// User configuration and engine user data
    pub user_data_dir: PathBuf,
    /// Read-only data shipped with the distribution
    pub shared_data_dir: PathBuf,
    /// Rolling coordinator and engine logs
    pub log_dir: PathBuf,
    /// Signal files watched by the bus
    pub runtime_dir: PathBuf,
}

impl AppDirs {
    /// Resolve every directory root, applying `overrides` first
    pub fn resolve(overrides: &DirOverrides) -> Self {
        Self {
            user_data_dir: resolve_dir(&overrides.user_dir, USER_DIR_ENV, default_user_dir),
            shared_data_dir: resolve_dir(&overrides.shared_dir, SHARED_DIR_ENV, || {
                PathBuf::from(DEFAULT_SHARED_DIR)
            }),
            log_dir: resolve_dir(&overrides.log_dir, LOG_DIR_ENV, default_log_dir),
            runtime_dir: resolve_dir(&overrides.runtime_dir, RUNTIME_DIR_ENV, default_runtime_dir),
        }
    }
}

fn resolve_dir(
    explicit: &Option<PathBuf>,
    env_var: &str,
    default: impl FnOnce() -> PathBuf,
) -> PathBuf {
    if let Some(path) = explicit {
        return path.clone();
    }
    if let Some(path) = env::var_os(env_var) {
        return PathBuf::from(path);
    }
    default()
}

fn default_user_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stoat")
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stoat")
        .join("logs")
}

fn default_runtime_dir() -> PathBuf {
    dirs::runtime_dir()
        .unwrap_or_else(env::temp_dir)
        .join("stoat")
}
