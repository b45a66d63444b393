//! Presentation seams for status text and user-facing banners
//!
//! The coordinator never draws anything itself. It pushes status strings
//! and banner messages through these traits, and the embedding process
//! decides what a panel or a notification actually looks like.

use stoat_core::prelude::*;

use crate::config::ConfigStore;

/// Receives status text and styling pushes from the coordinator.
#[cfg_attr(test, mockall::automock)]
pub trait StatusSink: Send {
    /// Show transient status text. `long` and `short` are the full and
    /// abbreviated forms of the same message.
    fn update_status(&mut self, long: &str, short: &str);

    /// Re-read presentation settings from an open configuration scope.
    /// Called once per appearance, `dark` selecting the variant.
    fn load(&mut self, config: &ConfigStore, dark: bool);
}

/// Receives one-line banner messages for the user.
pub trait BannerSink: Send {
    fn post(&mut self, message: &str, subtitle: Option<&str>);
}

/// Status sink that writes to the log
#[derive(Debug, Default)]
pub struct LogStatusSink;

impl StatusSink for LogStatusSink {
    fn update_status(&mut self, long: &str, short: &str) {
        info!("Status: {} ({})", long, short);
    }

    fn load(&mut self, _config: &ConfigStore, dark: bool) {
        debug!("Reloaded status style (dark: {})", dark);
    }
}

/// Banner sink that writes to the log
#[derive(Debug, Default)]
pub struct LogBannerSink;

impl BannerSink for LogBannerSink {
    fn post(&mut self, message: &str, subtitle: Option<&str>) {
        match subtitle {
            Some(subtitle) => info!("Banner: {} ({})", message, subtitle),
            None => info!("Banner: {}", message),
        }
    }
}
