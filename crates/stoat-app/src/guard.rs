//! Relaunch-loop detection
//!
//! Every launch stamps a record file with the current time. A launch that
//! finds a stamp younger than the relaunch window was most likely respawned
//! by a supervisor right after a crash, and the caller should skip whatever
//! triggered the crash last time.

use std::path::PathBuf;
use std::time::Duration;

use stoat_core::prelude::*;

/// Name of the record file under the temp directory
pub const RECORD_FILE: &str = "stoat_launch.json";

/// Two launches closer together than this count as a relaunch loop
const RELAUNCH_WINDOW: Duration = Duration::from_secs(2);

/// Detects back-to-back launches via a timestamp record file.
#[derive(Debug, Clone)]
pub struct LaunchGuard {
    record_path: PathBuf,
}

impl Default for LaunchGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl LaunchGuard {
    pub fn new() -> Self {
        Self {
            record_path: std::env::temp_dir().join(RECORD_FILE),
        }
    }

    pub fn with_record_path(record_path: impl Into<PathBuf>) -> Self {
        Self {
            record_path: record_path.into(),
        }
    }

    /// Check for a recent previous launch and stamp the current one.
    ///
    /// An unreadable or malformed record is reported as not problematic and
    /// left untouched for inspection.
    pub fn problematic_launch_detected(&self) -> bool {
        let now_ms = chrono::Utc::now().timestamp_millis();
        let detected = match self.read_record() {
            Ok(Some(previous_ms)) => {
                previous_ms >= now_ms - RELAUNCH_WINDOW.as_millis() as i64
            }
            Ok(None) => false,
            Err(e) => {
                warn!("Could not read launch record: {}", e);
                return false;
            }
        };
        if let Err(e) = self.write_record(now_ms) {
            warn!("Could not write launch record: {}", e);
        }
        detected
    }

    /// Previous launch time in epoch milliseconds, `None` when no record
    /// exists yet. The record is one JSON number, integral or fractional.
    fn read_record(&self) -> Result<Option<i64>> {
        let data = match std::fs::read_to_string(&self.record_path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let previous_ms = serde_json::from_str::<f64>(data.trim())?;
        Ok(Some(previous_ms as i64))
    }

    fn write_record(&self, now_ms: i64) -> Result<()> {
        std::fs::write(&self.record_path, serde_json::to_string(&now_ms)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn guard_in_tempdir() -> (tempfile::TempDir, LaunchGuard) {
        let dir = tempfile::tempdir().unwrap();
        let guard = LaunchGuard::with_record_path(dir.path().join(RECORD_FILE));
        (dir, guard)
    }

    #[test]
    fn test_first_launch_is_clean_and_stamps_record() {
        let (dir, guard) = guard_in_tempdir();
        assert!(!guard.problematic_launch_detected());

        let stamped = fs::read_to_string(dir.path().join(RECORD_FILE)).unwrap();
        let stamped_ms: i64 = stamped.parse().unwrap();
        assert!(stamped_ms > 0);
    }

    #[test]
    fn test_immediate_relaunch_is_detected() {
        let (_dir, guard) = guard_in_tempdir();
        assert!(!guard.problematic_launch_detected());
        assert!(guard.problematic_launch_detected());
    }

    #[test]
    fn test_stale_record_is_clean() {
        let (dir, guard) = guard_in_tempdir();
        let stale_ms = chrono::Utc::now().timestamp_millis() - 10_000;
        fs::write(
            dir.path().join(RECORD_FILE),
            serde_json::to_string(&stale_ms).unwrap(),
        )
        .unwrap();

        assert!(!guard.problematic_launch_detected());
    }

    #[test]
    fn test_fractional_record_is_accepted() {
        let (dir, guard) = guard_in_tempdir();
        let recent_ms = chrono::Utc::now().timestamp_millis() as f64 - 100.5;
        fs::write(dir.path().join(RECORD_FILE), recent_ms.to_string()).unwrap();

        assert!(guard.problematic_launch_detected());
    }

    #[test]
    fn test_corrupt_record_is_clean_and_preserved() {
        let (dir, guard) = guard_in_tempdir();
        fs::write(dir.path().join(RECORD_FILE), "not a number").unwrap();

        assert!(!guard.problematic_launch_detected());
        // the corrupt record is left in place, not overwritten
        let content = fs::read_to_string(dir.path().join(RECORD_FILE)).unwrap();
        assert_eq!(content, "not a number");
    }
}
