//! Common utilities

use chrono::{DateTime, Local};
use std::path::Path;
use std::time::SystemTime;

/// Generation file stem format (`YYYYMMDD-HHMMSS`)
pub const STAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Format a generation file stem from a wall-clock time (one-second resolution)
pub fn generation_stamp(now: &DateTime<Local>) -> String {
    now.format(STAMP_FORMAT).to_string()
}

/// Get file modification time in milliseconds since epoch
pub fn get_mtime_ms(path: &Path) -> std::io::Result<i64> {
    let metadata = std::fs::metadata(path)?;
    let mtime = metadata.modified()?;
    let duration = mtime
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    Ok(duration.as_millis() as i64)
}
