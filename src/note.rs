use std::{path::PathBuf, time::SystemTime};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Display format shared by stored timestamps and file timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Represents a single note persisted in the `data` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    /// Auto-assigned row id
    pub id: i64,
    /// Note title
    pub title: String,
    /// Full note body, stored verbatim
    pub text: String,
    /// When the note was inserted; never changes afterwards
    pub creation_time: String,
    /// Blank until the first update
    pub last_modified_time: Option<String>,
    /// Last file the note was written to or read from
    pub file_path: Option<PathBuf>,
}

/// Current local time in [`TIMESTAMP_FORMAT`]
pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Formats a filesystem time the same way as stored timestamps
pub fn format_system_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}
