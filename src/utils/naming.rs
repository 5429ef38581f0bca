//! Timestamped output file names

use chrono::{DateTime, Local};

/// Prefix used for still captures
pub const PHOTO_PREFIX: &str = "capture";

/// Prefix used for recorded clips
pub const VIDEO_PREFIX: &str = "Recorder";

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Build `<prefix>_<YYYYMMDD_HHMMSS>.<extension>` for the given instant
pub fn timestamped_name(prefix: &str, extension: &str, at: DateTime<Local>) -> String {
    format!("{}_{}.{}", prefix, at.format(TIMESTAMP_FORMAT), extension)
}

/// File name for a still captured now
pub fn photo_file_name() -> String {
    timestamped_name(PHOTO_PREFIX, "jpg", Local::now())
}

/// File name for a recording started now
pub fn video_file_name() -> String {
    timestamped_name(VIDEO_PREFIX, "avi", Local::now())
}
