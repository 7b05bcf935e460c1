//! Note-level types shared by the keyword cascade and the semantic index.

use std::path::{Component, Path};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// A note filename paired with its last-modification time.
///
/// The time is seconds since the Unix epoch as a float, which is the form
/// stored in the index's `mtime` metadata field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteStamp {
    pub filename: String,
    pub mtime: f64,
}

impl NoteStamp {
    #[must_use]
    pub fn new(filename: impl Into<String>, mtime: f64) -> Self {
        Self {
            filename: filename.into(),
            mtime,
        }
    }
}

/// Seconds since the Unix epoch for a filesystem timestamp.
///
/// Times before the epoch collapse to `0.0`.
#[must_use]
pub fn epoch_seconds(time: SystemTime) -> f64 {
    time.duration_since(UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64())
}

/// Remove `extension` from the end of `filename`, if it is there.
///
/// Names that don't carry the extension come back unchanged.
#[must_use]
pub fn strip_ending<'a>(filename: &'a str, extension: &str) -> &'a str {
    filename.strip_suffix(extension).unwrap_or(filename)
}

/// Whether `filename` carries the configured note extension.
#[must_use]
pub fn has_extension(filename: &str, extension: &str) -> bool {
    !extension.is_empty() && filename.ends_with(extension)
}

/// Validate a caller-supplied note name before it is joined onto the
/// notes directory.
///
/// The notes directory is flat, so anything other than a single plain
/// path component is rejected.
///
/// # Errors
///
/// Returns a message describing why the name is unusable.
pub fn validate_note_name(filename: &str) -> Result<(), String> {
    if filename.is_empty() {
        return Err("filename cannot be empty".to_string());
    }
    if filename.contains('\0') {
        return Err("filename contains a null byte".to_string());
    }

    let mut components = Path::new(filename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        (Some(Component::ParentDir), _) => Err("filename contains '..'".to_string()),
        _ => Err(format!("'{filename}' is not a plain filename")),
    }
}
