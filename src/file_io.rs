//! Plain text file access for notes kept outside the database.
//!
//! Bodies are read and written verbatim; the only derived data is the title
//! (file stem) and the filesystem timestamps shown next to the editor.
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::Path,
};

use log::{debug, error, trace};

use crate::{format_system_time, Result, YkError};

/// Extensions offered by the text file dialogs
pub const TEXT_EXTENSIONS: &[&str] = &["txt", "htm", "html"];

/// Extensions offered by the database dialogs
pub const DATABASE_EXTENSIONS: &[&str] = &["db"];

/// Creation and modification times of a file, already formatted for display
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTimes {
    /// Birth time, unavailable on some filesystems
    pub created: Option<String>,
    pub modified: Option<String>,
}

/// A text file read from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFile {
    pub title: String,
    pub text: String,
    pub times: FileTimes,
}

/// Reads the whole file as text and derives its title from the file name
pub fn load_text_file(path: &Path) -> Result<LoadedFile> {
    debug!("Loading text file: {}", path.display());
    if !path.is_file() {
        return Err(YkError::FileNotFound {
            file_path: path.display().to_string(),
        });
    }

    // Not lossy: a later save must write back exactly what was read
    let text = fs::read_to_string(path).map_err(|e| {
        error!("Failed to open file {}: {}", path.display(), e);
        YkError::Io(e)
    })?;

    Ok(LoadedFile {
        title: title_from_path(path),
        text,
        times: read_file_times(path),
    })
}

/// Truncates and rewrites `path` with `text`, returning the refreshed timestamps
pub fn write_text_file(path: &Path, text: &str) -> Result<FileTimes> {
    debug!("Writing {} bytes to {}", text.len(), path.display());
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| {
            error!("Failed to open {} for writing: {}", path.display(), e);
            YkError::Io(e)
        })?;

    file.write_all(text.as_bytes())?;
    file.flush()?;

    trace!("Finished writing {}", path.display());
    Ok(read_file_times(path))
}

/// File name without its (last) extension
pub fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn read_file_times(path: &Path) -> FileTimes {
    match fs::metadata(path) {
        Ok(meta) => FileTimes {
            created: meta.created().ok().map(format_system_time),
            modified: meta.modified().ok().map(format_system_time),
        },
        Err(e) => {
            debug!("No metadata for {}: {}", path.display(), e);
            FileTimes::default()
        }
    }
}
