//! Error types for the ykpen application.
//!
//! This module defines custom error types that categorize different failures
//! that can occur while editing, storing and saving notes.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the ykpen application.
#[derive(Error, Debug)]
pub enum YkError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors reported by the SQLite layer.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Note was not found when performing an operation.
    #[error("Note not found: {id}")]
    NoteNotFound { id: i64 },

    /// The database file could not be opened or created.
    #[error("Storage unavailable at {path}: {message}")]
    StorageUnavailable { path: PathBuf, message: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },

    /// file not found
    #[error("File not found: {file_path}")]
    FileNotFound { file_path: String },

    #[error("{message}")]
    EditorError { message: String },
}
