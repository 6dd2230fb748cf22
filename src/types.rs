//! Shared types for the ykpen application.
//!
//! This module holds the crate-wide Result alias and the subcommands
//! understood by the command-line front-end.
use std::path::PathBuf;

use clap::Subcommand;

use crate::YkError;

/// A specialized Result type for ykpen operations.
pub type Result<T> = std::result::Result<T, YkError>;

/// Available subcommands for the ykpen application
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List stored notes, newest first
    List {
        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Show a stored note
    Show {
        /// ID of the note to show
        id: i64,

        /// Format output as raw JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Create a new note
    New {
        /// Title of the note
        #[clap(short = 'T', long)]
        title: String,

        /// Body of the note
        #[clap(short, long)]
        content: Option<String>,

        /// Path to a file containing the note's body
        #[clap(short, long)]
        file: Option<PathBuf>,

        /// Write the body in an editor
        #[clap(short, long)]
        edit: bool,
    },

    /// Edit a stored note; every change is saved immediately
    Edit {
        /// ID of the note to edit
        id: i64,

        /// New title for the note
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// New body for the note
        #[clap(short, long)]
        content: Option<String>,

        /// Path to a file containing the new body
        #[clap(short, long)]
        file: Option<PathBuf>,

        /// Open the body in an editor
        #[clap(short, long)]
        edit: bool,
    },

    /// Delete a stored note
    Delete {
        /// ID of the note to delete
        id: i64,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Store a text file as a new note
    Import {
        /// Text file to read
        source: PathBuf,
    },

    /// Write a note's body to a text file
    Export {
        /// ID of the note to export
        id: i64,

        /// Destination file
        output: PathBuf,
    },

    /// Copy the whole database to a file
    Backup {
        /// Destination (asked interactively when omitted)
        output: Option<PathBuf>,
    },

    /// Overwrite the database with another database file
    Replace {
        /// Database file to copy in
        source: PathBuf,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Interactive editing session
    Session,

    /// Configuration management
    Config {
        /// Show current configuration
        #[clap(short = 'S', long)]
        show: bool,

        /// Reset configuration to defaults
        #[clap(short, long)]
        reset: bool,
    },
}
