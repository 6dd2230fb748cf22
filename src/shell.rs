//! The seam between the note controller and whatever presents it.
//!
//! The controller never talks to a terminal or a window directly; it asks a
//! [`Shell`] for paths and decisions and branches on the answer.
use std::path::{Path, PathBuf};

use crate::{DATABASE_EXTENSIONS, TEXT_EXTENSIONS};

/// Which kind of file a dialog is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFilter {
    /// `.txt`, `.htm`, `.html`
    Text,
    /// `.db`
    Database,
}

impl FileFilter {
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            FileFilter::Text => TEXT_EXTENSIONS,
            FileFilter::Database => DATABASE_EXTENSIONS,
        }
    }
}

/// Why the controller is asking before it throws content away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsavedReason {
    /// A new note with body text that is not in the database yet
    NewNote,
    /// File content that has never been written, or whose file vanished
    FileNotSaved,
    /// An opened file whose buffer differs from disk
    FileModified,
}

/// Answer to an unsaved-changes prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Save,
    Discard,
    Cancel,
}

/// Dialog primitives the presentation layer has to supply.
///
/// All calls are synchronous; `None` from a dialog means the user cancelled it.
pub trait Shell {
    fn open_dialog(&mut self, filter: FileFilter) -> Option<PathBuf>;

    fn save_dialog(&mut self, suggested: &Path, filter: FileFilter) -> Option<PathBuf>;

    fn ask_unsaved(&mut self, reason: UnsavedReason) -> Choice;

    fn ask_yes_no(&mut self, question: &str) -> bool;

    fn show_message(&mut self, message: &str);
}
