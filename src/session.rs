//! Editor session: the buffer plus where it came from.
//!
//! A session is always in exactly one [`SessionState`]. Edits go through
//! [`NoteSession::set_title`], [`NoteSession::set_text`] and
//! [`NoteSession::set_file_path`], which apply the autosave rules for the
//! current state. Anything that would replace the buffer while it holds
//! unsaved content asks the [`Shell`] first.
use std::{
    fmt,
    path::{Path, PathBuf},
};

use log::{debug, info, trace};

use crate::{
    load_text_file, now_timestamp, write_text_file, Choice, FileFilter, NoteRecord, NoteStore,
    Result, Shell, UnsavedReason, YkError,
};

/// Suggested file name for database backups
pub const BACKUP_FILE_NAME: &str = "YKPen_database_backup.db";

/// Origin of the buffer currently being edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Scratch note not yet in the database
    New { dirty: bool },
    /// Buffer loaded from, or last written to, a text file
    File { dirty: bool },
    /// Stored note; every edit is written through
    Record { id: i64 },
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::New { dirty: false }
    }
}

/// One entry of the source selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEntry {
    New,
    File,
    /// A stored note, labelled by its creation time
    Record { id: i64, label: String },
}

impl fmt::Display for SourceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceEntry::New => write!(f, "New"),
            SourceEntry::File => write!(f, "File"),
            SourceEntry::Record { label, .. } => write!(f, "{}", label),
        }
    }
}

/// Contents of the editor fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    pub title: String,
    pub text: String,
    pub file_path: Option<PathBuf>,
    pub creation_time: Option<String>,
    pub last_modified_time: Option<String>,
}

impl From<NoteRecord> for Buffer {
    fn from(record: NoteRecord) -> Self {
        Self {
            title: record.title,
            text: record.text,
            file_path: record.file_path,
            creation_time: Some(record.creation_time),
            last_modified_time: record.last_modified_time,
        }
    }
}

/// Reconciles the editor buffer with the note store and the filesystem
pub struct NoteSession {
    store: NoteStore,
    state: SessionState,
    buffer: Buffer,
    /// Where save dialogs suggest new files
    dialog_dir: PathBuf,
}

impl NoteSession {
    pub fn new(store: NoteStore, dialog_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            state: SessionState::default(),
            buffer: Buffer::default(),
            dialog_dir: dialog_dir.into(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    /// Selector contents: `New`, `File`, then stored notes newest first
    pub fn entries(&self) -> Result<Vec<SourceEntry>> {
        let mut entries = vec![SourceEntry::New, SourceEntry::File];
        entries.extend(
            self.store
                .list_ids_and_creation_times()?
                .into_iter()
                .map(|(id, label)| SourceEntry::Record { id, label }),
        );
        Ok(entries)
    }

    /// The selector entry matching the current state
    pub fn active_entry(&self) -> SourceEntry {
        match self.state {
            SessionState::New { .. } => SourceEntry::New,
            SessionState::File { .. } => SourceEntry::File,
            SessionState::Record { id } => SourceEntry::Record {
                id,
                label: self.buffer.creation_time.clone().unwrap_or_default(),
            },
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<()> {
        self.buffer.title = title.into();
        self.buffer_changed()
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> Result<()> {
        self.buffer.text = text.into();
        self.buffer_changed()
    }

    pub fn set_file_path(&mut self, path: Option<PathBuf>) -> Result<()> {
        self.buffer.file_path = path;
        self.buffer_changed()
    }

    /// Applies the autosave rules after any field edit
    fn buffer_changed(&mut self) -> Result<()> {
        trace!("Buffer changed in state {:?}", self.state);
        match &mut self.state {
            SessionState::File { dirty } => {
                if !self.buffer.text.is_empty() {
                    *dirty = true;
                } else if self.buffer.file_path.is_none() {
                    *dirty = false;
                }
            }
            SessionState::New { dirty } => {
                *dirty = !self.buffer.text.is_empty();
                if !self.buffer.title.is_empty() && !self.buffer.text.is_empty() {
                    self.insert_buffer()?;
                }
            }
            SessionState::Record { id } => {
                let id = *id;
                self.update_record(id)?;
            }
        }
        Ok(())
    }

    fn insert_buffer(&mut self) -> Result<i64> {
        let creation_time = now_timestamp();
        let id = self.store.insert(
            &self.buffer.title,
            &self.buffer.text,
            &creation_time,
            None,
            self.buffer.file_path.as_deref(),
        )?;

        self.buffer.creation_time = Some(creation_time);
        self.buffer.last_modified_time = None;
        self.state = SessionState::Record { id };
        info!("Buffer stored as note {}", id);
        Ok(id)
    }

    fn update_record(&mut self, id: i64) -> Result<()> {
        let last_modified_time = now_timestamp();
        self.store.update(
            id,
            &self.buffer.title,
            &self.buffer.text,
            &last_modified_time,
            self.buffer.file_path.as_deref(),
        )?;
        self.buffer.last_modified_time = Some(last_modified_time);
        Ok(())
    }

    /// Explicit save into the database.
    ///
    /// Updates the current note, or inserts the buffer as a new one. An empty
    /// buffer is not stored and yields `None`.
    pub fn save_to_store(&mut self) -> Result<Option<i64>> {
        if let SessionState::Record { id } = self.state {
            self.update_record(id)?;
            return Ok(Some(id));
        }

        if self.buffer.title.is_empty() && self.buffer.text.is_empty() {
            debug!("Nothing to store, buffer is empty");
            return Ok(None);
        }

        self.insert_buffer().map(Some)
    }

    /// Switches the buffer to `entry`. Returns `false` when the user cancelled.
    pub fn load(&mut self, entry: &SourceEntry, shell: &mut dyn Shell) -> Result<bool> {
        if !self.confirm_leave_new(shell)? {
            return Ok(false);
        }

        self.mark_missing_file();
        let in_file = matches!(self.state, SessionState::File { .. });

        if *entry == SourceEntry::File && in_file {
            return Ok(true);
        }

        if in_file && !self.confirm_leave_file(shell)? {
            return Ok(false);
        }

        match entry {
            // File without an open file behaves like New
            SourceEntry::New | SourceEntry::File => self.reset_to_new(),
            SourceEntry::Record { id, .. } => self.load_record(*id)?,
        }
        Ok(true)
    }

    /// Loads a stored note without going through the selector prompts
    fn load_record(&mut self, id: i64) -> Result<()> {
        let record = self.store.read(id)?;
        self.buffer = Buffer::from(record);
        self.state = SessionState::Record { id };
        info!("Loaded note {}", id);
        Ok(())
    }

    fn reset_to_new(&mut self) {
        self.buffer = Buffer::default();
        self.state = SessionState::New { dirty: false };
        debug!("Buffer reset to a new note");
    }

    /// Prompts when a new note with content is about to be replaced
    fn confirm_leave_new(&mut self, shell: &mut dyn Shell) -> Result<bool> {
        if self.state != (SessionState::New { dirty: true }) {
            return Ok(true);
        }

        match shell.ask_unsaved(UnsavedReason::NewNote) {
            Choice::Save => {
                self.save_to_store()?;
                Ok(true)
            }
            Choice::Discard => {
                self.state = SessionState::New { dirty: false };
                Ok(true)
            }
            Choice::Cancel => Ok(false),
        }
    }

    /// Prompts when a modified file buffer is about to be replaced
    fn confirm_leave_file(&mut self, shell: &mut dyn Shell) -> Result<bool> {
        if self.state != (SessionState::File { dirty: true }) {
            return Ok(true);
        }

        match shell.ask_unsaved(self.file_reason()) {
            Choice::Save => self.save_file(shell),
            Choice::Discard => {
                self.state = SessionState::File { dirty: false };
                Ok(true)
            }
            Choice::Cancel => Ok(false),
        }
    }

    /// A file session whose file disappeared has nothing on disk to fall back to
    fn mark_missing_file(&mut self) {
        if let SessionState::File { dirty } = &mut self.state {
            if let Some(path) = &self.buffer.file_path {
                if !path.exists() {
                    debug!("Open file {} no longer exists", path.display());
                    *dirty = true;
                }
            }
        }
    }

    fn file_reason(&self) -> UnsavedReason {
        match &self.buffer.file_path {
            Some(path) if path.exists() => UnsavedReason::FileModified,
            _ => UnsavedReason::FileNotSaved,
        }
    }

    /// Asks for a text file and opens it. Returns `false` when nothing was opened.
    pub fn open_file(&mut self, shell: &mut dyn Shell) -> Result<bool> {
        match shell.open_dialog(FileFilter::Text) {
            Some(path) => self.open_path(&path, shell),
            None => Ok(false),
        }
    }

    /// Replaces the buffer with the contents of `path`
    pub fn open_path(&mut self, path: &Path, shell: &mut dyn Shell) -> Result<bool> {
        if !path.is_file() {
            return Err(YkError::FileNotFound {
                file_path: path.display().to_string(),
            });
        }

        if !self.confirm_leave_new(shell)? {
            return Ok(false);
        }
        self.mark_missing_file();
        if !self.confirm_leave_file(shell)? {
            return Ok(false);
        }

        // Read after the prompts: saving may have just rewritten this very file
        let loaded = load_text_file(path)?;

        self.buffer = Buffer {
            title: loaded.title,
            text: loaded.text,
            file_path: Some(path.to_path_buf()),
            creation_time: loaded.times.created,
            last_modified_time: loaded.times.modified,
        };
        self.state = SessionState::File { dirty: false };
        info!("Opened file {}", path.display());
        Ok(true)
    }

    /// Writes the buffer to its file, asking for a path if it has none.
    ///
    /// Returns `false` when the dialog was cancelled. On an I/O error nothing
    /// about the session changes.
    pub fn save_file(&mut self, shell: &mut dyn Shell) -> Result<bool> {
        let target = match &self.buffer.file_path {
            Some(path) => path.clone(),
            None => {
                let suggested = self.dialog_dir.join(&self.buffer.title);
                match shell.save_dialog(&suggested, FileFilter::Text) {
                    Some(path) => path,
                    None => return Ok(false),
                }
            }
        };

        let times = write_text_file(&target, &self.buffer.text)?;
        let path_changed = self.buffer.file_path.as_deref() != Some(target.as_path());
        self.buffer.file_path = Some(target.clone());

        match self.state {
            SessionState::New { .. } | SessionState::File { .. } => {
                self.buffer.creation_time = times.created;
                self.buffer.last_modified_time = times.modified;
                self.state = SessionState::File { dirty: false };
            }
            SessionState::Record { id } => {
                if path_changed {
                    self.update_record(id)?;
                }
            }
        }

        info!("Saved buffer to {}", target.display());
        Ok(true)
    }

    /// Deletes the current note. Returns `false` when no note is loaded.
    pub fn remove(&mut self) -> Result<bool> {
        match self.state {
            SessionState::Record { id } => {
                self.store.delete(id)?;
                self.reset_to_new();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Gives the user a chance to keep unsaved work. Returns whether it is fine to exit.
    pub fn close(&mut self, shell: &mut dyn Shell) -> Result<bool> {
        match self.state {
            SessionState::New { dirty: true } => self.confirm_leave_new(shell),
            SessionState::File { .. } => {
                if self.buffer.text.is_empty() {
                    return Ok(true);
                }
                self.mark_missing_file();
                self.confirm_leave_file(shell)
            }
            _ => Ok(true),
        }
    }

    /// Asks for a destination and copies the database there
    pub fn backup(&mut self, shell: &mut dyn Shell) -> Result<bool> {
        let suggested = self.dialog_dir.join(BACKUP_FILE_NAME);
        match shell.save_dialog(&suggested, FileFilter::Database) {
            Some(target) => {
                self.store.backup_to(&target)?;
                shell.show_message(&format!("Database backed up to {}", target.display()));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Asks for a database file and, after confirmation, makes it the active one
    pub fn replace(&mut self, shell: &mut dyn Shell) -> Result<bool> {
        let Some(source) = shell.open_dialog(FileFilter::Database) else {
            return Ok(false);
        };

        let question = format!(
            "Replace the current database with {}? All current notes will be lost.",
            source.display()
        );
        if !shell.ask_yes_no(&question) {
            return Ok(false);
        }

        self.replace_database(&source)?;
        shell.show_message(&format!(
            "{} replaced with {}",
            self.store.database_path().display(),
            source.display()
        ));
        Ok(true)
    }

    /// Overwrites the database with `source` without asking
    pub fn replace_database(&mut self, source: &Path) -> Result<()> {
        self.store.replace_from(source)?;

        // The id may now point at an unrelated note, or at nothing
        if let SessionState::Record { .. } = self.state {
            self.reset_to_new();
        }
        Ok(())
    }
}
