use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use log::{debug, error, info, trace};
use rusqlite::{params, Connection, OptionalExtension};
use tempfile::NamedTempFile;

use crate::{NoteRecord, Result, YkError};

/// Synchronous access to the single `data` table.
///
/// No connection is kept between calls: every operation opens the database,
/// runs its statement and drops the handle again, which commits. There is no
/// transaction spanning two calls.
#[derive(Debug, Clone)]
pub struct NoteStore {
    /// Location of the SQLite file
    path: PathBuf,
}

impl NoteStore {
    /// Opens (creating if needed) the database at `path` and ensures the schema exists
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self { path: path.into() };

        info!("Opening note database at {}", store.path.display());
        let conn = store.connect().map_err(|e| {
            error!("Failed to open database {}: {}", store.path.display(), e);
            YkError::StorageUnavailable {
                path: store.path.clone(),
                message: e.to_string(),
            }
        })?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS data (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title, text, creation_time, last_modified_time, file_path
            )",
            [],
        )
        .map_err(|e| YkError::StorageUnavailable {
            path: store.path.clone(),
            message: e.to_string(),
        })?;

        Ok(store)
    }

    pub fn database_path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        trace!("Connecting to {}", self.path.display());
        Ok(Connection::open(&self.path)?)
    }

    /// Appends a new record and returns its id
    pub fn insert(
        &self,
        title: &str,
        text: &str,
        creation_time: &str,
        last_modified_time: Option<&str>,
        file_path: Option<&Path>,
    ) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO data (title, text, creation_time, last_modified_time, file_path)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                title,
                text,
                creation_time,
                last_modified_time.unwrap_or_default(),
                path_column(file_path),
            ],
        )?;
        let id = conn.last_insert_rowid();

        debug!("Inserted note {} created at {}", id, creation_time);
        Ok(id)
    }

    /// Lists `(id, creation_time)` pairs, newest first
    pub fn list_ids_and_creation_times(&self) -> Result<Vec<(i64, String)>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT id, creation_time FROM data ORDER BY id DESC")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, Option<String>>(1)?))
            })?
            .map(|row| row.map(|(id, created)| (id, created.unwrap_or_default())))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!("Listed {} notes", rows.len());
        Ok(rows)
    }

    /// Reads a single record
    pub fn read(&self, id: i64) -> Result<NoteRecord> {
        let conn = self.connect()?;
        let record = conn
            .query_row(
                "SELECT title, text, creation_time, last_modified_time, file_path
                 FROM data WHERE id = ?1",
                [id],
                |row| {
                    Ok(NoteRecord {
                        id,
                        title: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                        text: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                        creation_time: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                        last_modified_time: non_blank(row.get(3)?),
                        file_path: non_blank(row.get(4)?).map(PathBuf::from),
                    })
                },
            )
            .optional()?;

        record.ok_or(YkError::NoteNotFound { id })
    }

    /// Rewrites the mutable fields of a record; an unknown id changes nothing
    pub fn update(
        &self,
        id: i64,
        title: &str,
        text: &str,
        last_modified_time: &str,
        file_path: Option<&Path>,
    ) -> Result<()> {
        let conn = self.connect()?;
        let changed = conn.execute(
            "UPDATE data SET title = ?1, text = ?2, last_modified_time = ?3, file_path = ?4
             WHERE id = ?5",
            params![title, text, last_modified_time, path_column(file_path), id],
        )?;

        trace!("Updated note {} ({} rows)", id, changed);
        Ok(())
    }

    /// Deletes a record and compacts the database file
    pub fn delete(&self, id: i64) -> Result<()> {
        {
            let conn = self.connect()?;
            conn.execute("DELETE FROM data WHERE id = ?1", [id])?;
        }

        // VACUUM cannot share the handle that ran the delete
        let conn = self.connect()?;
        conn.execute_batch("VACUUM")?;

        info!("Note {} deleted", id);
        Ok(())
    }

    /// Copies the whole database file to `target`, replacing any existing file there
    pub fn backup_to(&self, target: &Path) -> Result<()> {
        info!(
            "Backing up {} to {}",
            self.path.display(),
            target.display()
        );
        copy_atomically(&self.path, target)
    }

    /// Overwrites the active database with the file at `source`
    pub fn replace_from(&self, source: &Path) -> Result<()> {
        if !source.is_file() {
            return Err(YkError::FileNotFound {
                file_path: source.display().to_string(),
            });
        }

        info!(
            "Replacing {} with {}",
            self.path.display(),
            source.display()
        );
        copy_atomically(source, &self.path)
    }
}

fn path_column(path: Option<&Path>) -> String {
    path.map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Copies `source` to `target` through a temporary file next to `target`
fn copy_atomically(source: &Path, target: &Path) -> Result<()> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|_| YkError::DirectoryError {
            path: dir.to_path_buf(),
        })?;
    }

    let mut temp_file = NamedTempFile::new_in(dir)?;
    let mut reader = File::open(source)?;
    io::copy(&mut reader, temp_file.as_file_mut())?;
    temp_file.as_file().sync_all()?;

    temp_file.persist(target).map_err(|e| {
        error!("Failed to persist file {}: {}", target.display(), e.error);
        YkError::Io(e.error)
    })?;

    debug!("Copied {} to {}", source.display(), target.display());
    Ok(())
}
