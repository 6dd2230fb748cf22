//! CLI module for the ykpen application
//!
//! This module maps the subcommands onto the note session so one-shot
//! commands follow the same autosave and prompting rules as the interactive
//! session.
use std::{
    fs::read_to_string,
    io::{BufRead, Write},
    path::{Path, PathBuf},
    process::Command,
};

use log::info;
use shell_words::split;
use tempfile::Builder;

use crate::{
    run_session, Commands, Config, Console, NoteRecord, NoteSession, NoteStore, Result,
    SessionState, Shell, SourceEntry, YkError,
};

/// CLI Application handler - processes CLI commands against a note session
pub struct App {
    /// The controller every command goes through
    session: NoteSession,

    /// Application configuration
    config: Config,

    /// Whether to display verbose output
    verbose: bool,
}

impl App {
    /// Opens the database named by `config`, creating the profile directory if needed
    pub fn new(config: Config, verbose: bool) -> Result<Self> {
        config.ensure_profile_dir()?;
        let store = NoteStore::open(config.database_path())?;
        let session = NoteSession::new(store, config.dialog_dir.clone());

        Ok(Self {
            session,
            config,
            verbose,
        })
    }

    pub fn session(&self) -> &NoteSession {
        &self.session
    }

    /// Run the CLI application with the given command on the terminal
    pub fn run(&mut self, command: Commands) -> Result<()> {
        let mut console = Console::stdio(self.config.dialog_dir.clone());
        self.run_with(command, &mut console)
    }

    /// Run a command with prompts going through `console`
    pub fn run_with<R: BufRead, W: Write>(
        &mut self,
        command: Commands,
        console: &mut Console<R, W>,
    ) -> Result<()> {
        match command {
            Commands::List { json } => self.list_notes(json, console)?,

            Commands::Show { id, json } => self.show_note(id, json, console)?,

            Commands::New {
                title,
                content,
                file,
                edit,
            } => self.create_note(title, content, file, edit, console)?,

            Commands::Edit {
                id,
                title,
                content,
                file,
                edit,
            } => self.edit_note(id, title, content, file, edit, console)?,

            Commands::Delete { id, force } => self.delete_note(id, force, console)?,

            Commands::Import { source } => self.import_file(&source, console)?,

            Commands::Export { id, output } => self.export_note(id, output, console)?,

            Commands::Backup { output } => self.backup(output, console)?,

            Commands::Replace { source, force } => self.replace(&source, force, console)?,

            Commands::Session => run_session(&mut self.session, console)?,

            Commands::Config { show, reset } => self.handle_config(show, reset, console)?,
        }

        Ok(())
    }

    fn records(&self) -> Result<Vec<NoteRecord>> {
        self.session
            .store()
            .list_ids_and_creation_times()?
            .into_iter()
            .map(|(id, _)| self.session.store().read(id))
            .collect()
    }

    fn list_notes<R: BufRead, W: Write>(
        &self,
        json: bool,
        console: &mut Console<R, W>,
    ) -> Result<()> {
        let records = self.records()?;

        if json {
            console.say(&serde_json::to_string_pretty(&records)?);
            return Ok(());
        }

        if records.is_empty() {
            console.say("No notes stored yet.");
            return Ok(());
        }

        let term_width = terminal_size::terminal_size()
            .map(|(terminal_size::Width(w), _)| w as usize)
            .unwrap_or(80);

        for record in &records {
            console.say(&"-".repeat(term_width.min(50)));
            console.say(&format!(
                "ID: {} | Created: {}",
                record.id, record.creation_time
            ));
            console.say(&format!("Title: {}", console::style(&record.title).bold()));
            if self.verbose {
                console.say(&format!("Preview: {}", preview(&record.text, 60)));
            }
        }
        console.say(&format!("\n{} notes.", records.len()));
        Ok(())
    }

    fn show_note<R: BufRead, W: Write>(
        &self,
        id: i64,
        json: bool,
        console: &mut Console<R, W>,
    ) -> Result<()> {
        let record = self.session.store().read(id)?;

        if json {
            console.say(&serde_json::to_string_pretty(&record)?);
            return Ok(());
        }

        console.say(&format!("{}", console::style(&record.title).bold()));
        console.say(&format!("Created at {}", record.creation_time));
        if let Some(modified) = &record.last_modified_time {
            console.say(&format!("Last modified at {}", modified));
        }
        if let Some(path) = &record.file_path {
            console.say(&format!("File: {}", path.display()));
        }
        console.say("");
        console.say(&record.text);
        Ok(())
    }

    fn create_note<R: BufRead, W: Write>(
        &mut self,
        title: String,
        content: Option<String>,
        file: Option<PathBuf>,
        edit: bool,
        console: &mut Console<R, W>,
    ) -> Result<()> {
        let body = match (content, file) {
            (Some(c), _) => c,
            (_, Some(file_path)) => self.read_content_from_file(&file_path)?,
            (None, None) if edit => self.open_editor_with_content("")?,
            (None, None) => String::new(),
        };

        self.session.load(&SourceEntry::New, console)?;
        self.session.set_title(title)?;
        self.session.set_text(body)?;

        // A title without body is not autosaved
        let id = match self.session.state() {
            SessionState::Record { id } => Some(id),
            _ => self.session.save_to_store()?,
        };

        match id {
            Some(id) => console.say(&format!("Note created with ID: {}", id)),
            None => console.say("Nothing to store: title and body are empty."),
        }
        Ok(())
    }

    fn edit_note<R: BufRead, W: Write>(
        &mut self,
        id: i64,
        title: Option<String>,
        content: Option<String>,
        file: Option<PathBuf>,
        edit: bool,
        console: &mut Console<R, W>,
    ) -> Result<()> {
        let entry = self.entry_for(id)?;
        self.session.load(&entry, console)?;

        if let Some(title) = title {
            self.session.set_title(title)?;
        }

        let body = match (content, file) {
            (Some(c), _) => Some(c),
            (_, Some(file_path)) => Some(self.read_content_from_file(&file_path)?),
            (None, None) if edit => {
                let current = self.session.buffer().text.clone();
                Some(self.open_editor_with_content(&current)?)
            }
            (None, None) => None,
        };
        if let Some(body) = body {
            self.session.set_text(body)?;
        }

        console.say(&format!("Note {} updated", id));
        Ok(())
    }

    fn delete_note<R: BufRead, W: Write>(
        &mut self,
        id: i64,
        force: bool,
        console: &mut Console<R, W>,
    ) -> Result<()> {
        let record = self.session.store().read(id)?;

        if !force {
            console.say("You are about to delete the following note:");
            console.say(&format!("ID:      {}", record.id));
            console.say(&format!("Title:   {}", record.title));
            console.say(&format!("Created: {}", record.creation_time));
            console.say(&format!("Preview: {}", preview(&record.text, 100)));
            console.say("\nThis action cannot be undone!");

            if !console.ask_yes_no("Delete this note?") {
                console.say("Deletion cancelled.");
                return Ok(());
            }
        }

        let entry = self.entry_for(id)?;
        self.session.load(&entry, console)?;
        self.session.remove()?;
        console.say(&format!("Note {} deleted", id));
        Ok(())
    }

    fn import_file<R: BufRead, W: Write>(
        &mut self,
        source: &Path,
        console: &mut Console<R, W>,
    ) -> Result<()> {
        if !self.session.open_path(source, console)? {
            console.say("Import cancelled.");
            return Ok(());
        }

        match self.session.save_to_store()? {
            Some(id) => console.say(&format!("Imported {} as note {}", source.display(), id)),
            None => console.say(&format!("{} is empty, nothing imported", source.display())),
        }
        Ok(())
    }

    fn export_note<R: BufRead, W: Write>(
        &mut self,
        id: i64,
        output: PathBuf,
        console: &mut Console<R, W>,
    ) -> Result<()> {
        let entry = self.entry_for(id)?;
        self.session.load(&entry, console)?;

        // The new path is remembered on the note through autosave
        self.session.set_file_path(Some(output.clone()))?;
        self.session.save_file(console)?;

        console.say(&format!("Note {} written to {}", id, output.display()));
        Ok(())
    }

    fn backup<R: BufRead, W: Write>(
        &mut self,
        output: Option<PathBuf>,
        console: &mut Console<R, W>,
    ) -> Result<()> {
        match output {
            Some(target) => {
                self.session.store().backup_to(&target)?;
                console.say(&format!("Database backed up to {}", target.display()));
            }
            None => {
                if !self.session.backup(console)? {
                    console.say("Backup cancelled.");
                }
            }
        }
        Ok(())
    }

    fn replace<R: BufRead, W: Write>(
        &mut self,
        source: &Path,
        force: bool,
        console: &mut Console<R, W>,
    ) -> Result<()> {
        if !force {
            let question = format!(
                "Replace the current database with {}? All current notes will be lost.",
                source.display()
            );
            if !console.ask_yes_no(&question) {
                console.say("Replace cancelled.");
                return Ok(());
            }
        }

        self.session.replace_database(source)?;
        console.say("Database replaced.");
        Ok(())
    }

    fn handle_config<R: BufRead, W: Write>(
        &mut self,
        show: bool,
        reset: bool,
        console: &mut Console<R, W>,
    ) -> Result<()> {
        if reset {
            self.config = Config {
                profile_dir: self.config.profile_dir.clone(),
                ..Config::default()
            };
            let path = self.config.save()?;
            console.say(&format!("Configuration reset: {}", path.display()));
        }

        if show || !reset {
            console.say(&serde_json::to_string_pretty(&self.config)?);
        }
        Ok(())
    }

    /// Selector entry for a stored note
    fn entry_for(&self, id: i64) -> Result<SourceEntry> {
        self.session
            .entries()?
            .into_iter()
            .find(|entry| matches!(entry, SourceEntry::Record { id: found, .. } if *found == id))
            .ok_or(YkError::NoteNotFound { id })
    }

    fn read_content_from_file(&self, file_path: &Path) -> Result<String> {
        if !file_path.exists() {
            return Err(YkError::FileNotFound {
                file_path: file_path.display().to_string(),
            });
        }
        Ok(read_to_string(file_path)?)
    }

    fn open_editor_with_content(&self, existing_content: &str) -> Result<String> {
        let temp_file = Builder::new().suffix(".txt").tempfile()?;
        std::fs::write(temp_file.path(), existing_content)?;

        let editor_cmd = self.config.get_editor_command();
        info!("Opening editor to write note content. Save and exit when done...");
        self.launch_editor(&editor_cmd, temp_file.path())?;

        Ok(read_to_string(temp_file.path())?)
    }

    fn launch_editor(&self, editor_cmd: &str, file_path: &Path) -> Result<()> {
        let args = split(editor_cmd).map_err(|e| YkError::EditorError {
            message: format!("Failed to parse editor command: {}", e),
        })?;

        let Some((program, extra_args)) = args.split_first() else {
            return Err(YkError::EditorError {
                message: "Empty editor command".to_string(),
            });
        };

        let status = Command::new(program)
            .args(extra_args)
            .arg(file_path)
            .status()?;

        if !status.success() {
            return Err(YkError::EditorError {
                message: "Editor exited with non-zero status".to_string(),
            });
        }

        Ok(())
    }
}

fn preview(text: &str, max_len: usize) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    if first_line.chars().count() > max_len {
        format!("{}...", first_line.chars().take(max_len).collect::<String>())
    } else {
        first_line.to_string()
    }
}
