//! Interactive editing session on the terminal.
//!
//! Each input line is one command; the session reacts exactly as the editor
//! window would to the matching widget event.
use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use console::style;
use log::{error, info, warn};

use crate::{Console, NoteSession, Result, SessionState, Shell, SourceEntry};

const HELP: &str = "\
Commands:
  list                 show the source selector
  select <n|new|file>  switch to an entry of the selector
  show                 print the buffer
  title <text>         set the title
  text [<text>]        set the body (without argument: read lines until a lone '.')
  append <text>        add a line to the body
  path [<file>]        set or clear the file path
  open [<file>]        open a text file
  save-file            write the buffer to its file
  save                 save the buffer into the database
  remove               delete the current note
  backup               copy the database to a file
  replace              replace the database with another file
  quit                 leave the session";

/// A parsed session command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Help,
    List,
    Select(Selection),
    Show,
    Title(String),
    /// `None` reads a multi-line body
    Text(Option<String>),
    Append(String),
    Path(Option<PathBuf>),
    Open(Option<PathBuf>),
    SaveFile,
    Save,
    Remove,
    Backup,
    Replace,
    Quit,
}

/// Target of a `select` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    New,
    File,
    /// Position in the `list` output
    Index(usize),
}

impl SessionCommand {
    /// Parses one input line; blank lines yield `Ok(None)`
    pub fn parse(line: &str) -> std::result::Result<Option<Self>, String> {
        let words = shell_words::split(line).map_err(|e| e.to_string())?;
        let Some((name, args)) = words.split_first() else {
            return Ok(None);
        };
        let rest = || args.join(" ");

        let command = match name.as_str() {
            "help" | "?" => SessionCommand::Help,
            "list" | "ls" => SessionCommand::List,
            "select" | "sel" => {
                let target = args.first().ok_or("select needs an entry")?;
                let selection = match target.to_lowercase().as_str() {
                    "new" => Selection::New,
                    "file" => Selection::File,
                    other => Selection::Index(
                        other
                            .parse()
                            .map_err(|_| format!("not an entry number: {}", other))?,
                    ),
                };
                SessionCommand::Select(selection)
            }
            "show" => SessionCommand::Show,
            "title" => SessionCommand::Title(rest()),
            "text" if args.is_empty() => SessionCommand::Text(None),
            "text" => SessionCommand::Text(Some(rest())),
            "append" => SessionCommand::Append(rest()),
            "path" => SessionCommand::Path(args.first().map(PathBuf::from)),
            "open" => SessionCommand::Open(args.first().map(PathBuf::from)),
            "save-file" => SessionCommand::SaveFile,
            "save" => SessionCommand::Save,
            "remove" => SessionCommand::Remove,
            "backup" => SessionCommand::Backup,
            "replace" => SessionCommand::Replace,
            "quit" | "exit" => SessionCommand::Quit,
            other => return Err(format!("unknown command: {} (try 'help')", other)),
        };
        Ok(Some(command))
    }
}

/// Runs the interactive loop until `quit` is confirmed or input ends
pub fn run_session<R: BufRead, W: Write>(
    session: &mut NoteSession,
    console: &mut Console<R, W>,
) -> Result<()> {
    info!("Interactive session started");
    console.say("Type 'help' for a list of commands.");

    loop {
        let prompt = format!("ykpen [{}]>", session.active_entry());
        let Some(line) = console.prompt(&prompt) else {
            if !session.close(console)? {
                warn!("Input closed with unsaved changes");
            }
            break;
        };

        let command = match SessionCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                console.say(&style(message).red().to_string());
                continue;
            }
        };

        if command == SessionCommand::Quit {
            if session.close(console)? {
                break;
            }
            continue;
        }

        // Failures are reported and the session carries on, like a dialog would
        if let Err(e) = execute(session, console, command) {
            error!("Command failed: {}", e);
            console.show_message(&style(format!("Error: {}", e)).red().to_string());
        }
    }

    info!("Interactive session ended");
    Ok(())
}

fn execute<R: BufRead, W: Write>(
    session: &mut NoteSession,
    console: &mut Console<R, W>,
    command: SessionCommand,
) -> Result<()> {
    match command {
        SessionCommand::Help => console.say(HELP),
        SessionCommand::List => {
            let active = session.active_entry();
            for (index, entry) in session.entries()?.iter().enumerate() {
                let marker = if *entry == active { "*" } else { " " };
                console.say(&format!("{} {:>3}  {}", marker, index, entry));
            }
        }
        SessionCommand::Select(selection) => {
            let entry = match selection {
                Selection::New => SourceEntry::New,
                Selection::File => SourceEntry::File,
                Selection::Index(index) => match session.entries()?.into_iter().nth(index) {
                    Some(entry) => entry,
                    None => {
                        console.say(&format!("No entry {}", index));
                        return Ok(());
                    }
                },
            };
            if !session.load(&entry, console)? {
                console.show_message("Cancelled.");
            }
        }
        SessionCommand::Show => show_buffer(session, console),
        SessionCommand::Title(title) => session.set_title(title)?,
        SessionCommand::Text(Some(text)) => session.set_text(text)?,
        SessionCommand::Text(None) => {
            console.say("Enter the body, finish with a line containing only '.'");
            let mut lines = Vec::new();
            while let Some(line) = console.read_line() {
                if line == "." {
                    break;
                }
                lines.push(line);
            }
            session.set_text(lines.join("\n"))?;
        }
        SessionCommand::Append(line) => {
            let text = match session.buffer().text.as_str() {
                "" => line,
                existing => format!("{}\n{}", existing, line),
            };
            session.set_text(text)?;
        }
        SessionCommand::Path(path) => session.set_file_path(path)?,
        SessionCommand::Open(Some(path)) => {
            if !session.open_path(&path, console)? {
                console.show_message("Cancelled.");
            }
        }
        SessionCommand::Open(None) => {
            if !session.open_file(console)? {
                console.show_message("Cancelled.");
            }
        }
        SessionCommand::SaveFile => {
            if !session.save_file(console)? {
                console.show_message("Cancelled.");
            }
        }
        SessionCommand::Save => match session.save_to_store()? {
            Some(id) => console.say(&format!("Saved as note {}", id)),
            None => console.say("Nothing to save."),
        },
        SessionCommand::Remove => {
            if !session.remove()? {
                console.show_message("Only stored notes can be removed.");
            }
        }
        SessionCommand::Backup => {
            if !session.backup(console)? {
                console.show_message("Cancelled.");
            }
        }
        SessionCommand::Replace => {
            if !session.replace(console)? {
                console.show_message("Cancelled.");
            }
        }
        // Handled by the loop
        SessionCommand::Quit => {}
    }
    Ok(())
}

fn show_buffer<R: BufRead, W: Write>(session: &NoteSession, console: &mut Console<R, W>) {
    let buffer = session.buffer();
    let status = match session.state() {
        SessionState::New { dirty: true } | SessionState::File { dirty: true } => " (unsaved)",
        _ => "",
    };

    console.say(&format!(
        "{}{}",
        style(&buffer.title).bold(),
        style(status).yellow()
    ));
    if let Some(created) = &buffer.creation_time {
        console.say(&format!("Created at {}", created));
    }
    if let Some(modified) = &buffer.last_modified_time {
        console.say(&format!("Last modified at {}", modified));
    }
    if let Some(path) = &buffer.file_path {
        console.say(&format!("File: {}", path.display()));
    }
    console.say("");
    console.say(&buffer.text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NoteStore;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_parse_commands() {
        assert_eq!(SessionCommand::parse("   ").unwrap(), None);
        assert_eq!(
            SessionCommand::parse("select 3").unwrap(),
            Some(SessionCommand::Select(Selection::Index(3)))
        );
        assert_eq!(
            SessionCommand::parse("select New").unwrap(),
            Some(SessionCommand::Select(Selection::New))
        );
        assert_eq!(
            SessionCommand::parse("title \"Shopping list\" today").unwrap(),
            Some(SessionCommand::Title("Shopping list today".to_string()))
        );
        assert_eq!(SessionCommand::parse("text").unwrap(), Some(SessionCommand::Text(None)));
        assert_eq!(SessionCommand::parse("path").unwrap(), Some(SessionCommand::Path(None)));
        assert!(SessionCommand::parse("select").is_err());
        assert!(SessionCommand::parse("select two").is_err());
        assert!(SessionCommand::parse("frobnicate").is_err());
    }

    #[test]
    fn test_session_stores_note_and_quits() {
        let tmp = TempDir::new().unwrap();
        let store = NoteStore::open(tmp.path().join("notes.db")).unwrap();
        let mut session = NoteSession::new(store, tmp.path());

        let script = "title Groceries\ntext\neggs\nmilk\n.\nselect new\nlist\nquit\n";
        let mut console = Console::new(Cursor::new(script.as_bytes().to_vec()), Vec::new(), tmp.path());
        run_session(&mut session, &mut console).unwrap();

        let listed = session.store().list_ids_and_creation_times().unwrap();
        assert_eq!(listed.len(), 1);
        let record = session.store().read(listed[0].0).unwrap();
        assert_eq!(record.title, "Groceries");
        assert_eq!(record.text, "eggs\nmilk");
        assert_eq!(session.state(), SessionState::New { dirty: false });

        let output = String::from_utf8(console.into_output()).unwrap();
        assert!(output.contains(&listed[0].1));
    }

    #[test]
    fn test_quit_with_dirty_note_can_be_cancelled() {
        let tmp = TempDir::new().unwrap();
        let store = NoteStore::open(tmp.path().join("notes.db")).unwrap();
        let mut session = NoteSession::new(store, tmp.path());

        // body without title stays unsaved; first quit is cancelled, second saves
        let script = "text draft only\nquit\nc\nquit\ns\n";
        let mut console = Console::new(Cursor::new(script.as_bytes().to_vec()), Vec::new(), tmp.path());
        run_session(&mut session, &mut console).unwrap();

        let listed = session.store().list_ids_and_creation_times().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(session.store().read(listed[0].0).unwrap().text, "draft only");
    }

    #[test]
    fn test_cancelled_dialog_and_failed_open_are_reported() {
        let tmp = TempDir::new().unwrap();
        let store = NoteStore::open(tmp.path().join("notes.db")).unwrap();
        let mut session = NoteSession::new(store, tmp.path());

        // empty answer cancels the backup dialog; the open target does not exist
        let script = "backup

open nowhere.txt
quit
";
        let mut console = Console::new(Cursor::new(script.as_bytes().to_vec()), Vec::new(), tmp.path());
        run_session(&mut session, &mut console).unwrap();

        let output = String::from_utf8(console.into_output()).unwrap();
        assert!(output.contains("Cancelled."));
        assert!(output.contains("Error: File not found: nowhere.txt"));
        assert!(session.store().list_ids_and_creation_times().unwrap().is_empty());
    }
}
