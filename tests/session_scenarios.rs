use std::{
    collections::VecDeque,
    fs,
    path::{Path, PathBuf},
};

use tempfile::TempDir;
use ykpen::{
    Buffer, Choice, FileFilter, NoteSession, NoteStore, SessionState, Shell, SourceEntry,
    UnsavedReason, YkError,
};

/// Replays prepared answers and records every question asked
#[derive(Default)]
struct ScriptedShell {
    choices: VecDeque<Choice>,
    open_paths: VecDeque<Option<PathBuf>>,
    save_paths: VecDeque<Option<PathBuf>>,
    yes_no: VecDeque<bool>,
    asked: Vec<UnsavedReason>,
    suggestions: Vec<PathBuf>,
    messages: Vec<String>,
}

impl Shell for ScriptedShell {
    fn open_dialog(&mut self, _filter: FileFilter) -> Option<PathBuf> {
        self.open_paths.pop_front().flatten()
    }

    fn save_dialog(&mut self, suggested: &Path, _filter: FileFilter) -> Option<PathBuf> {
        self.suggestions.push(suggested.to_path_buf());
        self.save_paths.pop_front().flatten()
    }

    fn ask_unsaved(&mut self, reason: UnsavedReason) -> Choice {
        self.asked.push(reason);
        self.choices
            .pop_front()
            .expect("unexpected unsaved-changes prompt")
    }

    fn ask_yes_no(&mut self, _question: &str) -> bool {
        self.yes_no.pop_front().unwrap_or(false)
    }

    fn show_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

fn new_session(tmp: &TempDir) -> NoteSession {
    let store = NoteStore::open(tmp.path().join("YKPen_database.db")).unwrap();
    NoteSession::new(store, tmp.path())
}

fn record_entries(session: &NoteSession) -> Vec<SourceEntry> {
    session
        .entries()
        .unwrap()
        .into_iter()
        .filter(|entry| matches!(entry, SourceEntry::Record { .. }))
        .collect()
}

#[test]
fn test_new_note_autosaves_and_new_entry_is_empty() {
    let tmp = TempDir::new().unwrap();
    let mut session = new_session(&tmp);
    let mut shell = ScriptedShell::default();

    session.set_title("A").unwrap();
    session.set_text("hi").unwrap();

    let records = record_entries(&session);
    assert_eq!(records.len(), 1);
    let SourceEntry::Record { id, label } = &records[0] else {
        unreachable!()
    };
    assert_eq!(session.state(), SessionState::Record { id: *id });
    assert_eq!(session.store().read(*id).unwrap().creation_time, *label);

    assert!(session.load(&SourceEntry::New, &mut shell).unwrap());
    assert_eq!(session.buffer(), &Buffer::default());
    assert_eq!(session.state(), SessionState::New { dirty: false });
    assert!(shell.asked.is_empty());
}

#[test]
fn test_record_edit_is_persisted_without_prompt() {
    let tmp = TempDir::new().unwrap();
    let mut session = new_session(&tmp);
    let mut shell = ScriptedShell::default();

    let id = session
        .store()
        .insert("Stored", "before", "2024-05-05 05:05:05", None, None)
        .unwrap();
    let entry = record_entries(&session).remove(0);

    assert!(session.load(&entry, &mut shell).unwrap());
    assert_eq!(session.buffer().text, "before");
    // populating the buffer is not an edit
    assert_eq!(session.store().read(id).unwrap().last_modified_time, None);

    session.set_text("after").unwrap();
    let record = session.store().read(id).unwrap();
    assert_eq!(record.text, "after");
    assert_eq!(record.creation_time, "2024-05-05 05:05:05");
    assert!(record.last_modified_time.is_some());

    assert!(session.load(&SourceEntry::New, &mut shell).unwrap());
    assert!(shell.asked.is_empty());
}

#[test]
fn test_deleted_file_forces_prompt_before_switch() {
    let tmp = TempDir::new().unwrap();
    let mut session = new_session(&tmp);
    let mut shell = ScriptedShell::default();

    let path = tmp.path().join("notes.txt");
    fs::write(&path, "content").unwrap();
    assert!(session.open_path(&path, &mut shell).unwrap());
    assert_eq!(session.state(), SessionState::File { dirty: false });

    fs::remove_file(&path).unwrap();
    session.set_text("content, edited").unwrap();

    shell.choices.push_back(Choice::Cancel);
    assert!(!session.load(&SourceEntry::New, &mut shell).unwrap());
    assert_eq!(shell.asked, vec![UnsavedReason::FileNotSaved]);
    assert_eq!(session.buffer().text, "content, edited");

    shell.choices.push_back(Choice::Save);
    assert!(session.load(&SourceEntry::New, &mut shell).unwrap());
    assert_eq!(fs::read_to_string(&path).unwrap(), "content, edited");
    assert_eq!(session.state(), SessionState::New { dirty: false });
}

#[test]
fn test_missing_file_prompts_even_without_edit() {
    let tmp = TempDir::new().unwrap();
    let mut session = new_session(&tmp);
    let mut shell = ScriptedShell::default();

    let path = tmp.path().join("vanishing.txt");
    fs::write(&path, "x").unwrap();
    session.open_path(&path, &mut shell).unwrap();
    fs::remove_file(&path).unwrap();

    shell.choices.push_back(Choice::Discard);
    assert!(session.load(&SourceEntry::New, &mut shell).unwrap());
    assert_eq!(shell.asked, vec![UnsavedReason::FileNotSaved]);
    assert!(!path.exists());
}

#[test]
fn test_modified_file_save_writes_in_place() {
    let tmp = TempDir::new().unwrap();
    let mut session = new_session(&tmp);
    let mut shell = ScriptedShell::default();

    let path = tmp.path().join("todo.htm");
    fs::write(&path, "<p>one</p>").unwrap();
    session.open_path(&path, &mut shell).unwrap();
    assert_eq!(session.buffer().title, "todo");

    session.set_text("<p>one</p><p>two</p>").unwrap();
    assert_eq!(session.state(), SessionState::File { dirty: true });

    let id = session
        .store()
        .insert("Other", "note", "2024-01-01 00:00:00", None, None)
        .unwrap();
    shell.choices.push_back(Choice::Save);
    let entry = record_entries(&session).remove(0);
    assert!(session.load(&entry, &mut shell).unwrap());

    assert_eq!(shell.asked, vec![UnsavedReason::FileModified]);
    assert_eq!(fs::read_to_string(&path).unwrap(), "<p>one</p><p>two</p>");
    assert_eq!(session.state(), SessionState::Record { id });
    assert_eq!(session.buffer().text, "note");
}

#[test]
fn test_selecting_file_keeps_open_file_session() {
    let tmp = TempDir::new().unwrap();
    let mut session = new_session(&tmp);
    let mut shell = ScriptedShell::default();

    let path = tmp.path().join("keep.txt");
    fs::write(&path, "kept").unwrap();
    session.open_path(&path, &mut shell).unwrap();
    session.set_text("kept and changed").unwrap();

    assert!(session.load(&SourceEntry::File, &mut shell).unwrap());
    assert_eq!(session.state(), SessionState::File { dirty: true });
    assert_eq!(session.buffer().text, "kept and changed");
    assert!(shell.asked.is_empty());
}

#[test]
fn test_open_then_save_reproduces_bytes() {
    let tmp = TempDir::new().unwrap();
    let mut session = new_session(&tmp);
    let mut shell = ScriptedShell::default();

    let path = tmp.path().join("bytes.txt");
    let original = "tabs\tand\r\nwindows endings\r\nunicode: żółw\n";
    fs::write(&path, original).unwrap();

    shell.open_paths.push_back(Some(path.clone()));
    assert!(session.open_file(&mut shell).unwrap());
    assert!(session.save_file(&mut shell).unwrap());

    assert_eq!(fs::read(&path).unwrap(), original.as_bytes());
    assert!(shell.suggestions.is_empty());
}

#[test]
fn test_new_note_saved_as_file_becomes_file_session() {
    let tmp = TempDir::new().unwrap();
    let mut session = new_session(&tmp);
    let mut shell = ScriptedShell::default();

    session.set_text("untitled body").unwrap();
    let target = tmp.path().join("out.txt");
    shell.save_paths.push_back(Some(target.clone()));

    assert!(session.save_file(&mut shell).unwrap());
    assert_eq!(shell.suggestions, vec![tmp.path().join("")]);
    assert_eq!(session.state(), SessionState::File { dirty: false });
    assert_eq!(session.buffer().file_path, Some(target.clone()));
    assert_eq!(fs::read_to_string(&target).unwrap(), "untitled body");

    // nothing pending, so leaving does not prompt
    assert!(session.load(&SourceEntry::New, &mut shell).unwrap());
    assert!(shell.asked.is_empty());
}

#[test]
fn test_open_file_guards_unsaved_new_note() {
    let tmp = TempDir::new().unwrap();
    let mut session = new_session(&tmp);
    let mut shell = ScriptedShell::default();

    let path = tmp.path().join("incoming.txt");
    fs::write(&path, "incoming").unwrap();
    session.set_text("precious").unwrap();

    shell.choices.push_back(Choice::Cancel);
    assert!(!session.open_path(&path, &mut shell).unwrap());
    assert_eq!(session.buffer().text, "precious");

    shell.choices.push_back(Choice::Save);
    assert!(session.open_path(&path, &mut shell).unwrap());
    assert_eq!(session.buffer().text, "incoming");
    assert_eq!(record_entries(&session).len(), 1);
}

#[test]
fn test_remove_deletes_record_and_resets() {
    let tmp = TempDir::new().unwrap();
    let mut session = new_session(&tmp);
    let mut shell = ScriptedShell::default();

    session.store().insert("a", "1", "t1", None, None).unwrap();
    let entry = record_entries(&session).remove(0);
    session.load(&entry, &mut shell).unwrap();

    assert!(session.remove().unwrap());
    assert!(record_entries(&session).is_empty());
    assert_eq!(session.buffer(), &Buffer::default());
}

#[test]
fn test_backup_then_replace_restores_notes() {
    let tmp = TempDir::new().unwrap();
    let mut session = new_session(&tmp);
    let mut shell = ScriptedShell::default();

    session.set_title("Before backup").unwrap();
    session.set_text("kept").unwrap();

    let backup = tmp.path().join("saved.db");
    shell.save_paths.push_back(Some(backup.clone()));
    assert!(session.backup(&mut shell).unwrap());
    assert_eq!(
        shell.suggestions,
        vec![tmp.path().join("YKPen_database_backup.db")]
    );
    assert_eq!(
        shell.messages,
        vec![format!("Database backed up to {}", backup.display())]
    );

    session.set_text("changed after backup").unwrap();

    // declined confirmation leaves everything alone
    shell.open_paths.push_back(Some(backup.clone()));
    shell.yes_no.push_back(false);
    assert!(!session.replace(&mut shell).unwrap());
    assert!(matches!(session.state(), SessionState::Record { .. }));

    shell.open_paths.push_back(Some(backup.clone()));
    shell.yes_no.push_back(true);
    assert!(session.replace(&mut shell).unwrap());
    assert_eq!(session.state(), SessionState::New { dirty: false });
    let database = tmp.path().join("YKPen_database.db");
    assert_eq!(session.store().database_path(), database.as_path());
    assert_eq!(
        shell.messages.last().unwrap(),
        &format!("{} replaced with {}", database.display(), backup.display())
    );

    let entry = record_entries(&session).remove(0);
    session.load(&entry, &mut shell).unwrap();
    assert_eq!(session.buffer().text, "kept");
}

#[test]
fn test_close_with_unwritten_file_waits_for_successful_save() {
    let tmp = TempDir::new().unwrap();
    let mut session = new_session(&tmp);
    let mut shell = ScriptedShell::default();

    let path = tmp.path().join("draft.txt");
    fs::write(&path, "draft").unwrap();
    session.open_path(&path, &mut shell).unwrap();
    session.set_file_path(None).unwrap();

    shell.choices.push_back(Choice::Save);
    shell.save_paths.push_back(None);
    assert!(!session.close(&mut shell).unwrap());

    shell.choices.push_back(Choice::Save);
    shell.save_paths.push_back(Some(tmp.path().join("final.txt")));
    assert!(session.close(&mut shell).unwrap());
    assert_eq!(
        fs::read_to_string(tmp.path().join("final.txt")).unwrap(),
        "draft"
    );
}

#[test]
fn test_reopening_saved_file_shows_saved_text() {
    let tmp = TempDir::new().unwrap();
    let mut session = new_session(&tmp);
    let mut shell = ScriptedShell::default();

    let path = tmp.path().join("a.txt");
    fs::write(&path, "old").unwrap();
    assert!(session.open_path(&path, &mut shell).unwrap());
    session.set_text("new").unwrap();

    shell.choices.push_back(Choice::Save);
    assert!(session.open_path(&path, &mut shell).unwrap());

    assert_eq!(shell.asked, vec![UnsavedReason::FileModified]);
    assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    assert_eq!(session.buffer().text, "new");
    assert_eq!(session.state(), SessionState::File { dirty: false });
}

#[test]
fn test_open_missing_path_changes_nothing() {
    let tmp = TempDir::new().unwrap();
    let mut session = new_session(&tmp);
    let mut shell = ScriptedShell::default();

    session.set_text("precious").unwrap();
    let err = session
        .open_path(&tmp.path().join("absent.txt"), &mut shell)
        .unwrap_err();

    assert!(matches!(err, YkError::FileNotFound { .. }));
    assert!(shell.asked.is_empty());
    assert_eq!(session.buffer().text, "precious");
    assert_eq!(session.state(), SessionState::New { dirty: true });
}

#[test]
fn test_failed_save_keeps_file_unsaved() {
    let tmp = TempDir::new().unwrap();
    let mut session = new_session(&tmp);
    let mut shell = ScriptedShell::default();

    let path = tmp.path().join("draft.txt");
    fs::write(&path, "draft").unwrap();
    session.open_path(&path, &mut shell).unwrap();
    session.set_text("edited").unwrap();
    let unreachable = tmp.path().join("missing_dir").join("x.txt");
    session.set_file_path(Some(unreachable.clone())).unwrap();

    shell.choices.push_back(Choice::Save);
    let err = session.load(&SourceEntry::New, &mut shell).unwrap_err();

    assert!(matches!(err, YkError::Io(_)));
    assert_eq!(session.state(), SessionState::File { dirty: true });
    assert_eq!(session.buffer().text, "edited");
    assert_eq!(session.buffer().file_path, Some(unreachable));
    assert_eq!(fs::read_to_string(&path).unwrap(), "draft");
}
