//! Terminal implementation of the dialog primitives.
use std::{
    io::{stdin, stdout, BufRead, StdinLock, Stdout, Write},
    path::{Path, PathBuf},
};

use console::style;
use log::warn;

use crate::{Choice, FileFilter, Shell, UnsavedReason};

/// Line-oriented prompts over any reader/writer pair
pub struct Console<R, W> {
    input: R,
    output: W,
    /// Relative paths typed at a prompt are resolved against this directory
    dialog_dir: PathBuf,
}

impl Console<StdinLock<'static>, Stdout> {
    pub fn stdio(dialog_dir: impl Into<PathBuf>) -> Self {
        Console::new(stdin().lock(), stdout(), dialog_dir)
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W, dialog_dir: impl Into<PathBuf>) -> Self {
        Self {
            input,
            output,
            dialog_dir: dialog_dir.into(),
        }
    }

    /// Reads one line without its terminator; `None` once input is exhausted
    pub fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                let trimmed = line.trim_end_matches(['\n', '\r']).len();
                line.truncate(trimmed);
                Some(line)
            }
            Err(e) => {
                warn!("Failed to read from input: {}", e);
                None
            }
        }
    }

    /// Prints `question` and reads the answer
    pub fn prompt(&mut self, question: &str) -> Option<String> {
        self.print(&format!("{} ", style(question).bold()), false);
        self.read_line()
    }

    pub fn say(&mut self, message: &str) {
        self.print(message, true);
    }

    fn print(&mut self, message: &str, newline: bool) {
        let written = if newline {
            writeln!(self.output, "{}", message)
        } else {
            write!(self.output, "{}", message)
        };
        if let Err(e) = written.and_then(|_| self.output.flush()) {
            warn!("Failed to write to output: {}", e);
        }
    }

    fn resolve(&self, answer: &str) -> PathBuf {
        let path = PathBuf::from(answer);
        if path.is_relative() {
            self.dialog_dir.join(path)
        } else {
            path
        }
    }

    /// Consumes the console, handing back the writer
    pub fn into_output(self) -> W {
        self.output
    }
}

fn filter_hint(filter: FileFilter) -> String {
    filter
        .extensions()
        .iter()
        .map(|ext| format!("*.{}", ext))
        .collect::<Vec<_>>()
        .join(", ")
}

impl<R: BufRead, W: Write> Shell for Console<R, W> {
    fn open_dialog(&mut self, filter: FileFilter) -> Option<PathBuf> {
        let question = format!("File to open ({}), empty to cancel:", filter_hint(filter));
        let answer = self.prompt(&question)?;
        let answer = answer.trim();
        if answer.is_empty() {
            return None;
        }
        Some(self.resolve(answer))
    }

    fn save_dialog(&mut self, suggested: &Path, filter: FileFilter) -> Option<PathBuf> {
        let question = format!(
            "Save as ({}) [suggested: {}], empty to cancel:",
            filter_hint(filter),
            suggested.display()
        );
        let answer = self.prompt(&question)?;
        let answer = answer.trim();
        if answer.is_empty() {
            return None;
        }
        let mut path = self.resolve(answer);
        if path.extension().is_none() {
            path.set_extension(filter.extensions()[0]);
        }
        Some(path)
    }

    fn ask_unsaved(&mut self, reason: UnsavedReason) -> Choice {
        let message = match reason {
            UnsavedReason::NewNote => "This note has not been saved to the database.",
            UnsavedReason::FileNotSaved => "This text has not been saved as a file.",
            UnsavedReason::FileModified => "The file has been modified.",
        };
        self.say(&style(message).yellow().to_string());

        loop {
            let Some(answer) = self.prompt("[s]ave, [d]iscard or [c]ancel?") else {
                return Choice::Cancel;
            };
            match answer.trim().to_lowercase().as_str() {
                "s" | "save" => return Choice::Save,
                "d" | "discard" => return Choice::Discard,
                "c" | "cancel" => return Choice::Cancel,
                _ => self.say("Please answer s, d or c."),
            }
        }
    }

    fn ask_yes_no(&mut self, question: &str) -> bool {
        match self.prompt(&format!("{} [y/N]", question)) {
            Some(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            None => false,
        }
    }

    fn show_message(&mut self, message: &str) {
        self.say(message);
    }
}
