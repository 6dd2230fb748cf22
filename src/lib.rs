//! Note-taking library backed by SQLite and plain text files
//!
//! This library keeps an editor buffer in sync with either a stored note, a
//! text file, or a new unsaved note, and prompts through a [`Shell`] before
//! unsaved content would be lost.

mod cli;
mod config;
mod errors;
mod file_io;
mod note;
mod session;
mod shell;
mod storage;
mod types;

// Re-export key components
pub use cli::*;
pub use config::*;
pub use errors::*;
pub use file_io::*;
pub use note::*;
pub use session::*;
pub use shell::*;
pub use storage::*;
pub use types::*;
