//! Terminal front-end: argument parsing, prompts and the interactive session.
mod app;
mod args;
mod repl;
mod terminal;

pub use app::*;
pub use args::*;
pub use repl::*;
pub use terminal::*;
