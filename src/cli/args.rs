use std::path::PathBuf;

use clap::Parser;

use crate::Commands;

/// Main CLI application arguments and command structure
#[derive(Parser, Debug)]
#[clap(
    name = "ykpen",
    version,
    about = "Note-taking application backed by SQLite and plain text files"
)]
pub struct Cli {
    /// Path to the configuration file
    #[clap(short = 'c', long, value_parser)]
    pub config: Option<PathBuf>,

    /// Directory holding the database and configuration
    #[clap(long, value_parser)]
    pub profile_dir: Option<PathBuf>,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands for the ykpen application
    #[clap(subcommand)]
    pub command: Commands,
}
