use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;
use crate::persistence::DEFAULT_LOAD_FILE;

/// An in-memory filesystem driven by tagged commands.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// Directory holding saved command logs
    #[clap(long, short, default_value = ".")]
    pub root: PathBuf,

    /// Command log replayed at startup
    #[clap(long, default_value = DEFAULT_LOAD_FILE)]
    pub startup: String,

    /// Start from an empty filesystem
    #[clap(long)]
    pub no_startup: bool,
}
