use std::path::PathBuf;

use crate::cli::Cli;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Directory holding saved command logs.
    pub root: PathBuf,
    /// Log replayed before the first prompt, if any.
    pub startup: Option<String>,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            root: cli.root,
            startup: (!cli.no_startup).then_some(cli.startup),
        }
    }
}
