//! Saved state is the ordered list of commands that rebuilt the tree,
//! written one per line and closed by a sentinel line.

mod history_log;
mod log_store;

pub use history_log::{HistoryLog, replay_lines};
pub use log_store::{DEFAULT_LOAD_FILE, LogFile, LogStore, PersistenceError};
