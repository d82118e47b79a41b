/// Line that terminates a saved log. Lines after it are never read.
pub const SENTINEL: &str = "end";

/// Ordered canonical commands that rebuild the current tree when replayed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryLog {
    entries: Vec<String>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The on-disk form: one entry per line, then the sentinel.
    pub fn to_save_string(&self) -> String {
        self.entries
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(SENTINEL))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Lines of a saved log up to, not including, the sentinel.
pub fn replay_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .take_while(|line| line.trim_end_matches('\r') != SENTINEL)
}
