use crate::persistence::LogFile;

use super::error::CommandError;

/// Something the session cannot do on its own and hands back to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `certain` skips the overwrite confirmation for an existing file.
    Save { file: LogFile, certain: bool },
    Load { file: LogFile },
    /// Terminate, saving to `save` first when given.
    Exit { save: Option<LogFile> },
}

/// Everything one executed command produced.
#[derive(Debug, Default)]
pub struct Outcome {
    pub messages: Vec<String>,
    pub errors: Vec<CommandError>,
    pub request: Option<Request>,
}

impl Outcome {
    pub(super) fn say(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub(super) fn fail(&mut self, error: impl Into<CommandError>) {
        self.errors.push(error.into());
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Yes/no and free-text questions asked in the middle of a command.
pub trait Prompt {
    fn confirm(&mut self, question: &str) -> bool;
    fn ask(&mut self, question: &str) -> Option<String>;
}

/// Answers no to everything. Used while replaying a log.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decline;

impl Prompt for Decline {
    fn confirm(&mut self, _question: &str) -> bool {
        false
    }

    fn ask(&mut self, _question: &str) -> Option<String> {
        None
    }
}
