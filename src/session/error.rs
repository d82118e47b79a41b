use derive_more::Display;
use snafu::Snafu;

use crate::filesystem::{NavigationError, NodeKindTag, TreeError};
use crate::grammar::SanitizeError;
use crate::persistence::PersistenceError;
use crate::session::{Augment, Command};

/// Coarse classification of every recoverable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ErrorKind {
    #[display("not found")]
    NotFound,
    #[display("validation")]
    Validation,
    #[display("no context")]
    NoContext,
    #[display("io")]
    Io,
    #[display("dangling alias")]
    DanglingAlias,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CommandError {
    #[snafu(display("Command syntax is invalid: {}", source))]
    SyntaxError { source: SanitizeError },
    #[snafu(display("Argument in input has not been prefixed with a tag"))]
    UntaggedArgumentError,
    #[snafu(display("Command {} not recognised", keyword))]
    UnknownCommandError { keyword: String },
    #[snafu(display("Augment !{} not recognised", augment))]
    UnknownAugmentError { augment: String },
    #[snafu(display("Augment !{} has no effect on {}", augment, command))]
    UnsupportedAugmentError { augment: Augment, command: Command },
    #[snafu(display("{} requires {} argument", command, argument))]
    MissingArgumentError {
        command: Command,
        argument: &'static str,
    },
    #[snafu(display("Cannot pass an empty string as a name"))]
    EmptyNameError,
    #[snafu(display("Objects {} not found", names.join(", ")))]
    NotFoundError { names: Vec<String> },
    #[snafu(display("{} {} is not a file", kind, name))]
    NotAFileError { name: String, kind: NodeKindTag },
    #[snafu(display("{} does not lead to an existing object", address))]
    InvalidAddressError { address: String },
    #[snafu(display("Clipboard is empty"))]
    EmptyClipboardError,
    #[snafu(display("A copied object no longer exists"))]
    DanglingClipboardError,
    #[snafu(display("No matches found for \"{}\" within {}", needle, folder))]
    NoMatchesError { needle: String, folder: String },
    #[snafu(display("Help keyword {} not recognised", topic))]
    UnknownTopicError { topic: String },
    #[snafu(transparent)]
    NavigationError { source: NavigationError },
    #[snafu(transparent)]
    TreeError { source: TreeError },
    #[snafu(transparent)]
    PersistenceError { source: PersistenceError },
}

impl CommandError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommandError::NotFoundError { .. } | CommandError::NoMatchesError { .. } => {
                ErrorKind::NotFound
            }
            CommandError::DanglingClipboardError => ErrorKind::DanglingAlias,
            CommandError::NavigationError { source } => source.kind(),
            CommandError::TreeError { source } => source.kind(),
            CommandError::PersistenceError { source } => source.kind(),
            _ => ErrorKind::Validation,
        }
    }
}
