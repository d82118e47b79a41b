//! The dispatcher: one [`Session`] owns the tree, the current location, the
//! clipboard and the history, and runs parsed commands against them.

mod command;
mod error;
mod handlers;
mod help;
mod outcome;
mod session;

pub use command::{Augment, Command};
pub use error::ErrorKind;
pub use outcome::{Outcome, Prompt, Request};
pub use session::Session;
