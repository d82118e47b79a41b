//! The tagged command grammar.
//!
//! A raw line goes through [`sanitize`] and then [`extract`]:
//!
//! ```text
//! <keyword> [~name|...] [@location|...] [!augment] [#content|...]
//! ```
//!
//! `%` makes the following tag, separator, space or `%` literal.

mod extract;
mod sanitizer;
mod scanner;

pub use extract::{Arguments, ParsedCommand, extract};
pub use sanitizer::{SanitizeError, sanitize};
pub use scanner::{ADDRESS_SEPARATOR, ESCAPE, PLURAL_SEPARATOR, is_escapable};

/// Sanitizes and extracts one raw input line.
pub fn parse_line(raw: &str) -> Result<ParsedCommand, SanitizeError> {
    sanitize(raw).map(|sanitized| extract(&sanitized))
}
