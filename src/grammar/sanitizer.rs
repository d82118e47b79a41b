use std::collections::HashSet;

use snafu::Snafu;
use tracing::trace;

use super::scanner::{CharClass, Tag, Token, render, scan};

/// Normalizes one raw input line into the form the extractor expects.
///
/// Rejects empty lines and lines repeating an unescaped tag. Trims the line,
/// collapses runs of separators down to their first character, and puts a
/// space in front of every tag that is glued to the preceding text.
pub fn sanitize(raw: &str) -> Result<String, SanitizeError> {
    let tokens = trim(scan(raw));
    if tokens.is_empty() {
        return Err(SanitizeError::EmptyInputError);
    }

    reject_duplicate_tags(&tokens)?;
    let tokens = separate_tags(collapse_runs(tokens));

    let sanitized = render(&tokens);
    trace!("Sanitized {:?} into {:?}", raw, sanitized);
    Ok(sanitized)
}

/// Strips unescaped whitespace from both ends. An escaped space survives.
fn trim(tokens: Vec<Token>) -> Vec<Token> {
    let blank = |token: &Token| {
        token.is_space() || (token.class == CharClass::Plain && token.ch.is_whitespace())
    };
    let start = tokens.iter().position(|token| !blank(token));
    let end = tokens.iter().rposition(|token| !blank(token));
    match (start, end) {
        (Some(start), Some(end)) => tokens[start..=end].to_vec(),
        _ => Vec::new(),
    }
}

fn reject_duplicate_tags(tokens: &[Token]) -> Result<(), SanitizeError> {
    let mut seen = HashSet::new();
    for token in tokens {
        if let CharClass::Tag(tag) = token.class {
            if !seen.insert(tag) {
                return Err(SanitizeError::DuplicateTagError { tag });
            }
        }
    }
    Ok(())
}

/// A tag or separator followed by more tags, separators or spaces keeps only
/// its first character. A run at the very start of the line, or right after
/// an escaped character, is left alone.
fn collapse_runs(tokens: Vec<Token>) -> Vec<Token> {
    let mut collapsed = Vec::with_capacity(tokens.len());
    let mut index = 0;

    while index < tokens.len() {
        let token = tokens[index];
        collapsed.push(token);
        index += 1;

        if token.class == CharClass::Escaped {
            while index < tokens.len() && tokens[index].class == CharClass::Structural {
                collapsed.push(tokens[index]);
                index += 1;
            }
            continue;
        }

        if collapsed.len() > 1 && token.is_structural() {
            while index < tokens.len() && (tokens[index].is_structural() || tokens[index].is_space())
            {
                index += 1;
            }
        }
    }

    collapsed
}

fn separate_tags(tokens: Vec<Token>) -> Vec<Token> {
    let mut separated = Vec::with_capacity(tokens.len() + Tag::ALL.len());

    for token in tokens {
        let glued = matches!(token.class, CharClass::Tag(_))
            && separated.last().is_some_and(|previous: &Token| !previous.is_space());
        if glued {
            separated.push(Token {
                ch: ' ',
                class: CharClass::Space,
            });
        }
        separated.push(token);
    }

    separated
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum SanitizeError {
    #[snafu(display("Cannot pass an empty string as a command"))]
    EmptyInputError,
    #[snafu(display("Tag {} may only be used once per command", tag))]
    DuplicateTagError { tag: Tag },
}
