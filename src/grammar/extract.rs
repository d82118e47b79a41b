use std::collections::HashSet;

use tracing::debug;

use super::scanner::{CharClass, PLURAL_SEPARATOR, Tag, Token, scan, unescape};

/// Tagged arguments of one command line, escapes already removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
    pub name: Vec<String>,
    pub location: Vec<String>,
    pub augment: Option<String>,
    pub content: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub keyword: String,
    pub arguments: Arguments,
    /// Some text after the keyword was not introduced by a tag.
    pub untagged: bool,
}

/// Splits a sanitized line into its keyword and tagged arguments.
///
/// Each argument runs from its tag to the next unescaped tag, minus the single
/// space delimiting the two. Values are split on unescaped `|`; the augment
/// keeps only its first one. When a tag occurs more than once only its first
/// occurrence is read.
pub fn extract(sanitized: &str) -> ParsedCommand {
    let Some((keyword, rest)) = sanitized.split_once(' ') else {
        return ParsedCommand {
            keyword: sanitized.to_string(),
            arguments: Arguments::default(),
            untagged: false,
        };
    };

    let mut tokens = vec![Token {
        ch: ' ',
        class: CharClass::Space,
    }];
    tokens.extend(scan(rest));

    let mut arguments = Arguments::default();
    let mut seen = HashSet::new();
    for (tag, value) in tagged_segments(&tokens) {
        if !seen.insert(tag) {
            continue;
        }
        let values = split_values(value);
        match tag {
            Tag::Name => arguments.name = values,
            Tag::Location => arguments.location = values,
            Tag::Augment => arguments.augment = values.into_iter().next(),
            Tag::Content => arguments.content = values,
        }
    }

    let untagged = has_untagged_argument(&tokens);
    if untagged {
        debug!("Untagged argument in {:?}", sanitized);
    }

    ParsedCommand {
        keyword: keyword.to_string(),
        arguments,
        untagged,
    }
}

fn tagged_segments(tokens: &[Token]) -> Vec<(Tag, &[Token])> {
    let tag_positions: Vec<(usize, Tag)> = tokens
        .iter()
        .enumerate()
        .filter_map(|(index, token)| match token.class {
            CharClass::Tag(tag) => Some((index, tag)),
            _ => None,
        })
        .collect();

    tag_positions
        .iter()
        .enumerate()
        .map(|(nth, &(position, tag))| {
            let end = tag_positions
                .get(nth + 1)
                .map_or(tokens.len(), |&(next, _)| next);
            let mut segment = &tokens[position + 1..end];
            if let Some((last, init)) = segment.split_last() {
                if last.is_space() {
                    segment = init;
                }
            }
            (tag, segment)
        })
        .collect()
}

fn split_values(segment: &[Token]) -> Vec<String> {
    if segment.is_empty() {
        return Vec::new();
    }
    segment
        .split(|token| token.class == CharClass::Structural && token.ch == PLURAL_SEPARATOR)
        .map(unescape)
        .collect()
}

/// Every tagged argument is introduced by exactly one space. Content comes
/// last and may hold spaces of its own, so only spaces up to the content tag
/// are counted.
fn has_untagged_argument(tokens: &[Token]) -> bool {
    let tags = tokens
        .iter()
        .filter(|token| matches!(token.class, CharClass::Tag(_)))
        .count();
    let region_end = tokens
        .iter()
        .position(|token| token.class == CharClass::Tag(Tag::Content))
        .map_or(tokens.len(), |position| position + 1);
    let spaces = tokens[..region_end]
        .iter()
        .filter(|token| token.is_space())
        .count();
    tags != spaces
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn keyword_alone() {
        let parsed = extract("list");

        assert_eq!(parsed.keyword, "list");
        assert_eq!(parsed.arguments, Arguments::default());
        assert!(!parsed.untagged);
    }

    #[test]
    fn every_tag_is_extracted() {
        let parsed = extract("write ~a|b @root:docs !append #hello world|second");

        assert_eq!(parsed.keyword, "write");
        assert_eq!(parsed.arguments.name, strings(&["a", "b"]));
        assert_eq!(parsed.arguments.location, strings(&["root:docs"]));
        assert_eq!(parsed.arguments.augment.as_deref(), Some("append"));
        assert_eq!(parsed.arguments.content, strings(&["hello world", "second"]));
        assert!(!parsed.untagged);
    }

    #[test]
    fn tag_order_does_not_matter() {
        let first = extract("shortcut ~s @root:docs");
        let second = extract("shortcut @root:docs ~s");

        assert_eq!(first.arguments, second.arguments);
    }

    #[test]
    fn augment_takes_a_single_value() {
        let parsed = extract("delete ~a !certain|append");
        assert_eq!(parsed.arguments.augment.as_deref(), Some("certain"));
    }

    #[test]
    fn escaped_separator_stays_in_the_augment() {
        let parsed = extract("delete ~a !cer%|tain");
        assert_eq!(parsed.arguments.augment.as_deref(), Some("cer|tain"));
    }

    #[rstest]
    #[case("file ~a%~b", &["a~b"])]
    #[case("file ~a%|b", &["a|b"])]
    #[case("file ~my% file", &["my file"])]
    #[case("file ~50%%|x", &["50%", "x"])]
    #[case("file ~100%", &["100%"])]
    fn escapes_are_removed_from_values(#[case] input: &str, #[case] expected: &[&str]) {
        let parsed = extract(input);

        assert_eq!(parsed.arguments.name, strings(expected));
        assert!(!parsed.untagged);
    }

    #[test]
    fn empty_tag_yields_no_values() {
        let parsed = extract("write ~a #");

        assert_eq!(parsed.arguments.name, strings(&["a"]));
        assert!(parsed.arguments.content.is_empty());
    }

    #[test]
    fn empty_plural_entries_are_kept_in_position() {
        let parsed = extract("file ~a|b #|second");
        assert_eq!(parsed.arguments.content, strings(&["", "second"]));
    }

    #[rstest]
    #[case("file a ~b")]
    #[case("file ~my file")]
    #[case("cd root")]
    fn untagged_text_is_flagged(#[case] input: &str) {
        assert!(extract(input).untagged);
    }

    #[test]
    fn untagged_text_still_parses_tags() {
        let parsed = extract("file a ~b #c");

        assert!(parsed.untagged);
        assert_eq!(parsed.arguments.name, strings(&["b"]));
        assert_eq!(parsed.arguments.content, strings(&["c"]));
    }

    #[test]
    fn spaces_inside_content_are_not_untagged() {
        assert!(!extract("file ~a #one two three").untagged);
    }
}
