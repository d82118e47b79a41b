use derive_more::Display;

pub const ESCAPE: char = '%';
pub const PLURAL_SEPARATOR: char = '|';
pub const ADDRESS_SEPARATOR: char = ':';

/// Argument markers of the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Tag {
    #[display("~")]
    Name,
    #[display("@")]
    Location,
    #[display("!")]
    Augment,
    #[display("#")]
    Content,
}

impl Tag {
    pub const ALL: [Tag; 4] = [Tag::Name, Tag::Location, Tag::Augment, Tag::Content];

    pub fn symbol(self) -> char {
        match self {
            Tag::Name => '~',
            Tag::Location => '@',
            Tag::Augment => '!',
            Tag::Content => '#',
        }
    }

    pub fn from_char(ch: char) -> Option<Tag> {
        Tag::ALL.into_iter().find(|tag| tag.symbol() == ch)
    }
}

/// Characters that lose their special meaning after [`ESCAPE`]. Escaped
/// whitespace is never trimmed.
pub fn is_escapable(ch: char) -> bool {
    Tag::from_char(ch).is_some()
        || matches!(ch, PLURAL_SEPARATOR | ADDRESS_SEPARATOR | ESCAPE)
        || ch.is_whitespace()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// An escape character that applies to the next token.
    Escape,
    /// A character made literal by the preceding escape.
    Escaped,
    Tag(Tag),
    /// `:` or `|`.
    Structural,
    Space,
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub ch: char,
    pub class: CharClass,
}

impl Token {
    /// Tags and separators, the characters that collapse when repeated.
    pub fn is_structural(&self) -> bool {
        matches!(self.class, CharClass::Tag(_) | CharClass::Structural)
    }

    pub fn is_space(&self) -> bool {
        self.class == CharClass::Space
    }
}

/// Classifies every character of `input`.
///
/// An escape only counts as one when followed by an escapable character;
/// otherwise it is plain text.
pub fn scan(input: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == ESCAPE {
            if let Some(&next) = chars.peek() {
                if is_escapable(next) {
                    chars.next();
                    tokens.push(Token {
                        ch,
                        class: CharClass::Escape,
                    });
                    tokens.push(Token {
                        ch: next,
                        class: CharClass::Escaped,
                    });
                    continue;
                }
            }
        }

        let class = match ch {
            ' ' => CharClass::Space,
            PLURAL_SEPARATOR | ADDRESS_SEPARATOR => CharClass::Structural,
            _ => match Tag::from_char(ch) {
                Some(tag) => CharClass::Tag(tag),
                None => CharClass::Plain,
            },
        };
        tokens.push(Token { ch, class });
    }

    tokens
}

/// Text of the tokens, escapes included.
pub fn render(tokens: &[Token]) -> String {
    tokens.iter().map(|token| token.ch).collect()
}

/// Text of the tokens with escapes removed.
pub fn unescape(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter(|token| token.class != CharClass::Escape)
        .map(|token| token.ch)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn classes(input: &str) -> Vec<CharClass> {
        scan(input).into_iter().map(|token| token.class).collect()
    }

    #[test]
    fn classifies_each_character() {
        assert_eq!(
            classes("a ~b:|"),
            vec![
                CharClass::Plain,
                CharClass::Space,
                CharClass::Tag(Tag::Name),
                CharClass::Plain,
                CharClass::Structural,
                CharClass::Structural,
            ]
        );
    }

    #[rstest]
    #[case("%~", vec![CharClass::Escape, CharClass::Escaped])]
    #[case("%%~", vec![CharClass::Escape, CharClass::Escaped, CharClass::Tag(Tag::Name)])]
    #[case("% ", vec![CharClass::Escape, CharClass::Escaped])]
    #[case("%\t", vec![CharClass::Escape, CharClass::Escaped])]
    #[case("%a", vec![CharClass::Plain, CharClass::Plain])]
    #[case("%", vec![CharClass::Plain])]
    fn escapes_only_special_characters(#[case] input: &str, #[case] expected: Vec<CharClass>) {
        assert_eq!(classes(input), expected);
    }

    #[test]
    fn unescape_drops_escape_characters_only() {
        let tokens = scan("50%% off%! 100%");
        assert_eq!(unescape(&tokens), "50% off! 100%");
        assert_eq!(render(&tokens), "50%% off%! 100%");
    }

    #[test]
    fn tags_round_trip_through_their_symbols() {
        for tag in Tag::ALL {
            assert_eq!(Tag::from_char(tag.symbol()), Some(tag));
            assert_eq!(tag.to_string(), tag.symbol().to_string());
        }
    }
}
