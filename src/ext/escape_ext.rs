use crate::grammar::{ADDRESS_SEPARATOR, ESCAPE, is_escapable};

fn escape_except(value: &str, keep: impl Fn(char) -> bool) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if is_escapable(ch) && !keep(ch) {
            escaped.push(ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}

/// Re-escapes argument values so that a canonical command line parses back
/// to exactly the same values.
pub trait EscapeExt {
    /// For names: every special character, spaces included.
    fn escape_name(&self) -> String;
    /// For content, which is read up to the end of the line: inner whitespace
    /// stays, leading and trailing whitespace is escaped so trimming keeps it.
    fn escape_content(&self) -> String;
    /// For addresses: `:` keeps separating segments.
    fn escape_address(&self) -> String;
}

impl EscapeExt for str {
    fn escape_name(&self) -> String {
        escape_except(self, |_| false)
    }

    fn escape_content(&self) -> String {
        let start = self.len() - self.trim_start().len();
        let end = self.trim_end().len();
        let mut escaped = String::with_capacity(self.len());
        for (index, ch) in self.char_indices() {
            let inner_space = ch.is_whitespace() && (start..end).contains(&index);
            if is_escapable(ch) && !inner_space {
                escaped.push(ESCAPE);
            }
            escaped.push(ch);
        }
        escaped
    }

    fn escape_address(&self) -> String {
        escape_except(self, |ch| ch == ADDRESS_SEPARATOR)
    }
}

impl EscapeExt for String {
    fn escape_name(&self) -> String {
        self.as_str().escape_name()
    }

    fn escape_content(&self) -> String {
        self.as_str().escape_content()
    }

    fn escape_address(&self) -> String {
        self.as_str().escape_address()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::parse_line;
    use rstest::rstest;

    #[rstest]
    #[case("plain", "plain")]
    #[case("a b", "a% b")]
    #[case("a~b|c", "a%~b%|c")]
    #[case("50%", "50%%")]
    #[case("x:y", "x%:y")]
    fn names_escape_everything(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(input.escape_name(), expected);
    }

    #[test]
    fn content_keeps_spaces_and_address_keeps_colons() {
        assert_eq!("hi there: #1".escape_content(), "hi there%: %#1");
        assert_eq!(" padded ".escape_content(), "% padded% ");
        assert_eq!("x\t".escape_content(), "x%\t");
        assert_eq!("a\tb".escape_content(), "a\tb");
        assert_eq!("root:my docs".to_string().escape_address(), "root:my% docs");
    }

    #[rstest]
    #[case("a b", "first: second #3 | 100%")]
    #[case("odd~name", "!bang")]
    #[case("%", "%%")]
    #[case("x", "  spaced out  ")]
    #[case("tab", "x\t")]
    #[case("tabs", "\tin\tbetween\t")]
    fn escaped_values_parse_back(#[case] name: &str, #[case] content: &str) {
        let line = format!("file ~{} #{}", name.escape_name(), content.escape_content());
        let parsed = parse_line(&line).unwrap();

        assert_eq!(parsed.arguments.name, vec![name]);
        assert_eq!(parsed.arguments.content, vec![content]);
        assert!(!parsed.untagged);
    }
}
