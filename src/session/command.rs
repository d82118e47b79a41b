use std::str::FromStr;

use derive_more::Display;

use super::error::CommandError;

/// Every keyword the dispatcher understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Command {
    #[display("in")]
    In,
    #[display("out")]
    Out,
    #[display("cd")]
    Cd,
    #[display("file")]
    File,
    #[display("folder")]
    Folder,
    #[display("shortcut")]
    Shortcut,
    #[display("delete")]
    Delete,
    #[display("read")]
    Read,
    #[display("write")]
    Write,
    #[display("rename")]
    Rename,
    #[display("copy")]
    Copy,
    #[display("paste")]
    Paste,
    #[display("list")]
    List,
    #[display("props")]
    Props,
    #[display("search")]
    Search,
    #[display("save")]
    Save,
    #[display("load")]
    Load,
    #[display("help")]
    Help,
    #[display("clear")]
    Clear,
    #[display("exit")]
    Exit,
}

impl Command {
    pub const ALL: [Command; 20] = [
        Command::In,
        Command::Out,
        Command::Cd,
        Command::File,
        Command::Folder,
        Command::Shortcut,
        Command::Delete,
        Command::Read,
        Command::Write,
        Command::Rename,
        Command::Copy,
        Command::Paste,
        Command::List,
        Command::Props,
        Command::Search,
        Command::Save,
        Command::Load,
        Command::Help,
        Command::Clear,
        Command::Exit,
    ];

    /// Commands after which the current location may sit on a shortcut.
    pub fn enters(self) -> bool {
        matches!(self, Command::In | Command::Cd)
    }

    /// Commands that only make sense interactively and are skipped on replay.
    pub fn is_interactive_only(self) -> bool {
        matches!(
            self,
            Command::Save | Command::Load | Command::Help | Command::Exit
        )
    }

    pub fn accepts(self, augment: Augment) -> bool {
        match self {
            Command::Delete | Command::Clear | Command::Exit | Command::Save => {
                augment == Augment::Certain
            }
            Command::Write => matches!(augment, Augment::Write | Augment::Append),
            _ => false,
        }
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(keyword: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|command| command.to_string() == keyword)
            .ok_or_else(|| CommandError::UnknownCommandError {
                keyword: keyword.to_string(),
            })
    }
}

/// Modifier passed with `!`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Augment {
    #[display("certain")]
    Certain,
    #[display("append")]
    Append,
    #[display("write")]
    Write,
}

impl Augment {
    pub const ALL: [Augment; 3] = [Augment::Certain, Augment::Append, Augment::Write];
}

impl FromStr for Augment {
    type Err = CommandError;

    fn from_str(augment: &str) -> Result<Self, Self::Err> {
        Augment::ALL
            .into_iter()
            .find(|known| known.to_string() == augment)
            .ok_or_else(|| CommandError::UnknownAugmentError {
                augment: augment.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn every_keyword_parses_back() {
        for command in Command::ALL {
            assert_eq!(command.to_string().parse::<Command>().unwrap(), command);
        }
    }

    #[rstest]
    #[case("")]
    #[case("IN")]
    #[case("mkdir")]
    fn unknown_keywords_are_rejected(#[case] keyword: &str) {
        assert!(matches!(
            keyword.parse::<Command>(),
            Err(CommandError::UnknownCommandError { .. })
        ));
    }

    #[rstest]
    #[case(Command::Write, Augment::Append, true)]
    #[case(Command::Write, Augment::Certain, false)]
    #[case(Command::Delete, Augment::Certain, true)]
    #[case(Command::Delete, Augment::Append, false)]
    #[case(Command::List, Augment::Certain, false)]
    fn augments_belong_to_commands(
        #[case] command: Command,
        #[case] augment: Augment,
        #[case] expected: bool,
    ) {
        assert_eq!(command.accepts(augment), expected);
    }

    #[test]
    fn augments_parse() {
        assert_eq!("append".parse::<Augment>().unwrap(), Augment::Append);
        assert!(matches!(
            "force".parse::<Augment>(),
            Err(CommandError::UnknownAugmentError { .. })
        ));
    }
}
