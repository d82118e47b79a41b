use tracing::{debug, info, warn};

use crate::filesystem::{NodeId, Workspace};
use crate::grammar::{Arguments, parse_line};
use crate::persistence::HistoryLog;

use super::command::{Augment, Command};
use super::error::CommandError;
use super::outcome::{Decline, Outcome, Prompt};

/// The whole mutable state of one filesystem: tree, current location,
/// clipboard and the log of commands that rebuilt it.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub(super) workspace: Workspace,
    pub(super) clipboard: Vec<NodeId>,
    pub(super) history: HistoryLog,
}

/// Result of feeding a saved log back through the dispatcher.
#[derive(Debug, Default)]
pub struct ReplaySummary {
    pub applied: usize,
    pub skipped: usize,
    /// Failures with the 1-based line they came from.
    pub errors: Vec<(usize, CommandError)>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// The current address, as shown in the input prompt.
    pub fn location(&self) -> String {
        self.workspace
            .current_address_string()
            .unwrap_or_else(|_| String::from("?"))
    }

    /// Drops the tree, the clipboard and the history.
    pub fn clear(&mut self) {
        self.workspace.reset();
        self.clipboard.clear();
        self.history.clear();
        info!("Filesystem cleared");
    }

    /// Parses and runs one line of user input.
    pub fn execute(&mut self, line: &str, prompt: &mut dyn Prompt) -> Outcome {
        let mut outcome = Outcome::default();
        let Some((command, arguments)) = self.parse(line, &mut outcome) else {
            return outcome;
        };
        self.run(command, &arguments, prompt, &mut outcome);
        outcome
    }

    /// Runs every line of a saved log exactly as typed input, minus the
    /// commands that only make sense interactively.
    ///
    /// Nothing is confirmed during replay. Each applied command lands in the
    /// history once, in its canonical form.
    pub fn replay<'a>(&mut self, lines: impl IntoIterator<Item = &'a str>) -> ReplaySummary {
        let mut summary = ReplaySummary::default();
        for (index, line) in lines.into_iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut outcome = Outcome::default();
            match self.parse(line, &mut outcome) {
                Some((command, _)) if command.is_interactive_only() => {
                    debug!("Skipping {} on replay", command);
                    summary.skipped += 1;
                }
                Some((command, arguments)) => {
                    self.run(command, &arguments, &mut Decline, &mut outcome);
                    summary.applied += 1;
                }
                None => {}
            }
            for message in &outcome.messages {
                debug!("Replay: {}", message);
            }
            for error in outcome.errors {
                warn!("Replay of line {} failed: {}", index + 1, error);
                summary.errors.push((index + 1, error));
            }
        }
        info!(
            "Replayed {} commands, skipped {}, {} errors",
            summary.applied,
            summary.skipped,
            summary.errors.len()
        );
        summary
    }

    fn parse(&self, line: &str, outcome: &mut Outcome) -> Option<(Command, Arguments)> {
        let parsed = match parse_line(line) {
            Ok(parsed) => parsed,
            Err(source) => {
                outcome.fail(CommandError::SyntaxError { source });
                return None;
            }
        };
        if parsed.untagged {
            outcome.fail(CommandError::UntaggedArgumentError);
        }
        match parsed.keyword.parse::<Command>() {
            Ok(command) => Some((command, parsed.arguments)),
            Err(error) => {
                outcome.fail(error);
                None
            }
        }
    }

    fn run(
        &mut self,
        command: Command,
        arguments: &Arguments,
        prompt: &mut dyn Prompt,
        outcome: &mut Outcome,
    ) {
        let augment = match Self::augment(command, arguments) {
            Ok(augment) => augment,
            Err(error) => {
                outcome.fail(error);
                return;
            }
        };
        debug!("Dispatching {} with {:?}", command, arguments);

        let result = match command {
            Command::In => self.move_in(arguments, outcome),
            Command::Out => self.move_out(),
            Command::Cd => self.change_directory(arguments, outcome),
            Command::File => self.create_files(arguments, outcome),
            Command::Folder => self.create_folders(arguments, outcome),
            Command::Shortcut => self.create_shortcuts(arguments, outcome),
            Command::Delete => self.delete(arguments, augment, prompt, outcome),
            Command::Read => self.read_files(arguments, outcome),
            Command::Write => self.write_files(arguments, augment, outcome),
            Command::Rename => self.rename(arguments, outcome),
            Command::Copy => self.copy(arguments, outcome),
            Command::Paste => self.paste(outcome),
            Command::List => self.list(outcome),
            Command::Props => self.properties(arguments, outcome),
            Command::Search => self.search(arguments, outcome),
            Command::Save => Self::save(arguments, augment, outcome),
            Command::Load => Self::load(arguments, outcome),
            Command::Help => Self::help(arguments, outcome),
            Command::Clear => self.clear_filesystem(augment, prompt, outcome),
            Command::Exit => Self::exit(augment, prompt, outcome),
        };
        if let Err(error) = result {
            outcome.fail(error);
        }

        if command.enters() {
            match self.workspace.shortcut_entry_check() {
                Ok(followed) => {
                    for step in followed {
                        outcome.say(format!(
                            "Taken shortcut {} to address {}.",
                            step.shortcut, step.address
                        ));
                    }
                }
                Err(error) => outcome.fail(error),
            }
        }
    }

    fn augment(command: Command, arguments: &Arguments) -> Result<Option<Augment>, CommandError> {
        let Some(raw) = arguments.augment.as_deref() else {
            return Ok(None);
        };
        let augment = raw.parse::<Augment>()?;
        if !command.accepts(augment) {
            return Err(CommandError::UnsupportedAugmentError { augment, command });
        }
        Ok(Some(augment))
    }

    pub(super) fn record(&mut self, entry: String) {
        debug!("History: {}", entry);
        self.history.push(entry);
    }
}
