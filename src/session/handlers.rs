use snafu::OptionExt;
use tracing::{debug, info};

use crate::ext::EscapeExt;
use crate::filesystem::{NavigationError, NodeId, NodeKind, NodeKindTag, NodeSpec};
use crate::grammar::{Arguments, PLURAL_SEPARATOR};
use crate::persistence::LogFile;

use super::command::{Augment, Command};
use super::error::{
    CommandError, EmptyClipboardSnafu, MissingArgumentSnafu, UnknownTopicSnafu,
};
use super::help;
use super::outcome::{Outcome, Prompt, Request};
use super::session::Session;

const CREATE_SUFFIX: &str = "_o";
const SHORTCUT_SUFFIX: &str = "_s";
const PASTE_SUFFIX: &str = "_c";
const RENAME_SUFFIX: &str = "_r";
const RULE: &str = "----------";

fn required<'a>(
    values: &'a [String],
    command: Command,
    argument: &'static str,
) -> Result<&'a [String], CommandError> {
    if values.is_empty() {
        return MissingArgumentSnafu { command, argument }.fail();
    }
    Ok(values)
}

fn plural(values: Vec<String>) -> String {
    values.join(&PLURAL_SEPARATOR.to_string())
}

fn with_content(entry: String, content: &str) -> String {
    if content.is_empty() {
        entry
    } else {
        format!("{entry} #{}", content.escape_content())
    }
}

impl Session {
    /// A name that cannot be entered is reported and the rest are still
    /// tried from wherever the location got to.
    pub(super) fn move_in(
        &mut self,
        arguments: &Arguments,
        outcome: &mut Outcome,
    ) -> Result<(), CommandError> {
        let names = required(&arguments.location, Command::In, "a @location")?;
        let mut entered = Vec::new();
        for name in names {
            match self.workspace.move_in(&[name]) {
                Ok(()) => entered.push(name.escape_name()),
                Err(error) => outcome.fail(error),
            }
        }
        if !entered.is_empty() {
            self.record(format!("in @{}", plural(entered)));
        }
        Ok(())
    }

    pub(super) fn move_out(&mut self) -> Result<(), CommandError> {
        self.workspace.move_out()?;
        self.record(String::from("out"));
        Ok(())
    }

    /// Only targets that actually moved the location are recorded, including
    /// ones that failed part way.
    pub(super) fn change_directory(
        &mut self,
        arguments: &Arguments,
        outcome: &mut Outcome,
    ) -> Result<(), CommandError> {
        let targets = required(&arguments.location, Command::Cd, "a @location")?;
        let mut moved = Vec::new();
        for target in targets {
            let origin = self.workspace.current();
            let result = self.workspace.change_directory(target);
            if self.workspace.current() != origin {
                moved.push(target.escape_address());
            }
            if let Err(error) = result {
                outcome.fail(error);
            }
        }
        if !moved.is_empty() {
            self.record(format!("cd @{}", plural(moved)));
        }
        Ok(())
    }

    pub(super) fn create_files(
        &mut self,
        arguments: &Arguments,
        outcome: &mut Outcome,
    ) -> Result<(), CommandError> {
        let names = required(&arguments.name, Command::File, "a ~name")?;
        for (index, name) in names.iter().enumerate() {
            if name.is_empty() {
                outcome.fail(CommandError::EmptyNameError);
                continue;
            }
            let content = arguments.content.get(index).cloned().unwrap_or_default();
            let entry = with_content(String::new(), &content);
            let unique =
                self.populate_unique(name, NodeSpec::File(content), CREATE_SUFFIX, outcome)?;
            self.record(format!("file ~{}{entry}", unique.escape_name()));
        }
        Ok(())
    }

    pub(super) fn create_folders(
        &mut self,
        arguments: &Arguments,
        outcome: &mut Outcome,
    ) -> Result<(), CommandError> {
        let names = required(&arguments.name, Command::Folder, "a ~name")?;
        for name in names {
            if name.is_empty() {
                outcome.fail(CommandError::EmptyNameError);
                continue;
            }
            let unique = self.populate_unique(name, NodeSpec::Folder, CREATE_SUFFIX, outcome)?;
            self.record(format!("folder ~{}", unique.escape_name()));
        }
        Ok(())
    }

    /// Names and addresses pair up positionally; extras on either side are
    /// ignored. An address that does not resolve skips only its own shortcut.
    pub(super) fn create_shortcuts(
        &mut self,
        arguments: &Arguments,
        outcome: &mut Outcome,
    ) -> Result<(), CommandError> {
        let names = required(&arguments.name, Command::Shortcut, "a ~name")?;
        let addresses = required(&arguments.location, Command::Shortcut, "an @address")?;
        for (name, address) in names.iter().zip(addresses) {
            if name.is_empty() {
                outcome.fail(CommandError::EmptyNameError);
                continue;
            }
            let Some(target) = self.workspace.validate_address(address) else {
                outcome.fail(CommandError::InvalidAddressError {
                    address: address.clone(),
                });
                continue;
            };
            let unique =
                self.populate_unique(name, NodeSpec::Shortcut(target), SHORTCUT_SUFFIX, outcome)?;
            self.record(format!(
                "shortcut ~{} @{}",
                unique.escape_name(),
                address.escape_address()
            ));
        }
        Ok(())
    }

    fn populate_unique(
        &mut self,
        name: &str,
        spec: NodeSpec,
        suffix: &str,
        outcome: &mut Outcome,
    ) -> Result<String, CommandError> {
        let parent = self.workspace.current();
        let tag = spec.tag();
        let unique = self.workspace.tree().unique_name(parent, name, suffix)?;
        if unique != name {
            debug!("Name {} is taken, using {}", name, unique);
        }
        self.workspace
            .tree_mut()
            .populate(parent, unique.as_str(), spec)?;
        outcome.say(format!(
            "New {tag} {unique} created within {}.",
            self.node_name(parent)?
        ));
        Ok(unique)
    }

    pub(super) fn delete(
        &mut self,
        arguments: &Arguments,
        augment: Option<Augment>,
        prompt: &mut dyn Prompt,
        outcome: &mut Outcome,
    ) -> Result<(), CommandError> {
        if arguments.name.is_empty() {
            return self.delete_current(augment, prompt, outcome);
        }

        let parent = self.workspace.current();
        let (matches, unmatched) = self
            .workspace
            .tree()
            .resolve_names(parent, arguments.name.as_slice())?;
        let parent_node = self.workspace.tree().get(parent)?;
        let parent_label = format!("{} {}", parent_node.tag(), parent_node.name());

        for id in matches {
            // The same name may be listed twice.
            if !self.workspace.tree().contains(id) {
                continue;
            }
            let removed = self.workspace.tree_mut().remove(parent, id)?;
            outcome.say(format!(
                "{} {} deleted from {parent_label}.",
                removed.tag(),
                removed.name()
            ));
            self.record(format!("delete ~{} !certain", removed.name().escape_name()));
        }

        if !unmatched.is_empty() {
            outcome.fail(CommandError::NotFoundError { names: unmatched });
        }
        Ok(())
    }

    fn delete_current(
        &mut self,
        augment: Option<Augment>,
        prompt: &mut dyn Prompt,
        outcome: &mut Outcome,
    ) -> Result<(), CommandError> {
        let certain = augment == Some(Augment::Certain);
        if !certain
            && !prompt.confirm(
                "Calling delete without a name argument deletes the current location. Do you want to continue?",
            )
        {
            outcome.say("Delete cancelled.");
            return Ok(());
        }

        let target = self.workspace.current();
        let name = self.node_name(target)?;
        self.move_out()?;
        let parent = self.workspace.current();
        let removed = self.workspace.tree_mut().remove(parent, target)?;
        outcome.say(format!(
            "{} {} deleted from {}.",
            removed.tag(),
            removed.name(),
            self.node_name(parent)?
        ));
        self.record(format!("delete ~{} !certain", name.escape_name()));
        Ok(())
    }

    pub(super) fn read_files(
        &mut self,
        arguments: &Arguments,
        outcome: &mut Outcome,
    ) -> Result<(), CommandError> {
        let names = required(&arguments.name, Command::Read, "a ~name")?;
        let tree = self.workspace.tree();
        let (matches, unmatched) = tree.resolve_names(self.workspace.current(), names)?;

        for id in matches {
            let node = tree.get(id)?;
            match node.content() {
                Some(content) => {
                    outcome.say(format!("File name: {}", node.name()));
                    outcome.say(RULE);
                    outcome.say(content);
                    outcome.say(RULE);
                }
                None => outcome.fail(CommandError::NotAFileError {
                    name: node.name().to_string(),
                    kind: node.tag(),
                }),
            }
        }

        if !unmatched.is_empty() {
            outcome.fail(CommandError::NotFoundError { names: unmatched });
        }
        Ok(())
    }

    /// Contents pair with names by position; a name without content gets an
    /// empty string.
    pub(super) fn write_files(
        &mut self,
        arguments: &Arguments,
        augment: Option<Augment>,
        outcome: &mut Outcome,
    ) -> Result<(), CommandError> {
        let names = required(&arguments.name, Command::Write, "a ~name")?;
        let mode = augment.unwrap_or(Augment::Write);
        let parent = self.workspace.current();
        let mut missing = Vec::new();

        for (index, name) in names.iter().enumerate() {
            let content = arguments
                .content
                .get(index)
                .map(String::as_str)
                .unwrap_or_default();
            let Some(id) = self.find_child(parent, name)? else {
                missing.push(name.clone());
                continue;
            };
            let tag = self.workspace.tree().get(id)?.tag();
            if tag != NodeKindTag::File {
                outcome.fail(CommandError::NotAFileError {
                    name: name.clone(),
                    kind: tag,
                });
                continue;
            }

            if mode == Augment::Append {
                self.workspace.tree_mut().append_content(id, content)?;
                outcome.say(format!("Content appended to file {name}."));
            } else {
                self.workspace.tree_mut().set_content(id, content)?;
                outcome.say(format!("Content of file {name} replaced."));
            }
            let entry = format!("write ~{} !{mode}", name.escape_name());
            self.record(with_content(entry, content));
        }

        if !missing.is_empty() {
            outcome.fail(CommandError::NotFoundError { names: missing });
        }
        Ok(())
    }

    /// New names come from the content argument. Names without a new name
    /// are left alone.
    pub(super) fn rename(
        &mut self,
        arguments: &Arguments,
        outcome: &mut Outcome,
    ) -> Result<(), CommandError> {
        let names = required(&arguments.name, Command::Rename, "a ~name")?;
        let new_names = required(&arguments.content, Command::Rename, "a #new name")?;
        let parent = self.workspace.current();
        let mut missing = Vec::new();

        for (old, new) in names.iter().zip(new_names) {
            if new.is_empty() {
                outcome.fail(CommandError::EmptyNameError);
                continue;
            }
            let Some(id) = self.find_child(parent, old)? else {
                missing.push(old.clone());
                continue;
            };
            let unique = self.workspace.tree().unique_name(parent, new, RENAME_SUFFIX)?;
            let tag = self.workspace.tree().get(id)?.tag();
            self.workspace.tree_mut().rename(id, unique.as_str())?;
            outcome.say(format!("{tag} {old} renamed to {unique}."));
            self.record(format!(
                "rename ~{} #{}",
                old.escape_name(),
                unique.escape_content()
            ));
        }

        if !missing.is_empty() {
            outcome.fail(CommandError::NotFoundError { names: missing });
        }
        Ok(())
    }

    /// Replaces the clipboard with the named objects. Copying nothing leaves
    /// the clipboard empty.
    pub(super) fn copy(
        &mut self,
        arguments: &Arguments,
        outcome: &mut Outcome,
    ) -> Result<(), CommandError> {
        let names = required(&arguments.name, Command::Copy, "a ~name")?;
        let (matches, unmatched) = self
            .workspace
            .tree()
            .resolve_names(self.workspace.current(), names)?;

        let mut copied = Vec::with_capacity(matches.len());
        for id in &matches {
            let node = self.workspace.tree().get(*id)?;
            outcome.say(format!("{} {} copied to clipboard.", node.tag(), node.name()));
            copied.push(node.name().escape_name());
        }
        self.clipboard = matches;
        if !copied.is_empty() {
            self.record(format!("copy ~{}", plural(copied)));
        }

        if !unmatched.is_empty() {
            outcome.fail(CommandError::NotFoundError { names: unmatched });
        }
        Ok(())
    }

    pub(super) fn paste(&mut self, outcome: &mut Outcome) -> Result<(), CommandError> {
        if self.clipboard.is_empty() {
            return EmptyClipboardSnafu.fail();
        }

        let destination = self.workspace.current();
        let destination_name = self.node_name(destination)?;
        let mut pasted = false;
        for id in self.clipboard.clone() {
            let Ok(source) = self.workspace.tree().get(id) else {
                outcome.fail(CommandError::DanglingClipboardError);
                continue;
            };
            let tag = source.tag();
            let name = source.name().to_string();
            let unique = self
                .workspace
                .tree()
                .unique_name(destination, &name, PASTE_SUFFIX)?;
            self.workspace
                .tree_mut()
                .copy_into(id, destination, unique.as_str())?;
            outcome.say(format!("{tag} {unique} pasted to {destination_name}."));
            pasted = true;
        }
        if pasted {
            self.record(String::from("paste"));
        }
        Ok(())
    }

    pub(super) fn list(&mut self, outcome: &mut Outcome) -> Result<(), CommandError> {
        let tree = self.workspace.tree();
        let current = self.workspace.current();
        let node = tree.get(current)?;
        let children = tree.children(current)?;

        let count = children.len();
        let plural = if count == 1 { "" } else { "s" };
        let end = if count == 0 { "." } else { ":" };
        outcome.say(format!(
            "{} {} contains {count} object{plural}{end}",
            node.tag(),
            node.name()
        ));
        for child in children {
            let child = tree.get(child)?;
            outcome.say(format!(" > {} {}", child.tag(), child.name()));
        }
        Ok(())
    }

    /// Without names, describes the current location.
    pub(super) fn properties(
        &mut self,
        arguments: &Arguments,
        outcome: &mut Outcome,
    ) -> Result<(), CommandError> {
        let current = self.workspace.current();
        if arguments.name.is_empty() {
            return self.describe(current, outcome);
        }

        let (matches, unmatched) = self
            .workspace
            .tree()
            .resolve_names(current, arguments.name.as_slice())?;
        for id in matches {
            self.describe(id, outcome)?;
        }
        if !unmatched.is_empty() {
            outcome.fail(CommandError::NotFoundError { names: unmatched });
        }
        Ok(())
    }

    fn describe(&self, id: NodeId, outcome: &mut Outcome) -> Result<(), CommandError> {
        let tree = self.workspace.tree();
        let node = tree.get(id)?;
        let context = match node.context() {
            Some(context) => tree.get(context)?.name().to_string(),
            None => String::from("none"),
        };

        outcome.say("Properties:");
        outcome.say(RULE);
        outcome.say(format!("Name: {}", node.name()));
        outcome.say(format!("Type: {}", node.tag()));
        outcome.say(format!("Context: {context}"));
        outcome.say(format!("Address: {}", tree.address_string(id)?));
        match node.kind() {
            NodeKind::File { content } => {
                outcome.say(format!("Content size: {} characters.", content.chars().count()));
            }
            NodeKind::Folder { branches } => {
                outcome.say(format!("Number of branches: {}", branches.len()));
            }
            NodeKind::Shortcut { alias } => match tree.address_string(*alias) {
                Ok(address) => outcome.say(format!("Location reference: {address}")),
                Err(_) => outcome.fail(NavigationError::DanglingAliasError {
                    shortcut: node.name().to_string(),
                }),
            },
        }
        outcome.say(RULE);
        Ok(())
    }

    pub(super) fn search(
        &mut self,
        arguments: &Arguments,
        outcome: &mut Outcome,
    ) -> Result<(), CommandError> {
        let needles = required(&arguments.name, Command::Search, "a ~name")?;
        let tree = self.workspace.tree();
        let from = self.workspace.current();
        let folder = tree.get(from)?.name().to_string();

        outcome.say("Search results:");
        for needle in needles {
            let results = tree.search(from, needle)?;
            if results.is_empty() {
                outcome.fail(CommandError::NoMatchesError {
                    needle: needle.clone(),
                    folder: folder.clone(),
                });
                continue;
            }
            outcome.say(RULE);
            for id in results {
                outcome.say(format!("Name: {}", tree.get(id)?.name()));
                outcome.say(format!("Address: {}", tree.address_string(id)?));
                outcome.say(RULE);
            }
        }
        Ok(())
    }

    pub(super) fn save(
        arguments: &Arguments,
        augment: Option<Augment>,
        outcome: &mut Outcome,
    ) -> Result<(), CommandError> {
        let file = LogFile::for_save(arguments.name.first().map(String::as_str))?;
        outcome.request = Some(Request::Save {
            file,
            certain: augment == Some(Augment::Certain),
        });
        Ok(())
    }

    pub(super) fn load(arguments: &Arguments, outcome: &mut Outcome) -> Result<(), CommandError> {
        let file = LogFile::for_load(arguments.name.first().map(String::as_str))?;
        outcome.request = Some(Request::Load { file });
        Ok(())
    }

    /// Topics come from the location argument, falling back to names.
    pub(super) fn help(arguments: &Arguments, outcome: &mut Outcome) -> Result<(), CommandError> {
        let topics = if arguments.location.is_empty() {
            &arguments.name
        } else {
            &arguments.location
        };
        if topics.is_empty() {
            outcome.messages.extend(help::topic_list());
            return Ok(());
        }
        for topic in topics {
            let text = help::lookup(topic).context(UnknownTopicSnafu {
                topic: topic.as_str(),
            });
            match text {
                Ok(text) => outcome.messages.extend(text),
                Err(error) => outcome.fail(error),
            }
        }
        Ok(())
    }

    pub(super) fn clear_filesystem(
        &mut self,
        augment: Option<Augment>,
        prompt: &mut dyn Prompt,
        outcome: &mut Outcome,
    ) -> Result<(), CommandError> {
        let certain = augment == Some(Augment::Certain);
        if certain
            || prompt.confirm(
                "Clearing resets the filesystem to an empty root. Anything not saved will be lost. Are you sure?",
            )
        {
            self.clear();
            outcome.say("Filesystem cleared.");
        } else {
            outcome.say("Clear cancelled.");
        }
        Ok(())
    }

    pub(super) fn exit(
        augment: Option<Augment>,
        prompt: &mut dyn Prompt,
        outcome: &mut Outcome,
    ) -> Result<(), CommandError> {
        if augment == Some(Augment::Certain) {
            outcome.request = Some(Request::Exit { save: None });
            return Ok(());
        }
        let save = if prompt.confirm("Save filesystem before exit?") {
            let answer = prompt
                .ask("Enter name for filesystem to be saved under, or enter 'q' for a quicksave.");
            Some(LogFile::for_save(answer.as_deref())?)
        } else {
            None
        };
        info!("Exit requested, saving: {}", save.is_some());
        outcome.request = Some(Request::Exit { save });
        Ok(())
    }

    fn find_child(&self, folder: NodeId, name: &str) -> Result<Option<NodeId>, CommandError> {
        let (matches, _) = self.workspace.tree().resolve_names(folder, &[name])?;
        Ok(matches.first().copied())
    }

    fn node_name(&self, id: NodeId) -> Result<String, CommandError> {
        Ok(self.workspace.tree().get(id)?.name().to_string())
    }
}
