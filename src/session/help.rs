use std::sync::LazyLock;

use hashlink::LinkedHashMap;

use super::command::{Augment, Command};

const INTRO: &str = "\
tagfs simulates a text-based filesystem held entirely in memory.
Navigate the tree of folders, files and shortcuts, read what they hold and change them.
A command is a keyword followed by arguments, each prefixed with its tag and separated by spaces.";

const ABOUT: &str = "\
The filesystem is a tree: every object knows its enclosing folder and folders know what they contain.
Every command that changes the tree or the current location is kept in a history.
save writes that history to a file; load replays a saved history command by command, rebuilding the tree.";

const CLI: &str = "\
General form of a command:

    <keyword> ~<name> @<location> !<augment> #<content>

    Examples: cd @root:after:seven
              file ~tri #There are three sides to a triangle
              read ~yellow|file14|purple
              write ~data2|data4 #text string B|text string D

    keyword:  which command to run. Cannot be plural.
    name:     prefixed with ~, names a new object or an existing one.
    location: prefixed with @, an address to move to or act upon.
    augment:  prefixed with !, alters the behaviour of some commands. Cannot be plural.
    content:  prefixed with #, data stored in a file. Read up to the end of the line.

Arguments marked with | in the glossary accept several values separated by |.
Prefix a tag, |, :, % or whitespace with % to use it literally.";

static COMMANDS: LazyLock<LinkedHashMap<Command, &'static str>> = LazyLock::new(|| {
    LinkedHashMap::from_iter([
        (Command::In, "in @name| - move into the named folders, one after another."),
        (Command::Out, "out - move out of the current folder."),
        (
            Command::Cd,
            "cd @address| - move to the given address, e.g. root:docs.",
        ),
        (
            Command::File,
            "file ~name| #content| - create files in the current folder.",
        ),
        (
            Command::Folder,
            "folder ~name| - create folders in the current folder.",
        ),
        (
            Command::Shortcut,
            "shortcut ~name| @address| - create shortcuts leading to the given addresses.",
        ),
        (
            Command::Delete,
            "delete ~name| !certain - delete the named objects, or the current folder when no name is given.",
        ),
        (Command::Read, "read ~name| - print the content of the named files."),
        (
            Command::Write,
            "write ~name| !write|append #content| - replace or extend the content of the named files.",
        ),
        (
            Command::Rename,
            "rename ~name| #new name| - give the named objects new names.",
        ),
        (
            Command::Copy,
            "copy ~name| - put the named objects on the clipboard.",
        ),
        (
            Command::Paste,
            "paste - paste copies of the clipboard into the current folder, suffixing taken names with _c.",
        ),
        (
            Command::List,
            "list - list the objects in the current folder.",
        ),
        (
            Command::Props,
            "props ~name| - print the properties of the named objects, or of the current folder.",
        ),
        (
            Command::Search,
            "search ~name| - search below the current folder for objects whose names occur in the given names.",
        ),
        (
            Command::Save,
            "save ~name !certain - save the history under the given name, or as a quicksave with q.",
        ),
        (
            Command::Load,
            "load ~name - replay a saved history into the current filesystem. q loads the quicksave.",
        ),
        (Command::Help, "help @topic| - print help on the given topics."),
        (
            Command::Clear,
            "clear !certain - discard the whole filesystem and start from an empty root.",
        ),
        (
            Command::Exit,
            "exit !certain - begin the exit dialogue, or leave immediately with !certain.",
        ),
    ])
});

static AUGMENTS: LazyLock<LinkedHashMap<Augment, &'static str>> = LazyLock::new(|| {
    LinkedHashMap::from_iter([
        (
            Augment::Certain,
            "!certain - skip the confirmation a command would otherwise ask for. Used by delete, clear, save and exit.",
        ),
        (
            Augment::Append,
            "!append - add the content to the end of the file. Used by write.",
        ),
        (
            Augment::Write,
            "!write - replace the content of the file. Used by write, and its default.",
        ),
    ])
});

static TOPICS: LazyLock<LinkedHashMap<&'static str, &'static str>> = LazyLock::new(|| {
    LinkedHashMap::from_iter([
        ("intro", "introduction to the filesystem."),
        ("about", "how the filesystem works."),
        ("cli", "the command line and its tags."),
        ("glossary", "every command and its arguments."),
        ("augments", "every augment and its effect."),
    ])
});

/// The topic overview shown by a bare `help`.
pub fn topic_list() -> Vec<String> {
    let mut lines = vec![
        String::from("--HELP--"),
        String::from("Enter help @<keyword> with one of the following keywords, or with any command or augment."),
    ];
    lines.extend(
        TOPICS
            .iter()
            .map(|(topic, summary)| format!("{topic} : {summary}")),
    );
    lines
}

/// Help text for one topic, or `None` if nothing is known by that name.
pub fn lookup(topic: &str) -> Option<Vec<String>> {
    let text = match topic {
        "intro" => lines(INTRO),
        "about" => lines(ABOUT),
        "cli" => lines(CLI),
        "glossary" => {
            let mut glossary = vec![String::from("A | after an argument means it can be plural.")];
            glossary.extend(COMMANDS.values().map(|line| line.to_string()));
            glossary
        }
        "augments" => AUGMENTS.values().map(|line| line.to_string()).collect(),
        _ => {
            if let Ok(command) = topic.parse::<Command>() {
                vec![COMMANDS.get(&command)?.to_string()]
            } else {
                let augment = topic.parse::<Augment>().ok()?;
                vec![AUGMENTS.get(&augment)?.to_string()]
            }
        }
    };
    Some(text)
}

fn lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}
