use std::io::{BufRead, Write};

use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

use crate::application::{Console, RuntimeConfig};
use crate::persistence::{LogFile, LogStore, replay_lines};
use crate::session::{Prompt, Request, Session};

const WELCOME: &str = "Welcome to the file system. Please enter a valid command, enter 'help' for a description of valid commands, or 'exit' to leave the program.";
const FAREWELL: &str = "Terminating program. Thank you for using the file system.";

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let mut output = Self::run_with(app_config, Console::stdio())
            .await?
            .into_output();
        output.flush().context(ConsoleSnafu)?;
        Ok(())
    }

    /// Runs the interactive loop until `exit` or the end of input, returning
    /// the console so its output can be inspected.
    pub async fn run_with<R: BufRead, W: Write>(
        app_config: impl Into<RuntimeConfig>,
        mut console: Console<R, W>,
    ) -> Result<Console<R, W>, ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        debug!("Runtime config: {:?}", app_config);
        let store = LogStore::new(&app_config.root);
        debug!("Command logs are kept in {}", store.root().display());
        let mut session = Session::new();

        if let Some(startup) = &app_config.startup {
            match LogFile::for_load(Some(startup)) {
                Ok(file) => Self::load(&store, &mut session, &file, &mut console).await,
                Err(error) => console.error(&error),
            }
        }

        console.say(WELCOME);
        while let Some(line) = console.read_line(&session.location()).context(ConsoleSnafu)? {
            let outcome = session.execute(&line, &mut console);
            console.render(&outcome);

            match outcome.request {
                None => {}
                Some(Request::Save { file, certain }) => {
                    Self::save(&store, &session, &file, certain, &mut console).await;
                }
                Some(Request::Load { file }) => {
                    Self::load(&store, &mut session, &file, &mut console).await;
                }
                Some(Request::Exit { save }) => {
                    if let Some(file) = save {
                        Self::save(&store, &session, &file, false, &mut console).await;
                    }
                    console.say(FAREWELL);
                    info!("Exiting");
                    return Ok(console);
                }
            }
        }

        info!("Input closed, exiting");
        Ok(console)
    }

    /// Replays a saved log into the session. Loading is additive.
    async fn load<R: BufRead, W: Write>(
        store: &LogStore,
        session: &mut Session,
        file: &LogFile,
        console: &mut Console<R, W>,
    ) {
        let text = match store.read(file).await {
            Ok(text) => text,
            Err(error) => {
                console.error(&error);
                return;
            }
        };

        console.say(&format!("Loading filesystem from {}...", file.file_name()));
        let summary = session.replay(replay_lines(&text));
        for (line, error) in &summary.errors {
            console.error(&format!("line {line}: {error}"));
        }
        debug!(
            "Tree holds {} nodes after loading",
            session.workspace().tree().len()
        );
        console.say("Filesystem loaded.");
    }

    /// A named save over an existing file asks first, unless `certain`.
    async fn save<R: BufRead, W: Write>(
        store: &LogStore,
        session: &Session,
        file: &LogFile,
        certain: bool,
        console: &mut Console<R, W>,
    ) {
        let overwrite = file.is_named() && store.exists(file);
        if overwrite
            && !certain
            && !console.confirm("File with the same name already exists. Overwrite?")
        {
            console.say("Save command has been cancelled.");
            return;
        }

        match store.write(file, session.history()).await {
            Ok(()) => console.say(&format!(
                "Current filesystem has been saved as {}.",
                file.file_name()
            )),
            Err(error) => console.error(&error),
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Console input or output failed"))]
    ConsoleError { source: std::io::Error },
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;
    use crate::persistence::DEFAULT_LOAD_FILE;

    type TestConsole = Console<Cursor<Vec<u8>>, Vec<u8>>;

    fn config(root: &Path, startup: Option<&str>) -> RuntimeConfig {
        RuntimeConfig {
            root: root.to_path_buf(),
            startup: startup.map(str::to_string),
        }
    }

    async fn run(config: RuntimeConfig, input: &str) -> String {
        let console: TestConsole = Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        let console = Application::run_with(config, console)
            .await
            .expect("Application failed");
        String::from_utf8(console.into_output()).unwrap()
    }

    #[compio::test]
    async fn saved_session_is_restored_at_startup() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let first = run(
            config(dir.path(), None),
            "folder ~docs\nin @docs\nfile ~readme #hello\nsave ~snapshot\nexit !certain\n",
        )
        .await;
        assert!(first.contains("Current filesystem has been saved as snapshot.txt."));

        let saved = std::fs::read_to_string(dir.path().join("snapshot.txt")).unwrap();
        assert_eq!(
            saved,
            "folder ~docs\nin @docs\nfile ~readme #hello\nend"
        );

        let second = run(
            config(dir.path(), Some("snapshot")),
            "read ~readme\nexit !certain\n",
        )
        .await;
        assert!(second.contains("Filesystem loaded."));
        assert!(second.contains("root:docs> "));
        assert!(second.contains("hello"));
        assert!(second.contains(FAREWELL));
    }

    #[compio::test]
    async fn missing_startup_file_is_reported() {
        let dir = TempDir::new().expect("Failed to create temp directory");

        let output = run(config(dir.path(), Some(DEFAULT_LOAD_FILE)), "list\n").await;

        assert!(output.contains("Err: Failed to read the command log"));
        assert!(output.contains("folder root contains 0 objects."));
    }

    #[compio::test]
    async fn exit_dialogue_quicksaves() {
        let dir = TempDir::new().expect("Failed to create temp directory");

        let output = run(config(dir.path(), None), "folder ~a\nexit\ny\nq\n").await;

        assert!(output.contains(FAREWELL));
        let saved = std::fs::read_to_string(dir.path().join(LogFile::Quicksave.file_name())).unwrap();
        assert_eq!(saved, "folder ~a\nend");
    }

    #[compio::test]
    async fn declined_overwrite_keeps_the_old_file() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        std::fs::write(dir.path().join("keep.txt"), "folder ~old\nend").unwrap();

        let output = run(config(dir.path(), None), "folder ~new\nsave ~keep\nn\n").await;

        assert!(output.contains("Save command has been cancelled."));
        let saved = std::fs::read_to_string(dir.path().join("keep.txt")).unwrap();
        assert_eq!(saved, "folder ~old\nend");
    }

    #[compio::test]
    async fn load_during_a_session_is_additive() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        std::fs::write(dir.path().join("extra.txt"), "folder ~b\nend\nfolder ~ignored").unwrap();

        let output = run(config(dir.path(), None), "folder ~a\nload ~extra\nlist\n").await;

        assert!(output.contains("folder root contains 2 objects:"));
        assert!(output.contains(" > folder a"));
        assert!(output.contains(" > folder b"));
        assert!(!output.contains("ignored"));
    }
}
