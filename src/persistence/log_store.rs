use std::path::{Path, PathBuf};
use std::string::FromUtf8Error;

use compio::fs;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

use super::history_log::HistoryLog;
use crate::session::ErrorKind;

pub const DEFAULT_LOAD_FILE: &str = "default_filesystem.txt";
pub const QUICKSAVE_FILE: &str = "qsave.txt";
const QUICKSAVE_ALIAS: &str = "q";
const EXTENSION: &str = ".txt";

/// Which file a save or load refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFile {
    Quicksave,
    Default,
    Named(String),
}

impl LogFile {
    /// No name, or `q`, means the quicksave.
    pub fn for_save(argument: Option<&str>) -> Result<Self, PersistenceError> {
        match argument {
            None | Some(QUICKSAVE_ALIAS) => Ok(LogFile::Quicksave),
            Some(name) => sanitize_file_name(name).map(LogFile::Named),
        }
    }

    /// No name means the default load source, `q` the quicksave.
    pub fn for_load(argument: Option<&str>) -> Result<Self, PersistenceError> {
        match argument {
            None => Ok(LogFile::Default),
            Some(QUICKSAVE_ALIAS) => Ok(LogFile::Quicksave),
            Some(name) => sanitize_file_name(name).map(LogFile::Named),
        }
    }

    pub fn file_name(&self) -> &str {
        match self {
            LogFile::Quicksave => QUICKSAVE_FILE,
            LogFile::Default => DEFAULT_LOAD_FILE,
            LogFile::Named(name) => name,
        }
    }

    pub fn is_named(&self) -> bool {
        matches!(self, LogFile::Named(_))
    }
}

/// Keeps alphanumerics, `-` and `_`, and enforces the `.txt` suffix.
pub fn sanitize_file_name(name: &str) -> Result<String, PersistenceError> {
    let stem: String = name
        .strip_suffix(EXTENSION)
        .unwrap_or(name)
        .chars()
        .filter(|ch| ch.is_alphanumeric() || matches!(ch, '-' | '_'))
        .collect();
    if stem.chars().count() < 2 {
        return InvalidFileNameSnafu { name }.fail();
    }
    Ok(format!("{stem}{EXTENSION}"))
}

/// Directory holding saved command logs.
#[derive(Debug, Clone)]
pub struct LogStore {
    root: PathBuf,
}

impl LogStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LogStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, file: &LogFile) -> PathBuf {
        self.root.join(file.file_name())
    }

    pub fn exists(&self, file: &LogFile) -> bool {
        self.path_of(file).is_file()
    }

    pub async fn read(&self, file: &LogFile) -> Result<String, PersistenceError> {
        let path = self.path_of(file);
        debug!("Reading command log {}", path.display());
        let bytes = fs::read(&path).await.context(ReadSnafu {
            file_path: path.display().to_string(),
        })?;
        let text = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.display().to_string(),
        })?;
        info!("Read {} bytes from {}", text.len(), path.display());
        Ok(text)
    }

    /// Writes the log in place. A failed write may leave a partial file.
    pub async fn write(&self, file: &LogFile, log: &HistoryLog) -> Result<(), PersistenceError> {
        let path = self.path_of(file);
        debug!("Writing {} entries to {}", log.len(), path.display());
        let res = fs::write(&path, log.to_save_string().into_bytes()).await;
        res.0.context(WriteSnafu {
            file_path: path.display().to_string(),
        })?;
        info!("Saved command log to {}", path.display());
        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum PersistenceError {
    #[snafu(display("'{}' is not a valid file name", name))]
    InvalidFileNameError { name: String },
    #[snafu(display("Failed to read the command log: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Command log {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: FromUtf8Error,
    },
    #[snafu(display("Failed to write the command log: {}", file_path))]
    WriteError {
        file_path: String,
        source: std::io::Error,
    },
}

impl PersistenceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PersistenceError::InvalidFileNameError { .. } => ErrorKind::Validation,
            PersistenceError::ReadError { source, .. }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                ErrorKind::NotFound
            }
            _ => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case("backup", "backup.txt")]
    #[case("backup.txt", "backup.txt")]
    #[case("my save!", "mysave.txt")]
    #[case("../etc/passwd", "etcpasswd.txt")]
    #[case("v-1_2", "v-1_2.txt")]
    fn file_names_are_sanitized(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_file_name(input).unwrap(), expected);
    }

    #[rstest]
    #[case("a")]
    #[case("")]
    #[case("!!!")]
    #[case("x.txt")]
    fn short_file_names_are_rejected(#[case] input: &str) {
        let result = sanitize_file_name(input);
        assert!(matches!(
            result,
            Err(PersistenceError::InvalidFileNameError { .. })
        ));
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn save_and_load_targets() {
        assert_eq!(LogFile::for_save(None).unwrap(), LogFile::Quicksave);
        assert_eq!(LogFile::for_save(Some("q")).unwrap(), LogFile::Quicksave);
        assert_eq!(LogFile::for_load(None).unwrap(), LogFile::Default);
        assert_eq!(LogFile::for_load(Some("q")).unwrap(), LogFile::Quicksave);
        assert_eq!(
            LogFile::for_load(Some("work")).unwrap(),
            LogFile::Named("work.txt".into())
        );
        assert_eq!(LogFile::Default.file_name(), DEFAULT_LOAD_FILE);
        assert!(!LogFile::Quicksave.is_named());
    }

    #[compio::test]
    async fn written_log_reads_back() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let store = LogStore::new(dir.path());
        let mut log = HistoryLog::new();
        log.push("folder ~docs");
        let file = LogFile::Named("snapshot.txt".into());

        assert!(!store.exists(&file));
        store.write(&file, &log).await.expect("Failed to write log");

        assert!(store.exists(&file));
        let text = store.read(&file).await.expect("Failed to read log");
        assert_eq!(text, "folder ~docs\nend");
    }

    #[compio::test]
    async fn missing_log_is_a_not_found_read_error() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let store = LogStore::new(dir.path());

        let result = store.read(&LogFile::Default).await;

        match result {
            Err(error @ PersistenceError::ReadError { .. }) => {
                assert_eq!(error.kind(), ErrorKind::NotFound);
                assert!(error.to_string().contains(DEFAULT_LOAD_FILE));
            }
            other => panic!("Expected ReadError, got {other:?}"),
        }
    }

    #[compio::test]
    async fn writing_into_a_missing_directory_fails() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let store = LogStore::new(dir.path().join("absent"));

        let result = store.write(&LogFile::Quicksave, &HistoryLog::new()).await;

        assert!(matches!(result, Err(PersistenceError::WriteError { .. })));
    }
}
