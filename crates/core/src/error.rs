use std::io;
use std::path::PathBuf;

/// Errors that can occur while talking to the build daemon or scanning archives
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Connection error for {}: {reason}", root.display())]
    ConnectionError { root: PathBuf, reason: String },

    #[error("Remote build error while fetching model '{model}': {message}")]
    RemoteBuildError { model: String, message: String },

    #[error("Task execution failed for {tasks:?} (exit code: {exit_code:?})")]
    TaskExecutionFailure {
        tasks: Vec<String>,
        exit_code: Option<i32>,
    },

    #[error("Cannot resolve extension archive for class '{class_name}': {reason}")]
    ExtensionResolutionError { class_name: String, reason: String },

    #[error("Module '{0}' does not exist")]
    ModuleNotFoundError(String),

    #[error("Cannot read archive {}: {reason}", path.display())]
    ArchiveReadError { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl Error {
    pub fn connection(root: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::ConnectionError {
            root: root.into(),
            reason: reason.into(),
        }
    }

    pub fn remote_build(model: impl Into<String>, message: impl Into<String>) -> Self {
        Error::RemoteBuildError {
            model: model.into(),
            message: message.into(),
        }
    }

    pub fn extension(class_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::ExtensionResolutionError {
            class_name: class_name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for gradle-probe operations
pub type Result<T> = std::result::Result<T, Error>;
