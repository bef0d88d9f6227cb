use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to open log file '{path}': {cause}")]
    LogSink { path: PathBuf, cause: io::Error },

    #[error("Failed to read directory entry: {0}")]
    DirectoryRead(String),

    #[error("Failed to copy file from '{from}' to '{to}': {cause}")]
    FileCopy {
        from: PathBuf,
        to: PathBuf,
        cause: io::Error,
    },

    #[error("Failed to create directory '{path}': {cause}")]
    CreateDir { path: PathBuf, cause: io::Error },

    #[error("Failed to remove '{path}': {cause}")]
    FileRemove { path: PathBuf, cause: io::Error },

    #[error("Failed to write archive '{path}': {cause}")]
    Archive {
        path: PathBuf,
        cause: zip::result::ZipError,
    },

    #[error("Remote operation '{operation}' failed: {cause}")]
    Remote {
        operation: String,
        cause: suppaftp::FtpError,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl BackupError {
    pub fn remote(operation: impl Into<String>, cause: suppaftp::FtpError) -> Self {
        BackupError::Remote {
            operation: operation.into(),
            cause,
        }
    }
}

pub type Result<T> = std::result::Result<T, BackupError>;
