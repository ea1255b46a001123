use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("invalid test record file: {path} ({details})")]
    InvalidRecords { path: PathBuf, details: String },

    #[error("failed to write report: {path} ({details})")]
    ReportWrite { path: PathBuf, details: String },

    #[error("invalid input pattern: {0}")]
    InvalidPattern(#[from] glob::PatternError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::FileNotFound(_) => 1,
            Error::InvalidRecords { .. } => 2,
            Error::InvalidPattern(_) => 3,
            Error::ReportWrite { .. } => 4,
            Error::Io(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
