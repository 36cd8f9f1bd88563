use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("failed to load index {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },
    #[error("malformed index: {0}")]
    Malformed(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IndexError {
    pub fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        IndexError::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;
