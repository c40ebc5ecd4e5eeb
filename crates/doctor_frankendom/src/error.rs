use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DoctorError>;

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("manifest parse error: {0}")]
    Manifest(#[from] toml::de::Error),

    #[error("no package version in manifest: {path}")]
    MissingVersion { path: PathBuf },

    #[error("required path does not exist: {path}")]
    MissingPath { path: PathBuf },

    #[error("{files} file(s) missing or stale header")]
    Drift { files: usize },
}

impl DoctorError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Drift { .. } => 2,
            _ => 1,
        }
    }
}
