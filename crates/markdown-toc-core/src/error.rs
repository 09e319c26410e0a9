use std::io;
use std::path::PathBuf;

use markdown_toc_config::ConfigError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    Stale = 1,
    InvalidArguments = 2,
    Io = 4,
}

#[derive(Debug, Error)]
pub enum TocError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl TocError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Read { .. } | Self::Write { .. } => ExitCode::Io,
            Self::InvalidOptions(_) | Self::Config(_) => ExitCode::InvalidArguments,
        }
    }
}

pub type TocResult<T> = Result<T, TocError>;
