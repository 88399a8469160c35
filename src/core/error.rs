use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoverageError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Failed to read {}: {source}", path.display())]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Configuration error: {}", .0.join("; "))]
    ConfigError(Vec<String>),
    #[error("Config parse error: {0}")]
    ConfigParse(String),
    #[error("Coverage validation failed: {0} error(s)")]
    ValidationError(usize),
}
