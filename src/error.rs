use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(
        "attempting to write all file matches to a single file; did you mean to provide a directory?"
    )]
    AmbiguousOutput,

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("failed to start ffmpeg: {0}")]
    Spawn(String),

    #[error("ffmpeg failed: {0}")]
    Tool(String),

    #[error("cancelled")]
    Cancelled,

    /// Distinct per-job failures, already sorted.
    #[error("{}", .0.join("\n"))]
    Batch(Vec<String>),
}
