use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How ffmpeg is invoked
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FfmpegConfig {
    /// Program name or absolute path of the ffmpeg binary
    pub path: PathBuf,
    /// Discard ffmpeg's own output
    pub quiet: bool,
    /// Print each command before running it
    pub show_command: bool,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("ffmpeg"),
            quiet: false,
            show_command: false,
        }
    }
}

/// Batch defaults, overridden by command line flags
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Files converted concurrently
    pub parallel: usize,
    /// Overwrite existing outputs
    pub force: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            parallel: 1,
            force: false,
        }
    }
}
