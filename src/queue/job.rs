use std::path::{Path, PathBuf};

/// Conversion of a single input file
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    /// Cleaned input path
    pub input: PathBuf,
    pub output: PathBuf,
    /// Arguments passed to ffmpeg, excluding the program itself
    pub args: Vec<String>,
}

impl Job {
    /// Get the filename
    pub fn filename(&self) -> String {
        file_name(&self.input)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
