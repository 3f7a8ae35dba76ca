use crate::error::AppError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where converted files are written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputTarget {
    /// Write next to (or over) the input
    #[default]
    Unchanged,
    /// Single explicit output file
    File(PathBuf),
    /// Directory receiving one file per input
    Directory(PathBuf),
}

impl OutputTarget {
    /// Resolve a user-supplied output path, creating it as a directory when
    /// it does not exist and has no extension.
    pub fn resolve(output: &Path) -> Result<Self, AppError> {
        match std::fs::metadata(output) {
            Ok(meta) if meta.is_dir() => Ok(Self::Directory(output.to_path_buf())),
            Ok(_) => Ok(Self::File(output.to_path_buf())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if output.extension().is_some() {
                    return Ok(Self::File(output.to_path_buf()));
                }
                std::fs::create_dir_all(output).map_err(|source| AppError::OutputDir {
                    path: output.to_path_buf(),
                    source,
                })?;
                debug!("Created output directory {}", output.display());
                Ok(Self::Directory(output.to_path_buf()))
            }
            Err(source) => Err(AppError::OutputDir {
                path: output.to_path_buf(),
                source,
            }),
        }
    }
}

/// Transform parameters shared by every job in a batch
#[derive(Debug, Clone, Default)]
pub struct OptionSet {
    pub crop: Option<String>,
    pub fps: Option<String>,
    pub rotate: Option<String>,
    pub scale: Option<String>,
    /// Playback multiplier; `None` leaves speed untouched
    pub speed: Option<f64>,
    pub volume: Option<String>,
    /// Raw `start,end` range
    pub trim: Option<String>,
    /// Target container/extension without the dot
    pub format: Option<String>,
    pub no_audio: bool,
    pub reverse: bool,
    pub force: bool,
    pub workers: usize,
    pub output: OutputTarget,
}

impl OptionSet {
    /// Check values that cannot be expressed as ffmpeg flags.
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(speed) = self.speed
            && (!speed.is_finite() || speed <= 0.0)
        {
            return Err(AppError::InvalidOption(format!(
                "speed must be a positive number, got {}",
                speed
            )));
        }
        Ok(())
    }

    /// Whether a speed change has to be applied at all
    pub fn speed_change(&self) -> Option<f64> {
        self.speed.filter(|s| *s > 0.0 && *s != 1.0)
    }
}

/// Treat empty strings coming from the CLI as unset.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// A zero speed on the command line means "leave unchanged".
pub fn speed_from_flag(speed: f64) -> Option<f64> {
    if speed == 0.0 { None } else { Some(speed) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> OptionSet {
        OptionSet {
            workers: 1,
            ..Default::default()
        }
    }

    #[test]
    fn negative_speed_is_rejected() {
        let opts = OptionSet {
            speed: Some(-1.0),
            ..base()
        };
        assert!(matches!(opts.validate(), Err(AppError::InvalidOption(_))));
    }

    #[test]
    fn nan_speed_is_rejected() {
        let opts = OptionSet {
            speed: Some(f64::NAN),
            ..base()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn zero_workers_is_accepted() {
        // The dispatcher raises it to one worker
        let opts = OptionSet {
            workers: 0,
            ..Default::default()
        };
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn unit_speed_is_not_a_change() {
        let opts = OptionSet {
            speed: Some(1.0),
            ..base()
        };
        assert!(opts.validate().is_ok());
        assert_eq!(opts.speed_change(), None);
        assert_eq!(speed_from_flag(0.0), None);
        assert_eq!(speed_from_flag(2.5), Some(2.5));
    }

    #[test]
    fn resolve_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = OutputTarget::resolve(dir.path()).unwrap();
        assert_eq!(target, OutputTarget::Directory(dir.path().to_path_buf()));
    }

    #[test]
    fn resolve_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("converted");
        let target = OutputTarget::resolve(&out).unwrap();
        assert!(out.is_dir());
        assert_eq!(target, OutputTarget::Directory(out));
    }

    #[test]
    fn resolve_missing_file_with_extension() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("result.mp4");
        let target = OutputTarget::resolve(&out).unwrap();
        assert!(!out.exists());
        assert_eq!(target, OutputTarget::File(out));
    }

    #[test]
    fn resolve_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("existing");
        std::fs::write(&out, b"").unwrap();
        assert_eq!(
            OutputTarget::resolve(&out).unwrap(),
            OutputTarget::File(out)
        );
    }
}
