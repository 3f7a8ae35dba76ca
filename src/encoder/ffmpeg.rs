use crate::error::AppError;
use crate::queue::Job;
use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Runs one assembled job. Implementations must stop promptly once `cancel` fires.
pub trait Invoker: Send + Sync + 'static {
    fn invoke(
        &self,
        job: &Job,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Invokes the ffmpeg binary as a subprocess
#[derive(Debug, Clone)]
pub struct FfmpegInvoker {
    pub program: PathBuf,
    /// Discard ffmpeg's own output
    pub quiet: bool,
    /// Print the full command line before running it
    pub show_command: bool,
}

impl FfmpegInvoker {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            quiet: false,
            show_command: false,
        }
    }

    /// The command line as a user would type it
    pub fn command_line(&self, job: &Job) -> String {
        let mut line = self.program.to_string_lossy().to_string();
        for arg in &job.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl Invoker for FfmpegInvoker {
    async fn invoke(&self, job: &Job, cancel: &CancellationToken) -> Result<(), AppError> {
        if self.show_command {
            println!("{}", self.command_line(job));
        }

        let mut cmd = Command::new(&self.program);
        cmd.args(&job.args).stdin(Stdio::null()).kill_on_drop(true);
        if self.quiet {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }

        // Never remove a file that was there before ffmpeg ran
        let preexisting = job.output.exists();
        let mut child = cmd.spawn().map_err(|e| AppError::Spawn(e.to_string()))?;
        debug!("Started ffmpeg for {}", job.input.display());

        let exited = tokio::select! {
            status = child.wait() => Some(status),
            _ = cancel.cancelled() => None,
        };

        let Some(status) = exited else {
            kill_child(&mut child).await;
            if !preexisting && job.output != job.input {
                cleanup_partial_file(&job.output);
            }
            info!("Cancelled conversion of {}", job.input.display());
            return Err(AppError::Cancelled);
        };

        let status =
            status.map_err(|e| AppError::Tool(format!("failed to wait for ffmpeg: {}", e)))?;
        if !status.success() {
            return Err(AppError::Tool(status.to_string()));
        }
        Ok(())
    }
}

async fn kill_child(child: &mut tokio::process::Child) {
    let _ = child.kill().await;
}

fn cleanup_partial_file(path: &std::path::Path) {
    let _ = std::fs::remove_file(path);
}
