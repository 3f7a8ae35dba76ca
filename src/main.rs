mod config;
mod encoder;
mod error;
mod options;
mod queue;
mod utils;

use anyhow::Context;
use clap::Parser;
use config::AppConfig;
use encoder::FfmpegInvoker;
use options::{OptionSet, OutputTarget, non_empty, speed_from_flag};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// ffmpeg for the rest of us
#[derive(Debug, Parser)]
#[command(name = "peg", version, after_help = "Example: peg --format mp4 $FILE")]
struct Cli {
    /// Media files to convert
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Crop original media to provided dimensions
    #[arg(long)]
    crop: Option<String>,

    /// Force files to override existing files
    #[arg(long)]
    force: bool,

    /// Convert input to desired format
    #[arg(long)]
    format: Option<String>,

    /// Set frames per second
    #[arg(long)]
    fps: Option<String>,

    /// Remove audio from input files
    #[arg(long)]
    no_audio: bool,

    /// File or directory to write output
    #[arg(long)]
    output: Option<PathBuf>,

    /// Number of files to process concurrently
    #[arg(long)]
    parallel: Option<usize>,

    /// Hide ffmpeg output
    #[arg(long)]
    quiet: bool,

    /// Reverse the video and audio of media provided
    #[arg(long)]
    reverse: bool,

    /// Rotate the video (ffmpeg transpose value)
    #[arg(long)]
    rotate: Option<String>,

    /// Scale media
    #[arg(long)]
    scale: Option<String>,

    /// Show the raw ffmpeg command to be run
    #[arg(long)]
    show_command: bool,

    /// Adjustment of media speed; 0 leaves it unchanged
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    speed: f64,

    /// Trim content of the media, as START,END
    #[arg(long)]
    trim: Option<String>,

    /// Adjustment of media volume
    #[arg(long)]
    volume: Option<String>,

    /// Alternate config file
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn option_set(&self, config: &AppConfig, output: OutputTarget) -> OptionSet {
        OptionSet {
            crop: non_empty(self.crop.clone()),
            fps: non_empty(self.fps.clone()),
            rotate: non_empty(self.rotate.clone()),
            scale: non_empty(self.scale.clone()),
            speed: speed_from_flag(self.speed),
            volume: non_empty(self.volume.clone()),
            trim: non_empty(self.trim.clone()),
            format: non_empty(self.format.clone()),
            no_audio: self.no_audio,
            reverse: self.reverse,
            force: self.force || config.batch.force,
            workers: self.parallel.unwrap_or(config.batch.parallel),
            output,
        }
    }

    fn invoker(&self, config: &AppConfig) -> FfmpegInvoker {
        let mut invoker = FfmpegInvoker::new(config.ffmpeg.path.clone());
        invoker.quiet = self.quiet || config.ffmpeg.quiet;
        invoker.show_command = self.show_command || config.ffmpeg.show_command;
        invoker
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _guard = utils::init_logging();
    let cli = Cli::parse();

    let cancel = CancellationToken::new();
    spawn_signal_handler(cancel.clone());

    match run(cli, cancel).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, cancel: CancellationToken) -> anyhow::Result<()> {
    let config = AppConfig::load(cli.config.as_deref());

    // Nothing is created on disk until the other options are known good
    let mut options = cli.option_set(&config, OutputTarget::Unchanged);
    options.validate()?;
    if let Some(path) = &cli.output {
        options.output = OutputTarget::resolve(path).context("invalid --output")?;
    }

    let invoker = cli.invoker(&config);
    if !utils::ffmpeg_available(&invoker.program) {
        warn!("{} does not appear to be runnable", invoker.program.display());
    }

    queue::run_batch(Arc::new(options), cli.inputs, Arc::new(invoker), cancel).await?;
    Ok(())
}

/// Cancel `cancel` on the first SIGINT or SIGTERM
fn spawn_signal_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        wait_for_shutdown().await;
        info!("Interrupted, cancelling batch");
        cancel.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_shutdown() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            warn!("Failed to install SIGTERM handler: {}", e);
            return interrupted().await;
        }
    };

    tokio::select! {
        _ = interrupted() => {}
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown() {
    interrupted().await
}

async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_build_option_set() {
        let cli = Cli::parse_from([
            "peg", "--format", "mp4", "--speed", "3", "--trim", "1,2", "--parallel", "4",
            "--no-audio", "a.mov", "b.mov",
        ]);
        let options = cli.option_set(&AppConfig::default(), OutputTarget::Unchanged);

        assert_eq!(cli.inputs.len(), 2);
        assert_eq!(options.format.as_deref(), Some("mp4"));
        assert_eq!(options.speed, Some(3.0));
        assert_eq!(options.trim.as_deref(), Some("1,2"));
        assert_eq!(options.workers, 4);
        assert!(options.no_audio);
        assert!(!options.force);
    }

    #[test]
    fn config_fills_unset_flags() {
        let cli = Cli::parse_from(["peg", "--speed", "0", "--crop", "", "a.mov"]);
        let mut config = AppConfig::default();
        config.batch.parallel = 3;
        config.batch.force = true;
        config.ffmpeg.quiet = true;

        let options = cli.option_set(&config, OutputTarget::Unchanged);
        assert_eq!(options.speed, None);
        assert_eq!(options.crop, None);
        assert_eq!(options.workers, 3);
        assert!(options.force);
        assert!(cli.invoker(&config).quiet);
    }

    #[test]
    fn inputs_are_required() {
        assert!(Cli::try_parse_from(["peg", "--force"]).is_err());
    }

    #[test]
    fn negative_speed_parses_then_fails_validation() {
        let cli = Cli::parse_from(["peg", "--speed", "-2", "a.mov"]);
        let options = cli.option_set(&AppConfig::default(), OutputTarget::Unchanged);
        assert!(options.validate().is_err());
    }

    #[test]
    fn zero_parallel_is_accepted() {
        let cli = Cli::parse_from(["peg", "--parallel", "0", "a.mov"]);
        let options = cli.option_set(&AppConfig::default(), OutputTarget::Unchanged);
        assert_eq!(options.workers, 0);
        assert!(options.validate().is_ok());
    }

    #[tokio::test]
    async fn invalid_options_leave_output_directory_uncreated() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.toml");
        let out = dir.path().join("converted");
        let cli = Cli::parse_from([
            PathBuf::from("peg"),
            PathBuf::from("--config"),
            config,
            PathBuf::from("--speed"),
            PathBuf::from("-2"),
            PathBuf::from("--output"),
            out.clone(),
            PathBuf::from("a.mov"),
        ]);

        let result = run(cli, CancellationToken::new()).await;
        assert!(result.is_err());
        assert!(!out.exists());
    }
}
