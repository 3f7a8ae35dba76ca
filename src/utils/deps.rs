use std::path::Path;
use std::process::{Command, Stdio};

/// Check whether the ffmpeg binary at `program` can be executed
pub fn ffmpeg_available(program: &Path) -> bool {
    check_command(program, &["-version"])
}

/// Check if a command is available
fn check_command(program: &Path, args: &[&str]) -> bool {
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}
