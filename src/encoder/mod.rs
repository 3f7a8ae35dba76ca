pub mod command_builder;
pub mod ffmpeg;
pub mod filters;
pub mod speed;

pub use command_builder::build_job;
pub use ffmpeg::{FfmpegInvoker, Invoker};
