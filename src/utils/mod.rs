pub mod deps;
pub mod logger;

pub use deps::ffmpeg_available;
pub use logger::init_logging;
