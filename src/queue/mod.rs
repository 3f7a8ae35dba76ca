pub mod aggregate;
pub mod job;
pub mod worker;

pub use job::Job;
pub use worker::Dispatcher;

use crate::encoder::Invoker;
use crate::error::AppError;
use crate::options::OptionSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Convert every input with `options`, sized by the machine's CPU count
pub async fn run_batch<I: Invoker>(
    options: Arc<OptionSet>,
    inputs: Vec<PathBuf>,
    invoker: Arc<I>,
    cancel: CancellationToken,
) -> Result<(), AppError> {
    Dispatcher::new(invoker, options.workers)
        .run(options, inputs, cancel)
        .await
}
