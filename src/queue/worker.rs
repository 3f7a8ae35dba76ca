use super::aggregate::collect;
use crate::encoder::{Invoker, build_job};
use crate::error::AppError;
use crate::options::{OptionSet, OutputTarget};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Clamp the requested parallelism to `[1, cpu_count - 1]`
pub fn effective_workers(requested: usize, cpu_count: usize) -> usize {
    requested.min(cpu_count.saturating_sub(1)).max(1)
}

/// Runs one job per input with a bounded number of concurrent invocations
pub struct Dispatcher<I> {
    invoker: Arc<I>,
    workers: usize,
}

impl<I: Invoker> Dispatcher<I> {
    pub fn new(invoker: Arc<I>, requested: usize) -> Self {
        Self::with_cpu_count(invoker, requested, num_cpus::get())
    }

    pub fn with_cpu_count(invoker: Arc<I>, requested: usize, cpu_count: usize) -> Self {
        Self {
            invoker,
            workers: effective_workers(requested, cpu_count),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Convert every input and fold the outcomes into one result.
    ///
    /// All jobs are spawned up front; each waits for a permit before invoking.
    /// Once `cancel` fires the partial aggregate is returned after every
    /// started job has finished its own cancellation handling.
    pub async fn run(
        &self,
        options: Arc<OptionSet>,
        inputs: Vec<PathBuf>,
        cancel: CancellationToken,
    ) -> Result<(), AppError> {
        if matches!(options.output, OutputTarget::File(_)) && inputs.len() > 1 {
            return Err(AppError::AmbiguousOutput);
        }

        info!(
            "Converting {} file(s) with {} worker(s)",
            inputs.len(),
            self.workers()
        );

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let (tx, rx) = mpsc::channel(1);
        let tracker = TaskTracker::new();

        for input in inputs {
            let tx = tx.clone();
            let semaphore = Arc::clone(&semaphore);
            let invoker = Arc::clone(&self.invoker);
            let options = Arc::clone(&options);
            let cancel = cancel.clone();

            tracker.spawn(async move {
                let permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return,
                    permit = semaphore.acquire_owned() => match permit {
                        Ok(p) => p,
                        Err(_) => return,
                    },
                };

                let result = run_job(invoker.as_ref(), &options, &input, &cancel).await;
                // The receiver is gone once the batch was cancelled
                let _ = tx.send(result).await;
                drop(permit);
            });
        }
        drop(tx);
        tracker.close();

        let outcome = collect(rx, &cancel).await;
        // Killed children and their partial outputs must be gone before returning
        tracker.wait().await;
        outcome
    }
}

async fn run_job<I: Invoker>(
    invoker: &I,
    options: &OptionSet,
    input: &Path,
    cancel: &CancellationToken,
) -> Result<(), AppError> {
    let job = build_job(options, input);
    debug!(
        "Converting {} -> {}",
        job.input.display(),
        job.output.display()
    );

    let result = invoker.invoke(&job, cancel).await;
    match &result {
        Ok(()) => info!("Finished {}", job.filename()),
        Err(AppError::Cancelled) => {}
        Err(e) => warn!("Conversion of {} failed: {}", job.input.display(), e),
    }
    result
}
