use crate::error::AppError;
use std::collections::BTreeSet;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Distinct failure messages collected from a batch
#[derive(Debug, Default)]
pub struct ErrorAggregator {
    failures: BTreeSet<String>,
}

impl ErrorAggregator {
    pub fn record(&mut self, result: Result<(), AppError>) {
        if let Err(e) = result {
            self.failures.insert(e.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// `Ok` when nothing failed, otherwise one error listing every message in order
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            return Ok(());
        }
        Err(AppError::Batch(self.failures.into_iter().collect()))
    }
}

/// Drain job results until every sender is gone or `cancel` fires.
///
/// Cancellation wins over completeness: whatever was collected so far is returned.
pub async fn collect(
    mut results: Receiver<Result<(), AppError>>,
    cancel: &CancellationToken,
) -> Result<(), AppError> {
    let mut aggregator = ErrorAggregator::default();
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Batch cancelled with {} failure(s) collected", aggregator.len());
                break;
            }
            result = results.recv() => match result {
                Some(result) => aggregator.record(result),
                None => break,
            },
        }
    }
    aggregator.into_result()
}
