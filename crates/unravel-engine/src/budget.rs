use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::OracleError;

/// Time and cancellation budget for one deobfuscation run.
///
/// Stages check [`Budget::exhausted`] before starting; awaited oracle calls
/// are raced against the deadline and the token via [`Budget::guard`].
#[derive(Debug, Clone)]
pub(crate) struct Budget {
    deadline: Instant,
    timeout_ms: u64,
    cancel: CancellationToken,
}

impl Budget {
    pub(crate) fn new(timeout_ms: u64, cancel: CancellationToken) -> Self {
        Self {
            deadline: Instant::now() + Duration::from_millis(timeout_ms),
            timeout_ms,
            cancel,
        }
    }

    pub(crate) fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn exhausted(&self) -> bool {
        self.cancel.is_cancelled() || Instant::now() >= self.deadline
    }

    pub(crate) async fn guard<T, F>(&self, call: F) -> Result<T, OracleError>
    where
        F: Future<Output = Result<T, OracleError>>,
    {
        tokio::select! {
            result = call => result,
            _ = self.cancel.cancelled() => Err(OracleError::Cancelled),
            _ = tokio::time::sleep_until(self.deadline) => Err(OracleError::Timeout(self.timeout_ms)),
        }
    }
}
