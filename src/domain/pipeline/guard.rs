//! Timeout and cancellation guard for external calls

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use crate::domain::DomainError;

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Token for cooperative cancellation of a pipeline run.
///
/// Clone is cheap and shares state.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<CancelState>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Request cancellation and wake every guarded call
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Resolves once cancellation has been requested
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Bounds every external call of one run by a timeout and a cancellation token
#[derive(Debug, Clone)]
pub struct CallGuard {
    timeout: Duration,
    token: CancellationToken,
}

impl CallGuard {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            token: CancellationToken::new(),
        }
    }

    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `call`, failing with `Timeout` or `Cancelled` if it does not finish in time
    pub async fn call<T, F>(&self, operation: &'static str, call: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        if self.token.is_cancelled() {
            return Err(DomainError::cancelled(operation));
        }

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(DomainError::cancelled(operation)),
            result = tokio::time::timeout(self.timeout, call) => match result {
                Ok(inner) => inner,
                Err(_) => Err(DomainError::timeout(operation, self.timeout.as_millis() as u64)),
            },
        }
    }
}

impl Default for CallGuard {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}
