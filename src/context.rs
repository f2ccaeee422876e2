use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::services::ServiceError;

/// Caller-supplied deadline and cancellation signal threaded through every
/// service call. Store and cache I/O is raced against both.
#[derive(Debug, Clone, Default)]
pub struct Ctx {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Fires the cancellation signal of the `Ctx` it was created with
#[derive(Debug)]
pub struct Canceller(watch::Sender<bool>);

impl Canceller {
    pub fn cancel(&self) {
        // receivers may already be gone
        let _ = self.0.send(true);
    }
}

impl Ctx {
    /// No deadline, never cancelled
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
            cancel: None,
        }
    }

    /// Derive a cancellable context; an earlier deadline is kept.
    pub fn with_cancel(&self) -> (Ctx, Canceller) {
        let (tx, rx) = watch::channel(false);
        let ctx = Ctx {
            deadline: self.deadline,
            cancel: Some(rx),
        };
        (ctx, Canceller(tx))
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map_or(false, |rx| *rx.borrow())
    }

    /// Drive `fut` to completion unless the deadline passes or the context is
    /// cancelled first; the abandoned future is dropped.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, ServiceError>
    where
        F: Future<Output = T>,
    {
        if self.is_cancelled() {
            return Err(ServiceError::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(ServiceError::DeadlineExceeded);
            }
        }

        let mut cancel = self.cancel.clone();
        let cancelled = async {
            match cancel.as_mut() {
                Some(rx) => {
                    // a dropped Canceller without a signal never cancels
                    if rx.wait_for(|c| *c).await.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
                None => std::future::pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => Err(ServiceError::Cancelled),
            _ = expired => Err(ServiceError::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }
}
