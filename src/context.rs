//! Execution context for remote operations.
//!
//! Every client operation takes a [`Context`]. A context can be cancelled
//! explicitly through its [`CancellationToken`], and may carry a deadline.
//! Requests and retry waits are raced against the context, so a cancelled
//! or expired context stops work at the next suspension point.

use crate::error::{Result, SecureSbomError};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation and deadline scope for one or more operations.
///
/// Cloning a context shares its cancellation state.
///
/// # Example
///
/// ```rust,no_run
/// use securesbom::{Config, Context, SecureSbomApi};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Config::builder().from_env().build_client()?;
///     let ctx = Context::with_timeout(Duration::from_secs(40));
///
///     client.health_check(&ctx).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().child_with_timeout(timeout)
    }

    /// A context that is cancelled when `token` is.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Derive a child context with a deadline no later than this one's.
    ///
    /// Cancelling the parent cancels the child; cancelling the child leaves
    /// the parent untouched. A timeout too large to represent as an instant
    /// adds no deadline of its own.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let deadline = match (self.deadline, Instant::now().checked_add(timeout)) {
            (Some(parent), Some(requested)) => Some(parent.min(requested)),
            (parent, None) => parent,
            (None, requested) => requested,
        };
        Self {
            token: self.token.child_token(),
            deadline,
        }
    }

    /// Cancel this context and every child derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// The token backing this context.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the reason this context is done, or `None` while it is live.
    pub fn err(&self) -> Option<SecureSbomError> {
        if self.token.is_cancelled() {
            return Some(SecureSbomError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(SecureSbomError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes,
    /// yielding the matching error.
    pub async fn done(&self) -> SecureSbomError {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => SecureSbomError::Cancelled,
                    _ = tokio::time::sleep_until(deadline) => SecureSbomError::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                SecureSbomError::Cancelled
            }
        }
    }

    /// Drive `fut` to completion unless the context finishes first.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            res = fut => res,
        }
    }

    /// Sleep for `duration` unless the context finishes first.
    pub async fn sleep(&self, duration: Duration) -> Result<()> {
        self.run(async {
            tokio::time::sleep(duration).await;
            Ok(())
        })
        .await
    }
}
