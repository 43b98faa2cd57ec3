//! Cancellable call context for remote peer operations.
//!
//! Every `RemotePeer` call receives a `CallContext`. Transports wrap their
//! I/O in [`CallContext::run`] so cancellation and deadlines fail the call
//! promptly instead of letting it hang.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::PeerError;

/// Cancellation token plus optional deadline for one logical call.
///
/// Cheap to clone; clones share the same cancellation state.
#[derive(Clone, Debug, Default)]
pub struct CallContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context with no deadline that is only cancelled explicitly.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// Derive a context that is cancelled whenever `self` is, with the
    /// earlier of the two deadlines.
    pub fn child(&self, timeout: Option<Duration>) -> Self {
        let deadline = match (self.deadline, timeout.map(|t| Instant::now() + t)) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Self {
            cancel: self.cancel.child_token(),
            deadline,
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Drive `fut` until it completes, the context is cancelled or the
    /// deadline passes, whichever happens first.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, PeerError>
    where
        F: Future<Output = Result<T, PeerError>>,
    {
        if self.is_cancelled() {
            return Err(PeerError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(PeerError::Cancelled),
            _ = wait_until(self.deadline) => Err(PeerError::DeadlineExceeded),
            out = fut => out,
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_completes() {
        let ctx = CallContext::new();
        let out = ctx.run(async { Ok::<_, PeerError>(7) }).await;
        assert_eq!(out, Ok(7));
    }

    #[tokio::test]
    async fn test_run_cancelled_before_start() {
        let ctx = CallContext::new();
        ctx.cancel();
        let out = ctx.run(async { Ok::<_, PeerError>(7) }).await;
        assert_eq!(out, Err(PeerError::Cancelled));
    }

    #[tokio::test]
    async fn test_run_cancelled_while_pending() {
        let ctx = CallContext::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let out = ctx
            .run(std::future::pending::<Result<(), PeerError>>())
            .await;
        assert_eq!(out, Err(PeerError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_deadline_exceeded() {
        let ctx = CallContext::with_timeout(Duration::from_millis(50));
        let out = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, PeerError>(())
            })
            .await;
        assert_eq!(out, Err(PeerError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_child_follows_parent_cancel() {
        let parent = CallContext::new();
        let child = parent.child(Some(Duration::from_secs(1)));
        assert!(child.deadline().is_some());

        parent.cancel();
        assert!(child.is_cancelled());
    }

    #[test]
    fn test_child_keeps_earlier_deadline() {
        let parent = CallContext::with_timeout(Duration::from_millis(10));
        let child = parent.child(Some(Duration::from_secs(60)));
        assert_eq!(child.deadline(), parent.deadline());
    }
}
