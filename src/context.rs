use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Reason a guarded backend call was abandoned.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("context cancelled")]
    Cancelled,

    #[error("deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),
}

/// Cancellation context handed to every backend call.
///
/// All contexts created by one hook share its token, so cancelling the
/// hook is observed by in-flight and future calls alike. The optional
/// timeout bounds a single call.
#[derive(Debug, Clone)]
pub struct CallContext {
    token: CancellationToken,
    timeout: Option<Duration>,
}

impl CallContext {
    pub fn new(token: CancellationToken) -> Self {
        CallContext { token, timeout: None }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Drive `fut` until it completes, the token is cancelled or the
    /// timeout elapses, whichever comes first.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, ContextError>
    where
        F: Future<Output = T>,
    {
        if self.token.is_cancelled() {
            return Err(ContextError::Cancelled);
        }

        match self.timeout {
            Some(limit) => tokio::select! {
                biased;
                _ = self.token.cancelled() => Err(ContextError::Cancelled),
                res = tokio::time::timeout(limit, fut) => {
                    res.map_err(|_| ContextError::DeadlineExceeded(limit))
                }
            },
            None => tokio::select! {
                biased;
                _ = self.token.cancelled() => Err(ContextError::Cancelled),
                out = fut => Ok(out),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_returns_output_when_live() {
        let ctx = CallContext::new(CancellationToken::new());
        assert_eq!(ctx.run(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn run_refuses_after_cancel() {
        let token = CancellationToken::new();
        let ctx = CallContext::new(token.clone());
        token.cancel();
        assert!(ctx.is_cancelled());
        assert_eq!(ctx.run(async { 7 }).await, Err(ContextError::Cancelled));
    }

    #[tokio::test]
    async fn cancel_interrupts_pending_call() {
        let token = CancellationToken::new();
        let ctx = CallContext::new(token.clone());

        let pending = tokio::spawn(async move { ctx.run(std::future::pending::<()>()).await });
        token.cancel();

        assert_eq!(pending.await.unwrap(), Err(ContextError::Cancelled));
    }

    #[tokio::test]
    async fn timeout_bounds_a_single_call() {
        let limit = Duration::from_millis(20);
        let ctx = CallContext::new(CancellationToken::new()).with_timeout(Some(limit));
        let res = ctx.run(tokio::time::sleep(Duration::from_secs(5))).await;
        assert_eq!(res, Err(ContextError::DeadlineExceeded(limit)));
    }

    #[test]
    fn clones_share_the_token() {
        let ctx = CallContext::new(CancellationToken::new());
        let other = ctx.clone().with_timeout(Some(Duration::from_secs(1)));
        ctx.token().cancel();
        assert!(other.is_cancelled());
    }
}
