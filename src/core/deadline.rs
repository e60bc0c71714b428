use std::{future::Future, time::Duration};

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Per-attempt deadline.
///
/// Each attempt owns a fresh token. When the deadline elapses first the token
/// is cancelled, which tells the transport to abandon the in-flight request;
/// nothing outside this attempt is affected.
pub struct AttemptDeadline {
    timeout: Duration,
    token: CancellationToken,
}

impl AttemptDeadline {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            token: CancellationToken::new(),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Token handed to the transport for cooperative cancellation.
    pub fn token(&self) -> CancellationToken {
        self.token.child_token()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Drive `fut` until it completes or the deadline elapses.
    ///
    /// Returns `None` on expiry, after cancelling the token.
    pub async fn race<F>(&self, fut: F) -> Option<F::Output>
    where
        F: Future,
    {
        tokio::select! {
            output = fut => Some(output),
            () = sleep(self.timeout) => {
                self.token.cancel();
                None
            }
        }
    }
}
