//! Stop signal for the accept loop and its sessions, plus a bounded drain.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// How long `ServerHandle::shutdown` waits for sessions before giving up on them.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Cancels the listener and every session it spawned.
#[derive(Debug)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Token handed to the accept loop; sessions get clones of it.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Cancel, close `sessions`, and wait up to `timeout` for them to end.
    ///
    /// Returns `false` when the wait timed out; sessions still running at
    /// that point are left to die with the runtime.
    pub async fn drain(&self, sessions: &TaskTracker, timeout: Duration) -> bool {
        self.shutdown();
        sessions.close();
        tracing::info!(
            sessions = sessions.len(),
            timeout_secs = timeout.as_secs(),
            "waiting for sessions to finish"
        );

        if tokio::time::timeout(timeout, sessions.wait()).await.is_err() {
            tracing::warn!(
                remaining = sessions.len(),
                "shutdown timed out after {timeout:?}, some sessions may still be running"
            );
            return false;
        }
        true
    }
}
