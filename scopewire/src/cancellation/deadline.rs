//! Background timer that fires a cancellation token at an absolute instant.

use super::CancellationToken;
use crate::utils::{remaining_until, Timestamp};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::debug;

/// The cancellation reason recorded when a deadline elapses.
pub const DEADLINE_EXCEEDED: &str = "deadline exceeded";

/// tokio sleeps cap out around two years, so long waits are taken in chunks
/// with the clock re-checked between them.
const SLEEP_CHUNK: Duration = Duration::from_secs(60 * 60 * 24);

/// A background timer owned by a deadline scope layer.
///
/// The timer fires its token once the absolute deadline passes. The pending
/// sleep is released as soon as the token is cancelled by any other path,
/// or when the owning scope layer is dropped; an unreleased timer leaks only
/// until the deadline fires, which always eventually releases it.
pub struct DeadlineTimer {
    abort: AbortHandle,
}

impl DeadlineTimer {
    /// Spawns a timer that cancels `token` when `at` passes.
    ///
    /// Returns `None` when no tokio runtime is available; callers then rely
    /// on lazy expiry checks instead of a background task. A deadline already
    /// in the past fires on the next tick of the runtime.
    #[must_use]
    pub fn spawn(at: Timestamp, token: Arc<CancellationToken>) -> Option<Self> {
        let runtime = tokio::runtime::Handle::try_current().ok()?;

        let task_token = token.clone();
        let handle = runtime.spawn(async move {
            while let Some(wait) = remaining_until(at) {
                tokio::time::sleep(wait.min(SLEEP_CHUNK)).await;
            }
            debug!(deadline = %at, "deadline elapsed, cancelling scope");
            task_token.cancel(DEADLINE_EXCEEDED);
        });

        let abort = handle.abort_handle();

        // If the token is cancelled first (or by the timer itself), the
        // pending sleep is torn down immediately.
        let release = abort.clone();
        token.on_cancel(move || release.abort());

        Some(Self { abort })
    }
}

impl Drop for DeadlineTimer {
    // The owning scope layer going away means nothing is left to observe
    // the expiry; abort the pending sleep instead of letting it fire.
    fn drop(&mut self) {
        self.abort.abort();
    }
}

impl std::fmt::Debug for DeadlineTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeadlineTimer")
            .field("finished", &self.abort.is_finished())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::now_utc;
    use chrono::Duration as ChronoDuration;

    #[tokio::test]
    async fn test_timer_fires_token() {
        let token = CancellationToken::shared();
        let at = now_utc() + ChronoDuration::milliseconds(20);

        let timer = DeadlineTimer::spawn(at, token.clone());
        assert!(timer.is_some());

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(token.is_cancelled());
        assert_eq!(token.reason(), Some(DEADLINE_EXCEEDED.to_string()));
    }

    #[tokio::test]
    async fn test_timer_released_on_external_cancel() {
        let token = CancellationToken::shared();
        let at = now_utc() + ChronoDuration::seconds(60);

        let _timer = DeadlineTimer::spawn(at, token.clone()).unwrap();
        token.cancel("caller requested");

        tokio::time::sleep(Duration::from_millis(20)).await;

        // The timer never overwrote the caller's reason.
        assert_eq!(token.reason(), Some("caller requested".to_string()));
    }

    #[tokio::test]
    async fn test_drop_releases_pending_timer() {
        let token = CancellationToken::shared();
        let at = now_utc() + ChronoDuration::milliseconds(20);

        let timer = DeadlineTimer::spawn(at, token.clone()).unwrap();
        drop(timer);

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn test_past_deadline_fires_promptly() {
        let token = CancellationToken::shared();
        let at = now_utc() - ChronoDuration::seconds(1);

        let _timer = DeadlineTimer::spawn(at, token.clone()).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_far_future_deadline_sleeps_in_chunks() {
        // A saturated deadline is far beyond tokio's sleep range; the timer
        // must park without panicking and without firing.
        let token = CancellationToken::shared();

        let _timer = DeadlineTimer::spawn(Timestamp::MAX_UTC, token.clone()).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_spawn_without_runtime() {
        let token = CancellationToken::shared();
        let at = now_utc() + ChronoDuration::seconds(1);

        assert!(DeadlineTimer::spawn(at, token).is_none());
    }
}
