//! Global minimum-interval rate limiting.
//!
//! One limiter instance is shared by every outbound call in the process;
//! it guarantees that no two requests are dispatched closer together than
//! the caller-supplied minimum interval, measured dispatch-start to
//! dispatch-start.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// Minimum-interval rate limiter.
///
/// The last-dispatch timestamp is a critical section: callers queue on an
/// async mutex, so concurrent waiters are granted one at a time and never
/// observe a stale timestamp. The limiter never errors and has no budget
/// notion; it only delays.
#[derive(Debug, Default)]
pub struct RateLimiter {
    last_dispatch: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a new limiter with no dispatch history.
    pub fn new() -> Self {
        Self {
            last_dispatch: Mutex::new(None),
        }
    }

    /// Create a new shared limiter wrapped in [`Arc`].
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Suspend until at least `min_interval` has elapsed since the start of
    /// the previous granted dispatch, then record the new dispatch time.
    ///
    /// Holding the lock across the sleep serializes concurrent callers; the
    /// mutex's wakeup order gives FIFO-ish behavior without busy-waiting.
    pub async fn wait(&self, min_interval: Duration) {
        let mut last = self.last_dispatch.lock().await;

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < min_interval {
                sleep(min_interval - elapsed).await;
            }
        }

        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_wait_is_immediate() {
        let limiter = RateLimiter::new();
        let started = Instant::now();
        limiter.wait(Duration::from_millis(200)).await;
        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_sequential_waits_respect_interval() {
        let limiter = RateLimiter::new();
        let started = Instant::now();
        limiter.wait(Duration::from_millis(50)).await;
        limiter.wait(Duration::from_millis(50)).await;
        limiter.wait(Duration::from_millis(50)).await;
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_concurrent_waits_are_serialized() {
        let limiter = RateLimiter::shared();
        let interval = Duration::from_millis(100);
        let started = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move {
                limiter.wait(interval).await;
            }));
        }
        for handle in handles {
            handle.await.expect("waiter should not panic");
        }

        // Four dispatches need at least three full intervals between them.
        assert!(started.elapsed() >= Duration::from_millis(300));
    }
}
