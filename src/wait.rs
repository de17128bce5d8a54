use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Poll `probe` every `interval` until it yields a value or `timeout` elapses.
/// The probe always runs at least once.
pub async fn poll_until<F, Fut, T>(timeout: Duration, interval: Duration, mut probe: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(value) = probe().await {
            return Some(value);
        }
        let now = Instant::now();
        if now >= deadline {
            return None;
        }
        sleep(interval.min(deadline - now)).await;
    }
}

/// Fixed pause after an interaction.
pub async fn settle(pause: Duration) {
    if !pause.is_zero() {
        sleep(pause).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn test_returns_first_ready_value() {
        let calls = Cell::new(0);
        let value = poll_until(Duration::from_secs(1), Duration::from_millis(1), || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move { (n == 3).then_some(n) }
        })
        .await;
        assert_eq!(value, Some(3));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_times_out() {
        let value: Option<()> =
            poll_until(Duration::from_millis(20), Duration::from_millis(5), || async { None }).await;
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_zero_timeout_probes_once() {
        let calls = Cell::new(0);
        let value: Option<()> = poll_until(Duration::ZERO, Duration::from_millis(5), || {
            calls.set(calls.get() + 1);
            async { None }
        })
        .await;
        assert!(value.is_none());
        assert_eq!(calls.get(), 1);
    }
}
