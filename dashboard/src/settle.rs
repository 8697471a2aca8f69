use std::future::Future;
use std::time::Duration;

/// Bounded backoff used to wait for the backend to reflect a change it just accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettlePolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub factor: u32,
    pub max_delay: Duration,
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            factor: 2,
            max_delay: Duration::from_secs(8),
        }
    }
}

impl SettlePolicy {
    /// Delay before each attempt.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        let mut next = self.initial_delay;
        (0..self.max_attempts).map(move |_| {
            let current = next.min(self.max_delay);
            next = next.saturating_mul(self.factor.max(1)).min(self.max_delay);
            current
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settled<T, E> {
    /// Last value fetched, settled or not
    pub value: Option<T>,
    /// Error of the most recent failed fetch
    pub last_error: Option<E>,
    pub attempts: u32,
    pub settled: bool,
}

/// Re-fetch after each delay until `settled` holds or the attempts run out.
/// Fetch errors count as unsettled attempts.
pub async fn poll_until_settled<T, E, F, Fut, P>(
    policy: &SettlePolicy,
    mut fetch: F,
    settled: P,
) -> Settled<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&T) -> bool,
{
    let mut last = None;
    let mut last_error = None;
    let mut attempts = 0;
    for delay in policy.delays() {
        tokio::time::sleep(delay).await;
        attempts += 1;
        match fetch().await {
            Ok(value) => {
                let done = settled(&value);
                last = Some(value);
                if done {
                    tracing::debug!(attempts, "settled");
                    return Settled {
                        value: last,
                        last_error,
                        attempts,
                        settled: true,
                    };
                }
            }
            Err(e) => {
                tracing::debug!(attempts, error = %e, "settle fetch failed");
                last_error = Some(e);
            }
        }
    }
    tracing::info!(attempts, "gave up waiting for change to settle");
    Settled {
        value: last,
        last_error,
        attempts,
        settled: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn delays_back_off_and_cap() {
        let delays: Vec<u64> = SettlePolicy::default().delays().map(|d| d.as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 8]);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_as_soon_as_settled() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let outcome = poll_until_settled(
            &SettlePolicy::default(),
            || {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Ok::<u32, String>(n) }
            },
            |n| *n >= 3,
        )
        .await;
        assert!(outcome.settled);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.value, Some(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let started = tokio::time::Instant::now();
        let outcome = poll_until_settled(
            &SettlePolicy::default(),
            || async { Err::<u32, _>("connection refused") },
            |_| true,
        )
        .await;
        assert!(!outcome.settled);
        assert_eq!(outcome.attempts, 5);
        assert!(outcome.value.is_none());
        assert_eq!(outcome.last_error, Some("connection refused"));
        assert_eq!(started.elapsed(), Duration::from_secs(23));
    }
}
