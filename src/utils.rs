use tokio::time::{Duration, sleep};
use tracing::{debug, info, warn};

use crate::models::retry::{Attempted, RetryConfig};

fn jittered(delay_ms: u64, jitter: f64) -> u64 {
    if jitter <= 0.0 {
        return delay_ms;
    }

    let factor = rand::random_range(-jitter..=jitter);
    (delay_ms as f64 * (1.0 + factor)).max(0.0) as u64
}

/// Runs `operation` until it succeeds or `max_attempts` is reached, backing off
/// exponentially between attempts. Attempts are counted per call.
pub async fn retry_with_backoff<F, Fut, T, E>(
    config: &RetryConfig,
    mut operation: F,
) -> Result<Attempted<T>, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;
    let mut delay_ms = config.initial_delay_ms;

    loop {
        attempt += 1;

        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    info!(attempt, max_attempts, "Retry succeeded");
                }
                return Ok(Attempted {
                    value,
                    attempts: attempt,
                });
            }
            Err(e) => {
                if attempt >= max_attempts {
                    warn!(
                        max_attempts,
                        error = %e,
                        "Retry failed after exhausting all attempts"
                    );
                    return Err(e);
                }

                debug!(
                    attempt,
                    max_attempts,
                    delay_ms,
                    error = %e,
                    "Retry attempt failed, backing off"
                );

                sleep(Duration::from_millis(jittered(delay_ms, config.jitter))).await;

                delay_ms = std::cmp::min(
                    delay_ms.saturating_mul(config.backoff_multiplier),
                    config.max_delay_ms,
                );
            }
        }
    }
}
