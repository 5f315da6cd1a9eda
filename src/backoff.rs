//! Reconnect delay schedule shared by the log watcher and the update poller.

use std::time::Duration;

/// Delay used after the first failure.
const BASE_DELAY: Duration = Duration::from_secs(1);

/// Exponential backoff: 1s, 2s, 4s, ... capped at `max`.
///
/// `failures == 0` yields the base delay, which is also what a clean
/// stream close waits before reconnecting.
#[must_use]
pub fn backoff_delay(failures: u32, max: Duration) -> Duration {
    let exp = failures.saturating_sub(1).min(16);
    BASE_DELAY
        .checked_mul(1u32 << exp)
        .unwrap_or(max)
        .min(max)
}
