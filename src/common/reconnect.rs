//! Exponential backoff for the IRC reconnection loop.

use std::time::Duration;

use backon::{BackoffBuilder, ExponentialBuilder};

/// Delay before the first reconnection attempt.
pub const INITIAL_DELAY: Duration = Duration::from_secs(5);

/// Upper bound for the delay between attempts.
pub const MAX_DELAY: Duration = Duration::from_secs(300);

/// Create an exponential backoff iterator for reconnection.
/// 5s initial, 5min max, factor 1.5, with jitter, unlimited retries.
pub fn connection_backoff() -> impl Iterator<Item = Duration> {
    ExponentialBuilder::default()
        .with_min_delay(INITIAL_DELAY)
        .with_max_delay(MAX_DELAY)
        .with_factor(1.5)
        .with_jitter()
        .without_max_times()
        .build()
}
