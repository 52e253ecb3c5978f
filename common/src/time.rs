//! Time helpers for rate freshness.

use chrono::{DateTime, Duration, DurationRound, Utc};

/// A timestamp with timezone (always UTC for crossrate).
pub type Timestamp = DateTime<Utc>;

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Truncate a timestamp to the start of its wall-clock hour.
///
/// Two timestamps in the same UTC hour share a bucket; a new hour always
/// yields a new bucket. This is what makes cached rates structurally
/// expire without a sweep.
pub fn hour_bucket(ts: Timestamp) -> Timestamp {
    ts.duration_trunc(Duration::hours(1)).unwrap_or(ts)
}
