//! Uniform `(timestamp, value)` samples shared by every log format

use serde::Serialize;

/// Native unit of a source's timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    /// Timestamps are already seconds (or second-like counters)
    Seconds,
    /// Timestamps are integer microseconds
    Microseconds,
}

impl TimeUnit {
    /// Divisor converting a timestamp delta in this unit to seconds.
    #[must_use]
    pub const fn per_second(self) -> f64 {
        match self {
            Self::Seconds => 1.0,
            Self::Microseconds => 1e6,
        }
    }
}

/// One measurement extracted from a raw log.
///
/// The timestamp is in the source's native [`TimeUnit`] until the series is
/// normalized, after which it is relative seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RawSample {
    pub timestamp: f64,
    pub value: f64,
}

impl RawSample {
    #[must_use]
    pub const fn new(timestamp: f64, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// The sample as a `(time, value)` pair.
    #[must_use]
    pub const fn as_pair(&self) -> (f64, f64) {
        (self.timestamp, self.value)
    }
}

/// Stable in-place sort by timestamp.
pub(crate) fn sort_by_timestamp(samples: &mut [RawSample]) {
    samples.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
}

/// Index of the first sample whose timestamp is lower than its predecessor's.
pub(crate) fn first_decrease(samples: &[RawSample]) -> Option<usize> {
    samples
        .windows(2)
        .position(|pair| pair[1].timestamp < pair[0].timestamp)
        .map(|i| i + 1)
}
