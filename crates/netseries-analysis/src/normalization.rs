//! Rebasing a session onto relative time and clipping it to the analysis window
//!
//! Sessions start at unrelated wall-clock instants (or counters), so before they
//! can share an axis every session is shifted so that its first sample sits at
//! `t = 0`, converted to seconds, and cut at the window limit.
//!
//! ```text
//! raw (µs):       1_000_000   1_500_000   ...   121_000_001
//! relative (s):   0.0         0.5         ...   120.000001  <- cut here
//! ```
//!
//! Clipping is a single forward scan that stops at the first sample beyond the
//! limit; a sample exactly at the limit is kept. Samples are never reordered.
//! A timestamp lower than its predecessor breaks the extractor contract and is
//! reported as an [`OrderingError`] instead of being masked.
//!
//! # Examples
//!
//! ```
//! use netseries_analysis::{
//!     normalization::normalize,
//!     sample::{RawSample, TimeUnit},
//! };
//!
//! let samples = [
//!     RawSample::new(5_000_000.0, 10.0),
//!     RawSample::new(6_000_000.0, 12.0),
//!     RawSample::new(130_000_000.0, 9.0),
//! ];
//! let normalized = normalize(&samples, TimeUnit::Microseconds, 120.0).unwrap();
//! assert_eq!(
//!     normalized,
//!     vec![RawSample::new(0.0, 10.0), RawSample::new(1.0, 12.0)]
//! );
//! ```

use crate::sample::{RawSample, TimeUnit};

/// Default window limit, in seconds of relative time.
pub const DEFAULT_WINDOW_LIMIT: f64 = 120.0;

/// A session's timestamps decrease at `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("timestamps decrease at sample {index}")]
pub struct OrderingError {
    pub index: usize,
}

/// Rebases `samples` to the first sample's timestamp and clips at `window_limit`.
///
/// Returned timestamps are relative seconds. Empty input yields empty output.
pub fn normalize(
    samples: &[RawSample],
    unit: TimeUnit,
    window_limit: f64,
) -> Result<Vec<RawSample>, OrderingError> {
    let Some(first) = samples.first() else {
        return Ok(vec![]);
    };
    let base = first.timestamp;
    let per_second = unit.per_second();

    let mut normalized = Vec::with_capacity(samples.len());
    let mut previous = base;
    for (index, sample) in samples.iter().enumerate() {
        if sample.timestamp < previous {
            return Err(OrderingError { index });
        }
        previous = sample.timestamp;

        let relative = (sample.timestamp - base) / per_second;
        if relative > window_limit {
            break;
        }
        normalized.push(RawSample::new(relative, sample.value));
    }
    Ok(normalized)
}
