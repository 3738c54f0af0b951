//! Fixed-width time binning for cross-session alignment
//!
//! This module partitions an analysis window `[0, max_time]` into contiguous,
//! equal-width buckets and averages the values that fall into each one.
//!
//! # Bucket Layout
//!
//! ```text
//! 0          w          2w               (n-1)w       max_time
//! |----------|----------|-- ... ---------|-------------|
//!   bucket 0   bucket 1                    bucket n-1
//! ```
//!
//! - `n = ceil(max_time / bucket_width)`
//! - Every bucket is half-open `[start, end)`, except that a sample at exactly
//!   `max_time` belongs to the last bucket
//! - When `bucket_width` does not evenly divide `max_time`, the last bucket is
//!   narrower and its center is the midpoint of its ragged bounds
//!
//! Bucket centers depend only on the window, so every session binned with the
//! same [`BinningWindow`] shares the same time axis and can be compared
//! bucket-by-bucket without interpolation.
//!
//! # Examples
//!
//! ```
//! use netseries_stats::binning::{BinningWindow, EmptyBucketPolicy};
//!
//! let window = BinningWindow::new(4.0, 1.0).unwrap();
//! assert_eq!(window.bucket_centers(), vec![0.5, 1.5, 2.5, 3.5]);
//!
//! let samples = [(0.2, 10.0), (0.7, 20.0), (3.0, 5.0)];
//! let values = window.aggregate(samples, EmptyBucketPolicy::Zero);
//! assert_eq!(values, vec![15.0, 0.0, 0.0, 5.0]);
//! ```

use std::ops::Range;

use serde::Serialize;

/// Default analysis window length in seconds.
pub const DEFAULT_MAX_TIME: f64 = 120.0;

/// Default bucket width in seconds.
pub const DEFAULT_BUCKET_WIDTH: f64 = 1.0;

/// Relative tolerance used when deciding whether `max_time / bucket_width`
/// is an integer.
const RATIO_EPSILON: f64 = 1e-9;

/// Error returned when a binning window is constructed from invalid bounds.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
pub enum WindowError {
    #[display("window length must be positive and finite, got {max_time}")]
    InvalidMaxTime { max_time: f64 },
    #[display("bucket width must be positive and finite, got {bucket_width}")]
    InvalidBucketWidth { bucket_width: f64 },
}

/// What an empty bucket resolves to after aggregation.
///
/// Sparse sessions leave buckets without any samples. The default policy
/// fills them with `0.0`, which plots as a drop to zero; `Nan` leaves a gap
/// for consumers that can distinguish missing data from zero throughput.
#[derive(
    Default,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    derive_more::FromStr,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum EmptyBucketPolicy {
    #[default]
    #[display("zero")]
    Zero,
    #[display("nan")]
    Nan,
}

impl EmptyBucketPolicy {
    /// The value written into a bucket that received no samples.
    #[must_use]
    pub const fn fill_value(self) -> f64 {
        match self {
            Self::Zero => 0.0,
            Self::Nan => f64::NAN,
        }
    }
}

/// A validated `[0, max_time]` window split into fixed-width buckets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BinningWindow {
    max_time: f64,
    bucket_width: f64,
}

impl Default for BinningWindow {
    fn default() -> Self {
        Self {
            max_time: DEFAULT_MAX_TIME,
            bucket_width: DEFAULT_BUCKET_WIDTH,
        }
    }
}

impl BinningWindow {
    /// Creates a window, rejecting non-positive or non-finite bounds.
    pub fn new(max_time: f64, bucket_width: f64) -> Result<Self, WindowError> {
        if !(max_time.is_finite() && max_time > 0.0) {
            return Err(WindowError::InvalidMaxTime { max_time });
        }
        if !(bucket_width.is_finite() && bucket_width > 0.0) {
            return Err(WindowError::InvalidBucketWidth { bucket_width });
        }
        Ok(Self {
            max_time,
            bucket_width,
        })
    }

    #[must_use]
    pub fn max_time(&self) -> f64 {
        self.max_time
    }

    #[must_use]
    pub fn bucket_width(&self) -> f64 {
        self.bucket_width
    }

    /// Number of buckets covering the window: `ceil(max_time / bucket_width)`.
    ///
    /// Ratios within a relative epsilon of an integer are treated as exact, so
    /// that widths such as `0.1` do not produce a spurious extra bucket.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        let ratio = self.max_time / self.bucket_width;
        let rounded = ratio.round();
        let count = if (ratio - rounded).abs() <= RATIO_EPSILON * rounded.max(1.0) {
            rounded
        } else {
            ratio.ceil()
        };
        (count as usize).max(1)
    }

    /// Bounds `[start, end)` of bucket `index`.
    ///
    /// The final bucket ends at `max_time`, even when that makes it narrower
    /// than the others.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn bucket_bounds(&self, index: usize) -> Range<f64> {
        let start = index as f64 * self.bucket_width;
        let end = if index + 1 >= self.bucket_count() {
            self.max_time
        } else {
            ((index + 1) as f64 * self.bucket_width).min(self.max_time)
        };
        start..end
    }

    /// Midpoints of every bucket, in order.
    #[must_use]
    pub fn bucket_centers(&self) -> Vec<f64> {
        (0..self.bucket_count())
            .map(|i| {
                let Range { start, end } = self.bucket_bounds(i);
                f64::midpoint(start, end)
            })
            .collect()
    }

    /// Index of the bucket containing `time`, if it lies within the window.
    ///
    /// `time == max_time` maps to the last bucket. Negative, NaN, and
    /// out-of-window times return `None`.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn bucket_index(&self, time: f64) -> Option<usize> {
        if !(0.0..=self.max_time).contains(&time) {
            return None;
        }
        let last = self.bucket_count() - 1;
        if time >= self.max_time {
            return Some(last);
        }

        let mut index = ((time / self.bucket_width).floor() as usize).min(last);
        // Division can land one bucket off near a boundary; settle on the
        // bucket whose bounds actually contain `time`.
        if index > 0 && time < self.bucket_bounds(index).start {
            index -= 1;
        } else if index < last && time >= self.bucket_bounds(index + 1).start {
            index += 1;
        }
        Some(index)
    }

    /// Averages `(time, value)` samples per bucket.
    ///
    /// Samples outside the window are ignored. Buckets without samples are
    /// filled according to `policy`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn aggregate<I>(&self, samples: I, policy: EmptyBucketPolicy) -> Vec<f64>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let count = self.bucket_count();
        let mut sums = vec![0.0; count];
        let mut counts = vec![0_usize; count];

        for (time, value) in samples {
            if let Some(index) = self.bucket_index(time) {
                sums[index] += value;
                counts[index] += 1;
            }
        }

        sums.into_iter()
            .zip(counts)
            .map(|(sum, n)| {
                if n == 0 {
                    policy.fill_value()
                } else {
                    sum / n as f64
                }
            })
            .collect()
    }
}
