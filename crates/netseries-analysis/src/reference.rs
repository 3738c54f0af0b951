//! Piecewise-constant reference bands
//!
//! Experiments reconfigure the bottleneck link on a schedule (for example a new
//! bandwidth cap every 15 seconds). The schedule is a list of `(time, level)`
//! changes; [`ReferenceSchedule::segments`] turns it into contiguous
//! [`ReferenceSegment`]s that a figure can draw behind the measured series.
//!
//! ```text
//! changes:  (0, 85.42) (15, 72.80) (30, 110.14) ...
//! segments: [0,15)@85.42 [15,30)@72.80 [30,45)@110.14 ... [105,120)@98.54
//! ```

use serde::{Deserialize, Serialize};

/// Bandwidth schedule (seconds, Mbit/s) used by the reference experiments.
pub const DEFAULT_BANDWIDTH_CHANGES: [(f64, f64); 8] = [
    (0.0, 85.42),
    (15.0, 72.80),
    (30.0, 110.14),
    (45.0, 105.71),
    (60.0, 63.93),
    (75.0, 92.89),
    (90.0, 80.37),
    (105.0, 98.54),
];

/// One constant stretch of the reference signal, covering `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSegment {
    pub start: f64,
    pub end: f64,
    pub level: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ReferenceError {
    #[display("reference change {index} has a non-finite time or level")]
    NonFinite { index: usize },
    #[display("reference window end must be positive and finite, got {window_end}")]
    InvalidWindowEnd { window_end: f64 },
}

/// A list of `(time, level)` changes describing the reference signal.
///
/// Serialized as `{ "changes": [[0, 85.42], [15, 72.8], ...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSchedule {
    pub changes: Vec<(f64, f64)>,
}

impl Default for ReferenceSchedule {
    fn default() -> Self {
        Self {
            changes: DEFAULT_BANDWIDTH_CHANGES.to_vec(),
        }
    }
}

impl ReferenceSchedule {
    /// Builds contiguous segments covering `[first change, window_end]`.
    ///
    /// Changes are sorted by time first. Each segment ends where the next one
    /// starts and the last ends at `window_end`. Changes at or after
    /// `window_end` are dropped, and when two changes share a time the later
    /// one in the list wins.
    pub fn segments(&self, window_end: f64) -> Result<Vec<ReferenceSegment>, ReferenceError> {
        if !(window_end.is_finite() && window_end > 0.0) {
            return Err(ReferenceError::InvalidWindowEnd { window_end });
        }
        if let Some(index) = self
            .changes
            .iter()
            .position(|(time, level)| !(time.is_finite() && level.is_finite()))
        {
            return Err(ReferenceError::NonFinite { index });
        }

        let mut changes = self
            .changes
            .iter()
            .copied()
            .filter(|(time, _)| *time < window_end)
            .collect::<Vec<_>>();
        changes.sort_by(|a, b| a.0.total_cmp(&b.0));

        let segments = changes
            .iter()
            .enumerate()
            .filter_map(|(i, &(start, level))| {
                let end = changes.get(i + 1).map_or(window_end, |next| next.0);
                (end > start).then_some(ReferenceSegment { start, end, level })
            })
            .collect();
        Ok(segments)
    }
}
