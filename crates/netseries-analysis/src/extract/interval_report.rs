use serde::Deserialize;

use crate::{
    extract::{LogFormat, SampleExtractor},
    sample::{self, RawSample},
};

const BITS_PER_MEGABIT: f64 = 1e6;

/// Extracts throughput from iperf3 JSON interval reports.
///
/// Each entry of the top-level `intervals` array contributes one sample from
/// its `sum.start` (seconds) and `sum.bits_per_second`, converted to Mbit/s.
/// Entries starting after `max_start` are dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalReportExtractor {
    max_start: f64,
}

#[derive(Debug, Deserialize)]
struct Report {
    #[serde(default)]
    intervals: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Interval {
    sum: IntervalSum,
}

#[derive(Debug, Deserialize)]
struct IntervalSum {
    start: Option<f64>,
    bits_per_second: Option<f64>,
}

impl IntervalReportExtractor {
    #[must_use]
    pub const fn new(max_start: f64) -> Self {
        Self { max_start }
    }

    fn parse_interval(&self, index: usize, value: serde_json::Value) -> Option<RawSample> {
        let interval = match serde_json::from_value::<Interval>(value) {
            Ok(interval) => interval,
            Err(err) => {
                tracing::debug!(index, %err, "skipping malformed interval");
                return None;
            }
        };
        let IntervalSum {
            start: Some(start),
            bits_per_second: Some(bps),
        } = interval.sum
        else {
            tracing::debug!(index, "skipping interval without start or bits_per_second");
            return None;
        };
        if start > self.max_start {
            return None;
        }
        Some(RawSample::new(start, bps / BITS_PER_MEGABIT))
    }
}

impl SampleExtractor for IntervalReportExtractor {
    fn format(&self) -> LogFormat {
        LogFormat::IntervalReport
    }

    fn extract(&self, source: &str) -> Vec<RawSample> {
        let report = match serde_json::from_str::<Report>(source) {
            Ok(report) => report,
            Err(err) => {
                tracing::warn!(%err, "interval report is not valid JSON");
                return vec![];
            }
        };

        let mut samples = report
            .intervals
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| self.parse_interval(index, value))
            .collect::<Vec<_>>();

        // iperf emits intervals in order; anything else means a damaged report.
        if let Some(index) = sample::first_decrease(&samples) {
            tracing::warn!(index, "interval starts decrease; sorting samples");
            sample::sort_by_timestamp(&mut samples);
        }
        samples
    }
}
