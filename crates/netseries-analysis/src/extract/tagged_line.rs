use crate::{
    extract::{LogFormat, SampleExtractor},
    sample::{self, RawSample},
};

/// Prefix that marks a qualifying line.
pub(super) const TAG: &str = "[qperf]";

const COUNTER_FIELD: &str = "log_cnt";
const SPEED_FIELD: &str = "qperf_speed";
const SPEED_UNIT: &str = "Kbit/s";
const KILOBITS_PER_MEGABIT: f64 = 1e3;

/// Extracts throughput from `[qperf]` tagged, pipe-delimited log lines.
///
/// A qualifying line looks like:
///
/// ```text
/// [qperf]|log_cnt:3|qperf_speed:85000Kbit/s|...
/// ```
///
/// The timestamp is `log_cnt + 1`: the counter starts at zero and is emitted
/// once per reporting period, which is taken to be one second. The speed has
/// its `Kbit/s` suffix stripped and is converted to Mbit/s.
///
/// Lines without the tag, without `log_cnt`, or without a parseable
/// `qperf_speed` are skipped. Samples later than `max_time` are dropped.
/// Output is sorted by timestamp because the log gives no ordering guarantee.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaggedLineExtractor {
    max_time: f64,
}

impl TaggedLineExtractor {
    #[must_use]
    pub const fn new(max_time: f64) -> Self {
        Self { max_time }
    }

    fn parse_line(line: &str) -> Option<RawSample> {
        let rest = line.strip_prefix(TAG)?;

        let mut counter = None;
        let mut speed = None;
        for (key, value) in rest.trim().split('|').filter_map(|part| part.split_once(':')) {
            match key.trim() {
                COUNTER_FIELD => counter = Some(value),
                SPEED_FIELD => speed = Some(value),
                _ => {}
            }
        }

        let counter = counter?.trim().parse::<f64>().ok()?;
        let speed = speed?.trim();
        let speed = speed.strip_suffix(SPEED_UNIT).unwrap_or(speed);
        let kbps = speed.trim().parse::<f64>().ok()?;
        if !(counter.is_finite() && kbps.is_finite()) {
            return None;
        }

        Some(RawSample::new(counter + 1.0, kbps / KILOBITS_PER_MEGABIT))
    }
}

impl SampleExtractor for TaggedLineExtractor {
    fn format(&self) -> LogFormat {
        LogFormat::TaggedLine
    }

    fn extract(&self, source: &str) -> Vec<RawSample> {
        let mut samples = source
            .lines()
            .enumerate()
            .filter(|(_, line)| line.starts_with(TAG))
            .filter_map(|(line_no, line)| {
                let sample = Self::parse_line(line);
                if sample.is_none() {
                    tracing::debug!(line = line_no + 1, "skipping malformed tagged line");
                }
                sample
            })
            .filter(|sample| sample.timestamp <= self.max_time)
            .collect::<Vec<_>>();
        sample::sort_by_timestamp(&mut samples);
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> Vec<RawSample> {
        TaggedLineExtractor::new(120.0).extract(source)
    }

    #[test]
    fn test_parses_counter_and_speed() {
        let source = "[qperf]|log_cnt:0|qperf_speed:85000Kbit/s\n\
                      [qperf]|log_cnt:1|qperf_speed:92000Kbit/s\n";
        assert_eq!(
            extract(source),
            vec![RawSample::new(1.0, 85.0), RawSample::new(2.0, 92.0)]
        );
    }

    #[test]
    fn test_skips_untagged_and_incomplete_lines() {
        let source = "connection established\n\
                      [qperf]|log_cnt:0\n\
                      [qperf]|qperf_speed:1000Kbit/s\n\
                      [qperf]|log_cnt:x|qperf_speed:1000Kbit/s\n\
                      [qperf]|log_cnt:2|qperf_speed:fastKbit/s\n\
                      info [qperf]|log_cnt:3|qperf_speed:1000Kbit/s\n\
                      [qperf]|log_cnt:4|rtt:12ms|qperf_speed:2500Kbit/s|loss:0\n";
        assert_eq!(extract(source), vec![RawSample::new(5.0, 2.5)]);
    }

    #[test]
    fn test_sorts_and_clips() {
        let source = "[qperf]|log_cnt:5|qperf_speed:5000Kbit/s\n\
                      [qperf]|log_cnt:119|qperf_speed:1000Kbit/s\n\
                      [qperf]|log_cnt:120|qperf_speed:1000Kbit/s\n\
                      [qperf]|log_cnt:2|qperf_speed:2000Kbit/s\r\n";
        assert_eq!(
            extract(source),
            vec![
                RawSample::new(3.0, 2.0),
                RawSample::new(6.0, 5.0),
                RawSample::new(120.0, 1.0),
            ]
        );
    }

    #[test]
    fn test_speed_without_unit() {
        assert_eq!(
            extract("[qperf]|log_cnt:0|qperf_speed: 1500 \n"),
            vec![RawSample::new(1.0, 1.5)]
        );
    }
}
