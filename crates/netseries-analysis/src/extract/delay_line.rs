use std::sync::LazyLock;

use regex::Regex;

use crate::{
    extract::{LogFormat, SampleExtractor},
    sample::{self, RawSample},
};

static DELAY_RECORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"send_time:\s*(\d+)\|delay:\s*(\d+)").expect("delay record pattern is valid")
});

/// Extracts one-way delay from `send_time:<µs>|delay:<µs>` log lines.
///
/// The record may appear anywhere in a line. Timestamps and values are both
/// microseconds; the normalizer converts the time axis to seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DelayLineExtractor;

impl DelayLineExtractor {
    #[expect(clippy::cast_precision_loss)]
    fn parse_line(line: &str) -> Option<RawSample> {
        let captures = DELAY_RECORD.captures(line)?;
        let send_time = captures[1].parse::<u64>().ok()?;
        let delay = captures[2].parse::<u64>().ok()?;
        Some(RawSample::new(send_time as f64, delay as f64))
    }
}

impl SampleExtractor for DelayLineExtractor {
    fn format(&self) -> LogFormat {
        LogFormat::DelayLine
    }

    fn extract(&self, source: &str) -> Vec<RawSample> {
        let mut samples = source
            .lines()
            .filter_map(Self::parse_line)
            .collect::<Vec<_>>();
        sample::sort_by_timestamp(&mut samples);
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_records_anywhere_in_line() {
        let source = "start\n\
                      2024-05-01 seq:1|send_time: 1000000|delay: 2500|size:1200\n\
                      seq:2|send_time:1500000|delay:3100\n\
                      seq:3|send_time:|delay:3100\n";
        assert_eq!(
            DelayLineExtractor.extract(source),
            vec![
                RawSample::new(1_000_000.0, 2500.0),
                RawSample::new(1_500_000.0, 3100.0),
            ]
        );
    }

    #[test]
    fn test_sorts_by_send_time() {
        let source = "send_time:30|delay:3\nsend_time:10|delay:1\nsend_time:20|delay:2\n";
        let times = DelayLineExtractor
            .extract(source)
            .iter()
            .map(|s| s.timestamp)
            .collect::<Vec<_>>();
        assert_eq!(times, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_overflowing_numbers_are_skipped() {
        let source = "send_time:99999999999999999999999|delay:1\nsend_time:1|delay:1\n";
        assert_eq!(DelayLineExtractor.extract(source).len(), 1);
    }
}
