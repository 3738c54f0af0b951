//! Sample extraction from raw measurement logs
//!
//! Every supported log format implements [`SampleExtractor`], which turns the
//! full text of one log into an ordered sequence of [`RawSample`]s. The rest of
//! the pipeline only sees samples and a [`TimeUnit`], never the format.
//!
//! # Formats
//!
//! | [`LogFormat`]    | Source                              | Timestamp     | Value          |
//! |------------------|-------------------------------------|---------------|----------------|
//! | `IntervalReport` | iperf3 `--json` output              | interval start (s) | Mbit/s    |
//! | `TaggedLine`     | `[qperf]\|key:value\|...` text log  | `log_cnt + 1` | Mbit/s         |
//! | `DelayLine`      | `send_time:<µs>\|delay:<µs>` text   | send time (µs) | delay (µs)    |
//!
//! # Error Policy
//!
//! Extraction never fails. Malformed records and lines are skipped (logged at
//! `debug`), and a source without any usable record yields an empty vector,
//! which callers treat as "no session".
//!
//! # Examples
//!
//! ```
//! use std::path::Path;
//!
//! use netseries_analysis::extract::{ExtractorConfig, LogFormat};
//!
//! let content = "[qperf]|log_cnt:0|qperf_speed:85000Kbit/s\n";
//! let format = LogFormat::detect(Path::new("runs/cubic.txt"), content).unwrap();
//! assert_eq!(format, LogFormat::TaggedLine);
//!
//! let samples = format.extractor(&ExtractorConfig::default()).extract(content);
//! assert_eq!(samples.len(), 1);
//! assert_eq!(samples[0].value, 85.0);
//! ```

use std::path::Path;

use serde::Serialize;

use crate::sample::{RawSample, TimeUnit};

pub use self::{
    delay_line::DelayLineExtractor, interval_report::IntervalReportExtractor,
    tagged_line::TaggedLineExtractor,
};

mod delay_line;
mod interval_report;
mod tagged_line;

/// File name every delay-measurement run writes its log to.
pub const DELAY_LOG_FILE_NAME: &str = "client_log.txt";

/// Extracts ordered `(timestamp, value)` samples from one raw log.
pub trait SampleExtractor {
    /// The format this extractor understands.
    fn format(&self) -> LogFormat;

    /// Native unit of the timestamps this extractor emits.
    fn unit(&self) -> TimeUnit {
        self.format().unit()
    }

    /// Parses the complete text of a log.
    ///
    /// The returned samples are sorted by non-decreasing timestamp.
    fn extract(&self, source: &str) -> Vec<RawSample>;
}

pub type BoxedSampleExtractor = Box<dyn SampleExtractor>;

/// Tunables shared by the extractors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractorConfig {
    /// Records whose (source-relative) time exceeds this are discarded.
    ///
    /// Applies to the interval-report and tagged-line formats, whose
    /// timestamps already count seconds from the start of the run.
    pub max_time: f64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self { max_time: 120.0 }
    }
}

/// Supported raw log formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Structured interval reports (iperf3 JSON)
    IntervalReport,
    /// Pipe-delimited `[qperf]` lines
    TaggedLine,
    /// `send_time`/`delay` lines
    DelayLine,
}

impl LogFormat {
    /// Native timestamp unit of the format.
    #[must_use]
    pub const fn unit(self) -> TimeUnit {
        match self {
            Self::IntervalReport | Self::TaggedLine => TimeUnit::Seconds,
            Self::DelayLine => TimeUnit::Microseconds,
        }
    }

    /// Builds the extractor for this format.
    #[must_use]
    pub fn extractor(self, config: &ExtractorConfig) -> BoxedSampleExtractor {
        match self {
            Self::IntervalReport => Box::new(IntervalReportExtractor::new(config.max_time)),
            Self::TaggedLine => Box::new(TaggedLineExtractor::new(config.max_time)),
            Self::DelayLine => Box::new(DelayLineExtractor),
        }
    }

    /// Detects the format of a log from its path and content.
    ///
    /// - `.json` files are interval reports
    /// - `client_log.txt`, or text containing `send_time:`, is a delay log
    /// - other `.txt`/`.log` files are tagged-line logs if any line carries the
    ///   `[qperf]` tag
    ///
    /// Returns `None` for anything else.
    #[must_use]
    pub fn detect(path: &Path, content: &str) -> Option<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let file_name = path.file_name().and_then(|name| name.to_str());

        match extension.as_deref() {
            Some("json") => Some(Self::IntervalReport),
            Some("txt" | "log") => {
                if file_name == Some(DELAY_LOG_FILE_NAME) || content.contains("send_time:") {
                    Some(Self::DelayLine)
                } else if content
                    .lines()
                    .any(|line| line.starts_with(tagged_line::TAG))
                {
                    Some(Self::TaggedLine)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Session name for a log at `path`.
    ///
    /// Delay logs always share the same file name, so their session is named
    /// after the directory holding them. Other formats use the file stem.
    #[must_use]
    pub fn session_name(self, path: &Path) -> String {
        let from_parent = || {
            path.parent()
                .and_then(Path::file_name)
                .map(|name| name.to_string_lossy().into_owned())
        };
        let from_stem = || {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        };

        let name = match self {
            Self::DelayLine => from_parent().or_else(from_stem),
            Self::IntervalReport | Self::TaggedLine => from_stem(),
        };
        name.unwrap_or_else(|| path.display().to_string())
    }
}
