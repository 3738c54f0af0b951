//! Turning raw network-measurement logs into aligned, comparable series
//!
//! Measurement runs write their results in different formats and start at
//! unrelated times. This crate brings them onto one time axis:
//!
//! 1. **Extract** ([`extract`]): parse a log into `(timestamp, value)` samples
//!    ([`sample::RawSample`]), one [`session::Session`] per log
//! 2. **Normalize** ([`normalization`]): rebase to relative seconds and clip to
//!    the analysis window
//! 3. **Align** ([`series`]): bin onto a shared window and average per bucket,
//!    collecting one [`series::AlignedSeries`] per session
//! 4. **Compare**: per-bucket fairness across sessions
//!    ([`series::SeriesCollection::fairness_over_time`])
//! 5. **Hand off** ([`figure`]): package the series, [`reference`] bands, and
//!    style for the renderer
//!
//! # Examples
//!
//! ```
//! use std::path::Path;
//!
//! use netseries_analysis::{extract::ExtractorConfig, series::SeriesCollection, session::Session};
//! use netseries_stats::binning::{BinningWindow, EmptyBucketPolicy};
//!
//! let config = ExtractorConfig::default();
//! let sessions = [
//!     (
//!         "runs/cubic.json",
//!         r#"{ "intervals": [{ "sum": { "start": 0, "bits_per_second": 85000000 } }] }"#,
//!     ),
//!     ("runs/LIFE.txt", "[qperf]|log_cnt:0|qperf_speed:85000Kbit/s\n"),
//! ]
//! .iter()
//! .filter_map(|(path, content)| Session::from_log(Path::new(path), content, &config))
//! .collect::<Vec<_>>();
//!
//! let window = BinningWindow::default();
//! let collection =
//!     SeriesCollection::from_sessions(&sessions, window, EmptyBucketPolicy::Zero).unwrap();
//! assert_eq!(collection.len(), 2);
//! assert_eq!(collection.get("cubic").unwrap().values[0], 85.0);
//! assert_eq!(collection.fairness_over_time()[0], Some(1.0));
//! ```

pub mod extract;
pub mod figure;
pub mod normalization;
pub mod reference;
pub mod sample;
pub mod series;
pub mod session;
