//! Aligned per-session series and cross-session comparison
//!
//! Each session is normalized and binned onto a shared [`BinningWindow`],
//! producing an [`AlignedSeries`]. Because bucket centers depend only on the
//! window, series in one [`SeriesCollection`] line up bucket-for-bucket and can
//! be compared (or scored for fairness) without resampling.
//!
//! # Pipeline
//!
//! ```text
//! Session ──normalize──> relative samples ──bin + mean──> AlignedSeries
//!                                                            │
//!                             SeriesCollection (by name) <───┘
//!                                      │
//!                         fairness_over_time / window_means
//! ```
//!
//! # Examples
//!
//! ```
//! use netseries_analysis::{
//!     extract::{ExtractorConfig, LogFormat},
//!     series::SeriesCollection,
//!     session::Session,
//! };
//! use netseries_stats::binning::{BinningWindow, EmptyBucketPolicy};
//!
//! let config = ExtractorConfig::default();
//! let a = Session::extract(
//!     "a",
//!     LogFormat::TaggedLine,
//!     "[qperf]|log_cnt:0|qperf_speed:10000Kbit/s\n",
//!     &config,
//! );
//! let b = Session::extract(
//!     "b",
//!     LogFormat::TaggedLine,
//!     "[qperf]|log_cnt:0|qperf_speed:10000Kbit/s\n",
//!     &config,
//! );
//!
//! let window = BinningWindow::new(2.0, 1.0).unwrap();
//! let collection =
//!     SeriesCollection::from_sessions(&[a, b], window, EmptyBucketPolicy::Zero).unwrap();
//! assert_eq!(collection.fairness_over_time(), vec![Some(1.0), None]);
//! ```

use std::collections::BTreeMap;

use netseries_stats::{
    binning::{BinningWindow, EmptyBucketPolicy},
    descriptive::DescriptiveStats,
    fairness,
};
use serde::Serialize;

use crate::{normalization::OrderingError, sample::RawSample, session::Session};

/// One session's values on the shared bucket axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedSeries {
    pub name: String,
    pub bucket_centers: Vec<f64>,
    pub values: Vec<f64>,
}

impl AlignedSeries {
    /// Bins already-normalized samples (relative seconds) onto `window`.
    #[must_use]
    pub fn from_samples(
        name: impl Into<String>,
        samples: &[RawSample],
        window: &BinningWindow,
        policy: EmptyBucketPolicy,
    ) -> Self {
        Self {
            name: name.into(),
            bucket_centers: window.bucket_centers(),
            values: window.aggregate(samples.iter().map(RawSample::as_pair), policy),
        }
    }

    /// Normalizes a session to the window length and bins it.
    pub fn from_session(
        session: &Session,
        window: &BinningWindow,
        policy: EmptyBucketPolicy,
    ) -> Result<Self, OrderingError> {
        let samples = session.normalized(window.max_time())?;
        Ok(Self::from_samples(&session.name, &samples, window, policy))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Summary of the bucket values (NaN buckets excluded).
    #[must_use]
    pub fn stats(&self) -> Option<DescriptiveStats> {
        DescriptiveStats::new(self.values.iter().copied())
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum CollectionError {
    #[display("duplicate session name '{name}'")]
    DuplicateName { name: String },
    #[display("series '{name}' was binned on a different window")]
    WindowMismatch { name: String },
    #[display("session '{name}' is out of order: {source}")]
    Ordering { name: String, source: OrderingError },
}

/// Aligned series keyed by session name, all sharing one window.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesCollection {
    window: BinningWindow,
    series: BTreeMap<String, AlignedSeries>,
}

impl SeriesCollection {
    #[must_use]
    pub fn new(window: BinningWindow) -> Self {
        Self {
            window,
            series: BTreeMap::new(),
        }
    }

    /// Aligns every non-empty session onto `window`.
    ///
    /// Sessions without samples are left out. When several sessions share a
    /// name, the first one is kept and the rest are skipped with a warning.
    pub fn from_sessions(
        sessions: &[Session],
        window: BinningWindow,
        policy: EmptyBucketPolicy,
    ) -> Result<Self, CollectionError> {
        let mut collection = Self::new(window);
        for session in sessions {
            if session.is_empty() {
                tracing::info!(session = %session.name, "no samples; excluded");
                continue;
            }
            if collection.series.contains_key(&session.name) {
                tracing::warn!(
                    session = %session.name,
                    format = ?session.format,
                    "duplicate session name; later log skipped",
                );
                continue;
            }
            let series = AlignedSeries::from_session(session, &window, policy).map_err(
                |source| CollectionError::Ordering {
                    name: session.name.clone(),
                    source,
                },
            )?;
            collection.insert(series)?;
        }
        Ok(collection)
    }

    /// Adds a series, rejecting duplicate names and foreign windows.
    pub fn insert(&mut self, series: AlignedSeries) -> Result<(), CollectionError> {
        if series.bucket_centers != self.window.bucket_centers() {
            return Err(CollectionError::WindowMismatch { name: series.name });
        }
        if self.series.contains_key(&series.name) {
            return Err(CollectionError::DuplicateName { name: series.name });
        }
        self.series.insert(series.name.clone(), series);
        Ok(())
    }

    #[must_use]
    pub fn window(&self) -> &BinningWindow {
        &self.window
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AlignedSeries> {
        self.series.get(name)
    }

    /// Series in name order.
    pub fn iter(&self) -> impl Iterator<Item = &AlignedSeries> {
        self.series.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Every series' value at bucket `index`, in name order.
    #[must_use]
    pub fn bucket_snapshot(&self, index: usize) -> Option<Vec<f64>> {
        self.series
            .values()
            .map(|series| series.values.get(index).copied())
            .collect()
    }

    /// Each series' mean over the whole window, in name order.
    ///
    /// Empty (all-NaN) series contribute `0.0`.
    #[must_use]
    pub fn window_means(&self) -> Vec<f64> {
        self.series
            .values()
            .map(|series| series.stats().map_or(0.0, |stats| stats.mean))
            .collect()
    }

    /// Jain's fairness index across all series, per bucket.
    ///
    /// A bucket is `None` when fewer than two series exist, when every series
    /// is zero there, or when any series has no value there (NaN fill).
    #[must_use]
    pub fn fairness_over_time(&self) -> Vec<Option<f64>> {
        let count = self.window.bucket_count();
        if self.series.len() < 2 {
            return vec![None; count];
        }
        (0..count)
            .map(|index| {
                let snapshot = self.bucket_snapshot(index)?;
                fairness::jain_index(&snapshot).ok()
            })
            .collect()
    }
}
