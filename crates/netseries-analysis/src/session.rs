//! Measurement sessions
//!
//! A [`Session`] is one measurement run: a name, the format its log was written
//! in, and the samples extracted from that log.
//!
//! ```text
//! runs/
//! ├─ cubic.json            -> Session "cubic"  (interval report)
//! ├─ LIFE.txt              -> Session "LIFE"   (tagged lines)
//! └─ bbr/client_log.txt    -> Session "bbr"    (delay lines)
//! ```
//!
//! Sessions are independent of each other; nothing here touches shared state,
//! so callers may build them in any order or in parallel.

use std::path::Path;

use crate::{
    extract::{ExtractorConfig, LogFormat},
    normalization::{self, OrderingError},
    sample::{RawSample, TimeUnit},
};

/// One measurement run and its extracted samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Session name, derived from the log's path
    pub name: String,
    /// Format of the log the samples came from
    pub format: LogFormat,
    /// Samples in non-decreasing timestamp order, in the format's native unit
    pub samples: Vec<RawSample>,
}

impl Session {
    /// Extracts a session from the text of a log of known format.
    #[must_use]
    pub fn extract(
        name: impl Into<String>,
        format: LogFormat,
        content: &str,
        config: &ExtractorConfig,
    ) -> Self {
        let samples = format.extractor(config).extract(content);
        Self {
            name: name.into(),
            format,
            samples,
        }
    }

    /// Detects the format of the log at `path` and extracts a session from it.
    ///
    /// Returns `None` when the format cannot be detected.
    #[must_use]
    pub fn from_log(path: &Path, content: &str, config: &ExtractorConfig) -> Option<Self> {
        let format = LogFormat::detect(path, content)?;
        Some(Self::extract(
            format.session_name(path),
            format,
            content,
            config,
        ))
    }

    #[must_use]
    pub fn unit(&self) -> TimeUnit {
        self.format.unit()
    }

    /// Whether extraction found no valid samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples rebased to relative seconds and clipped at `window_limit`.
    pub fn normalized(&self, window_limit: f64) -> Result<Vec<RawSample>, OrderingError> {
        normalization::normalize(&self.samples, self.unit(), window_limit)
    }
}
