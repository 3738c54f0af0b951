//! Numeric primitives for aligning and comparing network-measurement series.
//!
//! - **Binning** ([`binning`]): fixed-width time buckets over an analysis window,
//!   with per-bucket mean aggregation
//! - **Fairness** ([`fairness`]): Jain's fairness index over competing sessions
//! - **Descriptive statistics** ([`descriptive`]): min, max, mean, median, spread
//!
//! Everything here is pure: no I/O, no logging, no shared state.
//!
//! # Examples
//!
//! ```
//! use netseries_stats::{
//!     binning::{BinningWindow, EmptyBucketPolicy},
//!     fairness::jain_index,
//! };
//!
//! let window = BinningWindow::new(2.0, 1.0).unwrap();
//! let a = window.aggregate([(0.5, 40.0), (1.5, 60.0)], EmptyBucketPolicy::Zero);
//! let b = window.aggregate([(0.5, 40.0), (1.5, 20.0)], EmptyBucketPolicy::Zero);
//!
//! // First bucket is shared evenly.
//! assert_eq!(jain_index(&[a[0], b[0]]).unwrap(), 1.0);
//! // Second bucket is not.
//! assert!(jain_index(&[a[1], b[1]]).unwrap() < 1.0);
//! ```

pub mod binning;
pub mod descriptive;
pub mod fairness;
