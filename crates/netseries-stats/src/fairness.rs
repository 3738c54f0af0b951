//! Jain's fairness index
//!
//! Measures how evenly a shared resource is split between competing
//! consumers:
//!
//! ```text
//!              (Σ xᵢ)²
//! J(x) = ─────────────────
//!           n · Σ xᵢ²
//! ```
//!
//! The index lies in `(0, 1]`. It equals `1.0` when every consumer receives the
//! same share and `1/n` when a single consumer takes everything. It is invariant
//! under permutation and under uniform positive scaling of the inputs.
//!
//! An input where every value is zero has no defined index; it is reported as
//! [`FairnessError::AllZero`] rather than coerced to `0` or `1`.
//!
//! # Examples
//!
//! ```
//! use netseries_stats::fairness::{jain_index, FairnessError};
//!
//! assert_eq!(jain_index(&[10.0, 10.0, 10.0]).unwrap(), 1.0);
//! assert!((jain_index(&[10.0, 0.0, 0.0]).unwrap() - 1.0 / 3.0).abs() < 1e-12);
//! assert_eq!(jain_index(&[0.0, 0.0]), Err(FairnessError::AllZero));
//! ```

/// Reasons a fairness index cannot be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum FairnessError {
    #[display("fairness input is empty")]
    Empty,
    #[display("fairness is undefined when every value is zero")]
    AllZero,
    #[display("fairness input has a negative value at index {index}")]
    Negative { index: usize },
    #[display("fairness input has a non-finite value at index {index}")]
    NonFinite { index: usize },
}

/// Computes Jain's fairness index over simultaneous per-session magnitudes.
///
/// Values must be finite and non-negative, with at least one strictly positive.
#[expect(clippy::cast_precision_loss)]
pub fn jain_index(values: &[f64]) -> Result<f64, FairnessError> {
    if values.is_empty() {
        return Err(FairnessError::Empty);
    }
    for (index, value) in values.iter().enumerate() {
        if !value.is_finite() {
            return Err(FairnessError::NonFinite { index });
        }
        if *value < 0.0 {
            return Err(FairnessError::Negative { index });
        }
    }

    let max = values.iter().copied().fold(0.0, f64::max);
    if max == 0.0 {
        return Err(FairnessError::AllZero);
    }
    if values.len() == 1 {
        return Ok(1.0);
    }

    // Scaling by the maximum keeps the squares away from overflow/underflow.
    let sum = values.iter().map(|v| v / max).sum::<f64>();
    let sum_of_squares = values.iter().map(|v| (v / max).powi(2)).sum::<f64>();
    let index = sum * sum / (values.len() as f64 * sum_of_squares);
    // Rounding can push an equal-share input a hair above one.
    Ok(index.min(1.0))
}

/// Applies [`jain_index`] to each row independently.
///
/// One row per time instant or per scenario; a degenerate row does not stop
/// the others from being scored.
pub fn jain_rows<R>(rows: &[R]) -> Vec<Result<f64, FairnessError>>
where
    R: AsRef<[f64]>,
{
    rows.iter().map(|row| jain_index(row.as_ref())).collect()
}
