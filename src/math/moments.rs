//! Graph-weighted first and second moments.
//!
//! ## Purpose
//!
//! This module applies a row-stochastic operator `W` to a dense feature
//! matrix `X` and returns the smoothed mean and variance:
//!
//! ```text
//! Mean     = W X
//! Variance = W (X ⊙ X) - Mean ⊙ Mean
//! ```
//!
//! ## Design notes
//!
//! * **Single pass**: Both `W X` and `W (X ⊙ X)` are accumulated in the same
//!   sweep over each operator row.
//! * **Promotion**: Operator weights are converted to the feature precision,
//!   so an `f32` operator applied to `f64` features computes in `f64`.
//! * **Row-sum correction**: Both moments are divided by the promoted row sum,
//!   so weight rounding in a low-precision operator does not leak into the
//!   variance as `x^2 * s * (1 - s)`.
//! * **Row-sharded**: Rows are independent; the `parallel` feature splits them
//!   across threads with rayon.
//!
//! ## Invariants
//!
//! * Output shapes equal the input feature shape.
//! * A degenerate (empty) operator row yields zero mean and zero variance.
//! * With [`VariancePolicy::Raw`], variances may be negative by a few ulps of
//!   `x^2` in the feature precision; with [`VariancePolicy::ClampNegative`]
//!   they are not.
//!
//! ## Non-goals
//!
//! * This module does not check shapes (handled by `validator`).

// External dependencies
use ndarray::{Array2, ArrayView2, ArrayViewMut1, Zip};
use num_traits::Float;
use sprs::CsMat;

// ============================================================================
// Variance policy
// ============================================================================

/// Treatment of negative variances produced by floating-point cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariancePolicy {
    /// Return `E[x^2] - E[x]^2` as computed; tiny negatives are possible.
    #[default]
    Raw,

    /// Replace negative variances with zero.
    ClampNegative,
}

// ============================================================================
// Kernel
// ============================================================================

/// Compute `(W X, W (X ⊙ X) - (W X)^2)` for a CSR operator.
pub fn weighted_moments<W, T>(
    operator: &CsMat<W>,
    features: ArrayView2<'_, T>,
    parallel: bool,
) -> (Array2<T>, Array2<T>)
where
    W: Float + Send + Sync,
    T: Float + Send + Sync,
{
    let mut mean = Array2::<T>::zeros(features.raw_dim());
    let mut variance = Array2::<T>::zeros(features.raw_dim());

    let zip = Zip::indexed(mean.rows_mut()).and(variance.rows_mut());

    #[cfg(feature = "parallel")]
    if parallel {
        zip.par_for_each(|row, m, v| accumulate_row(operator, &features, row, m, v));
        return (mean, variance);
    }

    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    zip.for_each(|row, m, v| accumulate_row(operator, &features, row, m, v));

    (mean, variance)
}

/// Accumulate one operator row, leaving the variance in `second`.
#[inline]
fn accumulate_row<W: Float, T: Float>(
    operator: &CsMat<W>,
    features: &ArrayView2<'_, T>,
    row: usize,
    mut mean: ArrayViewMut1<'_, T>,
    mut second: ArrayViewMut1<'_, T>,
) {
    let Some(weights) = operator.outer_view(row) else {
        return;
    };

    let mut total = T::zero();
    for (col, &w) in weights.iter() {
        let w = T::from(w).unwrap_or_else(T::nan);
        total = total + w;
        Zip::from(&mut mean)
            .and(&mut second)
            .and(features.row(col))
            .for_each(|m, s, &x| {
                let wx = w * x;
                *m = *m + wx;
                *s = *s + wx * x;
            });
    }

    // Rounded weights sum to 1 only within operator precision
    if total != T::zero() && total != T::one() {
        mean.mapv_inplace(|m| m / total);
        second.mapv_inplace(|s| s / total);
    }

    // Second raw moment -> variance
    Zip::from(&mut second)
        .and(&mean)
        .for_each(|s, &m| *s = *s - m * m);
}

/// Clamp negative variances to zero.
///
/// Returns the number of clamped entries and the most negative value seen
/// (zero when nothing was clamped).
pub fn clamp_negative<T: Float>(variance: &mut Array2<T>) -> (usize, T) {
    let mut clamped = 0usize;
    let mut most_negative = T::zero();

    for v in variance.iter_mut() {
        if *v < T::zero() {
            most_negative = most_negative.min(*v);
            *v = T::zero();
            clamped += 1;
        }
    }

    (clamped, most_negative)
}
