//! Numeric policy constants.
//!
//! Every magic number of the normalization and estimation pipeline lives here
//! so the policy is visible in one place. Values are stored as `f64` and cast
//! to the working precision at the point of use.

/// Entries strictly greater than this value become an unweighted edge.
pub const EDGE_THRESHOLD: f64 = 0.0;

/// Weight of a binarized edge before row normalization.
pub const EDGE_WEIGHT: f64 = 1.0;

/// Value written on the diagonal by self-loop injection (overwrites, never adds).
pub const SELF_LOOP_WEIGHT: f64 = 1.0;

/// Row sum used in place of zero so degenerate rows stay all-zero.
pub const ZERO_ROW_SUBSTITUTE: f64 = 1.0;

/// Default tolerance on `|row_sum - 1|` for a row-stochastic operator.
pub const ROW_SUM_TOLERANCE: f64 = 1e-6;

/// Expected magnitude of negative variances caused by cancellation in
/// `E[x^2] - E[x]^2`.
pub const VARIANCE_SLACK: f64 = 1e-5;

/// Scatter point size numerator; the default size is this over `n`.
pub const DEFAULT_POINT_SIZE_NUMERATOR: f64 = 1.2e5;

/// Default scatter point size for `n` entities, or `None` when `n == 0`.
#[inline]
pub fn default_point_size(n: usize) -> Option<f64> {
    if n == 0 {
        return None;
    }
    Some(DEFAULT_POINT_SIZE_NUMERATOR / n as f64)
}
