//! Result container for moment estimation.
//!
//! ## Purpose
//!
//! `MomentsResult` bundles the smoothed mean and variance with the bookkeeping
//! a consumer needs to interpret them: which entities were degenerate, which
//! variance policy applied and how many entries it clamped.
//!
//! ## Invariants
//!
//! * `mean` and `variance` share the feature matrix shape.
//! * `clamped == 0` whenever `variance_policy` is `Raw`.

// External dependencies
use core::fmt::{self, Display, Formatter};
use ndarray::Array2;
use num_traits::Float;

// Internal dependencies
use crate::math::moments::VariancePolicy;

/// Smoothed first and second moments of a feature matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct MomentsResult<T> {
    /// Graph-weighted mean, `n_entities x n_features`.
    pub mean: Array2<T>,

    /// Graph-weighted variance, `n_entities x n_features`.
    pub variance: Array2<T>,

    /// Entities whose operator row was all-zero.
    pub degenerate_rows: Vec<usize>,

    /// Policy applied to negative variances.
    pub variance_policy: VariancePolicy,

    /// Number of variance entries clamped to zero.
    pub clamped: usize,
}

impl<T: Float> MomentsResult<T> {
    /// Number of entities (rows).
    #[inline]
    pub fn n_entities(&self) -> usize {
        self.mean.nrows()
    }

    /// Number of features (columns).
    #[inline]
    pub fn n_features(&self) -> usize {
        self.mean.ncols()
    }

    /// Smallest variance entry, `None` when the result is empty.
    pub fn min_variance(&self) -> Option<T> {
        self.variance.iter().copied().reduce(T::min)
    }

    /// Split into `(mean, variance)`.
    #[inline]
    pub fn into_parts(self) -> (Array2<T>, Array2<T>) {
        (self.mean, self.variance)
    }
}

impl<T: Float + Display> Display for MomentsResult<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary:")?;
        writeln!(f, "  Entities: {}", self.n_entities())?;
        writeln!(f, "  Features: {}", self.n_features())?;
        writeln!(f, "  Degenerate rows: {}", self.degenerate_rows.len())?;
        writeln!(f, "  Variance policy: {:?}", self.variance_policy)?;
        if self.variance_policy == VariancePolicy::ClampNegative {
            writeln!(f, "  Clamped entries: {}", self.clamped)?;
        }

        let preview = self.n_entities().min(10);
        if preview == 0 || self.n_features() == 0 {
            return Ok(());
        }

        writeln!(f)?;
        writeln!(f, "Smoothed Moments (feature 0):")?;
        writeln!(f, "  {:>8} {:>12} {:>12}", "Entity", "Mean", "Variance")?;
        writeln!(f, "  {}", "-".repeat(34))?;
        for i in 0..preview {
            writeln!(
                f,
                "  {:>8} {:>12.5} {:>12.5}",
                i,
                self.mean[[i, 0]],
                self.variance[[i, 0]]
            )?;
        }
        if self.n_entities() > preview {
            writeln!(f, "  ... ({} more)", self.n_entities() - preview)?;
        }

        Ok(())
    }
}
