//! Execution engine for normalization and moment estimation.
//!
//! ## Purpose
//!
//! This module sequences validation, the math kernels and result assembly.
//! The API layer only translates builder options into a [`MomentsConfig`]
//! and delegates here.
//!
//! ## Design notes
//!
//! * **Stateless**: The executor holds configuration only; every call
//!   recomputes from its inputs.
//! * **Logging**: Emits `tracing` events; installing a subscriber is left to
//!   the application.
//!
//! ## Key concepts
//!
//! * **Normalize**: graph -> validate square -> binarize -> self-loops -> row-normalize.
//! * **Estimate**: (operator, features) -> validate rows -> moments -> variance policy.
//!
//! ## Non-goals
//!
//! * This module does not cache operators between calls.

// External dependencies
use core::fmt::Debug;
use ndarray::ArrayView2;
use num_traits::Float;
use sprs::CsMat;
use tracing::{debug, warn};

// Internal dependencies
use crate::engine::output::MomentsResult;
use crate::engine::validator::Validator;
use crate::math::moments::{VariancePolicy, clamp_negative, weighted_moments};
use crate::math::normalize::{binarize_dense, binarize_sparse, canonicalize_rows, row_normalize};
use crate::primitives::constants::VARIANCE_SLACK;
use crate::primitives::csr::RowMajor;
use crate::primitives::errors::MomentsError;
use crate::primitives::operator::SmoothingOperator;

// ============================================================================
// Configuration
// ============================================================================

/// Resolved configuration for one executor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentsConfig<W> {
    /// Force a unit diagonal before row normalization.
    pub self_loops: bool,

    /// Treatment of negative variances.
    pub variance_policy: VariancePolicy,

    /// Row-sum tolerance used when wrapping external operators.
    pub tolerance: W,

    /// Shard moment estimation across threads.
    pub parallel: bool,
}

// ============================================================================
// Executor
// ============================================================================

/// Runs normalization and estimation with a fixed configuration.
#[derive(Debug, Clone)]
pub struct MomentsExecutor<W> {
    config: MomentsConfig<W>,
}

impl<W: Float + Debug + Send + Sync> MomentsExecutor<W> {
    /// Create an executor from a resolved configuration.
    pub fn new(config: MomentsConfig<W>) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[inline]
    pub fn config(&self) -> &MomentsConfig<W> {
        &self.config
    }

    /// Normalize a sparse affinity graph.
    pub fn normalize_sparse<A: Float>(
        &self,
        graph: &CsMat<A>,
    ) -> Result<SmoothingOperator<W>, MomentsError> {
        Validator::validate_square(graph.shape())?;
        Ok(self.finish_normalize(binarize_sparse(graph), graph.nnz()))
    }

    /// Normalize a dense affinity graph.
    pub fn normalize_dense<A: Float>(
        &self,
        graph: ArrayView2<'_, A>,
    ) -> Result<SmoothingOperator<W>, MomentsError> {
        Validator::validate_square(graph.dim())?;
        Ok(self.finish_normalize(binarize_dense(graph), graph.len()))
    }

    fn finish_normalize(&self, edges: RowMajor<()>, input_entries: usize) -> SmoothingOperator<W> {
        let n = edges.rows();
        let edges = canonicalize_rows(edges, self.config.self_loops);
        let (matrix, degenerate) = row_normalize::<W>(edges, n);

        debug!(
            n_entities = n,
            input_entries,
            nnz = matrix.nnz(),
            degenerate = degenerate.len(),
            self_loops = self.config.self_loops,
            "normalized affinity graph"
        );

        SmoothingOperator::from_normalized(matrix)
    }

    /// Estimate graph-smoothed mean and variance of `features`.
    pub fn estimate<T: Float + Send + Sync>(
        &self,
        operator: &SmoothingOperator<W>,
        features: ArrayView2<'_, T>,
    ) -> Result<MomentsResult<T>, MomentsError> {
        Validator::validate_matching_rows(operator.n_entities(), features.nrows())?;

        let (mean, mut variance) =
            weighted_moments(operator.as_csr(), features, self.config.parallel);

        let mut clamped = 0;
        if self.config.variance_policy == VariancePolicy::ClampNegative {
            let (count, most_negative) = clamp_negative(&mut variance);
            clamped = count;

            let slack = T::from(VARIANCE_SLACK).unwrap_or_else(T::epsilon);
            if most_negative < -slack {
                warn!(
                    clamped,
                    most_negative = most_negative.to_f64().unwrap_or(f64::NAN),
                    "clamped variances beyond cancellation slack"
                );
            }
        }

        let degenerate_rows = operator.degenerate_rows();
        debug!(
            n_entities = features.nrows(),
            n_features = features.ncols(),
            degenerate = degenerate_rows.len(),
            policy = ?self.config.variance_policy,
            clamped,
            "estimated moments"
        );

        Ok(MomentsResult {
            mean,
            variance,
            degenerate_rows,
            variance_policy: self.config.variance_policy,
            clamped,
        })
    }
}
