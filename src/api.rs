//! High-level API for graph normalization and moment estimation.
//!
//! ## Purpose
//!
//! This module provides the user-facing entry points: a fluent builder for
//! configuring the pipeline, the resulting [`KnnMoments`] model, and two free
//! functions covering the default behavior.
//!
//! ## Design notes
//!
//! * **Ergonomic**: Fluent builder with sensible defaults for all parameters.
//! * **Validated**: Parameters are validated when `.build()` is called.
//! * **Type-Safe**: Operator precision is a type parameter, `f32` by default,
//!   changed only through `.precision::<U>()`.
//!
//! ### Configuration Flow
//!
//! 1. Create a [`KnnMomentsBuilder`] via `KnnMoments::new()`.
//! 2. Chain configuration methods (`.self_loops()`, `.variance_policy()`, etc.).
//! 3. Call `.build()` and use the model's `normalize` / `estimate` / `fit`.

// External dependencies
use core::fmt::Debug;
use ndarray::{Array2, ArrayView2};
use num_traits::Float;
use sprs::CsMat;

// Internal dependencies
use crate::engine::executor::MomentsExecutor;
use crate::engine::validator::Validator;
use crate::primitives::constants::ROW_SUM_TOLERANCE;

// Publicly re-exported types
pub use crate::engine::executor::MomentsConfig;
pub use crate::engine::output::MomentsResult;
pub use crate::math::moments::VariancePolicy;
pub use crate::primitives::constants::default_point_size;
pub use crate::primitives::errors::MomentsError;
pub use crate::primitives::operator::SmoothingOperator;

// ============================================================================
// Builder
// ============================================================================

/// Fluent builder for the normalization and estimation pipeline.
#[derive(Debug, Clone)]
pub struct KnnMomentsBuilder<W> {
    /// Inject unit self-loops before row normalization (default: true).
    pub self_loops: Option<bool>,

    /// Treatment of negative variances (default: Raw).
    pub variance_policy: Option<VariancePolicy>,

    /// Row-sum tolerance for wrapping external operators (default: 1e-6).
    pub tolerance: Option<W>,

    /// Shard estimation across threads (default: true with the `parallel` feature).
    pub parallel: Option<bool>,

    /// Tracks if any parameter was set multiple times (for validation).
    #[doc(hidden)]
    pub duplicate_param: Option<&'static str>,
}

impl Default for KnnMomentsBuilder<f32> {
    fn default() -> Self {
        Self::new()
    }
}

impl KnnMomentsBuilder<f32> {
    /// Create a new builder with default settings and `f32` operator weights.
    pub fn new() -> Self {
        Self {
            self_loops: None,
            variance_policy: None,
            tolerance: None,
            parallel: None,
            duplicate_param: None,
        }
    }
}

impl<W: Float + Debug + Send + Sync> KnnMomentsBuilder<W> {
    /// Enable or disable self-loop injection.
    ///
    /// Disabling it lets entities without neighbors produce all-zero rows.
    pub fn self_loops(mut self, enabled: bool) -> Self {
        if self.self_loops.is_some() {
            self.duplicate_param = Some("self_loops");
        }
        self.self_loops = Some(enabled);
        self
    }

    /// Set the negative variance policy.
    pub fn variance_policy(mut self, policy: VariancePolicy) -> Self {
        if self.variance_policy.is_some() {
            self.duplicate_param = Some("variance_policy");
        }
        self.variance_policy = Some(policy);
        self
    }

    /// Set the row-sum tolerance used by [`KnnMoments::wrap_operator`].
    pub fn tolerance(mut self, tolerance: W) -> Self {
        if self.tolerance.is_some() {
            self.duplicate_param = Some("tolerance");
        }
        self.tolerance = Some(tolerance);
        self
    }

    /// Request parallel or sequential estimation.
    ///
    /// Ignored when the crate is built without the `parallel` feature.
    pub fn parallel(mut self, enabled: bool) -> Self {
        if self.parallel.is_some() {
            self.duplicate_param = Some("parallel");
        }
        self.parallel = Some(enabled);
        self
    }

    /// Switch the operator weight precision.
    ///
    /// A tolerance already set is converted to the new precision.
    pub fn precision<U: Float + Debug + Send + Sync>(self) -> KnnMomentsBuilder<U> {
        KnnMomentsBuilder {
            self_loops: self.self_loops,
            variance_policy: self.variance_policy,
            tolerance: self.tolerance.map(|t| U::from(t).unwrap_or_else(U::nan)),
            parallel: self.parallel,
            duplicate_param: self.duplicate_param,
        }
    }

    /// Validate the configuration and build the model.
    pub fn build(self) -> Result<KnnMoments<W>, MomentsError> {
        // Check for duplicate parameter configuration
        Validator::validate_no_duplicates(self.duplicate_param)?;

        let tolerance = match self.tolerance {
            Some(tol) => tol,
            None => W::from(ROW_SUM_TOLERANCE).unwrap_or_else(W::epsilon),
        };
        Validator::validate_tolerance(tolerance)?;

        let config = MomentsConfig {
            self_loops: self.self_loops.unwrap_or(true),
            variance_policy: self.variance_policy.unwrap_or_default(),
            tolerance,
            parallel: self.parallel.unwrap_or(cfg!(feature = "parallel")),
        };

        Ok(KnnMoments {
            executor: MomentsExecutor::new(config),
        })
    }
}

// ============================================================================
// Model
// ============================================================================

/// Configured normalization and estimation pipeline.
#[derive(Debug, Clone)]
pub struct KnnMoments<W> {
    executor: MomentsExecutor<W>,
}

impl KnnMoments<f32> {
    /// Start configuring a pipeline.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> KnnMomentsBuilder<f32> {
        KnnMomentsBuilder::new()
    }
}

impl<W: Float + Debug + Send + Sync> KnnMoments<W> {
    /// The resolved configuration.
    #[inline]
    pub fn config(&self) -> &MomentsConfig<W> {
        self.executor.config()
    }

    /// Build the smoothing operator of a sparse affinity graph.
    pub fn normalize<A: Float>(
        &self,
        graph: &CsMat<A>,
    ) -> Result<SmoothingOperator<W>, MomentsError> {
        self.executor.normalize_sparse(graph)
    }

    /// Build the smoothing operator of a dense affinity graph.
    pub fn normalize_dense<A: Float>(
        &self,
        graph: ArrayView2<'_, A>,
    ) -> Result<SmoothingOperator<W>, MomentsError> {
        self.executor.normalize_dense(graph)
    }

    /// Wrap an externally built operator, checking it against the configured tolerance.
    pub fn wrap_operator(&self, matrix: CsMat<W>) -> Result<SmoothingOperator<W>, MomentsError> {
        SmoothingOperator::try_from_matrix(matrix, self.executor.config().tolerance)
    }

    /// Smoothed mean and variance of `features` under `operator`.
    pub fn estimate<T: Float + Send + Sync>(
        &self,
        operator: &SmoothingOperator<W>,
        features: ArrayView2<'_, T>,
    ) -> Result<MomentsResult<T>, MomentsError> {
        self.executor.estimate(operator, features)
    }

    /// Normalize `graph`, then estimate the moments of `features`.
    pub fn fit<A: Float, T: Float + Send + Sync>(
        &self,
        graph: &CsMat<A>,
        features: ArrayView2<'_, T>,
    ) -> Result<MomentsResult<T>, MomentsError> {
        let operator = self.normalize(graph)?;
        self.estimate(&operator, features)
    }
}

// ============================================================================
// Free functions
// ============================================================================

/// Build the default `f32` smoothing operator of a sparse affinity graph.
///
/// Positive entries become edges, the diagonal is forced to one and every row
/// is divided by its sum.
pub fn normalize_graph<A: Float>(graph: &CsMat<A>) -> Result<SmoothingOperator<f32>, MomentsError> {
    KnnMoments::new().build()?.normalize(graph)
}

/// Smoothed `(mean, variance)` of `features` under `operator`, unclamped.
///
/// Variances may be negative by a few ulps of `x^2` where the true local
/// variance is zero; see [`VariancePolicy`].
pub fn estimate_moments<W, T>(
    operator: &SmoothingOperator<W>,
    features: ArrayView2<'_, T>,
) -> Result<(Array2<T>, Array2<T>), MomentsError>
where
    W: Float + Debug + Send + Sync,
    T: Float + Send + Sync,
{
    KnnMoments::new()
        .precision::<W>()
        .build()?
        .estimate(operator, features)
        .map(MomentsResult::into_parts)
}
