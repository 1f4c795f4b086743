//! # knn-moments — Graph-Smoothed Moments for Rust
//!
//! Row-stochastic smoothing operators built from k-NN affinity graphs, and the
//! graph-weighted mean and variance of per-entity feature vectors.
//!
//! ## What does it compute?
//!
//! Given an affinity graph `C` over `N` entities (e.g. cells) and a feature
//! matrix `X` (`N x F`, e.g. expression or velocity values), the crate:
//!
//! 1. Binarizes `C` (any positive affinity is an edge of weight 1)
//! 2. Forces a unit self-loop on every entity
//! 3. Divides each row by its sum, giving the smoothing operator `W`
//! 4. Returns `Mean = W X` and `Variance = W (X ⊙ X) - Mean ⊙ Mean`
//!
//! Each entity's statistics are therefore an unweighted average over itself
//! and its graph neighbors.
//!
//! **Common applications:**
//! - k-NN smoothing of expression and velocity estimates
//! - Local noise estimates for downstream Markov-chain kernels
//! - Denoising features over any similarity graph
//!
//! ## Quick Start
//!
//! ### Typical Use
//!
//! ```rust
//! use knn_moments::prelude::*;
//! use ndarray::array;
//! use sprs::CsMat;
//!
//! // Entities 0 and 1 are neighbors, entity 2 is isolated
//! let graph = CsMat::new((3, 3), vec![0, 1, 2, 2], vec![1, 0], vec![1.0_f64, 1.0]);
//! let x = array![[1.0_f64], [3.0], [10.0]];
//!
//! let model = KnnMoments::new().build()?;
//! let result = model.fit(&graph, x.view())?;
//!
//! assert_eq!(result.mean, array![[2.0], [2.0], [10.0]]);
//! assert_eq!(result.variance, array![[1.0], [1.0], [0.0]]);
//! println!("{}", result);
//! # Result::<(), MomentsError>::Ok(())
//! ```
//!
//! ```text
//! Summary:
//!   Entities: 3
//!   Features: 1
//!   Degenerate rows: 0
//!   Variance policy: Raw
//!
//! Smoothed Moments (feature 0):
//!     Entity         Mean     Variance
//!   ----------------------------------
//!          0      2.00000      1.00000
//!          1      2.00000      1.00000
//!          2     10.00000      0.00000
//! ```
//!
//! ### Full Features
//!
//! ```rust
//! use knn_moments::prelude::*;
//! use ndarray::array;
//! use sprs::CsMat;
//!
//! let graph = CsMat::new((3, 3), vec![0, 1, 2, 2], vec![1, 0], vec![0.4_f64, 0.9]);
//! let x = array![[1.0_f64, 0.1], [3.0, 0.1], [10.0, 0.1]];
//!
//! let model = KnnMoments::new()
//!     .self_loops(true)                          // Unit diagonal (default)
//!     .variance_policy(ClampNegative)            // Clamp cancellation noise
//!     .parallel(false)                           // Sequential estimation
//!     .precision::<f64>()                        // f64 operator weights
//!     .tolerance(1e-9)                           // For wrap_operator
//!     .build()?;
//!
//! let operator = model.normalize(&graph)?;
//! assert!(operator.is_row_stochastic(1e-12));
//!
//! let result = model.estimate(&operator, x.view())?;
//! assert!(result.variance.iter().all(|&v| v >= 0.0));
//! # Result::<(), MomentsError>::Ok(())
//! ```
//!
//! ## The Two Operations
//!
//! | Operation        | Input                          | Output                     |
//! |------------------|--------------------------------|----------------------------|
//! | Normalize graph  | `CsMat<A>` or `ArrayView2<A>`  | `SmoothingOperator<W>`     |
//! | Estimate moments | `SmoothingOperator<W>`, `X`    | `MomentsResult<T>`         |
//!
//! The free functions [`normalize_graph`](prelude::normalize_graph) and
//! [`estimate_moments`](prelude::estimate_moments) cover the default pipeline
//! without a builder.
//!
//! ## Precision
//!
//! Operators are stored in `f32` by default, which halves memory for graphs
//! with millions of entities. Use `.precision::<f64>()` to change it. Operator
//! weights are promoted to the feature type during estimation, so an `f32`
//! operator applied to `f64` features accumulates in `f64`.
//!
//! ## Degenerate Rows
//!
//! With self-loops disabled, an entity without positive affinities has a row
//! sum of zero. Its row is left all-zero (a row sum of 1 is substituted before
//! division), so its mean and variance are zero. This is reported in
//! [`MomentsResult::degenerate_rows`](prelude::MomentsResult::degenerate_rows),
//! never raised as an error.
//!
//! ## Negative Variances
//!
//! The variance uses the moment identity `E[x^2] - E[x]^2`, which can return
//! values slightly below zero where the true local variance is zero. The error
//! is a few ulps of `x^2` in the feature precision: about `1e-8` for `f64`
//! features of magnitude `1e4`, but proportionally larger for `f32` features.
//! Weight rounding in the operator does not contribute, because each row is
//! divided by its accumulated weight sum. [`VariancePolicy::Raw`](prelude::VariancePolicy::Raw)
//! (the default) returns them as computed;
//! [`VariancePolicy::ClampNegative`](prelude::VariancePolicy::ClampNegative)
//! replaces them with zero.
//!
//! ## Error Handling
//!
//! ```rust
//! use knn_moments::prelude::*;
//! use ndarray::Array2;
//! use sprs::CsMat;
//!
//! let rectangular: CsMat<f64> = CsMat::zero((3, 4));
//! match normalize_graph(&rectangular) {
//!     Err(MomentsError::NotSquare { rows, cols }) => assert_eq!((rows, cols), (3, 4)),
//!     other => panic!("unexpected: {:?}", other),
//! }
//!
//! let operator = normalize_graph(&CsMat::<f64>::eye(3))?;
//! let features = Array2::<f64>::zeros((4, 2));
//! assert!(matches!(
//!     estimate_moments(&operator, features.view()),
//!     Err(MomentsError::MismatchedRows { operator_rows: 3, feature_rows: 4 })
//! ));
//! # Result::<(), MomentsError>::Ok(())
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`](https://docs.rs/tracing) events at `debug`
//! level for every normalization and estimation, and a `warn` event when
//! clamping removes variances below `-VARIANCE_SLACK`. Install any subscriber
//! to see them.
//!
//! ## Feature Flags
//!
//! - `parallel` (default): row-sharded estimation with rayon.
//! - `dev`: exposes `internals` for testing.

#![deny(missing_docs)]

// ============================================================================
// Internal Modules
// ============================================================================

// Layer 1: Primitives - data structures and policy constants.
//
// Contains the error enum, named numeric constants, CSR gathering and the
// row-stochastic `SmoothingOperator`.
mod primitives;

// Layer 2: Math - pure numerical kernels.
//
// Contains graph normalization (binarize, self-loops, row-normalize) and
// the weighted moment kernel.
mod math;

// Layer 3: Engine - orchestration and validation.
//
// Contains shape validation, the normalize/estimate pipelines and the
// result container.
mod engine;

// High-level fluent API.
//
// Provides the `KnnMoments` builder and the default free functions.
mod api;

// ============================================================================
// Prelude
// ============================================================================

/// Standard prelude.
///
/// This module is intended to be wildcard-imported for convenient access
/// to the most commonly used types:
///
/// ```
/// use knn_moments::prelude::*;
/// ```
pub mod prelude {
    pub use crate::api::{
        KnnMoments, KnnMomentsBuilder, MomentsConfig, MomentsError, MomentsResult,
        SmoothingOperator,
        VariancePolicy::{self, ClampNegative, Raw},
        default_point_size, estimate_moments, normalize_graph,
    };
}

/// Numeric policy constants.
pub mod constants {
    pub use crate::primitives::constants::{
        DEFAULT_POINT_SIZE_NUMERATOR, EDGE_THRESHOLD, EDGE_WEIGHT, ROW_SUM_TOLERANCE,
        SELF_LOOP_WEIGHT, VARIANCE_SLACK, ZERO_ROW_SUBSTITUTE,
    };
}

// ============================================================================
// Testing re-exports
// ============================================================================

/// Internal modules for development and testing.
///
/// This module re-exports internal modules for development and testing purposes.
/// It is only available with the `dev` feature enabled.
///
/// **Warning**: These are internal implementation details and may change without notice.
/// Do not use in production code.
#[cfg(feature = "dev")]
pub mod internals {
    /// Internal primitive types and utilities.
    pub mod primitives {
        pub use crate::primitives::*;
    }
    /// Internal math functions.
    pub mod math {
        pub use crate::math::*;
    }
    /// Internal execution engine.
    pub mod engine {
        pub use crate::engine::*;
    }
    /// Internal API.
    pub mod api {
        pub use crate::api::*;
    }
}
