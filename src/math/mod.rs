//! Layer 2: Math
//!
//! # Purpose
//!
//! Pure numerical kernels with no validation or configuration logic:
//! - Graph normalization (binarize, self-loops, row-normalize)
//! - Graph-weighted first and second moments
//!
//! # Architecture
//!
//! ```text
//! Layer 4: API
//!   ↓
//! Layer 3: Engine
//!   ↓
//! Layer 2: Math ← You are here
//!   ↓
//! Layer 1: Primitives
//! ```

/// Affinity graph to row-stochastic operator.
pub mod normalize;

/// Weighted mean and variance under an operator.
pub mod moments;
