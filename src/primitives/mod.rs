//! Layer 1: Primitives
//!
//! # Purpose
//!
//! Fundamental data structures and policy values shared by every other layer:
//! the error enum, named numeric constants, raw CSR gathering and the
//! row-stochastic `SmoothingOperator`.
//!
//! # Architecture
//!
//! ```text
//! Layer 4: API
//!   ↓
//! Layer 3: Engine
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives ← You are here
//! ```

/// Error types.
pub mod errors;

/// Numeric policy constants.
pub mod constants;

/// Row-major gathering of sparse entries.
pub mod csr;

/// Row-stochastic smoothing operator.
pub mod operator;
