//! Layer 3: Engine
//!
//! # Purpose
//!
//! Orchestration of the math kernels: input validation, the normalize and
//! estimate pipelines, and result assembly.
//!
//! # Architecture
//!
//! ```text
//! Layer 4: API
//!   ↓
//! Layer 3: Engine ← You are here
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Pipeline execution.
pub mod executor;

/// Result container.
pub mod output;

/// Fail-fast validation.
pub mod validator;
