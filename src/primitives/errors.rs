//! Error types for graph normalization and moment estimation.
//!
//! ## Purpose
//!
//! This module defines the single error enum surfaced by every fallible
//! operation in the crate. All variants describe contract violations of the
//! caller's inputs; none of them are transient.
//!
//! ## Design notes
//!
//! * **Fail-Fast**: Errors are raised at the first violation, never collected.
//! * **Comparable**: `Clone + PartialEq` so tests can match on exact variants.
//! * **No partial results**: An error always aborts the whole call.
//!
//! ## Non-goals
//!
//! * Degenerate (all-zero) operator rows are a silent policy, not an error.

// External dependencies
use thiserror::Error;

/// Errors raised by the normalizer, the estimator and the builder.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MomentsError {
    /// The affinity graph (or a wrapped operator) is not square.
    #[error("Graph must be square: got {rows} rows and {cols} columns")]
    NotSquare {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },

    /// Operator and feature matrix disagree on the number of entities.
    #[error("Row mismatch: operator has {operator_rows} rows, features have {feature_rows}")]
    MismatchedRows {
        /// Rows of the smoothing operator.
        operator_rows: usize,
        /// Rows of the feature matrix.
        feature_rows: usize,
    },

    /// A wrapped operator row sums to neither 0 nor 1.
    #[error("Operator is not row-stochastic: row {row} sums to {sum}")]
    NotRowStochastic {
        /// Offending row.
        row: usize,
        /// Its sum.
        sum: f64,
    },

    /// A wrapped operator holds a negative weight.
    #[error("Operator has a negative weight at ({row}, {col})")]
    NegativeWeight {
        /// Row of the entry.
        row: usize,
        /// Column of the entry.
        col: usize,
    },

    /// Row-sum tolerance is non-finite or not positive.
    #[error("Invalid tolerance: {0} (must be > 0 and finite)")]
    InvalidTolerance(f64),

    /// A builder option was configured more than once.
    #[error(
        "Parameter '{parameter}' was set multiple times. Each parameter can only be configured once."
    )]
    DuplicateParameter {
        /// Name of the builder option.
        parameter: &'static str,
    },
}
