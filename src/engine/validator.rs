//! Input validation for graphs, operators and configuration.
//!
//! ## Purpose
//!
//! This module checks the shape contracts of the normalizer and the
//! estimator, and the parameter bounds of the builder, before any numerical
//! work starts.
//!
//! ## Design notes
//!
//! * **Fail-Fast**: Validation stops at the first error encountered.
//! * **Cheap**: Only shapes and scalars are inspected; values are never scanned.
//! * **Generics**: Validation is generic over `Float` types.
//!
//! ## Invariants
//!
//! * Validation logic is deterministic and side-effect free.
//!
//! ## Non-goals
//!
//! * This module does not check non-negativity of affinities; non-positive
//!   entries are simply not edges.
//! * This module does not correct invalid inputs.

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::primitives::errors::MomentsError;

// ============================================================================
// Validator
// ============================================================================

/// Validation utility for graphs, operators and builder parameters.
pub struct Validator;

impl Validator {
    // ========================================================================
    // Shape Validation
    // ========================================================================

    /// Validate that an affinity graph of shape `(rows, cols)` is square.
    pub fn validate_square((rows, cols): (usize, usize)) -> Result<(), MomentsError> {
        if rows != cols {
            return Err(MomentsError::NotSquare { rows, cols });
        }
        Ok(())
    }

    /// Validate that the operator and the feature matrix cover the same entities.
    pub fn validate_matching_rows(
        operator_rows: usize,
        feature_rows: usize,
    ) -> Result<(), MomentsError> {
        if operator_rows != feature_rows {
            return Err(MomentsError::MismatchedRows {
                operator_rows,
                feature_rows,
            });
        }
        Ok(())
    }

    // ========================================================================
    // Parameter Validation
    // ========================================================================

    /// Validate the row-sum tolerance.
    pub fn validate_tolerance<T: Float>(tol: T) -> Result<(), MomentsError> {
        if !tol.is_finite() || tol <= T::zero() {
            return Err(MomentsError::InvalidTolerance(
                tol.to_f64().unwrap_or(f64::NAN),
            ));
        }
        Ok(())
    }

    /// Validate that no parameters were set multiple times in the builder.
    pub fn validate_no_duplicates(
        duplicate_param: Option<&'static str>,
    ) -> Result<(), MomentsError> {
        if let Some(param) = duplicate_param {
            return Err(MomentsError::DuplicateParameter { parameter: param });
        }
        Ok(())
    }
}
