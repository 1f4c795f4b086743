//! The row-stochastic smoothing operator.
//!
//! ## Purpose
//!
//! `SmoothingOperator` wraps a square CSR matrix whose rows are convex
//! combinations (sum to 1) or explicitly degenerate (all-zero). It is the only
//! operator type the moment estimator accepts, so the row-stochastic contract
//! is checked once at construction instead of on every estimate.
//!
//! ## Design notes
//!
//! * **Typed precision**: Generic over the weight type `W`; conversions go
//!   through [`SmoothingOperator::cast`], never implicitly.
//! * **Owned**: The operator owns its matrix; callers borrow it.
//!
//! ## Invariants
//!
//! * Storage is CSR with ascending column indices per row.
//! * All weights are non-negative.
//! * Every row sum is either exactly 0 or within tolerance of 1.

// External dependencies
use num_traits::Float;
use sprs::CsMat;

// Internal dependencies
use crate::primitives::csr::gather_rows;
use crate::primitives::errors::MomentsError;

/// Square, row-stochastic sparse averaging kernel over `n` entities.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingOperator<W> {
    matrix: CsMat<W>,
}

impl<W: Float> SmoothingOperator<W> {
    /// Wrap a matrix produced by the normalizer, which is row-stochastic by construction.
    #[inline]
    pub(crate) fn from_normalized(matrix: CsMat<W>) -> Self {
        debug_assert!(matrix.is_csr());
        Self { matrix }
    }

    /// Wrap an externally built operator after checking the row-stochastic contract.
    ///
    /// CSC input is converted to CSR. Rows summing to exactly zero are accepted
    /// as degenerate; every other row must sum to 1 within `tolerance`, which
    /// must itself be positive and finite.
    pub fn try_from_matrix(matrix: CsMat<W>, tolerance: W) -> Result<Self, MomentsError> {
        if !tolerance.is_finite() || tolerance <= W::zero() {
            return Err(MomentsError::InvalidTolerance(
                tolerance.to_f64().unwrap_or(f64::NAN),
            ));
        }

        let (rows, cols) = matrix.shape();
        if rows != cols {
            return Err(MomentsError::NotSquare { rows, cols });
        }

        let matrix = if matrix.is_csr() {
            matrix
        } else {
            let raw = gather_rows(&matrix, |_| true);
            CsMat::new((rows, cols), raw.indptr, raw.indices, raw.data)
        };

        for (row, weights) in matrix.outer_iterator().enumerate() {
            let mut sum = W::zero();
            for (col, &w) in weights.iter() {
                if w < W::zero() {
                    return Err(MomentsError::NegativeWeight { row, col });
                }
                sum = sum + w;
            }

            let off = (sum - W::one()).abs();
            if sum != W::zero() && (off.is_nan() || off > tolerance) {
                return Err(MomentsError::NotRowStochastic {
                    row,
                    sum: sum.to_f64().unwrap_or(f64::NAN),
                });
            }
        }

        Ok(Self { matrix })
    }

    /// Number of entities (rows, equal to columns).
    #[inline]
    pub fn n_entities(&self) -> usize {
        self.matrix.rows()
    }

    /// Number of stored weights.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.matrix.nnz()
    }

    /// Borrow the underlying CSR matrix.
    #[inline]
    pub fn as_csr(&self) -> &CsMat<W> {
        &self.matrix
    }

    /// Consume the operator, returning the CSR matrix.
    #[inline]
    pub fn into_csr(self) -> CsMat<W> {
        self.matrix
    }

    /// Neighbor indices and weights of `entity`, including itself when self-looped.
    pub fn neighbors(&self, entity: usize) -> Vec<(usize, W)> {
        self.matrix
            .outer_view(entity)
            .map(|row| row.iter().map(|(col, &w)| (col, w)).collect())
            .unwrap_or_default()
    }

    /// Sum of each row.
    pub fn row_sums(&self) -> Vec<W> {
        self.matrix
            .outer_iterator()
            .map(|row| row.iter().fold(W::zero(), |acc, (_, &w)| acc + w))
            .collect()
    }

    /// Indices of all-zero rows.
    pub fn degenerate_rows(&self) -> Vec<usize> {
        self.row_sums()
            .into_iter()
            .enumerate()
            .filter(|&(_, sum)| sum == W::zero())
            .map(|(row, _)| row)
            .collect()
    }

    /// True when every non-degenerate row sums to 1 within `tolerance`.
    pub fn is_row_stochastic(&self, tolerance: W) -> bool {
        self.row_sums()
            .into_iter()
            .all(|sum| sum == W::zero() || (sum - W::one()).abs() <= tolerance)
    }

    /// Convert the weights to another precision.
    ///
    /// Narrowing (e.g. `f64` to `f32`) rounds each weight; rows still sum to 1
    /// within the precision of `U`.
    pub fn cast<U: Float>(&self) -> SmoothingOperator<U> {
        SmoothingOperator {
            matrix: self.matrix.map(|&w| U::from(w).unwrap_or_else(U::nan)),
        }
    }
}
