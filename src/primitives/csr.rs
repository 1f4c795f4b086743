//! Row-major gathering of sparse matrix entries.
//!
//! ## Purpose
//!
//! Sparse inputs may arrive in either CSR or CSC storage. This module gathers
//! the stored entries of any `CsMat` into raw CSR arrays with a counting sort
//! over rows, optionally filtering entries on the way.
//!
//! ## Invariants
//!
//! * Within each output row, column indices keep their traversal order, which
//!   is ascending for both CSR (row-major walk) and CSC (column-major walk).
//! * `indptr.len() == rows + 1` and `indptr[rows] == indices.len() == data.len()`.

// External dependencies
use num_traits::Zero;
use sprs::CsMat;

/// Raw compressed-sparse-row arrays.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowMajor<N> {
    /// Row pointer array of length `rows + 1`.
    pub indptr: Vec<usize>,
    /// Column index of every kept entry.
    pub indices: Vec<usize>,
    /// Value of every kept entry.
    pub data: Vec<N>,
}

impl<N> RowMajor<N> {
    /// Number of rows described by the row pointer.
    #[inline]
    pub fn rows(&self) -> usize {
        self.indptr.len().saturating_sub(1)
    }

    /// Column indices of `row`.
    #[inline]
    pub fn row_indices(&self, row: usize) -> &[usize] {
        &self.indices[self.indptr[row]..self.indptr[row + 1]]
    }
}

/// Gather the entries of `matrix` that satisfy `keep` into row-major order.
pub fn gather_rows<N, F>(matrix: &CsMat<N>, keep: F) -> RowMajor<N>
where
    N: Copy + Zero,
    F: Fn(N) -> bool,
{
    let rows = matrix.rows();

    // Pass 1: count kept entries per row
    let mut indptr = vec![0usize; rows + 1];
    for (&value, (row, _)) in matrix.iter() {
        if keep(value) {
            indptr[row + 1] += 1;
        }
    }
    for row in 0..rows {
        indptr[row + 1] += indptr[row];
    }

    // Pass 2: scatter into place
    let nnz = indptr[rows];
    let mut cursor = indptr[..rows].to_vec();
    let mut indices = vec![0usize; nnz];
    let mut data = vec![N::zero(); nnz];
    for (&value, (row, col)) in matrix.iter() {
        if keep(value) {
            let slot = cursor[row];
            indices[slot] = col;
            data[slot] = value;
            cursor[row] += 1;
        }
    }

    RowMajor {
        indptr,
        indices,
        data,
    }
}
