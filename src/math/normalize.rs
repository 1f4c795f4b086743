//! Graph normalization: binarize, inject self-loops, row-normalize.
//!
//! ## Purpose
//!
//! This module turns a raw affinity graph into the edge structure and weights
//! of a row-stochastic smoothing operator. Magnitudes of the input affinities
//! are discarded; the graph is treated purely as a k-NN topology.
//!
//! ## Design notes
//!
//! * **Read-only input**: The caller's graph is only borrowed; all work happens
//!   on freshly allocated row-major arrays.
//! * **Two front-ends**: Sparse (`CsMat`, any storage) and dense (`ArrayView2`)
//!   graphs binarize into the same [`RowMajor`] edge lists.
//! * **Typed precision**: Weights are computed directly in the output type `W`.
//!
//! ## Key concepts
//!
//! 1. **Binarization**: `c > EDGE_THRESHOLD` becomes an edge of weight
//!    `EDGE_WEIGHT`; zeros, negatives and NaN are dropped.
//! 2. **Self-loops**: The diagonal is overwritten with `SELF_LOOP_WEIGHT`.
//! 3. **Row normalization**: Each row is divided by its sum, with
//!    `ZERO_ROW_SUBSTITUTE` standing in for a zero sum.
//!
//! ## Invariants
//!
//! * Output rows sum to 1, or are empty (degenerate) when a row has no edges.
//! * Column indices are ascending and unique within each row.
//!
//! ## Non-goals
//!
//! * This module does not validate squareness (handled by `validator`).
//! * This module does not build the affinity graph itself.

// External dependencies
use ndarray::ArrayView2;
use num_traits::Float;
use sprs::CsMat;

// Internal dependencies
use crate::primitives::constants::{
    EDGE_THRESHOLD, EDGE_WEIGHT, SELF_LOOP_WEIGHT, ZERO_ROW_SUBSTITUTE,
};
use crate::primitives::csr::{RowMajor, gather_rows};

// ============================================================================
// Binarization
// ============================================================================

/// Binarize a sparse graph into row-major edge lists (values dropped).
pub fn binarize_sparse<A: Float>(graph: &CsMat<A>) -> RowMajor<()> {
    let threshold = A::from(EDGE_THRESHOLD).unwrap_or_else(A::zero);
    let raw = gather_rows(graph, |c| c > threshold);
    RowMajor {
        data: vec![(); raw.indices.len()],
        indptr: raw.indptr,
        indices: raw.indices,
    }
}

/// Binarize a dense graph into row-major edge lists (values dropped).
pub fn binarize_dense<A: Float>(graph: ArrayView2<'_, A>) -> RowMajor<()> {
    let threshold = A::from(EDGE_THRESHOLD).unwrap_or_else(A::zero);
    let mut indptr = Vec::with_capacity(graph.nrows() + 1);
    let mut indices = Vec::new();
    indptr.push(0);

    for row in graph.outer_iter() {
        indices.extend(
            row.iter()
                .enumerate()
                .filter(|&(_, &c)| c > threshold)
                .map(|(col, _)| col),
        );
        indptr.push(indices.len());
    }

    RowMajor {
        data: vec![(); indices.len()],
        indptr,
        indices,
    }
}

// ============================================================================
// Self-loops
// ============================================================================

/// Sort and deduplicate every row, inserting the diagonal when `self_loops` is set.
///
/// Since binarized values are all equal, forcing the diagonal reduces to
/// making sure the diagonal index is present exactly once.
pub fn canonicalize_rows(edges: RowMajor<()>, self_loops: bool) -> RowMajor<()> {
    let rows = edges.rows();
    let extra = if self_loops { rows } else { 0 };
    let mut indptr = Vec::with_capacity(rows + 1);
    let mut indices = Vec::with_capacity(edges.indices.len() + extra);
    let mut scratch: Vec<usize> = Vec::new();
    indptr.push(0);

    for row in 0..rows {
        scratch.clear();
        scratch.extend_from_slice(edges.row_indices(row));
        if self_loops {
            scratch.push(row);
        }
        scratch.sort_unstable();
        scratch.dedup();

        indices.extend_from_slice(&scratch);
        indptr.push(indices.len());
    }

    RowMajor {
        data: vec![(); indices.len()],
        indptr,
        indices,
    }
}

// ============================================================================
// Row normalization
// ============================================================================

/// Assign binarized weights and divide each row by its sum.
///
/// Returns the CSR matrix together with the indices of degenerate rows, whose
/// sum was zero and which therefore remain all-zero.
pub fn row_normalize<W: Float>(edges: RowMajor<()>, n: usize) -> (CsMat<W>, Vec<usize>) {
    let edge = W::from(EDGE_WEIGHT).unwrap_or_else(W::one);
    let self_loop = W::from(SELF_LOOP_WEIGHT).unwrap_or_else(W::one);
    let substitute = W::from(ZERO_ROW_SUBSTITUTE).unwrap_or_else(W::one);

    let mut data = Vec::with_capacity(edges.indices.len());
    let mut degenerate = Vec::new();

    for row in 0..edges.rows() {
        let cols = edges.row_indices(row);
        let weight = |col: usize| if col == row { self_loop } else { edge };

        let mut sum = cols.iter().fold(W::zero(), |acc, &col| acc + weight(col));
        if sum == W::zero() {
            sum = substitute;
            degenerate.push(row);
        }

        data.extend(cols.iter().map(|&col| weight(col) / sum));
    }

    let matrix = CsMat::new((n, n), edges.indptr, edges.indices, data);
    (matrix, degenerate)
}
