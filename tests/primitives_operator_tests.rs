#![cfg(feature = "dev")]

use approx::assert_relative_eq;
use sprs::{CsMat, TriMat};

use knn_moments::internals::primitives::csr::gather_rows;
use knn_moments::internals::primitives::errors::MomentsError;
use knn_moments::internals::primitives::operator::SmoothingOperator;

fn half_half() -> CsMat<f64> {
    CsMat::new(
        (3, 3),
        vec![0, 2, 4, 4],
        vec![0, 1, 0, 1],
        vec![0.5, 0.5, 0.5, 0.5],
    )
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_try_from_matrix_accepts_degenerate_row() {
    let op = SmoothingOperator::try_from_matrix(half_half(), 1e-9).unwrap();
    assert_eq!(op.n_entities(), 3);
    assert_eq!(op.nnz(), 4);
    assert_eq!(op.degenerate_rows(), vec![2]);
    assert!(op.is_row_stochastic(1e-12));
}

#[test]
fn test_try_from_matrix_rejects_non_square() {
    let m: CsMat<f64> = CsMat::zero((2, 3));
    assert_eq!(
        SmoothingOperator::try_from_matrix(m, 1e-6),
        Err(MomentsError::NotSquare { rows: 2, cols: 3 })
    );
}

#[test]
fn test_try_from_matrix_rejects_bad_row_sum() {
    let m = CsMat::new((2, 2), vec![0, 2, 3], vec![0, 1, 1], vec![0.5, 0.6, 1.0]);
    match SmoothingOperator::try_from_matrix(m, 1e-6) {
        Err(MomentsError::NotRowStochastic { row, sum }) => {
            assert_eq!(row, 0);
            assert_relative_eq!(sum, 1.1);
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_try_from_matrix_rejects_invalid_tolerance() {
    let m = CsMat::new((2, 2), vec![0, 2, 3], vec![0, 1, 1], vec![5.0, 7.0, 1.0]);
    assert!(matches!(
        SmoothingOperator::try_from_matrix(m.clone(), f64::NAN),
        Err(MomentsError::InvalidTolerance(t)) if t.is_nan()
    ));
    assert_eq!(
        SmoothingOperator::try_from_matrix(m.clone(), f64::INFINITY),
        Err(MomentsError::InvalidTolerance(f64::INFINITY))
    );
    assert_eq!(
        SmoothingOperator::try_from_matrix(half_half(), 0.0),
        Err(MomentsError::InvalidTolerance(0.0))
    );
    assert!(matches!(
        SmoothingOperator::try_from_matrix(m, 1e-6),
        Err(MomentsError::NotRowStochastic { row: 0, .. })
    ));
}

#[test]
fn test_try_from_matrix_rejects_negative_weight() {
    let m = CsMat::new((2, 2), vec![0, 2, 3], vec![0, 1, 1], vec![1.5, -0.5, 1.0]);
    assert_eq!(
        SmoothingOperator::try_from_matrix(m, 1e-6),
        Err(MomentsError::NegativeWeight { row: 0, col: 1 })
    );
}

#[test]
fn test_try_from_matrix_converts_csc() {
    let mut tri = TriMat::<f64>::new((3, 3));
    tri.add_triplet(0, 0, 0.25);
    tri.add_triplet(0, 2, 0.75);
    tri.add_triplet(1, 1, 1.0);
    tri.add_triplet(2, 0, 1.0);
    let csc: CsMat<f64> = tri.to_csc();

    let op = SmoothingOperator::try_from_matrix(csc, 1e-9).unwrap();
    assert!(op.as_csr().is_csr());
    assert_eq!(op.neighbors(0), vec![(0, 0.25), (2, 0.75)]);
    assert_eq!(op.neighbors(2), vec![(0, 1.0)]);
}

// ============================================================================
// Accessors
// ============================================================================

#[test]
fn test_row_sums_and_neighbors() {
    let op = SmoothingOperator::try_from_matrix(half_half(), 1e-9).unwrap();
    assert_eq!(op.row_sums(), vec![1.0, 1.0, 0.0]);
    assert_eq!(op.neighbors(1), vec![(0, 0.5), (1, 0.5)]);
    assert!(op.neighbors(2).is_empty());
    assert!(op.neighbors(7).is_empty());
}

#[test]
fn test_cast_preserves_structure() {
    let op = SmoothingOperator::try_from_matrix(half_half(), 1e-9).unwrap();
    let narrow = op.cast::<f32>();
    assert_eq!(narrow.nnz(), op.nnz());
    assert_eq!(narrow.neighbors(0), vec![(0, 0.5f32), (1, 0.5f32)]);
    assert_eq!(narrow.cast::<f64>(), op);
}

#[test]
fn test_into_csr_round_trip() {
    let op = SmoothingOperator::try_from_matrix(half_half(), 1e-9).unwrap();
    assert_eq!(op.into_csr(), half_half());
}

// ============================================================================
// Row-major gathering
// ============================================================================

#[test]
fn test_gather_rows_from_csc_is_row_sorted() {
    let mut tri = TriMat::<f64>::new((2, 3));
    tri.add_triplet(1, 2, 3.0);
    tri.add_triplet(0, 1, 1.0);
    tri.add_triplet(1, 0, 2.0);
    tri.add_triplet(0, 2, 0.0);
    let csc: CsMat<f64> = tri.to_csc();

    let raw = gather_rows(&csc, |v| v != 0.0);
    assert_eq!(raw.rows(), 2);
    assert_eq!(raw.indptr, vec![0, 1, 3]);
    assert_eq!(raw.indices, vec![1, 0, 2]);
    assert_eq!(raw.data, vec![1.0, 2.0, 3.0]);
    assert_eq!(raw.row_indices(1), &[0, 2]);
}
