use approx::assert_abs_diff_eq;
use knn_moments::prelude::*;
use ndarray::{Array2, array};
use sprs::{CsMat, TriMat};

fn densify(m: &CsMat<f32>) -> Array2<f32> {
    Array2::from_shape_fn(m.shape(), |(i, j)| m.get(i, j).copied().unwrap_or(0.0))
}

fn scenario_graph() -> CsMat<f64> {
    CsMat::new((3, 3), vec![0, 1, 2, 2], vec![1, 0], vec![1.0, 1.0])
}

// ============================================================================
// Free Function Tests
// ============================================================================

#[test]
fn test_normalize_graph_scenario() {
    let op = normalize_graph(&scenario_graph()).unwrap();
    assert_eq!(op.n_entities(), 3);
    assert_eq!(
        densify(op.as_csr()),
        array![[0.5f32, 0.5, 0.0], [0.5, 0.5, 0.0], [0.0, 0.0, 1.0]]
    );
    assert!(op.degenerate_rows().is_empty());
}

#[test]
fn test_estimate_moments_scenario() {
    let op = normalize_graph(&scenario_graph()).unwrap();
    let x = array![[1.0f64], [3.0], [10.0]];
    let (mean, var) = estimate_moments(&op, x.view()).unwrap();
    assert_eq!(mean, array![[2.0], [2.0], [10.0]]);
    assert_eq!(var, array![[1.0], [1.0], [0.0]]);
}

#[test]
fn test_normalize_graph_rejects_rectangular() {
    let graph: CsMat<f64> = CsMat::zero((2, 3));
    assert_eq!(
        normalize_graph(&graph),
        Err(MomentsError::NotSquare { rows: 2, cols: 3 })
    );
}

#[test]
fn test_estimate_moments_rejects_row_mismatch() {
    let op = normalize_graph(&scenario_graph()).unwrap();
    let x = Array2::<f64>::zeros((2, 1));
    assert_eq!(
        estimate_moments(&op, x.view()),
        Err(MomentsError::MismatchedRows {
            operator_rows: 3,
            feature_rows: 2
        })
    );
}

#[test]
fn test_empty_graph() {
    let graph: CsMat<f64> = CsMat::zero((0, 0));
    let op = normalize_graph(&graph).unwrap();
    assert_eq!(op.n_entities(), 0);
    let x = Array2::<f64>::zeros((0, 3));
    let (mean, var) = estimate_moments(&op, x.view()).unwrap();
    assert_eq!(mean.dim(), (0, 3));
    assert_eq!(var.dim(), (0, 3));
}

#[test]
fn test_f32_features() {
    let op = normalize_graph(&scenario_graph()).unwrap();
    let x = array![[1.0f32, 2.0], [3.0, 2.0], [10.0, 2.0]];
    let (mean, var) = estimate_moments(&op, x.view()).unwrap();
    assert_eq!(mean, array![[2.0f32, 2.0], [2.0, 2.0], [10.0, 2.0]]);
    assert_abs_diff_eq!(var[[0, 1]], 0.0, epsilon = 1e-5);
}

// ============================================================================
// Builder Tests
// ============================================================================

#[test]
fn test_builder_defaults() {
    let model = KnnMoments::new().build().unwrap();
    let config = model.config();
    assert!(config.self_loops);
    assert_eq!(config.variance_policy, Raw);
    assert_abs_diff_eq!(config.tolerance, 1e-6f32);
    assert_eq!(config.parallel, cfg!(feature = "parallel"));
}

#[test]
fn test_builder_duplicate_parameter() {
    let err = KnnMoments::new()
        .variance_policy(Raw)
        .variance_policy(ClampNegative)
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        MomentsError::DuplicateParameter {
            parameter: "variance_policy"
        }
    );
}

#[test]
fn test_builder_invalid_tolerance() {
    let err = KnnMoments::new().tolerance(-1.0).build().unwrap_err();
    assert_eq!(err, MomentsError::InvalidTolerance(-1.0));
}

#[test]
fn test_builder_precision_converts_tolerance() {
    let model = KnnMoments::new()
        .tolerance(0.25)
        .precision::<f64>()
        .build()
        .unwrap();
    assert_eq!(model.config().tolerance, 0.25f64);
}

#[test]
fn test_disabled_self_loops_report_degenerate_rows() {
    let model = KnnMoments::new().self_loops(false).build().unwrap();
    let x = array![[1.0f64], [3.0], [10.0]];
    let result = model.fit(&scenario_graph(), x.view()).unwrap();

    assert_eq!(result.degenerate_rows, vec![2]);
    // Rows 0 and 1 swap values without self-loops
    assert_eq!(result.mean, array![[3.0], [1.0], [0.0]]);
    assert_eq!(result.variance, array![[0.0], [0.0], [0.0]]);
}

#[test]
fn test_dense_graph_matches_sparse() {
    let model = KnnMoments::new().precision::<f64>().build().unwrap();
    let dense = array![[0.0, 0.7, 0.1], [0.2, 0.0, 0.0], [0.0, 0.0, 0.0]];

    let mut tri = TriMat::<f64>::new((3, 3));
    tri.add_triplet(0, 1, 0.7);
    tri.add_triplet(0, 2, 0.1);
    tri.add_triplet(1, 0, 0.2);
    let sparse: CsMat<f64> = tri.to_csr();

    assert_eq!(
        model.normalize_dense(dense.view()).unwrap(),
        model.normalize(&sparse).unwrap()
    );
    assert_eq!(
        model.normalize_dense(Array2::<f64>::zeros((2, 3)).view()),
        Err(MomentsError::NotSquare { rows: 2, cols: 3 })
    );
}

#[test]
fn test_wrap_operator_uses_configured_tolerance() {
    let model = KnnMoments::new()
        .precision::<f64>()
        .tolerance(0.1)
        .build()
        .unwrap();
    let loose = CsMat::new((2, 2), vec![0, 2, 3], vec![0, 1, 1], vec![0.5, 0.55, 1.0]);
    assert!(model.wrap_operator(loose.clone()).is_ok());

    let strict = KnnMoments::new().precision::<f64>().build().unwrap();
    assert!(matches!(
        strict.wrap_operator(loose),
        Err(MomentsError::NotRowStochastic { row: 0, .. })
    ));
}

fn uniform_triangle() -> CsMat<f32> {
    CsMat::new(
        (3, 3),
        vec![0, 3, 6, 9],
        vec![0, 1, 2, 0, 1, 2, 0, 1, 2],
        vec![1.0f32 / 3.0; 9],
    )
}

#[test]
fn test_clamp_policy_counts_entries() {
    // Constant f32 features: feature 0 (1001) rounds to -0.125 in every row,
    // feature 1 (1000) is exact
    let x = Array2::from_shape_fn((3, 2), |(_, f)| if f == 0 { 1001.0f32 } else { 1000.0 });

    let raw = KnnMoments::new().build().unwrap();
    let op = raw.wrap_operator(uniform_triangle()).unwrap();
    let unclamped = raw.estimate(&op, x.view()).unwrap();
    assert_eq!(unclamped.variance.column(0).to_vec(), vec![-0.125f32; 3]);
    assert_eq!(unclamped.variance.column(1).to_vec(), vec![0.0f32; 3]);
    assert_eq!(unclamped.clamped, 0);

    let model = KnnMoments::new()
        .variance_policy(ClampNegative)
        .build()
        .unwrap();
    let op = model.wrap_operator(uniform_triangle()).unwrap();
    let result = model.estimate(&op, x.view()).unwrap();

    assert_eq!(result.variance_policy, ClampNegative);
    assert_eq!(result.clamped, 3);
    assert!(result.variance.iter().all(|&v| v == 0.0));
    assert_eq!(result.mean, unclamped.mean);
    assert_eq!(result.min_variance(), Some(0.0));
    assert!(format!("{}", result).contains("Clamped entries: 3"));
}

#[test]
fn test_parallel_and_sequential_models_agree() {
    let graph = scenario_graph();
    let x = array![[1.0f64, -4.0], [3.0, 8.0], [10.0, 0.5]];
    let seq = KnnMoments::new().parallel(false).build().unwrap();
    let par = KnnMoments::new().parallel(true).build().unwrap();
    assert_eq!(
        seq.fit(&graph, x.view()).unwrap(),
        par.fit(&graph, x.view()).unwrap()
    );
}

// ============================================================================
// Result Tests
// ============================================================================

#[test]
fn test_result_display() {
    let model = KnnMoments::new().build().unwrap();
    let x = array![[1.0f64], [3.0], [10.0]];
    let result = model.fit(&scenario_graph(), x.view()).unwrap();
    let text = format!("{}", result);

    assert!(text.contains("Entities: 3"), "{}", text);
    assert!(text.contains("Features: 1"), "{}", text);
    assert!(text.contains("Variance policy: Raw"), "{}", text);
    assert!(text.contains("10.00000"), "{}", text);
    assert!(!text.contains("Clamped"), "{}", text);
}

#[test]
fn test_result_accessors() {
    let model = KnnMoments::new().build().unwrap();
    let x = array![[1.0f64, 0.0], [3.0, 0.0], [10.0, 0.0]];
    let result = model.fit(&scenario_graph(), x.view()).unwrap();
    assert_eq!(result.n_entities(), 3);
    assert_eq!(result.n_features(), 2);
    assert_eq!(result.clamped, 0);

    let (mean, variance) = result.into_parts();
    assert_eq!(mean.dim(), variance.dim());
}

// ============================================================================
// Plotting convention
// ============================================================================

#[test]
fn test_default_point_size() {
    assert_eq!(default_point_size(0), None);
    assert_eq!(default_point_size(1000), Some(120.0));
    assert_abs_diff_eq!(default_point_size(3).unwrap(), 40_000.0);
}
