use super::*;

fn sample_index() -> FlatL2Index {
    FlatL2Index::build(&[
        vec![0.0, 0.0],
        vec![1.0, 0.0],
        vec![0.0, 2.0],
        vec![3.0, 4.0],
    ])
    .expect("index builds")
}

#[test]
fn squared_distance() {
    assert_eq!(squared_l2(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
    assert_eq!(squared_l2(&[1.5, -2.0], &[1.5, -2.0]), 0.0);
}

#[test]
fn build_records_shape() {
    let index = sample_index();
    assert_eq!(index.dimension(), 2);
    assert_eq!(index.len(), 4);
    assert!(!index.is_empty());
}

#[test]
fn build_rejects_empty_input() {
    assert!(matches!(
        FlatL2Index::build(&[]),
        Err(MandoError::EmptyCorpus)
    ));
}

#[test]
fn build_rejects_mixed_dimensions() {
    let result = FlatL2Index::build(&[vec![0.0, 1.0], vec![0.0, 1.0, 2.0]]);
    assert!(matches!(result, Err(MandoError::Embedding(_))));
}

#[test]
fn build_rejects_zero_dimension() {
    let result = FlatL2Index::build(&[Vec::new(), Vec::new()]);
    assert!(matches!(result, Err(MandoError::Embedding(_))));
}

#[test]
fn build_rejects_nan() {
    let result = FlatL2Index::build(&[vec![0.0, f32::NAN]]);
    assert!(matches!(result, Err(MandoError::Embedding(_))));
}

#[test]
fn search_orders_by_distance() {
    let index = sample_index();
    let neighbors = index.search(&[0.9, 0.1], 3).expect("search succeeds");

    let positions = neighbors.iter().map(|n| n.position).collect::<Vec<_>>();
    assert_eq!(positions, vec![1, 0, 2]);
    assert!((neighbors[0].distance - 0.02).abs() < 1e-6);
    for pair in neighbors.windows(2) {
        assert!(pair[0].distance <= pair[1].distance);
    }
}

#[test]
fn search_with_large_k_returns_all() {
    let index = sample_index();
    let neighbors = index.search(&[0.0, 0.0], 50).expect("search succeeds");
    assert_eq!(neighbors.len(), 4);
    assert_eq!(neighbors[0].position, 0);
    assert_eq!(neighbors[0].distance, 0.0);
    assert_eq!(neighbors[3].position, 3);
}

#[test]
fn search_with_zero_k() {
    let index = sample_index();
    assert!(index.search(&[0.0, 0.0], 0).expect("search succeeds").is_empty());
}

#[test]
fn ties_break_by_position() {
    let index = FlatL2Index::build(&[
        vec![1.0, 0.0],
        vec![0.0, 1.0],
        vec![-1.0, 0.0],
        vec![0.0, -1.0],
        vec![5.0, 5.0],
    ])
    .expect("index builds");

    let neighbors = index.search(&[0.0, 0.0], 4).expect("search succeeds");
    let positions = neighbors.iter().map(|n| n.position).collect::<Vec<_>>();
    assert_eq!(positions, vec![0, 1, 2, 3]);

    let neighbors = index.search(&[0.0, 0.0], 2).expect("search succeeds");
    let positions = neighbors.iter().map(|n| n.position).collect::<Vec<_>>();
    assert_eq!(positions, vec![0, 1]);
}

#[test]
fn query_dimension_mismatch_fails() {
    let index = sample_index();
    assert!(matches!(
        index.search(&[0.0, 0.0, 0.0], 2),
        Err(MandoError::Embedding(_))
    ));
    assert!(matches!(
        index.search(&[0.0], 2),
        Err(MandoError::Embedding(_))
    ));
}

#[test]
fn rebuild_is_deterministic() {
    let vectors = vec![vec![0.3, 0.1, 0.7], vec![0.2, 0.9, 0.4], vec![0.6, 0.5, 0.1]];
    let first = FlatL2Index::build(&vectors).expect("index builds");
    let second = FlatL2Index::build(&vectors).expect("index builds");
    assert_eq!(first, second);
    assert_eq!(
        first.search(&[0.2, 0.8, 0.5], 3).expect("search succeeds"),
        second.search(&[0.2, 0.8, 0.5], 3).expect("search succeeds")
    );
}
