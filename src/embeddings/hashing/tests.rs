use super::*;

fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[test]
fn shapes_and_normalisation() {
    let embedder = HashingEmbedder::new(128);
    let texts = vec![
        "hello world".to_string(),
        "a completely different sentence".to_string(),
    ];
    let vectors = embedder.embed(&texts).expect("embedding succeeds");

    assert_eq!(vectors.len(), 2);
    for vector in &vectors {
        assert_eq!(vector.len(), 128);
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() <= 1e-4, "vector is L2-normalized (norm={norm})");
    }
}

#[test]
fn deterministic_for_same_input() {
    let embedder = HashingEmbedder::default();
    let first = embedder
        .embed(&["The capital of France is Paris".to_string()])
        .expect("embedding succeeds");
    let second = embedder
        .embed(&["The capital of France is Paris".to_string()])
        .expect("embedding succeeds");
    assert_eq!(first, second);
}

#[test]
fn case_and_punctuation_insensitive() {
    let embedder = HashingEmbedder::default();
    let vectors = embedder
        .embed(&["Paris, France!".to_string(), "paris france".to_string()])
        .expect("embedding succeeds");
    assert_eq!(vectors[0], vectors[1]);
}

#[test]
fn shared_terms_are_closer() {
    let embedder = HashingEmbedder::default();
    let vectors = embedder
        .embed(&[
            "rust borrow checker ownership".to_string(),
            "ownership and the borrow checker in rust".to_string(),
            "baking sourdough bread at home".to_string(),
        ])
        .expect("embedding succeeds");

    let related = squared_distance(&vectors[0], &vectors[1]);
    let unrelated = squared_distance(&vectors[0], &vectors[2]);
    assert!(related < unrelated, "{related} should be < {unrelated}");
}

#[test]
fn empty_text_is_zero_vector() {
    let embedder = HashingEmbedder::new(64);
    let vectors = embedder.embed(&[String::new()]).expect("embedding succeeds");
    assert!(vectors[0].iter().all(|x| *x == 0.0));
}

#[test]
fn zero_dimension_fails() {
    let embedder = HashingEmbedder::new(0);
    assert!(embedder.embed(&["text".to_string()]).is_err());
}

#[test]
fn empty_batch() {
    let embedder = HashingEmbedder::default();
    assert!(embedder.embed(&[]).expect("empty batch").is_empty());
}
