use docqa_core::config::EmbeddingSettings;
use docqa_embed::{get_default_embedder, FakeEmbedder, MINILM_DIM};
use docqa_core::traits::Embedder;

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[test]
fn fake_embedder_shapes_and_determinism() {
    // Force fake embedder to avoid loading the model
    std::env::set_var("APP_USE_FAKE_EMBEDDINGS", "1");

    let embedder = get_default_embedder(&EmbeddingSettings::default()).expect("embedder");
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(embedder.dim(), MINILM_DIM);
    assert_eq!(v1.len(), MINILM_DIM, "embedding dim matches MiniLM");

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[test]
fn fake_embedder_prefers_shared_vocabulary() {
    let embedder = FakeEmbedder::new(256);
    let q = embedder.embed_one("transformer attention heads").unwrap();
    let near = embedder.embed_one("attention heads in a transformer model").unwrap();
    let far = embedder.embed_one("sourdough bread baking schedule").unwrap();
    assert!(cosine(&q, &near) > cosine(&q, &far));
}

#[test]
fn fake_embedder_keeps_batch_order() {
    let embedder = FakeEmbedder::new(64);
    let texts: Vec<String> = ["alpha", "beta", "gamma"].iter().map(|s| s.to_string()).collect();
    let batch = embedder.embed_batch(&texts).unwrap();
    assert_eq!(batch.len(), 3);
    for (text, v) in texts.iter().zip(&batch) {
        assert_eq!(&embedder.embed_one(text).unwrap(), v);
    }
}
