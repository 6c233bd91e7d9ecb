use docqa_core::config::EmbeddingSettings;
use docqa_core::traits::Embedder;
use docqa_embed::EmbeddingModel;

fn main() -> anyhow::Result<()> {
    let embedder = EmbeddingModel::load(&EmbeddingSettings::default())?;
    let texts = vec!["hello world".to_string(), "rust embeddings".to_string()];
    let embs = embedder.embed_batch(&texts)?;
    println!("B={} dim={}", embs.len(), embedder.dim());
    Ok(())
}
