//! docqa-embed
//!
//! Local sentence embeddings on candle (all-MiniLM-L6-v2 by default: BERT
//! backbone, masked mean pooling, L2 normalisation) plus a deterministic
//! hashing embedder for offline development and tests.

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

use docqa_core::config::EmbeddingSettings;
use docqa_core::traits::Embedder;

pub mod device;
pub mod hub;
pub mod pool;
pub mod tokenize;

pub use hub::{resolve_model_files, ModelFiles};
pub use pool::masked_mean_l2;
pub use tokenize::tokenize_batch;

pub const FAKE_EMBEDDINGS_VAR: &str = "APP_USE_FAKE_EMBEDDINGS";
/// Output width of all-MiniLM-L6-v2; the fake embedder mirrors it.
pub const MINILM_DIM: usize = 384;

pub struct EmbeddingModel {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    max_len: usize,
}

impl EmbeddingModel {
    pub fn load(settings: &EmbeddingSettings) -> Result<Self> {
        let device = device::select_device();
        let files = resolve_model_files(settings)?;
        info!(model = %settings.model_id, weights = %files.weights.display(), "loading embedding model");

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", files.tokenizer.display(), e))?;
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams { max_length: settings.max_len, ..Default::default() }))
            .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;

        let raw_config = std::fs::read_to_string(&files.config)?;
        let config: BertConfig = serde_json::from_str(&raw_config)?;
        let dim = serde_json::from_str::<serde_json::Value>(&raw_config)?["hidden_size"]
            .as_u64()
            .ok_or_else(|| anyhow!("config.json has no hidden_size"))? as usize;

        let vb = if files.is_safetensors() {
            // SAFETY: the weights file is not modified while the model is alive.
            unsafe { VarBuilder::from_mmaped_safetensors(&[&files.weights], DType::F32, &device)? }
        } else {
            let weights: HashMap<String, Tensor> = candle_core::pickle::read_all(&files.weights)?.into_iter().collect();
            VarBuilder::from_tensors(weights, DType::F32, &device)
        };
        let model = BertModel::load(vb, &config)?;
        info!(dim, max_len = settings.max_len, "embedding model loaded");
        Ok(Self { model, tokenizer, device, dim, max_len: settings.max_len })
    }
}

impl Embedder for EmbeddingModel {
    fn dim(&self) -> usize { self.dim }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() { return Ok(Vec::new()); }
        let start = Instant::now();
        let (input_ids, attention_mask) = tokenize_batch(&self.tokenizer, texts, self.max_len, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let vectors: Vec<Vec<f32>> = pooled.to_device(&Device::Cpu)?.to_vec2()?;
        debug!(batch = texts.len(), elapsed_ms = start.elapsed().as_millis() as u64, "embedded batch");
        Ok(vectors)
    }
}

/// Bag-of-tokens hashing embedder: deterministic, L2-normalised, no model files.
pub struct FakeEmbedder { dim: usize }

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim } }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v { *x /= norm; }
        v
    }
}

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize { self.dim }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

pub fn fake_embeddings_requested() -> bool {
    std::env::var(FAKE_EMBEDDINGS_VAR).ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

pub fn get_default_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>> {
    if fake_embeddings_requested() {
        info!("using FakeEmbedder ({}=1)", FAKE_EMBEDDINGS_VAR);
        return Ok(Arc::new(FakeEmbedder::new(MINILM_DIM)));
    }
    Ok(Arc::new(EmbeddingModel::load(settings)?))
}
