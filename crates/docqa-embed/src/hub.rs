//! Locating sentence-transformer model files on disk or on the Hugging Face Hub.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use docqa_core::config::{expand_path, EmbeddingSettings};

#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

impl ModelFiles {
    /// Files inside a local model directory; safetensors weights are preferred.
    pub fn in_dir(dir: &Path) -> Result<Self> {
        let config = dir.join("config.json");
        let tokenizer = dir.join("tokenizer.json");
        let weights = ["model.safetensors", "pytorch_model.bin"]
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.exists())
            .ok_or_else(|| anyhow!("No model weights in {} (tried model.safetensors and pytorch_model.bin)", dir.display()))?;
        for required in [&config, &tokenizer] {
            if !required.exists() {
                return Err(anyhow!("Missing model file {}", required.display()));
            }
        }
        Ok(Self { config, tokenizer, weights })
    }

    pub fn is_safetensors(&self) -> bool {
        self.weights.extension().is_some_and(|e| e == "safetensors")
    }
}

/// Resolve model files: configured dir, then `APP_MODEL_DIR`/`MODEL_DIR`,
/// then `models/<name>`, and finally a Hub download into the local cache.
pub fn resolve_model_files(settings: &EmbeddingSettings) -> Result<ModelFiles> {
    if let Some(dir) = &settings.model_dir {
        let p = expand_path(dir);
        info!(dir = %p.display(), "using configured model dir");
        return ModelFiles::in_dir(&p);
    }
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) {
            let p = expand_path(&dir);
            if p.exists() { info!(dir = %p.display(), var, "using model dir from environment"); return ModelFiles::in_dir(&p); }
            warn!(dir = %p.display(), var, "model dir from environment does not exist");
        }
    }
    let name = settings.model_id.rsplit('/').next().unwrap_or(&settings.model_id);
    let local = Path::new("models").join(name);
    if local.exists() { info!(dir = %local.display(), "using local model dir"); return ModelFiles::in_dir(&local); }
    download(settings)
}

fn download(settings: &EmbeddingSettings) -> Result<ModelFiles> {
    info!(model = %settings.model_id, "downloading embedding model from the Hugging Face Hub");
    let token = settings.hf_token.as_ref().map(|t| t.expose().to_string());
    let api = hf_hub::api::sync::ApiBuilder::new()
        .with_token(token)
        .build()
        .context("Failed to initialize Hugging Face Hub API")?;
    let repo = api.model(settings.model_id.clone());
    let config = repo.get("config.json").context("Failed to download config.json")?;
    let tokenizer = repo.get("tokenizer.json").context("Failed to download tokenizer.json")?;
    let weights = match repo.get("model.safetensors") {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "safetensors not available, using pytorch_model.bin");
            repo.get("pytorch_model.bin").context("Failed to download model weights")?
        }
    };
    Ok(ModelFiles { config, tokenizer, weights })
}
