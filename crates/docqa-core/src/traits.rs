/// Maps text to a fixed-length vector.
///
/// Implementations must return vectors of length `dim()` for every input and
/// one vector per input text, in input order.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    fn embed_one(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector"))
    }
}

/// Turns a filled prompt into generated text.
pub trait Generator: Send + Sync {
    /// Model identifier shown to the user alongside answers.
    fn model_id(&self) -> &str;
    fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}
