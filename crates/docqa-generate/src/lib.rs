//! docqa-generate
//!
//! Stuffs retrieved chunks into the fixed prompt and asks a hosted model for
//! the answer.

pub mod groq;
pub mod prompt;

use tracing::info;

use docqa_core::config::GenerationSettings;
use docqa_core::traits::Generator;
use docqa_core::types::{Answer, Query, RetrievalResult};
use docqa_core::{Error, Result};

pub use groq::GroqClient;
pub use prompt::{format_context, PromptTemplate};

pub const FAKE_GENERATION_VAR: &str = "APP_USE_FAKE_GENERATION";

pub struct AnswerGenerator {
    generator: Box<dyn Generator>,
    template: PromptTemplate,
}

impl AnswerGenerator {
    pub fn new(generator: Box<dyn Generator>) -> Self {
        Self { generator, template: PromptTemplate::default() }
    }

    pub fn model_id(&self) -> &str {
        self.generator.model_id()
    }

    pub fn build_prompt(&self, query: &Query, retrieved: &RetrievalResult) -> String {
        self.template.render(&format_context(retrieved), &query.text)
    }

    /// One generation call; failures surface as `Error::Generation` and are
    /// not retried.
    pub fn answer(&self, query: &Query, retrieved: &RetrievalResult) -> Result<Answer> {
        let prompt = self.build_prompt(query, retrieved);
        let text = self.generator.generate(&prompt).map_err(|e| Error::generation(&e))?;
        Ok(Answer { text, supporting_chunks: retrieved.chunks().cloned().collect() })
    }
}

/// Offline stand-in: answers with the first non-empty line of the context.
pub struct FakeGenerator;

impl Generator for FakeGenerator {
    fn model_id(&self) -> &str {
        "fake-extractive"
    }

    fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let context = prompt.split("<context>").nth(1).unwrap_or_default();
        let first = context.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("No context was retrieved.");
        Ok(first.to_string())
    }
}

pub fn fake_generation_requested() -> bool {
    std::env::var(FAKE_GENERATION_VAR).ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

pub fn get_default_generator(settings: &GenerationSettings) -> anyhow::Result<Box<dyn Generator>> {
    if fake_generation_requested() {
        info!("using FakeGenerator ({}=1)", FAKE_GENERATION_VAR);
        return Ok(Box::new(FakeGenerator));
    }
    Ok(Box::new(GroqClient::new(settings)?))
}
