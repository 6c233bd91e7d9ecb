//! The fixed question-answering prompt.

use docqa_core::types::RetrievalResult;

const CONTEXT: &str = "{context}";
const INPUT: &str = "{input}";

/// Separator between retrieved chunks in the context block.
pub const DOCUMENT_SEPARATOR: &str = "\n\n";

pub const DEFAULT_TEMPLATE: &str = concat!(
    "Answer the questions based on the provided context only.\n",
    "Provide the most accurate response based on the question.\n",
    "<context>\n",
    "{context}\n",
    "<context>\n",
    "Question: {input}\n",
);

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: &'static str,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self { template: DEFAULT_TEMPLATE }
    }
}

impl PromptTemplate {
    /// Substitute both placeholders in one pass; text coming from the context
    /// or the question is never scanned for placeholders.
    pub fn render(&self, context: &str, question: &str) -> String {
        self.template
            .split(CONTEXT)
            .map(|part| part.replace(INPUT, question))
            .collect::<Vec<_>>()
            .join(context)
    }
}

/// Retrieved chunk texts in retrieval order, one block.
pub fn format_context(retrieved: &RetrievalResult) -> String {
    retrieved.chunks().map(|c| c.text.as_str()).collect::<Vec<_>>().join(DOCUMENT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_core::types::{Chunk, ScoredChunk};

    fn hit(text: &str, score: f32) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk { text: text.to_string(), source_id: "s".into(), position: 0, chunk_index: 0, start: 0, end: 0 },
            score,
        }
    }

    #[test]
    fn renders_context_and_question() {
        let prompt = PromptTemplate::default().render("CTX", "What is attention?");
        assert_eq!(
            prompt,
            "Answer the questions based on the provided context only.\n\
             Provide the most accurate response based on the question.\n\
             <context>\nCTX\n<context>\nQuestion: What is attention?\n"
        );
    }

    #[test]
    fn placeholders_inside_inputs_are_left_alone() {
        let prompt = PromptTemplate::default().render("literal {input} here", "why {context}?");
        assert!(prompt.contains("literal {input} here"));
        assert!(prompt.contains("Question: why {context}?"));
    }

    #[test]
    fn context_keeps_retrieval_order() {
        let retrieved = RetrievalResult { hits: vec![hit("second best", 0.2), hit("best", 0.9)] };
        assert_eq!(format_context(&retrieved), "second best\n\nbest");
    }
}
