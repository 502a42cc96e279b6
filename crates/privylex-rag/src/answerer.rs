use tracing::{debug, warn};

use privylex_core::config::AnswerConfig;
use privylex_core::{GenerationRequest, Generator};

/// Returned whenever the context cannot support an answer. Callers may match on it.
pub const NOT_FOUND_PHRASE: &str = "The answer is not found in the provided document context.";

const SYSTEM_PROMPT: &str =
    "You are PrivyLex, an AI assistant for legal document Q&A. Answer based SOLELY on the provided context.";

/// Grounded single-shot answering over one generator.
pub struct Answerer {
    generator: Box<dyn Generator>,
    max_tokens: usize,
    temperature: f32,
}

impl Answerer {
    pub fn new(generator: Box<dyn Generator>, config: &AnswerConfig) -> Self {
        Self { generator, max_tokens: config.max_tokens, temperature: config.temperature }
    }

    /// Answer `question` from `context`, cut to `budget_chars` characters.
    ///
    /// Never fails: generator errors come back as a descriptive string.
    pub fn answer(&self, question: &str, context: &str, budget_chars: usize) -> String {
        if context.trim().is_empty() {
            debug!("empty context, skipping generation");
            return NOT_FOUND_PHRASE.to_string();
        }
        let request = self.build_request(question, truncate_chars(context, budget_chars));
        match self.generator.generate(&request) {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "generation failed");
                format!("Error generating answer: {e}")
            }
        }
    }

    pub fn build_request(&self, question: &str, context: &str) -> GenerationRequest {
        GenerationRequest {
            system: SYSTEM_PROMPT.to_string(),
            user: grounding_prompt(question, context),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

fn grounding_prompt(question: &str, context: &str) -> String {
    format!(
        "You are PrivyLex, a helpful AI assistant specialized in answering questions about legal documents.\n\
         Use ONLY the following provided context from a legal document to answer the question.\n\
         If the answer is not found in the context, state \"{NOT_FOUND_PHRASE}\"\n\
         Do not make up information or use external knowledge. Be concise and directly answer the question.\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question: {question}\n\
         \n\
         Answer:"
    )
}

/// Hard cut at `max_chars` characters, always on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

/// Deterministic stand-in used when no generation credential is configured.
pub fn mock_analysis(query: &str, document_chars: usize) -> String {
    format!("Mock Analysis: This would analyze the document for query: '{query}'. Document length: {document_chars} characters.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use privylex_core::GenerationError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn echo_user() -> Box<dyn Generator> {
        Box::new(|req: &GenerationRequest| -> Result<String, GenerationError> { Ok(format!("  {}  ", req.user)) })
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn context_is_cut_to_budget_before_prompting() {
        let answerer = Answerer::new(echo_user(), &AnswerConfig::default());
        let context = "x".repeat(50) + "TAIL";
        let out = answerer.answer("q?", &context, 50);
        assert!(out.contains(&"x".repeat(50)));
        assert!(!out.contains("TAIL"));
        assert!(out.starts_with("You are PrivyLex"));
        assert!(out.ends_with("Answer:"));
    }

    #[test]
    fn blank_context_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let gen = move |_: &GenerationRequest| -> Result<String, GenerationError> {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok("unused".to_string())
        };
        let answerer = Answerer::new(Box::new(gen), &AnswerConfig::default());
        assert_eq!(answerer.answer("q", " \n\t", 100), NOT_FOUND_PHRASE);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn generator_failure_becomes_text() {
        let gen = |_: &GenerationRequest| -> Result<String, GenerationError> { Err(GenerationError::MissingCredential) };
        let answerer = Answerer::new(Box::new(gen), &AnswerConfig::default());
        let out = answerer.answer("q", "some context", 100);
        assert!(out.starts_with("Error generating answer: "), "{out}");
    }

    #[test]
    fn request_carries_configured_sampling() {
        let config = AnswerConfig { max_tokens: 77, temperature: 0.4, ..AnswerConfig::default() };
        let req = Answerer::new(echo_user(), &config).build_request("Who pays rent?", "Tenant pays rent.");
        assert_eq!(req.max_tokens, 77);
        assert_eq!(req.temperature, 0.4);
        assert_eq!(req.system, SYSTEM_PROMPT);
        assert!(req.user.contains(NOT_FOUND_PHRASE));
        assert!(req.user.contains("Context:\nTenant pays rent.\n\nQuestion: Who pays rent?"));
    }

    #[test]
    fn mock_mentions_query_and_length() {
        assert_eq!(
            mock_analysis("termination?", 42),
            "Mock Analysis: This would analyze the document for query: 'termination?'. Document length: 42 characters."
        );
    }
}
