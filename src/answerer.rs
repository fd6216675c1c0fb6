//! Context-augmented answering over a user's captures

use crate::backends::CompletionBackend;
use crate::error::Result;
use crate::http_backend::HttpCompletionBackend;
use crate::prompt::{build_answer_request, build_summary_request};
use crate::providers::ProviderSelector;
use crate::scoring::rank;
use crate::selection::select_context;
use crate::types::*;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Main answerer (thread-safe via Arc)
pub struct Answerer {
    selector: Arc<ProviderSelector>,
    backend: Box<dyn CompletionBackend>,
}

pub type SharedAnswerer = Arc<Answerer>;

impl Answerer {
    pub fn new(selector: Arc<ProviderSelector>, backend: Box<dyn CompletionBackend>) -> SharedAnswerer {
        Arc::new(Self { selector, backend })
    }

    /// Process-wide provider selection with the HTTP backend
    pub fn from_env() -> SharedAnswerer {
        let selector = ProviderSelector::global();
        let backend = HttpCompletionBackend::new(selector.config());
        Self::new(selector, Box::new(backend))
    }

    pub fn is_configured(&self) -> bool {
        self.selector.is_configured()
    }

    pub fn active_provider(&self) -> Option<ProviderStatus> {
        self.selector.status()
    }

    /// Rank captures for a query without calling any provider
    pub fn search(&self, query: &str, candidates: &[Capture]) -> Vec<ScoredCapture> {
        rank(query, candidates)
    }

    /// Main entry point: answer a question from the user's whole capture pool
    pub async fn ask(&self, question: &str, candidates: &[Capture]) -> Result<AskResponse> {
        self.ask_at(question, candidates, Utc::now()).await
    }

    /// [`Answerer::ask`] with an explicit clock for recency scoring
    pub async fn ask_at(
        &self,
        question: &str,
        candidates: &[Capture],
        now: DateTime<Utc>,
    ) -> Result<AskResponse> {
        // fail before ranking when nothing is configured
        self.selector.require()?;

        let context = select_context(question, candidates, now);
        info!(
            "Answering question over {} captures ({} in context)",
            candidates.len(),
            context.len()
        );

        let answer = self.answer(question, &context).await?;

        Ok(AskResponse {
            answer,
            captures_used: context,
        })
    }

    /// Answer using exactly the given captures, already in relevance order
    pub async fn answer(&self, question: &str, context: &[Capture]) -> Result<String> {
        let provider = self.selector.require()?;
        let request = build_answer_request(question, context);

        let start = Instant::now();
        let text = self.backend.complete(provider, &request).await?;

        info!(
            "{} answered via {} in {}ms",
            provider.descriptor.display_name,
            self.backend.name(),
            start.elapsed().as_millis()
        );

        Ok(text.trim().to_string())
    }

    /// Best-effort one-sentence summary. Never fails: any problem yields `None`.
    pub async fn summarize(&self, content: &str) -> Option<String> {
        if content.trim().is_empty() {
            return None;
        }

        let Some(provider) = self.selector.active() else {
            debug!("Skipping summary: no AI provider configured");
            return None;
        };

        let request = build_summary_request(content);
        match self.backend.complete(provider, &request).await {
            Ok(text) => {
                let summary = text.trim();
                (!summary.is_empty()).then(|| summary.to_string())
            }
            Err(e) => {
                warn!("Summary unavailable: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MockBackend;
    use crate::error::AiError;
    use std::collections::HashMap;

    fn selector(pairs: &[(&str, &str)]) -> Arc<ProviderSelector> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Arc::new(ProviderSelector::new(env))
    }

    fn note(content: &str) -> Capture {
        Capture {
            id: "n".to_string(),
            title: Some("Note".to_string()),
            content: Some(content.to_string()),
            capture_type: CaptureType::Note,
            source: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_summarize_trims_reply() {
        let answerer = Answerer::new(
            selector(&[("GROQ_API_KEY", "g")]),
            Box::new(MockBackend::replying("  A note about bread.  \n")),
        );
        let summary = tokio_test::block_on(answerer.summarize("bread recipe with rye"));
        assert_eq!(summary.as_deref(), Some("A note about bread."));
    }

    #[test]
    fn test_summarize_swallows_errors() {
        let answerer = Answerer::new(
            selector(&[("GROQ_API_KEY", "g")]),
            Box::new(MockBackend::with_reply(|| {
                Err(AiError::RateLimit { provider: "Groq" })
            })),
        );
        assert!(tokio_test::block_on(answerer.summarize("anything")).is_none());
    }

    #[test]
    fn test_summarize_without_provider_is_none() {
        let answerer = Answerer::new(selector(&[]), Box::new(MockBackend::replying("unused")));
        assert!(tokio_test::block_on(answerer.summarize("anything")).is_none());
    }

    #[test]
    fn test_summarize_blank_content_skips_backend() {
        let backend = Arc::new(MockBackend::replying("unused"));
        let answerer = Answerer::new(selector(&[("GROQ_API_KEY", "g")]), Box::new(backend.clone()));
        assert!(tokio_test::block_on(answerer.summarize("   ")).is_none());
        assert!(backend.requests().is_empty());
    }

    #[test]
    fn test_answer_uses_ask_settings() {
        let backend = Arc::new(MockBackend::replying(" ok "));
        let answerer = Answerer::new(selector(&[("OPENAI_API_KEY", "k")]), Box::new(backend.clone()));
        let text = tokio_test::block_on(answerer.answer("what?", &[note("x")])).unwrap();
        assert_eq!(text, "ok");
        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].settings, GenerationSettings::ASK);
    }

    #[test]
    fn test_auth_error_propagates() {
        let answerer = Answerer::new(
            selector(&[("OPENAI_API_KEY", "bad")]),
            Box::new(MockBackend::with_reply(|| {
                Err(AiError::Auth { provider: "OpenAI", env_var: "OPENAI_API_KEY" })
            })),
        );
        let err = tokio_test::block_on(answerer.ask("q", &[note("x")])).unwrap_err();
        assert!(matches!(err, AiError::Auth { .. }));
        assert!(!err.is_retryable());
    }
}
