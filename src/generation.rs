//! Generation client: one prompt in, one document out.
//!
//! Wraps the configured [`LlmProvider`] and folds its failure modes into the
//! two cases callers act on. The underlying provider fault is logged here and
//! never travels further; users only see the generic retry message.

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::llm::{LlmProvider, ProviderError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("No output generated!")]
    EmptyOutput,
    #[error("Something wrong with the generator! Please try again.")]
    ServiceError,
}

/// Built once at startup and handed to the study service.
#[derive(Debug, Clone)]
pub struct Generator {
    provider: LlmProvider,
}

impl Generator {
    pub fn new(provider: LlmProvider) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Run `prompt` through the provider. No retries.
    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        debug!(provider = self.provider.name(), prompt_len = prompt.len(), "generating");
        match self.provider.complete(prompt).await {
            Ok(text) if text.is_empty() => {
                warn!(provider = self.provider.name(), "generator returned empty output");
                Err(GenerationError::EmptyOutput)
            }
            Ok(text) => Ok(text),
            Err(ProviderError::EmptyOutput) => {
                warn!(provider = self.provider.name(), "generator returned no output");
                Err(GenerationError::EmptyOutput)
            }
            Err(e) => {
                error!(provider = self.provider.name(), error = %e, "generation failed");
                Err(GenerationError::ServiceError)
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn scripted(provider: crate::llm::providers::scripted::ScriptedProvider) -> Self {
        Self::new(LlmProvider::Scripted(provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::providers::dummy::DummyProvider;
    use crate::llm::providers::scripted::{ScriptedProvider, ScriptedReply};

    #[tokio::test]
    async fn passes_text_through_unchanged() {
        let script = ScriptedProvider::with_text(&["  # Title\n\nbody  "]);
        let out = Generator::scripted(script.clone()).generate("p").await.unwrap();
        assert_eq!(out, "  # Title\n\nbody  ");
        assert_eq!(script.prompts(), vec!["p".to_string()]);
    }

    #[tokio::test]
    async fn empty_reply_maps_to_empty_output() {
        let script = ScriptedProvider::new([ScriptedReply::Empty]);
        let err = Generator::scripted(script).generate("p").await.unwrap_err();
        assert_eq!(err, GenerationError::EmptyOutput);
        assert_eq!(err.to_string(), "No output generated!");
    }

    #[tokio::test]
    async fn empty_text_maps_to_empty_output() {
        let script = ScriptedProvider::with_text(&[""]);
        let err = Generator::scripted(script).generate("p").await.unwrap_err();
        assert_eq!(err, GenerationError::EmptyOutput);
    }

    #[tokio::test]
    async fn whitespace_text_is_not_empty_output() {
        let script = ScriptedProvider::with_text(&["\n  \n"]);
        let out = Generator::scripted(script).generate("p").await.unwrap();
        assert_eq!(out, "\n  \n");
    }

    #[tokio::test]
    async fn transport_fault_hides_cause() {
        let script = ScriptedProvider::new([ScriptedReply::Fail("HTTP 500: key sk-secret".into())]);
        let err = Generator::scripted(script).generate("p").await.unwrap_err();
        assert_eq!(err, GenerationError::ServiceError);
        assert!(!err.to_string().contains("sk-secret"));
        assert_eq!(err.to_string(), "Something wrong with the generator! Please try again.");
    }

    #[tokio::test]
    async fn single_call_no_retry() {
        let script = ScriptedProvider::new([
            ScriptedReply::Fail("boom".into()),
            ScriptedReply::Text("never reached".into()),
        ]);
        let generator = Generator::scripted(script.clone());
        assert!(generator.generate("p").await.is_err());
        assert_eq!(script.calls(), 1);
    }

    #[tokio::test]
    async fn dummy_provider_is_usable() {
        let generator = Generator::new(LlmProvider::Dummy(DummyProvider));
        assert_eq!(generator.provider_name(), "dummy");
        assert!(!generator.generate("anything").await.unwrap().is_empty());
    }
}
