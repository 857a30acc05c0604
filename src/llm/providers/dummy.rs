//! Dummy LLM provider: canned replies so the service runs without an API key.
//!
//! Syllabus prompts (the ones asking for a JSON array) get a small fixed
//! syllabus wrapped in chatter, which also exercises bracket extraction.
//! Every other prompt gets a short Markdown summary.

use crate::llm::ProviderError;

const DUMMY_SYLLABUS: &str = r#"Sure! [{"title":"Introduction","topics":["Overview","Key Terms"]},{"title":"Core Ideas","topics":["Fundamentals","Worked Example"]}]"#;

const DUMMY_CONTENT: &str = "# Overview\n\nPlaceholder summary from the dummy provider.\n\n| Term | Meaning |\n|------|---------|\n| dummy | no model was called |\n";

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        if prompt.contains("JSON array") {
            Ok(DUMMY_SYLLABUS.to_string())
        } else {
            Ok(DUMMY_CONTENT.to_string())
        }
    }
}
