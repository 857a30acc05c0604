//! Test-only provider that replays queued replies and records every prompt.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::Barrier;

use crate::llm::ProviderError;

#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Text(String),
    Empty,
    Fail(String),
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedProvider {
    replies: Arc<Mutex<VecDeque<ScriptedReply>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    /// When set, every call waits until `parties` calls are in flight.
    gate: Option<Arc<Barrier>>,
}

impl ScriptedProvider {
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into_iter().collect())),
            prompts: Arc::default(),
            gate: None,
        }
    }

    /// Hold each reply until `parties` concurrent calls have arrived.
    pub fn gated(mut self, parties: usize) -> Self {
        self.gate = Some(Arc::new(Barrier::new(parties)));
        self
    }

    pub fn with_text(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| ScriptedReply::Text((*r).to_string())))
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(gate) = &self.gate {
            gate.wait().await;
        }
        match self.replies.lock().unwrap().pop_front() {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Empty) => Err(ProviderError::EmptyOutput),
            Some(ScriptedReply::Fail(msg)) => Err(ProviderError::Request(msg)),
            None => Err(ProviderError::Request("script exhausted".into())),
        }
    }
}
