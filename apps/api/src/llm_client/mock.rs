//! Language model double for tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{LanguageModel, LlmError};

#[derive(Clone)]
enum Behaviour {
    Reply(String),
    Echo,
    Fail { status: u16 },
}

/// Records every prompt it receives and answers according to its behaviour.
#[derive(Clone)]
pub struct MockLanguageModel {
    behaviour: Behaviour,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockLanguageModel {
    fn with(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always answers with `text`.
    pub fn returning(text: impl Into<String>) -> Self {
        Self::with(Behaviour::Reply(text.into()))
    }

    /// Answers with the prompt it was given, so tests can see the context.
    pub fn echo() -> Self {
        Self::with(Behaviour::Echo)
    }

    /// Fails every call with an API error of the given status.
    pub fn failing(status: u16) -> Self {
        Self::with(Behaviour::Fail { status })
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    async fn generate(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.behaviour {
            Behaviour::Reply(text) => Ok(text.clone()),
            Behaviour::Echo => Ok(prompt.to_string()),
            Behaviour::Fail { status } => Err(LlmError::Api {
                status: *status,
                message: "simulated provider failure".to_string(),
            }),
        }
    }

    fn model(&self) -> &str {
        "mock-chat"
    }
}
