//! Dummy LLM provider — echoes the latest user message prefixed with `[echo]`.
//! Lets the whole shell run without an API key or network.

use crate::llm::{LlmResponse, ProviderError};
use crate::message::{Message, Role};

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn complete(
        &self,
        history: &[Message],
        _system: Option<&str>,
    ) -> Result<LlmResponse, ProviderError> {
        let last_user = history
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        Ok(LlmResponse {
            text: format!("[echo] {last_user}"),
            usage: None,
        })
    }
}
