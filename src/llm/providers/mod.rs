//! LLM provider implementations.
//!
//! `build(settings)` is the factory — called once while the graph is built.

pub mod dummy;
pub mod openai_compatible;

use crate::config::Settings;
use crate::llm::{LlmProvider, ProviderError};

/// Construct the primary agent's provider.
///
/// `primary_agent.llm == "dummy"` selects the offline echo backend; any other
/// value is a model name for the configured OpenAI-compatible endpoint,
/// authenticated with the OpenAI key from [`Settings::credentials`].
pub fn build(settings: &Settings) -> Result<LlmProvider, ProviderError> {
    if settings.uses_dummy_llm() {
        return Ok(LlmProvider::Dummy(dummy::DummyProvider));
    }
    let p = openai_compatible::OpenAiCompatibleProvider::new(
        settings.project.llm_api_base_url.clone(),
        settings.primary_agent.llm.clone(),
        settings.primary_agent.llm_temperature,
        settings.project.llm_timeout_seconds,
        Some(settings.credentials.openai_api_key.clone()),
    )?;
    Ok(LlmProvider::OpenAiCompatible(p))
}
