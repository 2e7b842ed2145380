//! Raw YAML deserialization types.
//!
//! These structs mirror the file shapes. The tools config has no defaults:
//! every key it declares is required. The project config is all defaults.
//! The `load` module converts both into the public `types` structs.

use serde::{Deserialize, Deserializer};

// ── Tools config ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawToolsConfig {
    pub primary_agent: RawPrimaryAgent,
    pub tavily_search_api: RawTavily,
    pub swiss_airline_policy_rag: RawRag,
    pub stories_rag: RawRag,
    pub graph_configs: RawGraphConfigs,
}

#[derive(Deserialize)]
pub(super) struct RawPrimaryAgent {
    pub llm: String,
    pub llm_temperature: f32,
}

#[derive(Deserialize)]
pub(super) struct RawTavily {
    pub tavily_search_max_results: u32,
}

#[derive(Deserialize)]
pub(super) struct RawRag {
    pub llm: String,
    pub llm_temperature: f32,
    pub embedding_model: String,
    pub vectordb: String,
    pub unstructured_docs: String,
    pub k: u32,
    pub chunk_size: u32,
    pub chunk_overlap: u32,
    pub collection_name: String,
}

#[derive(Deserialize)]
pub(super) struct RawGraphConfigs {
    #[serde(deserialize_with = "string_or_number")]
    pub thread_id: String,
}

// ── Project config ───────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub(super) struct RawProjectConfig {
    #[serde(default)]
    pub directories: RawDirectories,
    #[serde(default)]
    pub logging: RawLogging,
    #[serde(default)]
    pub llm: RawLlmEndpoint,
}

#[derive(Deserialize)]
pub(super) struct RawDirectories {
    #[serde(default = "default_memory_dir")]
    pub memory_dir: String,
}

impl Default for RawDirectories {
    fn default() -> Self {
        Self { memory_dir: default_memory_dir() }
    }
}

#[derive(Deserialize)]
pub(super) struct RawLogging {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for RawLogging {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

#[derive(Deserialize)]
pub(super) struct RawLlmEndpoint {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for RawLlmEndpoint {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

// ── Defaults ─────────────────────────────────────────────────────────────────

pub(super) fn default_memory_dir() -> String {
    "memory".to_string()
}

pub(super) fn default_log_level() -> String {
    "info".to_string()
}

pub(super) fn default_api_base_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

pub(super) fn default_timeout_seconds() -> u64 {
    60
}

pub(super) const DEFAULT_CHROMA_HOST: &str = "localhost";
pub(super) const DEFAULT_CHROMA_PORT: u16 = 8000;

/// Accept `thread_id: 1` as well as `thread_id: "1"`.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Int(i64),
        Float(f64),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Int(i) => i.to_string(),
        StringOrNumber::Float(f) => f.to_string(),
    })
}
