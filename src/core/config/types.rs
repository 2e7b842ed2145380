//! Public configuration types.
//!
//! These are the resolved, ready-to-use structs the rest of the process
//! consumes. Raw YAML deserialization types live in `raw.rs`.

use std::fmt;
use std::path::PathBuf;

// ── Agents ───────────────────────────────────────────────────────────────────

/// Primary agent settings (`primary_agent` in the tools config).
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryAgentConfig {
    /// Model name sent to the chat completions endpoint, or `"dummy"`.
    pub llm: String,
    pub llm_temperature: f32,
}

/// Web search tool settings (`tavily_search_api`).
#[derive(Debug, Clone, PartialEq)]
pub struct TavilySearchConfig {
    pub max_results: u32,
}

/// One retrieval-augmented-generation backend.
///
/// Used for both `swiss_airline_policy_rag` and `stories_rag`. Directory
/// fields are already resolved against the project root.
#[derive(Debug, Clone, PartialEq)]
pub struct RagConfig {
    pub llm: String,
    pub llm_temperature: f32,
    pub embedding_model: String,
    pub vectordb_dir: PathBuf,
    pub unstructured_docs_dir: PathBuf,
    /// Number of chunks retrieved per query.
    pub k: u32,
    pub chunk_size: u32,
    pub chunk_overlap: u32,
    pub collection_name: String,
}

/// Graph run settings (`graph_configs`).
#[derive(Debug, Clone, PartialEq)]
pub struct GraphConfig {
    /// Conversation key: transcript file stem and graph correlation id.
    pub thread_id: String,
}

// ── Project ──────────────────────────────────────────────────────────────────

/// Settings from the project config file.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectConfig {
    /// Where transcripts are written (resolved, no `~`).
    pub memory_dir: PathBuf,
    pub log_level: String,
    /// Full chat completions endpoint URL used by the primary agent.
    pub llm_api_base_url: String,
    /// Per-request HTTP timeout in seconds.
    pub llm_timeout_seconds: u64,
}

/// Vector store endpoint, from `CHROMA_HOST` / `CHROMA_PORT`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChromaConfig {
    pub host: String,
    pub port: u16,
}

/// API keys read from the environment. Never sourced from YAML.
#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub openai_api_key: String,
    pub tavily_api_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &"<redacted>")
            .field("tavily_api_key", &"<redacted>")
            .finish()
    }
}

/// Fully-resolved process settings. Built once at startup, then shared by
/// reference.
#[derive(Debug, Clone)]
pub struct Settings {
    pub primary_agent: PrimaryAgentConfig,
    pub tavily_search: TavilySearchConfig,
    pub policy_rag: RagConfig,
    pub stories_rag: RagConfig,
    pub graph: GraphConfig,
    pub project: ProjectConfig,
    pub chroma: ChromaConfig,
    pub credentials: Credentials,
}

impl Settings {
    pub fn thread_id(&self) -> &str {
        &self.graph.thread_id
    }

    /// Returns `true` when the primary agent runs on the offline echo backend.
    pub fn uses_dummy_llm(&self) -> bool {
        self.primary_agent.llm == "dummy"
    }
}
