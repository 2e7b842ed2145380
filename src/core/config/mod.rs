//! Configuration loading with env-var overrides.
//!
//! Reads `configs/tools_config.yml` and (optionally)
//! `configs/project_config.yml` relative to the current working directory,
//! then reads credentials and endpoint settings from the environment.
//!
//! # Module layout
//!
//! - **types** — Public settings structs (`Settings`, `RagConfig`, …).
//! - **raw** — Raw YAML deserialization types; kept private.
//! - **load** — Loading logic: `merge_yaml`, `load_raw_merged`, `load`,
//!   `load_from`, `expand_home`.

mod load;
mod raw;
mod types;

pub use load::{expand_home, load, load_from, EnvSnapshot, DEFAULT_PROJECT_CONFIG, DEFAULT_TOOLS_CONFIG};
pub use types::*;

#[cfg(test)]
impl Settings {
    /// Safe `Settings` for unit tests — dummy LLM, placeholder keys, no
    /// external calls, everything rooted at `root`.
    pub fn test_default(root: &std::path::Path, thread_id: &str) -> Self {
        let rag = |name: &str| RagConfig {
            llm: "dummy".into(),
            llm_temperature: 0.0,
            embedding_model: "dummy-embedding".into(),
            vectordb_dir: root.join("data/vectordb").join(name),
            unstructured_docs_dir: root.join("data/unstructured_docs").join(name),
            k: 2,
            chunk_size: 500,
            chunk_overlap: 100,
            collection_name: format!("{name}-rag-chroma"),
        };
        Self {
            primary_agent: PrimaryAgentConfig { llm: "dummy".into(), llm_temperature: 0.0 },
            tavily_search: TavilySearchConfig { max_results: 2 },
            policy_rag: rag("swiss_airline_policy"),
            stories_rag: rag("stories"),
            graph: GraphConfig { thread_id: thread_id.to_string() },
            project: ProjectConfig {
                memory_dir: root.join(raw::default_memory_dir()),
                log_level: raw::default_log_level(),
                llm_api_base_url: "http://localhost:0/v1/chat/completions".into(),
                llm_timeout_seconds: 1,
            },
            chroma: ChromaConfig { host: "localhost".into(), port: 8000 },
            credentials: Credentials {
                openai_api_key: "test-openai".into(),
                tavily_api_key: "test-tavily".into(),
            },
        }
    }
}
