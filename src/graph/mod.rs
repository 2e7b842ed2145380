//! Agent graph facade.
//!
//! [`build_graph`] returns an [`AgentGraph`] handle. The only operation the
//! rest of the crate uses is [`AgentGraph::stream`]: feed it the new input
//! messages plus a [`RunConfig`] carrying the thread id, and it yields the
//! thread state after each step ("values" mode). The first event is the
//! state with the input merged in, the last is the final state.
//!
//! Backends:
//! - **agent** — one primary-agent node over an [`LlmProvider`], with
//!   per-thread history kept by an in-process checkpointer.
//! - **scripted** — replays a fixed event sequence; built directly by
//!   tests. [`build_graph`] never selects it; offline runs use the agent
//!   backend over the dummy provider.

mod agent;
mod checkpoint;
mod scripted;

pub use agent::PrimaryAgentGraph;
pub use checkpoint::MemoryCheckpointer;
pub use scripted::ScriptedGraph;

use futures::stream::BoxStream;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Settings;
use crate::llm::{providers, LlmProvider, ProviderError};
use crate::message::Message;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("model call failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("graph produced no events")]
    EmptyStream,

    #[error("final graph event carried no messages")]
    NoMessages,

    #[error("{0}")]
    Scripted(String),
}

// ── Wire types ────────────────────────────────────────────────────────────────

/// New messages for this run. Only the latest user turn is sent; earlier
/// turns live in the graph's own per-thread state.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphInput {
    pub messages: Vec<Message>,
}

impl GraphInput {
    pub fn user(content: impl Into<String>) -> Self {
        Self { messages: vec![Message::user(content)] }
    }
}

/// Per-run correlation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub thread_id: String,
}

/// One snapshot of the thread state.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEvent {
    pub messages: Vec<Message>,
}

impl GraphEvent {
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

pub type EventStream<'a> = BoxStream<'a, Result<GraphEvent, GraphError>>;

// ── Handle ────────────────────────────────────────────────────────────────────

/// Stateful graph handle. Build once at startup and share behind an `Arc`.
pub enum AgentGraph {
    Agent(PrimaryAgentGraph),
    Scripted(ScriptedGraph),
}

impl AgentGraph {
    pub fn stream<'a>(&'a self, input: GraphInput, config: &RunConfig) -> EventStream<'a> {
        match self {
            AgentGraph::Agent(g) => g.stream(input, config),
            AgentGraph::Scripted(g) => g.stream(input, config),
        }
    }
}

/// Assemble the graph described by `settings`.
pub fn build_graph(settings: &Settings) -> Result<AgentGraph, GraphError> {
    let provider: LlmProvider = providers::build(settings)?;

    info!(
        provider = provider.name(),
        model = %settings.primary_agent.llm,
        temperature = settings.primary_agent.llm_temperature,
        "primary agent ready"
    );
    for (name, rag) in [("policy", &settings.policy_rag), ("stories", &settings.stories_rag)] {
        debug!(
            rag = name,
            collection = %rag.collection_name,
            embedding_model = %rag.embedding_model,
            vectordb = %rag.vectordb_dir.display(),
            k = rag.k,
            "retrieval backend configured"
        );
    }
    debug!(
        chroma = %format!("{}:{}", settings.chroma.host, settings.chroma.port),
        search_max_results = settings.tavily_search.max_results,
        "external tool endpoints"
    );

    Ok(AgentGraph::Agent(PrimaryAgentGraph::new(provider)))
}
