//! Chat facade — one request/response cycle against the agent graph.
//!
//! [`ChatBot::respond`] streams the graph for the new user message, keeps
//! the content of the last event's last message, appends it to the caller's
//! message list, and appends the turn to the thread's stored transcript.
//! The stored transcript only grows; clearing the caller's list does not
//! shrink it.

use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, info};

use crate::error::AppError;
use crate::graph::{AgentGraph, GraphError, GraphInput, RunConfig};
use crate::memory::TranscriptStore;
use crate::message::Message;

pub struct ChatBot {
    graph: Arc<AgentGraph>,
    store: TranscriptStore,
    run_config: RunConfig,
}

impl ChatBot {
    pub fn new(graph: Arc<AgentGraph>, store: TranscriptStore, thread_id: impl Into<String>) -> Self {
        Self {
            graph,
            store,
            run_config: RunConfig { thread_id: thread_id.into() },
        }
    }

    pub fn thread_id(&self) -> &str {
        &self.run_config.thread_id
    }

    pub fn store(&self) -> &TranscriptStore {
        &self.store
    }

    /// Run one turn. `transcript` should already end with the user message.
    ///
    /// Graph errors propagate as [`AppError::Graph`]; an empty stream is an
    /// error too, never an empty answer. On success the assistant reply is
    /// appended to `transcript`, and the user message plus the reply are
    /// appended to the stored transcript before the reply is returned.
    pub async fn respond(
        &self,
        transcript: &mut Vec<Message>,
        message: &str,
    ) -> Result<String, AppError> {
        let mut events = self.graph.stream(GraphInput::user(message), &self.run_config);

        let mut last_event = None;
        while let Some(event) = events.next().await {
            let event = event?;
            if let Some(m) = event.last_message() {
                debug!(role = %m.role, content = %m.content, "graph event");
            }
            last_event = Some(event);
        }
        drop(events);

        let reply = last_event
            .ok_or(GraphError::EmptyStream)?
            .last_message()
            .map(|m| m.content.clone())
            .ok_or(GraphError::NoMessages)?;

        let turn = vec![Message::user(message), Message::assistant(reply.clone())];
        let store = self.store.clone();
        let thread_id = self.run_config.thread_id.clone();
        let path = tokio::task::spawn_blocking(move || store.append(&thread_id, &turn))
            .await
            .map_err(|e| AppError::Memory(format!("transcript writer task failed: {e}")))??;

        transcript.push(Message::assistant(reply.clone()));

        info!(
            thread_id = %self.run_config.thread_id,
            session_messages = transcript.len(),
            path = %path.display(),
            "turn complete"
        );
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphEvent, ScriptedGraph};
    use tempfile::TempDir;

    fn bot(dir: &TempDir, graph: ScriptedGraph) -> (ChatBot, Arc<AgentGraph>) {
        let graph = Arc::new(AgentGraph::Scripted(graph));
        let store = TranscriptStore::new(dir.path().join("memory"));
        (ChatBot::new(graph.clone(), store, "1"), graph)
    }

    #[tokio::test]
    async fn hello_scenario() {
        let dir = TempDir::new().unwrap();
        let (bot, _) = bot(&dir, ScriptedGraph::replying("Hi there"));
        let mut transcript = vec![Message::user("Hello")];

        let reply = bot.respond(&mut transcript, "Hello").await.unwrap();

        assert_eq!(reply, "Hi there");
        let persisted = bot.store().read("1").unwrap();
        assert_eq!(persisted.last().unwrap(), &Message::assistant("Hi there"));
        assert_eq!(persisted, transcript);
    }

    #[tokio::test]
    async fn last_event_wins() {
        let dir = TempDir::new().unwrap();
        let graph = ScriptedGraph::new(vec![
            Ok(GraphEvent { messages: vec![Message::user("q")] }),
            Ok(GraphEvent { messages: vec![Message::user("q"), Message::assistant("draft")] }),
            Ok(GraphEvent { messages: vec![Message::user("q"), Message::assistant("final")] }),
        ]);
        let (bot, _) = bot(&dir, graph);
        let mut transcript = vec![Message::user("q")];
        assert_eq!(bot.respond(&mut transcript, "q").await.unwrap(), "final");
        assert_eq!(transcript.len(), 2);
    }

    #[tokio::test]
    async fn passes_message_and_thread_id() {
        let dir = TempDir::new().unwrap();
        let (bot, graph) = bot(&dir, ScriptedGraph::replying("ok"));
        bot.respond(&mut vec![Message::user("Hello")], "Hello").await.unwrap();

        let AgentGraph::Scripted(g) = graph.as_ref() else { unreachable!() };
        let calls = g.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, GraphInput::user("Hello"));
        assert_eq!(calls[0].1.thread_id, "1");
    }

    #[tokio::test]
    async fn graph_error_propagates_and_nothing_is_written() {
        let dir = TempDir::new().unwrap();
        let graph = ScriptedGraph::new(vec![
            Ok(GraphEvent { messages: vec![Message::user("q")] }),
            Err("rate limited".into()),
        ]);
        let (bot, _) = bot(&dir, graph);
        let mut transcript = vec![Message::user("q")];

        let err = bot.respond(&mut transcript, "q").await.unwrap_err();
        assert!(matches!(err, AppError::Graph(GraphError::Scripted(ref m)) if m == "rate limited"));
        assert_eq!(transcript, vec![Message::user("q")]);
        assert!(!bot.store().path_for("1").exists());
    }

    #[tokio::test]
    async fn empty_stream_is_an_error() {
        let dir = TempDir::new().unwrap();
        let (bot, _) = bot(&dir, ScriptedGraph::new(vec![]));
        let err = bot.respond(&mut vec![], "q").await.unwrap_err();
        assert!(matches!(err, AppError::Graph(GraphError::EmptyStream)));
    }

    #[tokio::test]
    async fn event_without_messages_is_an_error() {
        let dir = TempDir::new().unwrap();
        let (bot, _) = bot(&dir, ScriptedGraph::new(vec![Ok(GraphEvent { messages: vec![] })]));
        let err = bot.respond(&mut vec![], "q").await.unwrap_err();
        assert!(matches!(err, AppError::Graph(GraphError::NoMessages)));
    }

    #[tokio::test]
    async fn stored_transcript_survives_a_cleared_list() {
        let dir = TempDir::new().unwrap();
        let (bot, _) = bot(&dir, ScriptedGraph::replying("ok"));

        let mut transcript = vec![Message::user("one")];
        bot.respond(&mut transcript, "one").await.unwrap();
        transcript.clear();
        transcript.push(Message::user("two"));
        bot.respond(&mut transcript, "two").await.unwrap();

        assert_eq!(transcript, vec![Message::user("two"), Message::assistant("ok")]);
        assert_eq!(
            bot.store().read("1").unwrap(),
            vec![
                Message::user("one"),
                Message::assistant("ok"),
                Message::user("two"),
                Message::assistant("ok"),
            ]
        );
    }

    #[tokio::test]
    async fn persistence_failure_is_memory_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let graph = Arc::new(AgentGraph::Scripted(ScriptedGraph::replying("hi")));
        let bot = ChatBot::new(graph, TranscriptStore::new(blocker.join("memory")), "1");

        let err = bot.respond(&mut vec![Message::user("q")], "q").await.unwrap_err();
        assert!(matches!(err, AppError::Memory(_)));
    }
}
