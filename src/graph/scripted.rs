//! Scripted graph — replays a fixed sequence of steps on every run and
//! records what it was called with.

use std::sync::Mutex;

use futures::stream::{self, StreamExt};

use crate::message::Message;

use super::{EventStream, GraphError, GraphEvent, GraphInput, RunConfig};

pub struct ScriptedGraph {
    /// `Err` entries are yielded as [`GraphError::Scripted`].
    steps: Vec<Result<GraphEvent, String>>,
    calls: Mutex<Vec<(GraphInput, RunConfig)>>,
}

impl ScriptedGraph {
    pub fn new(steps: Vec<Result<GraphEvent, String>>) -> Self {
        Self { steps, calls: Mutex::new(Vec::new()) }
    }

    /// One event whose only message is an assistant reply.
    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(GraphEvent { messages: vec![Message::assistant(text)] })])
    }

    /// Inputs and configs received so far, oldest first.
    pub fn calls(&self) -> Vec<(GraphInput, RunConfig)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn stream<'a>(&'a self, input: GraphInput, config: &RunConfig) -> EventStream<'a> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((input, config.clone()));
        }
        let steps: Vec<Result<GraphEvent, GraphError>> = self
            .steps
            .iter()
            .map(|s| s.clone().map_err(GraphError::Scripted))
            .collect();
        stream::iter(steps).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_steps_and_records_calls() {
        let graph = ScriptedGraph::new(vec![
            Ok(GraphEvent { messages: vec![Message::user("q")] }),
            Err("backend down".into()),
        ]);
        let config = RunConfig { thread_id: "7".into() };
        let events: Vec<_> = graph.stream(GraphInput::user("q"), &config).collect().await;

        assert_eq!(events.len(), 2);
        assert!(matches!(&events[1], Err(GraphError::Scripted(m)) if m == "backend down"));
        assert_eq!(graph.calls(), vec![(GraphInput::user("q"), config)]);
    }
}
