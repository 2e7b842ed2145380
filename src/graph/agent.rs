//! Primary agent graph: input → model → end.
//!
//! Emits two state snapshots per run, one after the input is merged into
//! the thread and one after the model replies. A failed model call ends the
//! stream with the error; the user turn stays in the thread state.

use futures::stream::{self, StreamExt};
use tracing::debug;

use crate::llm::LlmProvider;
use crate::message::Message;

use super::{EventStream, GraphError, GraphEvent, GraphInput, MemoryCheckpointer, RunConfig};

/// How many recent thread messages are sent to the model.
const CONTEXT_WINDOW: usize = 20;

const SYSTEM_PROMPT: &str = "You are a helpful customer support assistant for Swiss Airlines. \
Answer the user's questions about flights, bookings and airline policies clearly and concisely. \
If you do not know something, say so instead of guessing.";

enum Step {
    Merge(Vec<Message>),
    CallModel,
    Done,
}

pub struct PrimaryAgentGraph {
    provider: LlmProvider,
    checkpointer: MemoryCheckpointer,
}

impl PrimaryAgentGraph {
    pub fn new(provider: LlmProvider) -> Self {
        Self { provider, checkpointer: MemoryCheckpointer::new() }
    }

    pub fn stream<'a>(&'a self, input: GraphInput, config: &RunConfig) -> EventStream<'a> {
        let thread_id = config.thread_id.clone();
        stream::unfold(Step::Merge(input.messages), move |step| {
            let thread_id = thread_id.clone();
            async move {
                match step {
                    Step::Merge(messages) => {
                        let state = self.checkpointer.extend(&thread_id, messages).await;
                        debug!(%thread_id, messages = state.len(), "graph: input merged");
                        Some((Ok(GraphEvent { messages: state }), Step::CallModel))
                    }
                    Step::CallModel => {
                        let history = self.checkpointer.last(&thread_id, CONTEXT_WINDOW).await;
                        match self.provider.complete(&history, Some(SYSTEM_PROMPT)).await {
                            Ok(reply) => {
                                if let Some(usage) = reply.usage {
                                    debug!(
                                        input_tokens = usage.input_tokens,
                                        output_tokens = usage.output_tokens,
                                        "graph: model usage"
                                    );
                                }
                                let state = self
                                    .checkpointer
                                    .extend(&thread_id, vec![Message::assistant(reply.text)])
                                    .await;
                                Some((Ok(GraphEvent { messages: state }), Step::Done))
                            }
                            Err(e) => Some((Err(GraphError::from(e)), Step::Done)),
                        }
                    }
                    Step::Done => None,
                }
            }
        })
        .boxed()
    }
}
