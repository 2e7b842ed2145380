//! In-process per-thread conversation state.

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::message::Message;

/// Thread id → full message history. Lives as long as the graph handle.
#[derive(Debug, Default)]
pub struct MemoryCheckpointer {
    threads: Mutex<HashMap<String, Vec<Message>>>,
}

impl MemoryCheckpointer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `messages` to the thread and return a snapshot of the result.
    pub async fn extend(&self, thread_id: &str, messages: Vec<Message>) -> Vec<Message> {
        let mut guard = self.threads.lock().await;
        let state = guard.entry(thread_id.to_string()).or_default();
        state.extend(messages);
        state.clone()
    }

    /// The last `n` messages of the thread, oldest first.
    pub async fn last(&self, thread_id: &str, n: usize) -> Vec<Message> {
        let guard = self.threads.lock().await;
        guard
            .get(thread_id)
            .map(|state| state[state.len().saturating_sub(n)..].to_vec())
            .unwrap_or_default()
    }
}
