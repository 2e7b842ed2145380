//! Session-scoped message list.

use crate::message::{Message, Role};

/// Counts shown by `/stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChatStats {
    pub total: usize,
    pub user: usize,
    pub assistant: usize,
}

/// Messages of the current console session, in conversation order.
///
/// Starts empty. Cleared only by an explicit `/clear`; clearing never
/// touches the persisted transcript.
#[derive(Debug, Default)]
pub struct Session {
    messages: Vec<Message>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Mutable access for the chat facade, which appends the reply.
    pub fn messages_mut(&mut self) -> &mut Vec<Message> {
        &mut self.messages
    }

    pub fn push_user(&mut self, content: &str) {
        self.messages.push(Message::user(content));
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn stats(&self) -> ChatStats {
        let user = self.messages.iter().filter(|m| m.role == Role::User).count();
        ChatStats {
            total: self.messages.len(),
            user,
            assistant: self.messages.len() - user,
        }
    }

    /// Assistant message by 1-based position among assistant messages, or
    /// the latest one when `index` is `None`.
    pub fn assistant_message(&self, index: Option<usize>) -> Option<&Message> {
        let mut replies = self.messages.iter().filter(|m| m.is_assistant());
        match index {
            None => replies.last(),
            Some(0) => None,
            Some(n) => replies.nth(n - 1),
        }
    }

    pub fn assistant_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_assistant()).count()
    }
}
