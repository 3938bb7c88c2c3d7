use chrono::Utc;

use super::models::{DisplayMessage, UserTurn};
use crate::openai::{Message, Role};

/// Two parallel, append-only logs of the same conversation: one in
/// the shape the provider expects and one for display.
#[derive(Default)]
pub struct Conversation {
    history: Vec<Message>,
    messages: Vec<DisplayMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the user's message to both logs and returns the full
    /// history to send as context.
    pub fn record_user_turn(&mut self, turn: &UserTurn) -> Vec<Message> {
        self.history.push(Message::new(Role::User, &turn.content));
        self.messages.push(DisplayMessage {
            id: turn.id.clone(),
            created_at: turn.created_at,
            created_by: turn.created_by.clone(),
            role: Role::User,
            content: Some(turn.content.clone()),
        });
        self.history.clone()
    }

    /// Appends the provider's reply to `turn` to both logs
    pub fn record_reply(&mut self, turn: &UserTurn, reply: Message) {
        self.messages.push(DisplayMessage {
            id: turn.reply_id(),
            created_at: Utc::now().timestamp_millis(),
            created_by: turn.created_by.clone(),
            role: reply.role.clone(),
            content: reply.content.clone(),
        });
        self.history.push(reply);
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn messages(&self) -> &[DisplayMessage] {
        &self.messages
    }
}
