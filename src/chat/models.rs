use serde::{Deserialize, Serialize};

use crate::openai::Role;

/// A conversation turn as shown to clients
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayMessage {
    pub id: String,
    // Milliseconds since the unix epoch
    pub created_at: i64,
    pub created_by: String,
    pub role: Role,
    pub content: Option<String>,
}

/// A validated message sent by a user
#[derive(Clone, Debug)]
pub struct UserTurn {
    pub id: String,
    pub created_at: i64,
    pub created_by: String,
    pub content: String,
}

impl UserTurn {
    /// The id of the assistant's reply to this turn
    pub fn reply_id(&self) -> String {
        format!("{}reply", self.id)
    }
}
