//! Public types for the chat API
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::UserTurn;
use crate::core::RelayError;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub id: Option<String>,
    pub content: Option<String>,
    // Milliseconds since the unix epoch
    pub created_at: Option<i64>,
    pub created_by: Option<String>,
}

impl ChatRequest {
    /// Validates the request, filling in the optional fields
    pub fn into_turn(self) -> Result<UserTurn, RelayError> {
        let content = self
            .content
            .filter(|c| !c.is_empty())
            .ok_or(RelayError::MissingField("content"))?;

        Ok(UserTurn {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            created_at: self
                .created_at
                .unwrap_or_else(|| Utc::now().timestamp_millis()),
            created_by: self.created_by.unwrap_or_default(),
            content,
        })
    }
}
