//! Public types for the history API
use serde::{Deserialize, Serialize};

use crate::chat::DisplayMessage;

#[derive(Serialize, Deserialize, Debug)]
pub struct MessagesResponse {
    pub data: Vec<DisplayMessage>,
    pub status: u16,
}
