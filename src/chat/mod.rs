//! In-memory record of the conversation relayed to the provider.
mod log;
pub mod models;

pub use log::Conversation;
pub use models::{DisplayMessage, UserTurn};
