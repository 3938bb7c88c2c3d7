//! API routes module

pub mod api_key;
pub mod chat;
pub mod messages;

use axum::Router;

use crate::api::state::SharedState;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Provider credential
        .nest("/apiKey", api_key::router())
        // Relay a message and stream the reply
        .nest("/chat", chat::router())
        // Conversation history
        .nest("/messages", messages::router())
}
