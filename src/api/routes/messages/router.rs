//! Router for the history API

use axum::{Json, Router, extract::State, routing::get};

use super::public;
use crate::api::state::SharedState;

/// Every display message in the order it was recorded
async fn messages_list(State(state): State<SharedState>) -> Json<public::MessagesResponse> {
    let data = state
        .read()
        .expect("Unable to read share state")
        .conversation
        .messages()
        .to_vec();

    Json(public::MessagesResponse { data, status: 200 })
}

/// Create the history router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", get(messages_list))
}
