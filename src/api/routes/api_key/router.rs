//! Router for the credential API

use axum::{Json, Router, extract::State, routing::post};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::SharedState;
use crate::core::RelayError;
use crate::openai::Provider;

/// Replace the provider session with one using the given key. Chats
/// already in flight finish with the session they started with.
async fn set_api_key(
    State(state): State<SharedState>,
    Json(payload): Json<public::ApiKeyRequest>,
) -> Result<Json<public::StatusResponse>, ApiError> {
    let api_key = payload
        .api_key
        .filter(|k| !k.is_empty())
        .ok_or(RelayError::MissingField("apiKey"))?;

    let config = state.read().expect("Unable to read share state").config.clone();
    let provider = Provider::new(&api_key, &config)?;
    tracing::info!("Provider credential replaced (model {})", provider.model());

    state.write().expect("Unable to write share state").provider = Some(provider);

    Ok(Json(public::StatusResponse::ok()))
}

/// Create the credential router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", post(set_api_key))
}
