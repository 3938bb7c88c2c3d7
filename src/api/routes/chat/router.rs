//! Router for the chat API

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
};
use futures_util::{StreamExt, future, stream};
use http::header;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::SharedState;
use crate::chat::UserTurn;
use crate::core::RelayError;
use crate::openai::CompletionStream;

/// Add a message to the conversation and stream the reply back as
/// plain text while it is generated
async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<public::ChatRequest>,
) -> Result<Response, ApiError> {
    let turn = payload.into_turn()?;

    // Wait for any turn in progress to be recorded first
    let turn_lock = state
        .read()
        .expect("Unable to read share state")
        .turn_lock
        .clone();
    let turn_guard = turn_lock.lock_owned().await;

    let (provider, history) = {
        let mut shared_state = state.write().expect("Unable to write share state");
        let provider = shared_state
            .provider
            .clone()
            .ok_or(RelayError::MissingCredential)?;
        let history = shared_state.conversation.record_user_turn(&turn);
        (provider, history)
    };

    tracing::debug!(
        "Relaying message {} with {} messages of context",
        turn.id,
        history.len()
    );

    // The user's message stays in the conversation even if this fails
    let completion = provider.completion_stream(&history).await?;

    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let (failure_tx, failure_rx) = oneshot::channel::<RelayError>();

    tokio::spawn(async move {
        let _turn_guard = turn_guard;
        let reply_id = turn.reply_id();

        // The relay runs in its own task so a panic still fails the
        // response instead of ending it like a finished reply
        let failure = match tokio::spawn(relay_turn(state, turn, completion, tx)).await {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e),
            Err(e) => Some(RelayError::Interrupted(e.to_string())),
        };

        if let Some(e) = failure {
            tracing::error!("Relaying {} failed: {}", reply_id, e);
            let _ = failure_tx.send(e);
        }

        // Otherwise `failure_tx` is dropped here, after the reply is
        // recorded, which lets the response body end cleanly
    });

    // Fragments are written as they arrive. A failure mid-stream ends
    // the body with an error which aborts the response instead of
    // completing it.
    let failure = stream::once(failure_rx)
        .filter_map(|result| future::ready(result.ok().map(Err::<String, RelayError>)));
    let body = UnboundedReceiverStream::new(rx)
        .map(Ok::<String, RelayError>)
        .chain(failure);

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(body),
    )
        .into_response())
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", post(chat_handler))
}

/// Streams the provider's reply into `tx` and records it once it is
/// complete
async fn relay_turn(
    state: SharedState,
    turn: UserTurn,
    completion: CompletionStream,
    tx: mpsc::UnboundedSender<String>,
) -> Result<(), RelayError> {
    let reply = completion.relay(tx).await?;

    state
        .write()
        .expect("Unable to write share state")
        .conversation
        .record_reply(&turn, reply);
    tracing::debug!("Recorded reply {}", turn.reply_id());

    Ok(())
}
