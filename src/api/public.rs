//! Public API types

use axum::response::{IntoResponse, Response};

use crate::core::RelayError;

// Errors

pub struct ApiError(RelayError);

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Always log the error
        tracing::error!("{}", self.0);

        (
            self.0.status_code(),
            format!("Something went wrong: {}", self.0),
        )
            .into_response()
    }
}

/// Enables using `?` on anything that converts into a `RelayError`
impl<E> From<E> for ApiError
where
    E: Into<RelayError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// Re-export public types from each route

pub mod api_key {
    pub use crate::api::routes::api_key::public::*;
}

pub mod chat {
    pub use crate::api::routes::chat::public::*;
}

pub mod messages {
    pub use crate::api::routes::messages::public::*;
}
