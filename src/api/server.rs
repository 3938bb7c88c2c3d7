use std::sync::{Arc, RwLock};

use anyhow::Result;
use axum::middleware;
use axum::{
    Router,
    extract::Request,
    response::{IntoResponse, Response},
};
use http::{HeaderValue, Method, StatusCode, header};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use super::routes;
use crate::api::state::{AppState, SharedState};
use crate::core::AppConfig;
use crate::openai::Provider;

// Browsers and the mobile client call the relay from any origin so
// every response, errors included, allows it. Preflight requests are
// answered here without reaching a route.
async fn set_cors_headers(request: Request, next: middleware::Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("DELETE,PUT,POST,GET,OPTIONS"),
    );
    response
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}

pub fn app(shared_state: SharedState) -> Router {
    Router::new()
        .merge(routes::router())
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(set_cors_headers)),
        )
        .with_state(Arc::clone(&shared_state))
}

// Run the server
pub async fn serve(host: String, port: String, config: AppConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // axum logs rejections from built-in extractors with the `axum::rejection`
                // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
                format! {
                    "{}=debug,tower_http=debug,axum::rejection=trace",
                    env!("CARGO_CRATE_NAME")
                }
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut app_state = AppState::new(config.clone());
    if let Some(api_key) = &config.openai_api_key {
        app_state.provider = Some(Provider::new(api_key, &config)?);
        tracing::info!("Using provider credential from OPENAI_API_KEY");
    }
    match &config.proxy_url {
        Some(proxy_url) => tracing::info!("Provider requests are tunneled through {}", proxy_url),
        None => tracing::info!("Provider requests connect directly"),
    }

    let shared_state = Arc::new(RwLock::new(app_state));
    let app = app(Arc::clone(&shared_state));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;

    tracing::info!("Server is running on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
