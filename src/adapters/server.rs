use crate::core::handler::AdviceHandler;
use crate::domain::ports::CompletionGateway;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;

pub const ADVICE_ROUTE: &str = "/functions/v1/growth-assistant";

/// Local stand-in for the serverless deployment.
pub fn router<G: CompletionGateway + 'static>(handler: Arc<AdviceHandler<G>>) -> Router {
    Router::new()
        .route(ADVICE_ROUTE, any(advice::<G>))
        .route("/health", get(health))
        .with_state(handler)
}

async fn advice<G: CompletionGateway + 'static>(
    State(handler): State<Arc<AdviceHandler<G>>>,
    method: Method,
    body: Bytes,
) -> Response {
    handler.handle(&method, &body).await.into_response()
}

async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({"status": "ready"})))
}

pub async fn serve<G: CompletionGateway + 'static>(
    bind_address: &str,
    port: u16,
    handler: Arc<AdviceHandler<G>>,
) -> std::io::Result<()> {
    let address = format!("{bind_address}:{port}");
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!("Advice endpoint listening on http://{}{}", address, ADVICE_ROUTE);
    axum::serve(listener, router(handler)).await
}
