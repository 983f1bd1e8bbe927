//! HTTP surface of the coordinator.
//!
//! Everything lives under `/api/v1`: a health check, JSON status endpoints,
//! a transaction submission hook, and the peer channel upgrade.

use crate::acceptor::{channel_upgrade, ChannelAcceptor};
use crate::error::Result;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub const APP_NAME: &str = "karai";

type JsonResponse = (StatusCode, Json<Value>);

pub fn router(acceptor: ChannelAcceptor) -> Router {
    Router::new()
        .route("/api/v1", get(home))
        .route("/api/v1/", get(home))
        .route("/api/v1/peer", get(peer_id))
        .route("/api/v1/version", get(version))
        .route("/api/v1/transactions", get(transactions))
        .route("/api/v1/transaction/send", post(send_transaction))
        .route("/api/v1/channel", get(channel_upgrade))
        .fallback(not_found)
        .with_state(acceptor)
        .layer(CorsLayer::permissive())
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, acceptor: ChannelAcceptor, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(acceptor).into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Health check. The body is plain text under a JSON content type, as
/// existing peers expect.
async fn home() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        format!("Hello {APP_NAME}"),
    )
}

async fn peer_id(State(acceptor): State<ChannelAcceptor>) -> JsonResponse {
    match acceptor.dispatcher().status().peer_id().await {
        Ok(id) => (StatusCode::OK, Json(json!({ "p2p_peer_ID": id }))),
        Err(e) => internal_error(e),
    }
}

async fn version(State(acceptor): State<ChannelAcceptor>) -> JsonResponse {
    let version = acceptor.dispatcher().status().version();
    (StatusCode::OK, Json(json!({ "karai_version": version })))
}

async fn transactions(State(acceptor): State<ChannelAcceptor>) -> Response {
    match acceptor.dispatcher().status().transactions().await {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(e) => internal_error(e).into_response(),
    }
}

/// Submission hook for the transaction pipeline. Accepted and dropped.
async fn send_transaction(body: Bytes) -> StatusCode {
    tracing::debug!(len = body.len(), "transaction submitted");
    StatusCode::ACCEPTED
}

async fn not_found() -> JsonResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}

fn internal_error(e: corelib::Error) -> JsonResponse {
    tracing::warn!(error = %e, "status endpoint failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
    )
}
