pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

use axum::middleware::from_fn;
use axum::{
    routing::{any, get, patch, post},
    Router,
};
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use services::{OrderReconciler, OrderStore};

pub use startup::Application;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn OrderStore>,
    pub reconciler: OrderReconciler,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .route("/orders", post(handlers::orders::create_order))
        .route("/orders/checkout", post(handlers::orders::checkout))
        .route("/orders/:id", get(handlers::orders::get_order))
        .route("/orders/:id/payment", patch(handlers::orders::attach_payment))
        .route("/webhooks/asaas", any(handlers::webhook::asaas_webhook))
        .route_layer(from_fn(metrics_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .with_state(state)
}
