use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    Json,
};
use serde_json::Value;

use crate::{services::handle_notification, AppState};

/// Asaas payment notifications. Mounted for every verb so that non-POST
/// requests get a JSON 405 from the handler itself.
pub async fn asaas_webhook(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let response = handle_notification(state.store.as_ref(), &method, &body).await;
    (response.status, Json(response.body))
}
