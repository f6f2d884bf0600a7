//! Processor webhook handling.
//!
//! Every outcome, including failures, is translated into a status code and
//! a JSON body here. The processor retries on 5xx.

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use super::metrics::record_webhook;
use super::store::OrderStore;
use crate::dtos::{NotificationEvent, PaymentNotification};
use crate::error::CheckoutError;

/// Payment statuses that mean the charge has settled.
const SETTLED_STATUSES: [&str; 2] = ["CONFIRMED", "RECEIVED"];

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl NotificationResponse {
    fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "message": message.into() }),
        }
    }

    fn error(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": error.into() }),
        }
    }
}

pub async fn handle_notification(
    store: &dyn OrderStore,
    method: &Method,
    body: &[u8],
) -> NotificationResponse {
    if method != Method::POST {
        record_webhook("none", "method_not_allowed");
        return NotificationResponse::error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    }

    if body.is_empty() {
        record_webhook("none", "empty_body");
        return NotificationResponse::error(StatusCode::BAD_REQUEST, "Empty request body");
    }

    let notification: PaymentNotification = match serde_json::from_slice(body) {
        Ok(notification) => notification,
        Err(e) => {
            let err = CheckoutError::MalformedNotification(e.to_string());
            tracing::error!(error = %err, "Failed to parse webhook body");
            record_webhook("none", "malformed");
            return internal_error(&err);
        }
    };

    let event = NotificationEvent::parse(notification.event.as_deref());
    tracing::info!(
        event = ?notification.event,
        payment_id = ?notification.payment.as_ref().map(|p| p.id.as_str()),
        "Webhook received"
    );

    match event {
        NotificationEvent::Other(ref raw) => {
            tracing::warn!(event = %raw, "Unrecognized webhook event");
            record_webhook(event.label(), "unrecognized");
            NotificationResponse::error(StatusCode::BAD_REQUEST, "Unrecognized event")
        }
        _ if notification.payment.is_none() => {
            let err = CheckoutError::MalformedNotification("missing payment object".to_string());
            tracing::error!(event = event.label(), error = %err, "Webhook event without payment");
            record_webhook(event.label(), "malformed");
            internal_error(&err)
        }
        NotificationEvent::PaymentCreated => {
            record_webhook(event.label(), "acknowledged");
            NotificationResponse::message(StatusCode::OK, "Payment created, awaiting settlement")
        }
        NotificationEvent::PaymentConfirmed | NotificationEvent::PaymentReceived => {
            settle(store, &event, &notification).await
        }
    }
}

fn internal_error(err: &CheckoutError) -> NotificationResponse {
    NotificationResponse {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: json!({ "error": "Internal server error", "details": err.to_string() }),
    }
}

async fn settle(
    store: &dyn OrderStore,
    event: &NotificationEvent,
    notification: &PaymentNotification,
) -> NotificationResponse {
    let Some(payment) = &notification.payment else {
        let err = CheckoutError::MalformedNotification("missing payment object".to_string());
        return internal_error(&err);
    };

    let status = payment.status.as_deref().unwrap_or_default();
    if !SETTLED_STATUSES.contains(&status) {
        tracing::info!(
            event = event.label(),
            payment_id = %payment.id,
            status = %status,
            "Payment not settled yet, ignoring"
        );
        record_webhook(event.label(), "ignored");
        return NotificationResponse::message(StatusCode::OK, "Payment status not settled");
    }

    match store.mark_paid_by_payment_id(&payment.id).await {
        Ok(matched) => {
            tracing::info!(
                event = event.label(),
                payment_id = %payment.id,
                matched,
                "Order marked as paid"
            );
            record_webhook(event.label(), "processed");
            NotificationResponse::message(StatusCode::OK, "Payment processed")
        }
        Err(e) => {
            tracing::error!(
                payment_id = %payment.id,
                error = %e,
                "Failed to update order status"
            );
            record_webhook(event.label(), "store_error");
            NotificationResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: json!({ "error": "Failed to update order", "details": e.to_string() }),
            }
        }
    }
}
