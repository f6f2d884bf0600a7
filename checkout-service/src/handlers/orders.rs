//! Order creation, checkout and payment write-back endpoints.
//!
//! The processor routing flag is read from the store once per request and
//! handed to the reconciler.

use axum::{
    extract::{Path, State},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use service_core::error::AppError;
use validator::Validate;

use crate::{
    dtos::{AttachPaymentRequest, CheckoutResponse, CreateOrderRequest, OrderResponse},
    models::PaymentAttachment,
    services::{load_asaas_config, ResponseSession},
    AppState,
};

const LAST_ORDER_COOKIE: &str = "lastOrderId";

/// Create an order. Returns 200 with the stored order when the submission
/// is a duplicate, 201 otherwise.
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    let asaas_config = load_asaas_config(state.store.as_ref()).await;
    let placed = state.reconciler.place_order(&payload, &asaas_config).await?;

    let status = if placed.duplicate {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    Ok((status, Json(OrderResponse::from(placed.order))))
}

/// Create the order, start the processor payment and point the client at
/// the PIX payment page.
pub async fn checkout(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, HeaderMap, Json<CheckoutResponse>), AppError> {
    let asaas_config = load_asaas_config(state.store.as_ref()).await;
    let session = ResponseSession::new();

    let order = state
        .reconciler
        .create_order_and_initiate_payment(&payload, &asaas_config, &session)
        .await?;

    let last_order_id = session.last_order_id();
    let mut headers = HeaderMap::new();
    if let Some(id) = &last_order_id {
        let cookie = format!("{}={}; Path=/; SameSite=Lax", LAST_ORDER_COOKIE, id);
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            headers.insert(SET_COOKIE, value);
        }
    }

    tracing::info!(
        order_id = %order.id,
        payment_id = ?order.payment_id,
        "Checkout completed"
    );

    Ok((
        StatusCode::CREATED,
        headers,
        Json(CheckoutResponse {
            order: OrderResponse::from(order),
            last_order_id,
            redirect_to: session.redirect_to(),
        }),
    ))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderResponse>, AppError> {
    tracing::info!(order_id = %order_id, "Fetching order");

    let (order, _) = state.reconciler.find_order(&order_id).await?;
    Ok(Json(OrderResponse::from(order)))
}

/// Attach the processor payment id and PIX data to an order.
pub async fn attach_payment(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(payload): Json<AttachPaymentRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    payload.validate()?;

    let attachment = PaymentAttachment {
        payment_id: payload.payment_id,
        qr_code: payload.qr_code.filter(|q| !q.is_empty()),
        qr_code_image: payload.qr_code_image.filter(|i| !i.is_empty()),
    };

    let order = state
        .reconciler
        .attach_payment(&order_id, &attachment)
        .await?;

    Ok(Json(OrderResponse::from(order)))
}
