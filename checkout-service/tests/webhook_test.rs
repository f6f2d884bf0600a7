mod common;

use checkout_service::models::PaymentStatus;
use common::{order_submission, TestApp};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates an order through the API and attaches `payment_id` to it.
async fn order_with_payment(app: &TestApp, payment_id: &str) -> String {
    let created: Value = app.post_order(&order_submission()).await.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    app.client
        .patch(format!("{}/orders/{}/payment", app.address, id))
        .json(&json!({ "paymentId": payment_id }))
        .send()
        .await
        .expect("Failed to execute request");
    id
}

#[tokio::test]
async fn get_is_method_not_allowed() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/webhooks/asaas", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 405);
}

#[tokio::test]
async fn empty_body_is_bad_request() {
    let app = TestApp::spawn().await;

    let response = app.post_webhook("").await;

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn malformed_body_is_internal_error() {
    let app = TestApp::spawn().await;

    let response = app.post_webhook("{\"event\":").await;

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn payment_created_is_acknowledged() {
    let app = TestApp::spawn().await;
    order_with_payment(&app, "x").await;

    let response = app
        .post_webhook(r#"{"event":"PAYMENT_CREATED","payment":{"id":"x","status":"PENDING"}}"#)
        .await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(app.orders()[0].payment_status, PaymentStatus::Pending);
}

#[tokio::test]
async fn payment_received_marks_order_paid() {
    let app = TestApp::spawn().await;
    order_with_payment(&app, "x").await;

    let response = app
        .post_webhook(r#"{"event":"PAYMENT_RECEIVED","payment":{"id":"x","status":"RECEIVED"}}"#)
        .await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(app.orders()[0].payment_status, PaymentStatus::Paid);
}

#[tokio::test]
async fn routed_checkout_is_settled_by_webhook() {
    let processor = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "pay_x",
            "pix": { "payload": "00020126pix", "qrCodeImage": "iVBORw0KGgo" }
        })))
        .mount(&processor)
        .await;
    let app = TestApp::spawn_routed_to_asaas(&format!("{}/payments", processor.uri())).await;

    let checkout = app.post_checkout(&order_submission()).await;
    assert_eq!(checkout.status().as_u16(), 201);

    let response = app
        .post_webhook(r#"{"event":"PAYMENT_RECEIVED","payment":{"id":"pay_x","status":"RECEIVED"}}"#)
        .await;

    assert_eq!(response.status().as_u16(), 200);
    assert!(app.orders().is_empty());
    assert_eq!(app.asaas_payments()[0].payment_status, PaymentStatus::Paid);
}

#[tokio::test]
async fn payment_created_without_payment_is_internal_error() {
    let app = TestApp::spawn().await;

    let response = app.post_webhook(r#"{"event":"PAYMENT_CREATED"}"#).await;

    assert_eq!(response.status().as_u16(), 500);
}

#[tokio::test]
async fn confirmed_event_with_pending_status_is_ignored() {
    let app = TestApp::spawn().await;
    order_with_payment(&app, "x").await;

    let response = app
        .post_webhook(r#"{"event":"PAYMENT_CONFIRMED","payment":{"id":"x","status":"PENDING"}}"#)
        .await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(app.orders()[0].payment_status, PaymentStatus::Pending);
}

#[tokio::test]
async fn settlement_for_unknown_payment_is_acknowledged() {
    let app = TestApp::spawn().await;

    let response = app
        .post_webhook(r#"{"event":"PAYMENT_CONFIRMED","payment":{"id":"nobody","status":"CONFIRMED"}}"#)
        .await;

    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn unknown_event_is_bad_request() {
    let app = TestApp::spawn().await;

    let response = app.post_webhook(r#"{"event":"UNKNOWN"}"#).await;

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn store_failure_is_internal_error() {
    let app = TestApp::spawn().await;
    order_with_payment(&app, "x").await;
    app.store.fail_updates(true);

    let response = app
        .post_webhook(r#"{"event":"PAYMENT_RECEIVED","payment":{"id":"x","status":"RECEIVED"}}"#)
        .await;

    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(app.orders()[0].payment_status, PaymentStatus::Pending);
}
