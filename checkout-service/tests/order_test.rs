mod common;

use checkout_service::models::PaymentStatus;
use common::{order_submission, TestApp};
use serde_json::{json, Value};

#[tokio::test]
async fn create_order_returns_201_with_normalized_order() {
    let app = TestApp::spawn().await;
    let mut body = order_submission();
    body["paymentStatus"] = json!("Pago");

    let response = app.post_order(&body).await;

    assert_eq!(response.status().as_u16(), 201);
    let order: Value = response.json().await.unwrap();
    assert_eq!(order["payment_status"], "PAID");
    assert_eq!(order["device_type"], "desktop");
    assert_eq!(order["is_digital_product"], true);
    assert_eq!(app.orders().len(), 1);
}

#[tokio::test]
async fn repeated_submission_returns_existing_order() {
    let app = TestApp::spawn().await;

    let first: Value = app.post_order(&order_submission()).await.json().await.unwrap();
    let response = app.post_order(&order_submission()).await;

    assert_eq!(response.status().as_u16(), 200);
    let second: Value = response.json().await.unwrap();
    assert_eq!(first["id"], second["id"]);
    assert_eq!(app.orders().len(), 1);
}

#[tokio::test]
async fn product_id_may_be_a_numeric_string() {
    let app = TestApp::spawn().await;
    let mut body = order_submission();
    body["productId"] = json!("42");

    let response = app.post_order(&body).await;

    assert_eq!(response.status().as_u16(), 201);
    assert_eq!(app.orders()[0].product_id, Some(42));
}

#[tokio::test]
async fn non_numeric_product_id_is_rejected() {
    let app = TestApp::spawn().await;
    let mut body = order_submission();
    body["productId"] = json!("forty-two");

    let response = app.post_order(&body).await;

    assert_eq!(response.status().as_u16(), 422);
    assert!(app.orders().is_empty());
}

#[tokio::test]
async fn blank_customer_name_is_unprocessable() {
    let app = TestApp::spawn().await;
    let mut body = order_submission();
    body["customer"]["name"] = json!("  ");

    let response = app.post_order(&body).await;

    assert_eq!(response.status().as_u16(), 422);
    assert!(app.orders().is_empty());
}

#[tokio::test]
async fn routing_flag_sends_orders_to_asaas_payments() {
    let app = TestApp::spawn_routed_to_asaas("http://127.0.0.1:9/payments").await;

    let response = app.post_order(&order_submission()).await;

    assert_eq!(response.status().as_u16(), 201);
    assert!(app.orders().is_empty());
    assert_eq!(app.asaas_payments().len(), 1);
}

#[tokio::test]
async fn payment_id_resubmitted_after_routing_change_is_not_duplicated() {
    let app = TestApp::spawn().await;
    let mut body = order_submission();
    body["paymentId"] = json!("pay_123");

    let first: Value = app.post_order(&body).await.json().await.unwrap();
    app.store.set_asaas_config(checkout_service::models::AsaasConfig {
        usar_pix_assas: true,
    });
    let response = app.post_order(&body).await;

    assert_eq!(response.status().as_u16(), 200);
    let second: Value = response.json().await.unwrap();
    assert_eq!(first["id"], second["id"]);
    assert_eq!(app.orders().len(), 1);
    assert!(app.asaas_payments().is_empty());
}

#[tokio::test]
async fn unreadable_routing_flag_falls_back_to_primary_store() {
    let app = TestApp::spawn().await;
    app.store.fail_config(true);

    let response = app.post_order(&order_submission()).await;

    assert_eq!(response.status().as_u16(), 201);
    assert_eq!(app.orders().len(), 1);
}

#[tokio::test]
async fn card_number_is_masked_in_responses() {
    let app = TestApp::spawn().await;
    let mut body = order_submission();
    body["paymentMethod"] = json!("CREDIT_CARD");
    body["cardDetails"] = json!({
        "number": "4111111111111111",
        "expiryMonth": "08",
        "expiryYear": "2031",
        "cvv": "321",
        "brand": "Visa"
    });

    let response = app.post_order(&body).await;

    assert_eq!(response.status().as_u16(), 201);
    let order: Value = response.json().await.unwrap();
    assert_eq!(order["credit_card_number"], "****1111");
    assert_eq!(order["credit_card_expiry"], "08/2031");
    assert!(order.get("credit_card_cvv").is_none());
}

#[tokio::test]
async fn store_failure_is_internal_error() {
    let app = TestApp::spawn().await;
    app.store.fail_inserts(true);

    let response = app.post_order(&order_submission()).await;

    assert_eq!(response.status().as_u16(), 500);
}

#[tokio::test]
async fn get_order_finds_stored_order() {
    let app = TestApp::spawn().await;
    let created: Value = app.post_order(&order_submission()).await.json().await.unwrap();
    let id = created["id"].as_str().unwrap();

    let response = app
        .client
        .get(format!("{}/orders/{}", app.address, id))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let order: Value = response.json().await.unwrap();
    assert_eq!(order["id"], id);
}

#[tokio::test]
async fn get_unknown_order_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/orders/does-not-exist", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn attach_payment_updates_order() {
    let app = TestApp::spawn().await;
    let created: Value = app.post_order(&order_submission()).await.json().await.unwrap();
    let id = created["id"].as_str().unwrap();

    let response = app
        .client
        .patch(format!("{}/orders/{}/payment", app.address, id))
        .json(&json!({ "paymentId": "pay_789", "qrCode": "00020126pix" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let stored = &app.orders()[0];
    assert_eq!(stored.payment_id.as_deref(), Some("pay_789"));
    assert_eq!(stored.qr_code.as_deref(), Some("00020126pix"));
    assert_eq!(stored.payment_status, PaymentStatus::Pending);
}

#[tokio::test]
async fn attach_blank_payment_id_is_unprocessable() {
    let app = TestApp::spawn().await;
    let created: Value = app.post_order(&order_submission()).await.json().await.unwrap();
    let id = created["id"].as_str().unwrap();

    let response = app
        .client
        .patch(format!("{}/orders/{}/payment", app.address, id))
        .json(&json!({ "paymentId": "" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 422);
    assert!(app.orders()[0].payment_id.is_none());
}
