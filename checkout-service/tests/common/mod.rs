#![allow(dead_code)]

use checkout_service::config::{AsaasSettings, CheckoutConfig, MongoConfig, OrderSettings};
use checkout_service::models::{AsaasConfig, Destination, Order};
use checkout_service::services::{init_metrics, AsaasPaymentClient, InMemoryOrderStore};
use checkout_service::Application;
use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;
use std::sync::Arc;

/// Payment URL nothing listens on, for tests that never reach the processor.
const UNREACHABLE_PAYMENT_URL: &str = "http://127.0.0.1:9/payments";

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: Arc<InMemoryOrderStore>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(InMemoryOrderStore::new(), UNREACHABLE_PAYMENT_URL).await
    }

    /// Spawn with the processor routing flag switched on.
    pub async fn spawn_routed_to_asaas(payment_url: &str) -> Self {
        let store = InMemoryOrderStore::with_asaas_config(AsaasConfig {
            usar_pix_assas: true,
        });
        Self::spawn_with(store, payment_url).await
    }

    pub async fn spawn_with(store: InMemoryOrderStore, payment_url: &str) -> Self {
        init_metrics().ok();

        let config = CheckoutConfig {
            common: CoreConfig {
                port: 0,
                ..CoreConfig::default()
            },
            mongodb: MongoConfig {
                uri: "mongodb://localhost:27017".to_string(),
                database: "checkout_test".to_string(),
            },
            asaas: AsaasSettings {
                payment_url: payment_url.to_string(),
                api_key: None,
            },
            orders: OrderSettings::default(),
        };

        let store = Arc::new(store);
        let gateway = Arc::new(AsaasPaymentClient::new(config.asaas.clone()));

        let app = Application::build_with(config, store.clone(), gateway)
            .await
            .expect("Failed to build test application");
        let port = app.http_port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            store,
            client,
        }
    }

    pub async fn post_order(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}/orders", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_checkout(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}/orders/checkout", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_webhook(&self, body: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/webhooks/asaas", self.address))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub fn orders(&self) -> Vec<Order> {
        self.store.orders(Destination::Orders)
    }

    pub fn asaas_payments(&self) -> Vec<Order> {
        self.store.orders(Destination::AsaasPayments)
    }
}

pub fn order_submission() -> Value {
    json!({
        "customer": {
            "name": "Ana Souza",
            "email": "ana@example.com",
            "cpf": "12345678900",
            "phone": "11999990000"
        },
        "productId": 42,
        "productName": "Curso de Rust",
        "productPrice": 197.0,
        "paymentMethod": "PIX",
        "isDigitalProduct": true
    })
}
