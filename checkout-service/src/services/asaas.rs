//! Asaas payment-creation client.
//!
//! The checkout front-end's serverless function creates the Asaas customer
//! and PIX charge; this client calls it and decodes the charge it returns.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use service_core::observability::TracedClientExt;

use crate::config::AsaasSettings;
use crate::error::CheckoutError;
use crate::models::{PaymentAttachment, PaymentMethod};

/// Body of the payment-creation call.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaymentRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_cpf: String,
    pub customer_phone: Option<String>,
    pub price: f64,
    pub payment_method: PaymentMethod,
    pub product_name: String,
}

/// Successful payment-creation response.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedPayment {
    pub id: String,
    #[serde(default)]
    pub pix: Option<PixCharge>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PixCharge {
    #[serde(default)]
    pub payload: Option<String>,
    #[serde(rename = "qrCodeImage", default)]
    pub qr_code_image: Option<String>,
}

impl CreatedPayment {
    pub fn attachment(&self) -> PaymentAttachment {
        PaymentAttachment {
            payment_id: self.id.clone(),
            qr_code: self.pix.as_ref().and_then(|p| p.payload.clone()),
            qr_code_image: self.pix.as_ref().and_then(|p| p.qr_code_image.clone()),
        }
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment(&self, request: &PaymentRequest)
        -> Result<CreatedPayment, CheckoutError>;
}

#[derive(Clone)]
pub struct AsaasPaymentClient {
    client: Client,
    settings: AsaasSettings,
}

impl AsaasPaymentClient {
    pub fn new(settings: AsaasSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }
}

#[async_trait]
impl PaymentGateway for AsaasPaymentClient {
    async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<CreatedPayment, CheckoutError> {
        let mut call = self
            .client
            .traced_post(&self.settings.payment_url)
            .json(request);
        if let Some(api_key) = &self.settings.api_key {
            call = call.header("access_token", api_key.expose_secret());
        }

        let response = call.send().await.map_err(|e| {
            tracing::error!(error = %e, "Payment creation request failed");
            CheckoutError::PaymentInitiation(format!("request failed: {}", e))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            CheckoutError::PaymentInitiation(format!("failed to read response: {}", e))
        })?;

        tracing::debug!(status = %status, "Payment creation response");

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "Asaas payment creation failed");
            return Err(CheckoutError::PaymentInitiation(format!(
                "processor returned {}",
                status
            )));
        }

        let payment: CreatedPayment = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, "Undecodable payment creation response");
            CheckoutError::PaymentInitiation(format!("invalid response body: {}", e))
        })?;

        tracing::info!(payment_id = %payment.id, "Asaas payment created");
        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> PaymentRequest {
        PaymentRequest {
            customer_name: "Ana Souza".to_string(),
            customer_email: "ana@example.com".to_string(),
            customer_cpf: "12345678900".to_string(),
            customer_phone: None,
            price: 97.0,
            payment_method: PaymentMethod::Pix,
            product_name: "Curso".to_string(),
        }
    }

    fn client(server: &MockServer, api_key: Option<&str>) -> AsaasPaymentClient {
        AsaasPaymentClient::new(AsaasSettings {
            payment_url: format!("{}/create-asaas-customer", server.uri()),
            api_key: api_key.map(|k| Secret::new(k.to_string())),
        })
    }

    #[tokio::test]
    async fn decodes_created_pix_charge() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/create-asaas-customer"))
            .and(header("access_token", "key-123"))
            .and(body_partial_json(json!({
                "customer_email": "ana@example.com",
                "payment_method": "PIX",
                "price": 97.0
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "pay_123",
                "pix": { "payload": "000201...", "qrCodeImage": "iVBORw0KGgo" }
            })))
            .mount(&server)
            .await;

        let payment = client(&server, Some("key-123"))
            .create_payment(&request())
            .await
            .unwrap();

        let attachment = payment.attachment();
        assert_eq!(attachment.payment_id, "pay_123");
        assert_eq!(attachment.qr_code.as_deref(), Some("000201..."));
        assert_eq!(attachment.qr_code_image.as_deref(), Some("iVBORw0KGgo"));
    }

    #[tokio::test]
    async fn non_success_status_is_a_payment_initiation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "errors": [{ "code": "invalid_cpfCnpj" }]
            })))
            .mount(&server)
            .await;

        let result = client(&server, None).create_payment(&request()).await;
        assert!(matches!(result, Err(CheckoutError::PaymentInitiation(_))));
    }

    #[tokio::test]
    async fn garbage_body_is_a_payment_initiation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let result = client(&server, None).create_payment(&request()).await;
        assert!(matches!(result, Err(CheckoutError::PaymentInitiation(_))));
    }
}
