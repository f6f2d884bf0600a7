use chrono::{DateTime, Utc};
use secrecy::Secret;
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

use crate::models::{Order, PaymentMethod, PaymentStatus};
use crate::utils::mask_card_number;

/// Order submission from the checkout page.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(nested)]
    pub customer: CustomerInfo,
    #[serde(default, deserialize_with = "deserialize_product_id")]
    pub product_id: Option<i64>,
    pub product_name: String,
    pub product_price: f64,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub card_details: Option<CardDetails>,
    #[serde(default)]
    pub pix_details: Option<PixDetails>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub is_digital_product: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CustomerInfo {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub email: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub cpf: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    #[serde(default)]
    pub number: Option<Secret<String>>,
    pub expiry_month: String,
    pub expiry_year: String,
    #[serde(default)]
    pub cvv: Option<Secret<String>>,
    #[serde(default)]
    pub brand: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixDetails {
    #[serde(default)]
    pub qr_code: Option<String>,
    #[serde(default)]
    pub qr_code_image: Option<String>,
}

/// Write-back of processor payment data onto an existing order.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AttachPaymentRequest {
    #[validate(custom(function = "not_blank"))]
    pub payment_id: String,
    #[serde(default)]
    pub qr_code: Option<String>,
    #[serde(default)]
    pub qr_code_image: Option<String>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("must not be blank".into());
        return Err(error);
    }
    Ok(())
}

/// Product ids arrive either as JSON numbers or as numeric strings.
fn deserialize_product_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawProductId {
        Number(i64),
        Text(String),
    }

    match Option::<RawProductId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawProductId::Number(id)) => Ok(Some(id)),
        Some(RawProductId::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawProductId::Text(text)) => text
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid product id: {text:?}"))),
    }
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_cpf: String,
    pub customer_phone: Option<String>,
    pub product_id: Option<i64>,
    pub product_name: String,
    pub price: f64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub payment_id: Option<String>,
    pub qr_code: Option<String>,
    pub qr_code_image: Option<String>,
    pub device_type: String,
    pub is_digital_product: bool,
    pub credit_card_number: Option<String>,
    pub credit_card_expiry: Option<String>,
    pub credit_card_brand: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            customer_name: o.customer_name,
            customer_email: o.customer_email,
            customer_cpf: o.customer_cpf,
            customer_phone: o.customer_phone,
            product_id: o.product_id,
            product_name: o.product_name,
            price: o.price,
            payment_method: o.payment_method,
            payment_status: o.payment_status,
            payment_id: o.payment_id,
            qr_code: o.qr_code,
            qr_code_image: o.qr_code_image,
            device_type: o.device_type,
            is_digital_product: o.is_digital_product,
            credit_card_number: o.credit_card_number.as_deref().map(mask_card_number),
            credit_card_expiry: o.credit_card_expiry,
            credit_card_brand: o.credit_card_brand,
            created_at: o.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order: OrderResponse,
    pub last_order_id: Option<String>,
    pub redirect_to: Option<String>,
}
