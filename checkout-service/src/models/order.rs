use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use super::{AsaasConfig, PaymentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Pix,
    CreditCard,
    Boleto,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Pix => "PIX",
            PaymentMethod::CreditCard => "CREDIT_CARD",
            PaymentMethod::Boleto => "BOLETO",
        }
    }
}

/// Which collection an order is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Primary `orders` collection; local PIX data is kept.
    Orders,
    /// `asaas_payments`; the processor supplies PIX data itself.
    AsaasPayments,
}

impl Destination {
    pub fn for_config(config: &AsaasConfig) -> Self {
        if config.usar_pix_assas {
            Destination::AsaasPayments
        } else {
            Destination::Orders
        }
    }

    pub fn collection(&self) -> &'static str {
        match self {
            Destination::Orders => "orders",
            Destination::AsaasPayments => "asaas_payments",
        }
    }
}

/// Persisted order record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id")]
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
    // Card columns are only filled for CREDIT_CARD orders.
    // TODO: move card number/cvv behind a tokenising vault before go-live.
    pub credit_card_number: Option<String>,
    pub credit_card_expiry: Option<String>,
    pub credit_card_cvv: Option<String>,
    pub credit_card_brand: Option<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// Order payload before the store assigns an id and creation timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
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
    pub credit_card_cvv: Option<String>,
    pub credit_card_brand: Option<String>,
}

impl NewOrder {
    pub fn into_order(self, id: String, created_at: DateTime<Utc>) -> Order {
        Order {
            id,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            customer_cpf: self.customer_cpf,
            customer_phone: self.customer_phone,
            product_id: self.product_id,
            product_name: self.product_name,
            price: self.price,
            payment_method: self.payment_method,
            payment_status: self.payment_status,
            payment_id: self.payment_id,
            qr_code: self.qr_code,
            qr_code_image: self.qr_code_image,
            device_type: self.device_type,
            is_digital_product: self.is_digital_product,
            credit_card_number: self.credit_card_number,
            credit_card_expiry: self.credit_card_expiry,
            credit_card_cvv: self.credit_card_cvv,
            credit_card_brand: self.credit_card_brand,
            created_at,
        }
    }
}

/// Processor-assigned payment data written back onto an order.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentAttachment {
    pub payment_id: String,
    pub qr_code: Option<String>,
    pub qr_code_image: Option<String>,
}

impl Order {
    /// Apply a write-back locally; absent QR fields leave stored values alone.
    pub fn apply_payment(&mut self, attachment: &PaymentAttachment) {
        self.payment_id = Some(attachment.payment_id.clone());
        if let Some(qr_code) = &attachment.qr_code {
            self.qr_code = Some(qr_code.clone());
        }
        if let Some(image) = &attachment.qr_code_image {
            self.qr_code_image = Some(image.clone());
        }
    }
}
