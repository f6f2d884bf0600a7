use serde::Deserialize;

/// Asaas webhook body. Only the fields the handler acts on are modelled.
#[derive(Debug, Deserialize)]
pub struct PaymentNotification {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub payment: Option<NotificationPayment>,
}

#[derive(Debug, Deserialize)]
pub struct NotificationPayment {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Event tags the handler distinguishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    PaymentCreated,
    PaymentConfirmed,
    PaymentReceived,
    Other(String),
}

impl NotificationEvent {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("PAYMENT_CREATED") => NotificationEvent::PaymentCreated,
            Some("PAYMENT_CONFIRMED") => NotificationEvent::PaymentConfirmed,
            Some("PAYMENT_RECEIVED") => NotificationEvent::PaymentReceived,
            Some(other) => NotificationEvent::Other(other.to_string()),
            None => NotificationEvent::Other(String::new()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            NotificationEvent::PaymentCreated => "PAYMENT_CREATED",
            NotificationEvent::PaymentConfirmed => "PAYMENT_CONFIRMED",
            NotificationEvent::PaymentReceived => "PAYMENT_RECEIVED",
            NotificationEvent::Other(_) => "OTHER",
        }
    }
}
