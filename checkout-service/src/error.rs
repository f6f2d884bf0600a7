use service_core::error::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Invalid order: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Data store error: {0}")]
    Persistence(anyhow::Error),

    #[error("Payment initiation failed: {0}")]
    PaymentInitiation(String),

    #[error("Malformed notification: {0}")]
    MalformedNotification(String),

    #[error("{0} not found")]
    NotFound(String),
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Validation(errors) => AppError::ValidationError(errors),
            CheckoutError::Persistence(e) => AppError::DatabaseError(e),
            CheckoutError::PaymentInitiation(msg) => AppError::BadGateway(msg),
            CheckoutError::MalformedNotification(msg) => {
                AppError::InternalError(anyhow::anyhow!(msg))
            }
            CheckoutError::NotFound(what) => {
                AppError::NotFound(anyhow::anyhow!("{} not found", what))
            }
        }
    }
}
