pub mod notifications;
pub mod orders;

pub use notifications::{NotificationEvent, NotificationPayment, PaymentNotification};
pub use orders::{
    AttachPaymentRequest, CardDetails, CheckoutResponse, CreateOrderRequest, CustomerInfo,
    OrderResponse, PixDetails,
};
