pub mod asaas;
pub mod memory;
pub mod metrics;
pub mod notifications;
pub mod pix;
pub mod reconciler;
pub mod repository;
pub mod session;
pub mod store;

pub use asaas::{AsaasPaymentClient, CreatedPayment, PaymentGateway, PaymentRequest, PixCharge};
pub use memory::InMemoryOrderStore;
pub use metrics::{get_metrics, init_metrics};
pub use notifications::{handle_notification, NotificationResponse};
pub use reconciler::{OrderReconciler, PlacedOrder};
pub use repository::MongoOrderStore;
pub use session::{CheckoutSession, ResponseSession, PIX_PAYMENT_ROUTE};
pub use store::{load_asaas_config, OrderStore, RecentOrderQuery};
