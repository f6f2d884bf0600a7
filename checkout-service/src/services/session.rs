use async_trait::async_trait;
use std::sync::Mutex;

/// Route of the page that shows the PIX QR code after checkout.
pub const PIX_PAYMENT_ROUTE: &str = "/pix-payment-asaas";

/// Client-side effects of a successful checkout.
#[async_trait]
pub trait CheckoutSession: Send + Sync {
    /// Persist the id of the order just created so the payment page can load it.
    async fn remember_last_order(&self, order_id: &str) -> anyhow::Result<()>;

    fn navigate(&self, path: &str);
}

/// Session that records effects so the HTTP layer can turn them into a
/// cookie and a redirect hint.
#[derive(Default)]
pub struct ResponseSession {
    last_order_id: Mutex<Option<String>>,
    redirect_to: Mutex<Option<String>>,
}

impl ResponseSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_order_id(&self) -> Option<String> {
        self.last_order_id.lock().ok().and_then(|g| g.clone())
    }

    pub fn redirect_to(&self) -> Option<String> {
        self.redirect_to.lock().ok().and_then(|g| g.clone())
    }
}

#[async_trait]
impl CheckoutSession for ResponseSession {
    async fn remember_last_order(&self, order_id: &str) -> anyhow::Result<()> {
        *self
            .last_order_id
            .lock()
            .map_err(|e| anyhow::anyhow!("session mutex poisoned: {}", e))? = Some(order_id.to_string());
        Ok(())
    }

    fn navigate(&self, path: &str) {
        if let Ok(mut redirect) = self.redirect_to.lock() {
            *redirect = Some(path.to_string());
        }
    }
}
