//! Data store seam used by the reconciler and the webhook handler.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{AsaasConfig, Destination, NewOrder, Order, PaymentAttachment, PaymentMethod};

/// Filter for the fuzzy duplicate check.
#[derive(Debug, Clone)]
pub struct RecentOrderQuery {
    pub customer_email: String,
    pub product_id: i64,
    pub product_name: String,
    pub payment_method: PaymentMethod,
    pub since: DateTime<Utc>,
}

impl RecentOrderQuery {
    pub fn matches(&self, order: &Order) -> bool {
        order.customer_email == self.customer_email
            && order.product_id == Some(self.product_id)
            && order.product_name == self.product_name
            && order.payment_method == self.payment_method
            && order.created_at >= self.since
    }
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn find_by_payment_id(
        &self,
        destination: Destination,
        payment_id: &str,
    ) -> Result<Option<Order>>;

    /// Orders matching `query`, oldest first.
    async fn find_recent_candidates(
        &self,
        destination: Destination,
        query: &RecentOrderQuery,
    ) -> Result<Vec<Order>>;

    /// Persist a new order; the store assigns `id` and `created_at`.
    async fn insert(&self, destination: Destination, order: NewOrder) -> Result<Order>;

    async fn find_by_id(&self, destination: Destination, id: &str) -> Result<Option<Order>>;

    /// Returns the number of matched orders.
    async fn attach_payment(
        &self,
        destination: Destination,
        id: &str,
        attachment: &PaymentAttachment,
    ) -> Result<u64>;

    /// Set `payment_status = PAID` on every order with this `payment_id`,
    /// in both destinations. Returns the number of matched orders.
    async fn mark_paid_by_payment_id(&self, payment_id: &str) -> Result<u64>;

    /// Latest `asaas_config` row, if any.
    async fn fetch_asaas_config(&self) -> Result<Option<AsaasConfig>>;
}

/// Read the routing flag, falling back to `usar_pix_assas = false` when the
/// lookup fails or finds nothing.
pub async fn load_asaas_config(store: &dyn OrderStore) -> AsaasConfig {
    match store.fetch_asaas_config().await {
        Ok(Some(config)) => config,
        Ok(None) => {
            tracing::warn!("No asaas_config row found, defaulting usar_pix_assas to false");
            AsaasConfig::default()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load asaas_config, defaulting usar_pix_assas to false");
            AsaasConfig::default()
        }
    }
}
