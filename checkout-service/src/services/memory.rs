use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use super::store::{OrderStore, RecentOrderQuery};
use crate::models::{AsaasConfig, Destination, NewOrder, Order, PaymentAttachment, PaymentStatus};

/// Process-local `OrderStore` for tests and local runs.
///
/// Faults can be switched on per operation kind to exercise error paths.
#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: Mutex<Vec<Order>>,
    asaas_payments: Mutex<Vec<Order>>,
    asaas_config: Mutex<Option<AsaasConfig>>,
    fail_reads: AtomicBool,
    fail_inserts: AtomicBool,
    fail_updates: AtomicBool,
    fail_config: AtomicBool,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asaas_config(config: AsaasConfig) -> Self {
        let store = Self::new();
        store.set_asaas_config(config);
        store
    }

    pub fn set_asaas_config(&self, config: AsaasConfig) {
        if let Ok(mut guard) = self.asaas_config.lock() {
            *guard = Some(config);
        }
    }

    /// Insert a fully-formed order, e.g. one with a back-dated `created_at`.
    pub fn seed(&self, destination: Destination, order: Order) {
        if let Ok(mut guard) = self.bucket(destination).lock() {
            guard.push(order);
        }
    }

    pub fn orders(&self, destination: Destination) -> Vec<Order> {
        self.bucket(destination)
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn fail_config(&self, fail: bool) {
        self.fail_config.store(fail, Ordering::SeqCst);
    }

    fn bucket(&self, destination: Destination) -> &Mutex<Vec<Order>> {
        match destination {
            Destination::Orders => &self.orders,
            Destination::AsaasPayments => &self.asaas_payments,
        }
    }

    fn check(flag: &AtomicBool, operation: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(anyhow!("injected {} failure", operation));
        }
        Ok(())
    }

    fn lock(&self, destination: Destination) -> Result<std::sync::MutexGuard<'_, Vec<Order>>> {
        self.bucket(destination)
            .lock()
            .map_err(|e| anyhow!("in-memory store mutex poisoned: {}", e))
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn find_by_payment_id(
        &self,
        destination: Destination,
        payment_id: &str,
    ) -> Result<Option<Order>> {
        Self::check(&self.fail_reads, "read")?;
        let orders = self.lock(destination)?;
        Ok(orders
            .iter()
            .find(|o| o.payment_id.as_deref() == Some(payment_id))
            .cloned())
    }

    async fn find_recent_candidates(
        &self,
        destination: Destination,
        query: &RecentOrderQuery,
    ) -> Result<Vec<Order>> {
        Self::check(&self.fail_reads, "read")?;
        let orders = self.lock(destination)?;
        let mut candidates: Vec<Order> =
            orders.iter().filter(|o| query.matches(o)).cloned().collect();
        candidates.sort_by_key(|o| o.created_at);
        Ok(candidates)
    }

    async fn insert(&self, destination: Destination, order: NewOrder) -> Result<Order> {
        Self::check(&self.fail_inserts, "insert")?;
        let order = order.into_order(Uuid::new_v4().to_string(), Utc::now());
        self.lock(destination)?.push(order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, destination: Destination, id: &str) -> Result<Option<Order>> {
        Self::check(&self.fail_reads, "read")?;
        let orders = self.lock(destination)?;
        Ok(orders.iter().find(|o| o.id == id).cloned())
    }

    async fn attach_payment(
        &self,
        destination: Destination,
        id: &str,
        attachment: &PaymentAttachment,
    ) -> Result<u64> {
        Self::check(&self.fail_updates, "update")?;
        let mut orders = self.lock(destination)?;
        let mut matched = 0;
        for order in orders.iter_mut().filter(|o| o.id == id) {
            order.apply_payment(attachment);
            matched += 1;
        }
        Ok(matched)
    }

    async fn mark_paid_by_payment_id(&self, payment_id: &str) -> Result<u64> {
        Self::check(&self.fail_updates, "update")?;
        let mut matched = 0;
        for destination in [Destination::Orders, Destination::AsaasPayments] {
            let mut orders = self.lock(destination)?;
            for order in orders
                .iter_mut()
                .filter(|o| o.payment_id.as_deref() == Some(payment_id))
            {
                order.payment_status = PaymentStatus::Paid;
                matched += 1;
            }
        }
        Ok(matched)
    }

    async fn fetch_asaas_config(&self) -> Result<Option<AsaasConfig>> {
        Self::check(&self.fail_config, "config read")?;
        self.asaas_config
            .lock()
            .map(|guard| *guard)
            .map_err(|e| anyhow!("in-memory store mutex poisoned: {}", e))
    }
}
