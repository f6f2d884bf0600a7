use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::options::{FindOneOptions, FindOptions, IndexOptions};
use mongodb::{
    bson::{doc, DateTime as BsonDateTime},
    Collection, Database, IndexModel,
};
use serde::Deserialize;
use uuid::Uuid;

use super::store::{OrderStore, RecentOrderQuery};
use crate::models::{AsaasConfig, Destination, NewOrder, Order, PaymentAttachment, PaymentStatus};

#[derive(Clone)]
pub struct MongoOrderStore {
    orders: Collection<Order>,
    asaas_payments: Collection<Order>,
    asaas_config: Collection<AsaasConfigRecord>,
}

#[derive(Debug, Deserialize)]
struct AsaasConfigRecord {
    #[serde(default)]
    usar_pix_assas: Option<bool>,
}

impl MongoOrderStore {
    pub fn new(db: &Database) -> Self {
        Self {
            orders: db.collection(Destination::Orders.collection()),
            asaas_payments: db.collection(Destination::AsaasPayments.collection()),
            asaas_config: db.collection("asaas_config"),
        }
    }

    fn collection(&self, destination: Destination) -> &Collection<Order> {
        match destination {
            Destination::Orders => &self.orders,
            Destination::AsaasPayments => &self.asaas_payments,
        }
    }

    /// Create lookup indexes on both order collections.
    ///
    /// These speed up the duplicate checks; they do not make them race-free.
    pub async fn init_indexes(&self) -> Result<()> {
        for destination in [Destination::Orders, Destination::AsaasPayments] {
            let payment_id_index = IndexModel::builder()
                .keys(doc! { "payment_id": 1 })
                .options(
                    IndexOptions::builder()
                        .name("payment_id_idx".to_string())
                        .sparse(true)
                        .build(),
                )
                .build();

            let dedupe_index = IndexModel::builder()
                .keys(doc! {
                    "customer_email": 1,
                    "product_id": 1,
                    "product_name": 1,
                    "payment_method": 1,
                    "created_at": -1
                })
                .options(
                    IndexOptions::builder()
                        .name("recent_duplicate_idx".to_string())
                        .build(),
                )
                .build();

            self.collection(destination)
                .create_indexes([payment_id_index, dedupe_index], None)
                .await?;
        }

        tracing::info!("Checkout service indexes initialized");
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MongoOrderStore {
    async fn find_by_payment_id(
        &self,
        destination: Destination,
        payment_id: &str,
    ) -> Result<Option<Order>> {
        let filter = doc! { "payment_id": payment_id };
        let order = self.collection(destination).find_one(filter, None).await?;
        Ok(order)
    }

    async fn find_recent_candidates(
        &self,
        destination: Destination,
        query: &RecentOrderQuery,
    ) -> Result<Vec<Order>> {
        let filter = doc! {
            "customer_email": query.customer_email.as_str(),
            "product_id": query.product_id,
            "product_name": query.product_name.as_str(),
            "payment_method": query.payment_method.as_str(),
            "created_at": { "$gte": BsonDateTime::from_chrono(query.since) }
        };
        let options = FindOptions::builder()
            .sort(doc! { "created_at": 1 })
            .build();

        let cursor = self.collection(destination).find(filter, options).await?;
        let orders: Vec<Order> = cursor.try_collect().await?;
        Ok(orders)
    }

    async fn insert(&self, destination: Destination, order: NewOrder) -> Result<Order> {
        let order = order.into_order(Uuid::new_v4().to_string(), Utc::now());
        self.collection(destination)
            .insert_one(order.clone(), None)
            .await?;
        Ok(order)
    }

    async fn find_by_id(&self, destination: Destination, id: &str) -> Result<Option<Order>> {
        let filter = doc! { "_id": id };
        let order = self.collection(destination).find_one(filter, None).await?;
        Ok(order)
    }

    async fn attach_payment(
        &self,
        destination: Destination,
        id: &str,
        attachment: &PaymentAttachment,
    ) -> Result<u64> {
        let mut set = doc! { "payment_id": attachment.payment_id.as_str() };
        if let Some(qr_code) = &attachment.qr_code {
            set.insert("qr_code", qr_code.as_str());
        }
        if let Some(image) = &attachment.qr_code_image {
            set.insert("qr_code_image", image.as_str());
        }

        let result = self
            .collection(destination)
            .update_one(doc! { "_id": id }, doc! { "$set": set }, None)
            .await?;
        Ok(result.matched_count)
    }

    async fn mark_paid_by_payment_id(&self, payment_id: &str) -> Result<u64> {
        let filter = doc! { "payment_id": payment_id };
        let update = doc! {
            "$set": { "payment_status": PaymentStatus::Paid.as_str() }
        };
        let mut matched = 0;
        for destination in [Destination::Orders, Destination::AsaasPayments] {
            let result = self
                .collection(destination)
                .update_many(filter.clone(), update.clone(), None)
                .await?;
            matched += result.matched_count;
        }
        Ok(matched)
    }

    async fn fetch_asaas_config(&self) -> Result<Option<AsaasConfig>> {
        let options = FindOneOptions::builder().sort(doc! { "id": -1 }).build();
        let record = self.asaas_config.find_one(doc! {}, options).await?;
        Ok(record.map(|r| AsaasConfig {
            usar_pix_assas: r.usar_pix_assas.unwrap_or(false),
        }))
    }
}
