//! Order creation with duplicate detection, status normalisation and
//! destination routing.
//!
//! The duplicate check and the insert are separate store calls; two
//! concurrent identical submissions can both pass the check.

use chrono::{Duration, Utc};
use std::sync::Arc;
use validator::Validate;

use super::asaas::{PaymentGateway, PaymentRequest};
use super::metrics;
use super::pix::render_qr_base64;
use super::session::{CheckoutSession, PIX_PAYMENT_ROUTE};
use super::store::{OrderStore, RecentOrderQuery};
use crate::dtos::CreateOrderRequest;
use crate::error::CheckoutError;
use crate::models::{
    AsaasConfig, Destination, NewOrder, Order, PaymentAttachment, PaymentMethod, PaymentStatus,
};
use crate::utils::mask_card_number;
use secrecy::ExposeSecret;

const DEFAULT_DEVICE_TYPE: &str = "desktop";
const UNKNOWN_CARD_BRAND: &str = "Unknown";

/// Result of `place_order`: the order plus where it lives.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub destination: Destination,
    /// True when an existing order was returned instead of inserting.
    pub duplicate: bool,
}

#[derive(Clone)]
pub struct OrderReconciler {
    store: Arc<dyn OrderStore>,
    gateway: Arc<dyn PaymentGateway>,
    dedupe_window: Duration,
}

impl OrderReconciler {
    pub fn new(
        store: Arc<dyn OrderStore>,
        gateway: Arc<dyn PaymentGateway>,
        dedupe_window: Duration,
    ) -> Self {
        Self {
            store,
            gateway,
            dedupe_window,
        }
    }

    /// Create an order, or return the stored duplicate of it.
    pub async fn create_order(
        &self,
        request: &CreateOrderRequest,
        config: &AsaasConfig,
    ) -> Result<Order, CheckoutError> {
        Ok(self.place_order(request, config).await?.order)
    }

    pub async fn place_order(
        &self,
        request: &CreateOrderRequest,
        config: &AsaasConfig,
    ) -> Result<PlacedOrder, CheckoutError> {
        request.validate()?;

        let destination = Destination::for_config(config);

        tracing::info!(
            customer_email = %request.customer.email,
            product_id = ?request.product_id,
            payment_method = request.payment_method.as_str(),
            card_number = ?card_number_hint(request),
            destination = destination.collection(),
            "Creating order"
        );

        if let Some((existing, found_in)) = self.find_duplicate(request, destination).await? {
            return Ok(PlacedOrder {
                order: existing,
                destination: found_in,
                duplicate: true,
            });
        }

        let new_order = build_new_order(request, destination);
        tracing::debug!(
            payment_status = %new_order.payment_status,
            raw_status = ?request.payment_status,
            "Payment status normalized"
        );

        let order = self
            .store
            .insert(destination, new_order)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to insert order");
                CheckoutError::Persistence(e)
            })?;

        metrics::record_order_created(destination);
        tracing::info!(
            order_id = %order.id,
            destination = destination.collection(),
            "Order created"
        );

        Ok(PlacedOrder {
            order,
            destination,
            duplicate: false,
        })
    }

    /// Payment-id match first, then the time-windowed field match. Only
    /// attempted when the submission carries a product id.
    ///
    /// A payment id identifies one order across both destinations, so that
    /// lookup ignores the routing flag; the windowed match stays within
    /// `destination`.
    async fn find_duplicate(
        &self,
        request: &CreateOrderRequest,
        destination: Destination,
    ) -> Result<Option<(Order, Destination)>, CheckoutError> {
        let Some(product_id) = request.product_id else {
            return Ok(None);
        };

        if let Some(payment_id) = request.payment_id.as_deref().filter(|p| !p.is_empty()) {
            for searched in [Destination::Orders, Destination::AsaasPayments] {
                let existing = self
                    .store
                    .find_by_payment_id(searched, payment_id)
                    .await
                    .map_err(CheckoutError::Persistence)?;
                if let Some(order) = existing {
                    tracing::info!(
                        order_id = %order.id,
                        payment_id = %payment_id,
                        destination = searched.collection(),
                        "Existing order found for payment id"
                    );
                    metrics::record_duplicate("payment_id");
                    return Ok(Some((order, searched)));
                }
            }
        }

        let query = RecentOrderQuery {
            customer_email: request.customer.email.clone(),
            product_id,
            product_name: request.product_name.clone(),
            payment_method: request.payment_method,
            since: Utc::now() - self.dedupe_window,
        };
        let candidates = self
            .store
            .find_recent_candidates(destination, &query)
            .await
            .map_err(CheckoutError::Persistence)?;

        let exact = candidates.into_iter().find(|o| {
            o.price == request.product_price
                && o.customer_name == request.customer.name
                && o.customer_cpf == request.customer.cpf
        });

        if let Some(order) = &exact {
            tracing::info!(order_id = %order.id, "Duplicate order detected, returning existing order");
            metrics::record_duplicate("recent_match");
        }

        Ok(exact.map(|order| (order, destination)))
    }

    /// Create the order, remember it client-side, create the processor
    /// payment and write its id and PIX data back onto the order.
    pub async fn create_order_and_initiate_payment(
        &self,
        request: &CreateOrderRequest,
        config: &AsaasConfig,
        session: &dyn CheckoutSession,
    ) -> Result<Order, CheckoutError> {
        let PlacedOrder {
            mut order,
            destination,
            ..
        } = self.place_order(request, config).await?;

        session
            .remember_last_order(&order.id)
            .await
            .map_err(CheckoutError::Persistence)?;

        let payment = self
            .gateway
            .create_payment(&payment_request(request))
            .await?;
        let attachment = payment.attachment();

        self.store
            .attach_payment(destination, &order.id, &attachment)
            .await
            .map_err(|e| {
                tracing::error!(
                    order_id = %order.id,
                    payment_id = %attachment.payment_id,
                    error = %e,
                    "Failed to write processor payment back onto order"
                );
                CheckoutError::Persistence(e)
            })?;

        order.apply_payment(&attachment);
        session.navigate(PIX_PAYMENT_ROUTE);

        Ok(order)
    }

    /// Look an order up in the primary store, then the processor store.
    pub async fn find_order(&self, id: &str) -> Result<(Order, Destination), CheckoutError> {
        for destination in [Destination::Orders, Destination::AsaasPayments] {
            let found = self
                .store
                .find_by_id(destination, id)
                .await
                .map_err(CheckoutError::Persistence)?;
            if let Some(order) = found {
                return Ok((order, destination));
            }
        }
        Err(CheckoutError::NotFound(format!("Order {}", id)))
    }

    /// Attach processor payment data to an existing order.
    pub async fn attach_payment(
        &self,
        id: &str,
        attachment: &PaymentAttachment,
    ) -> Result<Order, CheckoutError> {
        let (mut order, destination) = self.find_order(id).await?;

        self.store
            .attach_payment(destination, id, attachment)
            .await
            .map_err(CheckoutError::Persistence)?;

        order.apply_payment(attachment);
        tracing::info!(
            order_id = %id,
            payment_id = %attachment.payment_id,
            "Payment attached to order"
        );
        Ok(order)
    }
}

fn build_new_order(request: &CreateOrderRequest, destination: Destination) -> NewOrder {
    let (qr_code, qr_code_image) = match destination {
        Destination::Orders => local_pix_fields(request),
        Destination::AsaasPayments => (None, None),
    };

    let card = request
        .card_details
        .as_ref()
        .filter(|_| request.payment_method == PaymentMethod::CreditCard);

    NewOrder {
        customer_name: request.customer.name.clone(),
        customer_email: request.customer.email.clone(),
        customer_cpf: request.customer.cpf.clone(),
        customer_phone: request.customer.phone.clone().filter(|p| !p.is_empty()),
        product_id: request.product_id,
        product_name: request.product_name.clone(),
        price: request.product_price,
        payment_method: request.payment_method,
        payment_status: PaymentStatus::normalize(request.payment_status.as_deref()),
        payment_id: request.payment_id.clone().filter(|p| !p.is_empty()),
        qr_code,
        qr_code_image,
        device_type: request
            .device_type
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| DEFAULT_DEVICE_TYPE.to_string()),
        is_digital_product: request.is_digital_product.unwrap_or(false),
        credit_card_number: card
            .and_then(|c| c.number.as_ref())
            .map(|n| n.expose_secret().clone()),
        credit_card_expiry: card.map(|c| format!("{}/{}", c.expiry_month, c.expiry_year)),
        credit_card_cvv: card
            .and_then(|c| c.cvv.as_ref())
            .map(|cvv| cvv.expose_secret().clone()),
        credit_card_brand: card.map(|c| {
            c.brand
                .clone()
                .filter(|b| !b.is_empty())
                .unwrap_or_else(|| UNKNOWN_CARD_BRAND.to_string())
        }),
    }
}

/// Submitted PIX data; an image is rendered when only the payload was sent.
fn local_pix_fields(request: &CreateOrderRequest) -> (Option<String>, Option<String>) {
    let Some(pix) = &request.pix_details else {
        return (None, None);
    };

    let qr_code = pix.qr_code.clone().filter(|q| !q.is_empty());
    let qr_code_image = match (&qr_code, pix.qr_code_image.clone().filter(|i| !i.is_empty())) {
        (_, Some(image)) => Some(image),
        (Some(payload), None) => match render_qr_base64(payload) {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to render PIX QR image");
                None
            }
        },
        (None, None) => None,
    };

    (qr_code, qr_code_image)
}

fn payment_request(request: &CreateOrderRequest) -> PaymentRequest {
    PaymentRequest {
        customer_name: request.customer.name.clone(),
        customer_email: request.customer.email.clone(),
        customer_cpf: request.customer.cpf.clone(),
        customer_phone: request.customer.phone.clone(),
        price: request.product_price,
        payment_method: request.payment_method,
        product_name: request.product_name.clone(),
    }
}

fn card_number_hint(request: &CreateOrderRequest) -> Option<String> {
    request
        .card_details
        .as_ref()
        .and_then(|c| c.number.as_ref())
        .map(|n| mask_card_number(n.expose_secret()))
}
