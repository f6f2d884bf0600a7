pub mod order;
pub mod status;

use serde::{Deserialize, Serialize};

pub use order::{Destination, NewOrder, Order, PaymentAttachment, PaymentMethod};
pub use status::PaymentStatus;

/// Latest row of the `asaas_config` collection.
///
/// `usar_pix_assas` routes new orders to the processor-backed store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsaasConfig {
    pub usar_pix_assas: bool,
}
