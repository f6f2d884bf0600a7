//! Canonical payment status and the lookup table that folds the Portuguese
//! and English status vocabularies onto it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The only statuses ever persisted on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Approved,
    Denied,
    Analysis,
    Cancelled,
}

/// Incoming spelling → canonical status. Keys are upper-case and trimmed.
///
/// `CONFIRMED` is a legacy alias for `PAID` and is never stored as such.
pub const STATUS_ALIASES: &[(&str, PaymentStatus)] = &[
    ("PAGO", PaymentStatus::Paid),
    ("PAID", PaymentStatus::Paid),
    ("PENDING", PaymentStatus::Pending),
    ("AGUARDANDO", PaymentStatus::Pending),
    ("PENDENTE", PaymentStatus::Pending),
    ("CANCELADO", PaymentStatus::Cancelled),
    ("ANÁLISE", PaymentStatus::Analysis),
    ("ANALYSIS", PaymentStatus::Analysis),
    ("APROVADO", PaymentStatus::Approved),
    ("APPROVED", PaymentStatus::Approved),
    ("RECUSADO", PaymentStatus::Denied),
    ("REJECTED", PaymentStatus::Denied),
    ("NEGADO", PaymentStatus::Denied),
    ("DENIED", PaymentStatus::Denied),
    ("DECLINED", PaymentStatus::Denied),
    ("CONFIRMED", PaymentStatus::Paid),
];

impl PaymentStatus {
    /// Map a free-text status onto the canonical set. Absent, empty and
    /// unrecognised values all become `Pending`.
    pub fn normalize(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return PaymentStatus::Pending;
        };

        let key = raw.trim().to_uppercase();
        STATUS_ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, status)| *status)
            .unwrap_or(PaymentStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Approved => "APPROVED",
            PaymentStatus::Denied => "DENIED",
            PaymentStatus::Analysis => "ANALYSIS",
            PaymentStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
