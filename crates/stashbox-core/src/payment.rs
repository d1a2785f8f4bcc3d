//! Payment transaction types for stashbox.
//!
//! A transaction record is the immutable log entry of a completed credit
//! purchase. Records are append-only; nothing updates or deletes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{TransactionId, UserId};

/// An immutable record of a credit purchase.
///
/// Transactions use ULIDs so the per-user history is naturally
/// time-ordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentTransaction {
    /// Unique transaction ID (ULID for time-ordering).
    pub id: TransactionId,

    /// The user whose balance was credited.
    pub user_id: UserId,

    /// Public identifier of the purchased plan.
    pub plan_id: String,

    /// Real price charged.
    pub amount: i64,

    /// Currency code of `amount`.
    pub currency: String,

    /// Outcome of the payment.
    pub status: TransactionStatus,

    /// Credits granted by this purchase.
    pub credits_added: i64,

    /// Email of the purchaser at transaction time.
    pub user_email: String,

    /// Display name of the purchaser at transaction time.
    pub user_name: String,

    /// When the transaction was recorded.
    pub created_at: DateTime<Utc>,
}

impl PaymentTransaction {
    /// Create a successful purchase record.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn success(
        user_id: UserId,
        plan_id: String,
        amount: i64,
        currency: String,
        credits_added: i64,
        user_email: String,
        user_name: String,
    ) -> Self {
        Self {
            id: TransactionId::generate(),
            user_id,
            plan_id,
            amount,
            currency,
            status: TransactionStatus::Success,
            credits_added,
            user_email,
            user_name,
            created_at: Utc::now(),
        }
    }
}

/// Outcome of a payment.
///
/// Only `Success` records are persisted by the manual credit-add path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Payment completed and credits were granted.
    Success,

    /// Payment failed; no credits granted.
    Failed,
}
