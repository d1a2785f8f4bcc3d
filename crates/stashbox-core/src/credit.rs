//! Credit account types for stashbox.
//!
//! This module defines the per-user credit ledger record, the plan tiers,
//! and the fixed plan purchase table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

// ============================================================================
// Constants
// ============================================================================

/// Credits granted to a user on first contact with the ledger.
pub const SIGNUP_CREDITS: i64 = 5;

/// Currency used for all plan purchases.
pub const CURRENCY: &str = "INR";

/// Credits added by the premium plan purchase.
pub const PREMIUM_PLAN_CREDITS: i64 = 500;

/// Premium plan price.
pub const PREMIUM_PLAN_AMOUNT: i64 = 500;

/// Credits added by the ultimate plan purchase.
pub const ULTIMATE_PLAN_CREDITS: i64 = 5000;

/// Ultimate plan price.
pub const ULTIMATE_PLAN_AMOUNT: i64 = 2500;

/// A user's credit ledger record.
///
/// Tracks the remaining upload quota and the plan tier. Created lazily with
/// [`SIGNUP_CREDITS`] on the Basic plan when a user is first seen; never
/// deleted in the normal flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditAccount {
    /// The owning user.
    pub user_id: UserId,

    /// Remaining credits. One credit is consumed per stored file.
    /// Invariant: never negative.
    pub credits: i64,

    /// Current plan tier. Overwritten unconditionally on purchase.
    pub plan: Plan,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl CreditAccount {
    /// Create the default record for a newly seen user (5 credits, Basic).
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            credits: SIGNUP_CREDITS,
            plan: Plan::Basic,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the account can cover `n` uploads.
    ///
    /// `n = 0` is trivially affordable.
    #[must_use]
    pub fn has_enough(&self, n: i64) -> bool {
        self.credits >= n
    }
}

/// Plan tiers associated with a credit balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    /// Default tier for new users.
    Basic,

    /// Premium tier: +500 credits per purchase.
    Premium,

    /// Ultimate tier: +5000 credits per purchase.
    Ultimate,
}

impl Plan {
    /// Upper-case label used in stored records and API responses.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Basic => "BASIC",
            Self::Premium => "PREMIUM",
            Self::Ultimate => "ULTIMATE",
        }
    }
}

/// Outcome of a single-credit consumption attempt.
///
/// Consuming at zero balance is a documented no-op, not an error: the
/// caller decides whether an exhausted ledger matters. This makes the
/// outcome explicit instead of an absent value.
#[derive(Debug, Clone)]
pub enum ConsumeOutcome {
    /// One credit was deducted; carries the updated record.
    Consumed(CreditAccount),

    /// Balance was zero; nothing was mutated.
    Exhausted,
}

impl ConsumeOutcome {
    /// Whether a credit was actually deducted.
    #[must_use]
    pub const fn is_consumed(&self) -> bool {
        matches!(self, Self::Consumed(_))
    }
}

/// A purchasable plan: the fixed (credits, price, tier) triple keyed by the
/// public plan identifier.
#[derive(Debug, Clone, Copy)]
pub struct PlanOffer {
    /// Public plan identifier accepted by the payment endpoints.
    pub plan_id: &'static str,

    /// Credits added on purchase.
    pub credits: i64,

    /// Real price charged, in [`CURRENCY`].
    pub amount: i64,

    /// Plan tier written to the ledger.
    pub plan: Plan,
}

/// The static plan table.
pub const PLAN_OFFERS: &[PlanOffer] = &[
    PlanOffer {
        plan_id: "premium",
        credits: PREMIUM_PLAN_CREDITS,
        amount: PREMIUM_PLAN_AMOUNT,
        plan: Plan::Premium,
    },
    PlanOffer {
        plan_id: "ultimate",
        credits: ULTIMATE_PLAN_CREDITS,
        amount: ULTIMATE_PLAN_AMOUNT,
        plan: Plan::Ultimate,
    },
];

impl PlanOffer {
    /// Look up an offer by its public plan identifier.
    #[must_use]
    pub fn for_plan_id(plan_id: &str) -> Option<&'static Self> {
        PLAN_OFFERS.iter().find(|o| o.plan_id == plan_id)
    }
}
