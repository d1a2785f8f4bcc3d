//! Credit balance handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use stashbox_core::CreditAccount;
use stashbox_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Credit balance response.
#[derive(Debug, Serialize)]
pub struct CreditsResponse {
    /// Remaining credits.
    pub credits: i64,
    /// Current plan label.
    pub plan: String,
    /// Last update timestamp.
    pub updated_at: String,
}

impl From<&CreditAccount> for CreditsResponse {
    fn from(account: &CreditAccount) -> Self {
        Self {
            credits: account.credits,
            plan: account.plan.label().to_string(),
            updated_at: account.updated_at.to_rfc3339(),
        }
    }
}

/// Get the current user's credit balance.
///
/// First contact creates the default ledger record (5 credits, Basic).
pub async fn get_credits(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<CreditsResponse>, ApiError> {
    let account = state.store.get_or_init_credits(&auth.user_id)?;

    Ok(Json(CreditsResponse::from(&account)))
}
