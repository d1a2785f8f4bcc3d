//! Plan purchase, gateway order, and transaction history handlers.
//!
//! Purchase and verify endpoints never propagate errors as HTTP failures
//! beyond the status code: every outcome is a structured `{success,
//! message, ...}` body that callers branch on.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use stashbox_core::{
    CreditAccount, PaymentTransaction, PlanOffer, TransactionStatus, CURRENCY,
};
use stashbox_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::gateway::GatewayOrder;
use crate::state::AppState;

/// Structured outcome of a purchase or verification attempt.
#[derive(Debug, Serialize)]
pub struct PaymentResult {
    /// Whether credits were granted.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// New balance after the grant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits: Option<i64>,
    /// Price charged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    /// Currency of `amount`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Purchased plan identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
}

impl PaymentResult {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            credits: None,
            amount: None,
            currency: None,
            plan_id: None,
        }
    }

    fn purchased(account: &CreditAccount, offer: &PlanOffer) -> Self {
        Self {
            success: true,
            message: format!("{} credits added", offer.credits),
            credits: Some(account.credits),
            amount: Some(offer.amount),
            currency: Some(CURRENCY.to_string()),
            plan_id: Some(offer.plan_id.to_string()),
        }
    }
}

/// Plan purchase request.
#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    /// Public plan identifier.
    pub plan_id: String,
}

/// Add credits for a purchased plan.
pub async fn purchase_plan(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<PurchaseRequest>,
) -> Result<(StatusCode, Json<PaymentResult>), ApiError> {
    let Some(offer) = PlanOffer::for_plan_id(&body.plan_id) else {
        tracing::warn!(user_id = %auth.user_id, plan_id = %body.plan_id, "Unknown plan requested");
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(PaymentResult::failure("Invalid plan selected")),
        ));
    };

    match grant_plan(&state, &auth, offer) {
        Ok(account) => {
            tracing::info!(
                user_id = %auth.user_id,
                plan_id = %offer.plan_id,
                credits = %account.credits,
                "Plan purchase applied"
            );
            Ok((StatusCode::OK, Json(PaymentResult::purchased(&account, offer))))
        }
        Err(e) => {
            tracing::error!(user_id = %auth.user_id, error = %e, "Plan purchase failed");
            Ok((
                StatusCode::BAD_REQUEST,
                Json(PaymentResult::failure(e.to_string())),
            ))
        }
    }
}

/// Order creation request.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Amount to charge, in whole currency units.
    pub amount: i64,
}

/// Create a payment order at the gateway.
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateOrderRequest>,
) -> Result<Json<GatewayOrder>, ApiError> {
    let gateway = state
        .gateway
        .as_ref()
        .ok_or_else(|| ApiError::ExternalService("Payment gateway not configured".into()))?;

    if body.amount <= 0 {
        return Err(ApiError::BadRequest("Order amount must be positive".into()));
    }

    // The gateway expects amounts in the smallest currency unit.
    let amount_minor = body
        .amount
        .checked_mul(100)
        .ok_or_else(|| ApiError::BadRequest("Order amount is too large".into()))?;

    let receipt = format!("rcpt_{}", uuid::Uuid::new_v4().simple());

    let order = gateway
        .create_order(amount_minor, CURRENCY, &receipt)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %auth.user_id, error = %e, "Order creation failed");
            ApiError::ExternalService("Failed to create payment order".into())
        })?;

    tracing::info!(user_id = %auth.user_id, order_id = %order.id, "Payment order created");

    Ok(Json(order))
}

/// Payment verification request.
#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    /// Gateway order reference.
    pub order_id: String,
    /// Gateway payment reference.
    pub payment_id: String,
    /// Signature supplied by the gateway callback.
    pub signature: String,
    /// Plan the payment was for.
    pub plan_id: String,
}

/// Verify a completed payment and grant the purchased plan.
pub async fn verify_payment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<VerifyPaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResult>), ApiError> {
    let gateway = state
        .gateway
        .as_ref()
        .ok_or_else(|| ApiError::ExternalService("Payment gateway not configured".into()))?;

    if !gateway.verify_signature(&body.order_id, &body.payment_id, &body.signature) {
        tracing::warn!(
            user_id = %auth.user_id,
            order_id = %body.order_id,
            "Payment signature verification failed"
        );
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(PaymentResult::failure("Payment verification failed")),
        ));
    }

    let Some(offer) = PlanOffer::for_plan_id(&body.plan_id) else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(PaymentResult::failure("Invalid plan selected")),
        ));
    };

    match grant_plan(&state, &auth, offer) {
        Ok(account) => {
            tracing::info!(
                user_id = %auth.user_id,
                order_id = %body.order_id,
                plan_id = %offer.plan_id,
                "Verified payment applied"
            );
            Ok((StatusCode::OK, Json(PaymentResult::purchased(&account, offer))))
        }
        Err(e) => {
            tracing::error!(user_id = %auth.user_id, error = %e, "Verified payment grant failed");
            Ok((
                StatusCode::BAD_REQUEST,
                Json(PaymentResult::failure(e.to_string())),
            ))
        }
    }
}

/// Grant a plan's credits and record the transaction.
fn grant_plan(
    state: &AppState,
    auth: &AuthUser,
    offer: &PlanOffer,
) -> Result<CreditAccount, ApiError> {
    let (email, name) = purchaser_snapshot(state, auth)?;

    let transaction = PaymentTransaction::success(
        auth.user_id,
        offer.plan_id.to_string(),
        offer.amount,
        CURRENCY.to_string(),
        offer.credits,
        email,
        name,
    );

    Ok(state
        .store
        .add_credits(&auth.user_id, offer.credits, offer.plan, &transaction)?)
}

/// Email and display name snapshotted into the transaction record.
///
/// The stored profile wins; identity claims are the fallback for users who
/// never saved one.
fn purchaser_snapshot(state: &AppState, auth: &AuthUser) -> Result<(String, String), ApiError> {
    if let Some(profile) = state.store.get_profile(&auth.user_id)? {
        return Ok((profile.email.clone(), profile.display_name()));
    }

    Ok((
        auth.email.clone().unwrap_or_default(),
        auth.display_name.clone().unwrap_or_default(),
    ))
}

/// Transaction history entry.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: String,
    /// Purchased plan identifier.
    pub plan_id: String,
    /// Price charged.
    pub amount: i64,
    /// Currency of `amount`.
    pub currency: String,
    /// Outcome of the payment.
    pub status: TransactionStatus,
    /// Credits granted.
    pub credits_added: i64,
    /// When the transaction was recorded.
    pub created_at: String,
}

impl From<&PaymentTransaction> for TransactionResponse {
    fn from(tx: &PaymentTransaction) -> Self {
        Self {
            id: tx.id.to_string(),
            plan_id: tx.plan_id.clone(),
            amount: tx.amount,
            currency: tx.currency.clone(),
            status: tx.status,
            credits_added: tx.credits_added,
            created_at: tx.created_at.to_rfc3339(),
        }
    }
}

/// List the current user's successful transactions, newest first.
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Vec<TransactionResponse>>, ApiError> {
    let transactions = state.store.list_transactions_by_user(&auth.user_id)?;

    Ok(Json(
        transactions
            .iter()
            .filter(|tx| tx.status == TransactionStatus::Success)
            .map(TransactionResponse::from)
            .collect(),
    ))
}
