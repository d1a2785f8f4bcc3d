//! Authentication extractors.
//!
//! This module provides the `AuthUser` extractor: a bearer token resolved
//! against the identity provider's userinfo endpoint. The resolved identity
//! is passed down to handlers explicitly; nothing below the HTTP layer reads
//! ambient authentication state.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::Deserialize;

use stashbox_core::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// Timeout for identity resolution requests.
const IDENTITY_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// An authenticated user resolved from a bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user ID.
    pub user_id: UserId,
    /// The raw subject claim from the token.
    pub subject: String,
    /// Email claim, when the provider supplies one.
    pub email: Option<String>,
    /// Display name assembled from the name claims.
    pub display_name: Option<String>,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            // Extract the Authorization header
            let auth_header = parts
                .headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .ok_or(ApiError::Unauthorized)?;

            // Extract the Bearer token
            let token = auth_header
                .strip_prefix("Bearer ")
                .ok_or(ApiError::Unauthorized)?;

            // Test tokens skip the identity provider. Only honored when the
            // configuration opts in; `from_env` never sets this.
            if state.config.allow_test_tokens {
                if let Some(user_id_str) = token.strip_prefix("test-token:") {
                    let user_id = user_id_str
                        .parse::<UserId>()
                        .map_err(|_| ApiError::Unauthorized)?;

                    return Ok(AuthUser {
                        user_id,
                        subject: user_id_str.to_string(),
                        email: None,
                        display_name: None,
                    });
                }
            }

            // Resolve the token against the identity provider
            let claims = resolve_identity(token, state).await?;

            let user_id = claims
                .sub
                .parse::<UserId>()
                .map_err(|_| ApiError::Unauthorized)?;

            let display_name = match (&claims.given_name, &claims.family_name) {
                (Some(first), Some(last)) => Some(format!("{first} {last}")),
                (Some(first), None) => Some(first.clone()),
                (None, Some(last)) => Some(last.clone()),
                (None, None) => None,
            };

            Ok(AuthUser {
                user_id,
                subject: claims.sub,
                email: claims.email,
                display_name,
            })
        })
    }
}

/// Claims returned by the identity provider's userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityClaims {
    /// Subject (user ID).
    pub sub: String,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Given name.
    #[serde(default)]
    pub given_name: Option<String>,
    /// Family name.
    #[serde(default)]
    pub family_name: Option<String>,
}

/// Shared HTTP client for identity resolution (lazily initialized).
///
/// Creating a new client per request is expensive; reusing it allows
/// connection pooling and reduces overhead.
static IDENTITY_CLIENT: std::sync::OnceLock<reqwest::Client> = std::sync::OnceLock::new();

fn identity_client() -> &'static reqwest::Client {
    IDENTITY_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(IDENTITY_FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    })
}

/// Resolve a bearer token to identity claims.
async fn resolve_identity(token: &str, state: &AppState) -> Result<IdentityClaims, ApiError> {
    let userinfo_url = format!("{}/userinfo", state.config.auth_base_url);

    let response = identity_client()
        .get(&userinfo_url)
        .bearer_auth(token)
        .send()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, url = %userinfo_url, "Failed to reach identity provider");
            ApiError::ExternalService("Failed to resolve identity".into())
        })?;

    if !response.status().is_success() {
        tracing::debug!(status = %response.status(), "Identity provider rejected token");
        return Err(ApiError::Unauthorized);
    }

    let claims: IdentityClaims = response.json().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to parse userinfo response");
        ApiError::ExternalService("Failed to parse identity response".into())
    })?;

    Ok(claims)
}
