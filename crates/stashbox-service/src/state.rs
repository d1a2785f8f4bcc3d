//! Application state.

use std::sync::Arc;

use stashbox_store::RocksStore;

use crate::blobs::BlobStore;
use crate::config::ServiceConfig;
use crate::gateway::GatewayClient;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<RocksStore>,

    /// Byte storage for uploaded files.
    pub blobs: Arc<BlobStore>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Payment gateway client (optional).
    pub gateway: Option<Arc<GatewayClient>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<RocksStore>, blobs: Arc<BlobStore>, config: ServiceConfig) -> Self {
        // Create gateway client if configured
        let gateway = config
            .gateway_key_id
            .as_ref()
            .zip(config.gateway_key_secret.as_ref())
            .map(|(key_id, key_secret)| {
                tracing::info!(gateway_url = %config.gateway_base_url, "Payment gateway enabled");
                Arc::new(GatewayClient::new(
                    config.gateway_base_url.clone(),
                    key_id.clone(),
                    key_secret.clone(),
                ))
            });

        if gateway.is_none() {
            tracing::warn!("Payment gateway not configured - order/verify endpoints disabled");
        }

        Self {
            store,
            blobs,
            config,
            gateway,
        }
    }
}
