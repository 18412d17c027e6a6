use std::sync::Arc;
use std::time::Duration;

use rankforge_core::credentials::{CredentialCipher, CredentialError};
use rankforge_integrations::page_fetch::PageFetcher;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: rankforge_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Outbound HTTP client shared by every integration.
    pub http: reqwest::Client,
    /// Audit page fetcher with its own redirect-checked client.
    pub fetcher: PageFetcher,
    /// Cipher for workspace integration credentials.
    pub cipher: Arc<CredentialCipher>,
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Invalid credentials secret: {0}")]
    Cipher(#[from] CredentialError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl AppState {
    pub fn new(pool: rankforge_db::DbPool, config: ServerConfig) -> Result<Self, StateError> {
        let cipher = CredentialCipher::new(&config.credentials_secret)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.outbound_timeout_secs))
            .build()?;
        let fetcher = PageFetcher::new(config.allow_private_fetch)?;

        Ok(Self {
            pool,
            config: Arc::new(config),
            http,
            fetcher,
            cipher: Arc::new(cipher),
        })
    }
}
