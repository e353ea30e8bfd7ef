use std::future::Future;

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::spotify::models::TokenResponse;

/// Anything able to hand out a bearer token for the catalog API.
pub trait CredentialProvider: Send + Sync {
    fn access_token(&self) -> impl Future<Output = Result<String>> + Send;
}

/// Whether tokens are reused between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCachePolicy {
    /// Fetch a new token on every call.
    AlwaysFresh,
    /// Reuse a token until `leeway` before it expires.
    Cached { leeway: TimeDelta },
}

impl TokenCachePolicy {
    pub fn cached() -> Self {
        TokenCachePolicy::Cached {
            leeway: TimeDelta::seconds(30),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// OAuth client-credentials flow against the catalog's token endpoint.
pub struct ClientCredentialsProvider {
    http_client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    policy: TokenCachePolicy,
    cache: Mutex<Option<CachedToken>>,
}

impl ClientCredentialsProvider {
    pub fn new(http_client: Client, config: &Config) -> Self {
        let policy = if config.token_cache {
            TokenCachePolicy::cached()
        } else {
            TokenCachePolicy::AlwaysFresh
        };

        Self {
            http_client,
            token_url: config.token_url.clone(),
            client_id: config.spotify_client_id.clone(),
            client_secret: config.spotify_client_secret.clone(),
            policy,
            cache: Mutex::new(None),
        }
    }

    pub fn with_policy(mut self, policy: TokenCachePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> TokenCachePolicy {
        self.policy
    }

    async fn request_token(&self) -> Result<CachedToken> {
        let response = self
            .http_client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Auth(format!(
                "Token request failed ({}): {}",
                status, error_text
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("Failed to parse token response: {}", e)))?;

        let value = token
            .access_token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::Auth("Token response carried no access token".into()))?;

        let lifetime = token
            .expires_in
            .and_then(TimeDelta::try_seconds)
            .unwrap_or_default();

        let expires_at = Utc::now().checked_add_signed(lifetime).ok_or_else(|| {
            AppError::Auth(format!(
                "Token lifetime out of range: {}s",
                lifetime.num_seconds()
            ))
        })?;

        debug!("Obtained catalog token valid for {}s", lifetime.num_seconds());

        Ok(CachedToken { value, expires_at })
    }
}

impl CredentialProvider for ClientCredentialsProvider {
    async fn access_token(&self) -> Result<String> {
        let leeway = match self.policy {
            TokenCachePolicy::AlwaysFresh => {
                return self.request_token().await.map(|t| t.value);
            }
            TokenCachePolicy::Cached { leeway } => leeway,
        };

        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.as_ref() {
            let fresh_until = Utc::now().checked_add_signed(leeway);
            if fresh_until.is_some_and(|t| t < token.expires_at) {
                return Ok(token.value.clone());
            }
        }

        let token = self.request_token().await?;
        info!("Refreshed cached catalog token");
        let value = token.value.clone();
        *cache = Some(token);
        Ok(value)
    }
}
