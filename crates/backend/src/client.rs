//! Authenticated HTTP clients for the remote provider families.
//!
//! Every family speaks the same OpenAI-compatible chat-completion wire shape;
//! only the base URL and credential differ, so one generic API executor is
//! served by parameterizing the client.

use async_trait::async_trait;
use counsel_config::Config;
use counsel_types::{CounselError, ProviderId, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Base endpoint for a family's OpenAI-compatible chat-completion API.
#[must_use]
pub fn base_url(provider: ProviderId) -> &'static str {
    match provider {
        ProviderId::OpenAi => "https://api.openai.com/v1",
        ProviderId::Google => "https://generativelanguage.googleapis.com/v1beta/openai",
        ProviderId::XAi => "https://api.x.ai/v1",
        ProviderId::DeepSeek => "https://api.deepseek.com/v1",
    }
}

/// Sends one chat-completion request body and returns the parsed response.
///
/// Seam between the API executor and the network; the executor never builds
/// URLs or headers itself.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// POSTs the body to the provider's `/chat/completions` endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`CounselError::Upstream`] on a non-success status, or a
    /// transport/parse error if the request fails.
    async fn chat(&self, body: &Value) -> Result<Value>;
}

/// Concrete [`ChatClient`] over one provider family's HTTP endpoint.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    /// Creates a client for the family's well-known endpoint.
    #[must_use]
    pub fn new(provider: ProviderId, api_key: String) -> Self {
        Self::with_base_url(base_url(provider).to_string(), api_key)
    }

    /// Creates a client against an explicit base URL.
    #[must_use]
    pub fn with_base_url(base_url: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl ChatClient for ApiClient {
    async fn chat(&self, body: &Value) -> Result<Value> {
        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(CounselError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(resp.json().await?)
    }
}

/// Lazily constructs and caches one authenticated client per family.
///
/// First call for a family constructs and caches; later calls return the
/// same instance for the process lifetime. Construction is idempotent and
/// side-effect free, so a concurrent first access at worst duplicates work.
#[derive(Default)]
pub struct ClientFactory {
    clients: Mutex<HashMap<ProviderId, Arc<ApiClient>>>,
}

impl ClientFactory {
    /// Creates an empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached client for the family, constructing it on first
    /// use.
    ///
    /// # Errors
    ///
    /// Returns [`CounselError::MissingApiKey`] immediately when no credential
    /// is configured for the family, rather than deferring to first request.
    pub fn get(&self, provider: ProviderId, config: &Config) -> Result<Arc<ApiClient>> {
        if let Ok(clients) = self.clients.lock()
            && let Some(client) = clients.get(&provider)
        {
            return Ok(Arc::clone(client));
        }
        let api_key = config
            .api_key(provider)
            .ok_or(CounselError::MissingApiKey {
                provider,
                key: provider.api_key_var(),
            })?;
        let client = Arc::new(ApiClient::new(provider, api_key));
        if let Ok(mut clients) = self.clients.lock() {
            clients.entry(provider).or_insert_with(|| Arc::clone(&client));
        }
        Ok(client)
    }
}

// ── Test support ──────────────────────────────────────────────────────────────
