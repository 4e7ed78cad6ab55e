//! Inference provider boundary: the error taxonomy, the provider trait, a
//! concrete OpenAI-compatible HTTP provider, and the ordered model fallback
//! chain.
//!
//! Error policy is two-tier and deliberate: a rate limit is provider-specific
//! and transient, so the chain moves on to the next model; any other
//! transport/protocol error usually means a systemic problem (bad key, dead
//! network) that the next model would hit too, so the chain aborts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::fallback::{first_success, ChainError};

/// A model reply must be strictly longer than this (after trimming) to be
/// accepted as usable.
pub const MIN_USABLE_REPLY_CHARS: usize = 10;

/// Errors a provider call can produce.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Non-fatal: the chain advances to the next model.
    #[error("rate limited by provider for model {model}")]
    RateLimited { model: String },
    /// Fatal: aborts the whole chain attempt.
    #[error("transport error: {message}")]
    Transport { message: String },
    /// Non-fatal: the model answered, but with nothing usable.
    #[error("unusable reply from model {model}")]
    UnusableReply { model: String },
}

impl ProviderError {
    /// Whether the fallback chain should keep trying further models.
    pub fn is_non_fatal(&self) -> bool {
        !matches!(self, ProviderError::Transport { .. })
    }
}

/// Boundary to an inference backend. One implementation serves every model
/// identifier in the configured chain.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Issue a single completion request against `model`.
    async fn call(&self, model: &str, prompt: &str, max_tokens: u32)
        -> Result<String, ProviderError>;

    /// Backend name for diagnostics.
    fn name(&self) -> &'static str;
}

// ------------------------------------------------------------
// Model fallback chain
// ------------------------------------------------------------

/// Tries an ordered list of model identifiers against one provider, stopping
/// at the first usable reply.
pub struct ModelChain<P: InferenceProvider> {
    provider: P,
    models: Vec<String>,
}

impl<P: InferenceProvider> ModelChain<P> {
    pub fn new(provider: P, models: Vec<String>) -> Self {
        Self { provider, models }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn provider_ref(&self) -> &P {
        &self.provider
    }

    /// Run the chain for one prompt. Rate limits and unusable replies advance
    /// to the next model; a transport error aborts immediately.
    pub async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, ChainError<ProviderError>> {
        first_success(
            self.models.iter(),
            |model| async move {
                let text = self.provider.call(model, prompt, max_tokens).await?;
                let trimmed = text.trim();
                if trimmed.chars().count() <= MIN_USABLE_REPLY_CHARS {
                    debug!(model = %model, len = trimmed.len(), "reply below sanity threshold");
                    return Err(ProviderError::UnusableReply {
                        model: model.clone(),
                    });
                }
                debug!(model = %model, "accepted model reply");
                Ok(trimmed.to_string())
            },
            |e: &ProviderError| {
                if e.is_non_fatal() {
                    warn!(error = %e, "model attempt failed, trying next");
                    true
                } else {
                    false
                }
            },
        )
        .await
    }
}

// ------------------------------------------------------------
// OpenAI-compatible HTTP provider
// ------------------------------------------------------------

/// Chat-completions provider for any OpenAI-compatible endpoint.
pub struct OpenAiCompatProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiCompatProvider {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("feed-engagement-engine/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(20))
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl InferenceProvider for OpenAiCompatProvider {
    async fn call(
        &self,
        model: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, ProviderError> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_tokens: u32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        if self.api_key.is_empty() {
            return Err(ProviderError::Transport {
                message: "missing api key".to_string(),
            });
        }

        let req = Req {
            model,
            messages: vec![Msg {
                role: "user",
                content: prompt,
            }],
            temperature: 0.2,
            max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .map_err(|e| ProviderError::Transport {
                message: e.to_string(),
            })?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                model: model.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ProviderError::Transport {
                message: format!("{url} returned {status}"),
            });
        }

        let body: Resp = resp.json().await.map_err(|e| ProviderError::Transport {
            message: format!("malformed provider response: {e}"),
        })?;

        Ok(body
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "openai-compat"
    }
}

// ------------------------------------------------------------
// Scripted provider (tests, offline runs)
// ------------------------------------------------------------

/// Deterministic provider for tests: each model id maps to a scripted
/// outcome, and every call is recorded.
#[derive(Default)]
pub struct ScriptedProvider {
    script: Mutex<HashMap<String, Result<String, ProviderError>>>,
    calls: AtomicUsize,
    called_models: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, model: &str, outcome: Result<&str, ProviderError>) -> Self {
        self.script
            .lock()
            .expect("script mutex poisoned")
            .insert(model.to_string(), outcome.map(str::to_string));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn called_models(&self) -> Vec<String> {
        self.called_models
            .lock()
            .expect("calls mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl InferenceProvider for ScriptedProvider {
    async fn call(
        &self,
        model: &str,
        _prompt: &str,
        _max_tokens: u32,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.called_models
            .lock()
            .expect("calls mutex poisoned")
            .push(model.to_string());
        self.script
            .lock()
            .expect("script mutex poisoned")
            .get(model)
            .cloned()
            .unwrap_or_else(|| {
                Err(ProviderError::Transport {
                    message: format!("no script for model {model}"),
                })
            })
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
