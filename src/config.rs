//! config.rs — Engagement configuration: ordered model list, provider
//! endpoint, score thresholds and pre-filter bounds.
//!
//! Loaded from TOML (path overridable via env), with serde defaults so a
//! partial file works, and light sanitization so a bad file degrades to
//! sane values instead of failing the run.

use std::{env, fs, path::Path};

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/engagement.toml";
pub const ENV_CONFIG_PATH: &str = "ENGAGE_CONFIG_PATH";
/// Read when `api_key = "ENV"` in the file.
pub const ENV_API_KEY: &str = "ENGAGE_API_KEY";

fn default_like() -> u8 {
    6
}
fn default_comment() -> u8 {
    9
}
fn default_job_comment() -> u8 {
    7
}

/// Score thresholds for the post decision policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum like score that triggers a like.
    #[serde(default = "default_like")]
    pub like: u8,
    /// Minimum comment score that triggers a comment.
    #[serde(default = "default_comment")]
    pub comment: u8,
    /// Lower comment bar applied to job posts.
    #[serde(default = "default_job_comment")]
    pub job_comment: u8,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            like: default_like(),
            comment: default_comment(),
            job_comment: default_job_comment(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_models() -> Vec<String> {
    vec!["gpt-4o-mini".to_string(), "gpt-4o".to_string()]
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_api_key() -> String {
    "ENV".to_string()
}
fn default_max_tokens() -> u32 {
    250
}
fn default_min_content_chars() -> usize {
    20
}
fn default_ack_max_chars() -> usize {
    40
}
fn default_ack_max_words() -> usize {
    3
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementConfig {
    /// When false, the engine runs heuristic-only (no provider calls).
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Ordered fallback chain of model identifiers (2–4 entries typical).
    #[serde(default = "default_models")]
    pub models: Vec<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Literal key, or "ENV" to read `ENGAGE_API_KEY`.
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub thresholds: Thresholds,
    /// Content shorter than this is given a zero-engagement result.
    #[serde(default = "default_min_content_chars")]
    pub min_content_chars: usize,
    /// Pre-filter bounds for the acknowledgment short-circuit.
    #[serde(default = "default_ack_max_chars")]
    pub ack_max_chars: usize,
    #[serde(default = "default_ack_max_words")]
    pub ack_max_words: usize,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            models: default_models(),
            base_url: default_base_url(),
            api_key: default_api_key(),
            max_tokens: default_max_tokens(),
            thresholds: Thresholds::default(),
            min_content_chars: default_min_content_chars(),
            ack_max_chars: default_ack_max_chars(),
            ack_max_words: default_ack_max_words(),
        }
    }
}

impl EngagementConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        let mut cfg: EngagementConfig = toml::from_str(&data)?;
        cfg.sanitize();

        // Resolve api key indirection only when providers will be used.
        if cfg.enabled && cfg.api_key.trim().eq_ignore_ascii_case("env") {
            cfg.api_key = env::var(ENV_API_KEY)
                .map_err(|_| anyhow::anyhow!("Missing {ENV_API_KEY} env var"))?;
        }

        Ok(cfg)
    }

    /// Load from `ENGAGE_CONFIG_PATH` (or the default path), degrading to
    /// defaults with a warning when the file is absent or broken.
    pub fn load_or_default() -> Self {
        let path = env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        match Self::load_from_file(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "engagement config unavailable, using defaults");
                let mut cfg = Self::default();
                // No key to resolve, so run heuristic-only.
                cfg.enabled = false;
                cfg
            }
        }
    }

    fn sanitize(&mut self) {
        self.thresholds.like = self.thresholds.like.min(10);
        self.thresholds.comment = self.thresholds.comment.min(10);
        self.thresholds.job_comment = self.thresholds.job_comment.min(10);
        if self.models.is_empty() {
            self.models = default_models();
        }
        if self.max_tokens == 0 {
            self.max_tokens = default_max_tokens();
        }
        if self.ack_max_words == 0 {
            self.ack_max_words = default_ack_max_words();
        }
    }
}
