//! Runtime configuration
//!
//! Everything the services need is passed in explicitly; nothing reads
//! the environment after construction. `AppConfig::from_env` is called by
//! the binaries at startup and again when the advisor is refreshed.

use crate::error::DashboardError;
use crate::Result;
use std::env;
use std::time::Duration;

const PLACEHOLDER_KEY: &str = "your_gemini_api_key_here";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_TIMEOUT_SECS: u64 = 8;
const DEFAULT_HISTORY_EXCHANGES: usize = 10;
const DEFAULT_PORT: u16 = 8080;

/// Sampling settings sent with every generation request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: i32,
    pub max_output_tokens: i32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 1024,
        }
    }
}

/// Advisor configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisorConfig {
    /// Remote provider credential; `None` disables the remote path
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// Upper bound for the single remote attempt
    pub request_timeout: Duration,
    /// Number of user/advisor exchanges kept for prompt context
    pub history_exchanges: usize,
    pub generation: GenerationSettings,
}

impl AdvisorConfig {
    /// Config with no credential: the advisor answers from templates only
    pub fn offline() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            history_exchanges: DEFAULT_HISTORY_EXCHANGES,
            generation: GenerationSettings::default(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = normalize_key(Some(api_key.into()));
        self
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn from_env() -> Result<Self> {
        let defaults = Self::offline();

        Ok(Self {
            api_key: normalize_key(env::var("GEMINI_API_KEY").ok()),
            model: env::var("GEMINI_MODEL").unwrap_or(defaults.model),
            base_url: env::var("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            request_timeout: parse_var::<u64>("ADVISOR_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            history_exchanges: parse_var::<usize>("ADVISOR_HISTORY_EXCHANGES")?
                .unwrap_or(defaults.history_exchanges),
            generation: defaults.generation,
        })
    }
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self::offline()
    }
}

/// Top-level configuration for the binaries
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub advisor: AdvisorConfig,
    pub api_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let api_port = match env::var("PORT").or_else(|_| env::var("API_PORT")) {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| DashboardError::Config(format!("invalid port: {}", raw)))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            advisor: AdvisorConfig::from_env()?,
            api_port,
        })
    }
}

/// Empty and placeholder keys count as "not configured"
fn normalize_key(key: Option<String>) -> Option<String> {
    key.map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && k != PLACEHOLDER_KEY)
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| DashboardError::Config(format!("{} is not a valid number: {}", name, raw))),
        Err(_) => Ok(None),
    }
}
