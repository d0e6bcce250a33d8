//! Service configuration loaded from the environment at startup.
//!
//! Only this module reads process environment. Everything downstream receives
//! an [`AppConfig`] or a [`CredentialSet`] explicitly.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use thiserror::Error;

pub const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";
pub const XAI_KEY_VAR: &str = "XAI_API_KEY";
pub const DEEPSEEK_KEY_VAR: &str = "DEEPSEEK_API_KEY";
pub const DASHSCOPE_KEY_VAR: &str = "DASHSCOPE_API_KEY";
pub const GOOGLE_KEY_VAR: &str = "GOOGLE_GENERATIVE_AI_API_KEY";

const PROVIDER_KEY_VARS: [&str; 5] = [
    OPENAI_KEY_VAR,
    XAI_KEY_VAR,
    DEEPSEEK_KEY_VAR,
    DASHSCOPE_KEY_VAR,
    GOOGLE_KEY_VAR,
];

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_FALLBACK_DELAY_MS: u64 = 1500;
const DEFAULT_ORIGINS: [&str; 3] = [
    "http://localhost:3000",
    "http://localhost:8080",
    "http://127.0.0.1:8080",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a number, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

/// Server-side provider keys, indexed by environment variable name.
#[derive(Debug, Clone, Default)]
pub struct CredentialSet {
    keys: HashMap<String, String>,
}

impl CredentialSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every known provider key variable. Empty values are ignored.
    pub fn from_env() -> Self {
        let mut set = Self::new();
        for name in PROVIDER_KEY_VARS {
            if let Ok(value) = env::var(name) {
                set.insert(name, value);
            }
        }
        set
    }

    pub fn insert(&mut self, env_name: impl Into<String>, key: impl Into<String>) {
        let key = key.into();
        if !key.trim().is_empty() {
            self.keys.insert(env_name.into(), key.trim().to_string());
        }
    }

    pub fn with(mut self, env_name: impl Into<String>, key: impl Into<String>) -> Self {
        self.insert(env_name, key);
        self
    }

    pub fn get(&self, env_name: &str) -> Option<&str> {
        self.keys.get(env_name).map(String::as_str)
    }

    /// Caller-supplied key first, then the backend's server-side key.
    pub fn resolve(&self, caller_key: Option<&str>, env_name: &str) -> Option<String> {
        caller_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .or_else(|| self.get(env_name).map(str::to_string))
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Names of the configured variables, for startup logging.
    pub fn configured(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.keys.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for one backend call.
    pub request_timeout: Duration,
    /// Simulated processing time before the canned letter is returned.
    pub fallback_delay: Duration,
    pub allowed_origins: Vec<String>,
    pub credentials: CredentialSet,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            fallback_delay: Duration::from_millis(DEFAULT_FALLBACK_DELAY_MS),
            allowed_origins: DEFAULT_ORIGINS.iter().map(|s| s.to_string()).collect(),
            credentials: CredentialSet::new(),
        }
    }
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let allowed_origins = match env::var("ALLOWED_ORIGINS") {
            Ok(value) => value
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
            Err(_) => defaults.allowed_origins,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            request_timeout: Duration::from_secs(parse_var(
                "LLM_REQUEST_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
            fallback_delay: Duration::from_millis(parse_var(
                "FALLBACK_DELAY_MS",
                DEFAULT_FALLBACK_DELAY_MS,
            )?),
            allowed_origins,
            credentials: CredentialSet::from_env(),
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        Err(_) => Ok(default),
    }
}
