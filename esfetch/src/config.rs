//! Client configuration
//!
//! Loaded from a TOML file, from `ELASTIC_*` environment variables, or both:
//!
//! ```toml
//! base_url = "https://search.example.com:9200"
//! index = "articles"
//! doc_type = "_doc"
//! timeout_ms = 10000
//!
//! [credentials]
//! user = "reader"
//! password = "secret"
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

pub const ENV_URL: &str = "ELASTIC_URL";
pub const ENV_INDEX: &str = "ELASTIC_INDEX";
pub const ENV_TYPE: &str = "ELASTIC_TYPE";
pub const ENV_TIMEOUT_MS: &str = "ELASTIC_TIMEOUT_MS";
pub const ENV_USER: &str = "ELASTIC_USER";
pub const ENV_PASS: &str = "ELASTIC_PASS";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ElasticConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub index: String,
    #[serde(default = "default_doc_type")]
    pub doc_type: String,
    /// Per-request timeout, applied to clients built by `Elastic::new`
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

fn default_base_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_doc_type() -> String {
    "_doc".to_string()
}

fn default_timeout_ms() -> u64 {
    30000
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            index: String::new(),
            doc_type: default_doc_type(),
            timeout_ms: default_timeout_ms(),
            credentials: None,
        }
    }
}

/// Basic-auth credentials
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Credentials {
    #[serde(default)]
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Read `ELASTIC_USER` / `ELASTIC_PASS`.
    ///
    /// Returns `None` unless the password is set and non-empty. The user may be
    /// empty; the server decides whether that is acceptable.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let password = lookup(ENV_PASS).filter(|p| !p.is_empty())?;
        let user = lookup(ENV_USER).unwrap_or_default();
        Some(Self { user, password })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl ElasticConfig {
    pub fn new(base_url: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            index: index.into(),
            ..Self::default()
        }
    }

    pub fn with_doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = doc_type.into();
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ElasticConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Build a config purely from `ELASTIC_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_URL) {
            config.base_url = url;
        }
        if let Some(index) = lookup(ENV_INDEX) {
            config.index = index;
        }
        if let Some(doc_type) = lookup(ENV_TYPE) {
            config.doc_type = doc_type;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_MS) {
            config.timeout_ms = timeout
                .parse()
                .map_err(|_| Error::Config(format!("{} is not a number: {}", ENV_TIMEOUT_MS, timeout)))?;
        }
        config.credentials = Credentials::from_lookup(&lookup);
        Ok(config)
    }

    /// Overlay credentials from the environment, keeping file credentials when
    /// the environment has none.
    pub fn with_env_credentials(mut self) -> Self {
        if let Some(credentials) = Credentials::from_env() {
            self.credentials = Some(credentials);
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
