//! Client configuration from the environment.

use std::time::Duration;

use anyhow::{Context, bail};

pub const API_URL_ENV: &str = "FLOGIN_API_URL";
pub const AUTH_TOKEN_ENV: &str = "FLOGIN_AUTH_TOKEN";
pub const TIMEOUT_ENV: &str = "FLOGIN_HTTP_TIMEOUT_SECS";

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the catalog API, without a trailing slash.
    pub api_url: String,
    /// Bearer token sent with catalog requests.
    pub auth_token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl core::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or empty values take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut config = Self::default();

        if let Some(url) = get(API_URL_ENV) {
            config = config.with_api_url(&url)?;
        }

        config.auth_token = get(AUTH_TOKEN_ENV);

        if let Some(raw) = get(TIMEOUT_ENV) {
            let secs: u64 = raw
                .parse()
                .with_context(|| format!("{TIMEOUT_ENV} must be a whole number of seconds, got {raw:?}"))?;
            if secs == 0 {
                bail!("{TIMEOUT_ENV} must be greater than zero");
            }
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Replace the base URL after checking it is an absolute http(s) URL.
    pub fn with_api_url(mut self, url: &str) -> anyhow::Result<Self> {
        let parsed = reqwest::Url::parse(url).with_context(|| format!("invalid API URL {url:?}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("API URL must use http or https, got {url:?}");
        }
        self.api_url = url.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}
