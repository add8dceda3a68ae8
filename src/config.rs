//! Client configuration, read from the environment (and `.env` when present).

use std::env;

use crate::render::DEFAULT_PAGE_SIZE;
use crate::{Result, StorefrontError};

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base of the REST API, including the `/api` path.
    pub api_url: String,
    /// Products revealed per window step.
    pub page_size: usize,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let api_url = lookup("STOREFRONT_API_URL").unwrap_or(defaults.api_url);
        check_api_url(&api_url)?;

        let page_size = match lookup("STOREFRONT_PAGE_SIZE") {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|e| StorefrontError::Config(format!("Invalid STOREFRONT_PAGE_SIZE: {e}")))?,
            None => defaults.page_size,
        };
        if page_size == 0 {
            return Err(StorefrontError::Config("STOREFRONT_PAGE_SIZE must be greater than zero".into()));
        }

        let timeout_secs = match lookup("STOREFRONT_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| StorefrontError::Config(format!("Invalid STOREFRONT_TIMEOUT_SECS: {e}")))?,
            None => defaults.timeout_secs,
        };

        tracing::debug!(%api_url, page_size, timeout_secs, "client configuration loaded");
        Ok(Self { api_url, page_size, timeout_secs })
    }

    /// Replaces the API base URL, applying the same check as the environment value.
    pub fn with_api_url(self, api_url: impl Into<String>) -> Result<Self> {
        let api_url = api_url.into();
        check_api_url(&api_url)?;
        Ok(Self { api_url, ..self })
    }
}

fn check_api_url(api_url: &str) -> Result<()> {
    if api_url.starts_with("http://") || api_url.starts_with("https://") {
        Ok(())
    } else {
        Err(StorefrontError::Config(format!("API URL must be an http(s) URL, got '{api_url}'")))
    }
}
