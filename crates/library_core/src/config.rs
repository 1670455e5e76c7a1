//! Store connection configuration.
//!
//! # Responsibility
//! - Resolve the hosted store endpoint and credential from the environment.
//! - Reject incomplete configuration before any store call is made.
//!
//! # Invariants
//! - `url` has no trailing `/` and uses `http` or `https`.
//! - The API key never appears in `Debug` output or logs.

use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::time::Duration;

/// Environment variable holding the store endpoint.
pub const URL_ENV: &str = "SUPABASE_URL";
/// Environment variable holding the store access key.
pub const KEY_ENV: &str = "SUPABASE_KEY";
/// Optional override for the catalog table name.
pub const TABLE_ENV: &str = "LIBRARY_TABLE";

/// Logical collection holding book rows.
pub const DEFAULT_TABLE: &str = "library-management";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fatal startup configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidUrl(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingVar(name) => write!(f, "required environment variable `{name}` is not set"),
            Self::InvalidUrl(value) => {
                write!(f, "store url must start with http:// or https://, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Connection settings for `RestRecordStore`.
#[derive(Clone)]
pub struct StoreConfig {
    /// Store endpoint, e.g. `https://project.supabase.co`.
    pub url: String,
    /// Access key sent as `apikey` and bearer token.
    pub api_key: String,
    /// Table holding book rows.
    pub table: String,
    /// Per-request transport timeout.
    pub timeout: Duration,
}

impl StoreConfig {
    /// Creates a configuration for the default table.
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let url = normalize_url(url.into())?;
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(ConfigError::MissingVar(KEY_ENV));
        }

        Ok(Self {
            url,
            api_key,
            table: DEFAULT_TABLE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &'static str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let url = read(URL_ENV).ok_or(ConfigError::MissingVar(URL_ENV))?;
        let api_key = read(KEY_ENV).ok_or(ConfigError::MissingVar(KEY_ENV))?;
        let config = Self::new(url, api_key)?;

        Ok(match read(TABLE_ENV) {
            Some(table) => config.with_table(table),
            None => config,
        })
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Debug for StoreConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("table", &self.table)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn normalize_url(url: String) -> Result<String, ConfigError> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::MissingVar(URL_ENV));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidUrl(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, StoreConfig, DEFAULT_TABLE, KEY_ENV, TABLE_ENV, URL_ENV};
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn reads_url_and_key_with_default_table() {
        let config = StoreConfig::from_lookup(lookup(&[
            (URL_ENV, " https://demo.supabase.co/ "),
            (KEY_ENV, "secret-key"),
        ]))
        .unwrap();

        assert_eq!(config.url, "https://demo.supabase.co");
        assert_eq!(config.api_key, "secret-key");
        assert_eq!(config.table, DEFAULT_TABLE);
    }

    #[test]
    fn missing_or_blank_values_are_fatal() {
        let err = StoreConfig::from_lookup(lookup(&[(KEY_ENV, "k")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingVar(URL_ENV));

        let err = StoreConfig::from_lookup(lookup(&[(URL_ENV, "https://x.io"), (KEY_ENV, "  ")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingVar(KEY_ENV));
    }

    #[test]
    fn rejects_non_http_url() {
        let err = StoreConfig::from_lookup(lookup(&[(URL_ENV, "ftp://x.io"), (KEY_ENV, "k")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl(_)));
    }

    #[test]
    fn table_override_and_redacted_debug() {
        let config = StoreConfig::from_lookup(lookup(&[
            (URL_ENV, "http://localhost:54321"),
            (KEY_ENV, "secret-key"),
            (TABLE_ENV, "books"),
        ]))
        .unwrap();

        assert_eq!(config.table, "books");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("<redacted>"));
    }
}
