//! Storefront configuration loaded from environment variables and the
//! persisted settings file.
//!
//! The configuration is built once at startup and passed explicitly into
//! [`crate::woocommerce::WooClient`]. Nothing below the CLI reads ambient
//! state.
//!
//! # Environment Variables
//!
//! ## Credentials (each falls back to the settings file)
//! - `WOO_DOMAIN` - Store domain (e.g., shop.example.com)
//! - `WOO_CONSUMER_KEY` - REST API consumer key (`ck_...`)
//! - `WOO_CONSUMER_SECRET` - REST API consumer secret (`cs_...`)
//!
//! ## Optional
//! - `WOO_SETTINGS_FILE` - Settings file path (default: woo-settings.json)
//! - `WOO_MAX_PAGES` - Page ceiling for full-collection fetches (default: 50)
//! - `WOO_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `WOO_PRODUCTS_PER_PAGE` - Shop grid page size (default: 9)
//! - `WOO_TOP_CLIENTS` - Size of top-client rankings (default: 10)
//!
//! Missing credentials are not a configuration error. They surface as
//! [`crate::StoreError::AuthMissing`] on the first fetch, so read-only
//! commands such as `woo setup` still work.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default settings file, relative to the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "woo-settings.json";

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
    #[error("Settings file {path}: {reason}")]
    Settings { path: PathBuf, reason: String },
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct WooConfig {
    /// REST API credentials, if any source provided all three parts
    pub credentials: Option<Credentials>,
    /// Limits applied to every request and collection fetch
    pub fetch: FetchLimits,
    /// Page sizes and ranking sizes for the views
    pub display: DisplayConfig,
    /// Where `woo setup` persists credentials
    pub settings_file: PathBuf,
}

/// WooCommerce REST API credentials.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct Credentials {
    /// Store domain, optionally with scheme (e.g., `http://localhost:8080`)
    pub domain: String,
    /// Consumer key (`ck_...`)
    pub consumer_key: SecretString,
    /// Consumer secret (`cs_...`)
    pub consumer_secret: SecretString,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("domain", &self.domain)
            .field("consumer_key", &"[REDACTED]")
            .field("consumer_secret", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Create credentials without validation.
    #[must_use]
    pub fn new(
        domain: impl Into<String>,
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            consumer_key: SecretString::from(consumer_key.into()),
            consumer_secret: SecretString::from(consumer_secret.into()),
        }
    }

    /// Whether any part is blank. Blank credentials are treated as missing.
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        self.domain.trim().is_empty()
            || self.consumer_key.expose_secret().trim().is_empty()
            || self.consumer_secret.expose_secret().trim().is_empty()
    }
}

/// Request and collection limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchLimits {
    /// Maximum number of non-empty pages a full-collection fetch may read
    pub max_pages: u32,
    /// Timeout applied to each HTTP request
    pub request_timeout: Duration,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            max_pages: 50,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// View sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Shop grid page size (server-paginated)
    pub products_per_page: u32,
    /// Order history page size (paged locally)
    pub orders_per_page: usize,
    /// Customer list page size (paged locally)
    pub customers_per_page: usize,
    /// Number of entries in each top-client ranking
    pub top_clients: usize,
    /// Number of products on the landing page
    pub featured_products: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            products_per_page: 9,
            orders_per_page: 20,
            customers_per_page: 10,
            top_clients: 10,
            featured_products: 4,
        }
    }
}

/// On-disk form of the credentials written by `woo setup`.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct StoredSettings {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub consumer_key: String,
    #[serde(default)]
    pub consumer_secret: String,
}

impl WooConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is malformed, the settings file is
    /// unreadable, or a credential looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings_file = lookup("WOO_SETTINGS_FILE")
            .map_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE), PathBuf::from);
        let stored = load_settings(&settings_file)?.unwrap_or_default();

        let pick = |key: &str, fallback: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string())
        };
        let credentials = Credentials::new(
            pick("WOO_DOMAIN", &stored.domain),
            pick("WOO_CONSUMER_KEY", &stored.consumer_key),
            pick("WOO_CONSUMER_SECRET", &stored.consumer_secret),
        );
        let credentials = if credentials.is_incomplete() {
            None
        } else {
            Self::validate_credentials(&credentials)?;
            Some(credentials)
        };

        let defaults = FetchLimits::default();
        let fetch = FetchLimits {
            max_pages: parse_or_default(&lookup, "WOO_MAX_PAGES", defaults.max_pages)?,
            request_timeout: Duration::from_secs(parse_or_default(
                &lookup,
                "WOO_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
        };
        if fetch.max_pages == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "WOO_MAX_PAGES".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        if fetch.request_timeout.is_zero() {
            return Err(ConfigError::InvalidEnvVar(
                "WOO_REQUEST_TIMEOUT_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let display_defaults = DisplayConfig::default();
        let display = DisplayConfig {
            products_per_page: parse_or_default(
                &lookup,
                "WOO_PRODUCTS_PER_PAGE",
                display_defaults.products_per_page,
            )?,
            top_clients: parse_or_default(&lookup, "WOO_TOP_CLIENTS", display_defaults.top_clients)?,
            ..display_defaults
        };

        Ok(Self {
            credentials,
            fetch,
            display,
            settings_file,
        })
    }
}

impl WooConfig {
    /// Check that the key pair looks like real WooCommerce REST keys.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InsecureSecret` if a key lacks its `ck_`/`cs_`
    /// prefix, matches a placeholder pattern, or has too little entropy.
    pub fn validate_credentials(credentials: &Credentials) -> Result<(), ConfigError> {
        validate_key(credentials.consumer_key.expose_secret(), "ck_", "WOO_CONSUMER_KEY")?;
        validate_key(
            credentials.consumer_secret.expose_secret(),
            "cs_",
            "WOO_CONSUMER_SECRET",
        )
    }
}

/// Read the settings file. A missing file is `Ok(None)`.
///
/// # Errors
///
/// Returns `ConfigError::Settings` if the file exists but cannot be read or
/// parsed.
pub fn load_settings(path: &Path) -> Result<Option<StoredSettings>, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::Settings {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| ConfigError::Settings {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Persist credentials to the settings file.
///
/// # Errors
///
/// Returns `ConfigError::Settings` if the file cannot be written.
pub fn save_settings(path: &Path, settings: &StoredSettings) -> Result<(), ConfigError> {
    let to_err = |reason: String| ConfigError::Settings {
        path: path.to_path_buf(),
        reason,
    };
    let json = serde_json::to_string_pretty(settings).map_err(|e| to_err(e.to_string()))?;
    std::fs::write(path, json).map_err(|e| to_err(e.to_string()))
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // Key length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate a consumer key or secret: expected prefix, no placeholder text,
/// and the random part must look random.
fn validate_key(value: &str, prefix: &str, var_name: &str) -> Result<(), ConfigError> {
    let Some(random_part) = value.strip_prefix(prefix) else {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("must start with '{prefix}'"),
        ));
    };

    let lower = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(random_part);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Copy the key from WooCommerce > Settings > Advanced > REST API."
            ),
        ));
    }

    Ok(())
}
