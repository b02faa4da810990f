//! `woo setup`: persist store credentials.
//!
//! Writes `{domain, consumer_key, consumer_secret}` to the settings file
//! (`WOO_SETTINGS_FILE`, default `woo-settings.json`). Environment variables
//! still take precedence over the file when both are set.

use std::path::PathBuf;

use woo_storefront::config::{DEFAULT_SETTINGS_FILE, StoredSettings, save_settings};
use woo_storefront::{ConfigError, Credentials, WooConfig};

/// Validate and save credentials.
///
/// # Errors
///
/// Returns `ConfigError` if a credential is blank or looks like a
/// placeholder, or if the file cannot be written.
pub fn save(domain: &str, key: &str, secret: &str) -> Result<(), ConfigError> {
    dotenvy::dotenv().ok();

    let credentials = Credentials::new(domain.trim(), key.trim(), secret.trim());
    if credentials.is_incomplete() {
        return Err(ConfigError::InvalidEnvVar(
            "credentials".to_string(),
            "domain, key and secret are all required".to_string(),
        ));
    }
    WooConfig::validate_credentials(&credentials)?;

    let path = std::env::var("WOO_SETTINGS_FILE")
        .map_or_else(|_| PathBuf::from(DEFAULT_SETTINGS_FILE), PathBuf::from);
    let settings = StoredSettings {
        domain: domain.trim().to_string(),
        consumer_key: key.trim().to_string(),
        consumer_secret: secret.trim().to_string(),
    };
    save_settings(&path, &settings)?;

    tracing::info!(path = %path.display(), domain = %settings.domain, "Saved store credentials");
    Ok(())
}
