pub mod billing;
pub mod directory;

use std::time::Duration;

use anyhow::{Context, Result};

/// Timeout applied to every directory and billing request.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment variable holding the bearer token for the directory and
/// billing APIs.
pub const API_TOKEN_ENV: &str = "ORGCOST_API_TOKEN";

/// Validate that a configured endpoint URL uses HTTPS.
///
/// Both clients call this before sending credentials, to prevent
/// exfiltration over plain HTTP or other schemes.
pub fn validate_endpoint(url: &str, service_name: &str) -> Result<()> {
    if !url.starts_with("https://") {
        anyhow::bail!("{}: endpoint must use HTTPS, got: {}", service_name, url);
    }
    Ok(())
}

/// Read the API bearer token from the environment.
pub fn api_token() -> Result<String> {
    let token =
        std::env::var(API_TOKEN_ENV).with_context(|| format!("{} env var not set", API_TOKEN_ENV))?;
    if token.is_empty() {
        anyhow::bail!("{} is empty", API_TOKEN_ENV);
    }
    Ok(token)
}

/// Build the HTTP client shared by both API clients.
pub fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .context("Failed to build HTTP client")
}
