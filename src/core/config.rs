use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Email delivery settings. Sender, recipient and subject are configuration
/// rather than literals so test doubles can substitute addresses without
/// touching the pipeline. The SMTP password comes from the
/// ORGCOST_SMTP_PASSWORD environment variable, never from this file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub sender: String,
    pub recipient: String,
    #[serde(default = "default_subject")]
    pub subject: String,
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP login; the sender address is used when unset.
    pub smtp_username: Option<String>,
}

fn default_subject() -> String {
    "Monthly & Daily Account Costs".to_string()
}
fn default_smtp_port() -> u16 {
    587
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            sender: "cost-reports@example.com".to_string(),
            recipient: "finance@example.com".to_string(),
            subject: default_subject(),
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: default_smtp_port(),
            smtp_username: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    pub endpoint: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://organizations.us-east-1.amazonaws.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingConfig {
    pub endpoint: String,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://ce.us-east-1.amazonaws.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Stylesheet embedded into both rendered tables. A built-in default is
    /// used when unset; a configured but unreadable file aborts the run.
    pub stylesheet: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub billing: BillingConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

impl AppConfig {
    /// Get the config file path, respecting XDG_CONFIG_HOME
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("orgcost").join("config.toml")
    }

    /// Load config from the default path, falling back to defaults if not found
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Serialize and write this config to the config file path.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Validate the config
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for (field, address) in [
            ("email.sender", &self.email.sender),
            ("email.recipient", &self.email.recipient),
        ] {
            if !address.contains('@') {
                issues.push(format!("Invalid {}: '{}'", field, address));
            }
        }
        if self.email.subject.is_empty() {
            issues.push("email.subject must not be empty".to_string());
        }
        if self.email.smtp_host.is_empty() {
            issues.push("email.smtp_host must not be empty".to_string());
        }
        for (field, endpoint) in [
            ("directory.endpoint", &self.directory.endpoint),
            ("billing.endpoint", &self.billing.endpoint),
        ] {
            if !endpoint.starts_with("https://") {
                issues.push(format!("{} must use HTTPS: '{}'", field, endpoint));
            }
        }
        issues
    }
}
