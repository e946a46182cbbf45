//! Configuration module for pingwatch.
//!
//! Push mode reads its target list from a JSON file given on the command
//! line; logging is configured from environment variables.
//!
//! # Example
//!
//! ```rust,ignore
//! use pingwatch::config::MonitorConfig;
//!
//! let config = MonitorConfig::load("/etc/pingwatch.json")?;
//! config.log_summary();
//! ```
//!
//! File format:
//!
//! ```json
//! {"ping": [{"host": "10.0.0.1", "webhook": "https://hooks.example.com/x"}]}
//! ```

mod error;
mod logging;
mod parse;

use std::path::Path;

use serde::Deserialize;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use parse::{parse_duration, require_duration};

/// One entry of the `ping` list.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct TargetEntry {
    /// IP address or host name, or a URL for HTTP checks.
    pub host: String,
    /// Endpoint that receives verdicts for this target.
    #[serde(default)]
    pub webhook: Option<String>,
}

#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default)]
    ping: Vec<TargetEntry>,
}

/// Push-mode configuration.
#[derive(Clone, Debug, Default)]
pub struct MonitorConfig {
    pub targets: Vec<TargetEntry>,
}

impl MonitorConfig {
    /// Read and validate the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: origin.clone(),
            source,
        })?;
        Self::from_json(&data, &origin)
    }

    /// Parse and validate a configuration document. `origin` names the
    /// source in error messages.
    pub fn from_json(data: &str, origin: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_json::from_str(data).map_err(|source| ConfigError::Json {
            path: origin.to_string(),
            source,
        })?;

        let mut targets = file.ping;
        for (i, entry) in targets.iter_mut().enumerate() {
            entry.host = entry.host.trim().to_string();
            if entry.host.is_empty() {
                return Err(ConfigError::Invalid {
                    key: format!("ping[{}].host", i),
                    message: "must not be empty".into(),
                });
            }
            if entry.webhook.as_deref().is_some_and(|w| w.trim().is_empty()) {
                entry.webhook = None;
            }
        }

        Ok(Self { targets })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::{info, warn};

        info!("Configuration loaded: {} target(s)", self.targets.len());
        for entry in &self.targets {
            match entry.webhook {
                Some(ref webhook) => info!("  {} -> {}", entry.host, webhook),
                None => warn!("  {} (no webhook, verdicts are only logged)", entry.host),
            }
        }
    }
}
