//! Application configuration: database location, provider credentials and
//! engine tunables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use dns_reconciler_core::error::{CoreError, CoreResult};
use dns_reconciler_core::ReconcilerConfig;
use dns_reconciler_provider::ProviderCredentials;

pub const ENV_DATABASE_PATH: &str = "DNS_RECONCILER_DB";
pub const ENV_CF_API_TOKEN: &str = "DNS_RECONCILER_CF_API_TOKEN";
pub const ENV_CF_ACCOUNT_ID: &str = "DNS_RECONCILER_CF_ACCOUNT_ID";
pub const ENV_BATCH_DELAY_MS: &str = "DNS_RECONCILER_BATCH_DELAY_MS";
pub const ENV_DEFAULT_TTL: &str = "DNS_RECONCILER_DEFAULT_TTL";
pub const ENV_SYNC_ON_STARTUP: &str = "DNS_RECONCILER_SYNC_ON_STARTUP";

/// Top-level configuration consumed by [`AppState::from_config`](crate::AppState::from_config).
///
/// ```json
/// {
///   "databasePath": "/var/lib/dns-reconciler/state.db",
///   "provider": { "provider": "cloudflare", "apiToken": "..." },
///   "reconciler": { "batchDelayMs": 500 },
///   "syncOnStartup": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub provider: ProviderCredentials,
    #[serde(default)]
    pub reconciler: ReconcilerConfig,
    /// Run `sync_all` once during startup.
    #[serde(default)]
    pub sync_on_startup: bool,
}

impl AppConfig {
    /// Load and validate a JSON config file.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            CoreError::Config(format!("Invalid config {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Build from `DNS_RECONCILER_*` environment variables.
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` delegates here.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CoreResult<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| CoreError::Config(format!("{key} is not set")))
        };

        let database_path = PathBuf::from(required(ENV_DATABASE_PATH)?);
        let provider = ProviderCredentials::Cloudflare {
            api_token: required(ENV_CF_API_TOKEN)?,
            account_id: lookup(ENV_CF_ACCOUNT_ID).filter(|v| !v.trim().is_empty()),
        };

        let mut reconciler = ReconcilerConfig::default();
        if let Some(raw) = lookup(ENV_BATCH_DELAY_MS) {
            reconciler.batch_delay_ms = parse_var(ENV_BATCH_DELAY_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_DEFAULT_TTL) {
            reconciler.default_ttl = parse_var(ENV_DEFAULT_TTL, &raw)?;
        }

        let sync_on_startup = match lookup(ENV_SYNC_ON_STARTUP) {
            Some(raw) => parse_flag(ENV_SYNC_ON_STARTUP, &raw)?,
            None => false,
        };

        let config = Self {
            database_path,
            provider,
            reconciler,
            sync_on_startup,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(CoreError::Config("databasePath must not be empty".into()));
        }
        self.reconciler.validate()
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> CoreResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| CoreError::Config(format!("{key}={raw}: {e}")))
}

fn parse_flag(key: &str, raw: &str) -> CoreResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(CoreError::Config(format!("{key}={raw}: expected a boolean"))),
    }
}
