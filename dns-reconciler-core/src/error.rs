//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

use crate::types::Conflict;

// Re-export library error type
pub use dns_reconciler_provider::ProviderError;

/// Core layer error type
#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Malformed input (record syntax, domain name, TTL range)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Domain not found (by id or name)
    #[error("Domain not found: {0}")]
    DomainNotFound(String),

    /// Record not found
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    /// The domain has no remote zone attached
    #[error("Domain {0} has no remote zone")]
    ZoneNotLinked(String),

    /// The domain already has a remote zone attached
    #[error("Domain {domain} already has zone {zone_id}")]
    ZoneAlreadyLinked { domain: String, zone_id: String },

    /// A record with the same (domain, name, type) already exists
    #[error("Record {name} {record_type} already exists in domain {domain_id}")]
    DuplicateRecord {
        domain_id: i64,
        name: String,
        record_type: String,
    },

    /// Business-rule violation with the structured conflict list
    #[error("{} conflict(s) block this change", .0.len())]
    Conflict(Vec<Conflict>),

    /// Remote provider failure, wrapped with the operation it interrupted
    #[error("{context}: {source}")]
    Provider {
        context: String,
        source: ProviderError,
    },

    /// Local and remote state diverged and could not be reconciled
    #[error("Consistency error: {0}")]
    Consistency(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Storage(String),

    /// serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// 是否为预期行为（用户输入、资源不存在等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，`false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::Validation(_)
            | Self::DomainNotFound(_)
            | Self::RecordNotFound(_)
            | Self::ZoneNotLinked(_)
            | Self::ZoneAlreadyLinked { .. }
            | Self::DuplicateRecord { .. }
            | Self::Conflict(_) => true,
            Self::Provider { source, .. } => source.is_expected(),
            Self::Consistency(_) | Self::Storage(_) | Self::Serialization(_) | Self::Config(_) => {
                false
            }
        }
    }

    /// Wrap a provider error with the operation it interrupted.
    pub fn provider(context: impl Into<String>, source: ProviderError) -> Self {
        Self::Provider {
            context: context.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
