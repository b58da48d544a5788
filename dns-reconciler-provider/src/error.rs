use serde::{Deserialize, Serialize};

/// Unified error type for all remote zone and record operations.
///
/// Each variant includes a `provider` field identifying which provider produced the error,
/// plus variant-specific context. All variants are serializable for structured error reporting.
///
/// # Transient Errors
///
/// [`NetworkError`](Self::NetworkError), [`Timeout`](Self::Timeout) and
/// [`RateLimited`](Self::RateLimited) describe conditions that may clear on their own.
/// They are surfaced to the caller as-is: the client never retries on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ProviderError {
    /// Connection-level failure (DNS resolution, refused connection, TLS).
    NetworkError { provider: String, detail: String },

    /// Token rejected or expired.
    InvalidCredentials {
        provider: String,
        raw_message: Option<String>,
    },

    /// The provider refused a record write because an identical record exists.
    RecordExists {
        provider: String,
        record_name: String,
        raw_message: Option<String>,
    },

    /// A request field was rejected (TTL out of range, malformed content).
    InvalidParameter {
        provider: String,
        param: String,
        detail: String,
    },

    UnsupportedRecordType {
        provider: String,
        record_type: String,
    },

    /// Account-level limit reached (zones per account, records per zone).
    QuotaExceeded {
        provider: String,
        raw_message: Option<String>,
    },

    /// HTTP 429 or the provider's equivalent. `retry_after` is in seconds.
    RateLimited {
        provider: String,
        retry_after: Option<u64>,
        raw_message: Option<String>,
    },

    Timeout { provider: String, detail: String },

    /// `zone` holds whatever identified the zone in the request: id or name.
    ZoneNotFound {
        provider: String,
        zone: String,
        raw_message: Option<String>,
    },

    ZoneExists {
        provider: String,
        zone: String,
        raw_message: Option<String>,
    },

    PermissionDenied {
        provider: String,
        raw_message: Option<String>,
    },

    /// The response body did not match the expected shape.
    ParseError { provider: String, detail: String },

    /// Anything the provider-specific mapper did not recognise.
    Unknown {
        provider: String,
        raw_code: Option<String>,
        raw_message: String,
    },
}

impl ProviderError {
    /// 是否为预期行为（用户输入、资源不存在等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，`false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. }
                | Self::RecordExists { .. }
                | Self::InvalidParameter { .. }
                | Self::UnsupportedRecordType { .. }
                | Self::QuotaExceeded { .. }
                | Self::ZoneNotFound { .. }
                | Self::ZoneExists { .. }
                | Self::PermissionDenied { .. }
        )
    }

    /// Whether the condition may clear on its own (network, timeout, rate limit).
    ///
    /// Informational only: nothing in this workspace retries automatically.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }

    /// Name of the provider that produced the error.
    pub fn provider(&self) -> &str {
        match self {
            Self::NetworkError { provider, .. }
            | Self::InvalidCredentials { provider, .. }
            | Self::RecordExists { provider, .. }
            | Self::InvalidParameter { provider, .. }
            | Self::UnsupportedRecordType { provider, .. }
            | Self::QuotaExceeded { provider, .. }
            | Self::RateLimited { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::ZoneNotFound { provider, .. }
            | Self::ZoneExists { provider, .. }
            | Self::PermissionDenied { provider, .. }
            | Self::ParseError { provider, .. }
            | Self::Unknown { provider, .. } => provider,
        }
    }
}

/// `": msg"` when the provider sent a message, empty otherwise.
struct Suffix<'a>(Option<&'a String>);

impl std::fmt::Display for Suffix<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(msg) => write!(f, ": {msg}"),
            None => Ok(()),
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] ", self.provider())?;
        match self {
            Self::NetworkError { detail, .. } => write!(f, "Network error: {detail}"),
            Self::InvalidCredentials { raw_message, .. } => {
                write!(f, "Invalid credentials{}", Suffix(raw_message.as_ref()))
            }
            Self::RecordExists { record_name, .. } => {
                write!(f, "Record '{record_name}' already exists")
            }
            Self::InvalidParameter { param, detail, .. } => {
                write!(f, "Invalid parameter '{param}': {detail}")
            }
            Self::UnsupportedRecordType { record_type, .. } => {
                write!(f, "Unsupported record type: {record_type}")
            }
            Self::QuotaExceeded { .. } => f.write_str("Quota exceeded"),
            Self::RateLimited {
                retry_after: Some(secs),
                ..
            } => write!(f, "Rate limited (retry after {secs}s)"),
            Self::RateLimited { .. } => f.write_str("Rate limited"),
            Self::Timeout { detail, .. } => write!(f, "Request timeout: {detail}"),
            Self::ZoneNotFound {
                zone, raw_message, ..
            } => write!(f, "Zone '{zone}' not found{}", Suffix(raw_message.as_ref())),
            Self::ZoneExists { zone, .. } => write!(f, "Zone '{zone}' already exists"),
            Self::PermissionDenied { raw_message, .. } => {
                write!(f, "Permission denied{}", Suffix(raw_message.as_ref()))
            }
            Self::ParseError { detail, .. } => write!(f, "Parse error: {detail}"),
            Self::Unknown { raw_message, .. } => f.write_str(raw_message),
        }
    }
}

impl std::error::Error for ProviderError {}

pub type Result<T> = std::result::Result<T, ProviderError>;
