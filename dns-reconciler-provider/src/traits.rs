use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{CreatedZone, RemoteRecord, RemoteZoneSummary, ZoneDetail};

/// 原始 API 错误（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// 错误码（各 Provider 格式不同）
    pub code: Option<String>,
    /// 原始错误消息
    pub message: String,
}

impl RawApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// 错误上下文信息（内部使用）
/// 用于在映射错误时提供额外信息
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// 记录名称（用于 `RecordExists` 等错误）
    pub record_name: Option<String>,
    /// Zone ID 或名称（用于 `ZoneNotFound` / `ZoneExists`）
    pub zone: Option<String>,
}

impl ErrorContext {
    pub fn zone(zone: impl Into<String>) -> Self {
        Self {
            zone: Some(zone.into()),
            ..Self::default()
        }
    }

    pub fn record(zone: impl Into<String>, record_name: impl Into<String>) -> Self {
        Self {
            record_name: Some(record_name.into()),
            zone: Some(zone.into()),
        }
    }
}

/// Provider 错误映射 Trait（内部使用）
/// 各 Provider 实现此 trait 以将原始 API 错误映射到统一错误类型
pub(crate) trait ProviderErrorMapper {
    /// 返回 Provider 标识符
    fn provider_name(&self) -> &'static str;

    /// 将原始 API 错误映射到统一错误类型
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// 快捷方法：解析错误
    fn parse_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::ParseError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// 快捷方法：未知错误（fallback）
    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// Remote DNS provider: the authoritative system of record for zones and records.
///
/// All record exchange uses [`RemoteRecord`], whose `name` is relative to the zone.
/// Implementations must keep `upsert_records` idempotent: sending the same record
/// twice leaves exactly one copy at the provider.
#[async_trait]
pub trait ZoneProvider: Send + Sync {
    /// 提供商标识符
    fn id(&self) -> &'static str;

    /// List every zone visible to the credentials (all pages).
    async fn list_zones(&self) -> Result<Vec<RemoteZoneSummary>>;

    /// Zone detail including name servers and record count.
    async fn get_zone(&self, zone_id: &str) -> Result<ZoneDetail>;

    /// Create a zone. `comment` is kept only by providers that support it.
    async fn create_zone(&self, name: &str, comment: Option<&str>) -> Result<CreatedZone>;

    /// Delete a zone.
    async fn delete_zone(&self, zone_id: &str) -> Result<()>;

    /// Every record in the zone, excluding provider-managed SOA/NS entries.
    async fn list_records(&self, zone_id: &str) -> Result<Vec<RemoteRecord>>;

    /// Create-or-replace each record, matched by name, type and value.
    ///
    /// The whole slice is one change set: an `Err` means the caller must treat
    /// every member as not applied.
    async fn upsert_records(&self, zone_id: &str, records: &[RemoteRecord]) -> Result<()>;

    /// Delete records matched by name, type and value. Records already absent are ignored.
    async fn delete_records(&self, zone_id: &str, records: &[RemoteRecord]) -> Result<()>;
}
