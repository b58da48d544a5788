//! Cloudflare error mapping
//!
//! Reference: <https://api.cloudflare.com/#getting-started-responses>

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::CloudflareProvider;

/// 81044: Record does not exist
pub(crate) const RECORD_NOT_FOUND_CODE: &str = "81044";

/// Whether the error is Cloudflare's "record does not exist" (81044).
pub(crate) fn is_record_missing(err: &ProviderError) -> bool {
    matches!(
        err,
        ProviderError::Unknown { raw_code: Some(code), .. } if code == RECORD_NOT_FOUND_CODE
    )
}

/// Cloudflare 错误码分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorKind {
    Auth,
    Forbidden,
    /// 参数错误，携带参数名
    Param(&'static str),
    RecordExists,
    Quota,
    ZoneExists,
    ZoneMissing,
}

fn classify(code: &str) -> Option<ErrorKind> {
    let kind = match code {
        // 6003/6103/6111: bad auth headers, 9109: unauthorized, 10000: authentication error
        "6003" | "6103" | "6111" | "9109" | "10000" => ErrorKind::Auth,
        "1068" => ErrorKind::Forbidden,
        // 1004: DNS validation error (no specific field)
        "1004" => ErrorKind::Param("general"),
        // 1049: not a registered domain
        "1049" => ErrorKind::Param("zone"),
        "9000" => ErrorKind::Param("name"),
        // 9005/9006: bad A/AAAA content, 9009: MX content must be a hostname
        "9005" | "9006" | "9009" => ErrorKind::Param("value"),
        "9021" => ErrorKind::Param("ttl"),
        // 81053..81058: some record with that host/settings already exists
        "81053" | "81054" | "81055" | "81056" | "81057" | "81058" => ErrorKind::RecordExists,
        // 81045: record quota, 1118: zone limit for the account
        "81045" | "1118" => ErrorKind::Quota,
        "1061" => ErrorKind::ZoneExists,
        // 1001: invalid zone identifier, 7000/7003: no route (bad object id)
        "1001" | "7000" | "7003" => ErrorKind::ZoneMissing,
        _ => return None,
    };
    Some(kind)
}

impl ProviderErrorMapper for CloudflareProvider {
    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        // 81044 falls through to Unknown, see `is_record_missing`
        let Some(kind) = raw.code.as_deref().and_then(classify) else {
            return self.unknown_error(raw);
        };

        let provider = self.provider_name().to_string();
        let unknown = || "<unknown>".to_string();
        match kind {
            ErrorKind::Auth => ProviderError::InvalidCredentials {
                provider,
                raw_message: Some(raw.message),
            },
            ErrorKind::Forbidden => ProviderError::PermissionDenied {
                provider,
                raw_message: Some(raw.message),
            },
            ErrorKind::Param(param) => ProviderError::InvalidParameter {
                provider,
                param: param.to_string(),
                detail: raw.message,
            },
            ErrorKind::RecordExists => ProviderError::RecordExists {
                provider,
                record_name: context.record_name.unwrap_or_else(unknown),
                raw_message: Some(raw.message),
            },
            ErrorKind::Quota => ProviderError::QuotaExceeded {
                provider,
                raw_message: Some(raw.message),
            },
            ErrorKind::ZoneExists => ProviderError::ZoneExists {
                provider,
                zone: context.zone.unwrap_or_else(unknown),
                raw_message: Some(raw.message),
            },
            ErrorKind::ZoneMissing => ProviderError::ZoneNotFound {
                provider,
                zone: context.zone.unwrap_or_else(unknown),
                raw_message: Some(raw.message),
            },
        }
    }
}
