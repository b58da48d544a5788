//! Provider 公共工具函数

use std::time::Duration;

use reqwest::Client;

use crate::error::{ProviderError, Result};
use crate::types::DnsRecordType;

// ============ HTTP Client ============

/// 默认连接超时（秒）
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// 默认请求超时（秒）
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// 创建带超时配置的 HTTP Client
pub fn create_http_client(provider: &str) -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| ProviderError::NetworkError {
            provider: provider.to_string(),
            detail: format!("failed to build HTTP client: {e}"),
        })
}

// ============ 记录类型转换 ============

/// 将字符串转换为 `DnsRecordType`
pub fn parse_record_type(record_type: &str, provider: &str) -> Result<DnsRecordType> {
    record_type
        .parse()
        .map_err(|_| ProviderError::UnsupportedRecordType {
            provider: provider.to_string(),
            record_type: record_type.to_string(),
        })
}

// ============ 值的展示格式 ============

/// MX 展示格式: `"<priority> <exchange>"`
pub fn format_mx_value(priority: u16, exchange: &str) -> String {
    format!("{priority} {}", normalize_domain_name(exchange))
}

/// SRV 展示格式: `"<priority> <weight> <port> <target>"`
pub fn format_srv_value(priority: u16, weight: u16, port: u16, target: &str) -> String {
    format!(
        "{priority} {weight} {port} {}",
        normalize_domain_name(target)
    )
}

/// 拆分 MX 展示格式，返回 `(priority, exchange)`
pub fn split_mx_value(value: &str) -> Option<(u16, String)> {
    let mut parts = value.split_whitespace();
    let priority = parts.next()?.parse().ok()?;
    let exchange = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((priority, normalize_domain_name(exchange)))
}

/// 拆分 SRV 展示格式，返回 `(priority, weight, port, target)`
pub fn split_srv_value(value: &str) -> Option<(u16, u16, u16, String)> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    let [priority, weight, port, target] = parts.as_slice() else {
        return None;
    };
    Some((
        priority.parse().ok()?,
        weight.parse().ok()?,
        port.parse().ok()?,
        normalize_domain_name(target),
    ))
}

// ============ 域名名称处理 ============

/// 去掉域名末尾的点
pub fn normalize_domain_name(name: &str) -> String {
    name.trim_end_matches('.').to_string()
}

/// 将完整域名转换为相对名称
/// 如: "www.example.com" + "example.com" -> "www"
/// 如: "example.com" + "example.com" -> "@"
pub fn full_name_to_relative(full_name: &str, zone_name: &str) -> String {
    let full = normalize_domain_name(full_name).to_ascii_lowercase();
    let zone = normalize_domain_name(zone_name).to_ascii_lowercase();

    if full == zone {
        "@".to_string()
    } else if let Some(subdomain) = full.strip_suffix(&format!(".{zone}")) {
        subdomain.to_string()
    } else {
        full
    }
}

/// 将相对名称转换为完整域名
/// 如: "www" + "example.com" -> "www.example.com"
/// 如: "@" + "example.com" -> "example.com"
pub fn relative_to_full_name(relative_name: &str, zone_name: &str) -> String {
    let zone = normalize_domain_name(zone_name);

    if relative_name == "@" || relative_name.is_empty() {
        zone
    } else {
        format!("{relative_name}.{zone}")
    }
}
