//! Record and domain-name syntax checks.
//!
//! Pure functions shared by the conflict validator, the record service and
//! zone provisioning. Names handed to the store go through
//! [`canonical_domain_name`] / [`relative_record_name`] first.

use std::net::{Ipv4Addr, Ipv6Addr};

use serde::Serialize;

use dns_reconciler_provider::DnsRecordType;

use crate::error::{CoreError, CoreResult};
use crate::types::ConflictSeverity;

/// Upper TTL bound (7 days).
pub const MAX_TTL: u32 = 604_800;
/// Maximum length of a domain name without the trailing dot.
pub const MAX_DOMAIN_LENGTH: usize = 253;
const MAX_LABEL_LENGTH: usize = 63;
/// Length of a single TXT character-string.
pub const TXT_CHUNK_LENGTH: usize = 255;

/// A syntax finding on a record value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordIssue {
    pub severity: ConflictSeverity,
    pub message: String,
}

impl RecordIssue {
    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: ConflictSeverity::Error,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: ConflictSeverity::Warning,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == ConflictSeverity::Error
    }
}

pub fn is_valid_ipv4(value: &str) -> bool {
    value.parse::<Ipv4Addr>().is_ok()
}

pub fn is_valid_ipv6(value: &str) -> bool {
    value.parse::<Ipv6Addr>().is_ok()
}

fn is_valid_label(label: &str, allow_underscore: bool) -> bool {
    !label.is_empty()
        && label.len() <= MAX_LABEL_LENGTH
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || (allow_underscore && c == '_'))
}

/// Host name with at least two labels; trailing dot and a leading `*` label allowed.
pub fn is_valid_fqdn(value: &str) -> bool {
    let name = value.strip_suffix('.').unwrap_or(value);
    if name.is_empty() || name.len() > MAX_DOMAIN_LENGTH {
        return false;
    }
    let labels: Vec<&str> = name.split('.').collect();
    labels.len() >= 2
        && labels
            .iter()
            .enumerate()
            .all(|(i, label)| (i == 0 && *label == "*") || is_valid_label(label, true))
}

/// Parse `"<priority 0-65535> <fqdn>"`.
pub fn parse_mx_value(value: &str) -> Result<(u16, String), String> {
    const GRAMMAR: &str = "MX value must be \"<priority 0-65535> <mail server fqdn>\"";
    let parts: Vec<&str> = value.split_whitespace().collect();
    let [priority, exchange] = parts.as_slice() else {
        return Err(format!("{GRAMMAR}, got \"{value}\""));
    };
    let priority = priority
        .parse::<u16>()
        .map_err(|_| format!("{GRAMMAR}: invalid priority \"{priority}\""))?;
    if !is_valid_fqdn(exchange) {
        return Err(format!("{GRAMMAR}: invalid mail server \"{exchange}\""));
    }
    Ok((priority, exchange.trim_end_matches('.').to_ascii_lowercase()))
}

/// Parse `"<priority> <weight> <port> <fqdn>"`.
pub fn parse_srv_value(value: &str) -> Result<(u16, u16, u16, String), String> {
    const GRAMMAR: &str = "SRV value must be \"<priority> <weight> <port> <target fqdn>\"";
    let parts: Vec<&str> = value.split_whitespace().collect();
    let [priority, weight, port, target] = parts.as_slice() else {
        return Err(format!("{GRAMMAR}, got \"{value}\""));
    };
    let number = |field: &str, raw: &str| {
        raw.parse::<u16>()
            .map_err(|_| format!("{GRAMMAR}: invalid {field} \"{raw}\""))
    };
    let priority = number("priority", priority)?;
    let weight = number("weight", weight)?;
    let port = number("port", port)?;
    if !is_valid_fqdn(target) {
        return Err(format!("{GRAMMAR}: invalid target \"{target}\""));
    }
    Ok((
        priority,
        weight,
        port,
        target.trim_end_matches('.').to_ascii_lowercase(),
    ))
}

/// Stored form of a record value, matching what providers echo back.
///
/// Host-name targets lose case and the trailing dot; MX/SRV are re-joined from
/// their parsed fields. Values that do not parse are returned trimmed.
pub fn canonical_record_value(record_type: DnsRecordType, value: &str) -> String {
    let value = value.trim();
    match record_type {
        DnsRecordType::Cname | DnsRecordType::Ptr | DnsRecordType::Ns => {
            value.trim_end_matches('.').to_ascii_lowercase()
        }
        DnsRecordType::Mx => parse_mx_value(value)
            .map_or_else(|_| value.to_string(), |(priority, host)| format!("{priority} {host}")),
        DnsRecordType::Srv => parse_srv_value(value).map_or_else(
            |_| value.to_string(),
            |(priority, weight, port, target)| format!("{priority} {weight} {port} {target}"),
        ),
        _ => value.to_string(),
    }
}

/// Stored form of a domain name: trimmed, lowercase, no trailing dot.
pub fn canonical_domain_name(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Trailing-dot form used for zone matching: `"example.com."`.
pub fn normalize_zone_name(name: &str) -> String {
    format!("{}.", canonical_domain_name(name))
}

/// Registrable domain syntax: ≤253 chars, ≥2 labels, letters/digits/hyphens.
pub fn validate_domain_name(name: &str) -> CoreResult<()> {
    let name = canonical_domain_name(name);
    if name.is_empty() {
        return Err(CoreError::Validation("domain name is required".into()));
    }
    if name.len() > MAX_DOMAIN_LENGTH {
        return Err(CoreError::Validation(format!(
            "domain name exceeds {MAX_DOMAIN_LENGTH} characters (got {})",
            name.len()
        )));
    }
    let labels: Vec<&str> = name.split('.').collect();
    if labels.len() < 2 {
        return Err(CoreError::Validation(format!(
            "domain name must have at least two labels: {name}"
        )));
    }
    if let Some(bad) = labels.iter().find(|l| !is_valid_label(l, false)) {
        return Err(CoreError::Validation(format!(
            "invalid label \"{bad}\" in domain name {name}"
        )));
    }
    Ok(())
}

/// Relative record name in stored form, given the owning domain.
///
/// Lowercases, drops a trailing dot, strips the domain suffix from fully
/// qualified input, and maps the apex (or empty input) to `@`.
pub fn relative_record_name(name: &str, domain_name: &str) -> String {
    let name = name.trim().trim_end_matches('.').to_ascii_lowercase();
    let domain = canonical_domain_name(domain_name);
    if name.is_empty() || name == "@" || name == domain {
        return "@".to_string();
    }
    match name.strip_suffix(&format!(".{domain}")) {
        Some(relative) => relative.to_string(),
        None => name,
    }
}

/// Relative record name syntax (`@`, `www`, `_sip._tcp`, `*.dev`).
pub fn validate_record_name(name: &str) -> CoreResult<()> {
    if name == "@" {
        return Ok(());
    }
    if name.is_empty() || name.len() > MAX_DOMAIN_LENGTH {
        return Err(CoreError::Validation(format!(
            "record name must be 1-{MAX_DOMAIN_LENGTH} characters: \"{name}\""
        )));
    }
    let valid = name
        .split('.')
        .enumerate()
        .all(|(i, label)| (i == 0 && label == "*") || is_valid_label(label, true));
    if valid {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("invalid record name: \"{name}\"")))
    }
}

pub fn validate_ttl(ttl: u32) -> CoreResult<()> {
    if ttl > MAX_TTL {
        return Err(CoreError::Validation(format!(
            "TTL must be between 0 and {MAX_TTL} seconds (got {ttl})"
        )));
    }
    Ok(())
}

/// Type-specific value checks. Errors make the record unacceptable; warnings do not.
pub fn validate_record_value(
    record_type: DnsRecordType,
    value: &str,
    txt_warn_length: usize,
) -> Vec<RecordIssue> {
    let mut issues = Vec::new();
    if value.trim().is_empty() {
        issues.push(RecordIssue::error(format!("{record_type} value is required")));
        return issues;
    }

    match record_type {
        DnsRecordType::A => {
            if !is_valid_ipv4(value) {
                issues.push(RecordIssue::error(format!("invalid IPv4 address: {value}")));
            }
        }
        DnsRecordType::Aaaa => {
            if !is_valid_ipv6(value) {
                issues.push(RecordIssue::error(format!("invalid IPv6 address: {value}")));
            }
        }
        DnsRecordType::Cname | DnsRecordType::Ptr => {
            if !is_valid_fqdn(value) {
                issues.push(RecordIssue::error(format!(
                    "{record_type} target must be a fully qualified domain name: {value}"
                )));
            }
        }
        DnsRecordType::Mx => {
            if let Err(e) = parse_mx_value(value) {
                issues.push(RecordIssue::error(e));
            }
        }
        DnsRecordType::Srv => {
            if let Err(e) = parse_srv_value(value) {
                issues.push(RecordIssue::error(e));
            }
        }
        DnsRecordType::Txt => {
            if value.len() > txt_warn_length {
                issues.push(RecordIssue::warning(format!(
                    "TXT value is {} characters; values over {txt_warn_length} are split into \
                     {TXT_CHUNK_LENGTH}-character strings",
                    value.len()
                )));
            }
        }
        DnsRecordType::Ns | DnsRecordType::Soa => {
            issues.push(RecordIssue::error(format!(
                "{record_type} records are managed by the provider"
            )));
        }
    }
    issues
}
