//! Conversion between Cloudflare wire records and [`RemoteRecord`].

use crate::error::{ProviderError, Result};
use crate::providers::common::{
    format_mx_value, format_srv_value, full_name_to_relative, parse_record_type,
    relative_to_full_name, split_mx_value, split_srv_value,
};
use crate::types::{DnsRecordType, RemoteRecord};

use super::types::{CloudflareDnsRecord, CloudflareRecordBody, CloudflareSrvData};

const PROVIDER: &str = "cloudflare";
const AUTO_TTL: u32 = 1;
const MIN_TTL: u32 = 60;

/// Convert an API record. Provider-managed and unsupported types yield `None`.
pub(crate) fn from_cf_record(cf: &CloudflareDnsRecord, zone_name: &str) -> Option<RemoteRecord> {
    let record_type = match parse_record_type(&cf.record_type, PROVIDER) {
        Ok(t) if !t.is_provider_managed() => t,
        Ok(_) => return None,
        Err(_) => {
            log::debug!(
                "[cloudflare] skipping unsupported record type {} at {}",
                cf.record_type,
                cf.name
            );
            return None;
        }
    };

    let name = full_name_to_relative(&cf.name, zone_name);
    let mut record = RemoteRecord::new(name, record_type, String::new(), cf.ttl);

    match record_type {
        DnsRecordType::Mx => {
            let priority = cf.priority.unwrap_or(0);
            record.value = format_mx_value(priority, &cf.content);
            record.priority = Some(priority);
        }
        DnsRecordType::Srv => {
            if let Some(data) = &cf.data {
                record.value =
                    format_srv_value(data.priority, data.weight, data.port, &data.target);
                record.priority = Some(data.priority);
                record.weight = Some(data.weight);
            } else {
                // Older responses carry "weight port target" in content.
                let priority = cf.priority.unwrap_or(0);
                record.value = format!("{priority} {}", cf.content.trim_end_matches('.'));
                record.priority = Some(priority);
                record.weight = split_srv_value(&record.value).map(|(_, w, _, _)| w);
            }
        }
        DnsRecordType::Txt => record.value = unquote_txt(&cf.content),
        DnsRecordType::Cname | DnsRecordType::Ptr => {
            record.value = cf.content.trim_end_matches('.').to_string();
        }
        _ => record.value.clone_from(&cf.content),
    }

    Some(record)
}

/// Build the create/replace request body for a record.
pub(crate) fn to_cf_body(record: &RemoteRecord, zone_name: &str) -> Result<CloudflareRecordBody> {
    let name = relative_to_full_name(&record.name, zone_name);
    let mut body = CloudflareRecordBody {
        record_type: record.record_type.as_str(),
        name,
        content: None,
        ttl: cloudflare_ttl(record)?,
        priority: None,
        data: None,
    };

    match record.record_type {
        DnsRecordType::Mx => {
            let (priority, exchange) =
                split_mx_value(&record.value).ok_or_else(|| invalid_value(record))?;
            body.priority = Some(record.priority.unwrap_or(priority));
            body.content = Some(exchange);
        }
        DnsRecordType::Srv => {
            let (priority, weight, port, target) =
                split_srv_value(&record.value).ok_or_else(|| invalid_value(record))?;
            body.data = Some(CloudflareSrvData {
                priority: record.priority.unwrap_or(priority),
                weight: record.weight.unwrap_or(weight),
                port,
                target,
            });
        }
        DnsRecordType::Ns | DnsRecordType::Soa => {
            return Err(ProviderError::UnsupportedRecordType {
                provider: PROVIDER.to_string(),
                record_type: record.record_type.to_string(),
            });
        }
        _ => body.content = Some(record.value.clone()),
    }

    Ok(body)
}

/// Whether two presentation values denote the same record data.
///
/// Host names compare case-insensitively and ignore a trailing dot.
pub(crate) fn values_match(record_type: DnsRecordType, a: &str, b: &str) -> bool {
    match record_type {
        DnsRecordType::Txt => a == b,
        DnsRecordType::A | DnsRecordType::Aaaa => a.trim() == b.trim(),
        _ => {
            let norm = |s: &str| s.trim().trim_end_matches('.').to_ascii_lowercase();
            norm(a) == norm(b)
        }
    }
}

/// Cloudflare accepts `1` ("automatic") or 60 and above.
fn cloudflare_ttl(record: &RemoteRecord) -> Result<u32> {
    match record.ttl {
        AUTO_TTL | MIN_TTL.. => Ok(record.ttl),
        ttl => Err(ProviderError::InvalidParameter {
            provider: PROVIDER.to_string(),
            param: "ttl".to_string(),
            detail: format!(
                "TTL {ttl} for {} is below the {MIN_TTL}s minimum; use {AUTO_TTL} for automatic",
                record.name
            ),
        }),
    }
}

fn unquote_txt(content: &str) -> String {
    content
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .filter(|inner| !inner.contains('"'))
        .unwrap_or(content)
        .to_string()
}

fn invalid_value(record: &RemoteRecord) -> ProviderError {
    ProviderError::InvalidParameter {
        provider: PROVIDER.to_string(),
        param: "value".to_string(),
        detail: format!(
            "malformed {} value for {}: {}",
            record.record_type, record.name, record.value
        ),
    }
}
