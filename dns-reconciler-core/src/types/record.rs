//! DNS record type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dns_reconciler_provider::{DnsRecordType, RemoteRecord};

use crate::error::CoreError;

/// Provenance of a record row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSource {
    /// Only ever observed at the provider through sync.
    Remote,
    /// Created here and mirrored to the provider.
    Local,
}

impl RecordSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Local => "local",
        }
    }
}

impl std::str::FromStr for RecordSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "remote" => Ok(Self::Remote),
            "local" => Ok(Self::Local),
            other => Err(format!("unknown record source: {other}")),
        }
    }
}

/// A persisted record row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsRecord {
    pub id: i64,
    pub domain_id: i64,
    /// Relative name, `@` for the apex.
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    pub value: String,
    pub ttl: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u16>,
    pub source: RecordSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_route_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DnsRecord {
    /// Wire form for the provider.
    pub fn to_remote(&self) -> RemoteRecord {
        RemoteRecord {
            name: self.name.clone(),
            record_type: self.record_type,
            value: self.value.clone(),
            ttl: self.ttl,
            priority: self.priority,
            weight: self.weight,
        }
    }

    /// Sync identity within a domain: `(name, type)`.
    pub fn key(&self) -> (String, DnsRecordType) {
        (self.name.to_ascii_lowercase(), self.record_type)
    }

    /// Whether the remote copy carries different data.
    pub fn differs_from(&self, remote: &RemoteRecord) -> bool {
        self.value != remote.value
            || self.ttl != remote.ttl
            || self.priority != remote.priority
            || self.weight != remote.weight
    }

    /// Overwrite data fields with the remote copy.
    pub fn apply_remote(&mut self, remote: &RemoteRecord) {
        self.value.clone_from(&remote.value);
        self.ttl = remote.ttl;
        self.priority = remote.priority;
        self.weight = remote.weight;
    }
}

/// Insert payload for a new record row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDnsRecord {
    pub domain_id: i64,
    pub name: String,
    pub record_type: DnsRecordType,
    pub value: String,
    pub ttl: u32,
    pub priority: Option<u16>,
    pub weight: Option<u16>,
    pub source: RecordSource,
    pub created_by_route_id: Option<i64>,
}

impl NewDnsRecord {
    /// Row for a record first seen at the provider.
    pub fn from_remote(domain_id: i64, remote: &RemoteRecord) -> Self {
        Self {
            domain_id,
            name: remote.name.clone(),
            record_type: remote.record_type,
            value: remote.value.clone(),
            ttl: remote.ttl,
            priority: remote.priority,
            weight: remote.weight,
            source: RecordSource::Remote,
            created_by_route_id: None,
        }
    }

    pub fn to_remote(&self) -> RemoteRecord {
        RemoteRecord {
            name: self.name.clone(),
            record_type: self.record_type,
            value: self.value.clone(),
            ttl: self.ttl,
            priority: self.priority,
            weight: self.weight,
        }
    }
}

fn default_sync_to_remote() -> bool {
    true
}

/// Input of [`RecordService::create_record`](crate::services::RecordService::create_record).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordRequest {
    pub domain_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    pub value: String,
    /// Defaults to the configured TTL (300).
    #[serde(default)]
    pub ttl: Option<u32>,
    /// Required for MX/SRV; derived from the value when omitted.
    #[serde(default)]
    pub priority: Option<u16>,
    /// Required for SRV; derived from the value when omitted.
    #[serde(default)]
    pub weight: Option<u16>,
    #[serde(default = "default_sync_to_remote")]
    pub sync_to_remote: bool,
    #[serde(default)]
    pub created_by_route_id: Option<i64>,
}

impl CreateRecordRequest {
    pub fn new(
        domain_id: i64,
        name: impl Into<String>,
        record_type: DnsRecordType,
        value: impl Into<String>,
    ) -> Self {
        Self {
            domain_id,
            name: name.into(),
            record_type,
            value: value.into(),
            ttl: None,
            priority: None,
            weight: None,
            sync_to_remote: true,
            created_by_route_id: None,
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: u16) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn with_route(mut self, route_id: i64) -> Self {
        self.created_by_route_id = Some(route_id);
        self
    }

    #[must_use]
    pub fn local_only(mut self) -> Self {
        self.sync_to_remote = false;
        self
    }
}

/// Outcome of a single record mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMutationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CoreError>,
    pub warnings: Vec<String>,
}

impl RecordMutationResult {
    pub fn ok(record_id: i64, warnings: Vec<String>) -> Self {
        Self {
            success: true,
            record_id: Some(record_id),
            error: None,
            warnings,
        }
    }

    pub fn failed(error: CoreError, warnings: Vec<String>) -> Self {
        Self {
            success: false,
            record_id: None,
            error: Some(error),
            warnings,
        }
    }
}

/// Outcome of a batch create, in request order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRecordResult {
    pub results: Vec<RecordMutationResult>,
    pub success_count: usize,
    pub failed_count: usize,
}

impl BatchRecordResult {
    pub fn from_results(results: Vec<RecordMutationResult>) -> Self {
        let success_count = results.iter().filter(|r| r.success).count();
        Self {
            failed_count: results.len() - success_count,
            success_count,
            results,
        }
    }
}

/// Outcome of a route-scoped cleanup.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteCleanupResult {
    pub deleted_count: usize,
    pub errors: Vec<String>,
}
