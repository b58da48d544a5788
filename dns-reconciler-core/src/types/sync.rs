//! Reconciliation results

use serde::Serialize;

use dns_reconciler_provider::{DnsRecordType, RemoteRecord};

use crate::error::CoreError;

use super::record::DnsRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOperation {
    Create,
    Update,
    Delete,
}

/// One record that failed to apply during a sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncError {
    pub operation: SyncOperation,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub domain_id: i64,
    /// `true` iff `errors` is empty.
    pub success: bool,
    /// Records that now match the remote: created + updated + unchanged.
    pub synced_count: usize,
    pub created_count: usize,
    pub updated_count: usize,
    pub deleted_count: usize,
    pub unchanged_count: usize,
    pub errors: Vec<SyncError>,
    pub duration_ms: u64,
}

/// A local row and the remote data it will be overwritten with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordUpdate {
    pub current: DnsRecord,
    pub remote: RemoteRecord,
}

/// The diff a sync would apply, without applying it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPlan {
    pub to_create: Vec<RemoteRecord>,
    pub to_update: Vec<RecordUpdate>,
    pub to_delete: Vec<DnsRecord>,
    pub unchanged: usize,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }
}

/// Per-domain outcome of `sync_all`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainSyncOutcome {
    pub domain_id: i64,
    pub domain_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SyncResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CoreError>,
}
