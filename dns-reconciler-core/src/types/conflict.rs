//! Conflict taxonomy produced by the conflict validator

use serde::{Deserialize, Serialize};

use dns_reconciler_provider::DnsRecordType;

use super::record::DnsRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    /// Another record already uses the name (any type).
    DuplicateName,
    /// CNAME coexisting with another record at the same name.
    CnameConflict,
    /// Records sharing a name disagree on TTL.
    TtlMismatch,
    /// Identical value already present, or the value is malformed.
    ValueConflict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSeverity {
    Error,
    Warning,
    Info,
}

/// The record being validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedRecord {
    pub domain_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    pub severity: ConflictSeverity,
    pub subject: ProposedRecord,
    pub conflicting_records: Vec<DnsRecord>,
    pub description: String,
    /// Human-readable hint for resolving the conflict.
    pub resolution: String,
}

impl Conflict {
    pub fn is_error(&self) -> bool {
        self.severity == ConflictSeverity::Error
    }
}

/// Flags for [`ConflictValidator::validate`](crate::services::ConflictValidator::validate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationOptions {
    /// Compare against existing records (rules on names, CNAME, TTL, duplicates).
    pub check_existing: bool,
    /// Treat TTL mismatches as errors.
    pub strict_mode: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            check_existing: true,
            strict_mode: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// `true` iff no conflict has `Error` severity.
    pub valid: bool,
    pub conflicts: Vec<Conflict>,
    pub warnings: Vec<String>,
}

/// Suggested action for one conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionAction {
    /// A human must decide.
    Manual,
    /// Remove the record that blocks the change.
    DeleteBlocking,
    /// Nothing to do; proceed.
    Skip,
    /// Update the existing record instead of adding a duplicate.
    UpdateExisting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictAction {
    pub conflict_type: ConflictType,
    pub action: ResolutionAction,
    /// Ids of the existing records the action applies to.
    pub record_ids: Vec<i64>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictResolution {
    pub actions: Vec<ConflictAction>,
    /// `false` as soon as one action is [`ResolutionAction::Manual`].
    pub can_auto_resolve: bool,
}
