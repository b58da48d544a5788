//! 类型定义模块

mod conflict;
mod discovery;
mod domain;
mod provisioning;
mod record;
mod sync;

pub use conflict::{
    Conflict, ConflictAction, ConflictResolution, ConflictSeverity, ConflictType, ProposedRecord,
    ResolutionAction, ValidationOptions, ValidationResult,
};
pub use discovery::{DiscoveredZone, DiscoveryAction, DiscoveryResult, ZoneMatch, ZoneValidation};
pub use domain::{DelegationStatus, Domain, NewDomain};
pub use provisioning::{BatchZoneCreationResult, CreateZoneOptions, ZoneCreationResult};
pub use record::{
    BatchRecordResult, CreateRecordRequest, DnsRecord, NewDnsRecord, RecordMutationResult,
    RecordSource, RouteCleanupResult,
};
pub use sync::{DomainSyncOutcome, RecordUpdate, SyncError, SyncOperation, SyncPlan, SyncResult};

// Re-export provider 库的公共类型
pub use dns_reconciler_provider::{
    CreatedZone, DnsRecordType, RemoteRecord, RemoteZoneSummary, ZoneDetail,
};
