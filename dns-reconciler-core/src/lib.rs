//! DNS Reconciler Core Library
//!
//! Keeps a local mirror of DNS zones and records converged with a remote
//! provider:
//! - Zone discovery (`ZoneDiscoveryService`)
//! - Zone provisioning (`ZoneProvisioningService`)
//! - Conflict validation (`ConflictValidator`)
//! - Record mutation with compensating rollback (`RecordService`)
//! - Record reconciliation (`ReconcileService`)
//!
//! Storage is abstracted behind [`DomainRepository`] and [`RecordRepository`];
//! the remote side is any [`dns_reconciler_provider::ZoneProvider`].

pub mod config;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;
pub mod validation;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use config::ReconcilerConfig;
pub use error::{CoreError, CoreResult};
pub use services::ServiceContext;
pub use traits::{DomainRepository, RecordRepository};
