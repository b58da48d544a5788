//! Storage layer abstraction trait definition

mod domain_repository;
mod record_repository;

pub use domain_repository::DomainRepository;
pub use record_repository::RecordRepository;
