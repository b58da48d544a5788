//! # dns-reconciler-provider
//!
//! Remote DNS provider abstraction used by the reconciler: zone listing and
//! creation, full record-set reads, idempotent record upserts and deletes.
//!
//! ## Supported Providers
//!
//! | Provider | Feature Flag | Auth Method |
//! |----------|-------------|-------------|
//! | [Cloudflare](https://www.cloudflare.com/) | `cloudflare` | Bearer Token |
//!
//! ## Feature Flags
//!
//! - **`all-providers`** *(default)*: enable every provider listed above.
//! - **`cloudflare`**: enable only the Cloudflare provider.
//! - **`rustls`** *(default)* / **`native-tls`**: TLS backend for `reqwest`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dns_reconciler_provider::{create_provider, ProviderCredentials};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = create_provider(ProviderCredentials::Cloudflare {
//!         api_token: "your-token".to_string(),
//!         account_id: None,
//!     })?;
//!
//!     for zone in provider.list_zones().await? {
//!         let records = provider.list_records(&zone.id).await?;
//!         println!("{} ({} records)", zone.name, records.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Record Wire Form
//!
//! Every operation exchanges [`RemoteRecord`]: the name is relative to the zone
//! (`@` for the apex) and the value uses presentation form, so MX is
//! `"10 mail.example.com"` and SRV is `"10 5 5060 sip.example.com"`.
//! Provider-managed `SOA`/`NS` records never appear in listings.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, ProviderError>`](ProviderError). Transient
//! conditions (`NetworkError`, `Timeout`, `RateLimited`) are reported, not retried.

mod error;
mod factory;
mod http_client;
mod providers;
mod traits;
mod types;
mod utils;

// Re-export error types
pub use error::{ProviderError, Result};

// Re-export factory functions
pub use factory::create_provider;

// Re-export core trait only (internal traits are not exported)
pub use traits::ZoneProvider;

// Re-export types
pub use types::{
    CreatedZone, DnsRecordType, ProviderCredentials, ProviderType, RemoteRecord,
    RemoteZoneSummary, ZoneDetail,
};

// Re-export utils module
pub use utils::datetime;

// Re-export concrete providers (behind feature flags)
#[cfg(feature = "cloudflare")]
pub use providers::CloudflareProvider;
