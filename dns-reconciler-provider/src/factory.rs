//! Provider factory.

use std::sync::Arc;

use crate::error::Result;
use crate::traits::ZoneProvider;
use crate::types::ProviderCredentials;

#[cfg(feature = "cloudflare")]
use crate::providers::CloudflareProvider;

/// Creates a [`ZoneProvider`] from the given credentials.
///
/// The concrete provider is chosen by the [`ProviderCredentials`] variant. The
/// result is wrapped in `Arc<dyn ZoneProvider>` so services can share it.
///
/// # Examples
///
/// ```rust,no_run
/// use dns_reconciler_provider::{create_provider, ProviderCredentials};
///
/// let provider = create_provider(ProviderCredentials::Cloudflare {
///     api_token: "your-token".to_string(),
///     account_id: Some("your-account".to_string()),
/// })?;
/// assert_eq!(provider.id(), "cloudflare");
/// # Ok::<(), dns_reconciler_provider::ProviderError>(())
/// ```
pub fn create_provider(credentials: ProviderCredentials) -> Result<Arc<dyn ZoneProvider>> {
    match credentials {
        #[cfg(feature = "cloudflare")]
        ProviderCredentials::Cloudflare {
            api_token,
            account_id,
        } => Ok(Arc::new(CloudflareProvider::new(api_token, account_id)?)),
    }
}
