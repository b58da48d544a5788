//! Cloudflare DNS Provider

mod convert;
mod error;
mod http;
mod provider;
mod types;

use reqwest::Client;

use crate::error::Result;
use crate::providers::common::create_http_client;
use crate::utils::log_sanitizer::mask_secret;

pub(crate) use types::{CloudflareDnsRecord, CloudflareResponse, CloudflareZone};

pub(crate) const CF_API_BASE: &str = "https://api.cloudflare.com/client/v4";
/// Cloudflare Zones API 单页最大记录数
pub(crate) const MAX_PAGE_SIZE_ZONES: u32 = 50;
/// Cloudflare DNS Records API 单页最大记录数
pub(crate) const MAX_PAGE_SIZE_RECORDS: u32 = 100;

/// Cloudflare DNS Provider
pub struct CloudflareProvider {
    pub(crate) client: Client,
    pub(crate) api_token: String,
    /// Account that owns newly created zones.
    pub(crate) account_id: Option<String>,
}

impl CloudflareProvider {
    pub fn new(api_token: String, account_id: Option<String>) -> Result<Self> {
        log::debug!(
            "[cloudflare] client created (token={}, account={account_id:?})",
            mask_secret(&api_token)
        );
        Ok(Self {
            client: create_http_client("cloudflare")?,
            api_token,
            account_id,
        })
    }
}

impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &mask_secret(&self.api_token))
            .field("account_id", &self.account_id)
            .finish_non_exhaustive()
    }
}
