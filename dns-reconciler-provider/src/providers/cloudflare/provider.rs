//! Cloudflare `ZoneProvider` 实现

use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::providers::common::{normalize_domain_name, relative_to_full_name};
use crate::traits::{ErrorContext, ProviderErrorMapper, ZoneProvider};
use crate::types::{CreatedZone, DnsRecordType, RemoteRecord, RemoteZoneSummary, ZoneDetail};
use crate::utils::datetime::parse_rfc3339;

use super::convert::{from_cf_record, to_cf_body, values_match};
use super::error::is_record_missing;
use super::types::{AccountRef, CreateZoneBody};
use super::{
    CloudflareDnsRecord, CloudflareProvider, CloudflareZone, MAX_PAGE_SIZE_RECORDS,
    MAX_PAGE_SIZE_ZONES,
};

impl CloudflareProvider {
    /// Zone listings carry no record count; callers needing one use `get_zone`.
    fn zone_to_summary(zone: CloudflareZone) -> RemoteZoneSummary {
        RemoteZoneSummary {
            created_at: zone.created_on.as_deref().and_then(parse_rfc3339),
            id: zone.id,
            name: zone.name,
            record_count: 0,
        }
    }

    /// Cloudflare has no private zones, so `private_zone` is always `false`.
    fn zone_to_detail(zone: CloudflareZone, record_count: u32) -> ZoneDetail {
        ZoneDetail {
            created_at: zone.created_on.as_deref().and_then(parse_rfc3339),
            id: zone.id,
            name: zone.name,
            record_count,
            private_zone: false,
            name_servers: zone.name_servers,
            comment: None,
        }
    }

    async fn zone_name(&self, zone_id: &str) -> Result<String> {
        let zone: CloudflareZone = self
            .get(&format!("/zones/{zone_id}"), ErrorContext::zone(zone_id))
            .await?;
        Ok(normalize_domain_name(&zone.name))
    }

    /// Existing records at one `(name, type)`, paired with their Cloudflare ids.
    async fn records_at(
        &self,
        zone_id: &str,
        zone_name: &str,
        record: &RemoteRecord,
    ) -> Result<Vec<(String, RemoteRecord)>> {
        let full_name = relative_to_full_name(&record.name, zone_name);
        let path = format!(
            "/zones/{zone_id}/dns_records?type={}&name={}",
            record.record_type.as_str(),
            urlencoding::encode(&full_name)
        );
        let raw: Vec<CloudflareDnsRecord> = self
            .get_all_pages(
                &path,
                MAX_PAGE_SIZE_RECORDS,
                ErrorContext::record(zone_id, &record.name),
            )
            .await?;

        Ok(raw
            .iter()
            .filter_map(|cf| from_cf_record(cf, zone_name).map(|r| (cf.id.clone(), r)))
            .collect())
    }

    async fn upsert_one(&self, zone_id: &str, zone_name: &str, record: &RemoteRecord) -> Result<()> {
        let existing = self.records_at(zone_id, zone_name, record).await?;
        let context = ErrorContext::record(zone_id, &record.name);
        let body = to_cf_body(record, zone_name)?;

        let same_value = existing
            .iter()
            .find(|(_, r)| values_match(record.record_type, &r.value, &record.value));

        let replace_id = match same_value {
            Some((_, current))
                if current.ttl == body.ttl
                    && current.priority == record.priority.or(current.priority)
                    && current.weight == record.weight.or(current.weight) =>
            {
                log::debug!(
                    "[cloudflare] {} {} already up to date",
                    record.name,
                    record.record_type
                );
                return Ok(());
            }
            Some((id, _)) => Some(id.clone()),
            // CNAME is single-valued: a different target replaces the existing one.
            None if record.record_type == DnsRecordType::Cname => {
                existing.first().map(|(id, _)| id.clone())
            }
            None => None,
        };

        let _: CloudflareDnsRecord = match replace_id {
            Some(id) => {
                self.put(&format!("/zones/{zone_id}/dns_records/{id}"), &body, context)
                    .await?
            }
            None => {
                self.post(&format!("/zones/{zone_id}/dns_records"), &body, context)
                    .await?
            }
        };
        Ok(())
    }
}

#[async_trait]
impl ZoneProvider for CloudflareProvider {
    fn id(&self) -> &'static str {
        "cloudflare"
    }

    async fn list_zones(&self) -> Result<Vec<RemoteZoneSummary>> {
        let zones: Vec<CloudflareZone> = self
            .get_all_pages("/zones", MAX_PAGE_SIZE_ZONES, ErrorContext::default())
            .await?;
        Ok(zones.into_iter().map(Self::zone_to_summary).collect())
    }

    async fn get_zone(&self, zone_id: &str) -> Result<ZoneDetail> {
        let zone: CloudflareZone = self
            .get(&format!("/zones/{zone_id}"), ErrorContext::zone(zone_id))
            .await?;
        let record_count = self
            .get_total_count(
                &format!("/zones/{zone_id}/dns_records?page=1&per_page=1"),
                ErrorContext::zone(zone_id),
            )
            .await?;

        Ok(Self::zone_to_detail(zone, record_count))
    }

    async fn create_zone(&self, name: &str, comment: Option<&str>) -> Result<CreatedZone> {
        let Some(account_id) = self.account_id.as_deref() else {
            return Err(ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: "account_id".to_string(),
                detail: "an account id is required to create zones".to_string(),
            });
        };
        if let Some(comment) = comment {
            log::debug!("[cloudflare] zone comments are not stored: {comment}");
        }

        let name = normalize_domain_name(name);
        let body = CreateZoneBody {
            name: &name,
            account: AccountRef { id: account_id },
            zone_type: "full",
        };
        let zone: CloudflareZone = self
            .post("/zones", &body, ErrorContext::zone(&name))
            .await?;

        log::info!("[cloudflare] created zone {} ({})", zone.name, zone.id);
        Ok(CreatedZone {
            zone_id: zone.id,
            name_servers: zone.name_servers,
        })
    }

    async fn delete_zone(&self, zone_id: &str) -> Result<()> {
        self.delete(&format!("/zones/{zone_id}"), ErrorContext::zone(zone_id))
            .await?;
        log::info!("[cloudflare] deleted zone {zone_id}");
        Ok(())
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<RemoteRecord>> {
        let zone_name = self.zone_name(zone_id).await?;
        let raw: Vec<CloudflareDnsRecord> = self
            .get_all_pages(
                &format!("/zones/{zone_id}/dns_records"),
                MAX_PAGE_SIZE_RECORDS,
                ErrorContext::zone(zone_id),
            )
            .await?;

        Ok(raw
            .iter()
            .filter_map(|cf| from_cf_record(cf, &zone_name))
            .collect())
    }

    async fn upsert_records(&self, zone_id: &str, records: &[RemoteRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let zone_name = self.zone_name(zone_id).await?;
        for record in records {
            self.upsert_one(zone_id, &zone_name, record).await?;
        }
        Ok(())
    }

    async fn delete_records(&self, zone_id: &str, records: &[RemoteRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let zone_name = self.zone_name(zone_id).await?;

        for record in records {
            let existing = self.records_at(zone_id, &zone_name, record).await?;
            for (id, _) in existing
                .iter()
                .filter(|(_, r)| values_match(record.record_type, &r.value, &record.value))
            {
                match self
                    .delete(
                        &format!("/zones/{zone_id}/dns_records/{id}"),
                        ErrorContext::record(zone_id, &record.name),
                    )
                    .await
                {
                    Ok(()) => {}
                    Err(e) if is_record_missing(&e) => {
                        log::debug!("[cloudflare] record {id} already gone");
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(())
    }
}
