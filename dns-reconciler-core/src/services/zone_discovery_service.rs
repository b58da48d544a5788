//! Zone 发现服务
//!
//! 为一个域名找出拥有它的远端 Zone：先精确匹配，再由近及远逐级尝试父域。
//! 多个候选时不做猜测，交由人工确认。

use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::types::{
    DiscoveredZone, DiscoveryAction, DiscoveryResult, RemoteZoneSummary, ZoneMatch,
    ZoneValidation,
};
use crate::validation::{canonical_domain_name, normalize_zone_name};

/// Zone 发现服务
pub struct ZoneDiscoveryService {
    ctx: Arc<ServiceContext>,
}

impl ZoneDiscoveryService {
    /// 创建 Zone 发现服务实例
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// 查找拥有 `domain_name` 的远端 Zone
    pub async fn discover(&self, domain_name: &str) -> CoreResult<DiscoveryResult> {
        Self::require_name(domain_name)?;
        let zones = self.fetch_zones().await?;
        Ok(match_zones(domain_name, &zones))
    }

    /// 批量发现，整批只列一次 Zone
    pub async fn discover_batch(
        &self,
        domain_names: &[String],
    ) -> CoreResult<Vec<(String, DiscoveryResult)>> {
        for name in domain_names {
            Self::require_name(name)?;
        }
        if domain_names.is_empty() {
            return Ok(Vec::new());
        }
        let zones = self.fetch_zones().await?;
        Ok(domain_names
            .iter()
            .map(|name| (name.clone(), match_zones(name, &zones)))
            .collect())
    }

    /// 确认域名落在 Zone 的后缀之内
    ///
    /// 私有 Zone 和超大 Zone 只产生警告。
    pub async fn validate_zone_for_domain(
        &self,
        domain_name: &str,
        zone_id: &str,
    ) -> CoreResult<ZoneValidation> {
        let zone = self
            .ctx
            .provider
            .get_zone(zone_id)
            .await
            .map_err(|e| self.ctx.handle_provider_error(format!("get zone {zone_id}"), e))?;

        let domain = canonical_domain_name(domain_name);
        let zone_name = canonical_domain_name(&zone.name);
        if domain != zone_name && !domain.ends_with(&format!(".{zone_name}")) {
            return Ok(ZoneValidation {
                valid: false,
                warnings: Vec::new(),
                error: Some(format!(
                    "{} is not within zone {}",
                    normalize_zone_name(&domain),
                    normalize_zone_name(&zone_name)
                )),
            });
        }

        let mut warnings = Vec::new();
        if zone.private_zone {
            warnings.push(format!(
                "zone {} is private and not resolvable from the public internet",
                normalize_zone_name(&zone_name)
            ));
        }
        let threshold = self.ctx.config.large_zone_threshold;
        if zone.record_count > threshold {
            warnings.push(format!(
                "zone {} has {} records (more than {threshold}); syncing it will be slow",
                normalize_zone_name(&zone_name),
                zone.record_count
            ));
        }
        Ok(ZoneValidation {
            valid: true,
            warnings,
            error: None,
        })
    }

    /// 列出远端全部 Zone（按名称排序）
    pub async fn list_remote_zones(&self) -> CoreResult<Vec<RemoteZoneSummary>> {
        let mut zones = self.fetch_zones().await?;
        zones.sort_by(|a, b| canonical_domain_name(&a.name).cmp(&canonical_domain_name(&b.name)));
        Ok(zones)
    }

    async fn fetch_zones(&self) -> CoreResult<Vec<RemoteZoneSummary>> {
        let zones = self
            .ctx
            .provider
            .list_zones()
            .await
            .map_err(|e| self.ctx.handle_provider_error("list zones", e))?;
        log::debug!("Fetched {} zones from {}", zones.len(), self.ctx.provider.id());
        Ok(zones)
    }

    fn require_name(domain_name: &str) -> CoreResult<()> {
        if canonical_domain_name(domain_name).is_empty() {
            return Err(CoreError::Validation("domain name is required".into()));
        }
        Ok(())
    }
}

/// 在已获取的 Zone 列表中为 `domain_name` 匹配归属 Zone
fn match_zones(domain_name: &str, zones: &[RemoteZoneSummary]) -> DiscoveryResult {
    let fqdn = normalize_zone_name(domain_name);
    let find = |target: &str, kind: ZoneMatch| -> Vec<DiscoveredZone> {
        zones
            .iter()
            .filter(|z| normalize_zone_name(&z.name) == target)
            .map(|z| DiscoveredZone::from_summary(z, kind))
            .collect()
    };

    let exact = find(&fqdn, ZoneMatch::Exact);
    if exact.len() == 1 {
        return DiscoveryResult {
            domain: fqdn,
            found: true,
            zone: exact.first().cloned(),
            candidates: exact,
            action: DiscoveryAction::UseExisting,
            reason: "exact zone match".into(),
        };
    }

    // a.b.c.com. -> b.c.com. -> c.com.（不尝试 TLD）
    let canonical = canonical_domain_name(domain_name);
    let labels: Vec<&str> = canonical.split('.').collect();
    let mut candidates = exact;
    for start in 1..labels.len().saturating_sub(1) {
        let parent = format!("{}.", labels[start..].join("."));
        candidates.extend(find(&parent, ZoneMatch::Parent));
    }

    match candidates.len() {
        0 => DiscoveryResult {
            domain: fqdn,
            found: false,
            zone: None,
            candidates,
            action: DiscoveryAction::CreateNew,
            reason: "no remote zone owns this name".into(),
        },
        1 => {
            let zone = candidates.first().cloned();
            let reason = zone
                .as_ref()
                .map(|z| format!("parent zone {} owns this name", z.name))
                .unwrap_or_default();
            DiscoveryResult {
                domain: fqdn,
                found: true,
                zone,
                candidates,
                action: DiscoveryAction::UseExisting,
                reason,
            }
        }
        n => DiscoveryResult {
            domain: fqdn,
            found: false,
            zone: None,
            candidates,
            action: DiscoveryAction::ManualReview,
            reason: format!("{n} zones could own this name; choose one manually"),
        },
    }
}

#[cfg(test)]
mod tests {
    use dns_reconciler_provider::ZoneDetail;

    use super::*;
    use crate::test_utils::create_test_discovery_service;

    #[tokio::test]
    async fn parent_zone_is_used_for_subdomain() {
        let (service, _, provider) = create_test_discovery_service();
        provider.add_zone("z1", "example.com.").await;
        provider.add_zone("z2", "other.org").await;

        let result = service.discover("api.example.com").await.unwrap();
        assert!(result.found);
        assert_eq!(result.action, DiscoveryAction::UseExisting);
        let zone = result.zone.unwrap();
        assert_eq!(zone.name, "example.com.");
        assert_eq!(zone.match_kind, ZoneMatch::Parent);
        assert_eq!(result.domain, "api.example.com.");
    }

    #[tokio::test]
    async fn exact_match_wins_over_parent() {
        let (service, _, provider) = create_test_discovery_service();
        provider.add_zone("z1", "example.com").await;
        provider.add_zone("z2", "api.example.com").await;

        let result = service.discover("API.example.com.").await.unwrap();
        assert_eq!(result.action, DiscoveryAction::UseExisting);
        assert_eq!(result.zone.unwrap().id, "z2");
        assert_eq!(result.candidates.len(), 1);
    }

    #[tokio::test]
    async fn several_parents_require_manual_review() {
        let (service, _, provider) = create_test_discovery_service();
        provider.add_zone("z1", "example.com").await;
        provider.add_zone("z2", "b.example.com").await;

        let result = service.discover("a.b.example.com").await.unwrap();
        assert_eq!(result.action, DiscoveryAction::ManualReview);
        assert!(!result.found);
        assert!(result.zone.is_none());
        let ids: Vec<_> = result.candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["z2", "z1"]);
    }

    #[tokio::test]
    async fn unknown_name_suggests_create() {
        let (service, _, provider) = create_test_discovery_service();
        provider.add_zone("z1", "example.com").await;

        let result = service.discover("example.net").await.unwrap();
        assert_eq!(result.action, DiscoveryAction::CreateNew);
        assert!(!result.found);
        assert!(result.candidates.is_empty());
    }

    #[tokio::test]
    async fn found_never_comes_with_manual_review() {
        let (service, _, provider) = create_test_discovery_service();
        for (id, name) in [
            ("z1", "example.com"),
            ("z2", "b.example.com"),
            ("z3", "dup.org"),
            ("z4", "dup.org."),
            ("z5", "c.b.example.com"),
        ] {
            provider.add_zone(id, name).await;
        }
        let names = [
            "example.com",
            "b.example.com",
            "x.b.example.com",
            "x.c.b.example.com",
            "dup.org",
            "www.dup.org",
            "nothing.test",
            "com",
        ];
        for name in names {
            let result = service.discover(name).await.unwrap();
            assert!(
                !(result.found && result.action == DiscoveryAction::ManualReview),
                "{name}: {result:?}"
            );
            assert_eq!(result.found, result.zone.is_some(), "{name}");
        }
    }

    #[tokio::test]
    async fn batch_lists_zones_once() {
        let (service, _, provider) = create_test_discovery_service();
        provider.add_zone("z1", "example.com").await;

        let names: Vec<String> = ["a.example.com", "b.example.com", "example.org"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let results = service.discover_batch(&names).await.unwrap();

        assert_eq!(provider.list_zones_calls(), 1);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, "a.example.com");
        assert_eq!(results[2].1.action, DiscoveryAction::CreateNew);
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let (service, _, provider) = create_test_discovery_service();
        let err = service.discover("  ").await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(provider.list_zones_calls(), 0);
    }

    #[tokio::test]
    async fn zone_validation_checks_suffix_and_warns() {
        let (service, _, provider) = create_test_discovery_service();
        provider
            .add_zone_detail(ZoneDetail {
                id: "z1".into(),
                name: "example.com".into(),
                record_count: 5000,
                created_at: None,
                private_zone: true,
                name_servers: Vec::new(),
                comment: None,
            })
            .await;

        let ok = service
            .validate_zone_for_domain("shop.example.com", "z1")
            .await
            .unwrap();
        assert!(ok.valid);
        assert_eq!(ok.warnings.len(), 2);

        let bad = service
            .validate_zone_for_domain("notexample.com", "z1")
            .await
            .unwrap();
        assert!(!bad.valid);
        assert!(bad.error.unwrap().contains("not within zone example.com."));
    }

    #[tokio::test]
    async fn zone_validation_surfaces_missing_zone() {
        let (service, _, _) = create_test_discovery_service();
        let err = service
            .validate_zone_for_domain("example.com", "missing")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Provider { .. }));
        assert!(err.is_expected());
    }

    #[tokio::test]
    async fn remote_zones_are_sorted() {
        let (service, _, provider) = create_test_discovery_service();
        provider.add_zone("z1", "zeta.com").await;
        provider.add_zone("z2", "Alpha.com").await;

        let zones = service.list_remote_zones().await.unwrap();
        let names: Vec<_> = zones.iter().map(|z| z.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha.com", "zeta.com"]);
    }
}
