//! Zone 创建服务
//!
//! 先在远端创建 Zone，再写本地 `Domain`。本地写入失败时远端 Zone 成为孤儿，
//! 结果中保留 `zone_id`，由 [`ZoneProvisioningService::cleanup_orphaned_zone`] 清理。

use std::sync::Arc;

use chrono::Utc;

use dns_reconciler_provider::ProviderError;

use crate::error::{CoreError, CoreResult};
use crate::services::{log_failure, ServiceContext};
use crate::types::{
    BatchZoneCreationResult, CreateZoneOptions, DelegationStatus, Domain, NewDomain,
    ZoneCreationResult, ZoneDetail,
};
use crate::validation::{canonical_domain_name, validate_domain_name};

/// Zone 创建服务
pub struct ZoneProvisioningService {
    ctx: Arc<ServiceContext>,
}

impl ZoneProvisioningService {
    /// 创建 Zone 创建服务实例
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// 创建远端 Zone 并关联本地域名
    ///
    /// 已存在但未关联 Zone 的域名走更新路径；否则新建 `Pending` 域名。
    /// 从不把委派状态置为 `Completed`。
    pub async fn create_zone(
        &self,
        domain_name: &str,
        options: &CreateZoneOptions,
    ) -> ZoneCreationResult {
        let name = canonical_domain_name(domain_name);

        if !options.skip_validation {
            if let Err(e) = validate_domain_name(&name) {
                log_failure(&e);
                return ZoneCreationResult::failed(name, e);
            }
        }

        let existing = match self.ctx.domain_repository.find_by_name(&name).await {
            Ok(existing) => existing,
            Err(e) => {
                log_failure(&e);
                return ZoneCreationResult::failed(name, e);
            }
        };
        if let Some(zone_id) = existing.as_ref().and_then(Domain::zone_id) {
            let e = CoreError::ZoneAlreadyLinked {
                domain: name.clone(),
                zone_id: zone_id.to_string(),
            };
            log_failure(&e);
            return ZoneCreationResult::failed(name, e);
        }

        let created = match self
            .ctx
            .provider
            .create_zone(&name, options.comment.as_deref())
            .await
        {
            Ok(created) => created,
            Err(e) => {
                let e = self.ctx.handle_provider_error(format!("create zone {name}"), e);
                return ZoneCreationResult::failed(name, e);
            }
        };
        log::info!(
            "Created zone {} for {name} at {}",
            created.zone_id,
            self.ctx.provider.id()
        );

        let linked = match existing {
            Some(mut domain) => {
                domain.remote_zone_id = Some(created.zone_id.clone());
                domain.zone_created_at = Some(Utc::now());
                domain.delegation_status = DelegationStatus::Pending;
                self.ctx.domain_repository.update(&domain).await
            }
            None => {
                let domain = NewDomain {
                    name: name.clone(),
                    remote_zone_id: Some(created.zone_id.clone()),
                    delegation_status: DelegationStatus::Pending,
                    zone_created_at: Some(Utc::now()),
                };
                self.ctx.domain_repository.create(&domain).await
            }
        };

        match linked {
            Ok(domain) => ZoneCreationResult {
                success: true,
                domain_name: name,
                zone_id: Some(created.zone_id),
                name_servers: created.name_servers,
                domain_id: Some(domain.id),
                error: None,
                warnings: Vec::new(),
            },
            Err(e) => {
                let warning = format!(
                    "zone {} was created remotely but {name} could not be saved locally; \
                     the remote zone is orphaned until cleaned up",
                    created.zone_id
                );
                log::warn!("{warning}");
                log::error!("Local write for {name} failed after zone creation: {e}");
                ZoneCreationResult {
                    success: false,
                    domain_name: name,
                    zone_id: Some(created.zone_id),
                    name_servers: created.name_servers,
                    domain_id: None,
                    error: Some(CoreError::Consistency(e.to_string())),
                    warnings: vec![warning],
                }
            }
        }
    }

    /// 依次创建多个 Zone，每个请求之间固定间隔，互不影响
    pub async fn create_zones_batch(
        &self,
        domain_names: &[String],
        options: &CreateZoneOptions,
    ) -> BatchZoneCreationResult {
        let delay = self.ctx.config.batch_delay();
        let mut results = Vec::with_capacity(domain_names.len());

        for (i, name) in domain_names.iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            results.push(self.create_zone(name, options).await);
        }

        let success_count = results.iter().filter(|r| r.success).count();
        log::info!(
            "Batch zone creation: {success_count}/{} succeeded",
            results.len()
        );
        BatchZoneCreationResult {
            failed_count: results.len() - success_count,
            success_count,
            results,
        }
    }

    /// 删除孤儿 Zone，并把对应域名标记为 `Failed`
    ///
    /// 远端 Zone 已不存在时视为已清理。未给出 `domain_id` 时按 Zone ID 查找本地域名。
    pub async fn cleanup_orphaned_zone(
        &self,
        zone_id: &str,
        domain_id: Option<i64>,
    ) -> CoreResult<()> {
        match self.ctx.provider.delete_zone(zone_id).await {
            Ok(()) => log::info!("Deleted orphaned zone {zone_id}"),
            Err(ProviderError::ZoneNotFound { .. }) => {
                log::warn!("Orphaned zone {zone_id} is already gone");
            }
            Err(e) => {
                return Err(self
                    .ctx
                    .handle_provider_error(format!("delete orphaned zone {zone_id}"), e));
            }
        }

        let domain = match domain_id {
            Some(id) => Some(self.ctx.get_domain(id).await?),
            None => self.ctx.domain_repository.find_by_zone_id(zone_id).await?,
        };
        let Some(mut domain) = domain else {
            return Ok(());
        };
        if domain.zone_id() == Some(zone_id) {
            domain.remote_zone_id = None;
            domain.zone_created_at = None;
        }
        domain.delegation_status = DelegationStatus::Failed;
        self.ctx.domain_repository.update(&domain).await?;
        log::warn!("Domain {} marked as failed", domain.name);
        Ok(())
    }

    /// 获取域名关联 Zone 的远端详情（含 NS，用于委派说明）
    pub async fn get_zone_info(&self, domain_id: i64) -> CoreResult<ZoneDetail> {
        let domain = self.ctx.get_domain(domain_id).await?;
        let zone_id = ServiceContext::require_zone(&domain)?;
        self.ctx
            .provider
            .get_zone(zone_id)
            .await
            .map_err(|e| self.ctx.handle_provider_error(format!("get zone {zone_id}"), e))
    }
}
