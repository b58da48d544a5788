//! 业务逻辑服务层

mod conflict_service;
mod reconcile_service;
mod record_service;
mod zone_discovery_service;
mod zone_provisioning_service;

pub use conflict_service::ConflictValidator;
pub use reconcile_service::ReconcileService;
pub use record_service::RecordService;
pub use zone_discovery_service::ZoneDiscoveryService;
pub use zone_provisioning_service::ZoneProvisioningService;

use std::sync::Arc;

use dns_reconciler_provider::{ProviderError, ZoneProvider};

use crate::config::ReconcilerConfig;
use crate::error::{CoreError, CoreResult};
use crate::traits::{DomainRepository, RecordRepository};
use crate::types::Domain;

/// 服务上下文 - 持有所有依赖
///
/// 平台层需要创建此上下文，并注入 provider 和存储实现。
pub struct ServiceContext {
    /// 远端 DNS provider
    pub provider: Arc<dyn ZoneProvider>,
    /// 域名仓库
    pub domain_repository: Arc<dyn DomainRepository>,
    /// 记录仓库
    pub record_repository: Arc<dyn RecordRepository>,
    /// 引擎参数
    pub config: ReconcilerConfig,
}

impl ServiceContext {
    /// 创建服务上下文
    #[must_use]
    pub fn new(
        provider: Arc<dyn ZoneProvider>,
        domain_repository: Arc<dyn DomainRepository>,
        record_repository: Arc<dyn RecordRepository>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            provider,
            domain_repository,
            record_repository,
            config,
        }
    }

    /// 按 ID 获取域名，不存在时返回 `DomainNotFound`
    pub async fn get_domain(&self, domain_id: i64) -> CoreResult<Domain> {
        self.domain_repository
            .find_by_id(domain_id)
            .await?
            .ok_or_else(|| CoreError::DomainNotFound(domain_id.to_string()))
    }

    /// 域名关联的 Zone ID，未关联时返回 `ZoneNotLinked`
    pub fn require_zone(domain: &Domain) -> CoreResult<&str> {
        domain
            .zone_id()
            .ok_or_else(|| CoreError::ZoneNotLinked(domain.name.clone()))
    }

    /// 按实际行数重写 `Domain.record_count`
    pub async fn refresh_record_count(&self, domain_id: i64) -> CoreResult<Domain> {
        let count = self.record_repository.count_by_domain(domain_id).await?;
        let mut domain = self.get_domain(domain_id).await?;
        if domain.record_count == count {
            return Ok(domain);
        }
        domain.record_count = count;
        self.domain_repository.update(&domain).await
    }

    /// 包装 Provider 错误并按预期与否分级记录日志
    pub fn handle_provider_error(&self, context: impl Into<String>, err: ProviderError) -> CoreError {
        let err = CoreError::provider(context, err);
        log_failure(&err);
        err
    }
}

/// 预期错误记 warn，其余记 error
pub(crate) fn log_failure(err: &CoreError) {
    if err.is_expected() {
        log::warn!("{err}");
    } else {
        log::error!("{err}");
    }
}
