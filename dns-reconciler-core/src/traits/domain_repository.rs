//! 域名持久化抽象 Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{Domain, NewDomain};

/// 域名仓库 Trait
///
/// 实现:
/// - `SqliteStore` (`SeaORM`, dns-reconciler-app)
/// - `MockStore` (内存, 测试)
#[async_trait]
pub trait DomainRepository: Send + Sync {
    /// 获取所有域名（按名称排序）
    async fn find_all(&self) -> CoreResult<Vec<Domain>>;

    /// 根据 ID 获取域名
    async fn find_by_id(&self, id: i64) -> CoreResult<Option<Domain>>;

    /// 根据规范名称获取域名（小写、无末尾点）
    async fn find_by_name(&self, name: &str) -> CoreResult<Option<Domain>>;

    /// 根据远端 Zone ID 获取域名
    async fn find_by_zone_id(&self, zone_id: &str) -> CoreResult<Option<Domain>>;

    /// 插入新域名，返回带 ID 和时间戳的完整实体
    ///
    /// 名称冲突时返回 `CoreError::Storage`
    async fn create(&self, domain: &NewDomain) -> CoreResult<Domain>;

    /// 整体更新域名（按 `domain.id`），刷新 `updated_at`
    async fn update(&self, domain: &Domain) -> CoreResult<Domain>;

    /// 删除域名及其全部记录（不会删除远端 Zone）；域名不存在时返回 `CoreError::DomainNotFound`
    async fn delete(&self, id: i64) -> CoreResult<()>;
}
