//! DNS 记录持久化抽象 Trait

use async_trait::async_trait;

use dns_reconciler_provider::DnsRecordType;

use crate::error::CoreResult;
use crate::types::{DnsRecord, NewDnsRecord};

/// DNS 记录仓库 Trait
///
/// 名称比较不区分大小写；调用方传入的名称已经过规范化。
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// 根据 ID 获取记录
    async fn find_by_id(&self, id: i64) -> CoreResult<Option<DnsRecord>>;

    /// 获取域名下的全部记录
    async fn find_by_domain(&self, domain_id: i64) -> CoreResult<Vec<DnsRecord>>;

    /// 获取域名下某名称的全部记录（任意类型）
    async fn find_by_domain_and_name(&self, domain_id: i64, name: &str)
        -> CoreResult<Vec<DnsRecord>>;

    /// 按同步键 `(domain_id, name, type)` 查找（可能有多个值）
    async fn find_by_key(
        &self,
        domain_id: i64,
        name: &str,
        record_type: DnsRecordType,
    ) -> CoreResult<Vec<DnsRecord>>;

    /// 获取某路由创建的全部记录
    async fn find_by_route(&self, route_id: i64) -> CoreResult<Vec<DnsRecord>>;

    /// 统计域名下的记录数
    async fn count_by_domain(&self, domain_id: i64) -> CoreResult<u32>;

    /// 插入新记录
    async fn create(&self, record: &NewDnsRecord) -> CoreResult<DnsRecord>;

    /// 整体更新记录（按 `record.id`），刷新 `updated_at`
    async fn update(&self, record: &DnsRecord) -> CoreResult<DnsRecord>;

    /// 删除记录；记录不存在时返回 `CoreError::RecordNotFound`
    async fn delete(&self, id: i64) -> CoreResult<()>;
}
