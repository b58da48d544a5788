//! 记录同步服务
//!
//! 以远端为准收敛本地镜像：远端独有的记录在本地创建，值漂移的记录被远端覆盖，
//! 本地独有的记录视为已在远端删除。SOA/NS 不参与同步。

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use crate::error::{CoreError, CoreResult};
use crate::services::{log_failure, ServiceContext};
use crate::types::{
    DnsRecord, DnsRecordType, DomainSyncOutcome, NewDnsRecord, RecordUpdate, RemoteRecord,
    SyncError, SyncOperation, SyncPlan, SyncResult,
};

/// 记录同步服务
pub struct ReconcileService {
    ctx: Arc<ServiceContext>,
}

impl ReconcileService {
    /// 创建同步服务实例
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// 同步一个域名
    ///
    /// 按 创建 → 更新 → 删除 的顺序应用；单条失败被收集而不中断。
    /// 无论是否有单条失败，都会刷新 `last_synced_at` 和 `record_count`。
    pub async fn sync(&self, domain_id: i64) -> CoreResult<SyncResult> {
        let started = Instant::now();
        let plan = self.plan(domain_id).await?;

        let mut errors = Vec::new();
        let mut created_count = 0;
        let mut updated_count = 0;
        let mut deleted_count = 0;

        for remote in &plan.to_create {
            let new = NewDnsRecord::from_remote(domain_id, remote);
            match self.ctx.record_repository.create(&new).await {
                Ok(_) => created_count += 1,
                Err(e) => errors.push(sync_error(
                    SyncOperation::Create,
                    &remote.name,
                    remote.record_type,
                    &e,
                )),
            }
        }

        for RecordUpdate { current, remote } in &plan.to_update {
            let mut record = current.clone();
            record.apply_remote(remote);
            match self.ctx.record_repository.update(&record).await {
                Ok(_) => updated_count += 1,
                Err(e) => errors.push(sync_error(
                    SyncOperation::Update,
                    &record.name,
                    record.record_type,
                    &e,
                )),
            }
        }

        for record in &plan.to_delete {
            match self.ctx.record_repository.delete(record.id).await {
                Ok(()) => deleted_count += 1,
                Err(e) => errors.push(sync_error(
                    SyncOperation::Delete,
                    &record.name,
                    record.record_type,
                    &e,
                )),
            }
        }

        let count = self.ctx.record_repository.count_by_domain(domain_id).await?;
        let mut domain = self.ctx.get_domain(domain_id).await?;
        domain.record_count = count;
        domain.last_synced_at = Some(Utc::now());
        let domain = self.ctx.domain_repository.update(&domain).await?;

        let result = SyncResult {
            domain_id,
            success: errors.is_empty(),
            synced_count: created_count + updated_count + plan.unchanged,
            created_count,
            updated_count,
            deleted_count,
            unchanged_count: plan.unchanged,
            errors,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        if result.success {
            log::info!(
                "Synced {}: +{} ~{} -{} ={}",
                domain.name,
                created_count,
                updated_count,
                deleted_count,
                plan.unchanged
            );
        } else {
            log::warn!(
                "Synced {} with {} error(s)",
                domain.name,
                result.errors.len()
            );
        }
        Ok(result)
    }

    /// 依次同步所有已关联 Zone 的域名
    pub async fn sync_all(&self) -> CoreResult<Vec<DomainSyncOutcome>> {
        let domains = self.ctx.domain_repository.find_all().await?;
        let mut outcomes = Vec::new();
        for domain in domains.into_iter().filter(|d| d.zone_id().is_some()) {
            let outcome = match self.sync(domain.id).await {
                Ok(result) => DomainSyncOutcome {
                    domain_id: domain.id,
                    domain_name: domain.name,
                    result: Some(result),
                    error: None,
                },
                Err(e) => {
                    log_failure(&e);
                    DomainSyncOutcome {
                        domain_id: domain.id,
                        domain_name: domain.name,
                        result: None,
                        error: Some(e),
                    }
                }
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// 只计算差异，不做任何修改
    pub async fn preview(&self, domain_id: i64) -> CoreResult<SyncPlan> {
        self.plan(domain_id).await
    }

    async fn plan(&self, domain_id: i64) -> CoreResult<SyncPlan> {
        let domain = self.ctx.get_domain(domain_id).await?;
        let zone_id = ServiceContext::require_zone(&domain)?;

        let remote = self
            .ctx
            .provider
            .list_records(zone_id)
            .await
            .map_err(|e| {
                self.ctx
                    .handle_provider_error(format!("list records of {}", domain.name), e)
            })?;
        let local = self.ctx.record_repository.find_by_domain(domain_id).await?;
        log::debug!(
            "{}: {} remote, {} local records",
            domain.name,
            remote.len(),
            local.len()
        );
        Ok(diff_records(local, remote))
    }
}

fn sync_error(
    operation: SyncOperation,
    name: &str,
    record_type: DnsRecordType,
    err: &CoreError,
) -> SyncError {
    log_failure(err);
    SyncError {
        operation,
        name: name.to_string(),
        record_type,
        message: err.to_string(),
    }
}

/// 按 `(name, type)` 分组比较本地与远端
///
/// 同一键下先配对值相同的记录，剩余的按顺序两两配对（值漂移视为更新），
/// 多出来的远端记录创建，多出来的本地记录删除。
fn diff_records(local: Vec<DnsRecord>, remote: Vec<RemoteRecord>) -> SyncPlan {
    type Group = (Vec<DnsRecord>, Vec<RemoteRecord>);
    let mut groups: BTreeMap<(String, DnsRecordType), Group> = BTreeMap::new();
    for record in local.into_iter().filter(|r| !r.record_type.is_provider_managed()) {
        groups.entry(record.key()).or_default().0.push(record);
    }
    for record in remote.into_iter().filter(|r| !r.record_type.is_provider_managed()) {
        groups.entry(record.key()).or_default().1.push(record);
    }

    let mut plan = SyncPlan::default();
    for (_, (mut locals, remotes)) in groups {
        locals.sort_by_key(|r| r.id);
        let mut unmatched_remote = Vec::new();

        for remote in remotes {
            match locals.iter().position(|l| l.value == remote.value) {
                Some(pos) => {
                    let current = locals.remove(pos);
                    if current.differs_from(&remote) {
                        plan.to_update.push(RecordUpdate { current, remote });
                    } else {
                        plan.unchanged += 1;
                    }
                }
                None => unmatched_remote.push(remote),
            }
        }

        let mut locals = locals.into_iter();
        for remote in unmatched_remote {
            match locals.next() {
                Some(current) => plan.to_update.push(RecordUpdate { current, remote }),
                None => plan.to_create.push(remote),
            }
        }
        plan.to_delete.extend(locals);
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::RecordService;
    use crate::test_utils::{create_test_context, create_test_reconcile_service, seed_linked_domain};
    use crate::types::{CreateRecordRequest, RecordSource};

    fn a(name: &str, value: &str) -> RemoteRecord {
        RemoteRecord::new(name, DnsRecordType::A, value, 300)
    }

    #[tokio::test]
    async fn removed_remote_record_is_deleted_locally() {
        let (service, store, provider) = create_test_reconcile_service();
        let domain = seed_linked_domain(&store, &provider).await;
        store
            .seed_record(domain.id, &a("old", "192.0.2.1"), RecordSource::Local)
            .await;

        let result = service.sync(domain.id).await.unwrap();

        assert!(result.success);
        assert_eq!(result.deleted_count, 1);
        assert!(result.errors.is_empty());
        assert!(store.records_of(domain.id).await.is_empty());
    }

    #[tokio::test]
    async fn remote_only_records_are_created_as_remote() {
        let (service, store, provider) = create_test_reconcile_service();
        let domain = seed_linked_domain(&store, &provider).await;
        let mut mx = RemoteRecord::new("@", DnsRecordType::Mx, "10 mx.example.com", 3600);
        mx.priority = Some(10);
        provider
            .set_records(
                "zone-example",
                vec![
                    a("www", "192.0.2.1"),
                    mx,
                    RemoteRecord::new("@", DnsRecordType::Ns, "ns1.mock-dns.test", 86400),
                    RemoteRecord::new("@", DnsRecordType::Soa, "ns1 hostmaster 1 2 3 4 5", 3600),
                ],
            )
            .await;

        let result = service.sync(domain.id).await.unwrap();

        assert_eq!(result.created_count, 2);
        assert_eq!(result.synced_count, 2);
        let rows = store.records_of(domain.id).await;
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.source == RecordSource::Remote));
        assert!(rows.iter().all(|r| !r.record_type.is_provider_managed()));
        let domain = store.domain(domain.id).await;
        assert_eq!(domain.record_count, 2);
        assert!(domain.last_synced_at.is_some());
    }

    #[tokio::test]
    async fn drifted_values_are_overwritten_by_remote() {
        let (service, store, provider) = create_test_reconcile_service();
        let domain = seed_linked_domain(&store, &provider).await;
        let local = store
            .seed_record(domain.id, &a("www", "192.0.2.1"), RecordSource::Local)
            .await;
        let ttl_only = store
            .seed_record(domain.id, &a("api", "192.0.2.5"), RecordSource::Local)
            .await;
        provider
            .set_records(
                "zone-example",
                vec![
                    a("www", "198.51.100.7"),
                    RemoteRecord::new("api", DnsRecordType::A, "192.0.2.5", 60),
                ],
            )
            .await;

        let result = service.sync(domain.id).await.unwrap();

        assert_eq!(result.updated_count, 2);
        assert_eq!(result.created_count, 0);
        assert_eq!(result.deleted_count, 0);
        let rows = store.records_of(domain.id).await;
        let www = rows.iter().find(|r| r.id == local.id).unwrap();
        assert_eq!(www.value, "198.51.100.7");
        assert_eq!(www.source, RecordSource::Local);
        let api = rows.iter().find(|r| r.id == ttl_only.id).unwrap();
        assert_eq!(api.ttl, 60);
    }

    #[test]
    fn identical_values_pair_before_positional_updates() {
        let now = Utc::now();
        let local = |id: i64, value: &str| DnsRecord {
            id,
            domain_id: 1,
            name: "www".into(),
            record_type: DnsRecordType::A,
            value: value.into(),
            ttl: 300,
            priority: None,
            weight: None,
            source: RecordSource::Remote,
            created_by_route_id: None,
            created_at: now,
            updated_at: now,
        };

        let plan = diff_records(
            vec![local(1, "192.0.2.1"), local(2, "192.0.2.2")],
            vec![a("www", "192.0.2.2"), a("www", "192.0.2.3")],
        );
        assert_eq!(plan.unchanged, 1);
        assert_eq!(plan.to_update.len(), 1);
        assert_eq!(plan.to_update[0].current.id, 1);
        assert_eq!(plan.to_update[0].remote.value, "192.0.2.3");
        assert!(plan.to_create.is_empty());
        assert!(plan.to_delete.is_empty());

        let plan = diff_records(
            vec![local(1, "192.0.2.1")],
            vec![a("www", "192.0.2.1"), a("www", "192.0.2.9"), a("WWW", "192.0.2.8")],
        );
        assert_eq!(plan.unchanged, 1);
        assert_eq!(plan.to_create.len(), 2);

        let plan = diff_records(vec![local(1, "192.0.2.1"), local(2, "192.0.2.2")], Vec::new());
        assert_eq!(plan.to_delete.len(), 2);
    }

    #[tokio::test]
    async fn second_sync_is_a_no_op() {
        let (service, store, provider) = create_test_reconcile_service();
        let domain = seed_linked_domain(&store, &provider).await;
        store
            .seed_record(domain.id, &a("gone", "192.0.2.1"), RecordSource::Local)
            .await;
        store
            .seed_record(domain.id, &a("www", "192.0.2.1"), RecordSource::Local)
            .await;
        provider
            .set_records(
                "zone-example",
                vec![a("www", "192.0.2.2"), a("new", "192.0.2.3")],
            )
            .await;

        let first = service.sync(domain.id).await.unwrap();
        assert_eq!(
            (first.created_count, first.updated_count, first.deleted_count),
            (1, 1, 1)
        );

        let second = service.sync(domain.id).await.unwrap();
        assert_eq!(
            (second.created_count, second.updated_count, second.deleted_count),
            (0, 0, 0)
        );
        assert_eq!(second.unchanged_count, 2);
        assert_eq!(second.synced_count, 2);
    }

    #[tokio::test]
    async fn created_record_survives_sync_unchanged() {
        let (ctx, store, provider) = create_test_context();
        let records = RecordService::new(ctx.clone());
        let reconciler = ReconcileService::new(ctx);
        let domain = seed_linked_domain(&store, &provider).await;

        let created = records
            .create_record(
                CreateRecordRequest::new(domain.id, "a", DnsRecordType::A, "1.2.3.4").with_ttl(300),
            )
            .await;
        assert!(created.success);

        let result = reconciler.sync(domain.id).await.unwrap();
        assert_eq!(result.unchanged_count, 1);

        let rows = store.records_of(domain.id).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(Some(rows[0].id), created.record_id);
        assert_eq!(rows[0].value, "1.2.3.4");
        assert_eq!(rows[0].ttl, 300);
    }

    #[tokio::test]
    async fn created_cname_with_trailing_dot_survives_sync() {
        let (ctx, store, provider) = create_test_context();
        let records = RecordService::new(ctx.clone());
        let reconciler = ReconcileService::new(ctx);
        let domain = seed_linked_domain(&store, &provider).await;

        let created = records
            .create_record(CreateRecordRequest::new(
                domain.id,
                "cdn",
                DnsRecordType::Cname,
                "CDN.Example.net.",
            ))
            .await;
        assert!(created.success, "{created:?}");
        assert_eq!(store.records_of(domain.id).await[0].value, "cdn.example.net");

        // 远端回显去掉末尾点的目标
        provider
            .set_records(
                "zone-example",
                vec![RemoteRecord::new("cdn", DnsRecordType::Cname, "cdn.example.net", 300)],
            )
            .await;

        let result = reconciler.sync(domain.id).await.unwrap();
        assert_eq!(result.updated_count, 0);
        assert_eq!(result.unchanged_count, 1);
    }

    #[tokio::test]
    async fn record_count_matches_rows_after_sync() {
        let (service, store, provider) = create_test_reconcile_service();
        let domain = seed_linked_domain(&store, &provider).await;
        store
            .seed_record(domain.id, &a("x", "192.0.2.1"), RecordSource::Local)
            .await;
        provider
            .set_records(
                "zone-example",
                vec![a("a", "192.0.2.1"), a("b", "192.0.2.2"), a("b", "192.0.2.3")],
            )
            .await;

        service.sync(domain.id).await.unwrap();

        let rows = store.records_of(domain.id).await;
        assert_eq!(rows.len(), 3);
        assert_eq!(store.domain(domain.id).await.record_count, 3);
    }

    #[tokio::test]
    async fn per_record_failures_are_collected() {
        let (service, store, provider) = create_test_reconcile_service();
        let domain = seed_linked_domain(&store, &provider).await;
        store
            .seed_record(domain.id, &a("gone", "192.0.2.1"), RecordSource::Local)
            .await;
        provider
            .set_records("zone-example", vec![a("a", "192.0.2.1"), a("b", "192.0.2.2")])
            .await;
        store.set_record_create_error(Some("disk full".into())).await;

        let result = service.sync(domain.id).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].operation, SyncOperation::Create);
        assert_eq!(result.deleted_count, 1);
        let domain = store.domain(domain.id).await;
        assert!(domain.last_synced_at.is_some());
        assert_eq!(domain.record_count, 0);
    }

    #[tokio::test]
    async fn unlinked_domain_cannot_sync() {
        let (service, store, _) = create_test_reconcile_service();
        let domain = store.seed_domain("example.org", None).await;
        let err = service.sync(domain.id).await.unwrap_err();
        assert!(matches!(err, CoreError::ZoneNotLinked(_)));
    }

    #[tokio::test]
    async fn sync_all_reports_each_linked_domain() {
        let (service, store, provider) = create_test_reconcile_service();
        seed_linked_domain(&store, &provider).await;
        store.seed_domain("lost.com", Some("zone-missing")).await;
        store.seed_domain("unlinked.com", None).await;
        provider
            .set_records("zone-example", vec![a("www", "192.0.2.1")])
            .await;

        let outcomes = service.sync_all().await.unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].domain_name, "example.com");
        assert_eq!(outcomes[0].result.as_ref().unwrap().created_count, 1);
        assert_eq!(outcomes[1].domain_name, "lost.com");
        assert!(matches!(outcomes[1].error, Some(CoreError::Provider { .. })));
    }

    #[tokio::test]
    async fn preview_does_not_modify_anything() {
        let (service, store, provider) = create_test_reconcile_service();
        let domain = seed_linked_domain(&store, &provider).await;
        store
            .seed_record(domain.id, &a("gone", "192.0.2.1"), RecordSource::Local)
            .await;
        provider
            .set_records("zone-example", vec![a("new", "192.0.2.2")])
            .await;

        let plan = service.preview(domain.id).await.unwrap();

        assert_eq!(plan.to_create.len(), 1);
        assert_eq!(plan.to_delete.len(), 1);
        assert!(!plan.is_empty());
        assert_eq!(store.records_of(domain.id).await.len(), 1);
        assert!(store.domain(domain.id).await.last_synced_at.is_none());
    }
}
