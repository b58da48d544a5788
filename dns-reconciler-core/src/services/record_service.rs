//! 记录写入服务
//!
//! 先写本地，再同步远端；远端失败时删除刚写入的本地行，
//! 保证本地不会声称拥有远端不存在的记录。

use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::services::conflict_service::existing_record_conflicts;
use crate::services::{log_failure, ServiceContext};
use crate::types::{
    BatchRecordResult, ConflictType, CreateRecordRequest, DnsRecord, DnsRecordType, Domain,
    NewDnsRecord, ProposedRecord, RecordMutationResult, RecordSource, RouteCleanupResult,
    ValidationOptions,
};
use crate::validation::{
    canonical_record_value, parse_mx_value, parse_srv_value, relative_record_name,
    validate_record_name, validate_record_value, validate_ttl,
};

/// 记录写入服务
pub struct RecordService {
    ctx: Arc<ServiceContext>,
}

/// 通过校验、等待提交的批量成员
struct PreparedRecord {
    index: usize,
    record: NewDnsRecord,
    sync_to_remote: bool,
    warnings: Vec<String>,
}

impl RecordService {
    /// 创建记录写入服务实例
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// 创建单条记录
    pub async fn create_record(&self, request: CreateRecordRequest) -> RecordMutationResult {
        let mut warnings = Vec::new();
        match self.try_create_record(&request, &mut warnings).await {
            Ok(id) => RecordMutationResult::ok(id, warnings),
            Err(e) => {
                log_failure(&e);
                RecordMutationResult::failed(e, warnings)
            }
        }
    }

    async fn try_create_record(
        &self,
        request: &CreateRecordRequest,
        warnings: &mut Vec<String>,
    ) -> CoreResult<i64> {
        let domain = self.ctx.get_domain(request.domain_id).await?;
        let zone_id = ServiceContext::require_zone(&domain)?;

        let new = self.prepare(&domain, request, warnings)?;
        self.check_existing(&new).await?;

        let record = self.ctx.record_repository.create(&new).await?;

        if request.sync_to_remote {
            if let Err(e) = self
                .ctx
                .provider
                .upsert_records(zone_id, &[record.to_remote()])
                .await
            {
                let err = self.ctx.handle_provider_error(
                    format!("upsert {} {} in {}", record.name, record.record_type, domain.name),
                    e,
                );
                return Err(self.rollback(&record, err).await);
            }
        }

        log::info!(
            "Created {} {} {} in {}",
            record.name,
            record.record_type,
            record.value,
            domain.name
        );
        self.refresh_count(domain.id, warnings).await;
        Ok(record.id)
    }

    /// 批量创建：按域名分组，每个域名一次远端 upsert
    ///
    /// 远端调用成功后才提交该组的本地行；远端失败则整组失败。
    pub async fn create_records_batch(
        &self,
        requests: Vec<CreateRecordRequest>,
    ) -> BatchRecordResult {
        let mut results: Vec<Option<RecordMutationResult>> = vec![None; requests.len()];

        let mut groups: Vec<(i64, Vec<usize>)> = Vec::new();
        for (index, request) in requests.iter().enumerate() {
            match groups.iter_mut().find(|(id, _)| *id == request.domain_id) {
                Some((_, members)) => members.push(index),
                None => groups.push((request.domain_id, vec![index])),
            }
        }

        for (domain_id, members) in groups {
            let domain = match self.ctx.get_domain(domain_id).await.and_then(|d| {
                ServiceContext::require_zone(&d)?;
                Ok(d)
            }) {
                Ok(domain) => domain,
                Err(e) => {
                    log_failure(&e);
                    for index in members {
                        results[index] = Some(RecordMutationResult::failed(e.clone(), Vec::new()));
                    }
                    continue;
                }
            };

            let prepared = self
                .prepare_group(&domain, &requests, &members, &mut results)
                .await;
            self.commit_group(&domain, prepared, &mut results).await;
        }

        let results = results
            .into_iter()
            .map(|r| {
                r.unwrap_or_else(|| {
                    RecordMutationResult::failed(
                        CoreError::Consistency("batch member was not processed".into()),
                        Vec::new(),
                    )
                })
            })
            .collect();
        let batch = BatchRecordResult::from_results(results);
        log::info!(
            "Batch record creation: {}/{} succeeded",
            batch.success_count,
            batch.results.len()
        );
        batch
    }

    async fn prepare_group(
        &self,
        domain: &Domain,
        requests: &[CreateRecordRequest],
        members: &[usize],
        results: &mut [Option<RecordMutationResult>],
    ) -> Vec<PreparedRecord> {
        let mut prepared: Vec<PreparedRecord> = Vec::new();
        for &index in members {
            let request = &requests[index];
            let mut warnings = Vec::new();
            let outcome = match self.prepare(domain, request, &mut warnings) {
                Ok(record) => self.check_existing(&record).await.map(|()| record),
                Err(e) => Err(e),
            };
            let outcome = outcome.and_then(|record| {
                let in_batch = prepared.iter().any(|p| {
                    p.record.name == record.name && p.record.record_type == record.record_type
                });
                if in_batch {
                    return Err(duplicate_error(&record));
                }
                Ok(record)
            });
            match outcome {
                Ok(record) => prepared.push(PreparedRecord {
                    index,
                    record,
                    sync_to_remote: request.sync_to_remote,
                    warnings,
                }),
                Err(e) => {
                    log_failure(&e);
                    results[index] = Some(RecordMutationResult::failed(e, warnings));
                }
            }
        }
        prepared
    }

    async fn commit_group(
        &self,
        domain: &Domain,
        prepared: Vec<PreparedRecord>,
        results: &mut [Option<RecordMutationResult>],
    ) {
        if prepared.is_empty() {
            return;
        }
        let zone_id = domain.zone_id().unwrap_or_default();
        let remote: Vec<_> = prepared
            .iter()
            .filter(|p| p.sync_to_remote)
            .map(|p| p.record.to_remote())
            .collect();

        if !remote.is_empty() {
            if let Err(e) = self.ctx.provider.upsert_records(zone_id, &remote).await {
                let err = self.ctx.handle_provider_error(
                    format!("upsert {} records in {}", remote.len(), domain.name),
                    e,
                );
                for p in prepared {
                    results[p.index] = Some(RecordMutationResult::failed(err.clone(), p.warnings));
                }
                return;
            }
        }

        for p in prepared {
            results[p.index] = Some(match self.ctx.record_repository.create(&p.record).await {
                Ok(record) => RecordMutationResult::ok(record.id, p.warnings),
                Err(e) => {
                    let err = CoreError::Consistency(format!(
                        "{} {} exists remotely but could not be saved locally: {e}",
                        p.record.name, p.record.record_type
                    ));
                    log_failure(&err);
                    RecordMutationResult::failed(err, p.warnings)
                }
            });
        }

        let mut warnings = Vec::new();
        self.refresh_count(domain.id, &mut warnings).await;
    }

    /// 删除单条记录，`sync_to_remote` 时先删除远端
    pub async fn delete_record(&self, record_id: i64, sync_to_remote: bool) -> CoreResult<()> {
        let record = self
            .ctx
            .record_repository
            .find_by_id(record_id)
            .await?
            .ok_or_else(|| CoreError::RecordNotFound(record_id.to_string()))?;
        let domain = self.ctx.get_domain(record.domain_id).await?;

        if sync_to_remote {
            let zone_id = ServiceContext::require_zone(&domain)?;
            self.ctx
                .provider
                .delete_records(zone_id, &[record.to_remote()])
                .await
                .map_err(|e| {
                    self.ctx.handle_provider_error(
                        format!("delete {} {} in {}", record.name, record.record_type, domain.name),
                        e,
                    )
                })?;
        }

        self.ctx.record_repository.delete(record.id).await?;
        self.ctx.refresh_record_count(domain.id).await?;
        log::info!(
            "Deleted {} {} {} from {}",
            record.name,
            record.record_type,
            record.value,
            domain.name
        );
        Ok(())
    }

    /// 删除某路由创建的全部记录（本地和远端），逐条收集错误
    pub async fn delete_records_by_route(&self, route_id: i64) -> CoreResult<RouteCleanupResult> {
        let records = self.ctx.record_repository.find_by_route(route_id).await?;
        let mut result = RouteCleanupResult::default();
        for record in records {
            match self.delete_record(record.id, true).await {
                Ok(()) => result.deleted_count += 1,
                Err(e) => {
                    log_failure(&e);
                    result
                        .errors
                        .push(format!("{} {}: {e}", record.name, record.record_type));
                }
            }
        }
        log::info!(
            "Route {route_id} cleanup: {} deleted, {} failed",
            result.deleted_count,
            result.errors.len()
        );
        Ok(result)
    }

    /// 语法校验并构造待插入的行
    fn prepare(
        &self,
        domain: &Domain,
        request: &CreateRecordRequest,
        warnings: &mut Vec<String>,
    ) -> CoreResult<NewDnsRecord> {
        let name = relative_record_name(&request.name, &domain.name);
        validate_record_name(&name)?;
        let ttl = request.ttl.unwrap_or(self.ctx.config.default_ttl);
        validate_ttl(ttl)?;

        let value = request.value.trim();
        let mut errors = Vec::new();
        for issue in validate_record_value(request.record_type, value, self.ctx.config.txt_warn_length)
        {
            if issue.is_error() {
                errors.push(issue.message);
            } else {
                warnings.push(issue.message);
            }
        }
        if !errors.is_empty() {
            return Err(CoreError::Validation(errors.join("; ")));
        }

        let (priority, weight) = match request.record_type {
            DnsRecordType::Mx => {
                let (priority, _) = parse_mx_value(value).map_err(CoreError::Validation)?;
                check_field("priority", request.priority, priority)?;
                (Some(priority), None)
            }
            DnsRecordType::Srv => {
                let (priority, weight, _, _) =
                    parse_srv_value(value).map_err(CoreError::Validation)?;
                check_field("priority", request.priority, priority)?;
                check_field("weight", request.weight, weight)?;
                (Some(priority), Some(weight))
            }
            _ => (None, None),
        };
        let value = canonical_record_value(request.record_type, value);

        Ok(NewDnsRecord {
            domain_id: domain.id,
            name,
            record_type: request.record_type,
            value,
            ttl,
            priority,
            weight,
            source: RecordSource::Local,
            created_by_route_id: request.created_by_route_id,
        })
    }

    /// 精确键重复和 CNAME 互斥检查
    async fn check_existing(&self, record: &NewDnsRecord) -> CoreResult<()> {
        let repo = &self.ctx.record_repository;
        if !repo
            .find_by_key(record.domain_id, &record.name, record.record_type)
            .await?
            .is_empty()
        {
            return Err(duplicate_error(record));
        }

        let existing = repo
            .find_by_domain_and_name(record.domain_id, &record.name)
            .await?;

        let subject = ProposedRecord {
            domain_id: record.domain_id,
            name: record.name.clone(),
            record_type: record.record_type,
            value: record.value.clone(),
            ttl: Some(record.ttl),
        };
        let blocking: Vec<_> =
            existing_record_conflicts(&subject, &existing, ValidationOptions::default())
                .into_iter()
                .filter(|c| c.conflict_type == ConflictType::CnameConflict)
                .collect();
        if !blocking.is_empty() {
            return Err(CoreError::Conflict(blocking));
        }
        Ok(())
    }

    /// 远端失败后的补偿删除
    async fn rollback(&self, record: &DnsRecord, cause: CoreError) -> CoreError {
        match self.ctx.record_repository.delete(record.id).await {
            Ok(()) => {
                log::warn!(
                    "Rolled back local {} {} after remote failure",
                    record.name,
                    record.record_type
                );
                cause
            }
            Err(e) => CoreError::Consistency(format!(
                "{} {} saved locally but not remotely, and rollback failed: {e} (cause: {cause})",
                record.name, record.record_type
            )),
        }
    }

    async fn refresh_count(&self, domain_id: i64, warnings: &mut Vec<String>) {
        if let Err(e) = self.ctx.refresh_record_count(domain_id).await {
            log::error!("Failed to refresh record count for domain {domain_id}: {e}");
            warnings.push(format!("record count was not refreshed: {e}"));
        }
    }
}

fn duplicate_error(record: &NewDnsRecord) -> CoreError {
    CoreError::DuplicateRecord {
        domain_id: record.domain_id,
        name: record.name.clone(),
        record_type: record.record_type.to_string(),
    }
}

/// 显式给出的 priority/weight 必须与值中的一致
fn check_field(field: &str, given: Option<u16>, parsed: u16) -> CoreResult<()> {
    match given {
        Some(given) if given != parsed => Err(CoreError::Validation(format!(
            "{field} {given} does not match the value's {field} {parsed}"
        ))),
        _ => Ok(()),
    }
}
