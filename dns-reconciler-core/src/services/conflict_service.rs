//! 冲突校验服务
//!
//! 对一条拟写入的记录评估全部规则并累积结果，不提前返回：
//! 同名记录、CNAME 互斥、TTL 不一致、重复值、按类型的语法检查。
//! `valid` 仅在没有 `Error` 级冲突时为 `true`。

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::CoreResult;
use crate::services::ServiceContext;
use crate::types::{
    Conflict, ConflictAction, ConflictResolution, ConflictSeverity, ConflictType, DnsRecord,
    DnsRecordType, ProposedRecord, ResolutionAction, ValidationOptions, ValidationResult,
};
use crate::validation::{
    canonical_record_value, relative_record_name, validate_record_name, validate_record_value,
    validate_ttl,
};

/// 冲突校验服务
pub struct ConflictValidator {
    ctx: Arc<ServiceContext>,
}

impl ConflictValidator {
    /// 创建冲突校验服务实例
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// 校验一条拟写入的记录
    ///
    /// 域名不存在时直接返回 `DomainNotFound`，其余规则全部累积。
    pub async fn validate(
        &self,
        domain_id: i64,
        name: &str,
        record_type: DnsRecordType,
        value: &str,
        ttl: Option<u32>,
        options: ValidationOptions,
    ) -> CoreResult<ValidationResult> {
        let domain = self.ctx.get_domain(domain_id).await?;
        let name = relative_record_name(name, &domain.name);
        let value = value.trim();
        let subject = ProposedRecord {
            domain_id,
            name: name.clone(),
            record_type,
            value: canonical_record_value(record_type, value),
            ttl,
        };

        let mut conflicts = Vec::new();
        let mut warnings = Vec::new();

        if options.check_existing {
            let existing = self
                .ctx
                .record_repository
                .find_by_domain_and_name(domain_id, &name)
                .await?;
            conflicts.extend(existing_record_conflicts(&subject, &existing, options));
        }

        // 语法检查
        let syntax_error = |message: String| Conflict {
            conflict_type: ConflictType::ValueConflict,
            severity: ConflictSeverity::Error,
            subject: subject.clone(),
            conflicting_records: Vec::new(),
            description: message,
            resolution: "Correct the record before submitting it".into(),
        };
        if let Err(e) = validate_record_name(&name) {
            conflicts.push(syntax_error(e.to_string()));
        }
        if let Some(Err(e)) = ttl.map(validate_ttl) {
            conflicts.push(syntax_error(e.to_string()));
        }
        for issue in validate_record_value(record_type, value, self.ctx.config.txt_warn_length) {
            if issue.is_error() {
                conflicts.push(syntax_error(issue.message));
            } else {
                warnings.push(issue.message);
            }
        }

        let valid = !conflicts.iter().any(Conflict::is_error);
        if !valid {
            log::debug!(
                "{} {record_type} in domain {domain_id} rejected with {} conflict(s)",
                subject.name,
                conflicts.len()
            );
        }
        Ok(ValidationResult {
            valid,
            conflicts,
            warnings,
        })
    }

    /// 为每个冲突给出建议动作；只要有一个 `Manual` 就不能自动处理
    pub fn resolve_conflicts(&self, conflicts: &[Conflict]) -> ConflictResolution {
        let actions: Vec<ConflictAction> = conflicts.iter().map(suggest_action).collect();
        let can_auto_resolve = actions.iter().all(|a| a.action != ResolutionAction::Manual);
        ConflictResolution {
            actions,
            can_auto_resolve,
        }
    }

    /// 审计域名下已有记录之间的冲突（同步后用于暴露远端引入的矛盾）
    pub async fn check_domain_conflicts(&self, domain_id: i64) -> CoreResult<Vec<Conflict>> {
        self.ctx.get_domain(domain_id).await?;
        let records = self.ctx.record_repository.find_by_domain(domain_id).await?;

        let mut by_name: BTreeMap<String, Vec<DnsRecord>> = BTreeMap::new();
        for record in records {
            by_name
                .entry(record.name.to_ascii_lowercase())
                .or_default()
                .push(record);
        }

        let mut conflicts = Vec::new();
        for (name, group) in &by_name {
            if let Some(cname) = group.iter().find(|r| r.record_type == DnsRecordType::Cname) {
                let others: Vec<DnsRecord> =
                    group.iter().filter(|r| r.id != cname.id).cloned().collect();
                if !others.is_empty() {
                    conflicts.push(Conflict {
                        conflict_type: ConflictType::CnameConflict,
                        severity: ConflictSeverity::Error,
                        subject: proposed_from(cname),
                        conflicting_records: others,
                        description: format!("CNAME at {name} coexists with other records"),
                        resolution: "Remove either the CNAME or the other records at this name"
                            .into(),
                    });
                }
            }

            if let Some(first) = group.first() {
                if group.iter().any(|r| r.ttl != first.ttl) {
                    conflicts.push(Conflict {
                        conflict_type: ConflictType::TtlMismatch,
                        severity: ConflictSeverity::Warning,
                        subject: proposed_from(first),
                        conflicting_records: group
                            .iter()
                            .filter(|r| r.ttl != first.ttl)
                            .cloned()
                            .collect(),
                        description: format!("records at {name} use different TTLs"),
                        resolution: "Align the TTLs of records sharing this name".into(),
                    });
                }
            }
        }
        Ok(conflicts)
    }
}

/// 与已有同名记录比较产生的冲突
pub(crate) fn existing_record_conflicts(
    subject: &ProposedRecord,
    existing: &[DnsRecord],
    options: ValidationOptions,
) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    let name = &subject.name;
    let conflict = |conflict_type: ConflictType,
                    severity: ConflictSeverity,
                    records: Vec<DnsRecord>,
                    description: String,
                    resolution: &str| Conflict {
        conflict_type,
        severity,
        subject: subject.clone(),
        conflicting_records: records,
        description,
        resolution: resolution.to_string(),
    };

    if !existing.is_empty() {
        let mut types: Vec<DnsRecordType> = existing.iter().map(|r| r.record_type).collect();
        types.sort();
        types.dedup();
        let types = types
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        conflicts.push(conflict(
            ConflictType::DuplicateName,
            ConflictSeverity::Error,
            existing.to_vec(),
            format!("name {name} already has records of type {types}"),
            "Review the existing records at this name before adding another",
        ));
    }

    let blocking: Vec<DnsRecord> = if subject.record_type == DnsRecordType::Cname {
        existing
            .iter()
            .filter(|r| r.record_type != DnsRecordType::Cname || r.value != subject.value)
            .cloned()
            .collect()
    } else {
        existing
            .iter()
            .filter(|r| r.record_type == DnsRecordType::Cname)
            .cloned()
            .collect()
    };
    if !blocking.is_empty() {
        let description = if subject.record_type == DnsRecordType::Cname {
            format!("a CNAME at {name} cannot coexist with the existing records")
        } else {
            format!(
                "{name} is a CNAME; a {} record cannot be added there",
                subject.record_type
            )
        };
        conflicts.push(conflict(
            ConflictType::CnameConflict,
            ConflictSeverity::Error,
            blocking,
            description,
            "Delete the blocking record first",
        ));
    }

    if let Some(ttl) = subject.ttl {
        let mismatched: Vec<DnsRecord> =
            existing.iter().filter(|r| r.ttl != ttl).cloned().collect();
        if !mismatched.is_empty() {
            let severity = if options.strict_mode {
                ConflictSeverity::Error
            } else {
                ConflictSeverity::Warning
            };
            let others = mismatched
                .iter()
                .map(|r| r.ttl.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            conflicts.push(conflict(
                ConflictType::TtlMismatch,
                severity,
                mismatched,
                format!("TTL {ttl} differs from existing TTL(s) {others} at {name}"),
                "Use the same TTL for all records at this name",
            ));
        }
    }

    let identical: Vec<DnsRecord> = existing
        .iter()
        .filter(|r| r.record_type == subject.record_type && r.value == subject.value)
        .cloned()
        .collect();
    if !identical.is_empty() {
        conflicts.push(conflict(
            ConflictType::ValueConflict,
            ConflictSeverity::Warning,
            identical,
            format!(
                "{name} {} {} already exists",
                subject.record_type, subject.value
            ),
            "Update the existing record instead of adding a duplicate",
        ));
    }

    conflicts
}

fn suggest_action(conflict: &Conflict) -> ConflictAction {
    let record_ids: Vec<i64> = conflict.conflicting_records.iter().map(|r| r.id).collect();
    let (action, description) = match conflict.conflict_type {
        ConflictType::DuplicateName => (
            ResolutionAction::Manual,
            "decide which records should remain at this name".to_string(),
        ),
        ConflictType::CnameConflict => (
            ResolutionAction::DeleteBlocking,
            format!("delete {} blocking record(s)", record_ids.len()),
        ),
        ConflictType::TtlMismatch => (
            ResolutionAction::Skip,
            "keep the differing TTLs".to_string(),
        ),
        // 语法错误没有可更新的已有记录
        ConflictType::ValueConflict if record_ids.is_empty() => (
            ResolutionAction::Manual,
            format!("fix the record: {}", conflict.description),
        ),
        ConflictType::ValueConflict => (
            ResolutionAction::UpdateExisting,
            "update the existing record instead of adding a duplicate".to_string(),
        ),
    };
    ConflictAction {
        conflict_type: conflict.conflict_type,
        action,
        record_ids,
        description,
    }
}

fn proposed_from(record: &DnsRecord) -> ProposedRecord {
    ProposedRecord {
        domain_id: record.domain_id,
        name: record.name.clone(),
        record_type: record.record_type,
        value: record.value.clone(),
        ttl: Some(record.ttl),
    }
}
