//! `RecordRepository` implementation for `SqliteStore`.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

use dns_reconciler_core::error::{CoreError, CoreResult};
use dns_reconciler_core::traits::RecordRepository;
use dns_reconciler_core::types::{DnsRecord, DnsRecordType, NewDnsRecord, RecordSource};

use super::entity::dns_record;
use super::{parse_timestamp, SqliteStore};

fn narrow_u16(field: &str, raw: Option<i32>) -> CoreResult<Option<u16>> {
    raw.map(|v| {
        u16::try_from(v).map_err(|e| CoreError::Serialization(format!("Invalid {field}: {e}")))
    })
    .transpose()
}

impl dns_record::Model {
    /// Convert a `SeaORM` row model into a core `DnsRecord`.
    fn into_record(self) -> CoreResult<DnsRecord> {
        let record_type: DnsRecordType =
            self.record_type.parse().map_err(CoreError::Serialization)?;
        let source: RecordSource = self.source.parse().map_err(CoreError::Serialization)?;
        let ttl = u32::try_from(self.ttl)
            .map_err(|e| CoreError::Serialization(format!("Invalid ttl: {e}")))?;

        Ok(DnsRecord {
            id: self.id,
            domain_id: self.domain_id,
            name: self.name,
            record_type,
            value: self.value,
            ttl,
            priority: narrow_u16("priority", self.priority)?,
            weight: narrow_u16("weight", self.weight)?,
            source,
            created_by_route_id: self.created_by_route_id,
            created_at: parse_timestamp("created_at", &self.created_at)?,
            updated_at: parse_timestamp("updated_at", &self.updated_at)?,
        })
    }
}

fn into_records(rows: Vec<dns_record::Model>) -> CoreResult<Vec<DnsRecord>> {
    rows.into_iter().map(dns_record::Model::into_record).collect()
}

#[async_trait]
impl RecordRepository for SqliteStore {
    async fn find_by_id(&self, id: i64) -> CoreResult<Option<DnsRecord>> {
        let row = dns_record::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::Storage(format!("Failed to query record: {e}")))?;

        row.map(dns_record::Model::into_record).transpose()
    }

    async fn find_by_domain(&self, domain_id: i64) -> CoreResult<Vec<DnsRecord>> {
        let rows = dns_record::Entity::find()
            .filter(dns_record::Column::DomainId.eq(domain_id))
            .order_by_asc(dns_record::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::Storage(format!("Failed to query records: {e}")))?;

        into_records(rows)
    }

    async fn find_by_domain_and_name(
        &self,
        domain_id: i64,
        name: &str,
    ) -> CoreResult<Vec<DnsRecord>> {
        // SQLite 的 `=` 区分大小写，名称在这里比较
        let records = self.find_by_domain(domain_id).await?;
        Ok(records
            .into_iter()
            .filter(|r| r.name.eq_ignore_ascii_case(name))
            .collect())
    }

    async fn find_by_key(
        &self,
        domain_id: i64,
        name: &str,
        record_type: DnsRecordType,
    ) -> CoreResult<Vec<DnsRecord>> {
        let rows = dns_record::Entity::find()
            .filter(dns_record::Column::DomainId.eq(domain_id))
            .filter(dns_record::Column::RecordType.eq(record_type.as_str()))
            .order_by_asc(dns_record::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::Storage(format!("Failed to query records: {e}")))?;

        Ok(into_records(rows)?
            .into_iter()
            .filter(|r| r.name.eq_ignore_ascii_case(name))
            .collect())
    }

    async fn find_by_route(&self, route_id: i64) -> CoreResult<Vec<DnsRecord>> {
        let rows = dns_record::Entity::find()
            .filter(dns_record::Column::CreatedByRouteId.eq(route_id))
            .order_by_asc(dns_record::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::Storage(format!("Failed to query records: {e}")))?;

        into_records(rows)
    }

    async fn count_by_domain(&self, domain_id: i64) -> CoreResult<u32> {
        let count = dns_record::Entity::find()
            .filter(dns_record::Column::DomainId.eq(domain_id))
            .count(&self.db)
            .await
            .map_err(|e| CoreError::Storage(format!("Failed to count records: {e}")))?;

        u32::try_from(count).map_err(|e| CoreError::Storage(format!("Record count overflow: {e}")))
    }

    async fn create(&self, new: &NewDnsRecord) -> CoreResult<DnsRecord> {
        let now = Utc::now().to_rfc3339();
        let active = dns_record::ActiveModel {
            id: NotSet,
            domain_id: Set(new.domain_id),
            name: Set(new.name.clone()),
            record_type: Set(new.record_type.as_str().to_string()),
            value: Set(new.value.clone()),
            ttl: Set(i64::from(new.ttl)),
            priority: Set(new.priority.map(i32::from)),
            weight: Set(new.weight.map(i32::from)),
            source: Set(new.source.as_str().to_string()),
            created_by_route_id: Set(new.created_by_route_id),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        let model = active
            .insert(&self.db)
            .await
            .map_err(|e| CoreError::Storage(format!("Failed to insert record: {e}")))?;

        model.into_record()
    }

    async fn update(&self, record: &DnsRecord) -> CoreResult<DnsRecord> {
        let exists = dns_record::Entity::find_by_id(record.id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::Storage(format!("Failed to query record: {e}")))?
            .is_some();
        if !exists {
            return Err(CoreError::RecordNotFound(record.id.to_string()));
        }

        let active = dns_record::ActiveModel {
            id: Set(record.id),
            domain_id: Set(record.domain_id),
            name: Set(record.name.clone()),
            record_type: Set(record.record_type.as_str().to_string()),
            value: Set(record.value.clone()),
            ttl: Set(i64::from(record.ttl)),
            priority: Set(record.priority.map(i32::from)),
            weight: Set(record.weight.map(i32::from)),
            source: Set(record.source.as_str().to_string()),
            created_by_route_id: Set(record.created_by_route_id),
            created_at: Set(record.created_at.to_rfc3339()),
            updated_at: Set(Utc::now().to_rfc3339()),
        };

        let model = active
            .update(&self.db)
            .await
            .map_err(|e| CoreError::Storage(format!("Failed to update record: {e}")))?;

        model.into_record()
    }

    async fn delete(&self, id: i64) -> CoreResult<()> {
        let result = dns_record::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| CoreError::Storage(format!("Failed to delete record: {e}")))?;

        if result.rows_affected == 0 {
            return Err(CoreError::RecordNotFound(id.to_string()));
        }
        Ok(())
    }
}
