//! `DomainRepository` implementation for `SqliteStore`.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, EntityTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use sea_orm::sea_query::IntoCondition;

use dns_reconciler_core::error::{CoreError, CoreResult};
use dns_reconciler_core::traits::DomainRepository;
use dns_reconciler_core::types::{DelegationStatus, Domain, NewDomain};

use super::entity::{dns_record, domain};
use super::{parse_optional_timestamp, parse_timestamp, SqliteStore};

impl domain::Model {
    /// Convert a `SeaORM` row model into a core `Domain`.
    fn into_domain(self) -> CoreResult<Domain> {
        let delegation_status: DelegationStatus = self
            .delegation_status
            .parse()
            .map_err(CoreError::Serialization)?;
        let record_count = u32::try_from(self.record_count)
            .map_err(|e| CoreError::Serialization(format!("Invalid record_count: {e}")))?;

        Ok(Domain {
            id: self.id,
            name: self.name,
            remote_zone_id: self.remote_zone_id,
            delegation_status,
            zone_created_at: parse_optional_timestamp(
                "zone_created_at",
                self.zone_created_at.as_deref(),
            )?,
            last_synced_at: parse_optional_timestamp(
                "last_synced_at",
                self.last_synced_at.as_deref(),
            )?,
            record_count,
            created_at: parse_timestamp("created_at", &self.created_at)?,
            updated_at: parse_timestamp("updated_at", &self.updated_at)?,
        })
    }
}

impl SqliteStore {
    async fn find_domain_where(
        &self,
        filter: impl IntoCondition + Send,
    ) -> CoreResult<Option<Domain>> {
        let row = domain::Entity::find()
            .filter(filter)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::Storage(format!("Failed to query domain: {e}")))?;

        row.map(domain::Model::into_domain).transpose()
    }
}

#[async_trait]
impl DomainRepository for SqliteStore {
    async fn find_all(&self) -> CoreResult<Vec<Domain>> {
        let rows = domain::Entity::find()
            .order_by_asc(domain::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::Storage(format!("Failed to query domains: {e}")))?;

        rows.into_iter().map(domain::Model::into_domain).collect()
    }

    async fn find_by_id(&self, id: i64) -> CoreResult<Option<Domain>> {
        let row = domain::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::Storage(format!("Failed to query domain: {e}")))?;

        row.map(domain::Model::into_domain).transpose()
    }

    async fn find_by_name(&self, name: &str) -> CoreResult<Option<Domain>> {
        self.find_domain_where(domain::Column::Name.eq(name.to_ascii_lowercase()))
            .await
    }

    async fn find_by_zone_id(&self, zone_id: &str) -> CoreResult<Option<Domain>> {
        self.find_domain_where(domain::Column::RemoteZoneId.eq(zone_id))
            .await
    }

    async fn create(&self, new: &NewDomain) -> CoreResult<Domain> {
        let now = Utc::now().to_rfc3339();
        let active = domain::ActiveModel {
            id: NotSet,
            name: Set(new.name.to_ascii_lowercase()),
            remote_zone_id: Set(new.remote_zone_id.clone()),
            delegation_status: Set(new.delegation_status.as_str().to_string()),
            zone_created_at: Set(new.zone_created_at.map(|t| t.to_rfc3339())),
            last_synced_at: Set(None),
            record_count: Set(0),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        let model = active
            .insert(&self.db)
            .await
            .map_err(|e| CoreError::Storage(format!("Failed to insert domain {}: {e}", new.name)))?;

        model.into_domain()
    }

    async fn update(&self, domain: &Domain) -> CoreResult<Domain> {
        let exists = domain::Entity::find_by_id(domain.id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::Storage(format!("Failed to query domain: {e}")))?
            .is_some();
        if !exists {
            return Err(CoreError::DomainNotFound(domain.id.to_string()));
        }

        let active = domain::ActiveModel {
            id: Set(domain.id),
            name: Set(domain.name.clone()),
            remote_zone_id: Set(domain.remote_zone_id.clone()),
            delegation_status: Set(domain.delegation_status.as_str().to_string()),
            zone_created_at: Set(domain.zone_created_at.map(|t| t.to_rfc3339())),
            last_synced_at: Set(domain.last_synced_at.map(|t| t.to_rfc3339())),
            record_count: Set(i64::from(domain.record_count)),
            created_at: Set(domain.created_at.to_rfc3339()),
            updated_at: Set(Utc::now().to_rfc3339()),
        };

        let model = active
            .update(&self.db)
            .await
            .map_err(|e| CoreError::Storage(format!("Failed to update domain: {e}")))?;

        model.into_domain()
    }

    async fn delete(&self, id: i64) -> CoreResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CoreError::Storage(format!("Failed to begin transaction: {e}")))?;

        dns_record::Entity::delete_many()
            .filter(dns_record::Column::DomainId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| CoreError::Storage(format!("Failed to delete records: {e}")))?;

        let result = domain::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| CoreError::Storage(format!("Failed to delete domain: {e}")))?;

        if result.rows_affected == 0 {
            // txn 在 drop 时回滚
            return Err(CoreError::DomainNotFound(id.to_string()));
        }

        txn.commit()
            .await
            .map_err(|e| CoreError::Storage(format!("Failed to commit transaction: {e}")))?;

        Ok(())
    }
}
