//! 测试辅助模块
//!
//! 提供 mock 实现和便捷的测试工厂方法。

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dns_reconciler_provider::{
    CreatedZone, DnsRecordType, ProviderError, RemoteRecord, RemoteZoneSummary, ZoneDetail,
    ZoneProvider,
};
use tokio::sync::RwLock;

use crate::config::ReconcilerConfig;
use crate::error::{CoreError, CoreResult};
use crate::services::{
    ConflictValidator, ReconcileService, RecordService, ServiceContext, ZoneDiscoveryService,
    ZoneProvisioningService,
};
use crate::traits::{DomainRepository, RecordRepository};
use crate::types::{DelegationStatus, DnsRecord, Domain, NewDnsRecord, NewDomain, RecordSource};

// ===== MockStore =====

/// 内存存储，同时实现 `DomainRepository` 和 `RecordRepository`
pub struct MockStore {
    domains: RwLock<HashMap<i64, Domain>>,
    records: RwLock<HashMap<i64, DnsRecord>>,
    next_id: AtomicI64,
    /// 如果 Some，创建域名时返回此错误（用于测试孤儿 Zone 路径）
    domain_create_error: RwLock<Option<String>>,
    /// 如果 Some，创建记录时返回此错误
    record_create_error: RwLock<Option<String>>,
    /// 如果 Some，删除记录时返回此错误
    record_delete_error: RwLock<Option<String>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            domains: RwLock::new(HashMap::new()),
            records: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            domain_create_error: RwLock::new(None),
            record_create_error: RwLock::new(None),
            record_delete_error: RwLock::new(None),
        }
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    pub async fn set_domain_create_error(&self, err: Option<String>) {
        *self.domain_create_error.write().await = err;
    }

    pub async fn set_record_create_error(&self, err: Option<String>) {
        *self.record_create_error.write().await = err;
    }

    pub async fn set_record_delete_error(&self, err: Option<String>) {
        *self.record_delete_error.write().await = err;
    }

    /// 直接插入一个域名
    pub async fn seed_domain(&self, name: &str, zone_id: Option<&str>) -> Domain {
        let new = NewDomain {
            name: name.to_string(),
            remote_zone_id: zone_id.map(ToString::to_string),
            delegation_status: DelegationStatus::Pending,
            zone_created_at: zone_id.map(|_| Utc::now()),
        };
        DomainRepository::create(self, &new).await.unwrap()
    }

    /// 直接插入一条记录（不更新 record_count）
    pub async fn seed_record(
        &self,
        domain_id: i64,
        remote: &RemoteRecord,
        source: RecordSource,
    ) -> DnsRecord {
        let mut new = NewDnsRecord::from_remote(domain_id, remote);
        new.source = source;
        RecordRepository::create(self, &new).await.unwrap()
    }

    /// 某域名下全部记录，按 ID 排序
    pub async fn records_of(&self, domain_id: i64) -> Vec<DnsRecord> {
        RecordRepository::find_by_domain(self, domain_id)
            .await
            .unwrap()
    }

    pub async fn domain(&self, id: i64) -> Domain {
        self.domains.read().await.get(&id).cloned().unwrap()
    }
}

#[async_trait]
impl DomainRepository for MockStore {
    async fn find_all(&self) -> CoreResult<Vec<Domain>> {
        let mut all: Vec<Domain> = self.domains.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn find_by_id(&self, id: i64) -> CoreResult<Option<Domain>> {
        Ok(self.domains.read().await.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> CoreResult<Option<Domain>> {
        Ok(self
            .domains
            .read()
            .await
            .values()
            .find(|d| d.name == name)
            .cloned())
    }

    async fn find_by_zone_id(&self, zone_id: &str) -> CoreResult<Option<Domain>> {
        Ok(self
            .domains
            .read()
            .await
            .values()
            .find(|d| d.zone_id() == Some(zone_id))
            .cloned())
    }

    async fn create(&self, domain: &NewDomain) -> CoreResult<Domain> {
        if let Some(ref msg) = *self.domain_create_error.read().await {
            return Err(CoreError::Storage(msg.clone()));
        }
        let mut store = self.domains.write().await;
        if store.values().any(|d| d.name == domain.name) {
            return Err(CoreError::Storage(format!(
                "UNIQUE constraint failed: domains.name ({})",
                domain.name
            )));
        }
        let now = Utc::now();
        let created = Domain {
            id: self.next_id(),
            name: domain.name.clone(),
            remote_zone_id: domain.remote_zone_id.clone(),
            delegation_status: domain.delegation_status,
            zone_created_at: domain.zone_created_at,
            last_synced_at: None,
            record_count: 0,
            created_at: now,
            updated_at: now,
        };
        store.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, domain: &Domain) -> CoreResult<Domain> {
        let mut store = self.domains.write().await;
        if !store.contains_key(&domain.id) {
            return Err(CoreError::DomainNotFound(domain.id.to_string()));
        }
        let mut updated = domain.clone();
        updated.updated_at = Utc::now();
        store.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> CoreResult<()> {
        if self.domains.write().await.remove(&id).is_none() {
            return Err(CoreError::DomainNotFound(id.to_string()));
        }
        self.records.write().await.retain(|_, r| r.domain_id != id);
        Ok(())
    }
}

#[async_trait]
impl RecordRepository for MockStore {
    async fn find_by_id(&self, id: i64) -> CoreResult<Option<DnsRecord>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn find_by_domain(&self, domain_id: i64) -> CoreResult<Vec<DnsRecord>> {
        let mut found: Vec<DnsRecord> = self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.domain_id == domain_id)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.id);
        Ok(found)
    }

    async fn find_by_domain_and_name(
        &self,
        domain_id: i64,
        name: &str,
    ) -> CoreResult<Vec<DnsRecord>> {
        Ok(self
            .find_by_domain(domain_id)
            .await?
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
        Ok(self
            .find_by_domain_and_name(domain_id, name)
            .await?
            .into_iter()
            .filter(|r| r.record_type == record_type)
            .collect())
    }

    async fn find_by_route(&self, route_id: i64) -> CoreResult<Vec<DnsRecord>> {
        let mut found: Vec<DnsRecord> = self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.created_by_route_id == Some(route_id))
            .cloned()
            .collect();
        found.sort_by_key(|r| r.id);
        Ok(found)
    }

    async fn count_by_domain(&self, domain_id: i64) -> CoreResult<u32> {
        let count = self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.domain_id == domain_id)
            .count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn create(&self, record: &NewDnsRecord) -> CoreResult<DnsRecord> {
        if let Some(ref msg) = *self.record_create_error.read().await {
            return Err(CoreError::Storage(msg.clone()));
        }
        let now = Utc::now();
        let created = DnsRecord {
            id: self.next_id(),
            domain_id: record.domain_id,
            name: record.name.clone(),
            record_type: record.record_type,
            value: record.value.clone(),
            ttl: record.ttl,
            priority: record.priority,
            weight: record.weight,
            source: record.source,
            created_by_route_id: record.created_by_route_id,
            created_at: now,
            updated_at: now,
        };
        self.records.write().await.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, record: &DnsRecord) -> CoreResult<DnsRecord> {
        let mut store = self.records.write().await;
        if !store.contains_key(&record.id) {
            return Err(CoreError::RecordNotFound(record.id.to_string()));
        }
        let mut updated = record.clone();
        updated.updated_at = Utc::now();
        store.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> CoreResult<()> {
        if let Some(ref msg) = *self.record_delete_error.read().await {
            return Err(CoreError::Storage(msg.clone()));
        }
        self.records
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CoreError::RecordNotFound(id.to_string()))
    }
}

// ===== MockZoneProvider =====

/// 内存 provider，upsert 语义与真实 provider 一致（按 name/type/value 替换）
pub struct MockZoneProvider {
    zones: RwLock<Vec<ZoneDetail>>,
    records: RwLock<HashMap<String, Vec<RemoteRecord>>>,
    next_zone: AtomicUsize,
    list_zones_calls: AtomicUsize,
    upsert_calls: AtomicUsize,
    create_zone_error: RwLock<Option<ProviderError>>,
    delete_zone_error: RwLock<Option<ProviderError>>,
    list_records_error: RwLock<Option<ProviderError>>,
    upsert_error: RwLock<Option<ProviderError>>,
    delete_records_error: RwLock<Option<ProviderError>>,
}

impl MockZoneProvider {
    pub fn new() -> Self {
        Self {
            zones: RwLock::new(Vec::new()),
            records: RwLock::new(HashMap::new()),
            next_zone: AtomicUsize::new(1),
            list_zones_calls: AtomicUsize::new(0),
            upsert_calls: AtomicUsize::new(0),
            create_zone_error: RwLock::new(None),
            delete_zone_error: RwLock::new(None),
            list_records_error: RwLock::new(None),
            upsert_error: RwLock::new(None),
            delete_records_error: RwLock::new(None),
        }
    }

    pub async fn add_zone(&self, id: &str, name: &str) {
        self.add_zone_detail(ZoneDetail {
            id: id.to_string(),
            name: name.to_string(),
            record_count: 0,
            created_at: None,
            private_zone: false,
            name_servers: vec!["ns1.mock-dns.test".into(), "ns2.mock-dns.test".into()],
            comment: None,
        })
        .await;
    }

    pub async fn add_zone_detail(&self, zone: ZoneDetail) {
        self.records.write().await.entry(zone.id.clone()).or_default();
        self.zones.write().await.push(zone);
    }

    pub async fn has_zone(&self, id: &str) -> bool {
        self.zones.read().await.iter().any(|z| z.id == id)
    }

    pub async fn set_records(&self, zone_id: &str, records: Vec<RemoteRecord>) {
        self.records
            .write()
            .await
            .insert(zone_id.to_string(), records);
    }

    pub async fn records(&self, zone_id: &str) -> Vec<RemoteRecord> {
        self.records
            .read()
            .await
            .get(zone_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn list_zones_calls(&self) -> usize {
        self.list_zones_calls.load(Ordering::SeqCst)
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub async fn set_create_zone_error(&self, err: Option<ProviderError>) {
        *self.create_zone_error.write().await = err;
    }

    pub async fn set_delete_zone_error(&self, err: Option<ProviderError>) {
        *self.delete_zone_error.write().await = err;
    }

    pub async fn set_list_records_error(&self, err: Option<ProviderError>) {
        *self.list_records_error.write().await = err;
    }

    pub async fn set_upsert_error(&self, err: Option<ProviderError>) {
        *self.upsert_error.write().await = err;
    }

    pub async fn set_delete_records_error(&self, err: Option<ProviderError>) {
        *self.delete_records_error.write().await = err;
    }

    fn zone_not_found(zone: &str) -> ProviderError {
        ProviderError::ZoneNotFound {
            provider: "mock".into(),
            zone: zone.to_string(),
            raw_message: None,
        }
    }
}

#[async_trait]
impl ZoneProvider for MockZoneProvider {
    fn id(&self) -> &'static str {
        "mock"
    }

    async fn list_zones(&self) -> dns_reconciler_provider::Result<Vec<RemoteZoneSummary>> {
        self.list_zones_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.zones.read().await.iter().map(ZoneDetail::summary).collect())
    }

    async fn get_zone(&self, zone_id: &str) -> dns_reconciler_provider::Result<ZoneDetail> {
        self.zones
            .read()
            .await
            .iter()
            .find(|z| z.id == zone_id)
            .cloned()
            .ok_or_else(|| Self::zone_not_found(zone_id))
    }

    async fn create_zone(
        &self,
        name: &str,
        comment: Option<&str>,
    ) -> dns_reconciler_provider::Result<CreatedZone> {
        if let Some(err) = self.create_zone_error.read().await.clone() {
            return Err(err);
        }
        if self.zones.read().await.iter().any(|z| z.name == name) {
            return Err(ProviderError::ZoneExists {
                provider: "mock".into(),
                zone: name.to_string(),
                raw_message: None,
            });
        }
        let id = format!("zone-{}", self.next_zone.fetch_add(1, Ordering::SeqCst));
        let name_servers = vec!["ns1.mock-dns.test".to_string(), "ns2.mock-dns.test".to_string()];
        self.add_zone_detail(ZoneDetail {
            id: id.clone(),
            name: name.to_string(),
            record_count: 0,
            created_at: Some(Utc::now()),
            private_zone: false,
            name_servers: name_servers.clone(),
            comment: comment.map(ToString::to_string),
        })
        .await;
        Ok(CreatedZone {
            zone_id: id,
            name_servers,
        })
    }

    async fn delete_zone(&self, zone_id: &str) -> dns_reconciler_provider::Result<()> {
        if let Some(err) = self.delete_zone_error.read().await.clone() {
            return Err(err);
        }
        let mut zones = self.zones.write().await;
        let before = zones.len();
        zones.retain(|z| z.id != zone_id);
        if zones.len() == before {
            return Err(Self::zone_not_found(zone_id));
        }
        self.records.write().await.remove(zone_id);
        Ok(())
    }

    async fn list_records(&self, zone_id: &str) -> dns_reconciler_provider::Result<Vec<RemoteRecord>> {
        if let Some(err) = self.list_records_error.read().await.clone() {
            return Err(err);
        }
        self.records
            .read()
            .await
            .get(zone_id)
            .cloned()
            .ok_or_else(|| Self::zone_not_found(zone_id))
    }

    async fn upsert_records(
        &self,
        zone_id: &str,
        records: &[RemoteRecord],
    ) -> dns_reconciler_provider::Result<()> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.upsert_error.read().await.clone() {
            return Err(err);
        }
        let mut store = self.records.write().await;
        let zone = store
            .get_mut(zone_id)
            .ok_or_else(|| Self::zone_not_found(zone_id))?;
        for record in records {
            let existing = zone.iter_mut().find(|r| {
                r.key() == record.key()
                    && (r.value == record.value || record.record_type == DnsRecordType::Cname)
            });
            match existing {
                Some(slot) => *slot = record.clone(),
                None => zone.push(record.clone()),
            }
        }
        Ok(())
    }

    async fn delete_records(
        &self,
        zone_id: &str,
        records: &[RemoteRecord],
    ) -> dns_reconciler_provider::Result<()> {
        if let Some(err) = self.delete_records_error.read().await.clone() {
            return Err(err);
        }
        let mut store = self.records.write().await;
        let zone = store
            .get_mut(zone_id)
            .ok_or_else(|| Self::zone_not_found(zone_id))?;
        zone.retain(|r| {
            !records
                .iter()
                .any(|d| d.key() == r.key() && d.value == r.value)
        });
        Ok(())
    }
}

/// 一个可注入的 5xx 类错误
pub fn network_error() -> ProviderError {
    ProviderError::NetworkError {
        provider: "mock".into(),
        detail: "HTTP 503: upstream unavailable".into(),
    }
}

// ===== 工厂方法 =====

/// 创建测试用 `ServiceContext`（批量间隔为 0）
pub fn create_test_context() -> (Arc<ServiceContext>, Arc<MockStore>, Arc<MockZoneProvider>) {
    let store = Arc::new(MockStore::new());
    let provider = Arc::new(MockZoneProvider::new());
    let config = ReconcilerConfig {
        batch_delay_ms: 0,
        ..ReconcilerConfig::default()
    };
    let ctx = Arc::new(ServiceContext::new(
        provider.clone(),
        store.clone(),
        store.clone(),
        config,
    ));
    (ctx, store, provider)
}

pub fn create_test_discovery_service() -> (ZoneDiscoveryService, Arc<MockStore>, Arc<MockZoneProvider>)
{
    let (ctx, store, provider) = create_test_context();
    (ZoneDiscoveryService::new(ctx), store, provider)
}

pub fn create_test_provisioning_service(
) -> (ZoneProvisioningService, Arc<MockStore>, Arc<MockZoneProvider>) {
    let (ctx, store, provider) = create_test_context();
    (ZoneProvisioningService::new(ctx), store, provider)
}

pub fn create_test_conflict_validator() -> (ConflictValidator, Arc<MockStore>) {
    let (ctx, store, _) = create_test_context();
    (ConflictValidator::new(ctx), store)
}

pub fn create_test_record_service() -> (RecordService, Arc<MockStore>, Arc<MockZoneProvider>) {
    let (ctx, store, provider) = create_test_context();
    (RecordService::new(ctx), store, provider)
}

pub fn create_test_reconcile_service() -> (ReconcileService, Arc<MockStore>, Arc<MockZoneProvider>)
{
    let (ctx, store, provider) = create_test_context();
    (ReconcileService::new(ctx), store, provider)
}

/// 一个已关联 Zone 的域名：`example.com` ↔ `zone-example`
pub async fn seed_linked_domain(store: &MockStore, provider: &MockZoneProvider) -> Domain {
    provider.add_zone("zone-example", "example.com").await;
    store.seed_domain("example.com", Some("zone-example")).await
}
