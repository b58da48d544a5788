//! Application bootstrap for DNS Reconciler.
//!
//! Provides `AppState` (service container), `AppStateBuilder` (adapter injection)
//! and `AppConfig` (file / environment configuration).

pub mod adapters;
pub mod config;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dns_reconciler_core::error::{CoreError, CoreResult};
use dns_reconciler_core::services::{
    ConflictValidator, ReconcileService, RecordService, ServiceContext, ZoneDiscoveryService,
    ZoneProvisioningService,
};
use dns_reconciler_core::traits::{DomainRepository, RecordRepository};
use dns_reconciler_core::types::DomainSyncOutcome;
use dns_reconciler_core::ReconcilerConfig;
use dns_reconciler_provider::ZoneProvider;

pub use config::AppConfig;

/// Application state.
///
/// Holds every service and the shared `ServiceContext`. Frontends construct
/// this once at startup via `AppStateBuilder` or [`AppState::from_config`].
pub struct AppState {
    /// Service context (provider + storage adapters)
    pub ctx: Arc<ServiceContext>,
    /// Zone discovery
    pub discovery_service: ZoneDiscoveryService,
    /// Zone provisioning
    pub provisioning_service: ZoneProvisioningService,
    /// Conflict validation
    pub conflict_validator: ConflictValidator,
    /// Record mutation
    pub record_service: RecordService,
    /// Record reconciliation
    pub reconcile_service: ReconcileService,
    /// Whether `run_startup` should reconcile every linked domain
    pub sync_on_startup: bool,
    /// Whether the startup sequence has completed
    pub startup_completed: AtomicBool,
}

impl AppState {
    /// Open the SQLite store and the configured provider, then wire the services.
    #[cfg(feature = "sqlite-store")]
    pub async fn from_config(config: &AppConfig) -> CoreResult<Self> {
        config.validate()?;

        let provider = dns_reconciler_provider::create_provider(config.provider.clone())
            .map_err(|e| CoreError::provider("Failed to create provider", e))?;
        let store = Arc::new(adapters::SqliteStore::new(&config.database_path).await?);
        log::info!(
            "Opened store at {} with provider {}",
            config.database_path.display(),
            provider.id()
        );

        AppStateBuilder::new()
            .provider(provider)
            .store(store)
            .config(config.reconciler.clone())
            .sync_on_startup(config.sync_on_startup)
            .build()
    }

    /// Run the startup sequence. Sets `startup_completed` to `true` when done.
    ///
    /// With `sync_on_startup`, every linked domain is reconciled once; per-domain
    /// failures are logged and returned, never propagated.
    pub async fn run_startup(&self) -> CoreResult<Vec<DomainSyncOutcome>> {
        let outcomes = if self.sync_on_startup {
            let outcomes = self.reconcile_service.sync_all().await?;
            let failed = outcomes.iter().filter(|o| o.error.is_some()).count();
            log::info!(
                "Startup sync complete: {} succeeded, {failed} failed",
                outcomes.len() - failed
            );
            outcomes
        } else {
            Vec::new()
        };

        self.startup_completed.store(true, Ordering::SeqCst);
        Ok(outcomes)
    }

    pub fn is_ready(&self) -> bool {
        self.startup_completed.load(Ordering::SeqCst)
    }
}

/// Builder for constructing `AppState` with platform-specific adapters.
///
/// # Required adapters
/// - `provider`: the remote DNS provider
/// - `domain_repository` and `record_repository` (or `store` for both)
///
/// # Optional
/// - `config`: defaults to `ReconcilerConfig::default()`
pub struct AppStateBuilder {
    provider: Option<Arc<dyn ZoneProvider>>,
    domain_repository: Option<Arc<dyn DomainRepository>>,
    record_repository: Option<Arc<dyn RecordRepository>>,
    config: ReconcilerConfig,
    sync_on_startup: bool,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            provider: None,
            domain_repository: None,
            record_repository: None,
            config: ReconcilerConfig::default(),
            sync_on_startup: false,
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn ZoneProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn domain_repository(mut self, repo: Arc<dyn DomainRepository>) -> Self {
        self.domain_repository = Some(repo);
        self
    }

    #[must_use]
    pub fn record_repository(mut self, repo: Arc<dyn RecordRepository>) -> Self {
        self.record_repository = Some(repo);
        self
    }

    /// Use one store for both repositories.
    #[must_use]
    pub fn store<S>(self, store: Arc<S>) -> Self
    where
        S: DomainRepository + RecordRepository + 'static,
    {
        let domain_repository: Arc<dyn DomainRepository> = store.clone();
        let record_repository: Arc<dyn RecordRepository> = store;
        self.domain_repository(domain_repository)
            .record_repository(record_repository)
    }

    #[must_use]
    pub fn config(mut self, config: ReconcilerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn sync_on_startup(mut self, enabled: bool) -> Self {
        self.sync_on_startup = enabled;
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `CoreError::Config` if a required adapter is missing or the
    /// reconciler config is invalid.
    pub fn build(self) -> CoreResult<AppState> {
        let provider = self
            .provider
            .ok_or_else(|| CoreError::Config("provider is required".to_string()))?;
        let domain_repository = self
            .domain_repository
            .ok_or_else(|| CoreError::Config("domain_repository is required".to_string()))?;
        let record_repository = self
            .record_repository
            .ok_or_else(|| CoreError::Config("record_repository is required".to_string()))?;
        self.config.validate()?;

        let ctx = Arc::new(ServiceContext::new(
            provider,
            domain_repository,
            record_repository,
            self.config,
        ));

        Ok(AppState {
            discovery_service: ZoneDiscoveryService::new(Arc::clone(&ctx)),
            provisioning_service: ZoneProvisioningService::new(Arc::clone(&ctx)),
            conflict_validator: ConflictValidator::new(Arc::clone(&ctx)),
            record_service: RecordService::new(Arc::clone(&ctx)),
            reconcile_service: ReconcileService::new(Arc::clone(&ctx)),
            ctx,
            sync_on_startup: self.sync_on_startup,
            startup_completed: AtomicBool::new(false),
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
