//! SDK context: built once by the host, then passed to whatever needs it.

use crate::callback::{CallbackContext, InlineContext};
use crate::error::{SdkError, SdkResult};
use crate::service::EntityService;
use cache_database::{AsyncDatabase, ChangeHub};
use cache_reconciler::{CacheStore, CascadeRules};
use frollo_domain::entities::{
    Account, Budget, BudgetPeriod, Consent, DisclosureConsent, ExternalParty, Message, Provider,
    ProviderAccount, Report,
};
use frollo_domain::{frollo_cascade_rules, Entity, EntityManager};
use remote_fetch_gateway::{
    AccessTokenProvider, FetchGateway, HttpFetchGateway, StaticAccessToken,
};
use sdk_config_and_utils::{Config, Paths};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Handle, Runtime};
use tracing::info;

/// Everything a running SDK instance owns: configuration, the worker pool,
/// the cache and the remote gateway.
///
/// The context owns its tokio runtime, so it must be built and dropped
/// outside of any async context.
pub struct SdkContext {
    config: Arc<Config>,
    paths: Arc<Paths>,
    runtime: Runtime,
    store: CacheStore,
    gateway: Arc<dyn FetchGateway>,
    cascades: Arc<CascadeRules>,
    callbacks: Arc<dyn CallbackContext>,
}

/// Builder for [`SdkContext`].
pub struct SdkContextBuilder {
    config: Config,
    paths: Paths,
    gateway: Option<Arc<dyn FetchGateway>>,
    tokens: Option<Arc<dyn AccessTokenProvider>>,
    callbacks: Option<Arc<dyn CallbackContext>>,
}

impl SdkContextBuilder {
    /// Use this gateway instead of the HTTP one built from the config.
    pub fn gateway(mut self, gateway: Arc<dyn FetchGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Bearer tokens for the HTTP gateway. Anonymous when unset.
    pub fn access_tokens(mut self, tokens: Arc<dyn AccessTokenProvider>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Where completions run. Inline on the worker when unset.
    pub fn callbacks(mut self, callbacks: Arc<dyn CallbackContext>) -> Self {
        self.callbacks = Some(callbacks);
        self
    }

    pub fn build(self) -> SdkResult<SdkContext> {
        if Handle::try_current().is_ok() {
            return Err(SdkError::Runtime(
                "SdkContext must be built outside of an async runtime".to_string(),
            ));
        }

        self.config.validate()?;
        self.paths.ensure_dirs()?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.worker_threads)
            .thread_name("frollo-sdk-worker")
            .enable_all()
            .build()?;

        let db_path = self.paths.database_file();
        let db = runtime.block_on(AsyncDatabase::open(&db_path))?;
        info!(path = %db_path.display(), "Cache database opened");

        let gateway = match self.gateway {
            Some(gateway) => gateway,
            None => {
                let tokens = self
                    .tokens
                    .unwrap_or_else(|| Arc::new(StaticAccessToken::anonymous()));
                Arc::new(HttpFetchGateway::new(
                    self.config.api_base_url()?,
                    self.config.request_timeout(),
                    tokens,
                )?) as Arc<dyn FetchGateway>
            }
        };

        let cascades = Arc::new(frollo_cascade_rules()?);
        let callbacks = self
            .callbacks
            .unwrap_or_else(|| Arc::new(InlineContext) as Arc<dyn CallbackContext>);

        info!(
            api_base_url = %self.config.api_base_url,
            worker_threads = self.config.worker_threads,
            page_size = self.config.default_page_size,
            "SDK context ready"
        );

        Ok(SdkContext {
            config: Arc::new(self.config),
            paths: Arc::new(self.paths),
            runtime,
            store: CacheStore::new(db, ChangeHub::new()),
            gateway,
            cascades,
            callbacks,
        })
    }
}

impl SdkContext {
    pub fn builder(config: Config, paths: Paths) -> SdkContextBuilder {
        SdkContextBuilder {
            config,
            paths,
            gateway: None,
            tokens: None,
            callbacks: None,
        }
    }

    /// Context with the HTTP gateway and inline completions.
    pub fn new(config: Config, paths: Paths) -> SdkResult<Self> {
        Self::builder(config, paths).build()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Handle of the worker pool, for hosts that want to run their own work
    /// next to the SDK's.
    pub fn worker_handle(&self) -> Handle {
        self.runtime.handle().clone()
    }

    /// Host API for any cached entity type.
    pub fn service<E: Entity>(&self) -> EntityService<E> {
        let manager = EntityManager::new(
            self.store.clone(),
            Arc::clone(&self.gateway),
            Arc::clone(&self.cascades),
        );
        EntityService::new(
            manager,
            self.runtime.handle().clone(),
            Arc::clone(&self.callbacks),
            self.config.default_page_size,
        )
    }

    pub fn providers(&self) -> EntityService<Provider> {
        self.service()
    }

    pub fn provider_accounts(&self) -> EntityService<ProviderAccount> {
        self.service()
    }

    pub fn accounts(&self) -> EntityService<Account> {
        self.service()
    }

    pub fn consents(&self) -> EntityService<Consent> {
        self.service()
    }

    pub fn external_parties(&self) -> EntityService<ExternalParty> {
        self.service()
    }

    pub fn disclosure_consents(&self) -> EntityService<DisclosureConsent> {
        self.service()
    }

    pub fn budgets(&self) -> EntityService<Budget> {
        self.service()
    }

    pub fn budget_periods(&self) -> EntityService<BudgetPeriod> {
        self.service()
    }

    pub fn messages(&self) -> EntityService<Message> {
        self.service()
    }

    pub fn reports(&self) -> EntityService<Report> {
        self.service()
    }

    /// Stop the worker pool, giving in-flight refreshes `timeout` to finish.
    /// Pages already committed stay in the cache.
    pub fn shutdown(self, timeout: Duration) {
        info!("Shutting down SDK context");
        self.runtime.shutdown_timeout(timeout);
    }
}
