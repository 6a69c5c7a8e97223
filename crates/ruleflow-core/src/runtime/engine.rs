// crates/ruleflow-core/src/runtime/engine.rs
// ============================================================================
// Module: Ruleflow Engine Orchestrator
// Description: Lifecycle-aware execution shell with caching, audit, and notification.
// Purpose: Compose the pure evaluator with pluggable side-effect adapters.
// Dependencies: crate::{core, interfaces, runtime}, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The engine wraps the pure evaluator with adapter integration: result and
//! rule-set caching, audit recording, and event notification. Adapter
//! failures never affect the returned result; cache reads degrade to misses
//! and every other failure is swallowed into a bounded diagnostics log.
//! Configuration and lifecycle misuse surface as errors from the lifecycle
//! methods, never from `execute`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::RwLock;
use std::time::Instant;
use std::time::SystemTime;

use serde_json::Value;
use thiserror::Error;

use crate::core::ExecutionResult;
use crate::core::RuleSet;
use crate::core::RuleSetError;
use crate::core::RuleSetId;
use crate::core::Timestamp;
use crate::core::input_fingerprint;
use crate::core::result_cache_key;
use crate::core::rule_set_cache_key;
use crate::interfaces::AdapterError;
use crate::interfaces::AdapterKind;
use crate::interfaces::AuditAdapter;
use crate::interfaces::AuditEntry;
use crate::interfaces::CacheAdapter;
use crate::interfaces::DataSourceAdapter;
use crate::interfaces::NotificationAdapter;
use crate::interfaces::NotificationEvent;
use crate::interfaces::NotificationSeverity;
use crate::interfaces::RuleSetFetcher;
use crate::runtime::evaluator::RuleEvaluator;
use crate::runtime::evaluator::elapsed_ms;
use crate::runtime::registry::ExecutionContext;
use crate::runtime::registry::Plugin;
use crate::runtime::registry::PluginRegistry;
use crate::runtime::registry::RegistryError;
use crate::runtime::registry::RegistryView;

// ============================================================================
// SECTION: Engine Options
// ============================================================================

/// Behavior switches for one engine instance.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    /// Cache hydrated rule sets under `ruleset:<id>`.
    pub cache_rule_sets: bool,
    /// Time-to-live for cached rule sets.
    pub cache_rule_set_ttl: Option<std::time::Duration>,
    /// Memoize execution results under `result:<id>:<fingerprint>`.
    pub cache_results: bool,
    /// Time-to-live for memoized results.
    pub cache_result_ttl: Option<std::time::Duration>,
    /// Record an audit entry after every execution.
    pub audit_enabled: bool,
    /// Host metadata attached to hook contexts and audit entries.
    pub metadata: Value,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            cache_rule_sets: false,
            cache_rule_set_ttl: None,
            cache_results: false,
            cache_result_ttl: None,
            audit_enabled: true,
            metadata: Value::Null,
        }
    }
}

// ============================================================================
// SECTION: Adapter Set
// ============================================================================

/// Adapter slots consumed by the engine.
#[derive(Clone, Default)]
pub struct AdapterSet {
    /// External fact hydration adapter.
    pub data_source: Option<Arc<dyn DataSourceAdapter>>,
    /// Cache adapter for rule sets and results.
    pub cache: Option<Arc<dyn CacheAdapter>>,
    /// Audit trail adapter.
    pub audit: Option<Arc<dyn AuditAdapter>>,
    /// Notification sink adapter.
    pub notification: Option<Arc<dyn NotificationAdapter>>,
}

/// Runtime adapter registration for one engine slot.
pub enum AdapterRegistration {
    /// Replace the data source slot.
    DataSource(Arc<dyn DataSourceAdapter>),
    /// Replace the audit slot.
    Audit(Arc<dyn AuditAdapter>),
    /// Replace the cache slot.
    Cache(Arc<dyn CacheAdapter>),
    /// Replace the notification slot.
    Notification(Arc<dyn NotificationAdapter>),
}

impl AdapterRegistration {
    /// Returns the adapter kind being registered.
    #[must_use]
    pub const fn kind(&self) -> AdapterKind {
        match self {
            Self::DataSource(_) => AdapterKind::DataSource,
            Self::Audit(_) => AdapterKind::Audit,
            Self::Cache(_) => AdapterKind::Cache,
            Self::Notification(_) => AdapterKind::Notification,
        }
    }
}

// ============================================================================
// SECTION: Engine Configuration
// ============================================================================

/// Construction-time engine configuration.
#[derive(Default)]
pub struct EngineConfig {
    /// Plugins registered before the engine becomes usable.
    pub plugins: Vec<Plugin>,
    /// Initial adapter set.
    pub adapters: AdapterSet,
    /// Behavior options.
    pub options: EngineOptions,
}

// ============================================================================
// SECTION: Rule Set Sources
// ============================================================================

/// Input accepted by [`Engine::load_rule_set`].
pub enum RuleSetSource {
    /// An already-hydrated rule set.
    Inline(RuleSet),
    /// A rule set identifier resolved via cache or fetcher.
    Id(RuleSetId),
}

impl From<RuleSet> for RuleSetSource {
    fn from(rule_set: RuleSet) -> Self {
        Self::Inline(rule_set)
    }
}

impl From<RuleSetId> for RuleSetSource {
    fn from(id: RuleSetId) -> Self {
        Self::Id(id)
    }
}

// ============================================================================
// SECTION: Engine Errors
// ============================================================================

/// Configuration and lifecycle errors surfaced to the caller.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - `execute` never returns these; evaluation failures are in-band.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Plugin registry mutation failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// Rule set failed structural validation.
    #[error(transparent)]
    RuleSet(#[from] RuleSetError),
    /// A rule set fetch failed.
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    /// `init` was called on an initialized engine.
    #[error("engine is already initialized")]
    AlreadyInitialized,
    /// A lifecycle method was called after `shutdown`.
    #[error("engine has been shut down")]
    ShutDown,
    /// A rule set id missed the cache and no fetcher was provided.
    #[error("rule set {0} is not cached and no fetcher was provided")]
    MissingFetcher(String),
    /// The requested adapter slot is empty.
    #[error("no {0} adapter registered")]
    MissingAdapter(AdapterKind),
    /// An internal lock was poisoned by a panicking thread.
    #[error("engine lock poisoned")]
    LockPoisoned,
}

// ============================================================================
// SECTION: Adapter Failure Diagnostics
// ============================================================================

/// Bound on retained adapter failure records.
const MAX_RECORDED_FAILURES: usize = 64;

/// One swallowed adapter failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterFailure {
    /// Adapter kind that failed.
    pub kind: AdapterKind,
    /// Operation that failed (`init`, `get`, `set`, `record`, `notify`, ...).
    pub operation: String,
    /// Failure message.
    pub message: String,
}

// ============================================================================
// SECTION: Lifecycle State
// ============================================================================

/// Engine lifecycle phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LifecycleState {
    /// Constructed, adapters not yet initialized.
    Created,
    /// `init` has run.
    Ready,
    /// `shutdown` has run; the engine cannot be reused.
    Shutdown,
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Lifecycle-aware rule engine composing the evaluator with adapters.
///
/// Concurrent executions are supported; plugin and adapter registration use
/// writer locks and must not overlap execution by caller contract.
pub struct Engine {
    /// Plugin registry shared by all executions.
    registry: RwLock<PluginRegistry>,
    /// Adapter slots.
    adapters: RwLock<AdapterSet>,
    /// Behavior options fixed at construction.
    options: EngineOptions,
    /// Lifecycle phase.
    state: Mutex<LifecycleState>,
    /// Bounded log of swallowed adapter failures.
    failures: Mutex<VecDeque<AdapterFailure>>,
}

impl Engine {
    /// Creates an engine, registering configured plugins.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Registry`] on duplicate plugin names or
    /// register-callback failures.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let mut registry = PluginRegistry::new();
        for plugin in config.plugins {
            registry.register(plugin)?;
        }

        Ok(Self {
            registry: RwLock::new(registry),
            adapters: RwLock::new(config.adapters),
            options: config.options,
            state: Mutex::new(LifecycleState::Created),
            failures: Mutex::new(VecDeque::new()),
        })
    }

    /// Initializes every configured adapter.
    ///
    /// Adapter `init` failures are swallowed into the diagnostics log; the
    /// engine still becomes ready.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::AlreadyInitialized`] on double init and
    /// [`EngineError::ShutDown`] after shutdown.
    pub fn init(&self) -> Result<(), EngineError> {
        let mut state = self.state.lock().map_err(|_| EngineError::LockPoisoned)?;
        match *state {
            LifecycleState::Created => {}
            LifecycleState::Ready => return Err(EngineError::AlreadyInitialized),
            LifecycleState::Shutdown => return Err(EngineError::ShutDown),
        }

        let adapters = self.adapter_snapshot();
        if let Some(adapter) = &adapters.data_source
            && let Err(err) = adapter.init()
        {
            self.record_failure(AdapterKind::DataSource, "init", &err);
        }
        if let Some(adapter) = &adapters.audit
            && let Err(err) = adapter.init()
        {
            self.record_failure(AdapterKind::Audit, "init", &err);
        }
        if let Some(adapter) = &adapters.cache
            && let Err(err) = adapter.init()
        {
            self.record_failure(AdapterKind::Cache, "init", &err);
        }
        if let Some(adapter) = &adapters.notification
            && let Err(err) = adapter.init()
        {
            self.record_failure(AdapterKind::Notification, "init", &err);
        }

        *state = LifecycleState::Ready;
        Ok(())
    }

    /// Destroys every configured adapter and unregisters all plugins.
    ///
    /// Adapter `destroy` failures are swallowed into the diagnostics log;
    /// the first plugin destroy-callback failure is reported after all
    /// callbacks have run.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ShutDown`] on double shutdown and
    /// [`EngineError::Registry`] when a plugin destroy callback fails.
    pub fn shutdown(&self) -> Result<(), EngineError> {
        let mut state = self.state.lock().map_err(|_| EngineError::LockPoisoned)?;
        if *state == LifecycleState::Shutdown {
            return Err(EngineError::ShutDown);
        }
        *state = LifecycleState::Shutdown;
        drop(state);

        let adapters = self.adapter_snapshot();
        if let Some(adapter) = &adapters.data_source
            && let Err(err) = adapter.destroy()
        {
            self.record_failure(AdapterKind::DataSource, "destroy", &err);
        }
        if let Some(adapter) = &adapters.audit
            && let Err(err) = adapter.destroy()
        {
            self.record_failure(AdapterKind::Audit, "destroy", &err);
        }
        if let Some(adapter) = &adapters.cache
            && let Err(err) = adapter.destroy()
        {
            self.record_failure(AdapterKind::Cache, "destroy", &err);
        }
        if let Some(adapter) = &adapters.notification
            && let Err(err) = adapter.destroy()
        {
            self.record_failure(AdapterKind::Notification, "destroy", &err);
        }

        self.registry
            .write()
            .map_err(|_| EngineError::LockPoisoned)?
            .destroy_all()
            .map_err(EngineError::Registry)
    }

    /// Executes a rule set against an input fact object.
    ///
    /// Always returns an [`ExecutionResult`]; hook failures, lock poisoning,
    /// and execution after shutdown surface as `success=false` results with
    /// the elapsed time reported.
    #[must_use]
    pub fn execute(&self, rule_set: &RuleSet, input: Value) -> ExecutionResult {
        let started = Instant::now();
        let snapshot = input.clone();

        if self.state.lock().is_ok_and(|state| *state == LifecycleState::Shutdown) {
            return self.finalize(
                rule_set,
                ExecutionResult::failure(snapshot, "engine has been shut down", elapsed_ms(started)),
                None,
            );
        }

        let Ok(registry) = self.registry.read() else {
            return self.finalize(
                rule_set,
                ExecutionResult::failure(
                    snapshot,
                    "plugin registry lock poisoned",
                    elapsed_ms(started),
                ),
                None,
            );
        };
        let evaluator = RuleEvaluator::new(&registry);

        let ctx = ExecutionContext {
            rule_set_id: rule_set.id.clone(),
            rule_set_name: rule_set.name.clone(),
            input,
            metadata: self.options.metadata.clone(),
        };
        let ctx = match evaluator.run_before_execute(ctx) {
            Ok(ctx) => ctx,
            Err(err) => {
                return self.finalize(
                    rule_set,
                    ExecutionResult::failure(snapshot, err.to_string(), elapsed_ms(started)),
                    None,
                );
            }
        };

        let mut cache_key = None;
        if self.options.cache_results
            && let Some(cache) = self.cache_adapter()
            && let Ok(fingerprint) = input_fingerprint(&ctx.input)
        {
            let key = result_cache_key(&rule_set.id, &fingerprint);
            match cache.get(&key) {
                Ok(Some(value)) => {
                    if let Ok(result) = serde_json::from_value::<ExecutionResult>(value) {
                        return self.finalize(rule_set, result, None);
                    }
                }
                Ok(None) => {}
                Err(err) => self.record_failure(AdapterKind::Cache, "get", &err),
            }
            cache_key = Some(key);
        }

        let result = evaluator.execute_prepared(rule_set, ctx.input, started);
        self.finalize(rule_set, result, cache_key)
    }

    /// Loads a rule set from an inline value or by identifier.
    ///
    /// Identifier loads consult the cache first when rule-set caching is
    /// enabled (read failures degrade to misses), then the fetcher. Loaded
    /// rule sets are validated and written back to the cache.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingFetcher`] when an uncached id has no
    /// fetcher, [`EngineError::Adapter`] when the fetch fails, and
    /// [`EngineError::RuleSet`] when validation fails.
    pub fn load_rule_set(
        &self,
        source: RuleSetSource,
        fetcher: Option<&dyn RuleSetFetcher>,
    ) -> Result<RuleSet, EngineError> {
        match source {
            RuleSetSource::Inline(rule_set) => {
                rule_set.validate()?;
                self.cache_rule_set(&rule_set);
                Ok(rule_set)
            }
            RuleSetSource::Id(id) => {
                if self.options.cache_rule_sets
                    && let Some(cache) = self.cache_adapter()
                {
                    match cache.get(&rule_set_cache_key(&id)) {
                        Ok(Some(value)) => {
                            if let Ok(rule_set) = serde_json::from_value::<RuleSet>(value) {
                                return Ok(rule_set);
                            }
                        }
                        Ok(None) => {}
                        Err(err) => self.record_failure(AdapterKind::Cache, "get", &err),
                    }
                }

                let fetcher =
                    fetcher.ok_or_else(|| EngineError::MissingFetcher(id.to_string()))?;
                let rule_set = fetcher.fetch(&id)?;
                rule_set.validate()?;
                self.cache_rule_set(&rule_set);
                Ok(rule_set)
            }
        }
    }

    /// Registers a plugin at runtime.
    ///
    /// Must not overlap in-flight executions; the writer lock enforces this.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Registry`] on duplicate names or callback
    /// failure.
    pub fn register_plugin(&self, plugin: Plugin) -> Result<(), EngineError> {
        self.registry
            .write()
            .map_err(|_| EngineError::LockPoisoned)?
            .register(plugin)
            .map_err(EngineError::Registry)
    }

    /// Unregisters a plugin by name, restoring built-in dispatch for the
    /// names it contributed.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Registry`] for unknown names or destroy
    /// callback failure.
    pub fn unregister_plugin(&self, name: &str) -> Result<(), EngineError> {
        self.registry
            .write()
            .map_err(|_| EngineError::LockPoisoned)?
            .unregister(name)
            .map_err(EngineError::Registry)
    }

    /// Replaces one adapter slot at runtime.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::LockPoisoned`] when the adapter lock is
    /// poisoned.
    pub fn register_adapter(&self, registration: AdapterRegistration) -> Result<(), EngineError> {
        let mut adapters = self.adapters.write().map_err(|_| EngineError::LockPoisoned)?;
        match registration {
            AdapterRegistration::DataSource(adapter) => adapters.data_source = Some(adapter),
            AdapterRegistration::Audit(adapter) => adapters.audit = Some(adapter),
            AdapterRegistration::Cache(adapter) => adapters.cache = Some(adapter),
            AdapterRegistration::Notification(adapter) => adapters.notification = Some(adapter),
        }
        Ok(())
    }

    /// Fetches external facts through the data source adapter.
    ///
    /// The evaluator never calls this; hosts use it to assemble inputs
    /// before `execute`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingAdapter`] when no data source is
    /// registered and [`EngineError::Adapter`] when the fetch fails.
    pub fn fetch_data(&self, context: &Value, options: &Value) -> Result<Value, EngineError> {
        let adapter = self
            .adapter_snapshot()
            .data_source
            .ok_or(EngineError::MissingAdapter(AdapterKind::DataSource))?;
        adapter.fetch_data(context, options).map_err(EngineError::Adapter)
    }

    /// Returns recent swallowed adapter failures, oldest first.
    #[must_use]
    pub fn recent_adapter_failures(&self) -> Vec<AdapterFailure> {
        self.failures.lock().map(|log| log.iter().cloned().collect()).unwrap_or_default()
    }

    /// Returns a read-only snapshot of the plugin extension surface.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::LockPoisoned`] when the registry lock is
    /// poisoned.
    pub fn registry_view(&self) -> Result<RegistryView, EngineError> {
        self.registry.read().map(|registry| registry.view()).map_err(|_| EngineError::LockPoisoned)
    }

    /// Applies result caching, audit, and notification side effects, then
    /// returns the result unchanged.
    fn finalize(
        &self,
        rule_set: &RuleSet,
        result: ExecutionResult,
        cache_key: Option<String>,
    ) -> ExecutionResult {
        if result.success
            && let Some(key) = cache_key
            && let Some(cache) = self.cache_adapter()
        {
            match serde_json::to_value(&result) {
                Ok(value) => {
                    if let Err(err) = cache.set(&key, value, self.options.cache_result_ttl) {
                        self.record_failure(AdapterKind::Cache, "set", &err);
                    }
                }
                Err(err) => self.record_failure(
                    AdapterKind::Cache,
                    "set",
                    &AdapterError::Serialization(err.to_string()),
                ),
            }
        }

        if self.options.audit_enabled
            && let Some(audit) = self.audit_adapter()
        {
            let entry = AuditEntry {
                timestamp: current_timestamp(),
                rule_set_id: rule_set.id.clone(),
                rule_set_name: rule_set.name.clone(),
                result: result.clone(),
                metadata: self.options.metadata.clone(),
            };
            if let Err(err) = audit.record(entry) {
                self.record_failure(AdapterKind::Audit, "record", &err);
            }
        }

        if let Some(notification) = self.notification_adapter() {
            let event = if result.success && !result.rules_fired.is_empty() {
                Some(NotificationEvent {
                    severity: NotificationSeverity::Info,
                    rule_set_id: rule_set.id.clone(),
                    message: format!(
                        "rule set {} fired {} rule(s)",
                        rule_set.id,
                        result.rules_fired.len()
                    ),
                    rules_fired: result.rules_fired.clone(),
                    timestamp: current_timestamp(),
                })
            } else if result.success {
                None
            } else {
                Some(NotificationEvent {
                    severity: NotificationSeverity::Error,
                    rule_set_id: rule_set.id.clone(),
                    message: result.error.clone().unwrap_or_else(|| "execution failed".to_string()),
                    rules_fired: Vec::new(),
                    timestamp: current_timestamp(),
                })
            };
            if let Some(event) = event
                && let Err(err) = notification.notify(event)
            {
                self.record_failure(AdapterKind::Notification, "notify", &err);
            }
        }

        result
    }

    /// Writes a rule set to the cache when rule-set caching is enabled.
    fn cache_rule_set(&self, rule_set: &RuleSet) {
        if !self.options.cache_rule_sets {
            return;
        }
        let Some(cache) = self.cache_adapter() else {
            return;
        };
        match serde_json::to_value(rule_set) {
            Ok(value) => {
                let key = rule_set_cache_key(&rule_set.id);
                if let Err(err) = cache.set(&key, value, self.options.cache_rule_set_ttl) {
                    self.record_failure(AdapterKind::Cache, "set", &err);
                }
            }
            Err(err) => self.record_failure(
                AdapterKind::Cache,
                "set",
                &AdapterError::Serialization(err.to_string()),
            ),
        }
    }

    /// Returns a clone of the adapter slots.
    fn adapter_snapshot(&self) -> AdapterSet {
        self.adapters.read().map(|adapters| adapters.clone()).unwrap_or_default()
    }

    /// Returns the cache adapter, if configured.
    fn cache_adapter(&self) -> Option<Arc<dyn CacheAdapter>> {
        self.adapters.read().ok().and_then(|adapters| adapters.cache.clone())
    }

    /// Returns the audit adapter, if configured.
    fn audit_adapter(&self) -> Option<Arc<dyn AuditAdapter>> {
        self.adapters.read().ok().and_then(|adapters| adapters.audit.clone())
    }

    /// Returns the notification adapter, if configured.
    fn notification_adapter(&self) -> Option<Arc<dyn NotificationAdapter>> {
        self.adapters.read().ok().and_then(|adapters| adapters.notification.clone())
    }

    /// Appends one swallowed failure to the bounded diagnostics log.
    fn record_failure(&self, kind: AdapterKind, operation: &str, error: &AdapterError) {
        let Ok(mut log) = self.failures.lock() else {
            return;
        };
        if log.len() == MAX_RECORDED_FAILURES {
            log.pop_front();
        }
        log.push_back(AdapterFailure {
            kind,
            operation: operation.to_string(),
            message: error.to_string(),
        });
    }
}

// ============================================================================
// SECTION: Time Helpers
// ============================================================================

/// Returns the current wall-clock time as a unix-millisecond timestamp.
fn current_timestamp() -> Timestamp {
    Timestamp::from_system_time(SystemTime::now())
}
