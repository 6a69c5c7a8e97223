// crates/ruleflow-core/tests/engine.rs
// ============================================================================
// Module: Engine Orchestrator Tests
// Description: Validate lifecycle, caching, audit, and notification behavior.
// Purpose: Ensure adapter failures never affect returned execution results.
// Dependencies: ruleflow-core, cond-logic, serde_json
// ============================================================================

//! Behavior tests for the engine orchestrator and its adapter integration.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use cond_logic::ConditionGroup;
use cond_logic::GroupNode;
use ruleflow_core::Action;
use ruleflow_core::ActionKind;
use ruleflow_core::AdapterError;
use ruleflow_core::AdapterKind;
use ruleflow_core::AdapterRegistration;
use ruleflow_core::AdapterSet;
use ruleflow_core::AuditAdapter;
use ruleflow_core::AuditEntry;
use ruleflow_core::CacheAdapter;
use ruleflow_core::Condition;
use ruleflow_core::Engine;
use ruleflow_core::EngineConfig;
use ruleflow_core::EngineError;
use ruleflow_core::EngineOptions;
use ruleflow_core::NotificationAdapter;
use ruleflow_core::NotificationEvent;
use ruleflow_core::NotificationSeverity;
use ruleflow_core::Plugin;
use ruleflow_core::Rule;
use ruleflow_core::RuleId;
use ruleflow_core::RuleSet;
use ruleflow_core::RuleSetFetcher;
use ruleflow_core::RuleSetId;
use ruleflow_core::RuleSetSource;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Test Fixtures
// ============================================================================

fn simple_rule(id: &str, field: &str, expected: Value, output_field: &str) -> Rule {
    Rule {
        id: RuleId::new(id),
        name: id.to_string(),
        priority: 0,
        enabled: true,
        conditions: ConditionGroup::all(vec![GroupNode::leaf(Condition {
            field: field.to_string(),
            operator: "equals".to_string(),
            value: expected,
        })]),
        actions: vec![Action {
            kind: ActionKind::Set,
            field: output_field.to_string(),
            value: json!(true),
        }],
    }
}

fn simple_rule_set(id: &str) -> RuleSet {
    RuleSet {
        id: id.into(),
        name: id.to_string(),
        rules: vec![simple_rule("hit", "go", json!(true), "done")],
        decision_tables: Vec::new(),
    }
}

/// Mutex-backed cache mock with call counting.
#[derive(Default)]
struct MapCache {
    slots: Mutex<BTreeMap<String, Value>>,
    gets: AtomicUsize,
    sets: AtomicUsize,
}

impl CacheAdapter for MapCache {
    fn get(&self, key: &str) -> Result<Option<Value>, AdapterError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Ok(self.slots.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value, _ttl: Option<Duration>) -> Result<(), AdapterError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.slots.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), AdapterError> {
        self.slots.lock().unwrap().remove(key);
        Ok(())
    }

    fn has(&self, key: &str) -> Result<bool, AdapterError> {
        Ok(self.slots.lock().unwrap().contains_key(key))
    }

    fn clear(&self) -> Result<(), AdapterError> {
        self.slots.lock().unwrap().clear();
        Ok(())
    }
}

/// Cache mock whose every operation fails.
struct BrokenCache;

impl CacheAdapter for BrokenCache {
    fn init(&self) -> Result<(), AdapterError> {
        Err(AdapterError::Unavailable("cache offline".to_string()))
    }

    fn get(&self, _key: &str) -> Result<Option<Value>, AdapterError> {
        Err(AdapterError::Backend("read refused".to_string()))
    }

    fn set(&self, _key: &str, _value: Value, _ttl: Option<Duration>) -> Result<(), AdapterError> {
        Err(AdapterError::Backend("write refused".to_string()))
    }

    fn delete(&self, _key: &str) -> Result<(), AdapterError> {
        Err(AdapterError::Backend("write refused".to_string()))
    }

    fn has(&self, _key: &str) -> Result<bool, AdapterError> {
        Err(AdapterError::Backend("read refused".to_string()))
    }

    fn clear(&self) -> Result<(), AdapterError> {
        Err(AdapterError::Backend("write refused".to_string()))
    }
}

/// Vector-backed audit mock.
#[derive(Default)]
struct VecAudit {
    entries: Mutex<Vec<AuditEntry>>,
}

impl AuditAdapter for VecAudit {
    fn record(&self, entry: AuditEntry) -> Result<(), AdapterError> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }
}

/// Audit mock whose writes always fail.
struct BrokenAudit;

impl AuditAdapter for BrokenAudit {
    fn record(&self, _entry: AuditEntry) -> Result<(), AdapterError> {
        Err(AdapterError::Backend("audit store down".to_string()))
    }
}

/// Vector-backed notification mock.
#[derive(Default)]
struct VecNotifier {
    events: Mutex<Vec<NotificationEvent>>,
}

impl NotificationAdapter for VecNotifier {
    fn notify(&self, event: NotificationEvent) -> Result<(), AdapterError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

/// Map-backed rule set fetcher mock.
#[derive(Default)]
struct MapFetcher {
    rule_sets: BTreeMap<String, RuleSet>,
    calls: AtomicUsize,
}

impl RuleSetFetcher for MapFetcher {
    fn fetch(&self, id: &RuleSetId) -> Result<RuleSet, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.rule_sets
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| AdapterError::Backend(format!("unknown rule set: {id}")))
    }
}

// ============================================================================
// SECTION: Lifecycle
// ============================================================================

#[test]
fn init_twice_is_a_configuration_error() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    engine.init().unwrap();

    assert!(matches!(engine.init(), Err(EngineError::AlreadyInitialized)));
}

#[test]
fn init_after_shutdown_is_rejected() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    engine.init().unwrap();
    engine.shutdown().unwrap();

    assert!(matches!(engine.init(), Err(EngineError::ShutDown)));
    assert!(matches!(engine.shutdown(), Err(EngineError::ShutDown)));
}

#[test]
fn execute_after_shutdown_returns_an_in_band_failure() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    engine.init().unwrap();
    engine.shutdown().unwrap();

    let result = engine.execute(&simple_rule_set("post"), json!({"go": true}));
    assert!(!result.success);
    assert_eq!(result.output, json!({}));
    assert!(result.error.is_some());
}

#[test]
fn shutdown_runs_plugin_destroy_callbacks() {
    let destroyed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&destroyed);

    let engine = Engine::new(EngineConfig {
        plugins: vec![Plugin::new("lifecycle").with_on_destroy(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })],
        ..EngineConfig::default()
    })
    .unwrap();

    engine.init().unwrap();
    engine.shutdown().unwrap();
    assert_eq!(destroyed.load(Ordering::SeqCst), 1);
}

#[test]
fn duplicate_plugins_fail_construction() {
    let config = EngineConfig {
        plugins: vec![Plugin::new("twin"), Plugin::new("twin")],
        ..EngineConfig::default()
    };
    assert!(matches!(Engine::new(config), Err(EngineError::Registry(_))));
}

// ============================================================================
// SECTION: Execution and Result Caching
// ============================================================================

#[test]
fn execute_evaluates_and_reports_time() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    let result = engine.execute(&simple_rule_set("basic"), json!({"go": true}));

    assert!(result.success);
    assert_eq!(result.output, json!({"done": true}));
    assert_eq!(result.rules_fired.len(), 1);
    // The field is unsigned; presence is the contract.
    let _always_reported: u64 = result.execution_time_ms;
}

#[test]
fn result_cache_short_circuits_recomputation() {
    let cache = Arc::new(MapCache::default());
    let evaluations = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&evaluations);

    let engine = Engine::new(EngineConfig {
        plugins: vec![Plugin::new("counter").with_after_rule(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })],
        adapters: AdapterSet {
            cache: Some(Arc::clone(&cache) as Arc<dyn CacheAdapter>),
            ..AdapterSet::default()
        },
        options: EngineOptions {
            cache_results: true,
            ..EngineOptions::default()
        },
    })
    .unwrap();

    let set = simple_rule_set("memo");
    let first = engine.execute(&set, json!({"go": true}));
    assert!(first.success);
    assert_eq!(evaluations.load(Ordering::SeqCst), 1);
    assert_eq!(cache.sets.load(Ordering::SeqCst), 1);

    let second = engine.execute(&set, json!({"go": true}));
    assert_eq!(second.output, first.output);
    assert_eq!(second.rules_fired, first.rules_fired);
    // The rule pass did not run again.
    assert_eq!(evaluations.load(Ordering::SeqCst), 1);
    assert_eq!(cache.sets.load(Ordering::SeqCst), 1);
}

#[test]
fn result_cache_keys_are_input_sensitive() {
    let cache = Arc::new(MapCache::default());
    let engine = Engine::new(EngineConfig {
        adapters: AdapterSet {
            cache: Some(Arc::clone(&cache) as Arc<dyn CacheAdapter>),
            ..AdapterSet::default()
        },
        options: EngineOptions {
            cache_results: true,
            ..EngineOptions::default()
        },
        ..EngineConfig::default()
    })
    .unwrap();

    let set = simple_rule_set("keys");
    let hit = engine.execute(&set, json!({"go": true}));
    let miss = engine.execute(&set, json!({"go": false}));

    assert_eq!(hit.output, json!({"done": true}));
    assert_eq!(miss.output, json!({}));
    // Two distinct inputs produced two distinct cache entries.
    assert_eq!(cache.slots.lock().unwrap().len(), 2);
    for key in cache.slots.lock().unwrap().keys() {
        assert!(key.starts_with("result:keys:"));
    }
}

#[test]
fn equivalent_inputs_fingerprint_identically_regardless_of_key_order() {
    let cache = Arc::new(MapCache::default());
    let engine = Engine::new(EngineConfig {
        adapters: AdapterSet {
            cache: Some(Arc::clone(&cache) as Arc<dyn CacheAdapter>),
            ..AdapterSet::default()
        },
        options: EngineOptions {
            cache_results: true,
            ..EngineOptions::default()
        },
        ..EngineConfig::default()
    })
    .unwrap();

    let set = simple_rule_set("canonical");
    let a: Value = serde_json::from_str(r#"{"go": true, "extra": 1}"#).unwrap();
    let b: Value = serde_json::from_str(r#"{"extra": 1, "go": true}"#).unwrap();

    let _ = engine.execute(&set, a);
    let _ = engine.execute(&set, b);
    assert_eq!(cache.slots.lock().unwrap().len(), 1);
}

#[test]
fn cache_failures_degrade_to_misses_and_are_recorded() {
    let engine = Engine::new(EngineConfig {
        adapters: AdapterSet {
            cache: Some(Arc::new(BrokenCache)),
            ..AdapterSet::default()
        },
        options: EngineOptions {
            cache_results: true,
            ..EngineOptions::default()
        },
        ..EngineConfig::default()
    })
    .unwrap();

    let result = engine.execute(&simple_rule_set("broken"), json!({"go": true}));
    assert!(result.success);
    assert_eq!(result.output, json!({"done": true}));

    let failures = engine.recent_adapter_failures();
    assert!(failures.iter().any(|f| f.kind == AdapterKind::Cache && f.operation == "get"));
    assert!(failures.iter().any(|f| f.kind == AdapterKind::Cache && f.operation == "set"));
}

// ============================================================================
// SECTION: Audit and Notification
// ============================================================================

#[test]
fn audit_entries_record_every_execution() {
    let audit = Arc::new(VecAudit::default());
    let engine = Engine::new(EngineConfig {
        adapters: AdapterSet {
            audit: Some(Arc::clone(&audit) as Arc<dyn AuditAdapter>),
            ..AdapterSet::default()
        },
        options: EngineOptions {
            metadata: json!({"env": "test"}),
            ..EngineOptions::default()
        },
        ..EngineConfig::default()
    })
    .unwrap();

    let set = simple_rule_set("audited");
    let _ = engine.execute(&set, json!({"go": true}));
    let _ = engine.execute(&set, json!({"go": false}));

    let entries = audit.entries.lock().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].rule_set_id, RuleSetId::new("audited"));
    assert_eq!(entries[0].metadata, json!({"env": "test"}));
    assert!(entries[0].result.success);
}

#[test]
fn audit_can_be_disabled() {
    let audit = Arc::new(VecAudit::default());
    let engine = Engine::new(EngineConfig {
        adapters: AdapterSet {
            audit: Some(Arc::clone(&audit) as Arc<dyn AuditAdapter>),
            ..AdapterSet::default()
        },
        options: EngineOptions {
            audit_enabled: false,
            ..EngineOptions::default()
        },
        ..EngineConfig::default()
    })
    .unwrap();

    let _ = engine.execute(&simple_rule_set("silent"), json!({"go": true}));
    assert!(audit.entries.lock().unwrap().is_empty());
}

#[test]
fn audit_failures_never_affect_results() {
    let engine = Engine::new(EngineConfig {
        adapters: AdapterSet {
            audit: Some(Arc::new(BrokenAudit)),
            ..AdapterSet::default()
        },
        ..EngineConfig::default()
    })
    .unwrap();

    let result = engine.execute(&simple_rule_set("resilient"), json!({"go": true}));
    assert!(result.success);
    assert_eq!(result.output, json!({"done": true}));
    assert!(
        engine
            .recent_adapter_failures()
            .iter()
            .any(|f| f.kind == AdapterKind::Audit && f.operation == "record")
    );
}

#[test]
fn notifications_fire_for_hits_and_failures_only() {
    let notifier = Arc::new(VecNotifier::default());
    let engine = Engine::new(EngineConfig {
        plugins: vec![Plugin::new("tripwire").with_before_execute(|ctx| {
            if ctx.input.get("explode").is_some() {
                return Err(ruleflow_core::HookError::new("boom"));
            }
            Ok(ctx)
        })],
        adapters: AdapterSet {
            notification: Some(Arc::clone(&notifier) as Arc<dyn NotificationAdapter>),
            ..AdapterSet::default()
        },
        options: EngineOptions::default(),
    })
    .unwrap();

    let set = simple_rule_set("notified");
    // Fired rule: info event.
    let _ = engine.execute(&set, json!({"go": true}));
    // Success with zero fired rules: no event.
    let _ = engine.execute(&set, json!({"go": false}));
    // Failure: error event.
    let _ = engine.execute(&set, json!({"explode": 1}));

    let events = notifier.events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].severity, NotificationSeverity::Info);
    assert_eq!(events[0].rules_fired, vec![RuleId::new("hit")]);
    assert_eq!(events[1].severity, NotificationSeverity::Error);
    assert!(events[1].message.contains("boom"));
}

// ============================================================================
// SECTION: Rule Set Loading
// ============================================================================

#[test]
fn load_rule_set_by_id_requires_a_fetcher_on_miss() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    let err = engine.load_rule_set(RuleSetSource::Id("ghost".into()), None).unwrap_err();
    assert!(matches!(err, EngineError::MissingFetcher(_)));
}

#[test]
fn load_rule_set_uses_cache_before_the_fetcher() {
    let cache = Arc::new(MapCache::default());
    let engine = Engine::new(EngineConfig {
        adapters: AdapterSet {
            cache: Some(Arc::clone(&cache) as Arc<dyn CacheAdapter>),
            ..AdapterSet::default()
        },
        options: EngineOptions {
            cache_rule_sets: true,
            ..EngineOptions::default()
        },
        ..EngineConfig::default()
    })
    .unwrap();

    let mut fetcher = MapFetcher::default();
    fetcher.rule_sets.insert("stored".to_string(), simple_rule_set("stored"));

    // First load misses the cache and fetches.
    let loaded = engine.load_rule_set(RuleSetSource::Id("stored".into()), Some(&fetcher)).unwrap();
    assert_eq!(loaded.id, RuleSetId::new("stored"));
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    assert!(cache.slots.lock().unwrap().contains_key("ruleset:stored"));

    // Second load is served from the cache.
    let again = engine.load_rule_set(RuleSetSource::Id("stored".into()), Some(&fetcher)).unwrap();
    assert_eq!(again, loaded);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn inline_rule_sets_are_validated() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    let mut duplicate = simple_rule_set("dup");
    duplicate.rules.push(duplicate.rules[0].clone());

    let err = engine.load_rule_set(RuleSetSource::Inline(duplicate), None).unwrap_err();
    assert!(matches!(err, EngineError::RuleSet(_)));
}

#[test]
fn fetch_failures_surface_to_the_caller() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    let fetcher = MapFetcher::default();

    let err =
        engine.load_rule_set(RuleSetSource::Id("missing".into()), Some(&fetcher)).unwrap_err();
    assert!(matches!(err, EngineError::Adapter(_)));
}

// ============================================================================
// SECTION: Runtime Registration
// ============================================================================

#[test]
fn adapters_can_be_registered_at_runtime() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    let notifier = Arc::new(VecNotifier::default());
    engine
        .register_adapter(AdapterRegistration::Notification(
            Arc::clone(&notifier) as Arc<dyn NotificationAdapter>
        ))
        .unwrap();

    let _ = engine.execute(&simple_rule_set("late"), json!({"go": true}));
    assert_eq!(notifier.events.lock().unwrap().len(), 1);
}

#[test]
fn plugins_can_be_registered_and_unregistered_at_runtime() {
    let engine = Engine::new(EngineConfig::default()).unwrap();

    let set = RuleSet {
        id: "plugin-op".into(),
        name: "plugin operator".to_string(),
        rules: vec![Rule {
            id: RuleId::new("near"),
            name: "near".to_string(),
            priority: 0,
            enabled: true,
            conditions: ConditionGroup::all(vec![GroupNode::leaf(Condition {
                field: "d".to_string(),
                operator: "within".to_string(),
                value: json!(5),
            })]),
            actions: vec![Action {
                kind: ActionKind::Set,
                field: "near".to_string(),
                value: json!(true),
            }],
        }],
        decision_tables: Vec::new(),
    };

    // Unknown operator: FALSE fallback.
    assert!(engine.execute(&set, json!({"d": 3})).rules_fired.is_empty());

    engine
        .register_plugin(Plugin::new("geo").with_operator("within", |field, compare| {
            match (field.and_then(Value::as_f64), compare.as_f64()) {
                (Some(d), Some(max)) => d <= max,
                _ => false,
            }
        }))
        .unwrap();
    assert_eq!(engine.execute(&set, json!({"d": 3})).rules_fired.len(), 1);

    engine.unregister_plugin("geo").unwrap();
    assert!(engine.execute(&set, json!({"d": 3})).rules_fired.is_empty());
}

#[test]
fn registry_view_exposes_the_extension_surface() {
    let engine = Engine::new(EngineConfig {
        plugins: vec![Plugin::new("viewer").with_operator("near", |_, _| true)],
        ..EngineConfig::default()
    })
    .unwrap();

    let view = engine.registry_view().unwrap();
    assert_eq!(view.plugins, vec!["viewer".to_string()]);
    assert_eq!(view.operators, vec!["near".to_string()]);
}
