// crates/ruleflow-core/src/runtime/registry.rs
// ============================================================================
// Module: Ruleflow Plugin Registry
// Description: Registry for plugin operators, actions, functions, and hooks.
// Purpose: Route extension-point lookups by name with uniqueness enforcement.
// Dependencies: crate::core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The registry is a long-lived lookup table shared by all executions on one
//! engine instance. Plugins contribute named operators, action handlers,
//! functions, lifecycle hooks, and register/destroy callbacks. Names are
//! unique across the registry; registration order fixes hook execution
//! order. Mutation must not overlap execution; the engine enforces this with
//! a reader/writer discipline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::core::ExecutionResult;
use crate::core::RuleId;
use crate::core::RuleResult;
use crate::core::RuleSetId;

// ============================================================================
// SECTION: Hook Contexts
// ============================================================================

/// Mutable context threaded through before/after-execute hooks.
///
/// # Invariants
/// - `input` replaced by a hook becomes the effective input for the rest of
///   the execution, including fingerprinting.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionContext {
    /// Identifier of the rule set being executed.
    pub rule_set_id: RuleSetId,
    /// Name of the rule set being executed.
    pub rule_set_name: String,
    /// Input fact object; hooks may rewrite it.
    pub input: Value,
    /// Engine metadata configured by the host.
    pub metadata: Value,
}

/// Mutable context threaded through before/after-rule hooks.
///
/// # Invariants
/// - `skip` set by a before-rule hook records the rule as not fired.
/// - `result` is populated before after-rule hooks run.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleContext {
    /// Identifier of the rule under evaluation.
    pub rule_id: RuleId,
    /// Name of the rule under evaluation.
    pub rule_name: String,
    /// Short-circuit flag set by before-rule hooks.
    pub skip: bool,
    /// Rule result, attached before after-rule hooks run.
    pub result: Option<RuleResult>,
}

/// Hook failure; propagates as a failure of the whole execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("hook failure: {0}")]
pub struct HookError(pub String);

impl HookError {
    /// Creates a hook error from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

// ============================================================================
// SECTION: Extension Point Signatures
// ============================================================================

/// Operator handler: `(field value, compare value) -> bool`.
///
/// The field value is `None` when the path did not resolve.
pub type OperatorFn = Arc<dyn Fn(Option<&Value>, &Value) -> bool + Send + Sync>;

/// Action handler: mutates the output at a field with a value.
pub type ActionFn = Arc<dyn Fn(&mut Value, &str, &Value) + Send + Sync>;

/// Named helper function exposed to hosts through the registry.
pub type PluginFunction = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Hook running before an execution; may rewrite the context.
pub type BeforeExecuteHook =
    Arc<dyn Fn(ExecutionContext) -> Result<ExecutionContext, HookError> + Send + Sync>;

/// Hook running after an execution; may substitute the result.
pub type AfterExecuteHook =
    Arc<dyn Fn(ExecutionResult) -> Result<ExecutionResult, HookError> + Send + Sync>;

/// Hook running before each rule; may set `skip`.
pub type BeforeRuleHook = Arc<dyn Fn(&mut RuleContext) -> Result<(), HookError> + Send + Sync>;

/// Hook running after each evaluated rule.
pub type AfterRuleHook = Arc<dyn Fn(&RuleContext) -> Result<(), HookError> + Send + Sync>;

/// Plugin lifecycle callback invoked on register and destroy.
pub type LifecycleFn = Arc<dyn Fn() -> Result<(), HookError> + Send + Sync>;

// ============================================================================
// SECTION: Plugins
// ============================================================================

/// A named bundle of operators, actions, functions, and hooks.
///
/// # Invariants
/// - `name` is unique within a registry.
/// - Contributed operator/action/function names are unique across plugins.
#[derive(Clone, Default)]
pub struct Plugin {
    /// Plugin name, the unregistration handle.
    pub name: String,
    /// Operator handlers keyed by operator name.
    pub operators: BTreeMap<String, OperatorFn>,
    /// Action handlers keyed by action kind name.
    pub actions: BTreeMap<String, ActionFn>,
    /// Helper functions keyed by function name.
    pub functions: BTreeMap<String, PluginFunction>,
    /// Hooks running before each execution.
    pub before_execute: Vec<BeforeExecuteHook>,
    /// Hooks running after each execution.
    pub after_execute: Vec<AfterExecuteHook>,
    /// Hooks running before each rule.
    pub before_rule: Vec<BeforeRuleHook>,
    /// Hooks running after each evaluated rule.
    pub after_rule: Vec<AfterRuleHook>,
    /// Callback invoked when the plugin is registered.
    pub on_register: Option<LifecycleFn>,
    /// Callback invoked at unregister or engine shutdown.
    pub on_destroy: Option<LifecycleFn>,
}

impl Plugin {
    /// Creates an empty plugin with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds an operator handler.
    #[must_use]
    pub fn with_operator(
        mut self,
        name: impl Into<String>,
        handler: impl Fn(Option<&Value>, &Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.operators.insert(name.into(), Arc::new(handler));
        self
    }

    /// Adds an action handler.
    #[must_use]
    pub fn with_action(
        mut self,
        name: impl Into<String>,
        handler: impl Fn(&mut Value, &str, &Value) + Send + Sync + 'static,
    ) -> Self {
        self.actions.insert(name.into(), Arc::new(handler));
        self
    }

    /// Adds a helper function.
    #[must_use]
    pub fn with_function(
        mut self,
        name: impl Into<String>,
        function: impl Fn(&[Value]) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.functions.insert(name.into(), Arc::new(function));
        self
    }

    /// Adds a before-execute hook.
    #[must_use]
    pub fn with_before_execute(
        mut self,
        hook: impl Fn(ExecutionContext) -> Result<ExecutionContext, HookError> + Send + Sync + 'static,
    ) -> Self {
        self.before_execute.push(Arc::new(hook));
        self
    }

    /// Adds an after-execute hook.
    #[must_use]
    pub fn with_after_execute(
        mut self,
        hook: impl Fn(ExecutionResult) -> Result<ExecutionResult, HookError> + Send + Sync + 'static,
    ) -> Self {
        self.after_execute.push(Arc::new(hook));
        self
    }

    /// Adds a before-rule hook.
    #[must_use]
    pub fn with_before_rule(
        mut self,
        hook: impl Fn(&mut RuleContext) -> Result<(), HookError> + Send + Sync + 'static,
    ) -> Self {
        self.before_rule.push(Arc::new(hook));
        self
    }

    /// Adds an after-rule hook.
    #[must_use]
    pub fn with_after_rule(
        mut self,
        hook: impl Fn(&RuleContext) -> Result<(), HookError> + Send + Sync + 'static,
    ) -> Self {
        self.after_rule.push(Arc::new(hook));
        self
    }

    /// Sets the register callback.
    #[must_use]
    pub fn with_on_register(
        mut self,
        callback: impl Fn() -> Result<(), HookError> + Send + Sync + 'static,
    ) -> Self {
        self.on_register = Some(Arc::new(callback));
        self
    }

    /// Sets the destroy callback.
    #[must_use]
    pub fn with_on_destroy(
        mut self,
        callback: impl Fn() -> Result<(), HookError> + Send + Sync + 'static,
    ) -> Self {
        self.on_destroy = Some(Arc::new(callback));
        self
    }
}

// ============================================================================
// SECTION: Registry Errors
// ============================================================================

/// Errors raised by registry mutation.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A plugin with the same name is already registered.
    #[error("plugin already registered: {0}")]
    DuplicatePlugin(String),
    /// An operator with the same name is already registered.
    #[error("operator already registered: {0}")]
    DuplicateOperator(String),
    /// An action handler with the same name is already registered.
    #[error("action already registered: {0}")]
    DuplicateAction(String),
    /// A function with the same name is already registered.
    #[error("function already registered: {0}")]
    DuplicateFunction(String),
    /// No plugin with the given name is registered.
    #[error("plugin not registered: {0}")]
    PluginNotFound(String),
    /// A plugin lifecycle callback failed.
    #[error("plugin lifecycle failure: {0}")]
    Lifecycle(String),
}

// ============================================================================
// SECTION: Registry View
// ============================================================================

/// Read-only snapshot of the registry's extension surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryView {
    /// Registered plugin names in registration order.
    pub plugins: Vec<String>,
    /// Operator names contributed by plugins.
    pub operators: Vec<String>,
    /// Action handler names contributed by plugins.
    pub actions: Vec<String>,
    /// Function names contributed by plugins.
    pub functions: Vec<String>,
}

// ============================================================================
// SECTION: Plugin Registry
// ============================================================================

/// Lookup table for plugin extension points.
///
/// # Invariants
/// - Plugin names and contributed entry names are unique.
/// - Hooks run in plugin registration order.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    /// Registered plugins in registration order.
    plugins: Vec<Plugin>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Registers a plugin, running its register callback.
    ///
    /// The plugin is not added when the callback fails.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] on duplicate names or callback failure.
    pub fn register(&mut self, plugin: Plugin) -> Result<(), RegistryError> {
        if self.plugins.iter().any(|existing| existing.name == plugin.name) {
            return Err(RegistryError::DuplicatePlugin(plugin.name));
        }
        for name in plugin.operators.keys() {
            if self.operator(name).is_some() {
                return Err(RegistryError::DuplicateOperator(name.clone()));
            }
        }
        for name in plugin.actions.keys() {
            if self.action(name).is_some() {
                return Err(RegistryError::DuplicateAction(name.clone()));
            }
        }
        for name in plugin.functions.keys() {
            if self.function(name).is_some() {
                return Err(RegistryError::DuplicateFunction(name.clone()));
            }
        }

        if let Some(callback) = &plugin.on_register {
            callback().map_err(|err| RegistryError::Lifecycle(err.0))?;
        }
        self.plugins.push(plugin);
        Ok(())
    }

    /// Unregisters a plugin by name, running its destroy callback.
    ///
    /// The plugin is removed even when the callback fails.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::PluginNotFound`] for unknown names and
    /// [`RegistryError::Lifecycle`] when the destroy callback fails.
    pub fn unregister(&mut self, name: &str) -> Result<(), RegistryError> {
        let Some(index) = self.plugins.iter().position(|plugin| plugin.name == name) else {
            return Err(RegistryError::PluginNotFound(name.to_string()));
        };
        let plugin = self.plugins.remove(index);
        if let Some(callback) = &plugin.on_destroy {
            callback().map_err(|err| RegistryError::Lifecycle(err.0))?;
        }
        Ok(())
    }

    /// Runs every destroy callback and clears the registry.
    ///
    /// All callbacks run; the first failure is reported.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Lifecycle`] when any destroy callback fails.
    pub fn destroy_all(&mut self) -> Result<(), RegistryError> {
        let mut first_failure = None;
        for plugin in self.plugins.drain(..) {
            if let Some(callback) = &plugin.on_destroy
                && let Err(err) = callback()
                && first_failure.is_none()
            {
                first_failure = Some(RegistryError::Lifecycle(err.0));
            }
        }
        first_failure.map_or(Ok(()), Err)
    }

    /// Returns the operator handler for a name, if any plugin contributes it.
    #[must_use]
    pub fn operator(&self, name: &str) -> Option<OperatorFn> {
        self.plugins.iter().find_map(|plugin| plugin.operators.get(name).cloned())
    }

    /// Returns the action handler for a name, if any plugin contributes it.
    #[must_use]
    pub fn action(&self, name: &str) -> Option<ActionFn> {
        self.plugins.iter().find_map(|plugin| plugin.actions.get(name).cloned())
    }

    /// Returns the function for a name, if any plugin contributes it.
    #[must_use]
    pub fn function(&self, name: &str) -> Option<PluginFunction> {
        self.plugins.iter().find_map(|plugin| plugin.functions.get(name).cloned())
    }

    /// Returns before-execute hooks in registration order.
    pub fn before_execute_hooks(&self) -> impl Iterator<Item = &BeforeExecuteHook> {
        self.plugins.iter().flat_map(|plugin| plugin.before_execute.iter())
    }

    /// Returns after-execute hooks in registration order.
    pub fn after_execute_hooks(&self) -> impl Iterator<Item = &AfterExecuteHook> {
        self.plugins.iter().flat_map(|plugin| plugin.after_execute.iter())
    }

    /// Returns before-rule hooks in registration order.
    pub fn before_rule_hooks(&self) -> impl Iterator<Item = &BeforeRuleHook> {
        self.plugins.iter().flat_map(|plugin| plugin.before_rule.iter())
    }

    /// Returns after-rule hooks in registration order.
    pub fn after_rule_hooks(&self) -> impl Iterator<Item = &AfterRuleHook> {
        self.plugins.iter().flat_map(|plugin| plugin.after_rule.iter())
    }

    /// Returns true when no plugins are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Returns a read-only snapshot of the extension surface.
    #[must_use]
    pub fn view(&self) -> RegistryView {
        let mut view = RegistryView::default();
        for plugin in &self.plugins {
            view.plugins.push(plugin.name.clone());
            view.operators.extend(plugin.operators.keys().cloned());
            view.actions.extend(plugin.actions.keys().cloned());
            view.functions.extend(plugin.functions.keys().cloned());
        }
        view
    }
}
