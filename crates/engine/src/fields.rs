//! Per-record-type field map
//!
//! [`StateFields`] collects the [`StateConfig`] of every state field of one
//! record type, in registration order, plus the options that apply to all
//! of them. It is filled once by [`HasStates::register_states`] and frozen
//! in the [`StateRegistry`](crate::StateRegistry) afterwards.
//!
//! [`HasStates::register_states`]: crate::HasStates::register_states

use crate::events::{Listeners, StateChanged};
use std::any::type_name;
use std::sync::Arc;
use stratastate_core::{Result, StateConfig, StateError, StateFamily, TransitionFactory};
use tracing::debug;

/// Every state field of record type `R`.
pub struct StateFields<R> {
    record: &'static str,
    configs: Vec<StateConfig<R>>,
    default_transition: TransitionFactory<R>,
    listeners: Listeners,
}

impl<R: 'static> StateFields<R> {
    /// Empty field map for `R`
    pub fn new() -> Self {
        Self {
            record: type_name::<R>(),
            configs: Vec::new(),
            default_transition: TransitionFactory::default_transition(),
            listeners: Listeners::default(),
        }
    }

    /// Record type name used in errors and logs
    pub fn record_type(&self) -> &'static str {
        self.record
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a state field governed by `family`.
    ///
    /// Fails with `DuplicateField` if the field is already registered, and
    /// with `DuplicateStateName` if two variants of the family share a name.
    pub fn add_state(&mut self, field: &str, family: StateFamily) -> Result<&mut StateConfig<R>> {
        if self.configs.iter().any(|c| c.field() == field) {
            return Err(StateError::DuplicateField {
                record: self.record.to_string(),
                field: field.to_string(),
            });
        }
        family.validate()?;

        debug!(
            record = self.record,
            field,
            family = family.name(),
            "registered state field"
        );
        self.configs.push(StateConfig::with_default_transition(
            field,
            family,
            self.default_transition.clone(),
        ));
        let last = self.configs.len() - 1;
        Ok(&mut self.configs[last])
    }

    /// Replace the transition used by `allow_default_transition*`.
    ///
    /// Applies to fields added after this call.
    pub fn use_default_transition(&mut self, factory: TransitionFactory<R>) -> &mut Self {
        self.default_transition = factory;
        self
    }

    /// Register a listener fired after every successful transition
    pub fn on_state_changed<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&StateChanged) + Send + Sync + 'static,
    {
        self.listeners.push(Arc::new(listener));
        self
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Config of `field`, if registered
    pub fn get(&self, field: &str) -> Option<&StateConfig<R>> {
        self.configs.iter().find(|c| c.field() == field)
    }

    /// Config of `field`, or `UnknownField`
    pub fn config(&self, field: &str) -> Result<&StateConfig<R>> {
        self.get(field).ok_or_else(|| StateError::UnknownField {
            record: self.record.to_string(),
            field: field.to_string(),
        })
    }

    /// Pick the field a request applies to.
    ///
    /// An explicit field must be registered. Without one, the record type
    /// must have exactly one state field.
    pub fn resolve_field(&self, field: Option<&str>) -> Result<&StateConfig<R>> {
        if let Some(field) = field {
            return self.config(field);
        }
        match self.configs.as_slice() {
            [] => Err(StateError::NoStateFields {
                record: self.record.to_string(),
            }),
            [only] => Ok(only),
            many => Err(StateError::AmbiguousField {
                record: self.record.to_string(),
                fields: many.iter().map(|c| c.field().to_string()).collect(),
            }),
        }
    }

    /// Field names, in registration order
    pub fn field_names(&self) -> Vec<&str> {
        self.configs.iter().map(StateConfig::field).collect()
    }

    /// Every config, in registration order
    pub fn iter(&self) -> impl Iterator<Item = &StateConfig<R>> {
        self.configs.iter()
    }

    /// Number of state fields
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// Check if no state field is registered
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Registered listeners
    pub fn listeners(&self) -> &Listeners {
        &self.listeners
    }
}

impl<R: 'static> Default for StateFields<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> std::fmt::Debug for StateFields<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateFields")
            .field("record", &self.record)
            .field("configs", &self.configs)
            .field("default_transition", &self.default_transition)
            .field("listeners", &self.listeners)
            .finish()
    }
}
