//! The state machine facade
//!
//! A record type opts in by implementing [`HasStates`]: it declares its state
//! fields once in [`HasStates::register_states`] and gets transitions,
//! lifecycle hooks, query predicates and introspection from the provided
//! methods.
//!
//! ## Per-field states
//!
//! Each state field of a record instance is either *Unloaded* (the attribute
//! holds a raw [`Value`], `Null` when unset) or *Loaded* (it holds a
//! [`State`]). Deserialization moves it to Loaded, serialization back to
//! Unloaded, and a transition always leaves it Loaded.
//!
//! ## Transition protocol
//!
//! 1. resolve the field (explicit, or the only one registered)
//! 2. read the current state, materializing a raw value or the default
//! 3. resolve the target within the field's family
//! 4. look up the descriptor: exact `(from, to)`, then `(*, to)`
//! 5. build the transition, check `can_transition`, run `handle`
//! 6. write the new state onto the record, then notify listeners
//!
//! Any failure before step 6 leaves the record's state field untouched.
//! The record is never persisted here.
//!
//! # Example
//!
//! ```
//! use stratastate_core::{Attribute, Record, Result, StateFamily, StateSet};
//! use stratastate_engine::{HasStates, StateFields};
//! use std::collections::BTreeMap;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum PostState {
//!     Draft,
//!     Published,
//! }
//!
//! impl StateSet for PostState {
//!     fn all() -> &'static [Self] {
//!         &[PostState::Draft, PostState::Published]
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         match self {
//!             PostState::Draft => "draft",
//!             PostState::Published => "published",
//!         }
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Post {
//!     attributes: BTreeMap<String, Attribute>,
//! }
//!
//! impl Record for Post {
//!     fn get_attribute(&self, field: &str) -> Attribute {
//!         self.attributes.get(field).cloned().unwrap_or_default()
//!     }
//!
//!     fn set_attribute(&mut self, field: &str, value: Attribute) {
//!         self.attributes.insert(field.to_string(), value);
//!     }
//! }
//!
//! impl HasStates for Post {
//!     fn register_states(fields: &mut StateFields<Self>) -> Result<()> {
//!         fields
//!             .add_state("status", StateFamily::of::<PostState>())?
//!             .default(PostState::Draft)?
//!             .allow_default_transition(PostState::Draft, PostState::Published)?;
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let mut post = Post::default();
//! post.initialize_states()?;
//! let state = post.transition_to(PostState::Published)?;
//! assert!(state.is(PostState::Published));
//! assert!(post.transition_to(PostState::Draft).unwrap_err().is_transition_not_found());
//! # Ok(())
//! # }
//! ```

use crate::events::StateChanged;
use crate::fields::StateFields;
use crate::lifecycle::{LifecycleEvent, Phase};
use crate::registry::StateRegistry;
use std::collections::BTreeMap;
use std::sync::Arc;
use stratastate_core::{
    Attribute, PredicateOp, Record, Result, State, StateClass, StateConfig, StateError,
    StatePredicate, StateTarget, TransitionContext, Value,
};
use tracing::{debug, info, warn};

/// A record type with state fields.
pub trait HasStates: Record + Sized + 'static {
    /// Declare the state fields of this record type.
    ///
    /// Called once per process, on first use of the type.
    fn register_states(fields: &mut StateFields<Self>) -> Result<()>;

    /// The frozen field map of this record type, registering it if needed
    fn state_fields() -> Result<Arc<StateFields<Self>>> {
        StateRegistry::global().get_or_register::<Self, _>(Self::register_states)
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Canonical names of every variant, per field
    fn get_states() -> Result<BTreeMap<String, Vec<&'static str>>> {
        let fields = Self::state_fields()?;
        let states = fields
            .iter()
            .map(|c| (c.field().to_string(), c.family().names()))
            .collect();
        Ok(states)
    }

    /// Canonical names of every variant of one field
    fn get_states_for(field: &str) -> Result<Vec<&'static str>> {
        let fields = Self::state_fields()?;
        Ok(fields.config(field)?.family().names())
    }

    /// Default canonical name per field, `None` where no default is set
    fn get_default_states() -> Result<BTreeMap<String, Option<&'static str>>> {
        let fields = Self::state_fields()?;
        let defaults = fields
            .iter()
            .map(|c| (c.field().to_string(), c.default_state().map(StateClass::name)))
            .collect();
        Ok(defaults)
    }

    /// Default canonical name of one field
    fn get_default_state_for(field: &str) -> Result<Option<&'static str>> {
        let fields = Self::state_fields()?;
        Ok(fields.config(field)?.default_state().map(StateClass::name))
    }

    /// Current state of a field.
    ///
    /// Raw values are resolved without being written back. An unset field
    /// reads as its default, as it would when transitioning. Returns `None`
    /// for an unset field without a default, or a value that names no
    /// state of the field.
    fn state(&self, field: &str) -> Result<Option<State>> {
        let fields = Self::state_fields()?;
        let config = fields.config(field)?;
        let attribute = self.get_attribute(field);
        let class = if attribute.is_null() {
            config.default_state().cloned()
        } else {
            config
                .family()
                .resolve_attribute(&attribute)
                .filter(|class| config.family().contains(class))
        };
        Ok(class.map(|class| State::new(class, field, self.record_key())))
    }

    /// Targets reachable from the field's current state
    fn transitionable_states(&self, field: Option<&str>) -> Result<Vec<&'static str>> {
        let fields = Self::state_fields()?;
        let config = fields.resolve_field(field)?;
        let from = current_state(self, &fields, config)?;
        Ok(config.transitionable_states(from.class()))
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Materialize defaults on a new record. Fields already set are left alone.
    fn initialize_states(&mut self) -> Result<()> {
        let fields = Self::state_fields()?;
        let key = self.record_key();
        for config in fields.iter() {
            if !self.get_attribute(config.field()).is_null() {
                continue;
            }
            if let Some(default) = config.default_state() {
                let state = State::new(default.clone(), config.field(), key.clone());
                self.set_attribute(config.field(), Attribute::State(state));
            }
        }
        Ok(())
    }

    /// Replace every state field with its canonical name.
    ///
    /// Unset fields take their default's name, or stay null without one.
    /// Values that resolve to no variant, or to a variant outside the
    /// field's family, fail the whole call before anything is written.
    fn serialize_states(&mut self) -> Result<()> {
        let fields = Self::state_fields()?;
        let mut pending = Vec::with_capacity(fields.len());
        for config in fields.iter() {
            if let Some(name) = serialized_name(self, config)? {
                pending.push((config.field(), name));
            }
        }
        for (field, name) in pending {
            self.set_attribute(field, Attribute::Value(Value::from(name)));
        }
        Ok(())
    }

    /// Replace every state field with a [`State`] bound to this record.
    ///
    /// Values that do not resolve to a variant of the field's family fall
    /// back to the default, or to null without one. Already materialized
    /// states are rebound to an equivalent instance.
    fn deserialize_states(&mut self) -> Result<()> {
        let fields = Self::state_fields()?;
        let key = self.record_key();
        for config in fields.iter() {
            let field = config.field();
            let attribute = self.get_attribute(field);
            let class = match config.family().resolve_attribute(&attribute) {
                Some(class) if config.family().contains(&class) => Some(class),
                _ => {
                    if !attribute.is_null() {
                        warn!(
                            record = fields.record_type(),
                            field,
                            value = %attribute.to_raw(),
                            default = ?config.default_state().map(StateClass::name),
                            "unresolvable state value, falling back to default"
                        );
                    }
                    config.default_state().cloned()
                }
            };
            let loaded = match class {
                Some(class) => Attribute::State(State::new(class, field, key.clone())),
                None => Attribute::NULL,
            };
            self.set_attribute(field, loaded);
        }
        Ok(())
    }

    /// Run the state handling the record layer's `event` calls for
    fn handle_lifecycle(&mut self, event: LifecycleEvent) -> Result<()> {
        match event.phase() {
            Phase::Deserialize => self.deserialize_states(),
            Phase::Serialize => self.serialize_states(),
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Transition the only state field to `target`
    fn transition_to(&mut self, target: impl Into<StateTarget>) -> Result<State> {
        self.transition(None, target, Vec::new())
    }

    /// Transition `field` to `target`
    fn transition_field_to(&mut self, field: &str, target: impl Into<StateTarget>) -> Result<State> {
        self.transition(Some(field), target, Vec::new())
    }

    /// Transition a field to `target`, forwarding `args` to the transition.
    ///
    /// Without a field, the record type must have exactly one state field.
    fn transition(
        &mut self,
        field: Option<&str>,
        target: impl Into<StateTarget>,
        args: Vec<Value>,
    ) -> Result<State> {
        let fields = Self::state_fields()?;
        let config = fields.resolve_field(field)?;
        let field = config.field();
        let from = current_state(self, &fields, config)?;
        let to = target_class(config, target.into())?;

        let descriptor = config
            .resolve_transition(self, from.class(), &to)
            .ok_or_else(|| StateError::TransitionNotFound {
                field: field.to_string(),
                from: from.name().to_string(),
                to: to.name().to_string(),
            })?;
        let factory = descriptor.factory();

        let transition = factory.build(TransitionContext {
            from: from.clone(),
            to: to.clone(),
            args,
        });
        if !transition.can_transition(self) {
            debug!(
                record = fields.record_type(),
                field,
                from = from.name(),
                to = to.name(),
                transition = factory.name(),
                "transition refused by precondition"
            );
            return Err(StateError::TransitionNotAllowed {
                field: field.to_string(),
                from: from.name().to_string(),
                to: to.name().to_string(),
                transition: factory.name().to_string(),
            });
        }

        let state = transition.handle(self)?.rebind(field, self.record_key());
        self.set_attribute(field, Attribute::State(state.clone()));

        info!(
            record = fields.record_type(),
            field,
            from = from.name(),
            to = state.name(),
            transition = factory.name(),
            "state transitioned"
        );
        fields.listeners().emit(&StateChanged {
            record_type: fields.record_type(),
            record_key: self.record_key(),
            field: field.to_string(),
            from: from.class().clone(),
            to: state.clone(),
            transition: factory.name(),
        });
        Ok(state)
    }

    /// Check whether a transition to `target` would be found and accepted.
    ///
    /// Nothing is executed. Field and target resolution errors are returned
    /// as errors; a missing descriptor or a refusing precondition is `false`.
    fn can_transition_to(&self, target: impl Into<StateTarget>, field: Option<&str>) -> Result<bool> {
        let fields = Self::state_fields()?;
        let config = fields.resolve_field(field)?;
        let from = current_state(self, &fields, config)?;
        let to = target_class(config, target.into())?;

        let Some(descriptor) = config.resolve_transition(self, from.class(), &to) else {
            return Ok(false);
        };
        let transition = descriptor.factory().build(TransitionContext {
            from,
            to,
            args: Vec::new(),
        });
        Ok(transition.can_transition(self))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Predicate selecting records whose `field` is in one of `targets`
    fn where_state<I, T>(field: &str, targets: I) -> Result<StatePredicate>
    where
        I: IntoIterator<Item = T>,
        T: Into<StateTarget>,
    {
        let fields = Self::state_fields()?;
        let config = fields.config(field)?;
        StatePredicate::build(config.family(), field, PredicateOp::In, targets)
    }

    /// Predicate selecting records whose `field` is in none of `targets`
    fn where_not_state<I, T>(field: &str, targets: I) -> Result<StatePredicate>
    where
        I: IntoIterator<Item = T>,
        T: Into<StateTarget>,
    {
        let fields = Self::state_fields()?;
        let config = fields.config(field)?;
        StatePredicate::build(config.family(), field, PredicateOp::NotIn, targets)
    }
}

/// The field's current state; an unset field falls back to its default.
fn current_state<R: HasStates>(
    record: &R,
    fields: &StateFields<R>,
    config: &StateConfig<R>,
) -> Result<State> {
    let attribute = record.get_attribute(config.field());
    let class = if attribute.is_null() {
        config
            .default_state()
            .cloned()
            .ok_or_else(|| StateError::UninitializedState {
                record: fields.record_type().to_string(),
                field: config.field().to_string(),
            })?
    } else {
        let resolved = config.family().resolve_attribute(&attribute);
        member(config, resolved, || raw_text(&attribute))?
    };
    Ok(State::new(class, config.field(), record.record_key()))
}

fn target_class<R: 'static>(config: &StateConfig<R>, target: StateTarget) -> Result<StateClass> {
    let resolved = config.family().resolve_target(&target);
    member(config, resolved, || target.to_string())
}

/// Require a resolved variant of the field's own family.
fn member<R: 'static>(
    config: &StateConfig<R>,
    resolved: Option<StateClass>,
    rendered: impl FnOnce() -> String,
) -> Result<StateClass> {
    let class = resolved.ok_or_else(|| StateError::UnknownState {
        family: config.family().name().to_string(),
        value: rendered(),
    })?;
    if !config.family().contains(&class) {
        return Err(StateError::FieldDoesNotExtendState {
            field: config.field().to_string(),
            family: config.family().name().to_string(),
            class: class.class().to_string(),
        });
    }
    Ok(class)
}

/// Stored value as shown in errors: strings bare, anything else rendered.
fn raw_text(attribute: &Attribute) -> String {
    let raw = attribute.to_raw();
    match raw.as_str() {
        Some(s) => s.to_string(),
        None => raw.to_string(),
    }
}

/// Canonical name a field serializes to, `None` to leave it null.
fn serialized_name<R: HasStates>(record: &R, config: &StateConfig<R>) -> Result<Option<&'static str>> {
    let attribute = record.get_attribute(config.field());
    if attribute.is_null() {
        return Ok(config.default_state().map(StateClass::name));
    }
    let resolved = config.family().resolve_attribute(&attribute);
    let class = member(config, resolved, || raw_text(&attribute))?;
    Ok(Some(class.name()))
}
