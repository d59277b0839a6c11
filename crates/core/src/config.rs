//! Per-field state configuration
//!
//! One [`StateConfig`] exists per (record type, field). It binds the field
//! to a [`StateFamily`], an optional default variant and the declared
//! transitions.
//!
//! ## Resolution
//!
//! For a request `from -> to`:
//!
//! 1. exact descriptor `(from, to)`, if registered
//! 2. otherwise any-from descriptor `(*, to)`, if registered
//! 3. otherwise nothing
//!
//! At most one descriptor exists per `(from, to)` key; registering the same
//! key twice is a configuration error.

use crate::error::{Result, StateError};
use crate::state::{StateClass, StateFamily, StateSet};
use crate::transition::{Transition, TransitionContext, TransitionFactory};
use rustc_hash::FxHashMap;
use std::fmt;

/// Source side of a transition descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FromState {
    /// Matches any current variant
    Any,
    /// Matches one variant
    Exact(StateClass),
}

impl fmt::Display for FromState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FromState::Any => f.write_str("*"),
            FromState::Exact(class) => write!(f, "{}", class),
        }
    }
}

/// A registered `from -> to` pair and the factory that handles it.
pub struct TransitionDescriptor<R> {
    from: FromState,
    to: StateClass,
    factory: TransitionFactory<R>,
}

impl<R> TransitionDescriptor<R> {
    /// Source side
    pub fn from(&self) -> &FromState {
        &self.from
    }

    /// Target variant
    pub fn to(&self) -> &StateClass {
        &self.to
    }

    /// Factory building the transition
    pub fn factory(&self) -> &TransitionFactory<R> {
        &self.factory
    }

    /// Check if this descriptor matches any source variant
    pub fn is_any_from(&self) -> bool {
        matches!(self.from, FromState::Any)
    }
}

/// State configuration of one field of record type `R`.
pub struct StateConfig<R> {
    field: String,
    family: StateFamily,
    default: Option<StateClass>,
    descriptors: Vec<TransitionDescriptor<R>>,
    index: FxHashMap<(FromState, StateClass), usize>,
    default_transition: TransitionFactory<R>,
}

impl<R> fmt::Debug for TransitionDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionDescriptor")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("transition", &self.factory.name())
            .finish()
    }
}

impl<R> fmt::Debug for StateConfig<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateConfig")
            .field("field", &self.field)
            .field("family", &self.family.name())
            .field("default", &self.default)
            .field("descriptors", &self.descriptors)
            .finish()
    }
}

impl<R: 'static> StateConfig<R> {
    /// Create a config using [`DefaultTransition`](crate::transition::DefaultTransition)
    /// for transitions registered without a transition type.
    pub fn new(field: impl Into<String>, family: StateFamily) -> Self {
        Self::with_default_transition(field, family, TransitionFactory::default_transition())
    }

    /// Create a config with a custom default transition
    pub fn with_default_transition(
        field: impl Into<String>,
        family: StateFamily,
        default_transition: TransitionFactory<R>,
    ) -> Self {
        Self {
            field: field.into(),
            family,
            default: None,
            descriptors: Vec::new(),
            index: FxHashMap::default(),
            default_transition,
        }
    }

    /// Field name
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Family governing the field
    pub fn family(&self) -> &StateFamily {
        &self.family
    }

    /// Default variant, if configured
    pub fn default_state(&self) -> Option<&StateClass> {
        self.default.as_ref()
    }

    /// Registered descriptors, in registration order
    pub fn descriptors(&self) -> &[TransitionDescriptor<R>] {
        &self.descriptors
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Set the default variant for records with no stored value
    pub fn default<S: StateSet>(&mut self, state: S) -> Result<&mut Self> {
        self.default = Some(self.member(state)?);
        Ok(self)
    }

    /// Allow `from -> to`, handled by the transition `constructor` builds
    pub fn allow_transition<S, F, T>(&mut self, from: S, to: S, constructor: F) -> Result<&mut Self>
    where
        S: StateSet,
        F: Fn(TransitionContext) -> T + Send + Sync + 'static,
        T: Transition<R> + 'static,
    {
        let from = FromState::Exact(self.member(from)?);
        let to = self.member(to)?;
        self.insert(from, to, TransitionFactory::new(constructor))?;
        Ok(self)
    }

    /// Allow `from -> to` with the default transition
    pub fn allow_default_transition<S: StateSet>(&mut self, from: S, to: S) -> Result<&mut Self> {
        let from = FromState::Exact(self.member(from)?);
        let to = self.member(to)?;
        let factory = self.default_transition.clone();
        self.insert(from, to, factory)?;
        Ok(self)
    }

    /// Allow every source in `from` to move to `to`, sharing one constructor
    pub fn allow_transitions_from<S, F, T>(
        &mut self,
        from: &[S],
        to: S,
        constructor: F,
    ) -> Result<&mut Self>
    where
        S: StateSet,
        F: Fn(TransitionContext) -> T + Send + Sync + 'static,
        T: Transition<R> + 'static,
    {
        let to = self.member(to)?;
        let factory = TransitionFactory::new(constructor);
        for source in from {
            let source = FromState::Exact(self.member(*source)?);
            self.insert(source, to.clone(), factory.clone())?;
        }
        Ok(self)
    }

    /// Allow any current state to move to `to`. Used only when no exact
    /// descriptor matches.
    pub fn allow_transition_from_any<S, F, T>(&mut self, to: S, constructor: F) -> Result<&mut Self>
    where
        S: StateSet,
        F: Fn(TransitionContext) -> T + Send + Sync + 'static,
        T: Transition<R> + 'static,
    {
        let to = self.member(to)?;
        self.insert(FromState::Any, to, TransitionFactory::new(constructor))?;
        Ok(self)
    }

    /// Allow any current state to move to `to` with the default transition
    pub fn allow_default_transition_from_any<S: StateSet>(&mut self, to: S) -> Result<&mut Self> {
        let to = self.member(to)?;
        let factory = self.default_transition.clone();
        self.insert(FromState::Any, to, factory)?;
        Ok(self)
    }

    fn member<S: StateSet>(&self, state: S) -> Result<StateClass> {
        let class = StateClass::of(state);
        if self.family.contains(&class) {
            Ok(class)
        } else {
            Err(StateError::FieldDoesNotExtendState {
                field: self.field.clone(),
                family: self.family.name().to_string(),
                class: class.class().to_string(),
            })
        }
    }

    fn insert(&mut self, from: FromState, to: StateClass, factory: TransitionFactory<R>) -> Result<()> {
        let key = (from.clone(), to.clone());
        if self.index.contains_key(&key) {
            return Err(StateError::DuplicateTransition {
                field: self.field.clone(),
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        self.index.insert(key, self.descriptors.len());
        self.descriptors.push(TransitionDescriptor { from, to, factory });
        Ok(())
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Find the descriptor handling `from -> to`: exact first, then any-from.
    ///
    /// The record is not consulted here; it is part of the signature so a
    /// wrapping resolver can make the lookup depend on it.
    pub fn resolve_transition(
        &self,
        _record: &R,
        from: &StateClass,
        to: &StateClass,
    ) -> Option<&TransitionDescriptor<R>> {
        let exact = (FromState::Exact(from.clone()), to.clone());
        self.index
            .get(&exact)
            .or_else(|| self.index.get(&(FromState::Any, to.clone())))
            .and_then(|&i| self.descriptors.get(i))
    }

    /// Canonical names reachable from `from`, in registration order
    pub fn transitionable_states(&self, from: &StateClass) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Vec::new();
        for descriptor in &self.descriptors {
            let matches = match &descriptor.from {
                FromState::Any => true,
                FromState::Exact(class) => class == from,
            };
            if matches && !names.contains(&descriptor.to.name()) {
                names.push(descriptor.to.name());
            }
        }
        names
    }
}
