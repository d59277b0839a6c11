//! State model
//!
//! A state field is governed by one *family* (capability-set): a user enum
//! implementing [`StateSet`]. Each enum variant is one concrete state.
//!
//! ## Layers
//!
//! - [`StateSet`]: typed family, implemented by the record author
//! - [`StateClass`]: one variant with its type erased (family, class identifier, canonical name)
//! - [`StateFamily`]: the erased family, used for resolution against raw values
//! - [`State`]: a variant bound to a field of one record
//!
//! ## Names
//!
//! Every variant has exactly one canonical name (what gets stored) and one
//! class identifier (`"<type path>::<Variant>"`). Resolution accepts either,
//! and `resolve_name(resolve_variant(n)) == n` holds for every canonical name.
//!
//! Resolution only looks at the family's own variants. A name or class
//! identifier of another family is an unknown state; a [`StateClass`] or
//! [`State`] of another family resolves, and the facade rejects it because
//! the family does not contain it.

use crate::error::{Result, StateError};
use crate::record::Attribute;
use crate::value::Value;
use rustc_hash::FxHashSet;
use std::any::type_name;
use std::fmt;
use std::sync::Arc;

/// A closed set of states for one kind of field.
///
/// # Example
///
/// ```
/// use stratastate_core::StateSet;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum PostState {
///     Draft,
///     Published,
/// }
///
/// impl StateSet for PostState {
///     fn all() -> &'static [Self] {
///         &[PostState::Draft, PostState::Published]
///     }
///
///     fn name(&self) -> &'static str {
///         match self {
///             PostState::Draft => "draft",
///             PostState::Published => "published",
///         }
///     }
/// }
///
/// assert_eq!(PostState::Published.name(), "published");
/// ```
pub trait StateSet: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Every variant, in a stable order
    fn all() -> &'static [Self];

    /// Canonical name, as stored in the record
    fn name(&self) -> &'static str;

    /// Class identifier of this variant
    fn class(&self) -> String {
        format!("{}::{:?}", type_name::<Self>(), self)
    }
}

/// One concrete variant of a family, type-erased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateClass {
    family: &'static str,
    class: Arc<str>,
    name: &'static str,
}

impl StateClass {
    /// Erase a typed variant
    pub fn of<S: StateSet>(state: S) -> Self {
        Self {
            family: type_name::<S>(),
            class: Arc::from(state.class()),
            name: state.name(),
        }
    }

    /// Family type name
    pub fn family(&self) -> &'static str {
        self.family
    }

    /// Class identifier
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Canonical name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Check whether this is the given typed variant
    pub fn is<S: StateSet>(&self, state: S) -> bool {
        self.family == type_name::<S>() && self.name == state.name()
    }

    /// Recover the typed variant, if this class belongs to `S`
    pub fn to<S: StateSet>(&self) -> Option<S> {
        if self.family != type_name::<S>() {
            return None;
        }
        S::all().iter().copied().find(|s| s.name() == self.name)
    }
}

impl fmt::Display for StateClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The erased capability-set governing one state field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateFamily {
    name: &'static str,
    variants: Arc<[StateClass]>,
}

impl StateFamily {
    /// Build the family of `S`
    pub fn of<S: StateSet>() -> Self {
        let variants: Vec<StateClass> = S::all().iter().map(|s| StateClass::of(*s)).collect();
        Self {
            name: type_name::<S>(),
            variants: variants.into(),
        }
    }

    /// Family type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Every variant of the family, in declaration order.
    ///
    /// Introspection only; nothing in the state machine depends on the order.
    pub fn all_variants(&self) -> &[StateClass] {
        &self.variants
    }

    /// Canonical names of every variant
    pub fn names(&self) -> Vec<&'static str> {
        self.variants.iter().map(StateClass::name).collect()
    }

    /// Check membership
    pub fn contains(&self, class: &StateClass) -> bool {
        class.family == self.name && self.variants.iter().any(|v| v == class)
    }

    /// Check that names and class identifiers are unique within the family.
    pub fn validate(&self) -> Result<()> {
        let mut seen = FxHashSet::default();
        for variant in self.variants.iter() {
            if !seen.insert(variant.name) {
                return Err(StateError::DuplicateStateName {
                    family: self.name.to_string(),
                    name: variant.name.to_string(),
                });
            }
        }
        let mut seen = FxHashSet::default();
        for variant in self.variants.iter() {
            if !seen.insert(variant.class()) {
                return Err(StateError::DuplicateStateName {
                    family: self.name.to_string(),
                    name: variant.class().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Resolve a string: own canonical names first, then own class identifiers.
    pub fn resolve_str(&self, raw: &str) -> Option<StateClass> {
        self.variants
            .iter()
            .find(|v| v.name == raw)
            .or_else(|| self.variants.iter().find(|v| v.class() == raw))
            .cloned()
    }

    /// Resolve a raw stored value to a concrete variant.
    ///
    /// Only string values name states; everything else resolves to `None`.
    pub fn resolve_variant(&self, raw: &Value) -> Option<StateClass> {
        raw.as_str().and_then(|s| self.resolve_str(s))
    }

    /// Resolve an attribute, whether raw or already materialized.
    pub fn resolve_attribute(&self, attribute: &Attribute) -> Option<StateClass> {
        match attribute {
            Attribute::State(state) => Some(state.class().clone()),
            Attribute::Value(value) => self.resolve_variant(value),
        }
    }

    /// Resolve anything that names a state.
    pub fn resolve_target(&self, target: &StateTarget) -> Option<StateClass> {
        match target {
            StateTarget::Class(class) => Some(class.clone()),
            StateTarget::Name(name) => self.resolve_str(name),
        }
    }

    /// Canonical name of a raw value or state instance.
    pub fn resolve_name(&self, attribute: &Attribute) -> Option<&'static str> {
        self.resolve_attribute(attribute).map(|c| c.name)
    }
}

/// A state bound to a field of one record.
///
/// The state keeps only the record's key, never the record itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    class: StateClass,
    field: String,
    record_key: Option<String>,
}

impl State {
    /// Bind a variant to a field
    pub fn new(class: StateClass, field: impl Into<String>, record_key: Option<String>) -> Self {
        Self {
            class,
            field: field.into(),
            record_key,
        }
    }

    /// The concrete variant
    pub fn class(&self) -> &StateClass {
        &self.class
    }

    /// Canonical name
    pub fn name(&self) -> &'static str {
        self.class.name
    }

    /// Field this state lives in
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Key of the owning record, if it has one
    pub fn record_key(&self) -> Option<&str> {
        self.record_key.as_deref()
    }

    /// Check whether this is the given typed variant
    pub fn is<S: StateSet>(&self, state: S) -> bool {
        self.class.is(state)
    }

    /// Recover the typed variant
    pub fn to<S: StateSet>(&self) -> Option<S> {
        self.class.to()
    }

    /// Same variant, regardless of field or record
    pub fn equals(&self, other: impl Into<StateTarget>) -> bool {
        match other.into() {
            StateTarget::Class(class) => class == self.class,
            StateTarget::Name(name) => name == self.class.name || name == self.class.class(),
        }
    }

    /// The successor state for the same field and record.
    pub fn transition_to<S: StateSet>(&self, state: S) -> State {
        self.with_class(StateClass::of(state))
    }

    /// The successor state for the same field and record, erased form.
    pub fn with_class(&self, class: StateClass) -> State {
        State {
            class,
            field: self.field.clone(),
            record_key: self.record_key.clone(),
        }
    }

    /// Rebind to another field or record
    pub fn rebind(self, field: impl Into<String>, record_key: Option<String>) -> State {
        State {
            class: self.class,
            field: field.into(),
            record_key,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class.name)
    }
}

/// Anything that names a state: canonical name, class identifier, erased
/// class, bound state, or typed variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateTarget {
    /// A canonical name or class identifier, resolved against the field's family
    Name(String),
    /// An already-resolved variant
    Class(StateClass),
}

impl fmt::Display for StateTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateTarget::Name(name) => f.write_str(name),
            StateTarget::Class(class) => f.write_str(class.name),
        }
    }
}

impl From<&str> for StateTarget {
    fn from(name: &str) -> Self {
        StateTarget::Name(name.to_string())
    }
}

impl From<String> for StateTarget {
    fn from(name: String) -> Self {
        StateTarget::Name(name)
    }
}

impl From<&String> for StateTarget {
    fn from(name: &String) -> Self {
        StateTarget::Name(name.clone())
    }
}

impl From<StateClass> for StateTarget {
    fn from(class: StateClass) -> Self {
        StateTarget::Class(class)
    }
}

impl From<&StateClass> for StateTarget {
    fn from(class: &StateClass) -> Self {
        StateTarget::Class(class.clone())
    }
}

impl From<State> for StateTarget {
    fn from(state: State) -> Self {
        StateTarget::Class(state.class)
    }
}

impl From<&State> for StateTarget {
    fn from(state: &State) -> Self {
        StateTarget::Class(state.class.clone())
    }
}

impl<S: StateSet> From<S> for StateTarget {
    fn from(state: S) -> Self {
        StateTarget::Class(StateClass::of(state))
    }
}
