//! Record abstraction
//!
//! The state machine never loads or saves records. It only reads and writes
//! attributes through [`Record`], at the lifecycle checkpoints the record
//! layer reports.
//!
//! [`Document`] is a ready-made in-memory record keyed by a UUID.

use crate::state::State;
use crate::value::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Content of one record attribute.
///
/// State fields move between the two forms: `Value` while unloaded (raw
/// stored name, or `Null` when unset) and `State` once materialized.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// Raw stored value
    Value(Value),
    /// Materialized state
    State(State),
}

impl Attribute {
    /// Unset attribute
    pub const NULL: Attribute = Attribute::Value(Value::Null);

    /// Check if the attribute is unset
    pub fn is_null(&self) -> bool {
        matches!(self, Attribute::Value(Value::Null))
    }

    /// Try to get as a materialized state
    pub fn as_state(&self) -> Option<&State> {
        match self {
            Attribute::State(state) => Some(state),
            Attribute::Value(_) => None,
        }
    }

    /// Try to get as a raw value
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Attribute::Value(value) => Some(value),
            Attribute::State(_) => None,
        }
    }

    /// The value the record layer would persist: a state becomes its
    /// canonical name.
    pub fn to_raw(&self) -> Value {
        match self {
            Attribute::Value(value) => value.clone(),
            Attribute::State(state) => Value::String(state.name().to_string()),
        }
    }
}

impl Default for Attribute {
    fn default() -> Self {
        Attribute::NULL
    }
}

impl From<Value> for Attribute {
    fn from(value: Value) -> Self {
        Attribute::Value(value)
    }
}

impl From<State> for Attribute {
    fn from(state: State) -> Self {
        Attribute::State(state)
    }
}

impl From<&str> for Attribute {
    fn from(raw: &str) -> Self {
        Attribute::Value(Value::from(raw))
    }
}

/// The slice of a persisted record the state machine needs.
pub trait Record {
    /// Stable identity of the record, if it has one.
    ///
    /// Bound states keep this key instead of a reference to the record.
    fn record_key(&self) -> Option<String> {
        None
    }

    /// Read an attribute. Missing attributes read as [`Attribute::NULL`].
    fn get_attribute(&self, field: &str) -> Attribute;

    /// Overwrite an attribute
    fn set_attribute(&mut self, field: &str, value: Attribute);
}

/// An in-memory record: a UUID key and an ordered attribute map.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    key: Uuid,
    attributes: BTreeMap<String, Attribute>,
}

impl Document {
    /// Create an empty document with a fresh key
    pub fn new() -> Self {
        Self::with_key(Uuid::new_v4())
    }

    /// Create an empty document with the given key
    pub fn with_key(key: Uuid) -> Self {
        Self {
            key,
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute assignment
    pub fn with(mut self, field: &str, value: impl Into<Attribute>) -> Self {
        self.attributes.insert(field.to_string(), value.into());
        self
    }

    /// Document key
    pub fn key(&self) -> Uuid {
        self.key
    }

    /// All attributes
    pub fn attributes(&self) -> &BTreeMap<String, Attribute> {
        &self.attributes
    }

    /// Raw form of every attribute, as it would be persisted
    pub fn to_raw(&self) -> BTreeMap<String, Value> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.to_raw()))
            .collect()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Record for Document {
    fn record_key(&self) -> Option<String> {
        Some(self.key.to_string())
    }

    fn get_attribute(&self, field: &str) -> Attribute {
        self.attributes.get(field).cloned().unwrap_or_default()
    }

    fn set_attribute(&mut self, field: &str, value: Attribute) {
        self.attributes.insert(field.to_string(), value);
    }
}
