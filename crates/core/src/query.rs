//! State filtering predicates
//!
//! The state machine does not run queries. It turns "field is in one of
//! these states" into a [`StatePredicate`] over the stored column, which the
//! record layer translates into its own query language. `matches` evaluates
//! the same predicate against an in-memory record.

use crate::error::{Result, StateError};
use crate::record::{Attribute, Record};
use crate::state::{StateFamily, StateTarget};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusion or exclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredicateOp {
    /// `column IN (names)`
    In,
    /// `column NOT IN (names)`
    NotIn,
}

/// `column [NOT] IN (canonical names)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatePredicate {
    column: String,
    op: PredicateOp,
    names: Vec<String>,
}

impl StatePredicate {
    /// Build a predicate, resolving every target against `family`.
    ///
    /// Fails with `UnknownState` for targets naming no variant, and with
    /// `FieldDoesNotExtendState` for variants of another family. An empty
    /// target list fails with `NoTargetStates`, since `IN ()` is not valid
    /// in most query languages.
    pub fn build<I, T>(family: &StateFamily, column: &str, op: PredicateOp, targets: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<StateTarget>,
    {
        let mut names = Vec::new();
        for target in targets {
            let target = target.into();
            let class = family
                .resolve_target(&target)
                .ok_or_else(|| StateError::UnknownState {
                    family: family.name().to_string(),
                    value: target.to_string(),
                })?;
            if !family.contains(&class) {
                return Err(StateError::FieldDoesNotExtendState {
                    field: column.to_string(),
                    family: family.name().to_string(),
                    class: class.class().to_string(),
                });
            }
            let name = class.name().to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        if names.is_empty() {
            return Err(StateError::NoTargetStates {
                field: column.to_string(),
            });
        }
        Ok(Self {
            column: column.to_string(),
            op,
            names,
        })
    }

    /// Column (state field) the predicate applies to
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Inclusion or exclusion
    pub fn op(&self) -> PredicateOp {
        self.op
    }

    /// Check if this is an exclusion predicate
    pub fn is_negated(&self) -> bool {
        self.op == PredicateOp::NotIn
    }

    /// Canonical names, deduplicated, in the order given
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Evaluate against a record.
    ///
    /// Follows SQL semantics for unset columns: a null matches neither
    /// `IN` nor `NOT IN`.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        let stored = match record.get_attribute(&self.column) {
            Attribute::State(state) => state.name().to_string(),
            Attribute::Value(Value::String(s)) => s,
            Attribute::Value(Value::Null) => return false,
            Attribute::Value(other) => other.to_string(),
        };
        let found = self.names.iter().any(|n| *n == stored);
        match self.op {
            PredicateOp::In => found,
            PredicateOp::NotIn => !found,
        }
    }
}

impl fmt::Display for StatePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            PredicateOp::In => "IN",
            PredicateOp::NotIn => "NOT IN",
        };
        let names: Vec<String> = self
            .names
            .iter()
            .map(|n| format!("'{}'", n.replace('\'', "''")))
            .collect();
        write!(f, "{} {} ({})", self.column, op, names.join(", "))
    }
}
