//! Public types for the stratastate API.
//!
//! This module re-exports types from internal crates with a clean public interface.

// Raw values
pub use stratastate_core::Value;

// State model
pub use stratastate_core::{State, StateClass, StateFamily, StateSet, StateTarget};

// Records
pub use stratastate_core::{Attribute, Document, Record};

// Transitions
pub use stratastate_core::{DefaultTransition, Transition, TransitionContext, TransitionFactory};

// Per-field configuration
pub use stratastate_core::{FromState, StateConfig, TransitionDescriptor};

// Query predicates
pub use stratastate_core::{PredicateOp, StatePredicate};

// Lifecycle and notifications
pub use stratastate_engine::{LifecycleEvent, Listeners, Phase, StateChanged, StateListener};

/// Convert a raw JSON column into a [`Value`].
///
/// Record layers that store attributes as JSON hand them over through this.
pub fn value_from_json(json: serde_json::Value) -> Value {
    Value::from(json)
}
