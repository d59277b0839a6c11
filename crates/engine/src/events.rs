//! State change notifications
//!
//! Listeners registered through
//! [`StateFields::on_state_changed`](crate::StateFields::on_state_changed)
//! receive a [`StateChanged`] after a transition's new state has been
//! written to the record. Listeners run synchronously, in registration
//! order, and cannot fail the transition.

use std::fmt;
use std::sync::Arc;
use stratastate_core::{State, StateClass};

/// A completed transition.
#[derive(Debug, Clone, PartialEq)]
pub struct StateChanged {
    /// Record type name
    pub record_type: &'static str,
    /// Key of the record, if it has one
    pub record_key: Option<String>,
    /// State field that changed
    pub field: String,
    /// Variant before the transition
    pub from: StateClass,
    /// State written to the record
    pub to: State,
    /// Transition type that ran
    pub transition: &'static str,
}

impl fmt::Display for StateChanged {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}: {} -> {} ({})",
            self.record_type, self.field, self.from, self.to, self.transition
        )
    }
}

/// Callback invoked with every [`StateChanged`].
pub type StateListener = Arc<dyn Fn(&StateChanged) + Send + Sync>;

/// Ordered list of listeners for one record type.
#[derive(Clone, Default)]
pub struct Listeners {
    listeners: Vec<StateListener>,
}

impl Listeners {
    /// Add a listener at the end
    pub fn push(&mut self, listener: StateListener) {
        self.listeners.push(listener);
    }

    /// Number of listeners
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Check if there are no listeners
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver an event to every listener, in registration order
    pub fn emit(&self, event: &StateChanged) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}
