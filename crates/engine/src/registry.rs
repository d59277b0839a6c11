//! Process-wide registry of state fields
//!
//! Each record type registers its fields once, on first use. The built
//! [`StateFields`] is frozen behind an `Arc` and shared by every later
//! lookup.
//!
//! ## Initialization
//!
//! The registration callback runs outside the lock. Two threads racing on
//! the first access may both build a table; the first insert wins and the
//! other thread adopts it. Registration is deterministic, so both tables
//! are equivalent. A failed registration caches nothing.

use crate::fields::StateFields;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::any::{type_name, Any, TypeId};
use std::sync::Arc;
use stratastate_core::{Result, StateError};
use tracing::debug;

type Entry = Arc<dyn Any + Send + Sync>;

static GLOBAL: Lazy<StateRegistry> = Lazy::new(StateRegistry::new);

/// Map from record type to its frozen [`StateFields`].
pub struct StateRegistry {
    tables: RwLock<FxHashMap<TypeId, Entry>>,
}

impl StateRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(FxHashMap::default()),
        }
    }

    /// The registry used by [`HasStates`](crate::HasStates)
    pub fn global() -> &'static StateRegistry {
        &GLOBAL
    }

    /// Fields of `R`, running `register` if `R` has not been seen yet.
    pub fn get_or_register<R, F>(&self, register: F) -> Result<Arc<StateFields<R>>>
    where
        R: 'static,
        F: FnOnce(&mut StateFields<R>) -> Result<()>,
    {
        let id = TypeId::of::<R>();
        if let Some(entry) = self.tables.read().get(&id) {
            return downcast(Arc::clone(entry));
        }

        let mut fields = StateFields::<R>::new();
        register(&mut fields)?;
        debug!(
            record = type_name::<R>(),
            fields = fields.len(),
            "state fields registered"
        );

        let fresh: Entry = Arc::new(fields);
        let entry = Arc::clone(self.tables.write().entry(id).or_insert(fresh));
        downcast(entry)
    }

    /// Fields of `R`, if already registered
    pub fn get<R: 'static>(&self) -> Option<Arc<StateFields<R>>> {
        let entry = self.tables.read().get(&TypeId::of::<R>()).cloned()?;
        downcast(entry).ok()
    }

    /// Check if `R` has been registered
    pub fn contains<R: 'static>(&self) -> bool {
        self.tables.read().contains_key(&TypeId::of::<R>())
    }

    /// Number of registered record types
    pub fn len(&self) -> usize {
        self.tables.read().len()
    }

    /// Check if no record type is registered
    pub fn is_empty(&self) -> bool {
        self.tables.read().is_empty()
    }
}

impl Default for StateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn downcast<R: 'static>(entry: Entry) -> Result<Arc<StateFields<R>>> {
    entry.downcast::<StateFields<R>>().map_err(|_| {
        StateError::Internal(format!(
            "registry entry for {} holds another type",
            type_name::<R>()
        ))
    })
}
