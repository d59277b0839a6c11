//! Convenient imports for stratastate.
//!
//! This module re-exports the most commonly used types so you can declare
//! a state machine with a single import:
//!
//! ```ignore
//! use stratastate::prelude::*;
//!
//! let mut post = Post::default();
//! post.initialize_states()?;
//! post.transition_to(PostState::Published)?;
//! ```

// Facade
pub use crate::{HasStates, StateFields};

// Error handling
pub use crate::{Result, StateError};

// State model
pub use crate::types::{State, StateClass, StateFamily, StateSet, StateTarget};

// Records
pub use crate::types::{Attribute, Document, Record, Value};

// Transitions
pub use crate::types::{Transition, TransitionContext, TransitionFactory};

// Lifecycle and queries
pub use crate::types::{LifecycleEvent, StateChanged, StatePredicate};
