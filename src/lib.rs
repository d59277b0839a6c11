//! # Stratastate
//!
//! State machines for persisted records.
//!
//! A record field holds a *state*: one variant of a closed family declared
//! as a Rust enum. Moving between states goes through explicit transitions
//! that can check preconditions and run side effects before producing the
//! new state.
//!
//! ## Quick Start
//!
//! ```ignore
//! use stratastate::prelude::*;
//!
//! impl HasStates for Post {
//!     fn register_states(fields: &mut StateFields<Self>) -> Result<()> {
//!         fields
//!             .add_state("status", StateFamily::of::<PostState>())?
//!             .default(PostState::Draft)?
//!             .allow_transition(PostState::Draft, PostState::Published, PublishTransition::new)?;
//!         Ok(())
//!     }
//! }
//!
//! // Load: raw stored names become states
//! post.handle_lifecycle(LifecycleEvent::Retrieved)?;
//!
//! // Transition the only state field
//! post.transition_to(PostState::Published)?;
//!
//! // Save: states become canonical names again
//! post.handle_lifecycle(LifecycleEvent::Saving)?;
//!
//! // Filter by state
//! let published = Post::where_state("status", ["published"])?;
//! ```
//!
//! ## Crates
//!
//! - `stratastate-core` - values, states, transitions, per-field config, predicates
//! - `stratastate-engine` - field registry, lifecycle dispatch, the [`HasStates`] facade
//!
//! ## Record Integration
//!
//! The library never loads or saves anything. A record type implements
//! [`Record`] (attribute get/set) and reports its lifecycle events through
//! [`HasStates::handle_lifecycle`]; [`Document`] is a ready-made in-memory
//! record.

#![warn(missing_docs)]

mod types;

pub mod prelude;

// Re-export the facade
pub use stratastate_engine::{HasStates, StateFields, StateRegistry};

// Re-export error handling
pub use stratastate_core::{ErrorKind, Result, StateError};

// Re-export types
pub use types::*;
