//! State machine engine for stratastate
//!
//! This crate wires the core types to record types:
//! - StateFields: every state field of one record type
//! - StateRegistry: process-wide, initialize-once cache of field maps
//! - LifecycleEvent: record load/save checkpoints and their phase
//! - StateChanged: notifications after each transition
//! - HasStates: the facade record types implement

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod events;
pub mod fields;
pub mod has_states;
pub mod lifecycle;
pub mod registry;

pub use events::{Listeners, StateChanged, StateListener};
pub use fields::StateFields;
pub use has_states::HasStates;
pub use lifecycle::{LifecycleEvent, Phase};
pub use registry::StateRegistry;
