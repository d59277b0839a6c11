//! Core types for stratastate
//!
//! This crate defines the building blocks of the state machine:
//! - Value: raw attribute values as the record layer stores them
//! - StateSet / StateClass / StateFamily / State: the state model
//! - Record / Attribute / Document: the slice of a record the machine touches
//! - Transition / TransitionFactory: one execution of a state change
//! - StateConfig: per-field default and transition table
//! - StatePredicate: state filters for the query layer
//! - StateError: every failure the machine reports

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod query;
pub mod record;
pub mod state;
pub mod transition;
pub mod value;

pub use config::{FromState, StateConfig, TransitionDescriptor};
pub use error::{ErrorKind, Result, StateError};
pub use query::{PredicateOp, StatePredicate};
pub use record::{Attribute, Document, Record};
pub use state::{State, StateClass, StateFamily, StateSet, StateTarget};
pub use transition::{DefaultTransition, Transition, TransitionContext, TransitionFactory};
pub use value::Value;
