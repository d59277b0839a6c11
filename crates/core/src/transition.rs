//! Transitions
//!
//! A transition moves one state field of one record from its current state
//! to a target state. It is built fresh for every attempt by a
//! [`TransitionFactory`], checked through [`Transition::can_transition`],
//! executed once through [`Transition::handle`], then dropped.
//!
//! ## Contract
//!
//! - `handle` returns exactly one new state or an error; it never writes the
//!   state field itself (the facade does that after `handle` returns)
//! - the returned state should be the registered target variant; this is
//!   not re-checked at runtime
//! - any side-effect ordering beyond "complete or fail" is the transition
//!   author's business

use crate::error::Result;
use crate::state::{State, StateClass};
use crate::value::Value;
use std::any::type_name;
use std::fmt;
use std::sync::Arc;

/// Everything a transition is built from.
#[derive(Debug, Clone)]
pub struct TransitionContext {
    /// Current state of the field
    pub from: State,
    /// Registered target variant
    pub to: StateClass,
    /// Caller-supplied arguments
    pub args: Vec<Value>,
}

impl TransitionContext {
    /// Positional argument, if supplied
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }
}

/// One execution of a state change on a record of type `R`.
pub trait Transition<R> {
    /// Precondition hook. Returning `false` makes the facade refuse the
    /// transition without calling `handle`.
    fn can_transition(&self, _record: &R) -> bool {
        true
    }

    /// Run side effects and produce the new state.
    fn handle(self: Box<Self>, record: &mut R) -> Result<State>;
}

/// The transition used when none is given: moves straight to the target.
#[derive(Debug, Clone)]
pub struct DefaultTransition {
    from: State,
    to: StateClass,
}

impl DefaultTransition {
    /// Build from a context; arguments are ignored
    pub fn new(ctx: TransitionContext) -> Self {
        Self {
            from: ctx.from,
            to: ctx.to,
        }
    }
}

impl<R> Transition<R> for DefaultTransition {
    fn handle(self: Box<Self>, _record: &mut R) -> Result<State> {
        Ok(self.from.with_class(self.to))
    }
}

type BuildFn<R> = dyn Fn(TransitionContext) -> Box<dyn Transition<R>> + Send + Sync;

/// Builds a transition for every attempt.
pub struct TransitionFactory<R> {
    name: &'static str,
    build: Arc<BuildFn<R>>,
}

impl<R: 'static> TransitionFactory<R> {
    /// Wrap a constructor. The factory is named after the transition type.
    pub fn new<F, T>(constructor: F) -> Self
    where
        F: Fn(TransitionContext) -> T + Send + Sync + 'static,
        T: Transition<R> + 'static,
    {
        Self {
            name: type_name::<T>(),
            build: Arc::new(move |ctx| -> Box<dyn Transition<R>> { Box::new(constructor(ctx)) }),
        }
    }

    /// Factory for [`DefaultTransition`]
    pub fn default_transition() -> Self {
        Self::new(DefaultTransition::new)
    }

    /// Build one transition
    pub fn build(&self, ctx: TransitionContext) -> Box<dyn Transition<R>> {
        (self.build)(ctx)
    }
}

impl<R> TransitionFactory<R> {
    /// Transition type name
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<R> Clone for TransitionFactory<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            build: Arc::clone(&self.build),
        }
    }
}

impl<R> fmt::Debug for TransitionFactory<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionFactory")
            .field("name", &self.name)
            .finish()
    }
}
