//! Error types for state machine operations.
//!
//! Every failure is surfaced to the caller immediately. Nothing is retried
//! or recovered internally, and a failed operation leaves the record's
//! attributes untouched.
//!
//! Errors fall into two kinds (see [`ErrorKind`]):
//!
//! | Kind | Raised when |
//! |------|-------------|
//! | Configuration | registration is wrong, or a stored value does not fit the field |
//! | Transition | a transition request cannot be resolved or is refused |

use thiserror::Error;

/// Broad classification of a [`StateError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Registration or field/value mismatch
    Configuration,
    /// Transition resolution or execution failure
    Transition,
}

/// All state machine errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// A field was registered twice for the same record type
    #[error("state field `{field}` is already registered on {record}")]
    DuplicateField {
        /// Record type name
        record: String,
        /// Field name
        field: String,
    },

    /// Lookup of a field that was never registered
    #[error("unknown state field `{field}` on {record}")]
    UnknownField {
        /// Record type name
        record: String,
        /// Field name
        field: String,
    },

    /// The record type registers no state fields at all
    #[error("{record} has no state fields")]
    NoStateFields {
        /// Record type name
        record: String,
    },

    /// A value resolves to a variant outside the field's state family
    #[error("state field `{field}` expects {family}, but `{class}` does not extend it")]
    FieldDoesNotExtendState {
        /// Field name
        field: String,
        /// Family (capability-set) declared for the field
        family: String,
        /// Class identifier of the offending variant
        class: String,
    },

    /// A raw value or name does not resolve to any known variant
    #[error("`{value}` is not a known state of {family}")]
    UnknownState {
        /// Family the value was resolved against
        family: String,
        /// The raw value, rendered
        value: String,
    },

    /// A state filter was given no states to match
    #[error("no states given to filter field `{field}`")]
    NoTargetStates {
        /// Field name
        field: String,
    },

    /// Two variants of one family share a canonical name or class identifier
    #[error("{family} declares `{name}` more than once")]
    DuplicateStateName {
        /// Family type name
        family: String,
        /// The repeated canonical name or class identifier
        name: String,
    },

    /// The same (from, to) pair was registered twice on one field
    #[error("transition {from} -> {to} is already registered on field `{field}`")]
    DuplicateTransition {
        /// Field name
        field: String,
        /// Source variant, or `*` for any-from
        from: String,
        /// Target variant
        to: String,
    },

    /// No field was given and the record type has several state fields
    #[error("could not resolve field for {record}: specify one of [{}]", .fields.join(", "))]
    AmbiguousField {
        /// Record type name
        record: String,
        /// Every registered state field
        fields: Vec<String>,
    },

    /// No registered transition matches (from, to) for the field
    #[error("transition not found from `{from}` to `{to}` on field `{field}`")]
    TransitionNotFound {
        /// Field name
        field: String,
        /// Current canonical name
        from: String,
        /// Requested canonical name
        to: String,
    },

    /// The transition's precondition hook refused the attempt
    #[error("transition from `{from}` to `{to}` on field `{field}` is not allowed")]
    TransitionNotAllowed {
        /// Field name
        field: String,
        /// Current canonical name
        from: String,
        /// Requested canonical name
        to: String,
        /// Transition type that refused
        transition: String,
    },

    /// The field holds no state, so there is nothing to transition from
    #[error("state field `{field}` on {record} holds no state")]
    UninitializedState {
        /// Record type name
        record: String,
        /// Field name
        field: String,
    },

    /// A transition's `handle` failed
    #[error("transition failed: {reason}")]
    TransitionFailed {
        /// Reason given by the transition
        reason: String,
    },

    /// Internal error (bug or invariant violation)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for state machine operations.
pub type Result<T> = std::result::Result<T, StateError>;

impl StateError {
    /// Convenience constructor for transition authors.
    pub fn transition_failed(reason: impl Into<String>) -> Self {
        StateError::TransitionFailed {
            reason: reason.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StateError::DuplicateField { .. }
            | StateError::UnknownField { .. }
            | StateError::NoStateFields { .. }
            | StateError::FieldDoesNotExtendState { .. }
            | StateError::UnknownState { .. }
            | StateError::NoTargetStates { .. }
            | StateError::DuplicateStateName { .. }
            | StateError::DuplicateTransition { .. }
            | StateError::Internal(_) => ErrorKind::Configuration,
            StateError::AmbiguousField { .. }
            | StateError::TransitionNotFound { .. }
            | StateError::TransitionNotAllowed { .. }
            | StateError::UninitializedState { .. }
            | StateError::TransitionFailed { .. } => ErrorKind::Transition,
        }
    }

    /// Check if this is a configuration error.
    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    /// Check if this is a transition error.
    pub fn is_transition(&self) -> bool {
        self.kind() == ErrorKind::Transition
    }

    /// Check if no transition matched the requested pair.
    pub fn is_transition_not_found(&self) -> bool {
        matches!(self, StateError::TransitionNotFound { .. })
    }

    /// Check if a precondition hook refused the transition.
    pub fn is_transition_not_allowed(&self) -> bool {
        matches!(self, StateError::TransitionNotAllowed { .. })
    }

    /// Check if the field could not be resolved.
    pub fn is_ambiguous_field(&self) -> bool {
        matches!(self, StateError::AmbiguousField { .. })
    }
}
