//! Record lifecycle events
//!
//! The record layer reports its load/save checkpoints; each maps to one
//! [`Phase`] of state handling.
//!
//! | Event | Phase |
//! |-------|-------|
//! | Retrieved, Created, Saved | Deserialize |
//! | Creating, Updating, Saving | Serialize |

use std::fmt;

/// A checkpoint in a record's load/save cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// Loaded from storage
    Retrieved,
    /// About to be inserted
    Creating,
    /// Inserted
    Created,
    /// About to be updated
    Updating,
    /// About to be written (insert or update)
    Saving,
    /// Written
    Saved,
}

/// What the state machine does at a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Raw values become `State` instances
    Deserialize,
    /// `State` instances become canonical names
    Serialize,
}

impl LifecycleEvent {
    /// Every event, in the order a create-then-load cycle reports them
    pub const ALL: [LifecycleEvent; 6] = [
        LifecycleEvent::Creating,
        LifecycleEvent::Saving,
        LifecycleEvent::Created,
        LifecycleEvent::Saved,
        LifecycleEvent::Updating,
        LifecycleEvent::Retrieved,
    ];

    /// Phase triggered by this event
    pub fn phase(&self) -> Phase {
        match self {
            LifecycleEvent::Retrieved | LifecycleEvent::Created | LifecycleEvent::Saved => {
                Phase::Deserialize
            }
            LifecycleEvent::Creating | LifecycleEvent::Updating | LifecycleEvent::Saving => {
                Phase::Serialize
            }
        }
    }

    /// Event name as the record layer spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::Retrieved => "retrieved",
            LifecycleEvent::Creating => "creating",
            LifecycleEvent::Created => "created",
            LifecycleEvent::Updating => "updating",
            LifecycleEvent::Saving => "saving",
            LifecycleEvent::Saved => "saved",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
