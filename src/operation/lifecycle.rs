// Copyright (c) 2025 - Cowboy AI, Inc.
//! Operation Lifecycle State Machine
//!
//! Every top-level operation moves through a small deterministic FSM:
//!
//! ```text
//!             Validate            Commit
//! Received ───────────> Validated ───────> Applied
//!     │                     │
//!     └──── Reject ─────────┴────────────> Rejected
//! ```
//!
//! `Validated` means every step was checked and staged against the tree with
//! its inverse recorded; `Applied` means the undo log was discarded.
//! `Applied` and `Rejected` are terminal.

use std::fmt;

/// Result of a state transition
pub type TransitionResult<S> = Result<S, TransitionError>;

/// Errors that can occur during state transitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Transition from current state to target state is not allowed
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

/// Trait for finite state machines
pub trait StateMachine: Sized + Clone {
    /// Input type that triggers transitions
    type Input;

    /// Attempt to transition to a new state given an input
    fn transition(&self, input: &Self::Input) -> TransitionResult<Self>;

    /// Check if a transition is valid without performing it
    fn can_transition(&self, input: &Self::Input) -> bool {
        self.transition(input).is_ok()
    }
}

/// Stage of a top-level operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationStage {
    Received,
    Validated,
    Applied,
    Rejected,
}

impl OperationStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OperationStage::Applied | OperationStage::Rejected)
    }
}

impl fmt::Display for OperationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationStage::Received => "Received",
            OperationStage::Validated => "Validated",
            OperationStage::Applied => "Applied",
            OperationStage::Rejected => "Rejected",
        };
        f.write_str(name)
    }
}

/// Lifecycle input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageInput {
    Validate,
    Commit,
    Reject,
}

impl StateMachine for OperationStage {
    type Input = StageInput;

    fn transition(&self, input: &Self::Input) -> TransitionResult<Self> {
        use OperationStage::*;
        use StageInput::*;

        match (self, input) {
            (Received, Validate) => Ok(Validated),
            (Validated, Commit) => Ok(Applied),
            (Received, Reject) | (Validated, Reject) => Ok(Rejected),
            (from, input) => Err(TransitionError::InvalidTransition {
                from: from.to_string(),
                to: format!("{:?}", input),
            }),
        }
    }
}
