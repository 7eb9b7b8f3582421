use thiserror::Error;

use super::response::ResponseStatus;
use super::step::StepId;
use crate::persistence::{SessionStatus, StoreError};

/// Errors that can occur while driving a workflow session
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Step mismatch. Expected: {expected}, got: {actual}")]
    StaleStep { expected: StepId, actual: StepId },

    #[error("Invalid transition from step: {step} ({reason})")]
    NoMatchingTransition { step: StepId, reason: String },

    #[error("Cannot go back from completion step: {step}")]
    BackFromTerminal { step: StepId },

    #[error("Cannot go back from step: {step}")]
    NoPredecessor { step: StepId },

    #[error("Step {hint} is not a predecessor of {step}")]
    InvalidBackHint { step: StepId, hint: StepId },

    #[error("Invalid workflow type: {0}")]
    UnknownWorkflowType(String),

    #[error("Workflow session {session_id} is {status}")]
    SessionClosed {
        session_id: String,
        status: SessionStatus,
    },

    #[error("Workflow session {0} was changed by another request; reload and resubmit")]
    ConcurrentModification(String),

    #[error("Unknown step: {0}")]
    UnknownStep(String),

    #[error("Workflow session not found: {0}")]
    SessionNotFound(String),

    #[error("Session store error: {0}")]
    Store(#[from] StoreError),

    #[error("Step graph is invalid: {0}")]
    InvalidGraph(String),
}

impl WorkflowError {
    /// Map the error onto the response taxonomy returned to callers
    pub fn classification(&self) -> ResponseStatus {
        match self {
            WorkflowError::StaleStep { .. }
            | WorkflowError::NoMatchingTransition { .. }
            | WorkflowError::BackFromTerminal { .. }
            | WorkflowError::NoPredecessor { .. }
            | WorkflowError::InvalidBackHint { .. }
            | WorkflowError::UnknownWorkflowType(_)
            | WorkflowError::SessionClosed { .. }
            | WorkflowError::ConcurrentModification(_) => ResponseStatus::BusinessRuleError,
            WorkflowError::UnknownStep(_)
            | WorkflowError::SessionNotFound(_)
            | WorkflowError::Store(_)
            | WorkflowError::InvalidGraph(_) => ResponseStatus::SystemError,
        }
    }
}
