use crate::models::job::JobStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },
    /// Anti-fraud rule: once work has started, cancellation is off the
    /// table and the job must resolve through completion and payment.
    #[error("cannot cancel in-progress jobs - work has started")]
    WorkAlreadyStarted,
}

/// Validates if a job status transition is allowed.
///
/// The lifecycle is PENDING -> ACCEPTED -> IN_PROGRESS -> COMPLETED, with
/// CANCELLED reachable from PENDING or ACCEPTED only. IN_PROGRESS is a
/// one-way gate: nothing cancels or reverts it, only completion proceeds.
pub fn validate_transition(from: JobStatus, to: JobStatus) -> Result<(), TransitionError> {
    use JobStatus::*;

    match (from, to) {
        // Valid transitions
        (Pending, Accepted) => Ok(()),
        (Accepted, InProgress) => Ok(()),
        (InProgress, Completed) => Ok(()),
        (Pending, Cancelled) => Ok(()),
        (Accepted, Cancelled) => Ok(()),

        // The anti-fraud case carries its own error so callers surface the
        // policy message instead of a generic stage mismatch.
        (InProgress, Cancelled) => Err(TransitionError::WorkAlreadyStarted),

        // All other transitions are invalid
        (from, to) => Err(TransitionError::InvalidTransition { from, to }),
    }
}

/// Terminal states accept no further lifecycle actions.
pub fn is_terminal(status: JobStatus) -> bool {
    matches!(status, JobStatus::Completed | JobStatus::Cancelled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_to_accepted_valid() {
        assert!(validate_transition(JobStatus::Pending, JobStatus::Accepted).is_ok());
    }

    #[test]
    fn test_accepted_to_in_progress_valid() {
        assert!(validate_transition(JobStatus::Accepted, JobStatus::InProgress).is_ok());
    }

    #[test]
    fn test_in_progress_to_completed_valid() {
        assert!(validate_transition(JobStatus::InProgress, JobStatus::Completed).is_ok());
    }

    #[test]
    fn test_pending_to_cancelled_valid() {
        assert!(validate_transition(JobStatus::Pending, JobStatus::Cancelled).is_ok());
    }

    #[test]
    fn test_accepted_to_cancelled_valid() {
        assert!(validate_transition(JobStatus::Accepted, JobStatus::Cancelled).is_ok());
    }

    #[test]
    fn test_in_progress_to_cancelled_is_anti_fraud_block() {
        let result = validate_transition(JobStatus::InProgress, JobStatus::Cancelled);
        assert!(matches!(
            result.unwrap_err(),
            TransitionError::WorkAlreadyStarted
        ));
    }

    #[test]
    fn test_pending_to_in_progress_invalid() {
        let result = validate_transition(JobStatus::Pending, JobStatus::InProgress);
        assert!(matches!(
            result.unwrap_err(),
            TransitionError::InvalidTransition { .. }
        ));
    }

    #[test]
    fn test_completed_is_terminal() {
        assert!(is_terminal(JobStatus::Completed));
        assert!(validate_transition(JobStatus::Completed, JobStatus::Cancelled).is_err());
        assert!(validate_transition(JobStatus::Completed, JobStatus::InProgress).is_err());
    }

    #[test]
    fn test_cancelled_is_terminal() {
        assert!(is_terminal(JobStatus::Cancelled));
        assert!(validate_transition(JobStatus::Cancelled, JobStatus::Pending).is_err());
        assert!(validate_transition(JobStatus::Cancelled, JobStatus::Accepted).is_err());
    }

    #[test]
    fn test_accepted_to_completed_invalid() {
        assert!(validate_transition(JobStatus::Accepted, JobStatus::Completed).is_err());
    }
}
