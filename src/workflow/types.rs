use thiserror::Error;

/// Canonical workflow actions recorded in the audit trail. The `log`
/// operation also accepts free-form action names, so history rows store
/// plain strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowAction {
    Submitted,
    Resubmitted,
    Rejected,
    Forwarded,
    Approved,
}

impl WorkflowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowAction::Submitted => "submitted",
            WorkflowAction::Resubmitted => "resubmitted",
            WorkflowAction::Rejected => "rejected",
            WorkflowAction::Forwarded => "forwarded",
            WorkflowAction::Approved => "approved",
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Fail-fast validation, raised before any database access
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("form not found: {0}")]
    FormNotFound(String),
    /// The optimistic revision guard lost: another transition committed
    /// between our read and write
    #[error("form {0} was modified concurrently, retry the action")]
    RevisionConflict(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
