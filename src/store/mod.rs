// Persistence layer: one store per table, all runtime-checked sqlx queries
// against the SQLite pool constructed in `database`.

pub mod forms;
pub mod history;
pub mod types;
pub mod users;

pub use forms::{FormStore, NewForm, UpdateForm};
pub use history::HistoryStore;
pub use types::{FormData, FormStatus, FormSubmission, PartLine, TimeEntry, WorkflowHistoryEntry};
pub use users::{NewUser, User, UserStore};

/// True when the error is a UNIQUE constraint violation, e.g. a duplicate
/// job/PO number or user email.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err)
            if db_err.kind() == sqlx::error::ErrorKind::UniqueViolation
    )
}
