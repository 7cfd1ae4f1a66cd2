// Workflow engine: legal state transitions on a form submission plus the
// append-only audit trail and best-effort outbound notification.

pub mod engine;
pub mod escalation;
pub mod types;

pub use engine::WorkflowEngine;
pub use escalation::{EscalationLevel, EscalationPolicy, TimeSinceRejectionPolicy};
pub use types::{WorkflowAction, WorkflowError};
