// Notification dispatch: translates committed workflow transitions into
// webhook calls to the external automation service. Explicitly best-effort;
// the engine never blocks a transition on the outcome.

pub mod dispatcher;
pub mod payload;

use async_trait::async_trait;
use thiserror::Error;

use crate::store::FormSubmission;
use crate::workflow::EscalationLevel;

pub use dispatcher::WebhookDispatcher;

/// A committed transition, snapshotted for payload shaping.
#[derive(Debug, Clone)]
pub enum NotifyEvent {
    Submitted {
        form: FormSubmission,
    },
    Resubmitted {
        form: FormSubmission,
        escalation: EscalationLevel,
    },
    Rejected {
        form: FormSubmission,
        note: String,
    },
    Forwarded {
        form: FormSubmission,
        to: String,
    },
    Approved {
        form: FormSubmission,
    },
}

impl NotifyEvent {
    pub fn form(&self) -> &FormSubmission {
        match self {
            NotifyEvent::Submitted { form }
            | NotifyEvent::Resubmitted { form, .. }
            | NotifyEvent::Rejected { form, .. }
            | NotifyEvent::Forwarded { form, .. }
            | NotifyEvent::Approved { form } => form,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            NotifyEvent::Submitted { .. } => "submitted",
            NotifyEvent::Resubmitted { .. } => "resubmitted",
            NotifyEvent::Rejected { .. } => "rejected",
            NotifyEvent::Forwarded { .. } => "forwarded",
            NotifyEvent::Approved { .. } => "approved",
        }
    }
}

/// Outcome of a dispatch attempt that did not error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// No endpoint configured for this transition kind
    Skipped,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("webhook endpoint {url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Seam between the workflow engine and the outbound channel, so tests can
/// substitute a recording or failing notifier.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn dispatch(&self, event: &NotifyEvent) -> Result<Delivery, NotifyError>;
}
