use chrono::Utc;
use std::sync::Arc;
use tracing::Instrument;

use crate::database::Database;
use crate::notify::{Delivery, Notifier, NotifyEvent};
use crate::observability::{create_workflow_span, notification_metrics};
use crate::store::{FormStore, FormSubmission, HistoryStore, WorkflowHistoryEntry};
use crate::telemetry::generate_correlation_id;
use crate::workflow::escalation::EscalationPolicy;
use crate::workflow::types::{WorkflowAction, WorkflowError};

/// Enforces legal state transitions on a form submission and keeps the
/// audit trail consistent with them.
///
/// Invariants maintained here, not by the schema:
/// - `is_rejected` / `is_forwarded` / `is_approved` are mutually exclusive;
///   every transition clears the other two.
/// - The state mutation and its history entry commit in one transaction.
/// - A transition's success never depends on notification delivery; the
///   webhook fires after commit and only `http_post_sent` reflects it.
pub struct WorkflowEngine {
    db: Database,
    forms: FormStore,
    history: HistoryStore,
    notifier: Arc<dyn Notifier>,
    escalation: Arc<dyn EscalationPolicy>,
}

impl WorkflowEngine {
    pub fn new(
        db: Database,
        notifier: Arc<dyn Notifier>,
        escalation: Arc<dyn EscalationPolicy>,
    ) -> Self {
        let forms = FormStore::new(db.clone());
        let history = HistoryStore::new(db.clone());
        Self {
            db,
            forms,
            history,
            notifier,
            escalation,
        }
    }

    /// Submit or resubmit a form. The recorded actor is the form's own
    /// `submitted_by_email` (falling back to "unknown") - the submitting
    /// actor is not independently authenticated on this path, a gap carried
    /// over from the original workflow.
    pub async fn submit(&self, form_id: &str) -> Result<FormSubmission, WorkflowError> {
        let span = create_workflow_span("submit", form_id, &generate_correlation_id());
        self.do_submit(form_id).instrument(span).await
    }

    async fn do_submit(&self, form_id: &str) -> Result<FormSubmission, WorkflowError> {
        if form_id.trim().is_empty() {
            return Err(WorkflowError::MissingField("id"));
        }

        let mut tx = self.db.pool().begin().await?;
        let Some(form) = FormStore::fetch_in_tx(&mut *tx, form_id).await? else {
            return Err(WorkflowError::FormNotFound(form_id.to_string()));
        };

        let is_resubmission = form.is_rejected;
        let actor = form
            .submitted_by_email
            .clone()
            .unwrap_or_else(|| "unknown".to_string());
        let now = Utc::now();

        let updated_rows = sqlx::query(
            r#"
            UPDATE form_submissions
            SET status = 'submitted', is_draft = 0,
                is_rejected = 0, rejection_note = NULL,
                is_forwarded = 0, forwarded_to_email = NULL,
                is_approved = 0,
                submitted_at = ?1, updated_at = ?1,
                revision = revision + 1
            WHERE id = ?2 AND revision = ?3
            "#,
        )
        .bind(now)
        .bind(form_id)
        .bind(form.revision)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated_rows == 0 {
            return Err(WorkflowError::RevisionConflict(form_id.to_string()));
        }

        let action = if is_resubmission {
            WorkflowAction::Resubmitted
        } else {
            WorkflowAction::Submitted
        };
        HistoryStore::append_in_tx(&mut *tx, form_id, action.as_str(), &actor, None, None, now)
            .await?;
        tx.commit().await?;

        tracing::info!(
            form.id = %form_id,
            resubmission = is_resubmission,
            actor = %actor,
            "form submitted"
        );

        let mut updated = self.reload(form_id).await?;
        let event = if is_resubmission {
            let escalation =
                self.escalation
                    .assess(form.submitted_at, form.workflow_timestamp, now);
            NotifyEvent::Resubmitted {
                form: updated.clone(),
                escalation,
            }
        } else {
            NotifyEvent::Submitted {
                form: updated.clone(),
            }
        };
        self.dispatch_best_effort(&mut updated, event).await;

        Ok(updated)
    }

    /// Reject a submission with a mandatory note. Actor is the
    /// authenticated caller, not the form owner.
    pub async fn reject(
        &self,
        form_id: &str,
        actor_email: &str,
        note: &str,
    ) -> Result<FormSubmission, WorkflowError> {
        let span = create_workflow_span("reject", form_id, &generate_correlation_id());
        self.do_reject(form_id, actor_email, note).instrument(span).await
    }

    async fn do_reject(
        &self,
        form_id: &str,
        actor_email: &str,
        note: &str,
    ) -> Result<FormSubmission, WorkflowError> {
        if form_id.trim().is_empty() {
            return Err(WorkflowError::MissingField("id"));
        }
        if note.trim().is_empty() {
            return Err(WorkflowError::MissingField("note"));
        }

        let mut tx = self.db.pool().begin().await?;
        let Some(form) = FormStore::fetch_in_tx(&mut *tx, form_id).await? else {
            return Err(WorkflowError::FormNotFound(form_id.to_string()));
        };

        let now = Utc::now();
        let updated_rows = sqlx::query(
            r#"
            UPDATE form_submissions
            SET is_rejected = 1, rejection_note = ?1,
                is_forwarded = 0, is_approved = 0,
                workflow_timestamp = ?2, updated_at = ?2,
                revision = revision + 1
            WHERE id = ?3 AND revision = ?4
            "#,
        )
        .bind(note)
        .bind(now)
        .bind(form_id)
        .bind(form.revision)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated_rows == 0 {
            return Err(WorkflowError::RevisionConflict(form_id.to_string()));
        }

        HistoryStore::append_in_tx(
            &mut *tx,
            form_id,
            WorkflowAction::Rejected.as_str(),
            actor_email,
            Some(note),
            None,
            now,
        )
        .await?;
        tx.commit().await?;

        tracing::info!(form.id = %form_id, actor = %actor_email, "form rejected");

        let mut updated = self.reload(form_id).await?;
        let event = NotifyEvent::Rejected {
            form: updated.clone(),
            note: note.to_string(),
        };
        self.dispatch_best_effort(&mut updated, event).await;

        Ok(updated)
    }

    /// Forward a submission to another technician for rework or review.
    pub async fn forward(
        &self,
        form_id: &str,
        actor_email: &str,
        to_email: &str,
    ) -> Result<FormSubmission, WorkflowError> {
        let span = create_workflow_span("forward", form_id, &generate_correlation_id());
        self.do_forward(form_id, actor_email, to_email)
            .instrument(span)
            .await
    }

    async fn do_forward(
        &self,
        form_id: &str,
        actor_email: &str,
        to_email: &str,
    ) -> Result<FormSubmission, WorkflowError> {
        if form_id.trim().is_empty() {
            return Err(WorkflowError::MissingField("id"));
        }
        if to_email.trim().is_empty() {
            return Err(WorkflowError::MissingField("to"));
        }

        let mut tx = self.db.pool().begin().await?;
        let Some(form) = FormStore::fetch_in_tx(&mut *tx, form_id).await? else {
            return Err(WorkflowError::FormNotFound(form_id.to_string()));
        };

        let now = Utc::now();
        let updated_rows = sqlx::query(
            r#"
            UPDATE form_submissions
            SET is_forwarded = 1, forwarded_to_email = ?1,
                is_rejected = 0, is_approved = 0,
                workflow_timestamp = ?2, updated_at = ?2,
                revision = revision + 1
            WHERE id = ?3 AND revision = ?4
            "#,
        )
        .bind(to_email)
        .bind(now)
        .bind(form_id)
        .bind(form.revision)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated_rows == 0 {
            return Err(WorkflowError::RevisionConflict(form_id.to_string()));
        }

        HistoryStore::append_in_tx(
            &mut *tx,
            form_id,
            WorkflowAction::Forwarded.as_str(),
            actor_email,
            None,
            Some(to_email),
            now,
        )
        .await?;
        tx.commit().await?;

        tracing::info!(form.id = %form_id, to = %to_email, "form forwarded");

        let mut updated = self.reload(form_id).await?;
        let event = NotifyEvent::Forwarded {
            form: updated.clone(),
            to: to_email.to_string(),
        };
        self.dispatch_best_effort(&mut updated, event).await;

        Ok(updated)
    }

    /// Approve a submission, completing the workflow.
    pub async fn approve(
        &self,
        form_id: &str,
        actor_email: &str,
    ) -> Result<FormSubmission, WorkflowError> {
        let span = create_workflow_span("approve", form_id, &generate_correlation_id());
        self.do_approve(form_id, actor_email).instrument(span).await
    }

    async fn do_approve(
        &self,
        form_id: &str,
        actor_email: &str,
    ) -> Result<FormSubmission, WorkflowError> {
        if form_id.trim().is_empty() {
            return Err(WorkflowError::MissingField("id"));
        }

        let mut tx = self.db.pool().begin().await?;
        let Some(form) = FormStore::fetch_in_tx(&mut *tx, form_id).await? else {
            return Err(WorkflowError::FormNotFound(form_id.to_string()));
        };

        let now = Utc::now();
        let updated_rows = sqlx::query(
            r#"
            UPDATE form_submissions
            SET is_approved = 1,
                is_rejected = 0, is_forwarded = 0,
                workflow_timestamp = ?1, updated_at = ?1,
                revision = revision + 1
            WHERE id = ?2 AND revision = ?3
            "#,
        )
        .bind(now)
        .bind(form_id)
        .bind(form.revision)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated_rows == 0 {
            return Err(WorkflowError::RevisionConflict(form_id.to_string()));
        }

        HistoryStore::append_in_tx(
            &mut *tx,
            form_id,
            WorkflowAction::Approved.as_str(),
            actor_email,
            None,
            None,
            now,
        )
        .await?;
        tx.commit().await?;

        tracing::info!(form.id = %form_id, actor = %actor_email, "form approved");

        let mut updated = self.reload(form_id).await?;
        let event = NotifyEvent::Approved {
            form: updated.clone(),
        };
        self.dispatch_best_effort(&mut updated, event).await;

        Ok(updated)
    }

    /// Catch-all audit entry for ancillary actions (draft save, edit-enable)
    /// that do not change workflow flags. No guards beyond the three
    /// parameters being present, matching the workflow's loose contract.
    pub async fn log(
        &self,
        form_id: &str,
        action: &str,
        actor_email: &str,
    ) -> Result<(), WorkflowError> {
        if form_id.trim().is_empty() {
            return Err(WorkflowError::MissingField("formId"));
        }
        if action.trim().is_empty() {
            return Err(WorkflowError::MissingField("action"));
        }
        if actor_email.trim().is_empty() {
            return Err(WorkflowError::MissingField("actorEmail"));
        }

        self.history
            .append(form_id, action, actor_email, None, None)
            .await?;
        tracing::debug!(form.id = %form_id, action = %action, "workflow action logged");
        Ok(())
    }

    /// Ordered audit trail for one form.
    pub async fn history(
        &self,
        form_id: &str,
    ) -> Result<Vec<WorkflowHistoryEntry>, WorkflowError> {
        if form_id.trim().is_empty() {
            return Err(WorkflowError::MissingField("formId"));
        }
        Ok(self.history.list_for_form(form_id).await?)
    }

    async fn reload(&self, form_id: &str) -> Result<FormSubmission, WorkflowError> {
        self.forms
            .fetch(form_id)
            .await?
            .ok_or_else(|| WorkflowError::FormNotFound(form_id.to_string()))
    }

    /// Fire the webhook for a committed transition. Failures are logged and
    /// swallowed; only `http_post_sent` distinguishes delivered from not.
    async fn dispatch_best_effort(&self, form: &mut FormSubmission, event: NotifyEvent) {
        let metrics = notification_metrics();
        metrics.record_attempt();

        match self.notifier.dispatch(&event).await {
            Ok(Delivery::Delivered) => {
                metrics.record_delivered();
                match self.forms.mark_http_post_sent(&form.id).await {
                    Ok(()) => form.http_post_sent = true,
                    Err(e) => {
                        tracing::warn!(
                            form.id = %form.id,
                            error = %e,
                            "webhook delivered but flag update failed"
                        );
                    }
                }
            }
            Ok(Delivery::Skipped) => {
                metrics.record_skipped();
                tracing::debug!(
                    form.id = %form.id,
                    kind = event.kind(),
                    "notification skipped: endpoint not configured"
                );
            }
            Err(e) => {
                metrics.record_failed();
                tracing::warn!(
                    form.id = %form.id,
                    kind = event.kind(),
                    error = %e,
                    "notification dispatch failed; transition already committed"
                );
            }
        }
    }
}
