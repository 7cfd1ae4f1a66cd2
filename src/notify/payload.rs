use serde_json::{json, Value};

use crate::notify::NotifyEvent;
use crate::store::FormSubmission;

/// Shape the webhook body for a transition. First submissions announce a new
/// work order; everything else is a status update addressed to a recipient.
pub fn payload_for(event: &NotifyEvent, public_base_url: &str) -> Value {
    match event {
        NotifyEvent::Submitted { form } => json!({
            "date": form.submitted_at.map(|t| t.to_rfc3339()),
            "jobNumber": form.job_po_number,
            "technician": technician(form),
            "editLink": form_link(public_base_url, &form.id),
        }),
        NotifyEvent::Resubmitted { form, escalation } => json!({
            "to": technician(form),
            "status": "resubmitted",
            "formLink": form_link(public_base_url, &form.id),
            "jobPO": form.job_po_number,
            "escalation": escalation.as_str(),
        }),
        NotifyEvent::Rejected { form, note } => json!({
            "to": technician(form),
            "status": "rejected",
            "note": note,
            "formLink": form_link(public_base_url, &form.id),
            "jobPO": form.job_po_number,
        }),
        NotifyEvent::Forwarded { form, to } => json!({
            "to": to,
            "status": "forwarded",
            "formLink": form_link(public_base_url, &form.id),
            "jobPO": form.job_po_number,
        }),
        NotifyEvent::Approved { form } => json!({
            "to": technician(form),
            "status": "approved",
            "formLink": form_link(public_base_url, &form.id),
            "jobPO": form.job_po_number,
        }),
    }
}

fn technician(form: &FormSubmission) -> &str {
    form.submitted_by_email.as_deref().unwrap_or("unknown")
}

fn form_link(base: &str, form_id: &str) -> String {
    format!("{}/forms/{}", base.trim_end_matches('/'), form_id)
}
