use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// Lifecycle status of a form submission. The workflow flags
/// (`is_rejected` / `is_forwarded` / `is_approved`) are tracked separately
/// and are mutually exclusive by engine invariant, not by schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormStatus {
    Draft,
    Submitted,
}

impl FormStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormStatus::Draft => "draft",
            FormStatus::Submitted => "submitted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(FormStatus::Draft),
            "submitted" => Some(FormStatus::Submitted),
            _ => None,
        }
    }
}

/// One row per work order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSubmission {
    pub id: String,
    pub job_po_number: String,
    pub status: FormStatus,
    pub is_draft: bool,
    pub is_rejected: bool,
    pub is_forwarded: bool,
    pub is_approved: bool,
    pub submitted_at: Option<DateTime<Utc>>,
    pub workflow_timestamp: Option<DateTime<Utc>>,
    pub rejection_note: Option<String>,
    pub forwarded_to_email: Option<String>,
    pub submitted_by_email: Option<String>,
    pub http_post_sent: bool,
    pub data: FormData,
    pub revision: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FormSubmission {
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let status_raw: String = row.try_get("status")?;
        let status = FormStatus::parse(&status_raw).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "status".to_string(),
            source: format!("unknown form status: {status_raw}").into(),
        })?;

        let data_raw: String = row.try_get("data")?;
        let data =
            serde_json::from_str(&data_raw).map_err(|e| sqlx::Error::ColumnDecode {
                index: "data".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            id: row.try_get("id")?,
            job_po_number: row.try_get("job_po_number")?,
            status,
            is_draft: row.try_get("is_draft")?,
            is_rejected: row.try_get("is_rejected")?,
            is_forwarded: row.try_get("is_forwarded")?,
            is_approved: row.try_get("is_approved")?,
            submitted_at: row.try_get("submitted_at")?,
            workflow_timestamp: row.try_get("workflow_timestamp")?,
            rejection_note: row.try_get("rejection_note")?,
            forwarded_to_email: row.try_get("forwarded_to_email")?,
            submitted_by_email: row.try_get("submitted_by_email")?,
            http_post_sent: row.try_get("http_post_sent")?,
            data,
            revision: row.try_get("revision")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Inspection payload. One canonical typed representation, stored as a JSON
/// blob in the `data` column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormData {
    pub customer_name: Option<String>,
    pub site_address: Option<String>,
    pub equipment_make: Option<String>,
    pub equipment_model: Option<String>,
    pub equipment_serial: Option<String>,
    pub voltage_reading: Option<f64>,
    pub amperage_reading: Option<f64>,
    pub parts_used: Vec<PartLine>,
    pub time_entries: Vec<TimeEntry>,
    pub work_summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartLine {
    pub part_number: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeEntry {
    pub date: Option<String>,
    pub hours: Option<f64>,
    pub description: Option<String>,
}

/// Append-only audit record for one workflow action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowHistoryEntry {
    pub id: i64,
    pub form_id: String,
    pub action: String,
    pub actor_email: String,
    pub note: Option<String>,
    pub forwarded_to_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WorkflowHistoryEntry {
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            form_id: row.try_get("form_id")?,
            action: row.try_get("action")?,
            actor_email: row.try_get("actor_email")?,
            note: row.try_get("note")?,
            forwarded_to_email: row.try_get("forwarded_to_email")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
