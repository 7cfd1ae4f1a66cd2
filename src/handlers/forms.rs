use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{require_role, Claims, Role};
use crate::job_po::{self, JobPoCheck};
use crate::server::error::ApiError;
use crate::store::{self, FormData, FormStore, FormSubmission, NewForm, UpdateForm};

#[derive(Debug, Deserialize)]
pub struct CreateFormRequest {
    pub job_po_number: Option<String>,
    pub submitted_by_email: Option<String>,
    pub data: Option<FormData>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFormRequest {
    pub submitted_by_email: Option<String>,
    pub data: Option<FormData>,
}

/// Start a new draft. The job/PO format is enforced; the office-code
/// allow-list is a soft warning only.
pub async fn create(
    State(forms): State<FormStore>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateFormRequest>,
) -> Result<Json<FormSubmission>, ApiError> {
    let job_po_number = req
        .job_po_number
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("missing required field: job_po_number"))?;

    match job_po::check(job_po_number) {
        JobPoCheck::Ok => {}
        JobPoCheck::UnknownOfficeCode(code) => {
            tracing::warn!(
                job_po = %job_po_number,
                office_code = %code,
                "job/PO office code not on the known list"
            );
        }
        JobPoCheck::Malformed => {
            return Err(ApiError::validation(format!(
                "job_po_number must look like 24-23-0001, got: {job_po_number}"
            )));
        }
    }

    let submitted_by_email = req
        .submitted_by_email
        .filter(|s| !s.trim().is_empty())
        .or_else(|| Some(claims.email.clone()));

    let form = forms
        .create(NewForm {
            job_po_number: job_po_number.to_string(),
            submitted_by_email,
            data: req.data.unwrap_or_default(),
        })
        .await
        .map_err(|e| {
            if store::is_unique_violation(&e) {
                ApiError::conflict(format!("job/PO number already in use: {job_po_number}"))
            } else {
                ApiError::Internal(e.into())
            }
        })?;

    Ok(Json(form))
}

pub async fn list(State(forms): State<FormStore>) -> Result<Json<Vec<FormSubmission>>, ApiError> {
    Ok(Json(forms.list().await?))
}

pub async fn fetch(
    State(forms): State<FormStore>,
    Path(id): Path<String>,
) -> Result<Json<FormSubmission>, ApiError> {
    let form = forms
        .fetch(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("form not found: {id}")))?;
    Ok(Json(form))
}

pub async fn update(
    State(forms): State<FormStore>,
    Path(id): Path<String>,
    Json(req): Json<UpdateFormRequest>,
) -> Result<Json<FormSubmission>, ApiError> {
    let form = forms
        .update_draft(
            &id,
            UpdateForm {
                submitted_by_email: req.submitted_by_email,
                data: req.data,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found(format!("form not found: {id}")))?;
    Ok(Json(form))
}

/// Admin-only hard delete; the one path that physically removes a form.
pub async fn delete(
    State(forms): State<FormStore>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    require_role(&claims, Role::Admin)?;
    if !forms.delete(&id).await? {
        return Err(ApiError::not_found(format!("form not found: {id}")));
    }
    tracing::info!(form.id = %id, actor = %claims.email, "form deleted");
    Ok(Json(json!({ "ok": true })))
}
