use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::{require_role, Claims, Role};
use crate::server::error::ApiError;
use crate::store::{FormSubmission, WorkflowHistoryEntry};
use crate::workflow::WorkflowEngine;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub id: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForwardRequest {
    pub id: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LogRequest {
    #[serde(rename = "formId")]
    pub form_id: Option<String>,
    pub action: Option<String>,
    #[serde(rename = "actorEmail")]
    pub actor_email: Option<String>,
}

/// Submit or resubmit. The recorded actor is the form's own
/// `submitted_by_email`; the token only gates access to the endpoint.
pub async fn submit(
    State(engine): State<Arc<WorkflowEngine>>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<FormSubmission>, ApiError> {
    let form = engine.submit(req.id.as_deref().unwrap_or("")).await?;
    Ok(Json(form))
}

pub async fn reject(
    State(engine): State<Arc<WorkflowEngine>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<RejectRequest>,
) -> Result<Json<Value>, ApiError> {
    require_role(&claims, Role::Pm)?;
    engine
        .reject(
            req.id.as_deref().unwrap_or(""),
            &claims.email,
            req.note.as_deref().unwrap_or(""),
        )
        .await?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn forward(
    State(engine): State<Arc<WorkflowEngine>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ForwardRequest>,
) -> Result<Json<Value>, ApiError> {
    require_role(&claims, Role::Pm)?;
    engine
        .forward(
            req.id.as_deref().unwrap_or(""),
            &claims.email,
            req.to.as_deref().unwrap_or(""),
        )
        .await?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn approve(
    State(engine): State<Arc<WorkflowEngine>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ApproveRequest>,
) -> Result<Json<Value>, ApiError> {
    require_role(&claims, Role::Pm)?;
    engine
        .approve(req.id.as_deref().unwrap_or(""), &claims.email)
        .await?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn log(
    State(engine): State<Arc<WorkflowEngine>>,
    Json(req): Json<LogRequest>,
) -> Result<Json<Value>, ApiError> {
    engine
        .log(
            req.form_id.as_deref().unwrap_or(""),
            req.action.as_deref().unwrap_or(""),
            req.actor_email.as_deref().unwrap_or(""),
        )
        .await?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn history(
    State(engine): State<Arc<WorkflowEngine>>,
    Path(form_id): Path<String>,
) -> Result<Json<Vec<WorkflowHistoryEntry>>, ApiError> {
    let entries = engine.history(&form_id).await?;
    Ok(Json(entries))
}
