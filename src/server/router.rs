//! Axum router configuration
//!
//! Focused sub-routers per API surface, each carrying only the state it
//! needs. Bearer-token auth is applied at the route-group level; role
//! checks happen inside handlers.
//!
//! ```text
//! /
//! ├── /workflow/*  - state transitions and audit trail (authenticated)
//! ├── /forms/*     - submission CRUD (authenticated)
//! ├── /users/*     - user management (authenticated, superadmin)
//! ├── /auth/*      - login
//! └── /health      - liveness
//! ```

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::auth::{self, AuthService, TokenSigner};
use crate::handlers::{auth as auth_handlers, forms, health, users, workflow};
use crate::server::AppState;
use crate::store::{FormStore, UserStore};
use crate::workflow::WorkflowEngine;

/// Build the complete router with all routes.
pub fn build_router(state: &AppState) -> Router {
    Router::new()
        .nest(
            "/workflow",
            workflow_router(state.engine.clone(), state.signer.clone()),
        )
        .nest(
            "/forms",
            forms_router(state.forms.clone(), state.signer.clone()),
        )
        .nest(
            "/users",
            users_router(state.users.clone(), state.signer.clone()),
        )
        .nest("/auth", auth_router(state.auth.clone()))
        .route("/health", get(health::health))
}

/// Workflow transition routes
///
/// - `POST /workflow/submit` - submit or resubmit a form
/// - `POST /workflow/reject` - reject with a mandatory note (PM+)
/// - `POST /workflow/forward` - forward to a technician (PM+)
/// - `POST /workflow/approve` - approve (PM+)
/// - `POST /workflow/log` - record an ancillary audit entry
/// - `GET  /workflow/history/{form_id}` - ordered audit trail
fn workflow_router(engine: Arc<WorkflowEngine>, signer: Arc<TokenSigner>) -> Router {
    Router::new()
        .route("/submit", post(workflow::submit))
        .route("/reject", post(workflow::reject))
        .route("/forward", post(workflow::forward))
        .route("/approve", post(workflow::approve))
        .route("/log", post(workflow::log))
        .route("/history/{form_id}", get(workflow::history))
        .with_state(engine)
        .layer(from_fn_with_state(signer, auth::require_auth))
}

/// Form submission CRUD routes
fn forms_router(forms: FormStore, signer: Arc<TokenSigner>) -> Router {
    Router::new()
        .route("/", post(forms::create).get(forms::list))
        .route(
            "/{id}",
            get(forms::fetch).put(forms::update).delete(forms::delete),
        )
        .with_state(forms)
        .layer(from_fn_with_state(signer, auth::require_auth))
}

/// User management routes (superadmin only, enforced in handlers)
fn users_router(users: UserStore, signer: Arc<TokenSigner>) -> Router {
    Router::new()
        .route("/", post(users::create).get(users::list))
        .route("/{id}", axum::routing::delete(users::delete))
        .with_state(users)
        .layer(from_fn_with_state(signer, auth::require_auth))
}

/// Login route, unauthenticated by construction
fn auth_router(auth: AuthService) -> Router {
    Router::new()
        .route("/login", post(auth_handlers::login))
        .with_state(auth)
}
