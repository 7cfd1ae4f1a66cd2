//! Shared test harness: temp-file SQLite databases, a recording notifier,
//! and a router-level app wrapper.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use punchlist::auth::{password, Claims, Role, TokenSigner};
use punchlist::config::{DatabaseConfig, NotificationConfig, PunchlistConfig};
use punchlist::database::Database;
use punchlist::notify::{Delivery, Notifier, NotifyError, NotifyEvent, WebhookDispatcher};
use punchlist::server::{build_router, AppState};
use punchlist::store::{
    FormData, FormStore, FormSubmission, HistoryStore, NewForm, NewUser, User, UserStore,
};
use punchlist::workflow::{TimeSinceRejectionPolicy, WorkflowEngine};

pub const TEST_SECRET: &str = "punchlist-test-secret";

/// Open a migrated database backed by a temp file. The TempDir must stay
/// alive for the duration of the test.
pub async fn test_db() -> (Database, TempDir) {
    let dir = tempfile::tempdir().expect("create tempdir");
    let url = format!(
        "sqlite://{}",
        dir.path().join("punchlist-test.db").display()
    );
    let db = Database::connect(&DatabaseConfig {
        url,
        max_connections: 5,
        auto_migrate: true,
    })
    .await
    .expect("connect test database");
    (db, dir)
}

/// Notifier double that records every event and can be flipped into a
/// failure mode.
#[derive(Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<NotifyEvent>>,
    pub fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn event_kinds(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.kind().to_string())
            .collect()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn dispatch(&self, event: &NotifyEvent) -> Result<Delivery, NotifyError> {
        self.events.lock().unwrap().push(event.clone());
        if self.fail.load(Ordering::SeqCst) {
            Err(NotifyError::Status {
                url: "http://automation.invalid/hook".to_string(),
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            })
        } else {
            Ok(Delivery::Delivered)
        }
    }
}

/// Engine wired to a recording notifier and the default escalation policy.
pub fn engine_with(db: &Database, notifier: Arc<RecordingNotifier>) -> WorkflowEngine {
    WorkflowEngine::new(
        db.clone(),
        notifier,
        Arc::new(TimeSinceRejectionPolicy::default()),
    )
}

pub async fn create_form(db: &Database, job_po: &str, technician: Option<&str>) -> FormSubmission {
    FormStore::new(db.clone())
        .create(NewForm {
            job_po_number: job_po.to_string(),
            submitted_by_email: technician.map(str::to_string),
            data: FormData::default(),
        })
        .await
        .expect("create test form")
}

pub async fn history_actions(db: &Database, form_id: &str) -> Vec<String> {
    HistoryStore::new(db.clone())
        .list_for_form(form_id)
        .await
        .expect("list history")
        .into_iter()
        .map(|e| e.action)
        .collect()
}

/// Full HTTP app over a temp database, driven through `oneshot`.
pub struct TestApp {
    pub router: Router,
    pub db: Database,
    pub forms: FormStore,
    pub users: UserStore,
    pub signer: Arc<TokenSigner>,
    _tempdir: TempDir,
}

impl TestApp {
    pub async fn spawn(notifications: NotificationConfig) -> Self {
        let (db, tempdir) = test_db().await;

        let mut config = PunchlistConfig::default();
        config.auth.token_secret = Some(TEST_SECRET.to_string());
        config.notifications = notifications;

        let notifier = Arc::new(
            WebhookDispatcher::new(
                config.notifications.clone(),
                config.server.public_base_url.clone(),
            )
            .expect("build dispatcher"),
        );
        let state = AppState::build(
            &config,
            db.clone(),
            notifier,
            Arc::new(TimeSinceRejectionPolicy::default()),
        )
        .expect("build app state");

        Self {
            router: build_router(&state),
            db: state.db.clone(),
            forms: state.forms.clone(),
            users: state.users.clone(),
            signer: state.signer.clone(),
            _tempdir: tempdir,
        }
    }

    pub async fn seed_user(&self, email: &str, plain_password: &str, role: Role) -> User {
        self.users
            .create(NewUser {
                email: email.to_string(),
                password_hash: password::hash_password(plain_password),
                role,
            })
            .await
            .expect("seed user")
    }

    pub fn token_for(&self, user: &User) -> String {
        self.signer.issue(&Claims {
            id: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            exp: Utc::now().timestamp() + 3600,
        })
    }

    pub async fn post_json(
        &self,
        path: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = builder.body(Body::from(body.to_string())).expect("request");
        self.send(request).await
    }

    pub async fn post_json_method(
        &self,
        http_method: &str,
        path: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(http_method)
            .uri(path)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = builder.body(Body::from(body.to_string())).expect("request");
        self.send(request).await
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = builder.body(Body::empty()).expect("request");
        self.send(request).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("DELETE").uri(path);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = builder.body(Body::empty()).expect("request");
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router responds");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}
