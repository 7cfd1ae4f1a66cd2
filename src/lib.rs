// Punchlist - Field-Service Work Order Workflow Backend
// This exposes the core components for testing and integration

pub mod auth;
pub mod config;
pub mod database;
pub mod handlers;
pub mod job_po;
pub mod notify;
pub mod observability;
pub mod server;
pub mod store;
pub mod telemetry;
pub mod workflow;

// Re-export key types for easy access
pub use auth::{AuthError, AuthService, Claims, Role, TokenSigner};
pub use config::{DatabaseConfig, NotificationConfig, PunchlistConfig};
pub use database::Database;
pub use notify::{Delivery, Notifier, NotifyError, NotifyEvent, WebhookDispatcher};
pub use observability::{notification_metrics, NotificationMetrics};
pub use server::{build_router, AppState};
pub use store::{FormStore, FormSubmission, HistoryStore, UserStore, WorkflowHistoryEntry};
pub use telemetry::init_telemetry;
pub use workflow::{
    EscalationLevel, EscalationPolicy, TimeSinceRejectionPolicy, WorkflowAction, WorkflowEngine,
    WorkflowError,
};
