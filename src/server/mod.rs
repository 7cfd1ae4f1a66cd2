// HTTP façade: axum router assembly and server lifecycle.

pub mod error;
pub mod router;

use anyhow::Result;
use std::sync::Arc;

use crate::auth::{password, AuthService, Role, TokenSigner};
use crate::config::{AuthConfig, PunchlistConfig};
use crate::database::Database;
use crate::notify::{Notifier, WebhookDispatcher};
use crate::store::{FormStore, NewUser, UserStore};
use crate::workflow::{EscalationPolicy, TimeSinceRejectionPolicy, WorkflowEngine};

pub use router::build_router;

/// Everything the routers need, wired once at startup. Stores and services
/// are constructed from an explicitly passed database handle; nothing here
/// is global.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub engine: Arc<WorkflowEngine>,
    pub forms: FormStore,
    pub users: UserStore,
    pub auth: AuthService,
    pub signer: Arc<TokenSigner>,
}

impl AppState {
    pub fn build(
        config: &PunchlistConfig,
        db: Database,
        notifier: Arc<dyn Notifier>,
        escalation: Arc<dyn EscalationPolicy>,
    ) -> Result<Self> {
        let signer = Arc::new(TokenSigner::from_config(&config.auth)?);
        let engine = Arc::new(WorkflowEngine::new(db.clone(), notifier, escalation));
        let users = UserStore::new(db.clone());
        let auth = AuthService::new(users.clone(), signer.clone(), config.auth.token_ttl_hours);

        Ok(Self {
            db: db.clone(),
            engine,
            forms: FormStore::new(db),
            users,
            auth,
            signer,
        })
    }
}

/// Run the server until a shutdown signal arrives.
pub async fn run(config: PunchlistConfig) -> Result<()> {
    let db = Database::connect(&config.database).await?;

    let notifier: Arc<dyn Notifier> = Arc::new(WebhookDispatcher::new(
        config.notifications.clone(),
        config.server.public_base_url.clone(),
    )?);
    let escalation: Arc<dyn EscalationPolicy> = Arc::new(TimeSinceRejectionPolicy::default());

    let state = AppState::build(&config, db.clone(), notifier, escalation)?;
    bootstrap_admin(&config.auth, &state.users).await?;

    let router = build_router(&state);
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    tracing::info!(addr = %config.server.bind_addr, "Punchlist listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    Ok(())
}

/// Create the configured superadmin, but only into an empty users table so
/// a redeploy never resurrects a deleted account.
async fn bootstrap_admin(auth: &AuthConfig, users: &UserStore) -> Result<()> {
    let (Some(email), Some(pass)) = (&auth.bootstrap_admin_email, &auth.bootstrap_admin_password)
    else {
        return Ok(());
    };

    if users.count().await? > 0 {
        return Ok(());
    }

    users
        .create(NewUser {
            email: email.clone(),
            password_hash: password::hash_password(pass),
            role: Role::Superadmin,
        })
        .await?;
    tracing::info!(email = %email, "created bootstrap superadmin");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
