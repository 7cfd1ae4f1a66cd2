use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Punchlist
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PunchlistConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Database settings
    pub database: DatabaseConfig,
    /// Bearer-token authentication settings
    pub auth: AuthConfig,
    /// Outbound webhook notification settings
    pub notifications: NotificationConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub bind_addr: String,
    /// Public base URL used when building form links for notification payloads
    pub public_base_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database URL (SQLite file path or connection string)
    pub url: String,
    /// Maximum connections in pool
    pub max_connections: u32,
    /// Enable automatic migrations
    pub auto_migrate: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Secret used to sign bearer tokens (can be set via env var)
    pub token_secret: Option<String>,
    /// Issued token lifetime in hours
    pub token_ttl_hours: i64,
    /// Email for a bootstrap superadmin, created only when the users table is empty
    pub bootstrap_admin_email: Option<String>,
    /// Password for the bootstrap superadmin
    pub bootstrap_admin_password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    /// Webhook URL for submit/resubmit notifications (unset disables dispatch)
    pub submit_url: Option<String>,
    /// Webhook URL for rejection notifications
    pub reject_url: Option<String>,
    /// Webhook URL for forward/approve notifications
    pub forward_url: Option<String>,
    /// Bound on each outbound request so a hung endpoint cannot stall a response
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit JSON-structured logs instead of human-readable output
    pub json_logs: bool,
}

impl Default for PunchlistConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_addr: "127.0.0.1:8080".to_string(),
                public_base_url: "http://127.0.0.1:8080".to_string(),
            },
            database: DatabaseConfig {
                url: ".punchlist/punchlist.db".to_string(),
                max_connections: 10,
                auto_migrate: true,
            },
            auth: AuthConfig {
                token_secret: None, // Will be read from env var
                token_ttl_hours: 12,
                bootstrap_admin_email: None,
                bootstrap_admin_password: None,
            },
            notifications: NotificationConfig {
                submit_url: None,
                reject_url: None,
                forward_url: None,
                timeout_seconds: 10,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
        }
    }
}

impl PunchlistConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (punchlist.toml)
    /// 3. Environment variables (prefixed with PUNCHLIST__)
    pub fn load() -> Result<Self> {
        let defaults = Config::try_from(&PunchlistConfig::default())?;

        let mut builder = Config::builder().add_source(defaults);

        if Path::new("punchlist.toml").exists() {
            builder = builder.add_source(File::with_name("punchlist"));
        }

        builder = builder.add_source(
            Environment::with_prefix("PUNCHLIST")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let mut punchlist_config: PunchlistConfig = config.try_deserialize()?;

        // Special handling for the token secret - check a plain env var too
        if punchlist_config.auth.token_secret.is_none() {
            if let Ok(secret) = std::env::var("PUNCHLIST_TOKEN_SECRET") {
                punchlist_config.auth.token_secret = Some(secret);
            }
        }

        Ok(punchlist_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}
