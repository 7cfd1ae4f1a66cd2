// Bearer-token authentication: self-contained signed claims, verified by
// router middleware. Roles gate workflow and admin actions at the HTTP
// layer; the engine itself is role-agnostic.

pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::store::{User, UserStore};

pub use middleware::{require_auth, require_role};
pub use token::{Claims, TokenSigner};

/// Actor roles, ordered by privilege. Derived ordering means
/// `role >= Role::Pm` reads as "PM or higher".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Technician,
    Pm,
    Admin,
    Superadmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Technician => "technician",
            Role::Pm => "pm",
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "technician" => Some(Role::Technician),
            "pm" => Some(Role::Pm),
            "admin" => Some(Role::Admin),
            "superadmin" => Some(Role::Superadmin),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("malformed token")]
    MalformedToken,
    #[error("invalid token signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("token secret is not configured; set PUNCHLIST_TOKEN_SECRET")]
    MissingSecret,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Login flow: verify credentials against the user store and issue a
/// signed bearer token.
#[derive(Clone)]
pub struct AuthService {
    users: UserStore,
    signer: Arc<TokenSigner>,
    token_ttl: chrono::Duration,
}

impl AuthService {
    pub fn new(users: UserStore, signer: Arc<TokenSigner>, token_ttl_hours: i64) -> Self {
        Self {
            users,
            signer,
            token_ttl: chrono::Duration::hours(token_ttl_hours),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(String, User), AuthError> {
        let Some(user) = self.users.fetch_by_email(email).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        if !password::verify_password(password, &user.password_hash) {
            tracing::warn!(email = %user.email, "login failed: bad password");
            return Err(AuthError::InvalidCredentials);
        }

        let claims = Claims {
            id: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            exp: (chrono::Utc::now() + self.token_ttl).timestamp(),
        };
        let token = self.signer.issue(&claims);

        tracing::info!(email = %user.email, role = user.role.as_str(), "login succeeded");
        Ok((token, user))
    }
}
