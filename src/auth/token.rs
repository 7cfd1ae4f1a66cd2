use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::auth::{AuthError, Role};
use crate::config::AuthConfig;

type HmacSha256 = Hmac<Sha256>;

/// Identity carried by a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub email: String,
    pub role: Role,
    /// Expiry as a unix timestamp
    pub exp: i64,
}

/// Signs and verifies self-contained bearer tokens: hex-encoded claims JSON
/// plus an HMAC-SHA256 tag over it, joined by a dot. No server-side session
/// state; verification needs only the shared secret.
pub struct TokenSigner {
    secret: Vec<u8>,
}

impl TokenSigner {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        let secret = config
            .token_secret
            .as_deref()
            .ok_or(AuthError::MissingSecret)?;
        Ok(Self::new(secret.as_bytes().to_vec()))
    }

    pub fn issue(&self, claims: &Claims) -> String {
        let body = serde_json::to_vec(claims).expect("claims serialize to JSON");
        let tag = self.sign(&body);
        format!("{}.{}", hex::encode(&body), hex::encode(tag))
    }

    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let (body_hex, tag_hex) = token.split_once('.').ok_or(AuthError::MalformedToken)?;
        let body = hex::decode(body_hex).map_err(|_| AuthError::MalformedToken)?;
        let tag = hex::decode(tag_hex).map_err(|_| AuthError::MalformedToken)?;

        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC key should be valid");
        mac.update(&body);
        mac.verify_slice(&tag).map_err(|_| AuthError::BadSignature)?;

        let claims: Claims =
            serde_json::from_slice(&body).map_err(|_| AuthError::MalformedToken)?;
        if claims.exp < now.timestamp() {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC key should be valid");
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }
}
