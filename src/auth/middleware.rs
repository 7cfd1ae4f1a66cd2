use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use std::sync::Arc;

use crate::auth::{Claims, Role, TokenSigner};
use crate::server::error::ApiError;

/// Route-group middleware: verify the bearer token and inject the actor's
/// claims into request extensions for handlers to read.
pub async fn require_auth(
    State(signer): State<Arc<TokenSigner>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let Some(token) = token else {
        tracing::debug!("no bearer token in Authorization header");
        return Err(ApiError::unauthorized("bearer token required"));
    };

    let claims = signer.verify(token, Utc::now()).map_err(|e| {
        tracing::warn!(error = %e, "bearer token rejected");
        ApiError::unauthorized("invalid bearer token")
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Handler-level role gate.
pub fn require_role(claims: &Claims, min: Role) -> Result<(), ApiError> {
    if claims.role >= min {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!(
            "requires {} role or higher",
            min.as_str()
        )))
    }
}
