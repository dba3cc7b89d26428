//! Authorization gate for protected operations.
//!
//! The gate is stateless: it parses the `Authorization` header, verifies the
//! bearer token and yields the caller's user id. Any failure short-circuits
//! before the protected operation runs. Failures are never retried.

use uuid::Uuid;

use crate::ports::{AuthError, TokenService};

const BEARER: &str = "Bearer";

/// Extract the raw token from an `Authorization` header value.
///
/// The value must be exactly two space-separated parts, the first being the
/// literal `Bearer`.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header
        .filter(|h| !h.is_empty())
        .ok_or_else(|| AuthError::MalformedHeader("authorization header is required".to_string()))?;

    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(BEARER), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::MalformedHeader(
            "invalid authorization format, expected 'Bearer TOKEN'".to_string(),
        )),
    }
}

/// Run the gate: extract the bearer token and verify it.
pub fn authorize(header: Option<&str>, tokens: &dyn TokenService) -> Result<Uuid, AuthError> {
    let token = extract_bearer(header)?;
    tokens.verify_token(token)
}
