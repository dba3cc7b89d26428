//! Authentication ports: bearer tokens and password hashing.

use uuid::Uuid;

/// Token service trait for issuing and verifying bearer tokens.
pub trait TokenService: Send + Sync {
    /// Issue a signed, time-limited token bound to `user_id`.
    fn issue_token(&self, user_id: Uuid) -> Result<String, AuthError>;

    /// Verify signature and expiry, returning the bound user id.
    fn verify_token(&self, token: &str) -> Result<Uuid, AuthError>;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash. A mismatch is `Ok(false)`; only a
    /// malformed hash is an error.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Malformed authorization header: {0}")]
    MalformedHeader(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token is missing the user_id claim")]
    ClaimMissing,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Signing error: {0}")]
    SigningError(String),

    #[error("Hashing error: {0}")]
    HashingError(String),
}

impl AuthError {
    /// Whether the caller failed to authenticate, as opposed to a server fault.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, AuthError::SigningError(_) | AuthError::HashingError(_))
    }
}
