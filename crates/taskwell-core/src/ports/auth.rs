//! Authentication ports - token issuance/validation and password hashing.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// State of an issued token pair (a "session").
///
/// `Rotated` and `Revoked` are terminal: once entered, neither the access
/// token nor the paired refresh token validates again. Rotation and
/// revocation are recorded rather than deleted so that reuse of a stale
/// refresh token is a detectable event, not a silent lookup miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Rotated,
    Revoked,
}

/// An access/refresh token pair bound to one user and one session.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
    pub expires_at: DateTime<Utc>,
}

/// Claims resolved from a validated access token.
#[derive(Debug, Clone)]
pub struct AccessClaims {
    pub user_id: u64,
    pub session_id: Uuid,
}

/// Token service - owns the per-session state machine.
pub trait TokenService: Send + Sync {
    /// Issue a fresh token pair for a user and record the session as Active.
    fn issue(&self, user_id: u64) -> Result<TokenPair, AuthError>;

    /// Validate an access token. Fails if the token is malformed, expired,
    /// or its session is no longer Active.
    fn validate(&self, access_token: &str) -> Result<AccessClaims, AuthError>;

    /// Exchange a refresh token for a new pair, atomically rotating the old
    /// session. Of two concurrent refreshes with the same token, exactly one
    /// succeeds.
    fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;

    /// Revoke the session associated with an access token.
    fn revoke(&self, access_token: &str) -> Result<(), AuthError>;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token has been revoked")]
    TokenRevoked,

    #[error("Token has been rotated")]
    TokenRotated,

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Hashing error: {0}")]
    HashingError(String),
}
