//! JWT token service with a per-session state machine.
//!
//! Every login or refresh mints a *session*: an access/refresh pair sharing
//! a session id (`sid` claim). Sessions move `Active -> Rotated` when their
//! refresh token is consumed and `Active -> Revoked` on logout. Terminal
//! states are kept in the table rather than deleted, so reuse of a stale
//! refresh token is observable and logged.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use taskwell_core::ports::{AccessClaims, AuthError, SessionState, TokenPair, TokenService};

const TOKEN_TYPE_ACCESS: &str = "access";
const TOKEN_TYPE_REFRESH: &str = "refresh";

/// JWT token service configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_hours: i64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            access_ttl_minutes: 15,
            refresh_ttl_hours: 7 * 24,
            issuer: "taskwell-api".to_string(),
        }
    }
}

/// Internal JWT claims structure for serialization.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user_id
    sid: String, // session id shared by both tokens of a pair
    typ: String, // "access" or "refresh"
    exp: i64,
    iat: i64,
    iss: String,
}

struct Session {
    user_id: u64,
    state: SessionState,
    refresh_expires_at: i64,
}

/// JWT-based token service backed by an in-memory session table.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: JwtConfig,
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            encoding_key,
            decoding_key,
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").unwrap_or_else(|_| "change-me-in-production".to_string());

        if secret == "change-me-in-production" {
            let is_production = std::env::var("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false);

            if is_production {
                tracing::error!(
                    "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
                );
            } else {
                tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
            }
        }

        let config = JwtConfig {
            secret,
            access_ttl_minutes: std::env::var("ACCESS_TTL_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(15),
            refresh_ttl_hours: std::env::var("REFRESH_TTL_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(7 * 24),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "taskwell-api".to_string()),
        };
        Self::new(config)
    }

    /// Sign an access/refresh pair for a user under a fresh session id.
    /// The session is not recorded here; callers insert it while holding
    /// whatever lock their state transition requires.
    fn sign_pair(&self, user_id: u64, session_id: Uuid) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        let access_exp = now + TimeDelta::minutes(self.config.access_ttl_minutes);
        let refresh_exp = now + TimeDelta::hours(self.config.refresh_ttl_hours);

        let access_claims = Claims {
            sub: user_id.to_string(),
            sid: session_id.to_string(),
            typ: TOKEN_TYPE_ACCESS.to_string(),
            exp: access_exp.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };
        let refresh_claims = Claims {
            sub: user_id.to_string(),
            sid: session_id.to_string(),
            typ: TOKEN_TYPE_REFRESH.to_string(),
            exp: refresh_exp.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        let access = encode(&Header::default(), &access_claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let refresh = encode(&Header::default(), &refresh_claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(TokenPair {
            access,
            refresh,
            expires_at: access_exp,
        })
    }

    fn decode(&self, token: &str, expected_type: &str) -> Result<(u64, Uuid), AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        if token_data.claims.typ != expected_type {
            return Err(AuthError::InvalidToken(format!(
                "expected {} token",
                expected_type
            )));
        }

        let user_id = token_data
            .claims
            .sub
            .parse::<u64>()
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let session_id = Uuid::parse_str(&token_data.claims.sid)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok((user_id, session_id))
    }

    /// Drop sessions whose refresh token can no longer be used. Called from
    /// `issue` so the table does not grow without bound.
    fn sweep_expired(&self, sessions: &mut HashMap<Uuid, Session>) {
        let now = Utc::now().timestamp();
        sessions.retain(|_, s| s.refresh_expires_at > now);
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user_id: u64) -> Result<TokenPair, AuthError> {
        let session_id = Uuid::new_v4();
        let pair = self.sign_pair(user_id, session_id)?;

        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| AuthError::InvalidToken("session table poisoned".to_string()))?;
        self.sweep_expired(&mut sessions);
        sessions.insert(
            session_id,
            Session {
                user_id,
                state: SessionState::Active,
                refresh_expires_at: (Utc::now()
                    + TimeDelta::hours(self.config.refresh_ttl_hours))
                .timestamp(),
            },
        );

        Ok(pair)
    }

    fn validate(&self, access_token: &str) -> Result<AccessClaims, AuthError> {
        let (user_id, session_id) = self.decode(access_token, TOKEN_TYPE_ACCESS)?;

        let sessions = self
            .sessions
            .read()
            .map_err(|_| AuthError::InvalidToken("session table poisoned".to_string()))?;
        match sessions.get(&session_id).map(|s| s.state) {
            Some(SessionState::Active) => Ok(AccessClaims {
                user_id,
                session_id,
            }),
            Some(SessionState::Rotated) => Err(AuthError::TokenRotated),
            Some(SessionState::Revoked) => Err(AuthError::TokenRevoked),
            None => Err(AuthError::InvalidToken("unknown session".to_string())),
        }
    }

    fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let (user_id, session_id) = self.decode(refresh_token, TOKEN_TYPE_REFRESH)?;

        // Sign the replacement pair before taking the lock; if the rotation
        // check fails the new session id is simply never recorded.
        let new_session_id = Uuid::new_v4();
        let pair = self.sign_pair(user_id, new_session_id)?;

        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| AuthError::InvalidToken("session table poisoned".to_string()))?;
        let session = sessions
            .get_mut(&session_id)
            .ok_or_else(|| AuthError::InvalidToken("unknown session".to_string()))?;

        match session.state {
            SessionState::Active => {}
            SessionState::Rotated => {
                tracing::warn!(user_id, %session_id, "refresh token reuse detected");
                return Err(AuthError::TokenRotated);
            }
            SessionState::Revoked => return Err(AuthError::TokenRevoked),
        }

        // Old and new session change together under the write lock, so no
        // window exists where both pairs validate.
        session.state = SessionState::Rotated;
        sessions.insert(
            new_session_id,
            Session {
                user_id,
                state: SessionState::Active,
                refresh_expires_at: (Utc::now()
                    + TimeDelta::hours(self.config.refresh_ttl_hours))
                .timestamp(),
            },
        );

        Ok(pair)
    }

    fn revoke(&self, access_token: &str) -> Result<(), AuthError> {
        let (user_id, session_id) = self.decode(access_token, TOKEN_TYPE_ACCESS)?;

        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| AuthError::InvalidToken("session table poisoned".to_string()))?;
        let session = sessions
            .get_mut(&session_id)
            .ok_or_else(|| AuthError::InvalidToken("unknown session".to_string()))?;

        match session.state {
            SessionState::Active => {
                session.state = SessionState::Revoked;
                tracing::debug!(user_id, %session_id, "session revoked");
                Ok(())
            }
            SessionState::Rotated => Err(AuthError::TokenRotated),
            SessionState::Revoked => Err(AuthError::TokenRevoked),
        }
    }
}
