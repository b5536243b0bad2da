use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use taskhub_core::new_id;
use taskhub_sql::Value;

use crate::model::{AccessClaims, RefreshClaims, Session, TokenPair, User};
use crate::service::{AuthError, AuthService};

impl AuthService {
    /// Issue a stateless access token for a user with a caller-chosen
    /// TTL (15 min at login/signup, 1 min through refresh).
    pub fn issue_access(&self, user_id: &str, ttl_secs: i64) -> Result<String, AuthError> {
        self.issue_access_at(user_id, ttl_secs, Utc::now())
    }

    fn issue_access_at(
        &self,
        user_id: &str,
        ttl_secs: i64,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = AccessClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + chrono::Duration::seconds(ttl_secs)).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.access_secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(format!("JWT encode failed: {}", e)))
    }

    /// Verify an access token and return the subject user id.
    ///
    /// Pure signature + expiry check — no store round-trip, safe to
    /// call concurrently from every request.
    pub fn verify_access(&self, token: &str) -> Result<String, AuthError> {
        let token_data = decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.config.access_secret.as_bytes()),
            &strict_validation(),
        )
        .map_err(map_jwt_error)?;

        Ok(token_data.claims.sub)
    }

    /// Issue a token pair for a user: a stateless access token plus a
    /// refresh token backed by a new session row.
    pub fn issue_tokens(&self, user: &User, access_ttl: i64) -> Result<TokenPair, AuthError> {
        let session_id = new_id();
        let now = Utc::now();
        let refresh_exp = now + chrono::Duration::seconds(self.config.refresh_ttl);

        let refresh_claims = RefreshClaims {
            sub: user.id.clone(),
            sid: session_id.clone(),
            iat: now.timestamp(),
            exp: refresh_exp.timestamp(),
        };

        let refresh_token = encode(
            &Header::default(),
            &refresh_claims,
            &EncodingKey::from_secret(self.config.refresh_secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(format!("JWT encode failed: {}", e)))?;

        let access_token = self.issue_access_at(&user.id, access_ttl, now)?;

        let session = Session {
            id: session_id,
            user_id: user.id.clone(),
            issued_at: now.to_rfc3339(),
            expires_at: refresh_exp.to_rfc3339(),
            revoked: false,
        };

        self.insert_record(
            "sessions",
            &session.id,
            &session,
            &[
                ("user_id", Value::Text(session.user_id.clone())),
                ("revoked", Value::Integer(0)),
                ("issued_at", Value::Text(session.issued_at.clone())),
                ("expires_at", Value::Text(session.expires_at.clone())),
            ],
        )?;

        Ok(TokenPair {
            access_token,
            expires_in: access_ttl,
            refresh_token,
            refresh_max_age: self.config.refresh_ttl,
        })
    }

    /// Verify a refresh token: signature, expiry, live session, and a
    /// still-existing subject identity.
    pub fn verify_refresh(&self, token: &str) -> Result<(User, Session), AuthError> {
        let token_data = decode::<RefreshClaims>(
            token,
            &DecodingKey::from_secret(self.config.refresh_secret.as_bytes()),
            &strict_validation(),
        )
        .map_err(map_jwt_error)?;

        let claims = token_data.claims;

        let session: Session = self
            .get_record("sessions", &claims.sid)
            .map_err(|_| AuthError::SessionNotFound(claims.sid.clone()))?;

        if session.revoked {
            return Err(AuthError::SessionNotFound(format!(
                "session {} has been revoked",
                session.id
            )));
        }

        let user: User = self
            .get_record("users", &claims.sub)
            .map_err(|_| AuthError::SessionNotFound(format!(
                "subject {} no longer exists",
                claims.sub
            )))?;

        Ok((user, session))
    }

    /// Rotate a refresh session: verify, revoke the old session, and
    /// issue a fresh pair. The access token minted here gets the short
    /// refresh-path TTL.
    pub fn refresh(&self, token: &str) -> Result<(User, TokenPair), AuthError> {
        let (user, session) = self.verify_refresh(token)?;

        self.revoke_session(&session.id)?;

        let pair = self.issue_tokens(&user, self.config.refresh_access_ttl)?;
        Ok((user, pair))
    }

    /// Revoke the session behind a refresh token (logout).
    ///
    /// Idempotent: an unparseable token or an already-dead session is a
    /// success no-op, so logout never fails for the caller.
    pub fn revoke(&self, token: &str) -> Result<(), AuthError> {
        let claims = match decode::<RefreshClaims>(
            token,
            &DecodingKey::from_secret(self.config.refresh_secret.as_bytes()),
            &strict_validation(),
        ) {
            Ok(data) => data.claims,
            Err(_) => return Ok(()),
        };

        if let Ok(session) = self.get_record::<Session>("sessions", &claims.sid) {
            if !session.revoked {
                self.revoke_session(&session.id)?;
            }
        }
        Ok(())
    }

    /// Mark a session revoked.
    fn revoke_session(&self, session_id: &str) -> Result<(), AuthError> {
        let mut session: Session = self.get_record("sessions", session_id)?;
        session.revoked = true;

        self.update_record(
            "sessions",
            session_id,
            &session,
            &[("revoked", Value::Integer(1))],
        )?;

        tracing::debug!(session_id = %session_id, "session revoked");
        Ok(())
    }

    /// Get a session by id.
    pub fn get_session(&self, id: &str) -> Result<Session, AuthError> {
        self.get_record("sessions", id)
    }

    /// List live sessions for a user, newest first.
    pub fn list_user_sessions(&self, user_id: &str) -> Result<Vec<Session>, AuthError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM sessions WHERE user_id = ?1 AND revoked = 0 ORDER BY issued_at DESC",
                &[Value::Text(user_id.to_string())],
            )
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        let mut sessions = Vec::new();
        for row in &rows {
            if let Some(data) = row.get_str("data") {
                let session: Session =
                    serde_json::from_str(data).map_err(|e| AuthError::Internal(e.to_string()))?;
                sessions.push(session);
            }
        }
        Ok(sessions)
    }
}

/// Exact expiry validation — no leeway window, so a token is dead the
/// second its `exp` passes.
fn strict_validation() -> Validation {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation.leeway = 0;
    validation
}

/// Collapse jsonwebtoken errors into the two cases callers distinguish.
fn map_jwt_error(e: jsonwebtoken::errors::Error) -> AuthError {
    match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::TokenInvalid(e.to_string()),
    }
}
