use serde::{Deserialize, Serialize};

/// A refresh-token session record, used for rotation and revocation.
///
/// Access tokens are stateless; only refresh tokens are backed by a row
/// here. A revoked or expired session authorizes nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session id (UUIDv4, no dashes). Embedded in the refresh JWT as `sid`.
    pub id: String,

    /// User id that owns this session.
    pub user_id: String,

    /// RFC 3339 timestamp when the refresh token was issued.
    pub issued_at: String,

    /// RFC 3339 timestamp when the refresh token expires.
    pub expires_at: String,

    /// Whether this session has been revoked (logout or rotation).
    #[serde(default)]
    pub revoked: bool,
}

/// Claims carried by an access token. Signed with the access secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: user id.
    pub sub: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

/// Claims carried by a refresh token. Signed with the refresh secret,
/// so the two token kinds can never be confused for one another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject: user id.
    pub sub: String,
    /// Session id (for rotation/revoke).
    pub sid: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

/// Tokens issued at login, signup, or refresh.
///
/// Not serialized as-is: the API layer puts the access token in the
/// response body and delivers the refresh token only as an HTTP-only
/// cookie.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub refresh_token: String,
    /// Refresh token lifetime in seconds (cookie Max-Age).
    pub refresh_max_age: i64,
}
