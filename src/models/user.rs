use serde::{Deserialize, Serialize};

/// Identity record stored in the user index, keyed by username.
/// Only the bcrypt hash is persisted, never the password itself.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
}

/// Claims carried by the HS256 access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// subject / username
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}
