use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use regex::Regex;
use thiserror::Error;

use crate::config::Config;
use crate::dtos::auth::{LoginIn, SignupIn};
use crate::models::user::{Claims, UserRecord};
use crate::repositories::search_repository::{SearchError, SearchRepository};

/// Access tokens are valid for 24 hours.
const TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("search backend error: {0}")]
    Search(#[from] SearchError),
    #[error("invalid token")]
    InvalidToken,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("username already taken")]
    UserExists,
    #[error("username must be lowercase letters, digits or underscore")]
    InvalidUsername,
    #[error("password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("token error: {0}")]
    Token(String),
}

/// Signup/login against the user index plus HS256 token issue/verify with
/// the pre-shared secret.
#[derive(Clone)]
pub struct AuthService {
    search: SearchRepository,
    jwt_secret: String,
    username_re: Regex,
}

impl AuthService {
    pub fn new(search: SearchRepository, config: &Config) -> Self {
        Self {
            search,
            jwt_secret: config.jwt_secret.clone(),
            // compiled once; the pattern is a constant
            username_re: Regex::new(r"^[a-z0-9_]+$").expect("username pattern is valid"),
        }
    }

    pub async fn signup(&self, input: SignupIn) -> Result<(), AuthError> {
        let username = input.username.trim();
        if username.is_empty() || !self.username_re.is_match(username) {
            return Err(AuthError::InvalidUsername);
        }
        if input.password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        if self.search.find_user(username).await?.is_some() {
            return Err(AuthError::UserExists);
        }

        let record = UserRecord {
            username: username.to_string(),
            password_hash: bcrypt::hash(&input.password, bcrypt::DEFAULT_COST)?,
        };
        self.search.create_user(&record).await?;

        Ok(())
    }

    /// Verify credentials against the user index and hand out a signed
    /// token on success.
    pub async fn login(&self, input: LoginIn) -> Result<String, AuthError> {
        let record = self
            .search
            .find_user(input.username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !bcrypt::verify(&input.password, &record.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_token(&record.username)
    }

    pub fn issue_token(&self, username: &str) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: username.to_string(),
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::Token(e.to_string()))
    }

    /// Check the signature (and expiry) and return the username claim.
    pub fn verify_token(&self, token: &str) -> Result<String, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| AuthError::InvalidToken)?;

        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> AuthService {
        let config = Config {
            bind_address: "0.0.0.0:8080".into(),
            elasticsearch_url: "http://localhost:9200".into(),
            post_index: "around-posts".into(),
            user_index: "around-users".into(),
            storage_url: "http://localhost:54321".into(),
            storage_bucket: "post-images".into(),
            storage_service_key: "service-key".into(),
            jwt_secret: secret.into(),
        };
        let search = SearchRepository::new(&config).unwrap();
        AuthService::new(search, &config)
    }

    #[test]
    fn token_round_trip() {
        let svc = service("test-secret");
        let token = svc.issue_token("jack").unwrap();
        assert_eq!(svc.verify_token(&token).unwrap(), "jack");
    }

    #[test]
    fn token_signed_with_other_key_is_rejected() {
        let svc = service("test-secret");
        let other = service("another-secret");
        let token = other.issue_token("jack").unwrap();
        assert!(matches!(
            svc.verify_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let svc = service("test-secret");
        let mut token = svc.issue_token("jack").unwrap();
        token.pop();
        assert!(svc.verify_token(&token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let svc = service("test-secret");
        assert!(svc.verify_token("not-a-jwt").is_err());
    }

    #[test]
    fn username_pattern() {
        let svc = service("test-secret");
        assert!(svc.username_re.is_match("jack_42"));
        assert!(!svc.username_re.is_match("Jack"));
        assert!(!svc.username_re.is_match("jack smith"));
        assert!(!svc.username_re.is_match(""));
    }
}
