use std::env;
use anyhow::{Context, Result};

/// Runtime configuration, read once at startup and handed to each component
/// at construction. All post/user state lives in Elasticsearch; image blobs
/// live in the object-store bucket.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub elasticsearch_url: String,
    pub post_index: String,
    pub user_index: String,
    pub storage_url: String,
    pub storage_bucket: String,
    pub storage_service_key: String,
    pub jwt_secret: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());

        Ok(Self {
            bind_address: format!("0.0.0.0:{}", port),
            elasticsearch_url: env::var("ELASTICSEARCH_URL")
                .context("ELASTICSEARCH_URL not set")?,
            post_index: env::var("POST_INDEX").unwrap_or_else(|_| "around-posts".to_string()),
            user_index: env::var("USER_INDEX").unwrap_or_else(|_| "around-users".to_string()),
            storage_url: env::var("STORAGE_URL").context("STORAGE_URL not set")?,
            storage_bucket: env::var("STORAGE_BUCKET")
                .unwrap_or_else(|_| "post-images".to_string()),
            storage_service_key: env::var("STORAGE_SERVICE_KEY")
                .context("STORAGE_SERVICE_KEY not set")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET not set")?,
        })
    }
}
