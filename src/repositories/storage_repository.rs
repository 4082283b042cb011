use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),
}

/// Object-store client for image blobs. Uploads land in a single bucket
/// whose objects are publicly readable; the key is the post id.
#[derive(Clone)]
pub struct StorageRepository {
    client: Client,
    base_url: String,
    bucket: String,
    service_key: String,
}

impl StorageRepository {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.storage_url.trim_end_matches('/').to_string(),
            bucket: config.storage_bucket.clone(),
            service_key: config.storage_service_key.clone(),
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, key)
    }

    /// Address anyone can read the object from after upload.
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, key
        )
    }

    fn headers(&self, content_type: &str) -> Result<HeaderMap, StorageError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.service_key))?,
        );
        Ok(headers)
    }

    /// Upload raw image bytes under `key` and return the public URL.
    pub async fn upload_image(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let resp = self
            .client
            .post(self.object_url(key))
            .headers(self.headers(content_type)?)
            .body(bytes)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(StorageError::Storage(format!(
                "upload failed: {} {}",
                status.as_u16(),
                text
            )));
        }

        Ok(self.public_url(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> StorageRepository {
        let config = Config {
            bind_address: "0.0.0.0:8080".into(),
            elasticsearch_url: "http://localhost:9200".into(),
            post_index: "around-posts".into(),
            user_index: "around-users".into(),
            storage_url: "https://store.example/".into(),
            storage_bucket: "post-images".into(),
            storage_service_key: "service-key".into(),
            jwt_secret: "secret".into(),
        };
        StorageRepository::new(Client::new(), &config)
    }

    #[test]
    fn object_and_public_urls() {
        let repo = repo();
        assert_eq!(
            repo.object_url("abc"),
            "https://store.example/storage/v1/object/post-images/abc"
        );
        assert_eq!(
            repo.public_url("abc"),
            "https://store.example/storage/v1/object/public/post-images/abc"
        );
    }
}
