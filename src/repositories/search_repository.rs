// Elasticsearch access for posts (geo-indexed) and user records.
use elasticsearch::{
    Elasticsearch, GetParts, IndexParts, SearchParts,
    http::transport::{BuildError, SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    params::Refresh,
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;
use thiserror::Error;
use url::Url;

use crate::config::Config;
use crate::models::post::Post;
use crate::models::user::UserRecord;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid Elasticsearch URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to build transport: {0}")]
    TransportBuild(#[from] BuildError),
    #[error("transport error: {0}")]
    Transport(#[from] elasticsearch::Error),
    #[error("index responded with status {0}")]
    BadStatus(u16),
}

#[derive(Clone)]
pub struct SearchRepository {
    client: Elasticsearch,
    post_index: String,
    user_index: String,
}

impl SearchRepository {
    pub fn new(config: &Config) -> Result<Self, SearchError> {
        let parsed = Url::parse(&config.elasticsearch_url)?;
        let pool = SingleNodeConnectionPool::new(parsed);
        let transport = TransportBuilder::new(pool).build()?;

        Ok(Self {
            client: Elasticsearch::new(transport),
            post_index: config.post_index.clone(),
            user_index: config.user_index.clone(),
        })
    }

    /// Create the post and user indices if they do not exist yet. The post
    /// index maps `location` as `geo_point`, which is what makes the
    /// geo_distance query work.
    pub async fn bootstrap(&self) -> Result<(), SearchError> {
        self.ensure_index(
            &self.post_index,
            json!({
                "mappings": {
                    "properties": {
                        "user": { "type": "keyword" },
                        "message": { "type": "text" },
                        "location": { "type": "geo_point" },
                        "url": { "type": "keyword" }
                    }
                }
            }),
        )
        .await?;

        self.ensure_index(
            &self.user_index,
            json!({
                "mappings": {
                    "properties": {
                        "username": { "type": "keyword" },
                        "password_hash": { "type": "keyword" }
                    }
                }
            }),
        )
        .await
    }

    async fn ensure_index(
        &self,
        index: &str,
        mapping: serde_json::Value,
    ) -> Result<(), SearchError> {
        let exists = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await?;

        if exists.status_code().is_success() {
            return Ok(());
        }

        let created = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(mapping)
            .send()
            .await?;

        if !created.status_code().is_success() {
            return Err(SearchError::BadStatus(created.status_code().as_u16()));
        }

        Ok(())
    }

    /// Index a post under the generated id with refresh=true so it is
    /// visible to the next search immediately, no eventual-consistency
    /// window.
    pub async fn index_post(&self, id: &str, post: &Post) -> Result<(), SearchError> {
        let response = self
            .client
            .index(IndexParts::IndexId(&self.post_index, id))
            .refresh(Refresh::True)
            .body(post)
            .send()
            .await?;

        if !response.status_code().is_success() {
            return Err(SearchError::BadStatus(response.status_code().as_u16()));
        }

        Ok(())
    }

    /// All posts within `range_km` kilometers of the given coordinate, in
    /// whatever order the index returns them.
    pub async fn geo_search(
        &self,
        lat: f64,
        lon: f64,
        range_km: f64,
    ) -> Result<Vec<Post>, SearchError> {
        let response = self
            .client
            .search(SearchParts::Index(&[self.post_index.as_str()]))
            .body(geo_distance_body(lat, lon, range_km))
            .send()
            .await?;

        if !response.status_code().is_success() {
            return Err(SearchError::BadStatus(response.status_code().as_u16()));
        }

        let result: SearchResponse<Post> = response.json().await?;
        Ok(result.into_sources())
    }

    pub async fn find_user(&self, username: &str) -> Result<Option<UserRecord>, SearchError> {
        let response = self
            .client
            .get(GetParts::IndexId(&self.user_index, username))
            .send()
            .await?;

        // 404 means no such user, not a transport failure.
        let result: GetResponse<UserRecord> = response.json().await?;
        if result.found {
            Ok(result.source)
        } else {
            Ok(None)
        }
    }

    /// Store an identity record keyed by username. Refreshes so a login
    /// straight after signup sees the record.
    pub async fn create_user(&self, record: &UserRecord) -> Result<(), SearchError> {
        let response = self
            .client
            .index(IndexParts::IndexId(&self.user_index, &record.username))
            .refresh(Refresh::True)
            .body(record)
            .send()
            .await?;

        if !response.status_code().is_success() {
            return Err(SearchError::BadStatus(response.status_code().as_u16()));
        }

        Ok(())
    }
}

fn geo_distance_body(lat: f64, lon: f64, range_km: f64) -> serde_json::Value {
    json!({
        "size": 10000,
        "query": {
            "bool": {
                "filter": {
                    "geo_distance": {
                        "distance": format!("{}km", range_km),
                        "location": { "lat": lat, "lon": lon }
                    }
                }
            }
        }
    })
}

// Schema-bound decode of search hits; only `_source` is of interest.
#[derive(Debug, Deserialize)]
struct SearchResponse<T> {
    hits: InnerHits<T>,
}

#[derive(Debug, Deserialize)]
struct InnerHits<T> {
    hits: Vec<Hit<T>>,
}

#[derive(Debug, Deserialize)]
struct Hit<T> {
    #[serde(rename = "_source")]
    source: Option<T>,
}

impl<T: DeserializeOwned> SearchResponse<T> {
    fn into_sources(self) -> Vec<T> {
        self.hits
            .hits
            .into_iter()
            .filter_map(|hit| hit.source)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct GetResponse<T> {
    found: bool,
    #[serde(rename = "_source")]
    source: Option<T>,
}
