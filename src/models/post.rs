use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

/// The indexed post document. The generated UUID is the Elasticsearch `_id`
/// and the object-store key; it is not part of the document body and is
/// never exposed to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub user: String,
    pub message: String,
    pub location: Location,
    /// Public image address; empty string when the post carries no image.
    #[serde(default)]
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_source_without_url() {
        let raw = r#"{"user":"jack","message":"hello","location":{"lat":37.0,"lon":-122.0}}"#;
        let post: Post = serde_json::from_str(raw).unwrap();
        assert_eq!(post.user, "jack");
        assert_eq!(post.location.lat, 37.0);
        assert!(post.url.is_empty());
    }

    #[test]
    fn serializes_empty_url_as_empty_string() {
        let post = Post {
            user: "jack".into(),
            message: "hello".into(),
            location: Location { lat: 1.0, lon: 2.0 },
            url: String::new(),
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["url"], "");
    }
}
