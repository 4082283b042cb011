use serde::Deserialize;

/// Raw query parameters for `/search`. Kept as strings so malformed decimal
/// values coerce to 0.0 instead of failing extraction with a 400.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    /// Radius in kilometers; defaults to 200 when absent.
    pub range: Option<String>,
}
