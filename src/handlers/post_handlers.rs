use actix_multipart::Multipart;
use actix_web::{HttpResponse, get, post, web};
use futures::StreamExt;
use log::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::dtos::post_dtos::SearchQuery;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::models::post::{Location, Post};
use crate::services::content_filter::contains_banned_words;

/// Search radius applied when the client sends no `range` parameter.
const DEFAULT_RANGE_KM: f64 = 200.0;

#[derive(serde::Serialize)]
struct ApiResponse {
    status: String,
    message: String,
}

fn server_error(message: &str) -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse {
        status: "error".to_string(),
        message: message.to_string(),
    })
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse {
        status: "error".to_string(),
        message: message.to_string(),
    })
}

/// POST /post — multipart form with `message`, `lat`, `lon` and an optional
/// `image` part. The image (when present) is uploaded first; the post is
/// then indexed under a fresh UUID with refresh forced, so it is visible to
/// the next search. Any object-store or index failure aborts with 500.
#[post("/post")]
pub async fn create_post(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    mut payload: Multipart,
) -> HttpResponse {
    let mut message = String::new();
    let mut lat_raw = String::new();
    let mut lon_raw = String::new();
    let mut image: Option<(Vec<u8>, String)> = None;

    while let Some(item) = payload.next().await {
        let mut field = match item {
            Ok(field) => field,
            Err(e) => return bad_request(&format!("malformed multipart payload: {}", e)),
        };

        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name())
            .unwrap_or("")
            .to_string();
        let content_type = field
            .content_type()
            .map(|m| m.to_string())
            .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            match chunk {
                Ok(data) => bytes.extend_from_slice(&data),
                Err(e) => {
                    error!("failed reading multipart field {}: {}", name, e);
                    return bad_request("failed to read upload");
                }
            }
        }

        match name.as_str() {
            "message" => message = String::from_utf8_lossy(&bytes).into_owned(),
            "lat" => lat_raw = String::from_utf8_lossy(&bytes).into_owned(),
            "lon" => lon_raw = String::from_utf8_lossy(&bytes).into_owned(),
            "image" => image = Some((bytes, content_type)),
            _ => {} // unknown parts ignored
        }
    }

    // id doubles as the index record key and the object-store key
    let id = Uuid::new_v4().to_string();

    let url = match image {
        Some((bytes, content_type)) => {
            match state.storage.upload_image(&id, bytes, &content_type).await {
                Ok(url) => url,
                Err(e) => {
                    error!("image upload failed for post {}: {}", id, e);
                    return server_error("failed to store image");
                }
            }
        }
        None => String::new(),
    };

    let post = Post {
        user: user.username,
        message,
        location: Location {
            lat: parse_coord(&lat_raw),
            lon: parse_coord(&lon_raw),
        },
        url,
    };

    match state.search.index_post(&id, &post).await {
        Ok(()) => {
            info!("post {} saved to index", id);
            HttpResponse::Ok().json(ApiResponse {
                status: "success".to_string(),
                message: format!("Post received: {}", post.message),
            })
        }
        Err(e) => {
            error!("failed to index post {}: {}", id, e);
            server_error("failed to save post")
        }
    }
}

/// GET /search?lat=..&lon=..&range=.. — geo-distance query around the given
/// coordinate. Posts whose message hits the block list are dropped from the
/// result set entirely.
#[get("/search")]
pub async fn search_posts(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    query: web::Query<SearchQuery>,
) -> HttpResponse {
    let lat = parse_coord(query.lat.as_deref().unwrap_or(""));
    let lon = parse_coord(query.lon.as_deref().unwrap_or(""));
    let range_km = parse_range(query.range.as_deref());

    match state.search.geo_search(lat, lon, range_km).await {
        Ok(posts) => {
            let visible: Vec<Post> = posts
                .into_iter()
                .filter(|post| !contains_banned_words(&post.message))
                .collect();
            HttpResponse::Ok().json(visible)
        }
        Err(e) => {
            error!("geo search failed: {}", e);
            server_error("failed to search posts")
        }
    }
}

/// Malformed or missing decimals silently become 0.0, never a client error.
fn parse_coord(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(0.0)
}

fn parse_range(raw: Option<&str>) -> f64 {
    raw.and_then(|r| r.trim().parse().ok())
        .unwrap_or(DEFAULT_RANGE_KM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coord_parses_valid_decimal() {
        assert_eq!(parse_coord("37.5"), 37.5);
        assert_eq!(parse_coord(" -122.08 "), -122.08);
    }

    #[test]
    fn malformed_coord_becomes_zero() {
        assert_eq!(parse_coord("abc"), 0.0);
        assert_eq!(parse_coord(""), 0.0);
        assert_eq!(parse_coord("37.5N"), 0.0);
    }

    #[test]
    fn range_defaults_to_200km() {
        assert_eq!(parse_range(None), 200.0);
        assert_eq!(parse_range(Some("oops")), 200.0);
    }

    #[test]
    fn explicit_range_wins() {
        assert_eq!(parse_range(Some("1")), 1.0);
        assert_eq!(parse_range(Some("0.5")), 0.5);
    }
}
