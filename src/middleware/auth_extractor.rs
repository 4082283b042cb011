use actix_web::error::{ErrorInternalServerError, ErrorUnauthorized};
use actix_web::{Error, FromRequest, HttpRequest, dev::Payload, web};
use futures::future::{Ready, ready};

use crate::services::auth_services::AuthService;

/// Identity of the verified caller, extracted before any handler logic
/// runs. Handlers take this as a parameter; a missing or invalid token
/// short-circuits the request with 401.
pub struct AuthenticatedUser {
    pub username: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<AuthenticatedUser, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let auth_header = match req.headers().get("Authorization") {
            Some(header) => match header.to_str() {
                Ok(h) => h,
                Err(_) => return ready(Err(ErrorUnauthorized("Invalid header format"))),
            },
            None => return ready(Err(ErrorUnauthorized("Missing Authorization header"))),
        };

        if !auth_header.starts_with("Bearer ") {
            return ready(Err(ErrorUnauthorized("Invalid auth header format")));
        }
        let token = auth_header.trim_start_matches("Bearer ").trim();

        let auth = match req.app_data::<web::Data<AuthService>>() {
            Some(svc) => svc,
            None => return ready(Err(ErrorInternalServerError("auth service not configured"))),
        };

        match auth.verify_token(token) {
            Ok(username) => ready(Ok(AuthenticatedUser { username })),
            Err(_) => ready(Err(ErrorUnauthorized("Invalid token"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::http::header::HeaderValue;
    use actix_web::test::TestRequest;

    use crate::config::Config;
    use crate::repositories::search_repository::SearchRepository;

    fn auth_service() -> AuthService {
        let config = Config {
            bind_address: "0.0.0.0:8080".into(),
            elasticsearch_url: "http://localhost:9200".into(),
            post_index: "around-posts".into(),
            user_index: "around-users".into(),
            storage_url: "http://localhost:54321".into(),
            storage_bucket: "post-images".into(),
            storage_service_key: "service-key".into(),
            jwt_secret: "test-secret".into(),
        };
        let search = SearchRepository::new(&config).unwrap();
        AuthService::new(search, &config)
    }

    async fn extract(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
        AuthenticatedUser::from_request(req, &mut Payload::None).await
    }

    fn status_of(err: Error) -> StatusCode {
        err.as_response_error().status_code()
    }

    #[actix_web::test]
    async fn missing_header_is_unauthorized() {
        let req = TestRequest::default()
            .app_data(web::Data::new(auth_service()))
            .to_http_request();
        let err = extract(&req).await.err().unwrap();
        assert_eq!(status_of(err), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn non_bearer_scheme_is_unauthorized() {
        let req = TestRequest::default()
            .app_data(web::Data::new(auth_service()))
            .insert_header(("Authorization", "Basic dXNlcjpwdw=="))
            .to_http_request();
        let err = extract(&req).await.err().unwrap();
        assert_eq!(status_of(err), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn non_utf8_header_is_unauthorized() {
        let req = TestRequest::default()
            .app_data(web::Data::new(auth_service()))
            .insert_header((
                "Authorization",
                HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap(),
            ))
            .to_http_request();
        let err = extract(&req).await.err().unwrap();
        assert_eq!(status_of(err), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn garbage_bearer_token_is_unauthorized() {
        let req = TestRequest::default()
            .app_data(web::Data::new(auth_service()))
            .insert_header(("Authorization", "Bearer not-a-token"))
            .to_http_request();
        let err = extract(&req).await.err().unwrap();
        assert_eq!(status_of(err), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn valid_token_yields_username() {
        let svc = auth_service();
        let token = svc.issue_token("jack").unwrap();
        let req = TestRequest::default()
            .app_data(web::Data::new(svc))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_http_request();
        let user = extract(&req).await.unwrap();
        assert_eq!(user.username, "jack");
    }
}
