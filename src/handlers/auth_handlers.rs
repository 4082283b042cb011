use actix_web::{HttpResponse, post, web};
use log::error;

use crate::dtos::auth::{LoginIn, SessionOut, SignupIn};
use crate::services::auth_services::{AuthError, AuthService};

#[derive(serde::Serialize)]
struct ApiResponse {
    status: String,
    message: String,
}

#[post("/signup")]
pub async fn signup(svc: web::Data<AuthService>, body: web::Json<SignupIn>) -> HttpResponse {
    match svc.signup(body.into_inner()).await {
        Ok(()) => HttpResponse::Ok().json(ApiResponse {
            status: "success".to_string(),
            message: "User added successfully".to_string(),
        }),
        Err(e @ (AuthError::UserExists | AuthError::InvalidUsername)) => {
            HttpResponse::BadRequest().json(ApiResponse {
                status: "error".to_string(),
                message: e.to_string(),
            })
        }
        Err(AuthError::InvalidCredentials) => HttpResponse::BadRequest().json(ApiResponse {
            status: "error".to_string(),
            message: "password must not be empty".to_string(),
        }),
        Err(e) => {
            error!("signup failed: {}", e);
            HttpResponse::InternalServerError().json(ApiResponse {
                status: "error".to_string(),
                message: "Failed to create user".to_string(),
            })
        }
    }
}

#[post("/login")]
pub async fn login(svc: web::Data<AuthService>, body: web::Json<LoginIn>) -> HttpResponse {
    match svc.login(body.into_inner()).await {
        Ok(token) => HttpResponse::Ok().json(SessionOut { token }),
        Err(AuthError::InvalidCredentials) => HttpResponse::Unauthorized().json(ApiResponse {
            status: "error".to_string(),
            message: "Wrong username or password".to_string(),
        }),
        Err(e) => {
            error!("login failed: {}", e);
            HttpResponse::InternalServerError().json(ApiResponse {
                status: "error".to_string(),
                message: "Failed to log in".to_string(),
            })
        }
    }
}
