mod config;
mod dtos;
mod handlers;
mod middleware;
mod models;
mod repositories;
mod services;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Logger, web};
use log::{error, info};
use reqwest::Client;

use crate::config::Config;
use crate::handlers::auth_handlers::{login, signup};
use crate::handlers::post_handlers::{create_post, search_posts};
use crate::repositories::search_repository::SearchRepository;
use crate::repositories::storage_repository::StorageRepository;
use crate::services::auth_services::AuthService;

#[derive(Clone)]
pub struct AppState {
    pub search: SearchRepository,
    pub storage: StorageRepository,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    dotenv::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let search = match SearchRepository::new(&config) {
        Ok(search) => search,
        Err(e) => {
            error!("failed to build search client: {}", e);
            std::process::exit(1);
        }
    };

    // Startup-only hard failure; request-time index errors are returned as
    // error responses instead.
    if let Err(e) = search.bootstrap().await {
        error!("failed to prepare indices: {}", e);
        std::process::exit(1);
    }
    info!("post and user indices ready");

    let http_client = Client::builder()
        .user_agent("around-be/0.1")
        .build()
        .expect("failed to build http client");

    let storage = StorageRepository::new(http_client, &config);
    let auth_data = web::Data::new(AuthService::new(search.clone(), &config));
    let state = web::Data::new(AppState { search, storage });

    let bind_address = config.bind_address.clone();
    info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec!["authorization", "content-type", "accept"])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .app_data(auth_data.clone())
            .service(signup) // POST /signup
            .service(login) // POST /login
            .service(create_post) // POST /post
            .service(search_posts) // GET /search
    })
    .bind(&bind_address)?
    .run()
    .await
}
