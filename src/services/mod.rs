pub mod auth_services;
pub mod content_filter;
