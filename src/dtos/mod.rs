pub mod auth_dtos;
pub mod post_dtos;

pub use auth_dtos as auth;
