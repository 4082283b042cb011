use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct SignupIn {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginIn {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SessionOut {
    pub token: String,
}
