// src/config.rs

use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    /// User id the demo endpoints fall back to when a request names no user.
    pub default_user_id: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:escape_plan.db".to_string());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let default_user_id =
            env::var("DEFAULT_USER_ID").unwrap_or_else(|_| "default_user".to_string());

        Self {
            database_url,
            rust_log,
            default_user_id,
        }
    }
}
