use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// Name of the cookie carrying the session token.
    pub cookie_name: String,
    /// Directory attachments are written to and served from under `/uploads`.
    pub upload_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "blogx".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "blogx-users".into()),
        };
        let cookie_name = std::env::var("AUTH_COOKIE").unwrap_or_else(|_| "token".into());
        let upload_dir = std::env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("uploads"));
        Ok(Self {
            database_url,
            jwt,
            cookie_name,
            upload_dir,
        })
    }
}
