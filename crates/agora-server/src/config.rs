use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, bail};

const PLACEHOLDER_SECRETS: &[&str] = &["dev-secret-change-me", "changeme", "secret"];

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub uploads_dir: PathBuf,
    /// Public base URL of this API, used in confirmation links.
    pub api_base: String,
    /// Frontend origin, used in password recovery links.
    pub frontend_host: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = lookup("AGORA_JWT_SECRET").unwrap_or_default();
        if jwt_secret.trim().is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("AGORA_JWT_SECRET must be set to a real secret");
        }

        let port = var("AGORA_PORT", "3000")
            .parse()
            .context("AGORA_PORT is not a valid port")?;

        let host = var("AGORA_HOST", "0.0.0.0");
        let api_base = lookup("AGORA_API_BASE").unwrap_or_else(|| format!("http://localhost:{port}"));

        Ok(Self {
            host,
            port,
            db_path: var("AGORA_DB_PATH", "agora.db").into(),
            jwt_secret,
            uploads_dir: var("AGORA_UPLOADS_DIR", "uploads").into(),
            api_base: api_base.trim_end_matches('/').to_string(),
            frontend_host: var("AGORA_FRONTEND_HOST", "http://localhost:8080")
                .trim_end_matches('/')
                .to_string(),
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}
