use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder signing secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me", "dev-secret-change-me"];

/// Process configuration, resolved once at startup and handed down
/// explicitly. No component reads the environment after this.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub static_dir: String,
}

impl Config {
    /// Running without a real signing secret would mean issuing tokens
    /// anyone can forge, so that is startup-fatal rather than a default.
    pub fn from_env() -> Result<Self> {
        let jwt_secret = std::env::var("PARLEY_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("PARLEY_JWT_SECRET is unset or still a placeholder; refusing to start");
        }

        let host = std::env::var("PARLEY_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("PARLEY_PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .context("PARLEY_PORT must be a port number")?;
        let db_path: PathBuf = std::env::var("PARLEY_DB_PATH")
            .unwrap_or_else(|_| "parley.db".into())
            .into();
        let static_dir = std::env::var("PARLEY_STATIC_DIR").unwrap_or_else(|_| "static".into());

        Ok(Self {
            host,
            port,
            db_path,
            jwt_secret,
            static_dir,
        })
    }
}
