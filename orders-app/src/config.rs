//! Configuration loading from environment.

use std::env;

/// Application configuration.
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Shared secret for provider webhook signatures. Loaded once at
    /// startup; never mutated at runtime.
    pub webhook_secret: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let webhook_secret = env::var("PROVIDER_WEBHOOK_SECRET").map_err(|_| {
            anyhow::anyhow!("PROVIDER_WEBHOOK_SECRET environment variable is required")
        })?;
        if webhook_secret.is_empty() {
            anyhow::bail!("PROVIDER_WEBHOOK_SECRET must not be empty");
        }

        Ok(Self {
            port,
            database_url,
            webhook_secret,
        })
    }
}
