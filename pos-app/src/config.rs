//! Configuration loading from environment.

use std::env;

use pos_types::ItemDeletePolicy;

/// Application configuration.
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// What deleting a payment without `delete_items` does when items remain.
    pub item_delete_policy: ItemDeletePolicy,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let item_delete_policy = match env::var("ITEM_DELETE_POLICY") {
            Ok(value) => value
                .parse::<ItemDeletePolicy>()
                .map_err(|e| anyhow::anyhow!("ITEM_DELETE_POLICY: {}", e))?,
            Err(_) => ItemDeletePolicy::default(),
        };

        Ok(Self {
            port,
            database_url,
            item_delete_policy,
        })
    }
}
