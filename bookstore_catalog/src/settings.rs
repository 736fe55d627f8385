use anyhow::Context;
use serde::Deserialize;

const ENV_PREFIX: &str = "BOOKSTORE";

/// Service settings, every field can be overridden with a `BOOKSTORE_` prefixed env variable
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub use_in_memory_db: bool,
    pub mongo_connection_string: String,
    pub database_name: String,
    pub collection_name: String,
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        Self::from_env(config::Environment::with_prefix(ENV_PREFIX))
    }

    fn from_env(environment: config::Environment) -> anyhow::Result<Self> {
        config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8080)?
            .set_default("use_in_memory_db", false)?
            .set_default("mongo_connection_string", "mongodb://127.0.0.1:27017")?
            .set_default("database_name", "bookstore")?
            .set_default("collection_name", "books")?
            .add_source(environment.try_parsing(true))
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
