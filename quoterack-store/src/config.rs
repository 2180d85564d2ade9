use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// `postgres://` selects the hosted backend, `sqlite:` the embedded
    /// file-backed one. Decided once at startup.
    pub url: String,
    pub max_connections: u32,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            // Defaults stand alone so no config file is required to run
            // against the local embedded store.
            .set_default("server.port", 8080_i64)?
            .set_default("database.url", "sqlite://quoterack.db")?
            .set_default("database.max_connections", 5_i64)?
            .add_source(config::File::with_name("config/default").required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `QUOTERACK__SERVER__PORT=9000`
            .add_source(config::Environment::with_prefix("QUOTERACK").separator("__"));

        // Hosting platforms hand out a bare DATABASE_URL; it wins over
        // everything else.
        if let Ok(url) = env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", url)?;
        }

        builder.build()?.try_deserialize()
    }
}
