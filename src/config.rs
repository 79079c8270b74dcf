//! Server configuration from environment variables, with defaults.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// sqlx connection string; file databases are created when missing.
    pub url: String,
    pub max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig { host: "127.0.0.1".to_string(), port: 3000 },
            database: DatabaseConfig { url: "sqlite://todos.db".to_string(), max_connections: 5 },
        }
    }
}

impl Config {
    /// Reads `HOST`, `PORT`, `DATABASE_URL` and `DATABASE_MAX_CONNECTIONS`.
    /// Missing or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            server: ServerConfig {
                host: lookup("HOST").unwrap_or(defaults.server.host),
                port: lookup("PORT").and_then(|p| p.parse().ok()).unwrap_or(defaults.server.port),
            },
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").unwrap_or(defaults.database.url),
                max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                    .and_then(|n| n.parse().ok())
                    .unwrap_or(defaults.database.max_connections),
            },
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
