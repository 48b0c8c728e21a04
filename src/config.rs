use std::env;

pub const DEFAULT_BUCKET: &str = "exercicios-media";

/// Which backend the console talks to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendConfig {
    /// Local SQLite store, also serving uploaded media itself.
    Sqlite { database_url: String },
    /// Hosted PostgREST + Storage backend.
    Rest { url: String, key: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub backend: BackendConfig,
    pub host: String,
    pub port: u16,
    pub storage_bucket: String,
    pub public_url: String,
    pub backend_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let backend = match (lookup("BACKEND_URL"), lookup("BACKEND_KEY")) {
            (Some(url), Some(key)) if !url.is_empty() => BackendConfig::Rest {
                url: url.trim_end_matches('/').to_string(),
                key,
            },
            _ => BackendConfig::Sqlite {
                database_url: lookup("DATABASE_URL")
                    .unwrap_or_else(|| "sqlite:academy.db?mode=rwc".to_string()),
            },
        };

        Self {
            backend,
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            storage_bucket: lookup("STORAGE_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            public_url: lookup("PUBLIC_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_default(),
            backend_timeout_secs: lookup("BACKEND_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
