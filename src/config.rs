//! Startup configuration read from the process environment (and `.env`).

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::page::DEFAULT_SERVER_LIMIT;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_DB_FILE: &str = "db/todos.json";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name}=`{value}` is not a valid socket address")]
    InvalidAddr { name: &'static str, value: String },
    #[error("{name}=`{value}` must be a positive integer")]
    InvalidLimit { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// JSON document on local disk.
    File(PathBuf),
    /// sqlx connection URL for the relational table.
    Database(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub store: StoreConfig,
    pub default_limit: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `DATABASE_URL` selects the table store; otherwise `TODO_DB_FILE` (or its default) is used.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = addr.parse().map_err(|_| ConfigError::InvalidAddr { name: "BIND_ADDR", value: addr.clone() })?;

        let store = match lookup("DATABASE_URL").filter(|url| !url.is_empty()) {
            Some(url) => StoreConfig::Database(url),
            None => StoreConfig::File(lookup("TODO_DB_FILE").unwrap_or_else(|| DEFAULT_DB_FILE.to_string()).into()),
        };

        let default_limit = match lookup("TODO_DEFAULT_LIMIT") {
            None => DEFAULT_SERVER_LIMIT,
            Some(value) => match value.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::InvalidLimit { name: "TODO_DEFAULT_LIMIT", value }),
            },
        };

        Ok(Self { bind_addr, store, default_limit })
    }
}

/// Settings for the terminal client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub log_file: Option<PathBuf>,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_url: lookup("TODO_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            log_file: lookup("TODO_TUI_LOG").map(PathBuf::from),
        }
    }
}

/// Ensure the file behind a `sqlite://` URL can be created/opened.
pub fn prepare_sqlite_file(database_url: &str) -> std::io::Result<()> {
    if database_url.contains(":memory:") { return Ok(()); }
    if let Some(path) = database_url.strip_prefix("sqlite://") {
        let path = path.split('?').next().unwrap_or(path);
        // On Windows, absolute paths may look like /C:/path; strip the leading slash
        let path = if cfg!(windows) && path.len() >= 3 && path.as_bytes()[0] == b'/' && path.as_bytes()[2] == b':' {
            &path[1..]
        } else {
            path
        };
        use std::{fs, fs::OpenOptions, path::Path};
        let p = Path::new(path);
        if let Some(parent) = p.parent() { if !parent.as_os_str().is_empty() { fs::create_dir_all(parent)?; } }
        if !p.exists() {
            OpenOptions::new().create(true).append(true).open(p)?;
        }
    }
    Ok(())
}
