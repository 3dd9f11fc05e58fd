//! TOML configuration.
//!
//! ```toml
//! [db]
//! path = "./data/chat-search.sqlite"
//!
//! [server]
//! bind = "127.0.0.1:7341"
//!
//! [search]
//! concurrent_discovery = true
//!
//! [logging]
//! filter = "chat_search=info"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use chat_search_core::ResolverOptions;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Run the title/message pass and document discovery concurrently.
    #[serde(default = "default_concurrent_discovery")]
    pub concurrent_discovery: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            concurrent_discovery: true,
        }
    }
}

fn default_concurrent_discovery() -> bool {
    true
}

impl SearchConfig {
    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            concurrent_discovery: self.concurrent_discovery,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directives; `RUST_LOG` overrides.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "chat_search=info,chat_search_core=info".to_string()
}

impl Config {
    /// Configuration with a database at `db_path` and every other
    /// setting at its default.
    pub fn with_db_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db: DbConfig {
                path: db_path.into(),
                max_connections: default_max_connections(),
            },
            server: ServerConfig {
                bind: "127.0.0.1:7341".to_string(),
            },
            search: SearchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&content)?;
    Ok(config)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.db.path.as_os_str().is_empty() {
        anyhow::bail!("db.path must not be empty");
    }

    if config.db.max_connections == 0 {
        anyhow::bail!("db.max_connections must be >= 1");
    }

    config
        .server
        .bind
        .parse::<SocketAddr>()
        .with_context(|| format!("server.bind is not a socket address: '{}'", config.server.bind))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[db]
path = "./data/chat.sqlite"

[server]
bind = "127.0.0.1:7341"
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let cfg = parse_config(MINIMAL).unwrap();
        assert_eq!(cfg.db.path, PathBuf::from("./data/chat.sqlite"));
        assert_eq!(cfg.db.max_connections, 5);
        assert!(cfg.search.concurrent_discovery);
        assert_eq!(cfg.logging.filter, "chat_search=info,chat_search_core=info");
    }

    #[test]
    fn test_search_section_overrides() {
        let content = format!("{}\n[search]\nconcurrent_discovery = false\n", MINIMAL);
        let cfg = parse_config(&content).unwrap();
        assert!(!cfg.search.resolver_options().concurrent_discovery);
    }

    #[test]
    fn test_rejects_bad_bind() {
        let content = MINIMAL.replace("127.0.0.1:7341", "not-an-address");
        let err = parse_config(&content).unwrap_err();
        assert!(err.to_string().contains("server.bind"));
    }

    #[test]
    fn test_rejects_empty_db_path() {
        let content = MINIMAL.replace("./data/chat.sqlite", "");
        assert!(parse_config(&content).is_err());
    }

    #[test]
    fn test_missing_server_section_fails() {
        let content = "[db]\npath = \"x.sqlite\"\n";
        assert!(parse_config(content).is_err());
    }
}
