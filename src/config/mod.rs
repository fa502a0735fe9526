//! Configuration module for the RAG status backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Insert the default roster on startup when it is missing
    pub seed_members: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path = env::var("RAG_DB_PATH")
            .unwrap_or_else(|_| "./data/status.sqlite".to_string())
            .into();

        let bind_addr = env::var("RAG_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid RAG_BIND_ADDR format");

        let log_level = env::var("RAG_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let seed_members = env::var("RAG_SEED_MEMBERS")
            .map(|v| parse_flag(&v))
            .unwrap_or(true);

        Self {
            db_path,
            bind_addr,
            log_level,
            seed_members,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("RAG_DB_PATH");
        env::remove_var("RAG_BIND_ADDR");
        env::remove_var("RAG_LOG_LEVEL");
        env::remove_var("RAG_SEED_MEMBERS");

        let config = Config::from_env();

        assert_eq!(config.db_path, PathBuf::from("./data/status.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert!(config.seed_members);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(" NO "));
        assert!(!parse_flag("0"));
    }
}
