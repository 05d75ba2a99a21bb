use std::{env, net::SocketAddr, path::PathBuf};

use anyhow::Context;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://todos.db";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api/v1";
pub const DEFAULT_TUI_LOG: &str = "todo-tui.log";

/// Settings for both binaries, read from the environment (after `.env`).
///
/// Values only one binary needs are kept raw and checked by that binary, so a bad
/// `TODO_BIND_ADDR` stops the server but not the terminal client.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub api_url: String,
    /// Where the terminal client logs, if anywhere.
    pub tui_log: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Config {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr: lookup("TODO_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            api_url: lookup("TODO_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            tui_log: lookup("TODO_TUI_LOG").map(|value| tui_log_path(&value)),
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        self.bind_addr.parse().with_context(|| format!("invalid TODO_BIND_ADDR {:?}", self.bind_addr))
    }
}

// A bare switch (`1`, `true`, empty) means the default file; anything else is the path.
fn tui_log_path(value: &str) -> PathBuf {
    match value.trim() {
        "" | "1" | "true" | "yes" | "on" => PathBuf::from(DEFAULT_TUI_LOG),
        path => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.socket_addr().unwrap().port(), 8000);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.tui_log, None);
    }

    #[test]
    fn overrides() {
        let config = Config::from_lookup(|key| match key {
            "TODO_API_URL" => Some("http://todo.local/api/v1/".into()),
            "DATABASE_URL" => Some("sqlite::memory:".into()),
            _ => None,
        });
        assert_eq!(config.api_url, "http://todo.local/api/v1");
        assert_eq!(config.database_url, "sqlite::memory:");
    }

    #[test]
    fn bad_bind_addr_only_fails_when_asked_for() {
        let config = Config::from_lookup(|key| (key == "TODO_BIND_ADDR").then(|| "nope".to_string()));
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn tui_log_switch_or_path() {
        for switch in ["1", "true", ""] {
            let config = Config::from_lookup(|key| (key == "TODO_TUI_LOG").then(|| switch.to_string()));
            assert_eq!(config.tui_log, Some(PathBuf::from(DEFAULT_TUI_LOG)));
        }
        let config = Config::from_lookup(|key| (key == "TODO_TUI_LOG").then(|| "/tmp/board.log".to_string()));
        assert_eq!(config.tui_log, Some(PathBuf::from("/tmp/board.log")));
    }
}
