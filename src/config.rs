use std::{env, net::SocketAddr, time::Duration};

use reqwest::Url;
use thiserror::Error;

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:3030";

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    /// Per-request deadline. `None` waits for the server indefinitely.
    pub request_timeout: Option<Duration>,
    pub api_token: Option<String>,
    pub bind_addr: String,
    /// Parsed by [`Config::bind_socket`] only when the HTTP transport starts.
    pub bind_port: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("NOTES_RPC_URL must be an absolute http(s) URL")]
    InvalidRpcUrl,
    #[error("NOTES_RPC_TIMEOUT_MS must be a positive integer")]
    InvalidTimeout,
    #[error("MCP_API_TOKEN is required for the http transport and must not be empty")]
    MissingApiToken,
    #[error("BIND_PORT must be a valid u16")]
    InvalidPort,
    #[error("invalid bind address or port")]
    InvalidSocket,
}

/// Values given on the command line, applied on top of the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub rpc_url: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let rpc_url = env::var("NOTES_RPC_URL")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        let request_timeout = env::var("NOTES_RPC_TIMEOUT_MS")
            .ok()
            .map(|value| {
                value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidTimeout)
            })
            .transpose()?
            .map(timeout_from_millis)
            .transpose()?;
        let api_token = env::var("MCP_API_TOKEN")
            .ok()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
        let bind_port = env::var("BIND_PORT")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "8080".to_string());

        let config = Self {
            rpc_url,
            request_timeout,
            api_token,
            bind_addr,
            bind_port,
        };

        config.validate_rpc_url()?;
        Ok(config)
    }

    pub fn apply_overrides(mut self, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        if let Some(rpc_url) = overrides.rpc_url {
            self.rpc_url = rpc_url.trim().to_string();
            self.validate_rpc_url()?;
        }

        if let Some(timeout_ms) = overrides.timeout_ms {
            self.request_timeout = Some(timeout_from_millis(timeout_ms)?);
        }

        Ok(self)
    }

    pub fn require_api_token(&self) -> Result<&str, ConfigError> {
        self.api_token
            .as_deref()
            .ok_or(ConfigError::MissingApiToken)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        let port = self
            .bind_port
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;
        format!("{}:{}", self.bind_addr, port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }

    fn validate_rpc_url(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.rpc_url).map_err(|_| ConfigError::InvalidRpcUrl)?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            _ => Err(ConfigError::InvalidRpcUrl),
        }
    }
}

fn timeout_from_millis(millis: u64) -> Result<Duration, ConfigError> {
    if millis == 0 {
        return Err(ConfigError::InvalidTimeout);
    }
    Ok(Duration::from_millis(millis))
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn clear_env() {
        for key in [
            "NOTES_RPC_URL",
            "NOTES_RPC_TIMEOUT_MS",
            "MCP_API_TOKEN",
            "BIND_ADDR",
            "BIND_PORT",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn parse_defaults() {
        clear_env();

        let config = Config::from_env().expect("config should parse");
        assert_eq!(config.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.api_token, None);
        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.bind_port, "8080");
        assert_eq!(
            config.bind_socket().expect("default socket"),
            "127.0.0.1:8080".parse().expect("socket addr")
        );
    }

    #[test]
    #[serial]
    fn reads_rpc_url_and_timeout() {
        clear_env();
        env::set_var("NOTES_RPC_URL", "http://localhost:4040");
        env::set_var("NOTES_RPC_TIMEOUT_MS", "2500");

        let config = Config::from_env().expect("config should parse");
        assert_eq!(config.rpc_url, "http://localhost:4040");
        assert_eq!(config.request_timeout, Some(Duration::from_millis(2500)));
        clear_env();
    }

    #[test]
    #[serial]
    fn invalid_rpc_url_fails() {
        clear_env();
        env::set_var("NOTES_RPC_URL", "ftp://127.0.0.1:3030");

        let err = Config::from_env().expect_err("expected invalid url error");
        assert!(matches!(err, ConfigError::InvalidRpcUrl));
        clear_env();
    }

    #[test]
    #[serial]
    fn zero_timeout_fails() {
        clear_env();
        env::set_var("NOTES_RPC_TIMEOUT_MS", "0");

        let err = Config::from_env().expect_err("expected invalid timeout error");
        assert!(matches!(err, ConfigError::InvalidTimeout));
        clear_env();
    }

    #[test]
    #[serial]
    fn missing_token_only_fails_when_required() {
        clear_env();

        let config = Config::from_env().expect("config should parse");
        let err = config
            .require_api_token()
            .expect_err("expected missing token error");
        assert!(matches!(err, ConfigError::MissingApiToken));
    }

    #[test]
    #[serial]
    fn overrides_replace_env_values() {
        clear_env();
        env::set_var("NOTES_RPC_URL", "http://localhost:4040");

        let config = Config::from_env()
            .expect("config should parse")
            .apply_overrides(ConfigOverrides {
                rpc_url: Some("http://10.0.0.2:3030".to_string()),
                timeout_ms: Some(100),
            })
            .expect("overrides should apply");

        assert_eq!(config.rpc_url, "http://10.0.0.2:3030");
        assert_eq!(config.request_timeout, Some(Duration::from_millis(100)));
        clear_env();
    }

    #[test]
    #[serial]
    fn https_rpc_url_is_accepted() {
        clear_env();
        env::set_var("NOTES_RPC_URL", "https://notes.internal:3030");

        let config = Config::from_env().expect("config should parse");
        assert_eq!(config.rpc_url, "https://notes.internal:3030");
        clear_env();
    }

    #[test]
    #[serial]
    fn invalid_bind_port_only_fails_when_binding() {
        clear_env();
        env::set_var("BIND_PORT", "abc");

        let config = Config::from_env().expect("config should parse without binding");
        let err = config.bind_socket().expect_err("expected invalid port error");
        assert!(matches!(err, ConfigError::InvalidPort));
        clear_env();
    }

    #[test]
    #[serial]
    fn invalid_override_url_fails() {
        clear_env();

        let err = Config::from_env()
            .expect("config should parse")
            .apply_overrides(ConfigOverrides {
                rpc_url: Some("not a url".to_string()),
                timeout_ms: None,
            })
            .expect_err("expected invalid url error");
        assert!(matches!(err, ConfigError::InvalidRpcUrl));
    }
}
