//! Server configuration from environment variables.

use std::env;
use std::time::Duration;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8006;

/// Read and write deadline applied to every request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// How long in-flight requests may run after a shutdown signal.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server port to listen on.
    pub port: u16,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Base URL of the login service, without trailing slash. May be empty.
    pub login_service_url: String,
    /// Base URL of the content service, without trailing slash. May be empty.
    pub content_service_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            log_level: "info".to_string(),
            login_service_url: String::new(),
            content_service_url: String::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `PORT`: Server port (default: 8006)
    /// - `LOG_LEVEL`: Logging level (default: "info")
    /// - `LOGIN_SERVICE_URL`: Token validation service
    /// - `CONTENT_SERVICE_URL`: Upload target for saved notes
    ///
    /// Missing service URLs are not a start-up error; calls that need them
    /// fail instead.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                name: "PORT".to_string(),
                reason: format!("'{}' is not a valid port", raw),
            })?,
            None => DEFAULT_PORT,
        };

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let service_url = |name: &str| {
            lookup(name)
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .unwrap_or_default()
        };

        Ok(Self {
            port,
            log_level,
            login_service_url: service_url("LOGIN_SERVICE_URL"),
            content_service_url: service_url("CONTENT_SERVICE_URL"),
        })
    }

    /// Get the socket address for the server.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = ServerConfig::from_vars(lookup(&[])).unwrap();

        assert_eq!(config.port, 8006);
        assert_eq!(config.log_level, "info");
        assert!(config.login_service_url.is_empty());
        assert!(config.content_service_url.is_empty());
        assert_eq!(config.socket_addr().port(), 8006);
    }

    #[test]
    fn test_service_urls_trimmed() {
        let config = ServerConfig::from_vars(lookup(&[
            ("LOGIN_SERVICE_URL", "http://login:8000/"),
            ("CONTENT_SERVICE_URL", "http://content:8001"),
        ]))
        .unwrap();

        assert_eq!(config.login_service_url, "http://login:8000");
        assert_eq!(config.content_service_url, "http://content:8001");
    }

    #[test]
    fn test_invalid_port() {
        let err = ServerConfig::from_vars(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref name, .. } if name == "PORT"));
    }
}
