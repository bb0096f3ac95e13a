//! Process configuration from environment variables.

use std::net::SocketAddr;

use thiserror::Error;

use osdesk_observability::LogFormat;

const DEFAULT_SESSION_TTL_MINUTES: i64 = 480;
const DEV_JWT_SECRET: &str = "osdesk-dev-secret";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Credentials for the administrator seeded into an empty user table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Postgres URL; `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub session_ttl_minutes: i64,
    pub bootstrap_admin: Option<BootstrapAdmin>,
    pub log_format: LogFormat,
    /// Non-fatal problems found while loading, logged once tracing is up.
    pub warnings: Vec<String>,
}

impl AppConfig {
    /// Load from the process environment.
    ///
    /// | Env Var                     | Default            |
    /// |-----------------------------|--------------------|
    /// | `HOST`                      | `0.0.0.0`          |
    /// | `PORT`                      | `8080`             |
    /// | `DATABASE_URL`              | unset (in-memory)  |
    /// | `DATABASE_MAX_CONNECTIONS`  | `10`               |
    /// | `JWT_SECRET`                | dev secret, warns  |
    /// | `SESSION_TTL_MINUTES`       | `480`              |
    /// | `BOOTSTRAP_ADMIN_USERNAME`  | unset              |
    /// | `BOOTSTRAP_ADMIN_PASSWORD`  | unset              |
    /// | `LOG_FORMAT`                | `json`             |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or("PORT", get("PORT"), 8080u16)?;
        let database_max_connections = parse_or("DATABASE_MAX_CONNECTIONS", get("DATABASE_MAX_CONNECTIONS"), 10u32)?;
        let session_ttl_minutes =
            parse_or("SESSION_TTL_MINUTES", get("SESSION_TTL_MINUTES"), DEFAULT_SESSION_TTL_MINUTES)?;
        if session_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                name: "SESSION_TTL_MINUTES",
                value: session_ttl_minutes.to_string(),
                reason: "must be positive".to_string(),
            });
        }

        let log_format = match get("LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>().map_err(|reason| ConfigError::Invalid {
                name: "LOG_FORMAT",
                value: raw.clone(),
                reason,
            })?,
            None => LogFormat::default(),
        };

        let mut warnings = Vec::new();
        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            warnings.push("JWT_SECRET not set; using insecure dev default".to_string());
            DEV_JWT_SECRET.to_string()
        });

        let bootstrap_admin = match (get("BOOTSTRAP_ADMIN_USERNAME"), get("BOOTSTRAP_ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(BootstrapAdmin { username, password }),
            (Some(_), None) | (None, Some(_)) => {
                warnings.push(
                    "bootstrap admin needs both BOOTSTRAP_ADMIN_USERNAME and BOOTSTRAP_ADMIN_PASSWORD; skipping"
                        .to_string(),
                );
                None
            }
            (None, None) => None,
        };

        Ok(Self {
            host,
            port,
            database_url: get("DATABASE_URL"),
            database_max_connections,
            jwt_secret,
            session_ttl_minutes,
            bootstrap_admin,
            log_format,
            warnings,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr().parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            name: "HOST",
            value: self.host.clone(),
            reason: e.to_string(),
        })
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}
