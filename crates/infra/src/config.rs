//! Configuration loading and representation.
//!
//! Everything comes from environment variables (optionally seeded from a
//! `.env` file):
//!
//! | Variable | Default |
//! |---|---|
//! | `FITCLUB_BIND_ADDR` | `0.0.0.0:8080` |
//! | `DATABASE_URL` | unset: in-memory store |
//! | `FITCLUB_DB_MAX_CONNECTIONS` | `10` |
//! | `JWT_SECRET` | development secret |
//! | `FITCLUB_ACCESS_TOKEN_MINUTES` | `5` |
//! | `FITCLUB_REFRESH_TOKEN_HOURS` | `24` |
//! | `FITCLUB_PAGE_SIZE` | unset: lists are not paginated |
//! | `FITCLUB_LOG_FORMAT` | `json` |
//! | `FITCLUB_BOOTSTRAP_USER` / `FITCLUB_BOOTSTRAP_PASSWORD` | unset: no account is seeded |

use chrono::Duration;
use core::str::FromStr;
use std::net::SocketAddr;
use thiserror::Error;

use fitclub_observability::LogFormat;

pub const DEV_JWT_SECRET: &str = "fitclub-dev-secret-change-me";

/// Upper bound for either token lifetime (about a hundred years).
const MAX_TOKEN_TTL_DAYS: i64 = 36_500;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Account created at startup when no account with that username exists.
#[derive(Clone, PartialEq, Eq)]
pub struct BootstrapAccount {
    pub username: String,
    pub password: String,
}

impl core::fmt::Debug for BootstrapAccount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BootstrapAccount")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub page_size: Option<usize>,
    pub log_format: LogFormat,
    pub bootstrap_account: Option<BootstrapAccount>,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let access_minutes: i64 = parsed(&get, "FITCLUB_ACCESS_TOKEN_MINUTES", 5)?;
        let refresh_hours: i64 = parsed(&get, "FITCLUB_REFRESH_TOKEN_HOURS", 24)?;
        positive("FITCLUB_ACCESS_TOKEN_MINUTES", access_minutes)?;
        positive("FITCLUB_REFRESH_TOKEN_HOURS", refresh_hours)?;
        let access_token_ttl = ttl("FITCLUB_ACCESS_TOKEN_MINUTES", access_minutes, Duration::try_minutes)?;
        let refresh_token_ttl = ttl("FITCLUB_REFRESH_TOKEN_HOURS", refresh_hours, Duration::try_hours)?;

        let page_size = match get("FITCLUB_PAGE_SIZE") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => Some(n),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "FITCLUB_PAGE_SIZE",
                        value: raw,
                    });
                }
            },
            None => None,
        };

        let db_max_connections: u32 = parsed(&get, "FITCLUB_DB_MAX_CONNECTIONS", 10)?;
        positive("FITCLUB_DB_MAX_CONNECTIONS", i64::from(db_max_connections))?;

        let bootstrap_account = match (get("FITCLUB_BOOTSTRAP_USER"), get("FITCLUB_BOOTSTRAP_PASSWORD")) {
            (Some(username), Some(password)) => Some(BootstrapAccount { username, password }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::Invalid {
                    key: "FITCLUB_BOOTSTRAP_PASSWORD",
                    value: String::new(),
                });
            }
            (None, Some(_)) => {
                return Err(ConfigError::Invalid {
                    key: "FITCLUB_BOOTSTRAP_USER",
                    value: String::new(),
                });
            }
        };

        Ok(Self {
            bind_addr: parsed(&get, "FITCLUB_BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            database_url: get("DATABASE_URL"),
            db_max_connections,
            jwt_secret: get("JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string()),
            access_token_ttl,
            refresh_token_ttl,
            page_size,
            log_format: parsed(&get, "FITCLUB_LOG_FORMAT", LogFormat::Json)?,
            bootstrap_account,
        })
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

fn parsed<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

/// Token lifetimes must fit a `Duration` and leave room for `now + ttl`.
fn ttl(key: &'static str, value: i64, make: fn(i64) -> Option<Duration>) -> Result<Duration, ConfigError> {
    make(value)
        .filter(|d| *d <= Duration::days(MAX_TOKEN_TTL_DAYS))
        .ok_or_else(|| ConfigError::Invalid {
            key,
            value: value.to_string(),
        })
}

fn positive(key: &'static str, value: i64) -> Result<(), ConfigError> {
    if value > 0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        })
    }
}
