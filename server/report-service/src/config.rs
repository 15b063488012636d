//! Service configuration read from the environment (`.env` is honoured).

use std::env;
use std::net::{IpAddr, SocketAddr};

use flag_engine::TokenKey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("DATABASE_URL must be set")]
  MissingDatabaseUrl,
  #[error("REPORT_TOKEN_SECRET must be set")]
  MissingTokenSecret,
  #[error("PORT must be a valid u16")]
  InvalidPort,
  #[error("BIND_ADDR must parse to an IPv4 or IPv6 address")]
  InvalidBindAddr(#[source] std::net::AddrParseError),
  #[error("DB_MAX_CONNECTIONS must be a positive integer")]
  InvalidMaxConnections,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
  pub database_url: String,
  /// Derived from REPORT_TOKEN_SECRET; keys report tokens and anonymised submitters.
  pub token_key: TokenKey,
  pub bind_addr: IpAddr,
  pub port: u16,
  pub max_connections: u32,
  /// Fallback filter when RUST_LOG is unset.
  pub log_level: String,
}

impl ServiceConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    dotenvy::dotenv().ok();
    Self::from_lookup(|key| env::var(key).ok())
  }

  /// Build from any key lookup; `from_env` passes the process environment.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
    let database_url = lookup("DATABASE_URL")
      .filter(|v| !v.trim().is_empty())
      .ok_or(ConfigError::MissingDatabaseUrl)?;

    let token_key = lookup("REPORT_TOKEN_SECRET")
      .filter(|v| !v.trim().is_empty())
      .map(|secret| TokenKey::from_secret(&secret))
      .ok_or(ConfigError::MissingTokenSecret)?;

    let port = lookup("PORT")
      .unwrap_or_else(|| "5005".into())
      .parse::<u16>()
      .map_err(|_| ConfigError::InvalidPort)?;

    let bind_addr = lookup("BIND_ADDR")
      .unwrap_or_else(|| "127.0.0.1".into())
      .parse::<IpAddr>()
      .map_err(ConfigError::InvalidBindAddr)?;

    let max_connections = match lookup("DB_MAX_CONNECTIONS") {
      Some(v) => v
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or(ConfigError::InvalidMaxConnections)?,
      None => 5,
    };

    let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".into());

    Ok(Self {
      database_url,
      token_key,
      bind_addr,
      port,
      max_connections,
      log_level,
    })
  }

  pub fn socket_addr(&self) -> SocketAddr {
    SocketAddr::new(self.bind_addr, self.port)
  }
}
