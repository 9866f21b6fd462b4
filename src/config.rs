// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `OAUTH_TOKEN_BACKEND` | Token backend (`toolkit` or `provider`) | `toolkit` |
//! | `OAUTH_REALM` | Realm announced in `WWW-Authenticate` | `API` |
//! | `OAUTH_TOKEN_FIXTURES` | JSON file of tokens loaded at startup | unset |
//! | `OAUTH_MAX_BODY_BYTES` | Largest JSON body buffered for key lookup | `1048576` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::auth::gate::{DEFAULT_MAX_BODY_BYTES, DEFAULT_REALM};
use crate::auth::{BackendKind, UnknownBackend};

pub const TOKEN_BACKEND_ENV: &str = "OAUTH_TOKEN_BACKEND";
pub const REALM_ENV: &str = "OAUTH_REALM";
pub const TOKEN_FIXTURES_ENV: &str = "OAUTH_TOKEN_FIXTURES";
pub const MAX_BODY_BYTES_ENV: &str = "OAUTH_MAX_BODY_BYTES";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("OAUTH_TOKEN_BACKEND: {0}")]
    UnknownBackend(#[from] UnknownBackend),
    #[error("invalid value {value:?} for {name}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub backend: BackendKind,
    pub realm: String,
    pub token_fixtures: Option<PathBuf>,
    pub max_body_bytes: usize,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            realm: DEFAULT_REALM.to_string(),
            token_fixtures: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_format: LogFormat::default(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let defaults = Settings::default();

        let backend = match var(TOKEN_BACKEND_ENV) {
            Some(value) => value.parse()?,
            None => defaults.backend,
        };

        let max_body_bytes = match var(MAX_BODY_BYTES_ENV) {
            Some(value) => parse(MAX_BODY_BYTES_ENV, value)?,
            None => defaults.max_body_bytes,
        };

        let port = match var(PORT_ENV) {
            Some(value) => parse(PORT_ENV, value)?,
            None => defaults.port,
        };

        let log_format = match var(LOG_FORMAT_ENV).map(|v| v.to_lowercase()).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            backend,
            realm: var(REALM_ENV).unwrap_or(defaults.realm),
            token_fixtures: var(TOKEN_FIXTURES_ENV).map(PathBuf::from),
            max_body_bytes,
            host: var(HOST_ENV).unwrap_or(defaults.host),
            port,
            log_format,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::Invalid {
            name: HOST_ENV,
            value: addr,
        })
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}
