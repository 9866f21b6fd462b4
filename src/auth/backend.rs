// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token backend capability.
//!
//! The backend owns token storage and decides what a scope value means. It is
//! chosen once at startup (see [`BackendKind`]) and shared read-only across
//! requests.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::backends::{InMemoryTokenStore, ProviderBackend, ToolkitBackend};
use super::scope::ScopeValue;
use super::token::Token;

/// Failure talking to the token store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("token store unavailable: {0}")]
    Unavailable(String),
}

/// A scope value the backend cannot evaluate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeCheckError {
    /// The value uses a representation this backend does not support.
    #[error("scope value {0} is not supported by this backend")]
    UnsupportedValue(ScopeValue),
    /// A named scope is missing from the backend's scope table.
    #[error("unknown scope name {0:?}")]
    UnknownScopeName(String),
}

/// Storage and scope semantics of an OAuth provider.
pub trait TokenBackend: Send + Sync {
    /// Exact-match lookup of a token by its key.
    fn find_token(&self, key: &str) -> Result<Option<Token>, BackendError>;

    /// Whether `token` grants the single scope `candidate`.
    fn allows_scope(&self, candidate: &ScopeValue, token: &Token)
        -> Result<bool, ScopeCheckError>;
}

/// Which backend implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Space-delimited text scopes.
    #[default]
    Toolkit,
    /// Integer bitmask scopes.
    Provider,
}

impl BackendKind {
    /// Build the backend over a shared token store.
    pub fn build(self, store: Arc<InMemoryTokenStore>) -> Arc<dyn TokenBackend> {
        match self {
            BackendKind::Toolkit => Arc::new(ToolkitBackend::new(store)),
            BackendKind::Provider => Arc::new(ProviderBackend::new(store)),
        }
    }
}

/// Error for a backend name that matches no implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no token backend named {0:?}")]
pub struct UnknownBackend(pub String);

impl FromStr for BackendKind {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "toolkit" | "oauth2_toolkit" => Ok(BackendKind::Toolkit),
            "provider" | "oauth2_provider" => Ok(BackendKind::Provider),
            _ => Err(UnknownBackend(s.to_string())),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Toolkit => write!(f, "toolkit"),
            BackendKind::Provider => write!(f, "provider"),
        }
    }
}
