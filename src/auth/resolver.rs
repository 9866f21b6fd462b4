// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token lookup and expiry validation.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::backend::{BackendError, TokenBackend};
use super::error::OAuthError;
use super::token::Token;

/// Resolves raw keys into valid tokens through the configured backend.
#[derive(Clone)]
pub struct TokenResolver {
    backend: Arc<dyn TokenBackend>,
}

impl TokenResolver {
    pub fn new(backend: Arc<dyn TokenBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &dyn TokenBackend {
        self.backend.as_ref()
    }

    /// Resolve `key` against the current time.
    pub fn resolve(&self, key: &str) -> Result<Token, OAuthError> {
        self.resolve_at(key, Utc::now())
    }

    /// Resolve `key`, treating `now` as the current time.
    ///
    /// Callers are expected to pass a non-empty key; an empty one never
    /// reaches the backend.
    pub fn resolve_at(&self, key: &str, now: DateTime<Utc>) -> Result<Token, OAuthError> {
        if key.is_empty() {
            return Err(OAuthError::TokenNotFound);
        }

        let token = self
            .backend
            .find_token(key)
            .map_err(|BackendError::Unavailable(reason)| OAuthError::BackendUnavailable(reason))?
            .ok_or(OAuthError::TokenNotFound)?;

        if token.is_expired_at(now) {
            return Err(OAuthError::TokenExpired);
        }
        Ok(token)
    }
}
