// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access token records and the principal attached to authenticated requests.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::scope::ScopeValue;

/// Reference to the user that owns a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PrincipalRef(pub String);

impl PrincipalRef {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self(user_id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An access token as stored by the backend.
///
/// Tokens are issued and persisted elsewhere; this crate only reads them.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The secret string presented by clients.
    pub key: String,
    /// User the token was issued to.
    pub owner: PrincipalRef,
    /// Instant after which the token is no longer accepted.
    pub expires_at: DateTime<Utc>,
    /// Granted scope, in the backend's representation.
    pub scope: ScopeValue,
    /// Application the token was issued for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

impl Token {
    pub fn new(
        key: impl Into<String>,
        owner: PrincipalRef,
        expires_at: DateTime<Utc>,
        scope: impl Into<ScopeValue>,
    ) -> Self {
        Self {
            key: key.into(),
            owner,
            expires_at,
            scope: scope.into(),
            client_id: None,
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Strict comparison: a token expiring exactly at `now` is still valid.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

// Keys are bearer secrets and must not end up in logs.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("key", &redact_key(&self.key))
            .field("owner", &self.owner)
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .field("client_id", &self.client_id)
            .finish()
    }
}

/// Identity attached to a request after authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "user_id", rename_all = "lowercase")]
pub enum Principal {
    /// Set when the presented credential was structurally broken.
    Anonymous,
    /// The owner of a valid token.
    User(PrincipalRef),
}

impl Principal {
    pub fn user(&self) -> Option<&PrincipalRef> {
        match self {
            Principal::User(owner) => Some(owner),
            Principal::Anonymous => None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Principal::Anonymous)
    }
}

/// The raw key that authenticated the request, for downstream consumers.
#[derive(Clone, PartialEq, Eq)]
pub struct ConsumerKey(pub String);

impl ConsumerKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ConsumerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConsumerKey")
            .field(&redact_key(&self.0))
            .finish()
    }
}

/// Shortened form of a key that is safe to log: up to four characters and a mask.
pub fn redact_key(key: &str) -> String {
    let prefix: String = key.chars().take(4).collect();
    format!("{prefix}***")
}
