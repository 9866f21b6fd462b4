// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request credential extraction and verification.
//!
//! ## Extraction order
//!
//! The first source yielding a non-empty key wins:
//!
//! 1. Query parameter `oauth_consumer_key`
//! 2. `Authorization` header, then `HTTP_AUTHORIZATION` (for proxies that keep
//!    the CGI-style name); the value is `<scheme> <key>` and the scheme is ignored
//! 3. `oauth_consumer_key` field of a JSON body, for POST requests only

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Query, Request},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderMap, HeaderName, Method, Uri,
    },
};
use tracing::{debug, error, info, warn};

use super::backend::TokenBackend;
use super::error::OAuthError;
use super::resolver::TokenResolver;
use super::scope::ScopePolicy;
use super::token::{redact_key, ConsumerKey, Principal, Token};

/// Name of the query parameter and JSON body field carrying the key.
pub const CONSUMER_KEY_PARAM: &str = "oauth_consumer_key";

/// `Authorization` as renamed by CGI-style intermediaries.
pub const HTTP_AUTHORIZATION: HeaderName = HeaderName::from_static("http_authorization");

pub const DEFAULT_REALM: &str = "API";

/// Upper bound on buffered JSON bodies (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Outcome of authenticating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// A valid token was presented.
    Authenticated(Principal),
    /// No credential was offered; another authenticator may still accept the request.
    Unauthenticated,
    /// A credential was offered and refused.
    Rejected,
}

/// Authenticates requests against a token backend, optionally enforcing scopes.
#[derive(Clone)]
pub struct OAuthGate {
    resolver: TokenResolver,
    scopes: Option<ScopePolicy>,
    realm: String,
    max_body_bytes: usize,
}

impl OAuthGate {
    /// Gate that only checks that the token exists and has not expired.
    pub fn new(backend: Arc<dyn TokenBackend>) -> Self {
        Self {
            resolver: TokenResolver::new(backend),
            scopes: None,
            realm: DEFAULT_REALM.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Gate that additionally requires the token to satisfy `policy`.
    pub fn scoped(backend: Arc<dyn TokenBackend>, policy: ScopePolicy) -> Self {
        Self {
            scopes: Some(policy),
            ..Self::new(backend)
        }
    }

    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    pub fn scope_policy(&self) -> Option<&ScopePolicy> {
        self.scopes.as_ref()
    }

    /// Resolve `key` and, for a scoped gate, check it against the policy for `method`.
    pub fn verify(&self, key: &str, method: &Method) -> Result<Token, OAuthError> {
        let token = self.resolver.resolve(key)?;
        if let Some(policy) = &self.scopes {
            policy.check_scope(self.resolver.backend(), &token, method)?;
        }
        Ok(token)
    }

    /// Authenticate `request`.
    ///
    /// On success the [`Principal`] and the [`ConsumerKey`] are inserted into
    /// the request extensions. A structurally malformed credential leaves
    /// [`Principal::Anonymous`] behind. The request is handed back because a
    /// JSON body may have been buffered and reattached.
    pub async fn authenticate(&self, request: Request) -> (Request, AuthOutcome) {
        let (mut request, extracted) = self.extract_key(request).await;

        let key = match extracted {
            Ok(Some(key)) => key,
            Ok(None) => {
                debug!(method = %request.method(), uri = %request.uri().path(), "no consumer key found");
                return (request, AuthOutcome::Unauthenticated);
            }
            Err(err) => {
                warn!(reason = err.kind(), "rejected malformed credential");
                request.extensions_mut().insert(Principal::Anonymous);
                return (request, AuthOutcome::Rejected);
            }
        };

        match self.verify(&key, request.method()) {
            Ok(token) => {
                info!(
                    owner = %token.owner,
                    client_id = token.client_id.as_deref().unwrap_or("-"),
                    key = %redact_key(&key),
                    "valid access"
                );
                let principal = Principal::User(token.owner);
                request.extensions_mut().insert(principal.clone());
                request.extensions_mut().insert(ConsumerKey(key));
                (request, AuthOutcome::Authenticated(principal))
            }
            Err(err) if err.is_configuration_fault() => {
                error!(
                    reason = err.kind(),
                    key = %redact_key(&key),
                    error = %err,
                    "oauth gate misconfigured"
                );
                (request, AuthOutcome::Rejected)
            }
            Err(err) => {
                warn!(
                    reason = err.kind(),
                    key = %redact_key(&key),
                    method = %request.method(),
                    "access token rejected"
                );
                (request, AuthOutcome::Rejected)
            }
        }
    }

    async fn extract_key(&self, request: Request) -> (Request, Result<Option<String>, OAuthError>) {
        if let Some(key) = key_from_query(request.uri()) {
            return (request, Ok(Some(key)));
        }

        match key_from_headers(request.headers()) {
            Ok(None) => {}
            found => return (request, found),
        }

        if request.method() == Method::POST && is_json(request.headers()) {
            return self.key_from_body(request).await;
        }
        (request, Ok(None))
    }

    /// Buffer the body, look for the key field and put the bytes back.
    async fn key_from_body(&self, request: Request) -> (Request, Result<Option<String>, OAuthError>) {
        let (parts, body) = request.into_parts();
        match to_bytes(body, self.max_body_bytes).await {
            Ok(bytes) => {
                let key = serde_json::from_slice::<serde_json::Value>(&bytes)
                    .ok()
                    .and_then(|value| {
                        value
                            .get(CONSUMER_KEY_PARAM)
                            .and_then(serde_json::Value::as_str)
                            .map(str::to_string)
                    })
                    .filter(|key| !key.is_empty());
                (Request::from_parts(parts, Body::from(bytes)), Ok(key))
            }
            Err(err) => {
                warn!(error = %err, limit = self.max_body_bytes, "could not buffer request body");
                (
                    Request::from_parts(parts, Body::empty()),
                    Err(OAuthError::MalformedCredential),
                )
            }
        }
    }
}

fn key_from_query(uri: &Uri) -> Option<String> {
    let Query(params) = Query::<HashMap<String, String>>::try_from_uri(uri).ok()?;
    params
        .get(CONSUMER_KEY_PARAM)
        .filter(|key| !key.is_empty())
        .cloned()
}

/// Only the first present, non-empty header is considered.
fn key_from_headers(headers: &HeaderMap) -> Result<Option<String>, OAuthError> {
    for name in [AUTHORIZATION, HTTP_AUTHORIZATION] {
        let Some(value) = headers.get(&name).filter(|value| !value.is_empty()) else {
            continue;
        };
        let value = value.to_str().map_err(|_| OAuthError::MalformedCredential)?;
        let (_scheme, key) = value
            .split_once(' ')
            .ok_or(OAuthError::MalformedCredential)?;
        return Ok(Some(key.to_string()).filter(|key| !key.is_empty()));
    }
    Ok(None)
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
}
