// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-method scope requirements.
//!
//! A [`ScopePolicy`] holds one [`ScopeRequirement`] for each of the five
//! standard verbs. Alternatives inside a requirement are OR-ed; what a single
//! [`ScopeValue`] means is up to the [`TokenBackend`].
//!
//! ```rust
//! use oauth_gate::auth::{HttpMethod, ScopePolicy, ScopeRequirement};
//!
//! let policy = ScopePolicy::builder()
//!     .post("read write")
//!     .get("read")
//!     .put(["read", "write"])
//!     .build();
//!
//! // PATCH inherits PUT's explicit value.
//! assert_eq!(
//!     policy.requirement(HttpMethod::Patch),
//!     policy.requirement(HttpMethod::Put),
//! );
//! assert_eq!(policy.requirement(HttpMethod::Delete), &ScopeRequirement::from("read write"));
//! ```

use std::fmt;

use axum::http::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use super::backend::TokenBackend;
use super::error::OAuthError;
use super::token::Token;

/// A scope in the backend's representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ScopeValue {
    /// Space-delimited scope names, e.g. `"read write"`.
    Text(String),
    /// Bit flags, e.g. `READ | WRITE`.
    Bitmask(u64),
}

impl ScopeValue {
    /// A blank value grants and requires nothing.
    pub fn is_blank(&self) -> bool {
        match self {
            ScopeValue::Text(text) => text.trim().is_empty(),
            ScopeValue::Bitmask(bits) => *bits == 0,
        }
    }
}

impl fmt::Display for ScopeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeValue::Text(text) => f.write_str(text),
            ScopeValue::Bitmask(bits) => write!(f, "{bits:#x}"),
        }
    }
}

impl From<&str> for ScopeValue {
    fn from(value: &str) -> Self {
        ScopeValue::Text(value.to_string())
    }
}

impl From<String> for ScopeValue {
    fn from(value: String) -> Self {
        ScopeValue::Text(value)
    }
}

impl From<u64> for ScopeValue {
    fn from(value: u64) -> Self {
        ScopeValue::Bitmask(value)
    }
}

/// Scope requirement for one HTTP method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ScopeRequirement {
    /// No restriction.
    #[default]
    None,
    /// Exactly this scope must be satisfied.
    Single(ScopeValue),
    /// Any one of these scopes must be satisfied.
    AnyOf(Vec<ScopeValue>),
}

impl ScopeRequirement {
    pub fn any_of<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ScopeValue>,
    {
        ScopeRequirement::AnyOf(scopes.into_iter().map(Into::into).collect()).normalized()
    }

    /// Collapse requirements that carry nothing into [`ScopeRequirement::None`].
    pub fn normalized(self) -> Self {
        match self {
            ScopeRequirement::Single(value) if value.is_blank() => ScopeRequirement::None,
            ScopeRequirement::AnyOf(values) if values.is_empty() => ScopeRequirement::None,
            other => other,
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, ScopeRequirement::None)
    }

    /// Candidate scopes in order; empty when unrestricted.
    pub fn candidates(&self) -> &[ScopeValue] {
        match self {
            ScopeRequirement::None => &[],
            ScopeRequirement::Single(value) => std::slice::from_ref(value),
            ScopeRequirement::AnyOf(values) => values,
        }
    }
}

impl From<ScopeValue> for ScopeRequirement {
    fn from(value: ScopeValue) -> Self {
        ScopeRequirement::Single(value).normalized()
    }
}

impl From<&str> for ScopeRequirement {
    fn from(value: &str) -> Self {
        ScopeValue::from(value).into()
    }
}

impl From<String> for ScopeRequirement {
    fn from(value: String) -> Self {
        ScopeValue::from(value).into()
    }
}

impl From<u64> for ScopeRequirement {
    fn from(value: u64) -> Self {
        ScopeValue::from(value).into()
    }
}

impl<S: Into<ScopeValue>> From<Vec<S>> for ScopeRequirement {
    fn from(values: Vec<S>) -> Self {
        ScopeRequirement::any_of(values)
    }
}

impl<S: Into<ScopeValue>, const N: usize> From<[S; N]> for ScopeRequirement {
    fn from(values: [S; N]) -> Self {
        ScopeRequirement::any_of(values)
    }
}

/// The HTTP methods a [`ScopePolicy`] has slots for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl TryFrom<&Method> for HttpMethod {
    type Error = OAuthError;

    fn try_from(method: &Method) -> Result<Self, Self::Error> {
        match *method {
            Method::GET => Ok(HttpMethod::Get),
            Method::POST => Ok(HttpMethod::Post),
            Method::PUT => Ok(HttpMethod::Put),
            Method::PATCH => Ok(HttpMethod::Patch),
            Method::DELETE => Ok(HttpMethod::Delete),
            _ => Err(OAuthError::MethodNotRecognized(method.to_string())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a passed scope check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeGrant {
    /// The method carries no requirement.
    Unrestricted,
    /// The candidates the token satisfied. Informational; the token is not narrowed.
    Matched(Vec<ScopeValue>),
}

/// Required scopes keyed by HTTP method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopePolicy {
    get: ScopeRequirement,
    post: ScopeRequirement,
    put: ScopeRequirement,
    patch: ScopeRequirement,
    delete: ScopeRequirement,
}

impl ScopePolicy {
    pub fn builder() -> ScopePolicyBuilder {
        ScopePolicyBuilder::default()
    }

    pub fn requirement(&self, method: HttpMethod) -> &ScopeRequirement {
        match method {
            HttpMethod::Get => &self.get,
            HttpMethod::Post => &self.post,
            HttpMethod::Put => &self.put,
            HttpMethod::Patch => &self.patch,
            HttpMethod::Delete => &self.delete,
        }
    }

    /// Check that `token` satisfies the requirement for `method`.
    ///
    /// Candidates are tried in order and all of them are evaluated, so the
    /// returned grant lists every alternative the token meets.
    pub fn check_scope(
        &self,
        backend: &dyn TokenBackend,
        token: &Token,
        method: &Method,
    ) -> Result<ScopeGrant, OAuthError> {
        let method = HttpMethod::try_from(method)?;
        let requirement = self.requirement(method);
        if requirement.is_unrestricted() {
            return Ok(ScopeGrant::Unrestricted);
        }

        let mut matched = Vec::new();
        for candidate in requirement.candidates() {
            let allowed = backend
                .allows_scope(candidate, token)
                .map_err(|e| OAuthError::InvalidScopeConfiguration(e.to_string()))?;
            if allowed {
                matched.push(candidate.clone());
            }
        }

        if matched.is_empty() {
            return Err(OAuthError::InsufficientScope);
        }

        debug!(
            method = %method,
            matched = ?matched,
            "scope requirement satisfied"
        );
        Ok(ScopeGrant::Matched(matched))
    }
}

/// Builder for [`ScopePolicy`].
///
/// With `use_default` on (the default), unset methods inherit:
/// GET and DELETE take POST's value; PUT and PATCH take each other's value
/// when only one is set, and POST's when neither is.
#[derive(Debug, Clone)]
pub struct ScopePolicyBuilder {
    get: ScopeRequirement,
    post: ScopeRequirement,
    put: ScopeRequirement,
    patch: ScopeRequirement,
    delete: ScopeRequirement,
    use_default: bool,
}

impl Default for ScopePolicyBuilder {
    fn default() -> Self {
        Self {
            get: ScopeRequirement::None,
            post: ScopeRequirement::None,
            put: ScopeRequirement::None,
            patch: ScopeRequirement::None,
            delete: ScopeRequirement::None,
            use_default: true,
        }
    }
}

impl ScopePolicyBuilder {
    pub fn get(mut self, requirement: impl Into<ScopeRequirement>) -> Self {
        self.get = requirement.into().normalized();
        self
    }

    pub fn post(mut self, requirement: impl Into<ScopeRequirement>) -> Self {
        self.post = requirement.into().normalized();
        self
    }

    pub fn put(mut self, requirement: impl Into<ScopeRequirement>) -> Self {
        self.put = requirement.into().normalized();
        self
    }

    pub fn patch(mut self, requirement: impl Into<ScopeRequirement>) -> Self {
        self.patch = requirement.into().normalized();
        self
    }

    pub fn delete(mut self, requirement: impl Into<ScopeRequirement>) -> Self {
        self.delete = requirement.into().normalized();
        self
    }

    /// Turn inheritance off; unset methods then mean "no restriction".
    pub fn use_default(mut self, use_default: bool) -> Self {
        self.use_default = use_default;
        self
    }

    pub fn build(self) -> ScopePolicy {
        let ScopePolicyBuilder {
            get,
            post,
            put,
            patch,
            delete,
            use_default,
        } = self;

        if !use_default {
            return ScopePolicy {
                get,
                post,
                put,
                patch,
                delete,
            };
        }

        let (put, patch) = match (put.is_unrestricted(), patch.is_unrestricted()) {
            (true, true) => (post.clone(), post.clone()),
            (false, true) => (put.clone(), put),
            (true, false) => (patch.clone(), patch),
            (false, false) => (put, patch),
        };

        ScopePolicy {
            get: or_inherit(get, &post),
            delete: or_inherit(delete, &post),
            put,
            patch,
            post,
        }
    }
}

fn or_inherit(requirement: ScopeRequirement, fallback: &ScopeRequirement) -> ScopeRequirement {
    if requirement.is_unrestricted() {
        fallback.clone()
    } else {
        requirement
    }
}
