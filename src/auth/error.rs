// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.
//!
//! Every variant collapses to a single 401 at the HTTP boundary. The
//! distinctions exist for logs only and are never written into a response.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

/// Reason a presented credential was refused.
///
/// "No credential offered" is not an error; it is the
/// [`AuthOutcome::Unauthenticated`](super::AuthOutcome::Unauthenticated) outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OAuthError {
    /// The credential could not be extracted (e.g. header without a space).
    #[error("credential is malformed")]
    MalformedCredential,
    /// No token matches the presented key.
    #[error("access token not found")]
    TokenNotFound,
    /// The token's expiry lies in the past.
    #[error("access token has expired")]
    TokenExpired,
    /// The token backend could not be reached or is misconfigured.
    #[error("token backend unavailable: {0}")]
    BackendUnavailable(String),
    /// The request method has no scope slot.
    #[error("HTTP method {0} is not recognized")]
    MethodNotRecognized(String),
    /// None of the required scope alternatives is granted by the token.
    #[error("access token does not meet scope requirement")]
    InsufficientScope,
    /// The scope requirement cannot be evaluated by the configured backend.
    #[error("invalid required scope values: {0}")]
    InvalidScopeConfiguration(String),
}

impl OAuthError {
    /// Stable code used in structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            OAuthError::MalformedCredential => "malformed_credential",
            OAuthError::TokenNotFound => "token_not_found",
            OAuthError::TokenExpired => "token_expired",
            OAuthError::BackendUnavailable(_) => "backend_unavailable",
            OAuthError::MethodNotRecognized(_) => "method_not_recognized",
            OAuthError::InsufficientScope => "insufficient_scope",
            OAuthError::InvalidScopeConfiguration(_) => "invalid_scope_configuration",
        }
    }

    /// Whether this failure points at server configuration rather than the client.
    pub fn is_configuration_fault(&self) -> bool {
        matches!(
            self,
            OAuthError::BackendUnavailable(_)
                | OAuthError::MethodNotRecognized(_)
                | OAuthError::InvalidScopeConfiguration(_)
        )
    }
}

/// JSON body of a 401 response.
#[derive(Debug, Serialize, ToSchema)]
pub struct UnauthorizedBody {
    pub error: String,
    pub error_code: String,
}

/// 401 response produced when a request is not authenticated.
///
/// Carries only the realm; the reason stays in the logs.
#[derive(Debug, Clone)]
pub struct Unauthorized {
    realm: String,
}

impl Unauthorized {
    pub fn new(realm: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
        }
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }
}

impl IntoResponse for Unauthorized {
    fn into_response(self) -> Response {
        let body = Json(UnauthorizedBody {
            error: "Authentication credentials were not provided or are invalid".to_string(),
            error_code: "unauthorized".to_string(),
        });
        let mut response = (StatusCode::UNAUTHORIZED, body).into_response();

        // Realms come from configuration; skip the header rather than fail on odd bytes.
        if let Ok(challenge) = HeaderValue::from_str(&format!("Bearer realm=\"{}\"", self.realm)) {
            response.headers_mut().insert(WWW_AUTHENTICATE, challenge);
        }
        response
    }
}
