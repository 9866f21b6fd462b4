// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the principal set by the OAuth middleware.
//!
//! ```rust,ignore
//! async fn list_choices(OAuthUser(owner): OAuthUser) -> impl IntoResponse {
//!     // owner is the PrincipalRef of the token holder
//! }
//! ```

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::gate::DEFAULT_REALM;
use super::token::{Principal, PrincipalRef};
use super::Unauthorized;

/// The owner of the token that authenticated this request.
///
/// Rejects with 401 unless the middleware attached a [`Principal::User`].
pub struct OAuthUser(pub PrincipalRef);

impl<S: Send + Sync> FromRequestParts<S> for OAuthUser {
    type Rejection = Unauthorized;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Principal>() {
            Some(Principal::User(owner)) => Ok(OAuthUser(owner.clone())),
            Some(Principal::Anonymous) | None => Err(Unauthorized::new(DEFAULT_REALM)),
        }
    }
}

/// Like [`OAuthUser`], but yields `None` instead of rejecting.
pub struct OptionalOAuthUser(pub Option<PrincipalRef>);

impl<S: Send + Sync> FromRequestParts<S> for OptionalOAuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalOAuthUser(
            parts
                .extensions
                .get::<Principal>()
                .and_then(Principal::user)
                .cloned(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use axum::response::IntoResponse;

    fn parts_with(principal: Option<Principal>) -> Parts {
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        if let Some(principal) = principal {
            parts.extensions.insert(principal);
        }
        parts
    }

    #[tokio::test]
    async fn oauth_user_reads_principal_from_extensions() {
        let mut parts = parts_with(Some(Principal::User(PrincipalRef::new("alice"))));
        let OAuthUser(owner) = OAuthUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(owner.as_str(), "alice");
    }

    #[tokio::test]
    async fn oauth_user_rejects_missing_and_anonymous() {
        for principal in [None, Some(Principal::Anonymous)] {
            let mut parts = parts_with(principal);
            let rejection = OAuthUser::from_request_parts(&mut parts, &())
                .await
                .err()
                .unwrap();
            assert_eq!(rejection.into_response().status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn optional_user_never_rejects() {
        let mut parts = parts_with(Some(Principal::Anonymous));
        let OptionalOAuthUser(owner) = OptionalOAuthUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(owner.is_none());

        let mut parts = parts_with(Some(Principal::User(PrincipalRef::new("bob"))));
        let OptionalOAuthUser(owner) = OptionalOAuthUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(owner, Some(PrincipalRef::new("bob")));
    }
}
