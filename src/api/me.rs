// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{http::Method, Extension, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::token::redact_key;
use crate::auth::{ConsumerKey, OAuthUser, PrincipalRef};

/// Who the presented token belongs to.
#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub user_id: PrincipalRef,
    /// Method the request was authorized for.
    pub method: String,
    /// Redacted prefix of the consumer key.
    pub key_prefix: String,
}

#[utoipa::path(
    get,
    path = "/v1/me",
    tag = "OAuth",
    params(
        ("oauth_consumer_key" = Option<String>, Query, description = "Access token, if not sent in the Authorization header")
    ),
    responses(
        (status = 200, body = MeResponse),
        (status = 401, body = crate::auth::error::UnauthorizedBody)
    ),
    security(("bearer" = []))
)]
pub async fn me(
    OAuthUser(owner): OAuthUser,
    Extension(key): Extension<ConsumerKey>,
    method: Method,
) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: owner,
        method: method.to_string(),
        key_prefix: redact_key(key.as_str()),
    })
}

/// Same as [`me`], mounted behind a gate with per-method scope requirements.
#[utoipa::path(
    method(get, post, put, patch, delete),
    path = "/v1/scoped/me",
    tag = "OAuth",
    responses(
        (status = 200, body = MeResponse),
        (status = 401, description = "Missing token or insufficient scope", body = crate::auth::error::UnauthorizedBody)
    ),
    security(("bearer" = []))
)]
pub async fn scoped_me(
    owner: OAuthUser,
    key: Extension<ConsumerKey>,
    method: Method,
) -> Json<MeResponse> {
    me(owner, key, method).await
}
