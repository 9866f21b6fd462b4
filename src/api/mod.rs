// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, MethodRouter},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::backends::provider::{READ, READ_WRITE, WRITE};
use crate::auth::error::UnauthorizedBody;
use crate::auth::{require_oauth, BackendKind, OAuthGate, PrincipalRef, ScopePolicy};

pub mod health;
pub mod me;

/// Scope table for `/v1/scoped/me`, expressed in the backend's scope scheme.
///
/// GET needs `read`, POST needs `read` and `write`, PUT accepts either one.
/// PATCH inherits from PUT and DELETE from POST.
pub fn demo_scope_policy(kind: BackendKind) -> ScopePolicy {
    match kind {
        BackendKind::Toolkit => ScopePolicy::builder()
            .post("read write")
            .get("read")
            .put(["read", "write"])
            .build(),
        BackendKind::Provider => ScopePolicy::builder()
            .post(READ_WRITE)
            .get(READ)
            .put([READ, WRITE])
            .build(),
    }
}

/// `plain` only checks the token; `scoped` also enforces its scope policy.
pub fn router(plain: Arc<OAuthGate>, scoped: Arc<OAuthGate>) -> Router {
    let scoped_me: MethodRouter = get(me::scoped_me)
        .post(me::scoped_me)
        .put(me::scoped_me)
        .patch(me::scoped_me)
        .delete(me::scoped_me);

    let v1_routes = Router::new()
        .route("/me", get(me::me))
        .route_layer(from_fn_with_state(plain, require_oauth))
        .merge(
            Router::new()
                .route("/scoped/me", scoped_me)
                .route_layer(from_fn_with_state(scoped, require_oauth)),
        );

    Router::new()
        .route("/health", get(health::health))
        .route("/api-doc/openapi.json", get(openapi_json))
        .nest("/v1", v1_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some(
                            "OAuth 2.0 access token. May also be sent as ?oauth_consumer_key=.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health::health, me::me, me::scoped_me),
    components(schemas(health::HealthResponse, me::MeResponse, PrincipalRef, UnauthorizedBody)),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness probe"),
        (name = "OAuth", description = "Token-protected endpoints")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::backends::InMemoryTokenStore;
    use crate::auth::token::Token;
    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    };
    use chrono::{Duration, Utc};
    use serde_json::Value;
    use tower::ServiceExt;

    fn toolkit_app() -> Router {
        let in_ten_days = Utc::now() + Duration::days(10);
        let store = Arc::new(InMemoryTokenStore::from_tokens([
            Token::new("READER", PrincipalRef::new("alice"), in_ten_days, "read"),
            Token::new("WRITER", PrincipalRef::new("bob"), in_ten_days, "write"),
            Token::new("BOTH", PrincipalRef::new("carol"), in_ten_days, "read write"),
            Token::new(
                "STALE",
                PrincipalRef::new("dave"),
                Utc::now() - Duration::days(1),
                "read write",
            ),
        ]));
        app(BackendKind::Toolkit, store)
    }

    fn app(kind: BackendKind, store: Arc<InMemoryTokenStore>) -> Router {
        let backend = kind.build(store);
        let plain = Arc::new(OAuthGate::new(backend.clone()));
        let scoped = Arc::new(OAuthGate::scoped(backend, demo_scope_policy(kind)));
        router(plain, scoped)
    }

    async fn call(app: Router, method: Method, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn health_needs_no_token() {
        let (status, body) = call(toolkit_app(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn me_returns_owner_and_redacted_key() {
        let (status, body) = call(toolkit_app(), Method::GET, "/v1/me", Some("WRITER")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], "bob");
        assert_eq!(body["method"], "GET");
        assert_eq!(body["key_prefix"], "WRIT***");
    }

    #[tokio::test]
    async fn me_rejects_missing_and_expired_tokens() {
        let (status, body) = call(toolkit_app(), Method::GET, "/v1/me", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error_code"], "unauthorized");

        let (status, _) = call(toolkit_app(), Method::GET, "/v1/me", Some("STALE")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn scoped_me_enforces_toolkit_policy() {
        let cases = [
            (Method::GET, "READER", StatusCode::OK),
            (Method::GET, "WRITER", StatusCode::UNAUTHORIZED),
            (Method::POST, "READER", StatusCode::UNAUTHORIZED),
            (Method::POST, "BOTH", StatusCode::OK),
            (Method::PUT, "READER", StatusCode::OK),
            (Method::PUT, "WRITER", StatusCode::OK),
            (Method::PATCH, "WRITER", StatusCode::OK),
            (Method::DELETE, "READER", StatusCode::UNAUTHORIZED),
            (Method::DELETE, "BOTH", StatusCode::OK),
        ];
        for (method, token, expected) in cases {
            let (status, _) = call(toolkit_app(), method.clone(), "/v1/scoped/me", Some(token)).await;
            assert_eq!(status, expected, "{method} with {token}");
        }
    }

    #[tokio::test]
    async fn scoped_me_enforces_provider_policy() {
        let in_ten_days = Utc::now() + Duration::days(10);
        let store = Arc::new(InMemoryTokenStore::from_tokens([
            Token::new("R", PrincipalRef::new("alice"), in_ten_days, READ),
            Token::new("RW", PrincipalRef::new("bob"), in_ten_days, READ_WRITE),
        ]));

        let (status, _) = call(
            app(BackendKind::Provider, store.clone()),
            Method::GET,
            "/v1/scoped/me",
            Some("R"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(
            app(BackendKind::Provider, store.clone()),
            Method::POST,
            "/v1/scoped/me",
            Some("R"),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = call(
            app(BackendKind::Provider, store),
            Method::POST,
            "/v1/scoped/me",
            Some("RW"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], "bob");
    }

    #[tokio::test]
    async fn json_body_key_reaches_scoped_post() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/v1/scoped/me")
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .body(Body::from(r#"{"oauth_consumer_key": "BOTH", "choice": 1}"#))
            .unwrap();
        let response = toolkit_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn openapi_document_lists_routes() {
        let (status, body) =
            call(toolkit_app(), Method::GET, "/api-doc/openapi.json", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/v1/me"].is_object());
        assert!(body["paths"]["/v1/scoped/me"]["post"].is_object());
        assert!(body["components"]["securitySchemes"]["bearer"].is_object());
    }
}
