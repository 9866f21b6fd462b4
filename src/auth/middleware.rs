// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! ```rust,ignore
//! let gate = Arc::new(OAuthGate::scoped(backend, policy));
//!
//! let app = Router::new()
//!     .route("/polls", get(list_polls).post(create_poll))
//!     .route_layer(axum::middleware::from_fn_with_state(gate, require_oauth));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{AuthOutcome, OAuthGate, Unauthorized};

/// Reject every request that does not carry a valid token.
pub async fn require_oauth(
    State(gate): State<Arc<OAuthGate>>,
    request: Request,
    next: Next,
) -> Response {
    let (request, outcome) = gate.authenticate(request).await;
    match outcome {
        AuthOutcome::Authenticated(_) => next.run(request).await,
        AuthOutcome::Unauthenticated | AuthOutcome::Rejected => {
            Unauthorized::new(gate.realm()).into_response()
        }
    }
}

/// Let requests without any credential through, but reject bad credentials.
///
/// Handlers behind this layer use [`OptionalOAuthUser`](super::OptionalOAuthUser)
/// to tell the two cases apart.
pub async fn optional_oauth(
    State(gate): State<Arc<OAuthGate>>,
    request: Request,
    next: Next,
) -> Response {
    let (request, outcome) = gate.authenticate(request).await;
    match outcome {
        AuthOutcome::Authenticated(_) | AuthOutcome::Unauthenticated => next.run(request).await,
        AuthOutcome::Rejected => Unauthorized::new(gate.realm()).into_response(),
    }
}
