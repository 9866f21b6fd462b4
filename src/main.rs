// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;
use std::sync::Arc;

use oauth_gate::api::{demo_scope_policy, router};
use oauth_gate::auth::{InMemoryTokenStore, OAuthGate};
use oauth_gate::config::Settings;
use oauth_gate::logging;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = logging::init(settings.log_format) {
        eprintln!("failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    let store = Arc::new(InMemoryTokenStore::new());
    if let Some(path) = &settings.token_fixtures {
        match store.load_json(path) {
            Ok(count) => info!(path = %path.display(), count, "loaded token fixtures"),
            Err(err) => {
                error!(path = %path.display(), error = %err, "failed to load token fixtures");
                return ExitCode::FAILURE;
            }
        }
    } else {
        warn!("no token fixtures configured; every token will be rejected");
    }

    let backend = settings.backend.build(store);
    let plain = Arc::new(
        OAuthGate::new(backend.clone())
            .with_realm(settings.realm.clone())
            .with_max_body_bytes(settings.max_body_bytes),
    );
    let scoped = Arc::new(
        OAuthGate::scoped(backend, demo_scope_policy(settings.backend))
            .with_realm(settings.realm.clone())
            .with_max_body_bytes(settings.max_body_bytes),
    );
    let app = router(plain, scoped);

    let addr = match settings.bind_addr() {
        Ok(addr) => addr,
        Err(err) => {
            error!(error = %err, "invalid bind address");
            return ExitCode::FAILURE;
        }
    };
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%addr, error = %err, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    info!(%addr, backend = %settings.backend, realm = %settings.realm, "oauth gate listening (openapi at /api-doc/openapi.json)");

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %err, "server failed");
        return ExitCode::FAILURE;
    }

    info!("server stopped");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
