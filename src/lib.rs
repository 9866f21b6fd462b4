// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! OAuth Gate - OAuth 2.0 access token authentication for axum
//!
//! Validates access tokens issued by an external authorization server and
//! optionally checks their scopes against a per-method requirement table.
//!
//! ## Modules
//!
//! - `api` - Demo HTTP routes (Axum)
//! - `auth` - Token extraction, resolution and scope checks
//! - `config` - Environment configuration
//! - `logging` - Tracing subscriber setup

pub mod api;
pub mod auth;
pub mod config;
pub mod logging;
