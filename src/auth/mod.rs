// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! OAuth 2.0 access token authentication with optional per-method scope
//! requirements.
//!
//! ## Auth Flow
//!
//! 1. A client obtains an access token from an authorization server elsewhere
//! 2. The client presents it as `?oauth_consumer_key=`, an `Authorization:
//!    <scheme> <token>` header, or a JSON body field on POST
//! 3. The gate:
//!    - Looks the token up through the configured [`TokenBackend`]
//!    - Rejects unknown and expired tokens
//!    - For scoped gates, checks the token against the [`ScopePolicy`] entry
//!      for the request method
//!    - Attaches the [`Principal`] and [`ConsumerKey`] to the request
//!
//! ## Security
//!
//! - Every failure becomes a plain 401; the reason is only logged
//! - Logged keys are cut down to a four-character prefix
//! - Expiry is strict: a token is rejected once `expires_at < now`

pub mod backend;
pub mod backends;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod middleware;
pub mod resolver;
pub mod scope;
pub mod token;

pub use backend::{BackendError, BackendKind, ScopeCheckError, TokenBackend, UnknownBackend};
pub use backends::{InMemoryTokenStore, ProviderBackend, ToolkitBackend};
pub use error::{OAuthError, Unauthorized};
pub use extractor::{OAuthUser, OptionalOAuthUser};
pub use gate::{AuthOutcome, OAuthGate};
pub use middleware::{optional_oauth, require_oauth};
pub use resolver::TokenResolver;
pub use scope::{HttpMethod, ScopeGrant, ScopePolicy, ScopeRequirement, ScopeValue};
pub use token::{ConsumerKey, Principal, PrincipalRef, Token};
