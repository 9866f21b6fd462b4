// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bundled token backends.
//!
//! Both keep tokens in an [`InMemoryTokenStore`] and differ only in how scopes
//! are represented and compared.

pub mod provider;
pub mod store;
pub mod toolkit;

pub use provider::ProviderBackend;
pub use store::{FixtureError, InMemoryTokenStore};
pub use toolkit::ToolkitBackend;
