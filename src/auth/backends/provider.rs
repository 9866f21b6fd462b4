// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Backend for bitmask scopes.
//!
//! Each scope is a bit; a token's scope is the OR of its grants. Text
//! requirements are translated through a name table, so `"read write"` and
//! `READ | WRITE` mean the same thing.

use std::collections::HashMap;
use std::sync::Arc;

use super::InMemoryTokenStore;
use crate::auth::backend::{BackendError, ScopeCheckError, TokenBackend};
use crate::auth::scope::ScopeValue;
use crate::auth::token::Token;

pub const READ: u64 = 1 << 1;
pub const WRITE: u64 = 1 << 2;
pub const READ_WRITE: u64 = READ | WRITE;

pub struct ProviderBackend {
    store: Arc<InMemoryTokenStore>,
    names: HashMap<String, u64>,
}

impl ProviderBackend {
    /// Backend with the standard `read`, `write` and `read+write` scopes.
    pub fn new(store: Arc<InMemoryTokenStore>) -> Self {
        Self::with_scopes(
            store,
            [("read", READ), ("write", WRITE), ("read+write", READ_WRITE)],
        )
    }

    pub fn with_scopes<'a>(
        store: Arc<InMemoryTokenStore>,
        names: impl IntoIterator<Item = (&'a str, u64)>,
    ) -> Self {
        Self {
            store,
            names: names
                .into_iter()
                .map(|(name, bits)| (name.to_string(), bits))
                .collect(),
        }
    }

    fn bits_for(&self, candidate: &ScopeValue) -> Result<u64, ScopeCheckError> {
        match candidate {
            ScopeValue::Bitmask(bits) => Ok(*bits),
            ScopeValue::Text(text) => text.split_whitespace().try_fold(0, |acc, name| {
                self.names
                    .get(name)
                    .map(|bits| acc | bits)
                    .ok_or_else(|| ScopeCheckError::UnknownScopeName(name.to_string()))
            }),
        }
    }
}

/// `wanted` is granted when it is non-empty and fully contained in `has`.
fn check(wanted: u64, has: u64) -> bool {
    let overlap = wanted & has;
    overlap != 0 && overlap == wanted
}

impl TokenBackend for ProviderBackend {
    fn find_token(&self, key: &str) -> Result<Option<Token>, BackendError> {
        self.store.get(key)
    }

    fn allows_scope(
        &self,
        candidate: &ScopeValue,
        token: &Token,
    ) -> Result<bool, ScopeCheckError> {
        let ScopeValue::Bitmask(has) = token.scope else {
            return Err(ScopeCheckError::UnsupportedValue(token.scope.clone()));
        };
        let wanted = self.bits_for(candidate)?;
        Ok(check(wanted, has))
    }
}
