// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Backend for text scopes.
//!
//! Tokens carry a space-delimited scope string such as `"read write"`. A
//! required scope `"a b"` is granted when the token holds every listed name.

use std::collections::HashSet;
use std::sync::Arc;

use super::InMemoryTokenStore;
use crate::auth::backend::{BackendError, ScopeCheckError, TokenBackend};
use crate::auth::scope::ScopeValue;
use crate::auth::token::Token;

pub struct ToolkitBackend {
    store: Arc<InMemoryTokenStore>,
}

impl ToolkitBackend {
    pub fn new(store: Arc<InMemoryTokenStore>) -> Self {
        Self { store }
    }
}

impl TokenBackend for ToolkitBackend {
    fn find_token(&self, key: &str) -> Result<Option<Token>, BackendError> {
        self.store.get(key)
    }

    fn allows_scope(
        &self,
        candidate: &ScopeValue,
        token: &Token,
    ) -> Result<bool, ScopeCheckError> {
        let ScopeValue::Text(required) = candidate else {
            return Err(ScopeCheckError::UnsupportedValue(candidate.clone()));
        };
        let ScopeValue::Text(granted) = &token.scope else {
            return Err(ScopeCheckError::UnsupportedValue(token.scope.clone()));
        };

        let granted: HashSet<&str> = granted.split_whitespace().collect();
        Ok(required
            .split_whitespace()
            .all(|name| granted.contains(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::PrincipalRef;
    use chrono::{Duration, Utc};

    fn token(scope: impl Into<ScopeValue>) -> Token {
        Token::new(
            "TOKEN",
            PrincipalRef::new("alice"),
            Utc::now() + Duration::days(10),
            scope,
        )
    }

    fn backend() -> ToolkitBackend {
        ToolkitBackend::new(Arc::new(InMemoryTokenStore::new()))
    }

    #[test]
    fn every_required_name_must_be_granted() {
        let backend = backend();
        let read = token("read");
        let read_write = token("write  read");

        assert!(backend.allows_scope(&"read".into(), &read).unwrap());
        assert!(!backend.allows_scope(&"read write".into(), &read).unwrap());
        assert!(backend.allows_scope(&"read write".into(), &read_write).unwrap());
        assert!(backend.allows_scope(&"write".into(), &read_write).unwrap());
    }

    #[test]
    fn names_match_exactly() {
        let backend = backend();
        assert!(!backend.allows_scope(&"rea".into(), &token("read")).unwrap());
        assert!(!backend.allows_scope(&"READ".into(), &token("read")).unwrap());
    }

    #[test]
    fn bitmask_values_are_unsupported() {
        let backend = backend();
        assert_eq!(
            backend.allows_scope(&ScopeValue::Bitmask(2), &token("read")),
            Err(ScopeCheckError::UnsupportedValue(ScopeValue::Bitmask(2)))
        );
        assert!(backend.allows_scope(&"read".into(), &token(2u64)).is_err());
    }

    #[test]
    fn lookup_goes_through_the_store() {
        let store = Arc::new(InMemoryTokenStore::new());
        store.insert(token("read"));
        let backend = ToolkitBackend::new(store);

        assert!(backend.find_token("TOKEN").unwrap().is_some());
        assert!(backend.find_token("OTHER").unwrap().is_none());
    }
}
