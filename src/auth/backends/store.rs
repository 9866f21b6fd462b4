// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process token store shared by the bundled backends.
//!
//! Tokens are issued elsewhere; this store only holds copies for lookup. It can
//! be seeded from a JSON fixture file holding an array of tokens:
//!
//! ```json
//! [
//!   {"key": "TOKEN", "owner": "alice", "expires_at": "2030-01-01T00:00:00Z", "scope": "read"}
//! ]
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::sync::RwLock;

use crate::auth::backend::BackendError;
use crate::auth::token::Token;

/// Error loading a fixture file.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("token store unavailable")]
    Unavailable,
}

/// Tokens keyed by their exact key string.
#[derive(Default)]
pub struct InMemoryTokenStore {
    tokens: RwLock<HashMap<String, Token>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tokens(tokens: impl IntoIterator<Item = Token>) -> Self {
        let tokens = tokens
            .into_iter()
            .map(|token| (token.key.clone(), token))
            .collect();
        Self {
            tokens: RwLock::new(tokens),
        }
    }

    /// Insert a token, replacing any token with the same key.
    pub fn insert(&self, token: Token) {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.insert(token.key.clone(), token);
        }
    }

    pub fn remove(&self, key: &str) -> Option<Token> {
        self.tokens.write().ok()?.remove(key)
    }

    pub fn len(&self) -> usize {
        self.tokens.read().map(|tokens| tokens.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exact-match lookup.
    pub fn get(&self, key: &str) -> Result<Option<Token>, BackendError> {
        let tokens = self
            .tokens
            .read()
            .map_err(|_| BackendError::Unavailable("token store lock poisoned".to_string()))?;
        Ok(tokens.get(key).cloned())
    }

    /// Load tokens from a JSON fixture file and return how many were added.
    pub fn load_json(&self, path: impl AsRef<Path>) -> Result<usize, FixtureError> {
        let reader = BufReader::new(File::open(path)?);
        let loaded: Vec<Token> = serde_json::from_reader(reader)?;
        let count = loaded.len();

        let mut tokens = self.tokens.write().map_err(|_| FixtureError::Unavailable)?;
        for token in loaded {
            tokens.insert(token.key.clone(), token);
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::PrincipalRef;
    use chrono::{Duration, Utc};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn token(key: &str) -> Token {
        Token::new(
            key,
            PrincipalRef::new("alice"),
            Utc::now() + Duration::days(10),
            "read",
        )
    }

    #[test]
    fn insert_get_and_remove() {
        let store = InMemoryTokenStore::new();
        assert!(store.is_empty());

        store.insert(token("TOKEN"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("TOKEN").unwrap().unwrap().key, "TOKEN");
        assert!(store.get("token").unwrap().is_none());

        assert!(store.remove("TOKEN").is_some());
        assert!(store.get("TOKEN").unwrap().is_none());
    }

    #[test]
    fn insert_replaces_same_key() {
        let store = InMemoryTokenStore::from_tokens([token("TOKEN")]);
        let mut replacement = token("TOKEN");
        replacement.owner = PrincipalRef::new("bob");
        store.insert(replacement);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("TOKEN").unwrap().unwrap().owner.as_str(), "bob");
    }

    #[test]
    fn load_json_reads_fixture_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"key": "TOKEN", "owner": "alice", "expires_at": "2030-01-01T00:00:00Z", "scope": "read"}},
                {{"key": "MASK", "owner": "bob", "expires_at": "2030-01-01T00:00:00Z", "scope": 6}}
            ]"#
        )
        .unwrap();

        let store = InMemoryTokenStore::new();
        assert_eq!(store.load_json(file.path()).unwrap(), 2);
        assert_eq!(store.get("MASK").unwrap().unwrap().owner.as_str(), "bob");
    }

    #[test]
    fn load_json_rejects_invalid_files() {
        let store = InMemoryTokenStore::new();
        assert!(matches!(
            store.load_json("/nonexistent/tokens.json"),
            Err(FixtureError::Io(_))
        ));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        assert!(matches!(
            store.load_json(file.path()),
            Err(FixtureError::Json(_))
        ));
        assert!(store.is_empty());
    }
}
