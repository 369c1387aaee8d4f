//! Token storage scopes.
//!
//! The dashboard keeps its bearer token in one of two key/value stores that
//! differ only by lifetime: a persistent one that survives restarts and an
//! ephemeral one that disappears with the session. `TokenStore` owns both
//! and makes sure a token never lives in more than one of them.

pub mod file;
pub mod memory;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::types::StorageResult;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Slot name the token is kept under in either scope.
pub const AUTH_TOKEN_KEY: &str = "authToken";

/// A string key/value store with a fixed lifetime.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenScope {
    /// Survives restarts
    Persistent,
    /// Cleared when the session ends
    Ephemeral,
}

impl TokenScope {
    pub fn from_remember_me(remember_me: bool) -> Self {
        if remember_me {
            TokenScope::Persistent
        } else {
            TokenScope::Ephemeral
        }
    }

    fn other(self) -> Self {
        match self {
            TokenScope::Persistent => TokenScope::Ephemeral,
            TokenScope::Ephemeral => TokenScope::Persistent,
        }
    }
}

#[derive(Clone)]
pub struct TokenStore {
    persistent: Arc<dyn KeyValueStore>,
    ephemeral: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    pub fn new(persistent: Arc<dyn KeyValueStore>, ephemeral: Arc<dyn KeyValueStore>) -> Self {
        Self {
            persistent,
            ephemeral,
        }
    }

    /// Both scopes held in memory, for tests and throwaway sessions.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }

    fn scope(&self, scope: TokenScope) -> &dyn KeyValueStore {
        match scope {
            TokenScope::Persistent => self.persistent.as_ref(),
            TokenScope::Ephemeral => self.ephemeral.as_ref(),
        }
    }

    /// Look for a token, persistent scope first.
    pub fn load(&self) -> StorageResult<Option<(String, TokenScope)>> {
        for scope in [TokenScope::Persistent, TokenScope::Ephemeral] {
            if let Some(token) = self.peek(scope)? {
                debug!(?scope, "found stored session token");
                return Ok(Some((token, scope)));
            }
        }

        Ok(None)
    }

    pub fn peek(&self, scope: TokenScope) -> StorageResult<Option<String>> {
        let token = self.scope(scope).get(AUTH_TOKEN_KEY)?;
        Ok(token.filter(|token| !token.is_empty()))
    }

    /// Drop whatever the other scope held, then write the token into `scope`.
    ///
    /// On error no scope holds the new token.
    pub fn store(&self, token: &str, scope: TokenScope) -> StorageResult<()> {
        self.scope(scope.other()).remove(AUTH_TOKEN_KEY)?;

        if let Err(err) = self.scope(scope).set(AUTH_TOKEN_KEY, token) {
            if let Err(rollback) = self.scope(scope).remove(AUTH_TOKEN_KEY) {
                warn!(?scope, error = %rollback, "could not roll back partial token write");
            }
            return Err(err);
        }

        Ok(())
    }

    /// Remove the token from both scopes. Both removals are attempted even if the first fails.
    pub fn clear(&self) -> StorageResult<()> {
        let persistent = self.persistent.remove(AUTH_TOKEN_KEY);
        let ephemeral = self.ephemeral.remove(AUTH_TOKEN_KEY);
        persistent.and(ephemeral)
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}
