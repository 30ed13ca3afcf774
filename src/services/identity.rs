//! Identity lookup collaborator used by token verification.
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// User record a verified token resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: String,
    pub user_name: String,
    pub image_url: Option<String>,
}

/// Store-side failure (connection, query, timeout inside the backend).
///
/// Not-found is `Ok(None)`, never an error.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("identity store failure: {0}")]
    Backend(String),
}

/// Resolve a user record by id.
///
/// Implementations must be safe to call concurrently; callers bound each call with a timeout.
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    // Returns the backend name (for logging).
    fn backend_name(&self) -> &'static str;

    async fn lookup(&self, id: &str) -> Result<Option<Identity>, LookupError>;
}

/// In-process identity store for tests and local development.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentities {
    users: Arc<RwLock<HashMap<String, Identity>>>,
}

impl InMemoryIdentities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, identity: Identity) {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        users.insert(identity.id.clone(), identity);
    }

    pub fn remove(&self, id: &str) -> Option<Identity> {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        users.remove(id)
    }
}

impl FromIterator<Identity> for InMemoryIdentities {
    fn from_iter<I: IntoIterator<Item = Identity>>(iter: I) -> Self {
        let store = Self::new();
        for identity in iter {
            store.insert(identity);
        }
        store
    }
}

#[async_trait]
impl IdentityLookup for InMemoryIdentities {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn lookup(&self, id: &str) -> Result<Option<Identity>, LookupError> {
        let users = self
            .users
            .read()
            .map_err(|_| LookupError::Backend("identity map lock poisoned".to_string()))?;
        Ok(users.get(id).cloned())
    }
}
