/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - verifier: TokenVerifier, identities: IdentityLookup
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::{auth::TokenVerifier, identity::IdentityLookup};

#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<TokenVerifier>,
    pub identities: Arc<dyn IdentityLookup>,
}

impl AppState {
    pub fn new(verifier: Arc<TokenVerifier>, identities: Arc<dyn IdentityLookup>) -> Self {
        Self {
            verifier,
            identities,
        }
    }
}
