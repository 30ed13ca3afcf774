/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 */
use std::collections::BTreeSet;

use crate::services::auth::Authenticated;
use crate::services::identity::Identity;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `identity` は identity lookup で解決済みのユーザー
/// - `scopes` はトークンが付与している scope 全体 (route が要求した分だけではない)
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub identity: Identity,
    pub scopes: BTreeSet<String>,
}

impl AuthCtx {
    pub fn user_id(&self) -> &str {
        &self.identity.id
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }
}

impl From<Authenticated> for AuthCtx {
    fn from(authenticated: Authenticated) -> Self {
        Self {
            identity: authenticated.identity,
            scopes: authenticated.token.scopes,
        }
    }
}
