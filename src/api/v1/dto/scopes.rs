use serde::Serialize;

use crate::services::auth::scopes::ScopeInfo;

#[derive(Debug, Serialize)]
pub struct ScopeResponse {
    pub name: &'static str,
    pub description: &'static str,
}

impl From<&ScopeInfo> for ScopeResponse {
    fn from(info: &ScopeInfo) -> Self {
        Self {
            name: info.name,
            description: info.description,
        }
    }
}
