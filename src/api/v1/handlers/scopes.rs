/*
 * Responsibility
 * - GET /api/v1/scopes (発行可能な scope の一覧、認証なし)
 */
use axum::Json;

use crate::api::v1::dto::scopes::ScopeResponse;
use crate::services::auth::scopes;

pub async fn list_scopes() -> Json<Vec<ScopeResponse>> {
    Json(scopes::catalog().iter().map(ScopeResponse::from).collect())
}
