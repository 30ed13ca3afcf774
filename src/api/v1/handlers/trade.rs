/*
 * Responsibility
 * - trade scope 必須の操作 (route 側で RequiredScopes {"trade"} を適用済み)
 */
use axum::Json;

use crate::api::v1::dto::trade::TradeAccessResponse;
use crate::api::v1::extractors::AuthCtxExtractor;
use crate::services::auth::scopes::ADMIN;

pub async fn trade_access(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<TradeAccessResponse> {
    Json(TradeAccessResponse {
        user_id: ctx.user_id().to_string(),
        admin: ctx.has_scope(ADMIN),
        scopes: ctx.scopes.into_iter().collect(),
    })
}
