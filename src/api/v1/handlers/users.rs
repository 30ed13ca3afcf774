/*
 * Responsibility
 * - GET /users/me: 認証済みユーザー自身 (scope 不要)
 * - GET /users/{user_id}: admin scope 必須、存在しなければ 404
 *   (token 検証中の identity 不在は 401 に畳むが、こちらは明示的な取得なので区別する)
 */
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    api::v1::{dto::users::UserResponse, extractors::AuthCtxExtractor},
    error::AppError,
    state::AppState,
};

pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<UserResponse> {
    Json(UserResponse::from(ctx.identity))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let identity = state
        .identities
        .lookup(&user_id)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "user lookup failed");
            AppError::from(e)
        })?
        .ok_or(AppError::not_found("user"))?;

    Ok(Json(UserResponse::from(identity)))
}
