/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - route ごとに必要な scope をここで決め、middleware::auth::require で適用する
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::{
    scopes::list_scopes,
    trade::trade_access,
    users::{get_user, me},
};
use crate::middleware::auth;
use crate::services::auth::{RequiredScopes, scopes};
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let public = Router::new().route("/scopes", get(list_scopes));

    let authenticated = auth::require(
        Router::new().route("/users/me", get(me)),
        state,
        RequiredScopes::none(),
    );

    let trade = auth::require(
        Router::new().route("/trade/systems/access", get(trade_access)),
        state,
        [scopes::TRADE],
    );

    let admin = auth::require(
        Router::new().route("/users/{user_id}", get(get_user)),
        state,
        [scopes::ADMIN],
    );

    public.merge(authenticated).merge(trade).merge(admin)
}
