//! access token (Bearer JWT) 検証 → AuthCtx を extensions に入れる
//!
//! - `Authorization: Bearer <jwt>` を取り出し、route ごとの RequiredScopes で verifier に渡す
//! - 失敗時は AuthError → AppError (401 / 403 + WWW-Authenticate) に変換
//! - 成功時は AuthCtx を request extensions に格納し、handler は AuthCtxExtractor で受け取る

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::RequiredScopes;
use crate::state::AppState;

/// Per-route middleware state: shared services plus the scopes this route demands.
#[derive(Clone)]
struct ScopeGuard {
    state: AppState,
    required: RequiredScopes,
}

/// Protect every route in `router` with bearer authentication and `required` scopes.
///
/// 例：
/// ```ignore
/// let admin = Router::new().route("/users/{user_id}", get(get_user));
/// let admin = middleware::auth::require(admin, &state, [scopes::ADMIN]);
/// ```
pub fn require(
    router: Router<AppState>,
    state: &AppState,
    required: impl Into<RequiredScopes>,
) -> Router<AppState> {
    let guard = ScopeGuard {
        state: state.clone(),
        required: required.into(),
    };
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.route_layer(middleware::from_fn_with_state(guard, access_middleware))
}

async fn access_middleware(
    State(guard): State<ScopeGuard>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers()).ok_or_else(|| {
        tracing::debug!("missing or non-bearer Authorization header");
        AppError::Unauthorized
    })?;

    let authenticated = guard
        .state
        .verifier
        .authorize(&token, &guard.required)
        .await?;

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(AuthCtx::from(authenticated));

    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
