/*
 * Responsibility
 * - Config読み込み → 依存生成 (identity store, TokenVerifier) → Router 組み立て
 * - Middleware の適用 (request id / trace / security headers / scope guard)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::handlers::health::health;
use crate::config::{Config, HttpLimits};
use crate::middleware;
use crate::repos::user_repo::UserRepo;
use crate::services::auth::TokenVerifier;
use crate::services::identity::{IdentityLookup, InMemoryIdentities};
use crate::state::AppState;

pub fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,trade_auth=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // In development, fail fast; in production keep the default hook.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, config.http);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let identities: Arc<dyn IdentityLookup> = match &config.database_url {
        Some(url) => {
            let db = PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(config.identity_lookup_timeout)
                .connect(url)
                .await
                .context("failed to connect to DATABASE_URL")?;
            Arc::new(UserRepo::new(db))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using an empty in-memory identity store");
            Arc::new(InMemoryIdentities::new())
        }
    };

    // SigningError here is a configuration fault: refuse to start.
    let verifier = TokenVerifier::new(
        &config.auth,
        identities.clone(),
        config.identity_lookup_timeout,
    )
    .context("invalid token signing configuration")?;

    tracing::info!(?verifier, "token verifier ready");

    Ok(AppState::new(Arc::new(verifier), identities))
}

pub fn build_router(state: AppState, limits: HttpLimits) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api::v1::routes(&state))
        .with_state(state);

    let router = middleware::security_headers::apply(router);
    middleware::http::apply(router, limits)
}
