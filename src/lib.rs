//! Scoped bearer-token issuance and verification for the trade API.
//!
//! - [`services::auth::TokenIssuer`] signs caller claims into a time-limited JWT.
//! - [`services::auth::TokenVerifier`] validates a token, resolves its identity and
//!   enforces the scopes an operation requires.
//! - `api` / `middleware` expose the verifier as axum route guards.
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
