/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body / WWW-Authenticate challenge)
 * - AuthError / LookupError を統一的に変換
 */
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::{AuthError, RequiredScopes};
use crate::services::identity::LookupError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Could not validate credentials")]
    Unauthorized,

    #[error("Not enough permissions")]
    Forbidden { required: RequiredScopes },

    #[error("{resource} not found.")]
    NotFound { resource: &'static str },

    #[error("request timed out")]
    RequestTimeout,

    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    fn challenge(&self) -> Option<String> {
        match self {
            AppError::Unauthorized => Some(AuthError::CredentialsInvalid.challenge()),
            AppError::Forbidden { required } => Some(
                AuthError::InsufficientScope {
                    required: required.clone(),
                }
                .challenge(),
            ),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Forbidden { .. } => (StatusCode::FORBIDDEN, "INSUFFICIENT_SCOPE"),
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::RequestTimeout => (StatusCode::REQUEST_TIMEOUT, "REQUEST_TIMEOUT"),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        };

        let challenge = self.challenge();
        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message: self.to_string(),
            },
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(challenge) = challenge {
            let value = HeaderValue::from_str(&challenge)
                .unwrap_or_else(|_| HeaderValue::from_static("Bearer"));
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, value);
        }
        response
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::CredentialsInvalid => AppError::Unauthorized,
            AuthError::InsufficientScope { required } => AppError::Forbidden { required },
        }
    }
}

impl From<LookupError> for AppError {
    fn from(_: LookupError) -> Self {
        AppError::Internal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_carries_generic_challenge() {
        let response = AppError::from(AuthError::CredentialsInvalid).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn forbidden_carries_required_scopes() {
        let response = AppError::from(AuthError::InsufficientScope {
            required: RequiredScopes::from(["admin"]),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            r#"Bearer error="insufficient_scope", scope="admin""#
        );
    }

    #[test]
    fn not_found_has_no_challenge() {
        let response = AppError::not_found("user").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }
}
