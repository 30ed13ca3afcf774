use std::time::Duration;

use thiserror::Error;

use crate::services::auth::scopes::RequiredScopes;
use crate::services::identity::LookupError;

/// Issuer/verifier configuration fault. Not a per-request condition.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("signing secret must not be empty")]
    EmptySecret,

    #[error("failed to sign token: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

/// Caller-visible verification failure. Exactly two kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("could not validate credentials")]
    CredentialsInvalid,

    #[error("not enough permissions (required: {required})")]
    InsufficientScope { required: RequiredScopes },
}

impl AuthError {
    /// `WWW-Authenticate` value for this failure.
    ///
    /// Invalid credentials get the bare scheme; insufficient scope names the required set.
    pub fn challenge(&self) -> String {
        match self {
            AuthError::CredentialsInvalid => "Bearer".to_string(),
            AuthError::InsufficientScope { required } => format!(
                "Bearer error=\"insufficient_scope\", scope=\"{}\"",
                required.scope_str()
            ),
        }
    }
}

/// Operator-facing reason behind `AuthError::CredentialsInvalid`. Logged, never returned.
#[derive(Debug, Error)]
pub(crate) enum CredentialsFault {
    #[error("token rejected by decoder: {0}")]
    Decode(#[from] jsonwebtoken::errors::Error),

    #[error("token has no numeric 'exp' claim")]
    MissingExpiration,

    #[error("token expired at {expired_at}")]
    Expired { expired_at: i64 },

    #[error("token has no 'user_id' claim")]
    MissingIdentity,

    #[error("claim '{claim}' has unexpected shape")]
    Shape { claim: &'static str },

    #[error("identity not found")]
    IdentityNotFound,

    #[error("identity lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("identity lookup timed out after {0:?}")]
    LookupTimeout(Duration),
}

impl CredentialsFault {
    /// Backend trouble rather than a bad credential.
    pub(crate) fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Lookup(_) | Self::LookupTimeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_challenge_is_generic() {
        assert_eq!(AuthError::CredentialsInvalid.challenge(), "Bearer");
    }

    #[test]
    fn insufficient_scope_challenge_lists_required_scopes() {
        let err = AuthError::InsufficientScope {
            required: RequiredScopes::from(["trade", "admin"]),
        };
        assert_eq!(
            err.challenge(),
            r#"Bearer error="insufficient_scope", scope="admin trade""#
        );
    }
}
