/*
 * Responsibility
 * - Claims: 発行時に呼び出し側が渡す open な key/value mapping
 * - TokenData: 検証済みトークンから取り出した identity + scopes
 */
use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::services::auth::error::CredentialsFault;

/// Claim carrying the user id.
pub const IDENTITY_CLAIM: &str = "user_id";
/// Claim carrying the granted scopes (array of strings).
pub const SCOPES_CLAIM: &str = "scopes";
/// Expiration (unix seconds). Always set by the issuer.
pub const EXPIRATION_CLAIM: &str = "exp";

/// Caller-supplied claims.
///
/// Any JSON value can be stored; only `user_id` and `scopes` have meaning to the verifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_user(user_id: impl Into<String>) -> Self {
        let user_id: String = user_id.into();
        let mut claims = Self::new();
        claims.insert(IDENTITY_CLAIM, user_id);
        claims
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let scopes: Vec<Value> = scopes
            .into_iter()
            .map(|s| Value::String(s.into()))
            .collect();
        self.insert(SCOPES_CLAIM, Value::Array(scopes));
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// Decoded, validated token content. Only the verifier builds this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenData {
    pub user_id: String,
    pub scopes: BTreeSet<String>,
}

impl TokenData {
    /// Extract identity and scopes from an already signature-checked payload.
    ///
    /// - `user_id` absent or null -> `MissingIdentity`
    /// - `user_id` not a non-empty string -> `Shape`
    /// - `scopes` absent or null -> empty set; anything but an array of strings -> `Shape`
    pub(crate) fn from_payload(payload: &Map<String, Value>) -> Result<Self, CredentialsFault> {
        let user_id = match payload.get(IDENTITY_CLAIM) {
            None | Some(Value::Null) => return Err(CredentialsFault::MissingIdentity),
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(_) => {
                return Err(CredentialsFault::Shape {
                    claim: IDENTITY_CLAIM,
                });
            }
        };

        let scopes = match payload.get(SCOPES_CLAIM) {
            None | Some(Value::Null) => BTreeSet::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| {
                    v.as_str().map(str::to_owned).ok_or(CredentialsFault::Shape {
                        claim: SCOPES_CLAIM,
                    })
                })
                .collect::<Result<BTreeSet<_>, _>>()?,
            Some(_) => {
                return Err(CredentialsFault::Shape {
                    claim: SCOPES_CLAIM,
                });
            }
        };

        Ok(Self { user_id, scopes })
    }
}
