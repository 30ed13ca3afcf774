use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{DecodingKey, Validation};
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::config::AuthSettings;
use crate::services::auth::claims::{EXPIRATION_CLAIM, TokenData};
use crate::services::auth::clock::{Clock, SystemClock};
use crate::services::auth::error::{AuthError, CredentialsFault, SigningError};
use crate::services::auth::keys;
use crate::services::auth::scopes::RequiredScopes;
use crate::services::identity::{Identity, IdentityLookup};

/// Result of a successful verification: the resolved user plus what the token granted.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub identity: Identity,
    pub token: TokenData,
}

/// Validates bearer tokens and enforces per-operation scopes.
///
/// Pipeline (each stage passes or rejects, no retries):
/// decode + signature -> expiration -> claim extraction/shape -> identity lookup -> scope check.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    identities: Arc<dyn IdentityLookup>,
    clock: Arc<dyn Clock>,
    lookup_timeout: Duration,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenVerifier")
            .field("validation", &self.validation)
            .field("identities", &self.identities.backend_name())
            .field("lookup_timeout", &self.lookup_timeout)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(
        settings: &AuthSettings,
        identities: Arc<dyn IdentityLookup>,
        lookup_timeout: Duration,
    ) -> Result<Self, SigningError> {
        let (algorithm, secret) = keys::resolve(settings)?;

        let mut validation = Validation::new(algorithm);
        // `exp` is compared against the injected clock in `decode`.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            identities,
            clock: Arc::new(SystemClock),
            lookup_timeout,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Verify `token` against `required` and return the resolved identity.
    pub async fn verify(
        &self,
        token: &str,
        required: &RequiredScopes,
    ) -> Result<Identity, AuthError> {
        self.authorize(token, required)
            .await
            .map(|authenticated| authenticated.identity)
    }

    /// Same as [`verify`](Self::verify), but also hands back the decoded token data.
    ///
    /// This is the entry-point for middleware.
    pub async fn authorize(
        &self,
        token: &str,
        required: &RequiredScopes,
    ) -> Result<Authenticated, AuthError> {
        let (token, identity) = self.authenticate(token).await.map_err(|fault| {
            if fault.is_infrastructure() {
                error!(error = %fault, "access token rejected: identity backend failure");
            } else {
                warn!(error = %fault, "access token rejected");
            }
            AuthError::CredentialsInvalid
        })?;

        if let Some(missing) = required.first_missing(&token.scopes) {
            warn!(
                user_id = %token.user_id,
                missing_scope = missing,
                required = %required,
                "access token lacks required scope"
            );
            return Err(AuthError::InsufficientScope {
                required: required.clone(),
            });
        }

        debug!(user_id = %identity.id, required = %required, "access token verified");
        Ok(Authenticated { identity, token })
    }

    async fn authenticate(&self, token: &str) -> Result<(TokenData, Identity), CredentialsFault> {
        let data = self.decode(token)?;

        // Exactly one lookup per verification, bounded by `lookup_timeout`.
        let found = tokio::time::timeout(self.lookup_timeout, self.identities.lookup(&data.user_id))
            .await
            .map_err(|_| CredentialsFault::LookupTimeout(self.lookup_timeout))??;

        let identity = found.ok_or(CredentialsFault::IdentityNotFound)?;
        Ok((data, identity))
    }

    fn decode(&self, token: &str) -> Result<TokenData, CredentialsFault> {
        let decoded = jsonwebtoken::decode::<Map<String, Value>>(
            token,
            &self.decoding_key,
            &self.validation,
        )?;
        let payload = decoded.claims;

        let expires_at = payload
            .get(EXPIRATION_CLAIM)
            .and_then(Value::as_i64)
            .ok_or(CredentialsFault::MissingExpiration)?;

        if self.clock.now().timestamp() >= expires_at {
            return Err(CredentialsFault::Expired {
                expired_at: expires_at,
            });
        }

        TokenData::from_payload(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, Utc};
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    use crate::services::auth::claims::Claims;
    use crate::services::auth::clock::ManualClock;
    use crate::services::auth::issuer::TokenIssuer;
    use crate::services::auth::scopes::{ADMIN, TRADE};
    use crate::services::identity::{InMemoryIdentities, LookupError};

    const SECRET: &[u8] = b"verifier-test-secret";

    fn settings() -> AuthSettings {
        AuthSettings {
            secret: SECRET.to_vec(),
            algorithm: "HS256".to_string(),
            ttl_minutes: 15,
        }
    }

    fn user(id: &str) -> Identity {
        Identity {
            id: id.to_string(),
            user_name: "trader".to_string(),
            image_url: None,
        }
    }

    struct Fixture {
        clock: Arc<ManualClock>,
        identities: InMemoryIdentities,
        issuer: TokenIssuer,
        verifier: TokenVerifier,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::starting_at(Utc::now()));
        let identities: InMemoryIdentities = [user("u1")].into_iter().collect();
        let issuer = TokenIssuer::new(&settings())
            .unwrap()
            .with_clock(clock.clone());
        let verifier = TokenVerifier::new(
            &settings(),
            Arc::new(identities.clone()),
            Duration::from_secs(1),
        )
        .unwrap()
        .with_clock(clock.clone());

        Fixture {
            clock,
            identities,
            issuer,
            verifier,
        }
    }

    fn sign_raw(payload: Value) -> String {
        jsonwebtoken::encode(
            &Header::default(),
            &payload,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn trade_scenario() {
        let f = fixture();
        let token = f
            .issuer
            .issue(&Claims::for_user("u1").with_scopes([TRADE]))
            .unwrap();

        let identity = f
            .verifier
            .verify(&token, &RequiredScopes::from([TRADE]))
            .await
            .unwrap();
        assert_eq!(identity.id, "u1");

        let err = f
            .verifier
            .verify(&token, &RequiredScopes::from([ADMIN]))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AuthError::InsufficientScope {
                required: RequiredScopes::from([ADMIN])
            }
        );

        f.clock.advance(ChronoDuration::minutes(16));
        let err = f
            .verifier
            .verify(&token, &RequiredScopes::none())
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::CredentialsInvalid);
    }

    #[tokio::test]
    async fn valid_until_just_before_expiration() {
        let f = fixture();
        let token = f.issuer.issue(&Claims::for_user("u1")).unwrap();

        f.clock
            .advance(ChronoDuration::minutes(15) - ChronoDuration::seconds(1));
        assert!(f.verifier.verify(&token, &RequiredScopes::none()).await.is_ok());

        f.clock.advance(ChronoDuration::seconds(1));
        assert_eq!(
            f.verifier
                .verify(&token, &RequiredScopes::none())
                .await
                .unwrap_err(),
            AuthError::CredentialsInvalid
        );
    }

    #[tokio::test]
    async fn insufficient_scope_carries_full_required_set() {
        let f = fixture();
        let token = f
            .issuer
            .issue(&Claims::for_user("u1").with_scopes([TRADE]))
            .unwrap();
        let required = RequiredScopes::from([TRADE, ADMIN]);

        let err = f.verifier.verify(&token, &required).await.unwrap_err();
        assert_eq!(err, AuthError::InsufficientScope { required });
    }

    #[tokio::test]
    async fn authorize_returns_granted_scopes() {
        let f = fixture();
        let token = f
            .issuer
            .issue(&Claims::for_user("u1").with_scopes([TRADE, ADMIN]))
            .unwrap();

        let authenticated = f
            .verifier
            .authorize(&token, &RequiredScopes::from([ADMIN]))
            .await
            .unwrap();
        assert_eq!(authenticated.token.user_id, "u1");
        assert!(authenticated.token.scopes.contains(TRADE));
        assert!(authenticated.token.scopes.contains(ADMIN));
    }

    #[tokio::test]
    async fn tampered_signature_is_rejected() {
        let f = fixture();
        let token = f.issuer.issue(&Claims::for_user("u1")).unwrap();
        let signature_start = token.rfind('.').unwrap() + 1;

        for idx in signature_start..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[idx] = if bytes[idx] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();

            assert_eq!(
                f.verifier
                    .verify(&tampered, &RequiredScopes::none())
                    .await
                    .unwrap_err(),
                AuthError::CredentialsInvalid,
                "tampered byte at {idx} was accepted"
            );
        }
    }

    #[tokio::test]
    async fn wrong_secret_and_garbage_are_rejected() {
        let f = fixture();
        let other = TokenIssuer::new(&AuthSettings {
            secret: b"someone-else".to_vec(),
            ..settings()
        })
        .unwrap();
        let foreign = other.issue(&Claims::for_user("u1")).unwrap();

        for token in [foreign.as_str(), "not-a-token", "", "a.b.c"] {
            assert_eq!(
                f.verifier
                    .verify(token, &RequiredScopes::none())
                    .await
                    .unwrap_err(),
                AuthError::CredentialsInvalid
            );
        }
    }

    #[tokio::test]
    async fn algorithm_mismatch_is_rejected() {
        let f = fixture();
        let hs512 = TokenIssuer::new(&AuthSettings {
            algorithm: "HS512".to_string(),
            ..settings()
        })
        .unwrap();
        let token = hs512.issue(&Claims::for_user("u1")).unwrap();

        assert_eq!(
            f.verifier
                .verify(&token, &RequiredScopes::none())
                .await
                .unwrap_err(),
            AuthError::CredentialsInvalid
        );
    }

    #[tokio::test]
    async fn missing_identity_issues_but_fails_verification() {
        let f = fixture();
        let token = f
            .issuer
            .issue(&Claims::new().with_scopes([TRADE]))
            .unwrap();

        assert_eq!(
            f.verifier
                .verify(&token, &RequiredScopes::none())
                .await
                .unwrap_err(),
            AuthError::CredentialsInvalid
        );
    }

    #[tokio::test]
    async fn malformed_claims_are_rejected() {
        let f = fixture();
        let exp = (f.clock.now() + ChronoDuration::minutes(5)).timestamp();
        let payloads = [
            json!({"user_id": "u1", "scopes": "trade", "exp": exp}),
            json!({"user_id": ["u1"], "exp": exp}),
            json!({"user_id": "u1", "exp": "tomorrow"}),
        ];

        for payload in payloads {
            let token = sign_raw(payload);
            assert_eq!(
                f.verifier
                    .verify(&token, &RequiredScopes::none())
                    .await
                    .unwrap_err(),
                AuthError::CredentialsInvalid
            );
        }
    }

    #[tokio::test]
    async fn unknown_identity_is_credentials_invalid() {
        let f = fixture();
        let token = f
            .issuer
            .issue(&Claims::for_user("u1").with_scopes([TRADE]))
            .unwrap();
        f.identities.remove("u1");

        // Not distinguishable from a bad token, even with scopes that would not be granted.
        for required in [RequiredScopes::none(), RequiredScopes::from([ADMIN])] {
            assert_eq!(
                f.verifier.verify(&token, &required).await.unwrap_err(),
                AuthError::CredentialsInvalid
            );
        }
    }

    struct StuckLookup;

    #[async_trait]
    impl IdentityLookup for StuckLookup {
        fn backend_name(&self) -> &'static str {
            "stuck"
        }

        async fn lookup(&self, _id: &str) -> Result<Option<Identity>, LookupError> {
            std::future::pending().await
        }
    }

    struct FailingLookup;

    #[async_trait]
    impl IdentityLookup for FailingLookup {
        fn backend_name(&self) -> &'static str {
            "failing"
        }

        async fn lookup(&self, _id: &str) -> Result<Option<Identity>, LookupError> {
            Err(LookupError::Backend("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn lookup_failure_and_timeout_are_rejections() {
        let f = fixture();
        let token = f.issuer.issue(&Claims::for_user("u1")).unwrap();

        let backends: [Arc<dyn IdentityLookup>; 2] = [Arc::new(StuckLookup), Arc::new(FailingLookup)];
        for identities in backends {
            let verifier = TokenVerifier::new(&settings(), identities, Duration::from_millis(20))
                .unwrap()
                .with_clock(f.clock.clone());
            assert_eq!(
                verifier
                    .verify(&token, &RequiredScopes::none())
                    .await
                    .unwrap_err(),
                AuthError::CredentialsInvalid
            );
        }
    }
}
