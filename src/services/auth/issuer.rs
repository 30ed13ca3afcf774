use std::sync::Arc;

use chrono::Duration as ChronoDuration;
use jsonwebtoken::{EncodingKey, Header};
use tracing::{debug, error};

use crate::config::AuthSettings;
use crate::services::auth::claims::{Claims, EXPIRATION_CLAIM};
use crate::services::auth::clock::{Clock, SystemClock};
use crate::services::auth::error::SigningError;
use crate::services::auth::keys;

/// Signs caller claims into a time-limited bearer token.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenIssuer {
    header: Header,
    encoding_key: EncodingKey,
    ttl: ChronoDuration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("algorithm", &self.header.alg)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenIssuer {
    pub fn new(settings: &AuthSettings) -> Result<Self, SigningError> {
        let (algorithm, secret) = keys::resolve(settings)?;

        // typ defaults to "JWT"
        let header = Header::new(algorithm);

        Ok(Self {
            header,
            encoding_key: EncodingKey::from_secret(secret),
            ttl: settings.ttl(),
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl(&self) -> ChronoDuration {
        self.ttl
    }

    /// Issue a token for `claims`.
    ///
    /// The claims are copied and `exp = now + ttl` is merged in, replacing any caller-supplied `exp`.
    /// Identity/scope content is not validated here; that is the verifier's job.
    pub fn issue(&self, claims: &Claims) -> Result<String, SigningError> {
        let expires_at = self.clock.now() + self.ttl;

        let mut to_encode = claims.clone();
        to_encode.insert(EXPIRATION_CLAIM, expires_at.timestamp());

        debug!(expires_at = %expires_at, "Issuing access token");

        jsonwebtoken::encode(&self.header, &to_encode, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign access token");
            SigningError::from(e)
        })
    }
}
