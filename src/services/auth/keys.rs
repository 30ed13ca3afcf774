use std::str::FromStr;

use jsonwebtoken::Algorithm;

use crate::config::AuthSettings;
use crate::services::auth::error::SigningError;

/// Resolve the configured algorithm. Only the HMAC family works with a shared secret.
pub(crate) fn hmac_algorithm(name: &str) -> Result<Algorithm, SigningError> {
    let algorithm = Algorithm::from_str(name.trim())
        .map_err(|_| SigningError::UnsupportedAlgorithm(name.to_string()))?;

    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        _ => Err(SigningError::UnsupportedAlgorithm(name.to_string())),
    }
}

pub(crate) fn resolve(settings: &AuthSettings) -> Result<(Algorithm, &[u8]), SigningError> {
    if settings.secret.is_empty() {
        return Err(SigningError::EmptySecret);
    }
    let algorithm = hmac_algorithm(&settings.algorithm)?;
    Ok((algorithm, &settings.secret))
}
