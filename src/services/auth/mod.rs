pub mod claims;
pub mod clock;
pub mod error;
pub mod issuer;
mod keys;
pub mod scopes;
pub mod verifier;

pub use claims::{Claims, TokenData};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AuthError, SigningError};
pub use issuer::TokenIssuer;
pub use scopes::RequiredScopes;
pub use verifier::{Authenticated, TokenVerifier};
