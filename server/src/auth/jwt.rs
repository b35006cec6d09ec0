//! JWT issuing and verification.
//!
//! Tokens are always RS256. The keyshare server signs with its signing private
//! key and verifies its own tokens with the signing public key; tokens from the
//! API server are verified with the API server's public key.
//!
//! # Pre-conditions
//! - Key material referenced by the configuration must be valid.
//!
//! # Post-conditions
//! - Issued tokens carry `sub`, `iss` (the server name), `iat` and `exp`
//!   (`iat` plus the configured PIN expiry).
//! - Verification requires only `sub` and `exp`, so peers may omit `iss` and `iat`.
//! - On success, verification returns the token's claims.
//!
//! # Invariants
//! - Verification is stateless and does not modify any external state.

use jsonwebtoken::{DecodingKey, Header, Validation, decode, encode, get_current_timestamp};
use serde::{Deserialize, Serialize};

use crate::configuration::{Configuration, JWT_ALGORITHM};
use crate::keys::{KeyMaterialError, PublicKey};

/// Claims carried by a keyshare token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the username the token was issued for.
    pub sub: String,
    /// Issuer, the issuing server's name. Always set on tokens issued here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Issued-at, seconds since the Unix epoch. Always set on tokens issued here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    /// Expiry, seconds since the Unix epoch.
    pub exp: u64,
}

/// Error returned when issuing or verifying a JWT fails.
#[derive(Debug)]
pub enum JwtError {
    /// The JWT signature is invalid.
    InvalidSignature,
    /// The JWT has expired.
    TokenExpired,
    /// The JWT is malformed or cannot be parsed.
    MalformedToken,
    /// The 'sub' claim is missing or empty.
    MissingSubClaim,
    /// The key needed to sign or verify could not be resolved.
    KeyMaterial(KeyMaterialError),
    /// Signing the token failed.
    Signing(String),
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSignature => write!(f, "invalid JWT signature"),
            Self::TokenExpired => write!(f, "JWT has expired"),
            Self::MalformedToken => write!(f, "malformed JWT"),
            Self::MissingSubClaim => write!(f, "missing 'sub' claim in JWT"),
            Self::KeyMaterial(e) => write!(f, "key material unavailable: {e}"),
            Self::Signing(reason) => write!(f, "could not sign JWT: {reason}"),
        }
    }
}

impl std::error::Error for JwtError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::KeyMaterial(e) => Some(e),
            _ => None,
        }
    }
}

impl From<KeyMaterialError> for JwtError {
    fn from(e: KeyMaterialError) -> Self {
        Self::KeyMaterial(e)
    }
}

/// Issues a token for `subject`, valid for the configured PIN expiry.
///
/// # Errors
/// Returns `JwtError::KeyMaterial` if the signing key is unusable, or
/// `JwtError::Signing` if encoding fails.
pub fn issue_token(configuration: &Configuration, subject: &str) -> Result<String, JwtError> {
    let key = configuration.signing_private_key()?;
    let settings = configuration.settings();

    let iat = get_current_timestamp();
    let claims = Claims {
        sub: subject.to_string(),
        iss: Some(settings.server_name().to_string()),
        iat: Some(iat),
        exp: iat.saturating_add(settings.pin_expiry()),
    };

    encode(&Header::new(JWT_ALGORITHM), &claims, key.encoding_key())
        .map_err(|e| JwtError::Signing(e.to_string()))
}

/// Verifies a token signed by this server, using the signing public key.
///
/// # Errors
/// Returns `JwtError` if the key is unusable or verification fails.
pub fn verify_own_token(configuration: &Configuration, token: &str) -> Result<Claims, JwtError> {
    let key = configuration.signing_public_key()?;
    verify_token(token, key)
}

/// Verifies a token signed by the API server.
///
/// The API server key is re-read for every call.
///
/// # Errors
/// Returns `JwtError` if the key is unusable or verification fails.
pub fn verify_api_server_token(
    configuration: &Configuration,
    token: &str,
) -> Result<Claims, JwtError> {
    let key = configuration.api_server_public_key()?;
    verify_token(token, &key)
}

/// Verifies an RS256 token against `key` and returns its claims.
///
/// # Errors
/// Returns `JwtError` based on the type of failure.
pub fn verify_token(token: &str, key: &PublicKey) -> Result<Claims, JwtError> {
    let validation = Validation::new(JWT_ALGORITHM);
    decode_claims(token, key.decoding_key(), &validation)
}

fn decode_claims(
    token: &str,
    key: &DecodingKey,
    validation: &Validation,
) -> Result<Claims, JwtError> {
    let token_data = decode::<Claims>(token, key, validation).map_err(map_jwt_error)?;

    if token_data.claims.sub.is_empty() {
        return Err(JwtError::MissingSubClaim);
    }

    Ok(token_data.claims)
}

/// Maps jsonwebtoken errors to our JwtError type.
fn map_jwt_error(error: jsonwebtoken::errors::Error) -> JwtError {
    use jsonwebtoken::errors::ErrorKind;

    match error.kind() {
        ErrorKind::InvalidSignature => JwtError::InvalidSignature,
        ErrorKind::ExpiredSignature => JwtError::TokenExpired,
        _ => JwtError::MalformedToken,
    }
}
