//! RSA key material for token signing and verification.
//!
//! Keys are stored as DER: PKCS#8 for the private key, X.509
//! `SubjectPublicKeyInfo` for public keys.
//!
//! # Pre-conditions
//! - Key bytes must be non-empty DER of the expected encoding.
//!
//! # Post-conditions
//! - A successfully parsed key is a valid RSA key and carries a ready-to-use
//!   `jsonwebtoken` signing or verification key.
//!
//! # Invariants
//! - Parsed keys are immutable.

use jsonwebtoken::{DecodingKey, EncodingKey};
use rsa::pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::resource::ResourceError;

/// Error returned when key bytes are unusable.
///
/// Empty input and rejected encodings are the same kind of failure; the
/// variants only differ in what they report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyManagementError {
    /// The key bytes are empty.
    Empty,
    /// The bytes are not a valid RSA key in the expected encoding.
    InvalidEncoding(String),
}

impl std::fmt::Display for KeyManagementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "key material is empty"),
            Self::InvalidEncoding(reason) => write!(f, "invalid RSA key encoding: {reason}"),
        }
    }
}

impl std::error::Error for KeyManagementError {}

/// Error returned by the key accessors when key material cannot be resolved.
#[derive(Debug)]
pub enum KeyMaterialError {
    /// The key resource does not exist.
    NotFound {
        /// The resource name taken from the configuration.
        resource: String,
        /// The store error.
        source: ResourceError,
    },
    /// The key resource exists but could not be read.
    ReadFailure {
        /// The resource name taken from the configuration.
        resource: String,
        /// The store error.
        source: ResourceError,
    },
    /// The key resource was read but does not hold a usable key.
    MalformedKey {
        /// The resource name taken from the configuration.
        resource: String,
        /// The parse error.
        source: KeyManagementError,
    },
}

impl KeyMaterialError {
    /// The name of the key resource that failed.
    #[must_use]
    pub fn resource(&self) -> &str {
        match self {
            Self::NotFound { resource, .. }
            | Self::ReadFailure { resource, .. }
            | Self::MalformedKey { resource, .. } => resource,
        }
    }

    pub(crate) fn malformed(resource: &str, source: KeyManagementError) -> Self {
        Self::MalformedKey {
            resource: resource.to_string(),
            source,
        }
    }
}

impl From<ResourceError> for KeyMaterialError {
    fn from(e: ResourceError) -> Self {
        let resource = e.name().to_string();
        match e {
            ResourceError::NotFound(_) => Self::NotFound {
                resource,
                source: e,
            },
            ResourceError::Io { .. } => Self::ReadFailure {
                resource,
                source: e,
            },
        }
    }
}

impl std::fmt::Display for KeyMaterialError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { resource, .. } => write!(f, "key file {resource} not found"),
            Self::ReadFailure { resource, source } => {
                write!(f, "could not read key file {resource}: {source}")
            }
            Self::MalformedKey { resource, source } => {
                write!(f, "unusable key in {resource}: {source}")
            }
        }
    }
}

impl std::error::Error for KeyMaterialError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound { source, .. } | Self::ReadFailure { source, .. } => Some(source),
            Self::MalformedKey { source, .. } => Some(source),
        }
    }
}

/// An RSA private key used to sign tokens.
#[derive(Clone)]
pub struct PrivateKey {
    rsa: RsaPrivateKey,
    encoding: EncodingKey,
}

impl PrivateKey {
    /// Parse a PKCS#8 DER-encoded RSA private key.
    ///
    /// # Errors
    /// Returns `KeyManagementError::Empty` for empty input and
    /// `KeyManagementError::InvalidEncoding` if the bytes are not a PKCS#8 RSA key.
    pub fn from_pkcs8_der(bytes: &[u8]) -> Result<Self, KeyManagementError> {
        if bytes.is_empty() {
            return Err(KeyManagementError::Empty);
        }

        let rsa = RsaPrivateKey::from_pkcs8_der(bytes)
            .map_err(|e| KeyManagementError::InvalidEncoding(e.to_string()))?;
        // jsonwebtoken expects the PKCS#1 form.
        let pkcs1 = rsa
            .to_pkcs1_der()
            .map_err(|e| KeyManagementError::InvalidEncoding(e.to_string()))?;
        let encoding = EncodingKey::from_rsa_der(pkcs1.as_bytes());

        Ok(Self { rsa, encoding })
    }

    /// The underlying RSA key.
    #[must_use]
    pub const fn rsa(&self) -> &RsaPrivateKey {
        &self.rsa
    }

    /// The key in the form `jsonwebtoken` signs with.
    #[must_use]
    pub const fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    /// The public half of this key.
    ///
    /// # Errors
    /// Returns `KeyManagementError::InvalidEncoding` if the public half cannot be encoded.
    pub fn public_key(&self) -> Result<PublicKey, KeyManagementError> {
        PublicKey::from_rsa(self.rsa.to_public_key())
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.rsa == other.rsa
    }
}

impl Eq for PrivateKey {}

impl std::fmt::Debug for PrivateKey {
    // Never print private components.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("bits", &(self.rsa.size() * 8))
            .finish_non_exhaustive()
    }
}

/// An RSA public key used to verify tokens.
#[derive(Clone)]
pub struct PublicKey {
    rsa: RsaPublicKey,
    decoding: DecodingKey,
}

impl PublicKey {
    /// Parse an X.509 `SubjectPublicKeyInfo` DER-encoded RSA public key.
    ///
    /// # Errors
    /// Returns `KeyManagementError::Empty` for empty input and
    /// `KeyManagementError::InvalidEncoding` if the bytes are not an SPKI RSA key.
    pub fn from_public_key_der(bytes: &[u8]) -> Result<Self, KeyManagementError> {
        if bytes.is_empty() {
            return Err(KeyManagementError::Empty);
        }

        let rsa = RsaPublicKey::from_public_key_der(bytes)
            .map_err(|e| KeyManagementError::InvalidEncoding(e.to_string()))?;

        Self::from_rsa(rsa)
    }

    fn from_rsa(rsa: RsaPublicKey) -> Result<Self, KeyManagementError> {
        let pkcs1 = rsa
            .to_pkcs1_der()
            .map_err(|e| KeyManagementError::InvalidEncoding(e.to_string()))?;
        let decoding = DecodingKey::from_rsa_der(pkcs1.as_bytes());

        Ok(Self { rsa, decoding })
    }

    /// The underlying RSA key.
    #[must_use]
    pub const fn rsa(&self) -> &RsaPublicKey {
        &self.rsa
    }

    /// The key in the form `jsonwebtoken` verifies with.
    #[must_use]
    pub const fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }

    /// PEM (`BEGIN PUBLIC KEY`) encoding of this key.
    ///
    /// # Errors
    /// Returns `KeyManagementError::InvalidEncoding` if the key cannot be encoded.
    pub fn to_pem(&self) -> Result<String, KeyManagementError> {
        self.rsa
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| KeyManagementError::InvalidEncoding(e.to_string()))
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.rsa == other.rsa
    }
}

impl Eq for PublicKey {}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicKey")
            .field("bits", &(self.rsa.size() * 8))
            .finish_non_exhaustive()
    }
}
