//! VAPID key pairs in their persisted string form.
//!
//! A [`VapidKeyPair`] holds the application server's P-256 key pair the way it
//! is exchanged with browsers and stored by applications: the uncompressed
//! public point and the raw private scalar, each encoded as Base64Url without
//! padding.

use alloc::string::String;
use core::fmt;

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::{
    base64_url,
    crypto::{
        self,
        ec::{POINT_LEN, SCALAR_LEN},
        PrivateScalar,
    },
};

/// Length of the encoded public key, 65 bytes without padding.
pub const PUBLIC_KEY_LEN: usize = 87;

/// Length of the encoded private key, 32 bytes without padding.
pub const PRIVATE_KEY_LEN: usize = 43;

/// An error returned if a new key pair could not be generated.
#[derive(Debug, Error)]
#[error("failed to generate a VAPID key pair")]
pub struct KeyGenerationError(#[source] crypto::Error);

/// An error returned if a stored key pair is malformed.
///
/// Every variant names exactly one failed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum KeyValidationError {
    /// The public key does not have 87 characters.
    #[error("invalid public key length: expected 87 characters, got {0}")]
    PublicKeyLength(usize),

    /// The private key does not have 43 characters.
    #[error("invalid private key length: expected 43 characters, got {0}")]
    PrivateKeyLength(usize),

    /// The public key is not valid Base64Url without padding.
    #[error("the public key is not a valid Base64Url string")]
    PublicKeyEncoding,

    /// The private key is not valid Base64Url without padding.
    #[error("the private key is not a valid Base64Url string")]
    PrivateKeyEncoding,

    /// The private key decodes, but is not a usable P-256 scalar.
    #[error("the private key is not a valid P-256 scalar")]
    PrivateKeyScalar,
}

/// A P-256 key pair used to identify an application server to push services.
///
/// The private key is wiped from memory once the key pair is dropped, and never
/// printed by the [`Debug`](fmt::Debug) implementation.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VapidKeyPair {
    /// Base64Url of the uncompressed public point `0x04 || X || Y`.
    pub public_key: String,
    /// Base64Url of the 32 byte big-endian private scalar.
    pub private_key: Zeroizing<String>,
}

impl VapidKeyPair {
    /// Creates a key pair from its two string halves without checking them.
    ///
    /// Use [`validate_keys`] to check a key pair that was loaded from storage.
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: Zeroizing::new(private_key.into()),
        }
    }

    /// Rebuilds the full key pair from a stored private key alone.
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] if the private key is malformed or not a valid
    /// P-256 scalar.
    pub fn from_private_key(private_key: &str) -> Result<Self, KeyValidationError> {
        check_private_key(private_key)?;

        let secret = base64_url::decode_secret::<SCALAR_LEN>(private_key)
            .map_err(|_| KeyValidationError::PrivateKeyEncoding)?;
        let scalar = PrivateScalar::from_secret(&secret)
            .map_err(|_| KeyValidationError::PrivateKeyScalar)?;

        Ok(Self::from_scalar(&scalar))
    }

    fn from_scalar(scalar: &PrivateScalar) -> Self {
        let point = crypto::derive_public_point(scalar);

        Self {
            public_key: Base64UrlUnpadded::encode_string(point.as_bytes()),
            private_key: Zeroizing::new(Base64UrlUnpadded::encode_string(
                scalar.to_bytes().as_slice(),
            )),
        }
    }

    /// Decodes the public key into its 65 raw bytes.
    ///
    /// This is the value browsers expect as `applicationServerKey` when
    /// subscribing to push messages.
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] if the public key is malformed.
    pub fn public_key_bytes(&self) -> Result<[u8; POINT_LEN], KeyValidationError> {
        check_public_key(&self.public_key)?;

        base64_url::decode_array::<POINT_LEN>(&self.public_key)
            .map_err(|_| KeyValidationError::PublicKeyEncoding)
    }
}

impl fmt::Debug for VapidKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VapidKeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// Generates a new VAPID key pair from the operating system's secure random
/// source.
///
/// # Errors
///
/// Returns an [`Err`] if the random source or the curve arithmetic fails.
/// This is not expected to happen and retrying will not help.
pub fn generate_vapid() -> Result<VapidKeyPair, KeyGenerationError> {
    let scalar = PrivateScalar::generate().map_err(KeyGenerationError)?;
    let keys = VapidKeyPair::from_scalar(&scalar);

    tracing::debug!(public_key = %keys.public_key, "generated VAPID key pair");

    Ok(keys)
}

/// Checks that a stored key pair is well formed.
///
/// This is a syntactic check only: both keys must have the right length and be
/// valid Base64Url without padding. It does not check that the public key
/// belongs to the private key.
///
/// # Errors
///
/// Returns the [`KeyValidationError`] of the first check that failed.
pub fn validate_keys(keys: &VapidKeyPair) -> Result<(), KeyValidationError> {
    let res = check_public_key(&keys.public_key)
        .and_then(|_| check_private_key(&keys.private_key))
        .and_then(|_| {
            Base64UrlUnpadded::decode_vec(&keys.public_key)
                .map(|_| ())
                .map_err(|_| KeyValidationError::PublicKeyEncoding)
        })
        .and_then(|_| {
            base64_url::decode_secret::<SCALAR_LEN>(&keys.private_key)
                .map(|_| ())
                .map_err(|_| KeyValidationError::PrivateKeyEncoding)
        });

    if let Err(ref e) = res {
        tracing::debug!(error = %e, "rejected VAPID key pair");
    }

    res
}

fn check_public_key(key: &str) -> Result<(), KeyValidationError> {
    match key.len() {
        PUBLIC_KEY_LEN => Ok(()),
        len => Err(KeyValidationError::PublicKeyLength(len)),
    }
}

fn check_private_key(key: &str) -> Result<(), KeyValidationError> {
    match key.len() {
        PRIVATE_KEY_LEN => Ok(()),
        len => Err(KeyValidationError::PrivateKeyLength(len)),
    }
}
