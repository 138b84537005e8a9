//! The P-256 primitives: scalar generation, public point derivation and
//! fixed-width `ES256` signatures.

use core::fmt;

use elliptic_curve::{
    generic_array::typenum::Unsigned, sec1::ToEncodedPoint as _, FieldBytesSize,
    SecretKey,
};
use p256::NistP256;
use rand_core::{OsRng, RngCore as _};
use secrecy::{ExposeSecret as _, SecretSlice};
use sha2::{Digest as _, Sha256};
use signature::{DigestSigner as _, DigestVerifier as _, RandomizedDigestSigner as _};
use zeroize::Zeroizing;

use super::{Error, Result};

/// Length of a serialized private scalar.
pub const SCALAR_LEN: usize = 32;

/// Length of an uncompressed SEC1 point (`0x04 || X || Y`).
pub const POINT_LEN: usize = 1 + 2 * SCALAR_LEN;

/// Length of a raw `r || s` signature.
pub const SIGNATURE_LEN: usize = 2 * SCALAR_LEN;

/// The tag byte of an uncompressed SEC1 point.
const UNCOMPRESSED_TAG: u8 = 0x04;

// the fixed-width signature encoding relies on a 256 bit curve order
const _: () = assert!(<FieldBytesSize<NistP256> as Unsigned>::USIZE == SCALAR_LEN);

/// Number of rejected candidates after which scalar generation gives up.
///
/// A uniformly random 256 bit value is out of range with a probability of
/// roughly 2^-32, so reaching this limit means the random source is broken.
const MAX_GENERATE_ATTEMPTS: usize = 8;

/// A P-256 private scalar.
#[derive(Clone)]
pub struct PrivateScalar(SecretKey<NistP256>);

impl PrivateScalar {
    /// Draws a new scalar from the operating system's secure random source.
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] if the random source fails, or keeps producing
    /// values outside of `[1, n)`.
    pub fn generate() -> Result<Self> {
        for _ in 0..MAX_GENERATE_ATTEMPTS {
            let mut candidate = Zeroizing::new([0u8; SCALAR_LEN]);
            OsRng.try_fill_bytes(candidate.as_mut_slice())?;

            if let Ok(scalar) = Self::from_bytes(candidate.as_slice()) {
                return Ok(scalar);
            }
        }

        Err(Error::InvalidScalar)
    }

    /// Creates a scalar from its 32 byte big-endian representation.
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] if `bytes` is not exactly 32 bytes long, or if the
    /// value is zero or not smaller than the curve order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SCALAR_LEN {
            return Err(Error::InvalidLength {
                expected: SCALAR_LEN,
                actual: bytes.len(),
            });
        }

        SecretKey::<NistP256>::from_slice(bytes)
            .map(Self)
            .map_err(|_| Error::InvalidScalar)
    }

    pub(crate) fn from_secret(bytes: &SecretSlice<u8>) -> Result<Self> {
        Self::from_bytes(bytes.expose_secret())
    }

    /// Returns the 32 byte big-endian representation, left padded with zeros.
    pub fn to_bytes(&self) -> Zeroizing<[u8; SCALAR_LEN]> {
        let mut out = Zeroizing::new([0u8; SCALAR_LEN]);
        out.copy_from_slice(&self.0.to_bytes());
        out
    }

    /// Signs `msg` with `ES256`, returning the signature as `r || s` with both
    /// halves left padded to 32 bytes.
    ///
    /// If `deterministic` is set, the nonce is derived according to
    /// [RFC 6979](https://www.rfc-editor.org/rfc/rfc6979), otherwise it is
    /// drawn from the operating system's random source.
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] if the signing primitive fails.
    pub fn sign(&self, msg: &[u8], deterministic: bool) -> Result<[u8; SIGNATURE_LEN]> {
        // builds the signing key, which multiplies the base point by the scalar
        // once more to recover the public point
        let key = ecdsa::SigningKey::<NistP256>::from(&self.0);
        let digest = Sha256::new_with_prefix(msg);

        let sig: Result<ecdsa::Signature<NistP256>, signature::Error> = if deterministic {
            key.try_sign_digest(digest)
        } else {
            key.try_sign_digest_with_rng(&mut OsRng, digest)
        };
        let sig = sig.map_err(Error::Ecdsa)?;

        let (r, s) = sig.split_bytes();

        let mut out = [0u8; SIGNATURE_LEN];
        out[..SCALAR_LEN].copy_from_slice(&r);
        out[SCALAR_LEN..].copy_from_slice(&s);
        Ok(out)
    }
}

impl fmt::Debug for PrivateScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PrivateScalar").field(&"[REDACTED]").finish()
    }
}

/// An uncompressed P-256 public point.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicPoint {
    key: elliptic_curve::PublicKey<NistP256>,
    bytes: [u8; POINT_LEN],
}

impl PublicPoint {
    fn new(key: elliptic_curve::PublicKey<NistP256>) -> Self {
        let point = key.to_encoded_point(false);

        // a valid public key is never the identity, so this is always the full
        // 65 byte encoding
        let mut bytes = [0u8; POINT_LEN];
        bytes.copy_from_slice(point.as_bytes());

        Self { key, bytes }
    }

    /// Parses an uncompressed SEC1 point (`0x04 || X || Y`).
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] if `bytes` has the wrong length, uses another
    /// encoding, or does not lie on the curve.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != POINT_LEN {
            return Err(Error::InvalidLength {
                expected: POINT_LEN,
                actual: bytes.len(),
            });
        }

        if bytes[0] != UNCOMPRESSED_TAG {
            return Err(Error::InvalidPoint);
        }

        let key = elliptic_curve::PublicKey::<NistP256>::from_sec1_bytes(bytes)
            .map_err(|_| Error::InvalidPoint)?;
        Ok(Self::new(key))
    }

    /// The 65 byte uncompressed encoding of this point.
    pub const fn as_bytes(&self) -> &[u8; POINT_LEN] {
        &self.bytes
    }

    /// Verifies a raw `r || s` `ES256` signature over `msg`.
    ///
    /// Returns `true` if the signature is valid, `false` otherwise.
    pub fn verify(&self, msg: &[u8], signature: &[u8]) -> bool {
        let Ok(sig) = ecdsa::Signature::<NistP256>::from_slice(signature) else {
            return false;
        };

        let key = ecdsa::VerifyingKey::<NistP256>::from(&self.key);
        key.verify_digest(Sha256::new_with_prefix(msg), &sig).is_ok()
    }
}

impl fmt::Debug for PublicPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicPoint")
            .field(&crate::Base64UrlString::encode(self.bytes))
            .finish()
    }
}

/// Computes `d * G`, the public point belonging to the private scalar `d`.
///
/// This is a pure function of the scalar, no stored public key is needed.
pub fn derive_public_point(scalar: &PrivateScalar) -> PublicPoint {
    PublicPoint::new(scalar.0.public_key())
}
