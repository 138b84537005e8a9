use core::fmt;

use thiserror::Error;

use crate::{
    base64_url::{self, Base64UrlString},
    crypto::{
        self,
        ec::{SCALAR_LEN, SIGNATURE_LEN},
        PrivateScalar,
    },
};

/// An error returned if a token could not be signed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SigningError {
    /// The private key is not 32 bytes of Base64Url.
    #[error("the private key is not a valid Base64Url string")]
    PrivateKeyEncoding,

    /// The private key is not a usable P-256 scalar.
    #[error("the private key is not a valid P-256 scalar")]
    InvalidPrivateKey(#[source] crypto::Error),

    /// The random source or the signing primitive failed.
    #[error("failed to create the EcDSA signature")]
    Crypto(#[source] crypto::Error),
}

/// A raw `ES256` signature: `r` and `s`, each left padded to 32 bytes.
///
/// This is the fixed-width format JWS uses, not the ASN.1/DER encoding most
/// other protocols use for EcDSA signatures.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Signature([u8; SIGNATURE_LEN]);

impl Signature {
    /// The `r` half.
    pub fn r(&self) -> &[u8] {
        &self.0[..SCALAR_LEN]
    }

    /// The `s` half.
    pub fn s(&self) -> &[u8] {
        &self.0[SCALAR_LEN..]
    }

    /// The signature encoded as Base64Url, as used in the third JWT segment.
    pub fn to_base64url(&self) -> Base64UrlString {
        Base64UrlString::encode(self.0)
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Signature> for [u8; SIGNATURE_LEN] {
    fn from(value: Signature) -> Self {
        value.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.to_base64url(), f)
    }
}

/// Signs tokens with the private key of a [`VapidKeyPair`](crate::VapidKeyPair).
///
/// The signer only borrows the encoded private key. The scalar is decoded for
/// every signature and wiped right after.
pub struct Signer<'a> {
    private_key: &'a str,
    deterministic: bool,
}

impl<'a> Signer<'a> {
    /// Creates a signer for the given Base64Url encoded private scalar.
    pub const fn new(private_key: &'a str) -> Self {
        Self {
            private_key,
            deterministic: cfg!(feature = "deterministic-ecdsa"),
        }
    }

    /// Makes the sign operation of this EcDSA signer deterministic.
    ///
    /// This enables deterministic signature values, according to [RFC 6979](https://www.rfc-editor.org/rfc/rfc6979).
    pub const fn deterministic(mut self, deterministic: bool) -> Self {
        self.deterministic = deterministic;
        self
    }

    /// Signs `msg`.
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] if the private key is invalid, or the signing
    /// primitive fails.
    pub fn sign(&self, msg: &[u8]) -> Result<Signature, SigningError> {
        let secret = base64_url::decode_secret::<SCALAR_LEN>(self.private_key)
            .map_err(|_| SigningError::PrivateKeyEncoding)?;
        let scalar =
            PrivateScalar::from_secret(&secret).map_err(SigningError::InvalidPrivateKey)?;

        tracing::trace!(len = msg.len(), deterministic = self.deterministic, "signing");

        let sig = scalar
            .sign(msg, self.deterministic)
            .map_err(SigningError::Crypto)?;

        Ok(Signature(sig))
    }
}

impl fmt::Debug for Signer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("private_key", &"[REDACTED]")
            .field("deterministic", &self.deterministic)
            .finish()
    }
}

/// Signs `signing_input` with `private_key`, returning the Base64Url encoded
/// signature segment.
///
/// # Errors
///
/// Returns an [`Err`] if the private key is invalid, or the signing primitive
/// fails.
pub fn sign(private_key: &str, signing_input: &[u8]) -> Result<Base64UrlString, SigningError> {
    Signer::new(private_key)
        .sign(signing_input)
        .map(|sig| sig.to_base64url())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{crypto::derive_public_point, generate_vapid};

    #[test]
    fn signature_segment_is_fixed_width() {
        let keys = generate_vapid().unwrap();

        for _ in 0..32 {
            let segment = sign(&keys.private_key, b"header.payload").unwrap();
            assert_eq!(segment.len(), 86);
            assert_eq!(segment.decode().len(), 64);
        }
    }

    #[test]
    fn signature_verifies_against_derived_point() {
        let keys = generate_vapid().unwrap();
        let sig = Signer::new(&keys.private_key).sign(b"a.b").unwrap();

        let secret = base64_url::decode_secret::<SCALAR_LEN>(&keys.private_key).unwrap();
        let point = derive_public_point(&PrivateScalar::from_secret(&secret).unwrap());

        assert!(point.verify(b"a.b", sig.as_ref()));
        assert_eq!(&[sig.r(), sig.s()].concat(), sig.as_ref());
    }

    #[test]
    fn deterministic_signatures_repeat() {
        let keys = generate_vapid().unwrap();
        let signer = Signer::new(&keys.private_key).deterministic(true);

        assert_eq!(signer.sign(b"msg").unwrap(), signer.sign(b"msg").unwrap());
    }

    #[test]
    fn rejects_bad_private_keys() {
        assert!(matches!(
            sign("not base64!", b"msg"),
            Err(SigningError::PrivateKeyEncoding)
        ));
        assert!(matches!(
            sign("AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA", b"msg"),
            Err(SigningError::InvalidPrivateKey(crypto::Error::InvalidScalar))
        ));
    }
}
