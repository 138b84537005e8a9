//! Assembly of the JSON Web Token (JWT) carried in the VAPID header, as
//! defined in [RFC 7519] and restricted by [section 2 of RFC 8292].
//!
//! [RFC 7519]: <https://datatracker.ietf.org/doc/html/rfc7519>
//! [section 2 of RFC 8292]: <https://datatracker.ietf.org/doc/html/rfc8292#section-2>

mod compact;

use alloc::{string::String, vec::Vec};

use thiserror::Error;

pub use self::compact::Compact;
use crate::{base64_url::Base64UrlString, claims::Claims, sign::Signer, SigningError};

/// The JOSE header of every VAPID token, `{"typ":"JWT","alg":"ES256"}`
/// encoded as Base64Url.
///
/// VAPID only allows `ES256`, so the header never changes.
pub const JWT_HEADER: &str = "eyJ0eXAiOiJKV1QiLCJhbGciOiJFUzI1NiJ9";

/// An error returned if the claims could not be serialized into JSON.
#[derive(Debug, Error)]
#[cfg_attr(feature = "std", error("failed to serialize the claims"))]
#[cfg_attr(not(feature = "std"), error("failed to serialize the claims: {0}"))]
pub struct ClaimsEncodingError(#[cfg_attr(feature = "std", source)] pub(crate) serde_json::Error);

/// A JWT whose header and payload are encoded, but which is not signed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedToken {
    header: Base64UrlString,
    payload: Base64UrlString,
}

impl UnsignedToken {
    /// Encodes the claims into the payload of a new token.
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] if one of the claims can not be serialized.
    pub fn new(claims: &Claims) -> Result<Self, ClaimsEncodingError> {
        let payload = serde_json::to_vec(claims).map_err(ClaimsEncodingError)?;

        Ok(Self {
            header: Base64UrlString::from_trusted(JWT_HEADER),
            payload: Base64UrlString::encode(payload),
        })
    }

    /// The encoded header segment.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// The encoded payload segment.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// The bytes covered by the signature, `header || '.' || payload`.
    pub fn signing_input(&self) -> Vec<u8> {
        let mut input = String::with_capacity(self.header.len() + 1 + self.payload.len());
        input.push_str(&self.header);
        input.push('.');
        input.push_str(&self.payload);
        input.into_bytes()
    }

    /// Signs the token, returning the complete three part JWT.
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] if the signer fails.
    pub fn sign(self, signer: &Signer<'_>) -> Result<Compact, SigningError> {
        let signature = signer.sign(&self.signing_input())?;

        let mut compact = Compact::with_capacity(3);
        compact.push_base64url(self.header);
        compact.push_base64url(self.payload);
        compact.push(signature);

        Ok(compact)
    }
}
