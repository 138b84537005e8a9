use alloc::{string::String, vec::Vec};

use thiserror::Error;

use crate::{
    base64_url::decode_array,
    claims::Claims,
    crypto::{ec::POINT_LEN, PublicPoint},
    jwt::JWT_HEADER,
    VapidAuthorization,
};

/// An error returned if a VAPID header could not be parsed or verified.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VerifyError {
    /// The header value does not have the `vapid t=<jwt>, k=<key>` layout.
    #[error("malformed VAPID authorization header")]
    Malformed,

    /// The JOSE header of the token is not `{"typ":"JWT","alg":"ES256"}`.
    #[error("the token header is not an ES256 JWT header")]
    UnsupportedHeader,

    /// The `k` parameter is not an uncompressed P-256 point.
    #[error("the public key is not an uncompressed P-256 point")]
    InvalidPublicKey,

    /// The signature does not match the token and public key.
    #[error("the token signature is invalid")]
    InvalidSignature,

    /// The payload is not a valid set of claims.
    #[cfg_attr(feature = "std", error("the token payload is not a valid set of claims"))]
    #[cfg_attr(
        not(feature = "std"),
        error("the token payload is not a valid set of claims: {0}")
    )]
    InvalidClaims(#[cfg_attr(feature = "std", source)] serde_json::Error),
}

impl VapidAuthorization {
    /// Verifies the token signature using the public key from the header, and
    /// decodes the claims.
    ///
    /// The claims are not validated, use
    /// [`verify_claims`](crate::verify_claims) for that.
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] if the token has an unexpected header, the public key
    /// is invalid, or the signature does not verify.
    pub fn verify(&self) -> Result<Claims, VerifyError> {
        let (Some(header), Some(payload), Some(signature)) =
            (self.token.part(0), self.token.part(1), self.token.part(2))
        else {
            return Err(VerifyError::Malformed);
        };

        if &**header != JWT_HEADER {
            return Err(VerifyError::UnsupportedHeader);
        }

        let point = decode_array::<POINT_LEN>(&self.public_key)
            .ok()
            .and_then(|bytes| PublicPoint::from_bytes(&bytes).ok())
            .ok_or(VerifyError::InvalidPublicKey)?;

        let mut input = String::with_capacity(header.len() + 1 + payload.len());
        input.push_str(header);
        input.push('.');
        input.push_str(payload);

        if !point.verify(input.as_bytes(), &signature.decode()) {
            tracing::debug!("rejected VAPID token with invalid signature");
            return Err(VerifyError::InvalidSignature);
        }

        let payload: Vec<u8> = payload.decode();
        serde_json::from_slice(&payload).map_err(VerifyError::InvalidClaims)
    }
}
