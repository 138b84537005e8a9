use thiserror::Error;

use crate::{
    ClaimsEncodingError, ClaimsValidationError, KeyGenerationError, KeyValidationError,
    SigningError,
};

/// The error type of the operations in this crate that run several steps.
///
/// Every variant wraps the error of the step that failed, so callers can see
/// which check needs to be fixed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A new key pair could not be generated.
    #[error(transparent)]
    KeyGeneration(#[from] KeyGenerationError),

    /// The stored key pair is malformed.
    #[error(transparent)]
    KeyValidation(#[from] KeyValidationError),

    /// The claims break the VAPID rules.
    #[error(transparent)]
    ClaimsValidation(#[from] ClaimsValidationError),

    /// The claims could not be serialized.
    #[error(transparent)]
    ClaimsEncoding(#[from] ClaimsEncodingError),

    /// The token could not be signed.
    #[error(transparent)]
    Signing(#[from] SigningError),
}
