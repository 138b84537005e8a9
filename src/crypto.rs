//! Cryptographic primitives.
//!
//! Everything in here is implemented on top of the [RustCrypto] ecosystem and
//! is restricted to the single curve VAPID uses: NIST P-256 together with
//! SHA-256 (`ES256`).
//!
//! [RustCrypto]: https://github.com/RustCrypto

pub mod ec;

use thiserror::Error;

pub use ec::{derive_public_point, PrivateScalar, PublicPoint};

/// The result type used for cryptographic operations.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// The errors that can be produced by the cryptographic primitives.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The secure random source failed to produce bytes.
    #[cfg_attr(feature = "std", error("the secure random source failed"))]
    #[cfg_attr(not(feature = "std"), error("the secure random source failed: {0}"))]
    Random(#[cfg_attr(feature = "std", source)] rand_core::Error),

    /// An ECDSA operation failed.
    #[cfg_attr(feature = "std", error("an EcDSA operation failed"))]
    #[cfg_attr(not(feature = "std"), error("an EcDSA operation failed: {0}"))]
    Ecdsa(#[cfg_attr(feature = "std", source)] signature::Error),

    /// The given bytes have the wrong length for this curve.
    #[error("invalid length for P-256 material: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// The length required by the curve.
        expected: usize,
        /// The length that was supplied.
        actual: usize,
    },

    /// The scalar is zero or not smaller than the curve order.
    #[error("the private scalar is out of range for P-256")]
    InvalidScalar,

    /// The bytes are not an uncompressed point on the curve.
    #[error("not an uncompressed P-256 curve point")]
    InvalidPoint,
}

impl From<rand_core::Error> for Error {
    fn from(x: rand_core::Error) -> Self {
        Self::Random(x)
    }
}
