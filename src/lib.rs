//! Key generation and `Authorization` headers for Voluntary Application Server
//! Identification (VAPID) for Web Push, as defined in [RFC 8292].
//!
//! An application server generates one P-256 key pair with
//! [`generate_vapid`], stores it, and attaches the header created by
//! [`generate_vapid_auth`] to every push request:
//!
//! ```
//! use vapid::{generate_vapid, generate_vapid_auth, Claims};
//!
//! # fn main() -> Result<(), vapid::Error> {
//! let keys = generate_vapid()?;
//! let now = std::time::SystemTime::now()
//!     .duration_since(std::time::UNIX_EPOCH)
//!     .unwrap()
//!     .as_secs() as i64;
//!
//! let claims = Claims::new()
//!     .audience("https://fcm.googleapis.com")
//!     .subject("mailto:admin@example.com")
//!     .expires_at(now + 12 * 60 * 60);
//!
//! let header = generate_vapid_auth(&keys, &claims)?;
//! assert!(header.starts_with("vapid t="));
//! # Ok(())
//! # }
//! ```
//!
//! [RFC 8292]: <https://datatracker.ietf.org/doc/html/rfc8292>
#![warn(
    missing_docs,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    explicit_outlives_requirements,
    clippy::missing_const_for_fn,
    clippy::missing_errors_doc
)]
#![deny(
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    macro_use_extern_crate,
    non_ascii_idents,
    elided_lifetimes_in_paths
)]
#![forbid(unsafe_code)]
#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod sign;
pub use sign::*;

mod verify;
pub use verify::*;

pub(crate) mod base64_url;

pub mod claims;
pub mod crypto;
mod error;
mod header;
pub mod jwt;
mod key;

pub use base64_url::{Base64UrlString, NoBase64UrlString};
#[cfg(feature = "std")]
pub use claims::verify_claims;
pub use claims::{verify_claims_at, Claims, ClaimsValidationError};
pub use error::Error;
#[cfg(feature = "std")]
pub use header::generate_vapid_auth;
pub use header::{generate_vapid_auth_at, VapidAuthorization};
pub use jwt::ClaimsEncodingError;
pub use key::{
    generate_vapid, validate_keys, KeyGenerationError, KeyValidationError, VapidKeyPair,
    PRIVATE_KEY_LEN, PUBLIC_KEY_LEN,
};

/// Seconds since the Unix epoch, according to the system clock.
#[cfg(feature = "std")]
pub(crate) fn now() -> i64 {
    unix_seconds(std::time::SystemTime::now())
}

/// Whole seconds between the Unix epoch and `time`, negative before the epoch.
#[cfg(feature = "std")]
fn unix_seconds(time: std::time::SystemTime) -> i64 {
    let secs = |d: core::time::Duration| i64::try_from(d.as_secs()).unwrap_or(i64::MAX);

    match time.duration_since(std::time::UNIX_EPOCH) {
        Ok(since) => secs(since),
        Err(e) => {
            tracing::debug!(
                behind = e.duration().as_secs(),
                "system clock is set before the Unix epoch"
            );
            -secs(e.duration())
        }
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use core::time::Duration;
    use std::time::UNIX_EPOCH;

    use super::*;

    #[test]
    fn clock_before_epoch_is_negative() {
        assert_eq!(unix_seconds(UNIX_EPOCH), 0);
        assert_eq!(unix_seconds(UNIX_EPOCH + Duration::from_secs(90)), 90);
        assert_eq!(unix_seconds(UNIX_EPOCH - Duration::from_secs(90)), -90);

        // an expiry an hour ahead of a clock stuck before 1970 is still valid
        let now = unix_seconds(UNIX_EPOCH - Duration::from_secs(90));
        let claims = Claims::new().expires_at(now + 60 * 60);
        assert_eq!(verify_claims_at(&claims, now), Ok(()));
    }
}
