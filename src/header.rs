//! The `Authorization` header value of the `vapid` scheme, see
//! [section 3 of RFC 8292].
//!
//! [section 3 of RFC 8292]: <https://datatracker.ietf.org/doc/html/rfc8292#section-3>

use alloc::string::{String, ToString};
use core::{fmt, str::FromStr};

use crate::{
    claims::{verify_claims_at, Claims},
    jwt::{Compact, UnsignedToken},
    key::{validate_keys, VapidKeyPair, PUBLIC_KEY_LEN},
    sign::Signer,
    Base64UrlString, Error, VerifyError,
};

const SCHEME_PREFIX: &str = "vapid t=";
const KEY_SEPARATOR: &str = ", k=";

/// A signed VAPID token together with the public key that verifies it.
///
/// Its [`Display`](fmt::Display) implementation produces the exact header
/// value push services expect:
///
/// ```text
/// vapid t=<header>.<payload>.<signature>, k=<public key>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VapidAuthorization {
    pub(crate) token: Compact,
    pub(crate) public_key: Base64UrlString,
}

impl VapidAuthorization {
    /// Validates the keys and claims, then signs the claims with `signer`.
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] for the first step that fails: malformed keys,
    /// invalid claims, claims that can't be serialized, or a failed signature.
    pub fn sign_at(
        keys: &VapidKeyPair,
        claims: &Claims,
        signer: &Signer<'_>,
        now: i64,
    ) -> Result<Self, Error> {
        validate_keys(keys)?;
        verify_claims_at(claims, now)?;

        let token = UnsignedToken::new(claims)?.sign(signer)?;

        Ok(Self {
            token,
            public_key: Base64UrlString::from_trusted(&keys.public_key),
        })
    }

    /// The signed JWT.
    pub const fn token(&self) -> &Compact {
        &self.token
    }

    /// The public key, Base64Url encoded.
    pub fn public_key(&self) -> &str {
        &self.public_key
    }
}

impl fmt::Display for VapidAuthorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME_PREFIX}{}{KEY_SEPARATOR}{}", self.token, self.public_key)
    }
}

impl FromStr for VapidAuthorization {
    type Err = VerifyError;

    /// Parses a header value of the form `vapid t=<jwt>, k=<key>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (token, public_key) = s
            .strip_prefix(SCHEME_PREFIX)
            .and_then(|rest| rest.split_once(KEY_SEPARATOR))
            .ok_or(VerifyError::Malformed)?;

        let token = Compact::from_str(token).map_err(|_| VerifyError::Malformed)?;
        if token.len() != 3 {
            return Err(VerifyError::Malformed);
        }

        if public_key.len() != PUBLIC_KEY_LEN {
            return Err(VerifyError::InvalidPublicKey);
        }
        let public_key =
            Base64UrlString::from_str(public_key).map_err(|_| VerifyError::InvalidPublicKey)?;

        Ok(Self { token, public_key })
    }
}

/// Creates the `Authorization` header value for a push request, using the
/// current system time to check the `exp` claim.
///
/// # Errors
///
/// See [`generate_vapid_auth_at`].
#[cfg(feature = "std")]
pub fn generate_vapid_auth(keys: &VapidKeyPair, claims: &Claims) -> Result<String, Error> {
    generate_vapid_auth_at(keys, claims, crate::now())
}

/// Creates the `Authorization` header value for a push request, using `now`
/// (seconds since the Unix epoch) to check the `exp` claim.
///
/// The keys are checked with [`validate_keys`] and the claims with
/// [`verify_claims_at`] before anything is signed.
///
/// # Errors
///
/// Returns an [`Err`] for the first step that fails: malformed keys,
/// invalid claims, claims that can't be serialized, or a failed signature.
#[tracing::instrument(level = "debug", skip_all, err(level = "debug"))]
pub fn generate_vapid_auth_at(
    keys: &VapidKeyPair,
    claims: &Claims,
    now: i64,
) -> Result<String, Error> {
    let auth = VapidAuthorization::sign_at(keys, claims, &Signer::new(&keys.private_key), now)?;

    tracing::debug!(
        public_key = %keys.public_key,
        aud = claims.aud(),
        "created VAPID authorization"
    );

    Ok(auth.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate_vapid;

    const NOW: i64 = 1_700_000_000;

    fn claims() -> Claims {
        Claims::new()
            .audience("https://fcm.googleapis.com")
            .subject("mailto:mail@mail.com")
            .expires_at(NOW + 12 * 60 * 60)
    }

    #[test]
    fn header_layout() {
        let keys = generate_vapid().unwrap();
        let header = generate_vapid_auth_at(&keys, &claims(), NOW).unwrap();

        let rest = header.strip_prefix("vapid t=").unwrap();
        let (token, key) = rest.split_once(", k=").unwrap();

        assert_eq!(key, keys.public_key);
        assert_eq!(token.split('.').count(), 3);
        assert!(token.starts_with("eyJ0eXAiOiJKV1QiLCJhbGciOiJFUzI1NiJ9."));
        assert!(!header.ends_with(char::is_whitespace));
    }

    #[test]
    fn parses_its_own_output() {
        let keys = generate_vapid().unwrap();
        let header = generate_vapid_auth_at(&keys, &claims(), NOW).unwrap();

        let auth = VapidAuthorization::from_str(&header).unwrap();
        assert_eq!(auth.public_key(), keys.public_key);
        assert_eq!(auth.to_string(), header);
    }

    #[test]
    fn rejects_malformed_headers() {
        let keys = generate_vapid().unwrap();
        let header = generate_vapid_auth_at(&keys, &claims(), NOW).unwrap();

        for bad in [
            header.replacen("vapid", "Vapid", 1),
            header.replacen(", k=", ",k=", 1),
            header.replacen("t=", "t= ", 1),
            header.replacen("eyJ0", "eyJ0.", 1),
        ] {
            assert!(matches!(
                VapidAuthorization::from_str(&bad),
                Err(VerifyError::Malformed)
            ));
        }

        let short_key = &header[..header.len() - 1];
        assert!(matches!(
            VapidAuthorization::from_str(short_key),
            Err(VerifyError::InvalidPublicKey)
        ));
    }

    #[test]
    fn pipeline_short_circuits() {
        let keys = generate_vapid().unwrap();

        let bad_keys = VapidKeyPair::new("short", keys.private_key.as_str());
        assert!(matches!(
            generate_vapid_auth_at(&bad_keys, &claims(), NOW),
            Err(Error::KeyValidation(_))
        ));

        let expired = claims().expires_at(NOW - 1);
        assert!(matches!(
            generate_vapid_auth_at(&keys, &expired, NOW),
            Err(Error::ClaimsValidation(_))
        ));
    }

    #[cfg(feature = "std")]
    #[test]
    fn rejected_input_is_not_logged_as_error() {
        use alloc::sync::Arc;
        use core::sync::atomic::{AtomicUsize, Ordering};

        use tracing::{span, Event, Level, Metadata, Subscriber};

        struct CountErrors(Arc<AtomicUsize>);

        impl Subscriber for CountErrors {
            fn enabled(&self, _: &Metadata<'_>) -> bool {
                true
            }
            fn new_span(&self, _: &span::Attributes<'_>) -> span::Id {
                span::Id::from_u64(1)
            }
            fn record(&self, _: &span::Id, _: &span::Record<'_>) {}
            fn record_follows_from(&self, _: &span::Id, _: &span::Id) {}
            fn event(&self, event: &Event<'_>) {
                if *event.metadata().level() == Level::ERROR {
                    self.0.fetch_add(1, Ordering::SeqCst);
                }
            }
            fn enter(&self, _: &span::Id) {}
            fn exit(&self, _: &span::Id) {}
        }

        let keys = generate_vapid().unwrap();
        let errors = Arc::new(AtomicUsize::new(0));

        tracing::subscriber::with_default(CountErrors(Arc::clone(&errors)), || {
            let short = VapidKeyPair::new("short", keys.private_key.as_str());
            assert!(generate_vapid_auth_at(&short, &claims(), NOW).is_err());
            assert!(generate_vapid_auth_at(&keys, &claims().expires_at(NOW - 1), NOW).is_err());
        });

        assert_eq!(errors.load(Ordering::SeqCst), 0);
    }
}
