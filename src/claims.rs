//! The claims carried in the payload of a VAPID token.

use alloc::{collections::BTreeMap, string::String};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::jwt::ClaimsEncodingError;

/// The longest time a VAPID token may be valid for, in seconds.
pub const MAX_EXPIRY: i64 = 24 * 60 * 60;

/// Name of the subscriber claim.
pub const SUBJECT: &str = "sub";

/// Name of the expiration time claim.
pub const EXPIRATION: &str = "exp";

/// Name of the audience claim.
pub const AUDIENCE: &str = "aud";

const SUBJECT_SCHEMES: [&str; 2] = ["mailto:", "https://"];

/// An error returned if the claims break the rules VAPID puts on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ClaimsValidationError {
    /// The `sub` claim is not a `mailto:` or `https://` contact.
    #[error("subscriber claim (sub) is invalid, it should be a mailto: or https:// contact")]
    InvalidSubscriber,

    /// The `exp` claim is not a 64 bit integer of seconds.
    #[error("expiry claim (exp) must be an integer number of seconds")]
    ExpiryNotInteger,

    /// The `exp` claim lies in the past.
    #[error("expiry claim (exp) already expired")]
    Expired,

    /// The `exp` claim lies more than 24 hours in the future.
    #[error("expiry claim (exp) exceeds 24-hour maximum")]
    ExpiryTooFar,
}

/// The claims of a VAPID token.
///
/// `sub` and `exp` are the claims this crate validates, so they are stored
/// typed. Every other claim, including `aud`, is passed through into the
/// payload unmodified.
///
/// When serialized, `sub` and `exp` come first, followed by the remaining
/// claims ordered by name. A signature is only valid for the exact bytes that
/// were signed, re-serializing decoded claims in another order does not yield
/// the signed payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Claims {
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
    #[serde(flatten)]
    additional: BTreeMap<String, Value>,
}

impl Claims {
    /// Creates an empty set of claims.
    pub const fn new() -> Self {
        Self {
            sub: None,
            exp: None,
            additional: BTreeMap::new(),
        }
    }

    /// Sets the `sub` claim, the contact of the application server.
    pub fn subject(mut self, sub: impl Into<String>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    /// Sets the `exp` claim, in seconds since the Unix epoch.
    pub fn expires_at(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Sets the `aud` claim, the origin of the push service.
    pub fn audience(mut self, aud: impl Into<String>) -> Self {
        self.additional
            .insert(String::from(AUDIENCE), Value::String(aud.into()));
        self
    }

    /// The `sub` claim.
    pub fn sub(&self) -> Option<&str> {
        self.sub.as_deref()
    }

    /// The `exp` claim.
    pub const fn exp(&self) -> Option<i64> {
        self.exp
    }

    /// The `aud` claim, if it is a string.
    pub fn aud(&self) -> Option<&str> {
        self.additional.get(AUDIENCE).and_then(Value::as_str)
    }

    /// Returns any claim by name.
    pub fn get(&self, name: &str) -> Option<Value> {
        match name {
            SUBJECT => self.sub.clone().map(Value::String),
            EXPIRATION => self.exp.map(Value::from),
            _ => self.additional.get(name).cloned(),
        }
    }

    /// Inserts a claim, replacing any previous value under the same name.
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] if the value can not be represented as JSON, or if it
    /// is a `sub` or `exp` claim of the wrong type.
    pub fn insert<T: Serialize + ?Sized>(
        &mut self,
        name: impl Into<String>,
        value: &T,
    ) -> Result<(), crate::Error> {
        let value = serde_json::to_value(value).map_err(ClaimsEncodingError)?;
        self.set(name.into(), value)?;
        Ok(())
    }

    fn set(&mut self, name: String, value: Value) -> Result<(), ClaimsValidationError> {
        match name.as_str() {
            SUBJECT => match value {
                Value::String(sub) => self.sub = Some(sub),
                _ => return Err(ClaimsValidationError::InvalidSubscriber),
            },
            EXPIRATION => {
                self.exp = Some(
                    value
                        .as_i64()
                        .ok_or(ClaimsValidationError::ExpiryNotInteger)?,
                );
            }
            _ => {
                self.additional.insert(name, value);
            }
        }

        Ok(())
    }
}

impl TryFrom<Map<String, Value>> for Claims {
    type Error = ClaimsValidationError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut claims = Claims::new();

        for (name, value) in map {
            claims.set(name, value)?;
        }

        Ok(claims)
    }
}

/// Checks the `sub` and `exp` claims against the current system time.
///
/// # Errors
///
/// See [`verify_claims_at`].
#[cfg(feature = "std")]
pub fn verify_claims(claims: &Claims) -> Result<(), ClaimsValidationError> {
    verify_claims_at(claims, crate::now())
}

/// Checks the `sub` and `exp` claims, using `now` (seconds since the Unix
/// epoch) as the current time.
///
/// Both claims are optional. Other claims are not looked at.
///
/// # Errors
///
/// Returns an [`Err`] if `sub` is present but neither a `mailto:` nor an
/// `https://` contact, or if `exp` is present but not within
/// `[now, now + 24h]`.
pub fn verify_claims_at(claims: &Claims, now: i64) -> Result<(), ClaimsValidationError> {
    let res = check_subject(claims.sub()).and_then(|_| check_expiry(claims.exp(), now));

    if let Err(ref e) = res {
        tracing::debug!(error = %e, "rejected VAPID claims");
    }

    res
}

fn check_subject(sub: Option<&str>) -> Result<(), ClaimsValidationError> {
    match sub {
        Some(sub) if !SUBJECT_SCHEMES.iter().any(|s| sub.starts_with(s)) => {
            Err(ClaimsValidationError::InvalidSubscriber)
        }
        _ => Ok(()),
    }
}

fn check_expiry(exp: Option<i64>, now: i64) -> Result<(), ClaimsValidationError> {
    let Some(exp) = exp else {
        return Ok(());
    };

    if exp < now {
        return Err(ClaimsValidationError::Expired);
    }

    if exp > now.saturating_add(MAX_EXPIRY) {
        return Err(ClaimsValidationError::ExpiryTooFar);
    }

    Ok(())
}
