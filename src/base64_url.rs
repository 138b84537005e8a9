//! Helpers for base64 urlsafe encoded stuff

use alloc::{borrow::ToOwned, string::String, vec::Vec};
use core::{fmt, ops::Deref, str::FromStr};

use base64ct::{Base64UrlUnpadded, Encoding};
use secrecy::SecretSlice;
use thiserror::Error;
use zeroize::Zeroizing;

/// Error type indicating that a string was not a valid, unpadded Base64Url
/// string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the string is not a valid Base64Url representation")]
pub struct NoBase64UrlString;

/// A wrapper around a [`String`] that guarantees that the inner string is a
/// valid Base64Url string without padding.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct Base64UrlString(String);

impl fmt::Display for Base64UrlString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Base64UrlString {
    type Err = NoBase64UrlString;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // it is an expensive check.. yes
        Base64UrlUnpadded::decode_vec(s)
            .map(|_| Self(s.to_owned()))
            .map_err(|_| NoBase64UrlString)
    }
}

impl Base64UrlString {
    /// Encode the given bytes using Base64Url format.
    #[inline]
    pub fn encode(x: impl AsRef<[u8]>) -> Self {
        Base64UrlString(Base64UrlUnpadded::encode_string(x.as_ref()))
    }

    /// Wraps a string that is known to be valid Base64Url, like a
    /// compile-time constant.
    #[inline]
    pub(crate) fn from_trusted(s: &str) -> Self {
        debug_assert!(Base64UrlUnpadded::decode_vec(s).is_ok());
        Self(s.to_owned())
    }

    /// Decodes this Base64Url string into it's raw byte representation.
    #[inline]
    pub fn decode(&self) -> Vec<u8> {
        // the constructors guarantee a valid string, so this can't fail
        Base64UrlUnpadded::decode_vec(&self.0).unwrap_or_default()
    }

    /// Return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Deref for Base64UrlString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Decodes `s` into exactly `N` bytes.
pub(crate) fn decode_array<const N: usize>(s: &str) -> Result<[u8; N], NoBase64UrlString> {
    let mut buf = [0u8; N];
    let decoded = Base64UrlUnpadded::decode(s, &mut buf).map_err(|_| NoBase64UrlString)?;

    if decoded.len() != N {
        return Err(NoBase64UrlString);
    }

    Ok(buf)
}

/// Decodes a secret value, making sure no copy of it stays around in memory.
pub(crate) fn decode_secret<const N: usize>(s: &str) -> Result<SecretSlice<u8>, NoBase64UrlString> {
    let buf = Zeroizing::new(decode_array::<N>(s)?);
    Ok(SecretSlice::from(buf.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_padding_and_standard_alphabet() {
        assert!(Base64UrlString::from_str("YWJj").is_ok());
        assert!(Base64UrlString::from_str("YWI=").is_err());
        assert!(Base64UrlString::from_str("+/+/").is_err());
        assert!(Base64UrlString::from_str("-_-_").is_ok());
    }

    #[test]
    fn decode_array_checks_length() {
        assert_eq!(decode_array::<3>("YWJj"), Ok(*b"abc"));
        assert_eq!(decode_array::<4>("YWJj"), Err(NoBase64UrlString));
        assert_eq!(decode_array::<2>("YWJj"), Err(NoBase64UrlString));
    }

    #[test]
    fn encode_has_no_padding() {
        assert_eq!(&*Base64UrlString::encode(b"ab"), "YWI");
        assert_eq!(Base64UrlString::encode([0xfb, 0xff]).decode(), [0xfb, 0xff]);
    }
}
