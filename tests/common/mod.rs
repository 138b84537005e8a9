//! Common test helpers.

#![allow(dead_code)]

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use vapid::Claims;

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub const HOUR: i64 = 60 * 60;

/// Seconds since the Unix epoch.
pub fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock is after the epoch")
        .as_secs() as i64
}

/// The claims a Web Push sender would typically use for FCM.
pub fn fcm_claims(exp: i64) -> Claims {
    Claims::new()
        .audience("https://fcm.googleapis.com")
        .subject("mailto:mail@mail.com")
        .expires_at(exp)
}

/// Decodes an unpadded Base64Url segment.
pub fn decode(segment: &str) -> TestResult<Vec<u8>> {
    use base64ct::{Base64UrlUnpadded, Encoding};

    Ok(Base64UrlUnpadded::decode_vec(segment).map_err(|e| e.to_string())?)
}

/// Decodes an unpadded Base64Url segment that holds JSON.
pub fn decode_json(segment: &str) -> TestResult<Value> {
    Ok(serde_json::from_slice(&decode(segment)?)?)
}
