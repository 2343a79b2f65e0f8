//! Claim payload decoding.
//!
//! Bearer tokens are compact three-segment credentials
//! (`header.payload.signature`). Only the payload segment is consumed here;
//! the signature is NOT verified by this crate — token issuance and
//! signature checks are guaranteed upstream, and this layer only answers
//! "does a session exist for this token".

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use serde::Deserialize;

use crate::error::AuthError;

/// Decoded payload segment of a bearer token.
#[derive(Debug, Default, Deserialize)]
pub struct ClaimPayload {
    /// Identity block written by the issuer.
    #[serde(rename = "memberInfo", default)]
    pub member_info: MemberInfo,
}

/// Identity block inside the claim payload.
#[derive(Debug, Default, Deserialize)]
pub struct MemberInfo {
    /// Client identifier. The issuer is expected to always set this, but a
    /// payload without it still decodes (yielding an empty identifier); the
    /// resulting presence key matches nothing the issuer writes, so the
    /// lookup fails closed downstream.
    #[serde(rename = "userId", default)]
    pub client_id: String,
}

/// Decodes the payload segment of `token`.
///
/// Fails on fewer than two dot-separated segments, on a payload that is not
/// unpadded standard base64, or on bytes that are not a valid claim
/// document.
pub fn decode(token: &str) -> Result<ClaimPayload, AuthError> {
    let payload = token.split('.').nth(1).ok_or(AuthError::MalformedToken)?;
    let raw = STANDARD_NO_PAD
        .decode(payload)
        .map_err(|_| AuthError::MalformedToken)?;
    serde_json::from_slice(&raw).map_err(|_| AuthError::InvalidClaims)
}
