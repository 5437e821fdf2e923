//! Queue delivery signatures.
//!
//! Each delivery carries an HS256 JWT in `Upstash-Signature`. Its claims
//! name the issuer, the destination URL, a validity window, and the
//! base64url SHA-256 of the raw body. Two keys are accepted so the queue can
//! rotate signing keys without dropping deliveries.

use crate::types::{Error, QueueConfig, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

const ISSUER: &str = "Upstash";

#[derive(Debug, Deserialize)]
struct Header {
    alg: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iss: String,
    #[serde(default)]
    sub: String,
    exp: u64,
    #[serde(default)]
    nbf: u64,
    #[serde(default)]
    iat: u64,
    #[serde(default)]
    jti: String,
    body: String,
}

fn body_digest(body: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(body))
}

fn keyed_mac(key: &str) -> Result<HmacSha256> {
    HmacSha256::new_from_slice(key.as_bytes())
        .map_err(|e| Error::config(format!("invalid signing key: {}", e)))
}

fn decode_segment(segment: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|_| Error::signature("token segment is not base64url"))
}

/// Verifies delivery signatures against the current and previous keys.
#[derive(Clone)]
pub struct SignatureVerifier {
    current: String,
    previous: Option<String>,
    destination: Option<String>,
    tolerance: Duration,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("has_previous", &self.previous.is_some())
            .field("destination", &self.destination)
            .field("tolerance", &self.tolerance)
            .finish_non_exhaustive()
    }
}

impl SignatureVerifier {
    pub fn new(
        current: impl Into<String>,
        previous: Option<String>,
        destination: Option<String>,
        tolerance: Duration,
    ) -> Self {
        Self {
            current: current.into(),
            previous: previous.filter(|key| !key.is_empty()),
            destination: destination.filter(|url| !url.is_empty()),
            tolerance,
        }
    }

    pub fn from_config(config: &QueueConfig) -> Result<Self> {
        if config.current_signing_key.is_empty() {
            return Err(Error::config("current signing key is not set"));
        }
        Ok(Self::new(
            config.current_signing_key.clone(),
            config.previous_signing_key.clone(),
            Some(config.dispatcher_url.clone()),
            config.clock_tolerance,
        ))
    }

    /// Accept `body` if `token` verifies under either key.
    pub fn verify(&self, token: Option<&str>, body: &[u8], now_secs: u64) -> Result<()> {
        let token = token.ok_or_else(|| Error::signature("missing signature header"))?;
        match self.verify_with(&self.current, token, body, now_secs) {
            Ok(()) => Ok(()),
            Err(current_err) => match &self.previous {
                Some(previous) => self
                    .verify_with(previous, token, body, now_secs)
                    .map_err(|previous_err| {
                        tracing::debug!(%current_err, %previous_err, "signature rejected by both keys");
                        previous_err
                    }),
                None => Err(current_err),
            },
        }
    }

    fn verify_with(&self, key: &str, token: &str, body: &[u8], now_secs: u64) -> Result<()> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::signature("token is not a JWS compact string"));
        };

        let header: Header = serde_json::from_slice(&decode_segment(header)?)
            .map_err(|_| Error::signature("unreadable token header"))?;
        if header.alg != "HS256" {
            return Err(Error::signature(format!("unsupported algorithm {}", header.alg)));
        }

        let mut mac = keyed_mac(key)?;
        mac.update(token[..header_and_payload_len(token)].as_bytes());
        mac.verify_slice(&decode_segment(signature)?)
            .map_err(|_| Error::signature("signature mismatch"))?;

        let claims: Claims = serde_json::from_slice(&decode_segment(payload)?)
            .map_err(|_| Error::signature("unreadable token claims"))?;
        self.check_claims(&claims, body, now_secs)
    }

    fn check_claims(&self, claims: &Claims, body: &[u8], now_secs: u64) -> Result<()> {
        if claims.iss != ISSUER {
            return Err(Error::signature(format!("unexpected issuer {}", claims.iss)));
        }
        if let Some(destination) = &self.destination {
            if &claims.sub != destination {
                return Err(Error::signature(format!("unexpected subject {}", claims.sub)));
            }
        }
        let tolerance = self.tolerance.as_secs();
        if now_secs > claims.exp.saturating_add(tolerance) {
            return Err(Error::signature("token expired"));
        }
        if now_secs.saturating_add(tolerance) < claims.nbf {
            return Err(Error::signature("token not yet valid"));
        }
        if claims.body.trim_end_matches('=') != body_digest(body) {
            return Err(Error::signature("body hash mismatch"));
        }
        Ok(())
    }
}

/// Length of `header.payload`, the signed part of a compact JWS.
fn header_and_payload_len(token: &str) -> usize {
    token.rfind('.').unwrap_or(0)
}

/// Produce a delivery signature the way the queue does.
///
/// Used by tests and local tooling that post jobs straight to a dispatcher.
pub fn issue(key: &str, destination: &str, body: &[u8], now_secs: u64) -> Result<String> {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = Claims {
        iss: ISSUER.to_string(),
        sub: destination.to_string(),
        exp: now_secs + 300,
        nbf: now_secs,
        iat: now_secs,
        jti: format!("jwt_{}", uuid::Uuid::new_v4().simple()),
        body: body_digest(body),
    };
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
    let signing_input = format!("{}.{}", header, payload);
    let mut mac = keyed_mac(key)?;
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    Ok(format!("{}.{}", signing_input, signature))
}
