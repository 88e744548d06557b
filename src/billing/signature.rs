//! Stripe webhook signature scheme.
//!
//! The `stripe-signature` header looks like `t=1700000000,v1=<hex>,v1=<hex>`.
//! Each `v1` value is `HMAC-SHA256(secret, "<t>.<raw body>")`; the request is
//! genuine if any of them matches.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    Malformed,
    NoSignatures,
    Mismatch,
    Expired { age_secs: i64 },
}

impl std::fmt::Display for SignatureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignatureError::Malformed => {
                write!(f, "Unable to extract timestamp and signatures from header")
            }
            SignatureError::NoSignatures => {
                write!(f, "No signatures found with expected scheme")
            }
            SignatureError::Mismatch => write!(
                f,
                "No signatures found matching the expected signature for payload"
            ),
            SignatureError::Expired { age_secs } => {
                write!(f, "Timestamp outside the tolerance zone ({age_secs}s old)")
            }
        }
    }
}

impl std::error::Error for SignatureError {}

/// Verify `header` for `payload`. A `tolerance_secs` of zero disables the
/// timestamp age check.
pub fn verify(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: u64,
    now: i64,
) -> Result<(), SignatureError> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<Vec<u8>> = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            "v1" => {
                if let Ok(sig) = hex::decode(value) {
                    candidates.push(sig);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::Malformed)?;
    if candidates.is_empty() {
        return Err(SignatureError::NoSignatures);
    }

    let expected = compute(secret, timestamp, payload);
    let matched = candidates
        .iter()
        .any(|candidate| bool::from(candidate.as_slice().ct_eq(expected.as_slice())));
    if !matched {
        return Err(SignatureError::Mismatch);
    }

    let age_secs = now - timestamp;
    let tolerance = i64::try_from(tolerance_secs).unwrap_or(i64::MAX);
    if tolerance > 0 && age_secs > tolerance {
        return Err(SignatureError::Expired { age_secs });
    }

    Ok(())
}

/// Produce a `stripe-signature` header value for `payload` at `timestamp`.
pub fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
    format!(
        "t={timestamp},v1={}",
        hex::encode(compute(secret, timestamp, payload))
    )
}

fn compute(secret: &str, timestamp: i64, payload: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC-SHA256 accepts keys of any length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}
