//! Webhook signature utilities.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Signs a webhook payload using HMAC-SHA256, returning lowercase hex.
pub fn sign_webhook(payload: &[u8], secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a provider signature over the exact raw body bytes using
/// constant-time comparison.
///
/// Returns `false` - never errors - for an empty signature or secret, or for
/// any digest mismatch. Callers must pass the body bytes exactly as
/// received: re-serializing parsed JSON changes them and breaks
/// verification.
pub fn verify_webhook_signature(payload: &[u8], signature: &str, secret: &str) -> bool {
    if signature.is_empty() || secret.is_empty() {
        return false;
    }
    let expected = sign_webhook(payload, secret);
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "webhook_secret_123";

    #[test]
    fn test_sign_and_verify() {
        let payload = br#"{"event":"payment.completed"}"#;

        let signature = sign_webhook(payload, SECRET);
        assert_eq!(signature.len(), 64);
        assert!(verify_webhook_signature(payload, &signature, SECRET));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let payload = br#"{"event":"payment.completed"}"#;
        let signature = sign_webhook(payload, SECRET);

        assert!(!verify_webhook_signature(
            payload,
            &signature,
            "webhook_secret_123x"
        ));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let payload = br#"{"event":"payment.completed"}"#;
        let signature = sign_webhook(payload, SECRET);

        assert!(!verify_webhook_signature(b"tampered", &signature, SECRET));
    }

    #[test]
    fn test_empty_signature_rejected() {
        let payload = br#"{"event":"payment.completed"}"#;
        assert!(!verify_webhook_signature(payload, "", SECRET));
    }

    #[test]
    fn test_empty_secret_rejected() {
        let payload = br#"{"event":"payment.completed"}"#;
        let signature = sign_webhook(payload, SECRET);
        assert!(!verify_webhook_signature(payload, &signature, ""));
    }

    #[test]
    fn test_reserialized_body_is_a_different_message() {
        // Same JSON value, different bytes: the signature must not carry over.
        let raw = br#"{"event": "payment.completed",  "paymentId": "PAY123"}"#;
        let reserialized = serde_json::to_vec(
            &serde_json::from_slice::<serde_json::Value>(raw).unwrap(),
        )
        .unwrap();
        assert_ne!(raw.as_slice(), reserialized.as_slice());

        let signature = sign_webhook(raw, SECRET);
        assert!(verify_webhook_signature(raw, &signature, SECRET));
        assert!(!verify_webhook_signature(&reserialized, &signature, SECRET));
    }
}
