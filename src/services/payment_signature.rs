use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the expected gateway webhook signature for a payload:
/// HMAC-SHA256 over the raw body, hex-encoded (the format Razorpay sends in
/// the `X-Razorpay-Signature` header).
pub fn sign_payload(payload: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");

    mac.update(payload.as_bytes());

    let result = mac.finalize();
    let code_bytes = result.into_bytes();

    hex::encode(code_bytes)
}

/// Verify a gateway webhook signature against the raw request body.
pub fn verify_signature(payload: &str, signature: &str, secret: &str) -> bool {
    let expected_signature = sign_payload(payload, secret);

    // Constant-time comparison to prevent timing attacks
    constant_time_eq(&expected_signature, signature)
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut result = 0u8;
    for i in 0..a_bytes.len() {
        result |= a_bytes[i] ^ b_bytes[i];
    }

    result == 0
}
