//! Raw-byte Ed25519 wrapper.
//!
//! Everything at this layer works on `[u8; 32]` secrets/public keys and
//! `[u8; 64]` signatures so that callers building wire-format envelopes
//! never round-trip through typed key structs. Verification failure is a
//! boolean `false`, never an error.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;

/// Ed25519 secret key (seed) size in bytes.
pub const SECRET_KEY_SIZE: usize = 32;

/// Ed25519 public key size in bytes.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Ed25519 signature size in bytes.
pub const SIGNATURE_SIZE: usize = 64;

/// Derive the public key from a 32-byte secret.
pub fn public_key(secret: &[u8; SECRET_KEY_SIZE]) -> [u8; PUBLIC_KEY_SIZE] {
    SigningKey::from_bytes(secret).verifying_key().to_bytes()
}

/// Sign a message, producing a 64-byte signature.
///
/// Deterministic per RFC 8032: the same (secret, message) pair always
/// yields the same signature.
pub fn sign(secret: &[u8; SECRET_KEY_SIZE], message: &[u8]) -> [u8; SIGNATURE_SIZE] {
    SigningKey::from_bytes(secret).sign(message).to_bytes()
}

/// Verify a signature against a public key and message.
///
/// Returns `false` for bad signatures and for public-key bytes that do not
/// decode to a valid curve point.
pub fn verify(
    public: &[u8; PUBLIC_KEY_SIZE],
    message: &[u8],
    signature: &[u8; SIGNATURE_SIZE],
) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(public) else {
        return false;
    };
    let signature = Signature::from_bytes(signature);
    verifying_key.verify(message, &signature).is_ok()
}

/// Whether `len` is a valid Ed25519 signature length.
pub fn is_valid_signature_len(len: usize) -> bool {
    len == SIGNATURE_SIZE
}

/// Generate a fresh 32-byte secret from the OS RNG.
pub fn generate_secret() -> [u8; SECRET_KEY_SIZE] {
    let mut secret = [0u8; SECRET_KEY_SIZE];
    OsRng.fill_bytes(&mut secret);
    secret
}
