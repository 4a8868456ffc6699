//! Generic hash primitive.
//!
//! Transaction IDs, address checksums, group IDs, and multisig address
//! derivation all use SHA-512/256 (SHA-512 truncated to 256 bits, with
//! distinct initial values per FIPS 180-4).

use sha2::{Digest, Sha512_256};

/// SHA-512/256 of the input, 32 bytes.
pub fn sha512_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha512_256::new();
    hasher.update(data);
    hasher.finalize().into()
}
