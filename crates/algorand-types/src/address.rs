//! Algorand address parsing, validation, and creation.
//!
//! An address is a 32-byte Ed25519 public key. The textual form is the
//! unpadded base32 encoding of `pubkey || checksum`, where the checksum is
//! the last 4 bytes of SHA-512/256 of the public key, giving 58 characters.

use crate::base32;
use crate::constants::{
    ADDRESS_LEN, CHECKSUM_SIZE, KEY_SIZE, MULTISIG_ADDR_PREFIX,
};
use sha2::{Digest, Sha512_256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

fn sha512_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha512_256::new();
    hasher.update(data);
    hasher.finalize().into()
}

#[derive(Debug, Error)]
pub enum AddressError {
    #[error("invalid address length: expected {expected} characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("base32 decode error: {0}")]
    Base32(#[from] base32::Base32Error),

    #[error("invalid decoded length: expected {expected} bytes, got {actual}")]
    InvalidDecodedLength { expected: usize, actual: usize },

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("public key must be {expected} bytes, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },
}

/// A 32-byte public key identifying an account.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; KEY_SIZE]);

impl Address {
    /// The all-zero public key and its corresponding checksummed form.
    pub const ZERO: Address = Address([0u8; KEY_SIZE]);

    /// Wrap a raw public key.
    pub fn new(public_key: [u8; KEY_SIZE]) -> Self {
        Address(public_key)
    }

    /// Wrap a byte slice, enforcing the exact key length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AddressError> {
        let key: [u8; KEY_SIZE] =
            bytes
                .try_into()
                .map_err(|_| AddressError::InvalidKeySize {
                    expected: KEY_SIZE,
                    actual: bytes.len(),
                })?;
        Ok(Address(key))
    }

    /// The raw public key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Whether this is the all-zero public key.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; KEY_SIZE]
    }

    /// Checksum: the trailing 4 bytes of SHA-512/256 of the public key.
    pub fn checksum(&self) -> [u8; CHECKSUM_SIZE] {
        let digest = sha512_256(&self.0);
        let mut checksum = [0u8; CHECKSUM_SIZE];
        checksum.copy_from_slice(&digest[digest.len() - CHECKSUM_SIZE..]);
        checksum
    }

    /// Encode to the 58-character checksummed textual form.
    pub fn encode(&self) -> String {
        let mut data = [0u8; KEY_SIZE + CHECKSUM_SIZE];
        data[..KEY_SIZE].copy_from_slice(&self.0);
        data[KEY_SIZE..].copy_from_slice(&self.checksum());
        let mut encoded = base32::encode(&data);
        encoded.truncate(ADDRESS_LEN);
        encoded
    }

    /// Decode and validate a textual address.
    pub fn decode(text: &str) -> Result<Self, AddressError> {
        if text.len() != ADDRESS_LEN {
            return Err(AddressError::InvalidLength {
                expected: ADDRESS_LEN,
                actual: text.len(),
            });
        }

        let decoded = base32::decode(text)?;
        if decoded.len() != KEY_SIZE + CHECKSUM_SIZE {
            return Err(AddressError::InvalidDecodedLength {
                expected: KEY_SIZE + CHECKSUM_SIZE,
                actual: decoded.len(),
            });
        }

        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(&decoded[..KEY_SIZE]);
        let address = Address(key);

        if address.checksum() != decoded[KEY_SIZE..] {
            return Err(AddressError::ChecksumMismatch);
        }

        Ok(address)
    }

    /// Derive the address of a multisig account from its pre-image.
    ///
    /// The pre-image hash is SHA-512/256 over
    /// `"MultisigAddr" || version || threshold || pk_1 || ... || pk_n`.
    /// The order of `public_keys` is significant; permuting it yields a
    /// different address.
    pub fn from_multisig_preimage(
        version: u8,
        threshold: u8,
        public_keys: &[[u8; KEY_SIZE]],
    ) -> Self {
        let mut buf =
            Vec::with_capacity(MULTISIG_ADDR_PREFIX.len() + 2 + public_keys.len() * KEY_SIZE);
        buf.extend_from_slice(MULTISIG_ADDR_PREFIX);
        buf.push(version);
        buf.push(threshold);
        for pk in public_keys {
            buf.extend_from_slice(pk);
        }
        Address(sha512_256(&buf))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.encode())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::decode(s)
    }
}
