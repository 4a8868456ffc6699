//! Core types and constants for the Algorand transaction library.
//!
//! This crate provides the foundational pieces used across all workspace
//! crates: protocol size constants, the RFC 4648 base32 codec used by the
//! textual address and transaction-ID forms, and the checksummed `Address`
//! type with multisig pre-image derivation.

pub mod address;
pub mod base32;
pub mod constants;

pub use address::{Address, AddressError};
pub use constants::{
    ADDRESS_LEN, CHECKSUM_SIZE, HASH_SIZE, KEY_SIZE, MIN_TXN_FEE, SIGNATURE_SIZE, TXID_LEN,
};
