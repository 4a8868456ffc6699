//! Multisignature coordination.
//!
//! A multisig account is defined by its pre-image: a version, a threshold,
//! and an ordered list of public keys. This crate builds empty multisig
//! envelopes, applies one signer's partial signature at a time, merges
//! independently produced partials into a single envelope, and verifies
//! that a record carries enough valid signatures. The pre-image is
//! immutable throughout: nothing here will rewrite the version, threshold,
//! or key sequence of an existing envelope, because doing so would silently
//! invalidate every signature already collected.

pub mod merge;
pub mod preimage;
pub mod sign;
pub mod verify;

pub use merge::{merge, merge_blobs};
pub use preimage::MultisigPreImage;
pub use sign::{append_sign, create_unsigned, partial_sign, partial_sign_with_signature};
pub use verify::verify;

use algorand_tx::TxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MultisigError {
    #[error("invalid multisig version: {0}")]
    InvalidVersion(u8),

    #[error("invalid threshold {threshold} for {keys} keys")]
    InvalidThreshold { threshold: u8, keys: usize },

    #[error("signer public key is not in the multisig pre-image")]
    KeyNotFound,

    #[error("signature must be {expected} bytes, got {actual}")]
    BadSignatureLength { expected: usize, actual: usize },

    #[error("need at least two envelopes to merge, got {0}")]
    TooFewBlobs(usize),

    #[error("envelope is missing a multisig record")]
    MissingMultisig,

    #[error("envelopes reference different transactions")]
    TxIdMismatch,

    #[error("envelopes carry different auth-addresses")]
    AuthAddrMismatch,

    #[error("multisig pre-image cannot be changed")]
    PreImageMismatch,

    #[error("conflicting signatures for slot {0}")]
    SignatureConflict(usize),

    #[error("transaction error: {0}")]
    Tx(#[from] TxError),
}
