//! Algorand transaction construction, canonical serialization, and signing.
//!
//! Provides the seven-variant typed transaction structure, a validating
//! constructor over user-facing parameter records, the canonical msgpack
//! encoding that transaction IDs and signatures are computed over, fee
//! resolution, Ed25519 signing envelopes, and atomic-group assignment.
//! Delegates low-level crypto and the msgpack primitives to algorand-crypto.

pub mod encode;
pub mod fee;
pub mod group;
pub mod params;
pub mod sign;
pub mod types;

pub use group::{assign_group_id, compute_group_id};
pub use params::{SuggestedParams, TxParams};
pub use types::{
    MultisigSignature, MultisigSubsig, SignedTransaction, Transaction, TxPayload, TxType,
};

use algorand_crypto::MsgpackError;
use algorand_types::AddressError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TxError {
    #[error("unknown transaction type: {0:?}")]
    UnknownType(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("{field} must be {expected} bytes, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid {field}: {source}")]
    Address {
        field: &'static str,
        #[source]
        source: AddressError,
    },

    #[error("{0} must not be the zero address; leave the field absent instead")]
    ZeroAddress(&'static str),

    #[error("expected exactly one variant payload, got {0}")]
    PayloadCount(usize),

    #[error("variant payload does not match transaction type {0:?}")]
    PayloadMismatch(&'static str),

    #[error(
        "key registration must be online (all participation fields), \
         offline (none), or non-participation (flag only)"
    )]
    KeyRegShape,

    #[error("box reference app index {0} is neither 0, the called app, nor a foreign app")]
    BadBoxReference(u64),

    #[error("{field} exceeds 32-bit range: {value}")]
    CountOverflow { field: &'static str, value: u64 },

    #[error("signature must be {expected} bytes, got {actual}")]
    BadSignatureLength { expected: usize, actual: usize },

    #[error("group already assigned")]
    GroupAlreadySet,

    #[error("transaction group of {got} exceeds the maximum of {max}")]
    GroupTooLarge { got: usize, max: usize },

    #[error("empty transaction group")]
    EmptyGroup,

    #[error("malformed wire input: {0}")]
    Decode(String),

    #[error("msgpack error: {0}")]
    Msgpack(#[from] MsgpackError),
}
