//! Protocol size constants and domain-separation prefixes.
//!
//! Reference: go-algorand/protocol, go-algorand/crypto.

/// Ed25519 public key size in bytes.
pub const KEY_SIZE: usize = 32;

/// Ed25519 signature size in bytes.
pub const SIGNATURE_SIZE: usize = 64;

/// Address checksum size (trailing bytes of SHA-512/256 of the public key).
pub const CHECKSUM_SIZE: usize = 4;

/// Length of the textual address form (base32, no padding).
pub const ADDRESS_LEN: usize = 58;

/// Output size of the generic hash (SHA-512/256).
pub const HASH_SIZE: usize = 32;

/// Genesis hash length.
pub const GENESIS_HASH_SIZE: usize = 32;

/// Lease field length when present.
pub const LEASE_SIZE: usize = 32;

/// Group ID length when present.
pub const GROUP_ID_SIZE: usize = 32;

/// Asset metadata hash length when present.
pub const METADATA_HASH_SIZE: usize = 32;

/// Participation vote key length.
pub const VOTE_KEY_SIZE: usize = 32;

/// VRF selection key length.
pub const SELECTION_KEY_SIZE: usize = 32;

/// State proof key length (Falcon commitment, 64 bytes not 32).
pub const STATE_PROOF_KEY_SIZE: usize = 64;

/// Length of the textual transaction ID (base32, no padding).
pub const TXID_LEN: usize = 52;

/// Protocol minimum fee in microalgos. Exposed for callers building
/// suggested params; fee resolution itself takes `min_fee` from input.
pub const MIN_TXN_FEE: u64 = 1000;

/// Fixed signing overhead added to the encoded transaction length when
/// estimating the size of the eventual signed blob for fee purposes.
pub const SIGNED_TXN_OVERHEAD: usize = 75;

/// Maximum number of transactions in an atomic group.
pub const MAX_TX_GROUP_SIZE: usize = 16;

/// Domain prefix for the signing preimage and transaction ID.
pub const TXID_PREFIX: &[u8] = b"TX";

/// Domain prefix for the group ID hash.
pub const TX_GROUP_PREFIX: &[u8] = b"TG";

/// Domain prefix for multisig address derivation.
pub const MULTISIG_ADDR_PREFIX: &[u8] = b"MultisigAddr";

/// The only multisig pre-image version in circulation.
pub const MULTISIG_VERSION: u8 = 1;
