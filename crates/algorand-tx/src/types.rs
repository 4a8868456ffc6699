//! Typed transaction structures.
//!
//! A transaction is a set of common header fields plus exactly one of
//! seven variant payloads, discriminated by `TxType`. The struct is
//! immutable after construction; the group ID is the single exception and
//! may be assigned exactly once.

use crate::TxError;
use algorand_types::constants::{
    GROUP_ID_SIZE, KEY_SIZE, LEASE_SIZE, METADATA_HASH_SIZE, SIGNATURE_SIZE,
    STATE_PROOF_KEY_SIZE,
};
use algorand_types::Address;

// ─── Transaction Constants ───────────────────────────────────────────────────

/// Application on-completion actions.
pub mod on_complete {
    pub const NO_OP: u32 = 0;
    pub const OPT_IN: u32 = 1;
    pub const CLOSE_OUT: u32 = 2;
    pub const CLEAR_STATE: u32 = 3;
    pub const UPDATE_APPLICATION: u32 = 4;
    pub const DELETE_APPLICATION: u32 = 5;
}

/// Transaction type discriminant. The wire label is the short string
/// returned by [`TxType::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxType {
    Payment,
    KeyRegistration,
    AssetConfig,
    AssetTransfer,
    AssetFreeze,
    ApplicationCall,
    StateProof,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Payment => "pay",
            TxType::KeyRegistration => "keyreg",
            TxType::AssetConfig => "acfg",
            TxType::AssetTransfer => "axfer",
            TxType::AssetFreeze => "afrz",
            TxType::ApplicationCall => "appl",
            TxType::StateProof => "stpf",
        }
    }

    pub fn parse(s: &str) -> Option<TxType> {
        match s {
            "pay" => Some(TxType::Payment),
            "keyreg" => Some(TxType::KeyRegistration),
            "acfg" => Some(TxType::AssetConfig),
            "axfer" => Some(TxType::AssetTransfer),
            "afrz" => Some(TxType::AssetFreeze),
            "appl" => Some(TxType::ApplicationCall),
            "stpf" => Some(TxType::StateProof),
            _ => None,
        }
    }
}

// ─── Variant Payloads ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentFields {
    pub receiver: Address,
    pub amount: u64,
    /// Closing the sender account to this address; never the zero address.
    pub close_remainder_to: Option<Address>,
}

/// Key registration is a tri-state: online (all participation fields set),
/// offline (none set), or non-participation (flag only). The constructor
/// rejects every other combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRegistrationFields {
    pub vote_key: Option<[u8; KEY_SIZE]>,
    pub selection_key: Option<[u8; KEY_SIZE]>,
    pub state_proof_key: Option<[u8; STATE_PROOF_KEY_SIZE]>,
    pub vote_first: Option<u64>,
    pub vote_last: Option<u64>,
    pub vote_key_dilution: Option<u64>,
    pub non_participation: bool,
}

/// Mutable asset parameters, grouped under `apar` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetParams {
    pub total: u64,
    pub decimals: u32,
    pub default_frozen: bool,
    pub unit_name: String,
    pub asset_name: String,
    pub url: String,
    pub metadata_hash: Option<[u8; METADATA_HASH_SIZE]>,
    pub manager: Option<Address>,
    pub reserve: Option<Address>,
    pub freeze: Option<Address>,
    pub clawback: Option<Address>,
}

impl AssetParams {
    /// True when every field is at its default, i.e. an asset destroy.
    pub fn is_empty(&self) -> bool {
        *self == AssetParams::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetConfigFields {
    /// 0 means create; nonzero reconfigures or destroys an existing asset.
    pub asset_id: u64,
    pub params: AssetParams,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetTransferFields {
    pub asset_id: u64,
    pub amount: u64,
    /// Clawback source; set only when revoking from another account.
    pub asset_sender: Option<Address>,
    pub receiver: Address,
    pub close_remainder_to: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFreezeFields {
    pub asset_id: u64,
    pub freeze_account: Address,
    pub frozen: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateSchema {
    pub num_uints: u32,
    pub num_byte_slices: u32,
}

impl StateSchema {
    pub fn is_empty(&self) -> bool {
        self.num_uints == 0 && self.num_byte_slices == 0
    }
}

/// A box the application call intends to touch. `app_index` is the actual
/// application ID (or 0 for the called app); translation to the wire's
/// foreign-array index happens at encode time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxReference {
    pub app_index: u64,
    pub name: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationCallFields {
    /// 0 means create.
    pub app_id: u64,
    pub on_complete: u32,
    pub approval_program: Vec<u8>,
    pub clear_program: Vec<u8>,
    pub app_args: Vec<Vec<u8>>,
    pub accounts: Vec<Address>,
    pub foreign_apps: Vec<u64>,
    pub foreign_assets: Vec<u64>,
    pub boxes: Vec<BoxReference>,
    pub local_schema: StateSchema,
    pub global_schema: StateSchema,
    pub extra_pages: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateProofFields {
    pub state_proof_type: u32,
    pub state_proof: Vec<u8>,
    pub message: Vec<u8>,
}

/// Exactly one variant is populated per transaction, matching its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxPayload {
    Payment(PaymentFields),
    KeyRegistration(KeyRegistrationFields),
    AssetConfig(AssetConfigFields),
    AssetTransfer(AssetTransferFields),
    AssetFreeze(AssetFreezeFields),
    ApplicationCall(ApplicationCallFields),
    StateProof(StateProofFields),
}

impl TxPayload {
    pub fn tx_type(&self) -> TxType {
        match self {
            TxPayload::Payment(_) => TxType::Payment,
            TxPayload::KeyRegistration(_) => TxType::KeyRegistration,
            TxPayload::AssetConfig(_) => TxType::AssetConfig,
            TxPayload::AssetTransfer(_) => TxType::AssetTransfer,
            TxPayload::AssetFreeze(_) => TxType::AssetFreeze,
            TxPayload::ApplicationCall(_) => TxType::ApplicationCall,
            TxPayload::StateProof(_) => TxType::StateProof,
        }
    }
}

// ─── Transaction ─────────────────────────────────────────────────────────────

/// A validated transaction. Construct via [`Transaction::from_params`] or
/// by decoding wire bytes; fields are read-only afterwards except for the
/// one-shot group assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub(crate) sender: Address,
    pub(crate) fee: u64,
    pub(crate) first_valid: u64,
    pub(crate) last_valid: u64,
    pub(crate) genesis_id: String,
    pub(crate) genesis_hash: [u8; 32],
    pub(crate) note: Vec<u8>,
    pub(crate) lease: Option<[u8; LEASE_SIZE]>,
    pub(crate) rekey_to: Option<Address>,
    pub(crate) group: Option<[u8; GROUP_ID_SIZE]>,
    pub(crate) payload: TxPayload,
}

impl Transaction {
    pub fn sender(&self) -> &Address {
        &self.sender
    }

    pub fn fee(&self) -> u64 {
        self.fee
    }

    pub fn first_valid(&self) -> u64 {
        self.first_valid
    }

    pub fn last_valid(&self) -> u64 {
        self.last_valid
    }

    pub fn genesis_id(&self) -> &str {
        &self.genesis_id
    }

    pub fn genesis_hash(&self) -> &[u8; 32] {
        &self.genesis_hash
    }

    pub fn note(&self) -> &[u8] {
        &self.note
    }

    pub fn lease(&self) -> Option<&[u8; LEASE_SIZE]> {
        self.lease.as_ref()
    }

    pub fn rekey_to(&self) -> Option<&Address> {
        self.rekey_to.as_ref()
    }

    pub fn group(&self) -> Option<&[u8; GROUP_ID_SIZE]> {
        self.group.as_ref()
    }

    pub fn payload(&self) -> &TxPayload {
        &self.payload
    }

    pub fn tx_type(&self) -> TxType {
        self.payload.tx_type()
    }

    /// Assign the group ID. Succeeds at most once per transaction; a
    /// second assignment would silently change the transaction ID under
    /// existing signatures.
    pub fn set_group(&mut self, group: [u8; GROUP_ID_SIZE]) -> Result<(), TxError> {
        if self.group.is_some() {
            return Err(TxError::GroupAlreadySet);
        }
        self.group = Some(group);
        Ok(())
    }
}

// ─── Signed Envelopes ────────────────────────────────────────────────────────

/// One slot of a multisig: the slot's public key and, once that party has
/// signed, its signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultisigSubsig {
    pub public_key: [u8; KEY_SIZE],
    pub signature: Option<[u8; SIGNATURE_SIZE]>,
}

/// A (possibly partially) signed multisig record. `version`, `threshold`,
/// and the subsig key sequence together form the pre-image; the coordinator
/// crate treats them as immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultisigSignature {
    pub version: u8,
    pub threshold: u8,
    pub subsigs: Vec<MultisigSubsig>,
}

impl MultisigSignature {
    /// Number of slots carrying a signature.
    pub fn signature_count(&self) -> usize {
        self.subsigs.iter().filter(|s| s.signature.is_some()).count()
    }

    /// The ordered public keys of the pre-image.
    pub fn public_keys(&self) -> Vec<[u8; KEY_SIZE]> {
        self.subsigs.iter().map(|s| s.public_key).collect()
    }
}

/// Logic signature, carried through the signed envelope untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicSignature {
    pub logic: Vec<u8>,
    pub args: Vec<Vec<u8>>,
    pub sig: Option<[u8; SIGNATURE_SIZE]>,
    pub msig: Option<MultisigSignature>,
}

/// A transaction plus authentication: a plain signature, a multisig record,
/// or a logic signature. `auth_address` is present iff the actual signer's
/// address differs from `txn.sender` (i.e. after a rekey).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub txn: Transaction,
    pub sig: Option<[u8; SIGNATURE_SIZE]>,
    pub msig: Option<MultisigSignature>,
    pub lsig: Option<LogicSignature>,
    pub auth_address: Option<Address>,
}
