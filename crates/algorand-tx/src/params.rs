//! Parameter records and the validating transaction constructor.
//!
//! Callers describe a transaction with a [`TxParams`] record: a type
//! discriminant, suggested params, and exactly one variant sub-record.
//! [`Transaction::from_params`] resolves addresses through the codec,
//! enforces length and variant invariants, and computes the fee. Numeric
//! bounds are carried by the field types themselves; the serde path
//! rejects negative or fractional input before it reaches construction.

use crate::fee;
use crate::types::*;
use crate::TxError;
use algorand_types::constants::{
    GENESIS_HASH_SIZE, KEY_SIZE, LEASE_SIZE, METADATA_HASH_SIZE, STATE_PROOF_KEY_SIZE,
};
use algorand_types::Address;
use serde::{Deserialize, Serialize};

// ─── Parameter Records ───────────────────────────────────────────────────────

/// Fee and validity-window parameters, typically fetched from a node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestedParams {
    /// Per-byte fee, or the exact fee when `flat_fee` is set.
    pub fee: u64,
    /// Floor for the size-dependent fee. Ignored when `flat_fee` is set.
    #[serde(default)]
    pub min_fee: u64,
    #[serde(default)]
    pub flat_fee: bool,
    pub first_valid: u64,
    pub last_valid: u64,
    #[serde(default)]
    pub genesis_id: Option<String>,
    pub genesis_hash: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentParams {
    pub receiver: String,
    #[serde(default)]
    pub amount: u64,
    #[serde(default)]
    pub close_remainder_to: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyRegistrationParams {
    #[serde(default)]
    pub vote_key: Option<Vec<u8>>,
    #[serde(default)]
    pub selection_key: Option<Vec<u8>>,
    #[serde(default)]
    pub state_proof_key: Option<Vec<u8>>,
    #[serde(default)]
    pub vote_first: Option<u64>,
    #[serde(default)]
    pub vote_last: Option<u64>,
    #[serde(default)]
    pub vote_key_dilution: Option<u64>,
    #[serde(default)]
    pub non_participation: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetConfigParams {
    /// 0 creates a new asset.
    #[serde(default)]
    pub asset_id: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub decimals: u32,
    #[serde(default)]
    pub default_frozen: bool,
    #[serde(default)]
    pub unit_name: Option<String>,
    #[serde(default)]
    pub asset_name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub metadata_hash: Option<Vec<u8>>,
    #[serde(default)]
    pub manager: Option<String>,
    #[serde(default)]
    pub reserve: Option<String>,
    #[serde(default)]
    pub freeze: Option<String>,
    #[serde(default)]
    pub clawback: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetTransferParams {
    pub asset_id: u64,
    #[serde(default)]
    pub amount: u64,
    /// Clawback source address (revocation target).
    #[serde(default)]
    pub asset_sender: Option<String>,
    pub receiver: String,
    #[serde(default)]
    pub close_remainder_to: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetFreezeParams {
    pub asset_id: u64,
    pub freeze_account: String,
    #[serde(default)]
    pub frozen: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateSchemaParams {
    #[serde(default)]
    pub num_uints: u32,
    #[serde(default)]
    pub num_byte_slices: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxReferenceParams {
    /// The application ID whose box is referenced; 0 means the called app.
    #[serde(default)]
    pub app_index: u64,
    #[serde(default)]
    pub name: Vec<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationCallParams {
    /// 0 creates a new application.
    #[serde(default)]
    pub app_id: u64,
    #[serde(default)]
    pub on_complete: u32,
    #[serde(default)]
    pub approval_program: Vec<u8>,
    #[serde(default)]
    pub clear_program: Vec<u8>,
    #[serde(default)]
    pub app_args: Vec<Vec<u8>>,
    #[serde(default)]
    pub accounts: Vec<String>,
    #[serde(default)]
    pub foreign_apps: Vec<u64>,
    #[serde(default)]
    pub foreign_assets: Vec<u64>,
    #[serde(default)]
    pub boxes: Vec<BoxReferenceParams>,
    #[serde(default)]
    pub local_schema: StateSchemaParams,
    #[serde(default)]
    pub global_schema: StateSchemaParams,
    #[serde(default)]
    pub extra_pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateProofParams {
    #[serde(default)]
    pub state_proof_type: u32,
    #[serde(default)]
    pub state_proof: Vec<u8>,
    #[serde(default)]
    pub message: Vec<u8>,
}

/// Full description of a transaction to construct. Exactly one variant
/// sub-record must be populated, and it must match `tx_type`. The
/// `Default` value is a skeleton for struct-update syntax, not a valid
/// transaction description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TxParams {
    pub tx_type: String,
    pub sender: String,
    pub suggested_params: SuggestedParams,
    #[serde(default)]
    pub note: Option<Vec<u8>>,
    #[serde(default)]
    pub lease: Option<Vec<u8>>,
    #[serde(default)]
    pub rekey_to: Option<String>,
    #[serde(default)]
    pub payment: Option<PaymentParams>,
    #[serde(default)]
    pub key_registration: Option<KeyRegistrationParams>,
    #[serde(default)]
    pub asset_config: Option<AssetConfigParams>,
    #[serde(default)]
    pub asset_transfer: Option<AssetTransferParams>,
    #[serde(default)]
    pub asset_freeze: Option<AssetFreezeParams>,
    #[serde(default)]
    pub application_call: Option<ApplicationCallParams>,
    #[serde(default)]
    pub state_proof: Option<StateProofParams>,
}

// ─── Resolution Helpers ──────────────────────────────────────────────────────

fn resolve_address(field: &'static str, text: &str) -> Result<Address, TxError> {
    Address::decode(text).map_err(|source| TxError::Address { field, source })
}

/// Resolve an optional address slot. The zero address is forbidden here:
/// callers must express "unset" by omitting the field.
fn resolve_optional_address(
    field: &'static str,
    text: &Option<String>,
) -> Result<Option<Address>, TxError> {
    match text {
        None => Ok(None),
        Some(text) => {
            let address = resolve_address(field, text)?;
            if address.is_zero() {
                return Err(TxError::ZeroAddress(field));
            }
            Ok(Some(address))
        }
    }
}

fn fixed_bytes<const N: usize>(field: &'static str, bytes: &[u8]) -> Result<[u8; N], TxError> {
    bytes.try_into().map_err(|_| TxError::InvalidLength {
        field,
        expected: N,
        actual: bytes.len(),
    })
}

fn optional_fixed<const N: usize>(
    field: &'static str,
    bytes: &Option<Vec<u8>>,
) -> Result<Option<[u8; N]>, TxError> {
    match bytes {
        None => Ok(None),
        Some(bytes) => Ok(Some(fixed_bytes(field, bytes)?)),
    }
}

/// Like [`optional_fixed`], but an all-zero value normalizes to absent, so
/// "zero lease" and "no lease" serialize identically.
fn optional_fixed_elide_zero<const N: usize>(
    field: &'static str,
    bytes: &Option<Vec<u8>>,
) -> Result<Option<[u8; N]>, TxError> {
    Ok(optional_fixed::<N>(field, bytes)?.filter(|v| *v != [0u8; N]))
}

// ─── Construction ────────────────────────────────────────────────────────────

impl Transaction {
    /// Validate a parameter record and construct the transaction,
    /// resolving the fee last (the size-dependent fee needs every other
    /// field to be final before the transaction is encoded once).
    pub fn from_params(params: &TxParams) -> Result<Transaction, TxError> {
        let tx_type = TxType::parse(&params.tx_type)
            .ok_or_else(|| TxError::UnknownType(params.tx_type.clone()))?;

        let populated = params.payment.is_some() as usize
            + params.key_registration.is_some() as usize
            + params.asset_config.is_some() as usize
            + params.asset_transfer.is_some() as usize
            + params.asset_freeze.is_some() as usize
            + params.application_call.is_some() as usize
            + params.state_proof.is_some() as usize;
        if populated != 1 {
            return Err(TxError::PayloadCount(populated));
        }

        let payload = match tx_type {
            TxType::Payment => {
                let p = params
                    .payment
                    .as_ref()
                    .ok_or(TxError::PayloadMismatch("pay"))?;
                TxPayload::Payment(PaymentFields {
                    receiver: resolve_address("receiver", &p.receiver)?,
                    amount: p.amount,
                    close_remainder_to: resolve_optional_address(
                        "closeRemainderTo",
                        &p.close_remainder_to,
                    )?,
                })
            }
            TxType::KeyRegistration => {
                let p = params
                    .key_registration
                    .as_ref()
                    .ok_or(TxError::PayloadMismatch("keyreg"))?;
                TxPayload::KeyRegistration(build_key_registration(p)?)
            }
            TxType::AssetConfig => {
                let p = params
                    .asset_config
                    .as_ref()
                    .ok_or(TxError::PayloadMismatch("acfg"))?;
                TxPayload::AssetConfig(AssetConfigFields {
                    asset_id: p.asset_id,
                    params: AssetParams {
                        total: p.total,
                        decimals: p.decimals,
                        default_frozen: p.default_frozen,
                        unit_name: p.unit_name.clone().unwrap_or_default(),
                        asset_name: p.asset_name.clone().unwrap_or_default(),
                        url: p.url.clone().unwrap_or_default(),
                        metadata_hash: optional_fixed_elide_zero::<METADATA_HASH_SIZE>(
                            "metadataHash",
                            &p.metadata_hash,
                        )?,
                        manager: resolve_optional_address("manager", &p.manager)?,
                        reserve: resolve_optional_address("reserve", &p.reserve)?,
                        freeze: resolve_optional_address("freeze", &p.freeze)?,
                        clawback: resolve_optional_address("clawback", &p.clawback)?,
                    },
                })
            }
            TxType::AssetTransfer => {
                let p = params
                    .asset_transfer
                    .as_ref()
                    .ok_or(TxError::PayloadMismatch("axfer"))?;
                TxPayload::AssetTransfer(AssetTransferFields {
                    asset_id: p.asset_id,
                    amount: p.amount,
                    asset_sender: resolve_optional_address("assetSender", &p.asset_sender)?,
                    receiver: resolve_address("receiver", &p.receiver)?,
                    close_remainder_to: resolve_optional_address(
                        "closeRemainderTo",
                        &p.close_remainder_to,
                    )?,
                })
            }
            TxType::AssetFreeze => {
                let p = params
                    .asset_freeze
                    .as_ref()
                    .ok_or(TxError::PayloadMismatch("afrz"))?;
                TxPayload::AssetFreeze(AssetFreezeFields {
                    asset_id: p.asset_id,
                    freeze_account: resolve_address("freezeAccount", &p.freeze_account)?,
                    frozen: p.frozen,
                })
            }
            TxType::ApplicationCall => {
                let p = params
                    .application_call
                    .as_ref()
                    .ok_or(TxError::PayloadMismatch("appl"))?;
                TxPayload::ApplicationCall(build_application_call(p)?)
            }
            TxType::StateProof => {
                let p = params
                    .state_proof
                    .as_ref()
                    .ok_or(TxError::PayloadMismatch("stpf"))?;
                TxPayload::StateProof(StateProofFields {
                    state_proof_type: p.state_proof_type,
                    state_proof: p.state_proof.clone(),
                    message: p.message.clone(),
                })
            }
        };

        let sp = &params.suggested_params;
        let mut txn = Transaction {
            sender: resolve_address("sender", &params.sender)?,
            fee: sp.fee,
            first_valid: sp.first_valid,
            last_valid: sp.last_valid,
            genesis_id: sp.genesis_id.clone().unwrap_or_default(),
            genesis_hash: fixed_bytes::<GENESIS_HASH_SIZE>("genesisHash", &sp.genesis_hash)?,
            note: params.note.clone().unwrap_or_default(),
            lease: optional_fixed_elide_zero::<LEASE_SIZE>("lease", &params.lease)?,
            rekey_to: resolve_optional_address("rekeyTo", &params.rekey_to)?,
            group: None,
            payload,
        };

        if !sp.flat_fee {
            txn.fee = fee::size_dependent_fee(&txn, sp.fee, sp.min_fee);
        }

        Ok(txn)
    }
}

/// Enforce the keyreg tri-state: online requires the vote key, selection
/// key, and all three vote rounds (the state proof key stays optional for
/// pre-state-proof keys); offline and non-participation require all of
/// them absent.
///
/// A vote round of 0 normalizes to absent before the check. The wire
/// format elides zero integers, so `Some(0)` and `None` encode
/// identically and the distinction cannot round-trip; an online
/// registration must carry nonzero rounds and `Some(0)` is rejected as a
/// shape violation rather than silently encoding as an absent field.
fn build_key_registration(
    p: &KeyRegistrationParams,
) -> Result<KeyRegistrationFields, TxError> {
    let vote_key = optional_fixed::<KEY_SIZE>("voteKey", &p.vote_key)?;
    let selection_key = optional_fixed::<KEY_SIZE>("selectionKey", &p.selection_key)?;
    let state_proof_key =
        optional_fixed::<STATE_PROOF_KEY_SIZE>("stateProofKey", &p.state_proof_key)?;
    let vote_first = p.vote_first.filter(|&v| v != 0);
    let vote_last = p.vote_last.filter(|&v| v != 0);
    let vote_key_dilution = p.vote_key_dilution.filter(|&v| v != 0);

    let participation = [
        vote_key.is_some(),
        selection_key.is_some(),
        vote_first.is_some(),
        vote_last.is_some(),
        vote_key_dilution.is_some(),
    ];

    if p.non_participation {
        if participation.iter().any(|&set| set) || state_proof_key.is_some() {
            return Err(TxError::KeyRegShape);
        }
    } else if participation.iter().any(|&set| set) {
        if !participation.iter().all(|&set| set) {
            return Err(TxError::KeyRegShape);
        }
    } else if state_proof_key.is_some() {
        return Err(TxError::KeyRegShape);
    }

    Ok(KeyRegistrationFields {
        vote_key,
        selection_key,
        state_proof_key,
        vote_first,
        vote_last,
        vote_key_dilution,
        non_participation: p.non_participation,
    })
}

fn build_application_call(
    p: &ApplicationCallParams,
) -> Result<ApplicationCallFields, TxError> {
    let mut accounts = Vec::with_capacity(p.accounts.len());
    for account in &p.accounts {
        accounts.push(resolve_address("accounts", account)?);
    }

    let mut boxes = Vec::with_capacity(p.boxes.len());
    for b in &p.boxes {
        let valid = b.app_index == 0
            || b.app_index == p.app_id
            || p.foreign_apps.contains(&b.app_index);
        if !valid {
            return Err(TxError::BadBoxReference(b.app_index));
        }
        boxes.push(BoxReference {
            app_index: b.app_index,
            name: b.name.clone(),
        });
    }

    Ok(ApplicationCallFields {
        app_id: p.app_id,
        on_complete: p.on_complete,
        approval_program: p.approval_program.clone(),
        clear_program: p.clear_program.clone(),
        app_args: p.app_args.clone(),
        accounts,
        foreign_apps: p.foreign_apps.clone(),
        foreign_assets: p.foreign_assets.clone(),
        boxes,
        local_schema: StateSchema {
            num_uints: p.local_schema.num_uints,
            num_byte_slices: p.local_schema.num_byte_slices,
        },
        global_schema: StateSchema {
            num_uints: p.global_schema.num_uints,
            num_byte_slices: p.global_schema.num_byte_slices,
        },
        extra_pages: p.extra_pages,
    })
}
