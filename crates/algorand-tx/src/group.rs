//! Atomic transaction groups.
//!
//! The group ID is SHA-512/256 over `"TG"` followed by the canonical
//! encoding of `{txlist: [txid_1, ..., txid_n]}`. Assigning it is the one
//! legal mutation of a constructed transaction, and each transaction
//! accepts it exactly once.

use crate::types::Transaction;
use crate::TxError;
use algorand_crypto::{msgpack, sha512_256};
use algorand_types::constants::{HASH_SIZE, MAX_TX_GROUP_SIZE, TX_GROUP_PREFIX};

/// Compute the group ID for a set of transactions. The transactions must
/// not already carry a group.
pub fn compute_group_id(txns: &[Transaction]) -> Result<[u8; HASH_SIZE], TxError> {
    if txns.is_empty() {
        return Err(TxError::EmptyGroup);
    }
    if txns.len() > MAX_TX_GROUP_SIZE {
        return Err(TxError::GroupTooLarge {
            got: txns.len(),
            max: MAX_TX_GROUP_SIZE,
        });
    }
    if txns.iter().any(|txn| txn.group().is_some()) {
        return Err(TxError::GroupAlreadySet);
    }

    let mut encoded = Vec::new();
    msgpack::write_map_len(&mut encoded, 1);
    msgpack::write_str(&mut encoded, "txlist");
    msgpack::write_array_len(&mut encoded, txns.len());
    for txn in txns {
        msgpack::write_bin(&mut encoded, &txn.id_raw());
    }

    let mut preimage = Vec::with_capacity(TX_GROUP_PREFIX.len() + encoded.len());
    preimage.extend_from_slice(TX_GROUP_PREFIX);
    preimage.extend_from_slice(&encoded);
    Ok(sha512_256(&preimage))
}

/// Compute the group ID and assign it to every transaction in the slice.
pub fn assign_group_id(txns: &mut [Transaction]) -> Result<[u8; HASH_SIZE], TxError> {
    let group_id = compute_group_id(txns)?;
    for txn in txns.iter_mut() {
        txn.set_group(group_id)?;
    }
    Ok(group_id)
}
