//! Fee resolution.
//!
//! The non-flat fee is size-dependent: the suggested per-byte fee times the
//! estimated size of the eventual signed blob, floored at the caller's
//! minimum. The estimate is taken from one canonical encoding of the
//! transaction with every other field already final; the encoding is not
//! recomputed after the fee lands.

use crate::encode;
use crate::types::Transaction;
use algorand_types::constants::SIGNED_TXN_OVERHEAD;

/// Estimated size of the signed blob: the canonical encoding of the
/// transaction plus a fixed signing overhead.
pub fn estimate_size(txn: &Transaction) -> usize {
    encode::encode_transaction(txn).len() + SIGNED_TXN_OVERHEAD
}

/// `suggested_fee × estimated_size`, clamped up to `min_fee`.
pub(crate) fn size_dependent_fee(txn: &Transaction, suggested_fee: u64, min_fee: u64) -> u64 {
    let fee = suggested_fee.saturating_mul(estimate_size(txn) as u64);
    fee.max(min_fee)
}
