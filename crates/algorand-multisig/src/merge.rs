//! Merging independently produced partial multisig envelopes.
//!
//! The first envelope fixes the reference transaction ID, auth-address,
//! and pre-image; every other envelope must agree on all three. Slots are
//! merged as a set union of signatures, and two different signatures for
//! the same slot are a fatal conflict, never a choice. The operation is
//! commutative, associative, and idempotent on conflict-free inputs.

use crate::preimage::MultisigPreImage;
use crate::MultisigError;
use algorand_tx::types::{MultisigSignature, SignedTransaction};

/// Merge two or more multisig envelopes into one.
pub fn merge(envelopes: &[SignedTransaction]) -> Result<SignedTransaction, MultisigError> {
    if envelopes.len() < 2 {
        return Err(MultisigError::TooFewBlobs(envelopes.len()));
    }

    let first = &envelopes[0];
    let reference = first.msig.as_ref().ok_or(MultisigError::MissingMultisig)?;
    let reference_preimage = MultisigPreImage::from_signature(reference);
    reference_preimage.validate()?;
    let reference_id = first.txn.id();

    let mut subsigs = reference.subsigs.clone();

    for envelope in &envelopes[1..] {
        let msig = envelope.msig.as_ref().ok_or(MultisigError::MissingMultisig)?;

        if envelope.txn.id() != reference_id {
            return Err(MultisigError::TxIdMismatch);
        }
        if envelope.auth_address != first.auth_address {
            return Err(MultisigError::AuthAddrMismatch);
        }
        if MultisigPreImage::from_signature(msig) != reference_preimage {
            return Err(MultisigError::PreImageMismatch);
        }

        for (slot, subsig) in msig.subsigs.iter().enumerate() {
            let Some(signature) = subsig.signature else {
                continue;
            };
            match subsigs[slot].signature {
                None => subsigs[slot].signature = Some(signature),
                Some(existing) if existing == signature => {}
                Some(_) => return Err(MultisigError::SignatureConflict(slot)),
            }
        }
    }

    Ok(SignedTransaction {
        txn: first.txn.clone(),
        sig: None,
        msig: Some(MultisigSignature {
            version: reference_preimage.version,
            threshold: reference_preimage.threshold,
            subsigs,
        }),
        lsig: None,
        auth_address: first.auth_address,
    })
}

/// Decode, merge, and re-encode raw envelope bytes.
pub fn merge_blobs(blobs: &[&[u8]]) -> Result<Vec<u8>, MultisigError> {
    let mut envelopes = Vec::with_capacity(blobs.len());
    for blob in blobs {
        envelopes.push(SignedTransaction::decode(blob)?);
    }
    Ok(merge(&envelopes)?.encode())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sign::partial_sign;
    use algorand_crypto::ed25519;
    use algorand_tx::params::{PaymentParams, SuggestedParams, TxParams};
    use algorand_tx::types::Transaction;
    use algorand_types::Address;

    fn payment(amount: u64, sender: Address) -> Transaction {
        let params = TxParams {
            tx_type: "pay".to_string(),
            sender: sender.encode(),
            suggested_params: SuggestedParams {
                fee: 1000,
                min_fee: 1000,
                flat_fee: true,
                first_valid: 1,
                last_valid: 1001,
                genesis_id: None,
                genesis_hash: vec![0x01; 32],
            },
            note: None,
            lease: None,
            rekey_to: None,
            payment: Some(PaymentParams {
                receiver: Address::new([2u8; 32]).encode(),
                amount,
                close_remainder_to: None,
            }),
            key_registration: None,
            asset_config: None,
            asset_transfer: None,
            asset_freeze: None,
            application_call: None,
            state_proof: None,
        };
        Transaction::from_params(&params).unwrap()
    }

    fn two_of_three() -> (Vec<[u8; 32]>, MultisigPreImage) {
        let secrets: Vec<[u8; 32]> = vec![[0x11; 32], [0x22; 32], [0x33; 32]];
        let keys = secrets.iter().map(ed25519::public_key).collect::<Vec<_>>();
        let preimage = MultisigPreImage::new(1, 2, keys).unwrap();
        (secrets, preimage)
    }

    #[test]
    fn test_merge_two_partials() {
        let (secrets, preimage) = two_of_three();
        let txn = payment(1000, preimage.address());

        let a = partial_sign(&txn, &preimage, &secrets[0]).unwrap();
        let b = partial_sign(&txn, &preimage, &secrets[1]).unwrap();

        let merged = merge(&[a, b]).unwrap();
        let msig = merged.msig.unwrap();
        assert!(msig.subsigs[0].signature.is_some());
        assert!(msig.subsigs[1].signature.is_some());
        assert!(msig.subsigs[2].signature.is_none());
    }

    #[test]
    fn test_merge_commutative() {
        let (secrets, preimage) = two_of_three();
        let txn = payment(1000, preimage.address());

        let a = partial_sign(&txn, &preimage, &secrets[0]).unwrap();
        let b = partial_sign(&txn, &preimage, &secrets[1]).unwrap();

        let ab = merge(&[a.clone(), b.clone()]).unwrap();
        let ba = merge(&[b, a]).unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.encode(), ba.encode());
    }

    #[test]
    fn test_merge_associative_and_idempotent() {
        let (secrets, preimage) = two_of_three();
        let txn = payment(1000, preimage.address());

        let a = partial_sign(&txn, &preimage, &secrets[0]).unwrap();
        let b = partial_sign(&txn, &preimage, &secrets[1]).unwrap();
        let c = partial_sign(&txn, &preimage, &secrets[2]).unwrap();

        let left = merge(&[merge(&[a.clone(), b.clone()]).unwrap(), c.clone()]).unwrap();
        let right = merge(&[a.clone(), merge(&[b.clone(), c.clone()]).unwrap()]).unwrap();
        assert_eq!(left, right);

        // Idempotent: merging an envelope with itself changes nothing.
        let aa = merge(&[a.clone(), a.clone()]).unwrap();
        assert_eq!(aa.msig, a.msig);
    }

    #[test]
    fn test_merge_conflict_fatal() {
        let (secrets, preimage) = two_of_three();
        let txn = payment(1000, preimage.address());

        let a = partial_sign(&txn, &preimage, &secrets[0]).unwrap();
        let mut forged = a.clone();
        if let Some(msig) = forged.msig.as_mut() {
            msig.subsigs[0].signature = Some([0xEEu8; 64]);
        }

        assert!(matches!(
            merge(&[a, forged]),
            Err(MultisigError::SignatureConflict(0))
        ));
    }

    #[test]
    fn test_merge_txid_mismatch() {
        let (secrets, preimage) = two_of_three();
        let a = partial_sign(&payment(1000, preimage.address()), &preimage, &secrets[0]).unwrap();
        let b = partial_sign(&payment(2000, preimage.address()), &preimage, &secrets[1]).unwrap();
        assert!(matches!(merge(&[a, b]), Err(MultisigError::TxIdMismatch)));
    }

    #[test]
    fn test_merge_preimage_mismatch() {
        let (secrets, preimage) = two_of_three();
        let txn = payment(1000, preimage.address());

        // Same three keys, reversed order: a different multisig account.
        let mut reversed_keys = preimage.public_keys.clone();
        reversed_keys.reverse();
        let reversed = MultisigPreImage::new(1, 2, reversed_keys).unwrap();

        // Both sign the same txn with matching auth-addresses so only the
        // pre-image differs.
        let a = partial_sign(&txn, &preimage, &secrets[0]).unwrap();
        let mut b = partial_sign(&txn, &reversed, &secrets[1]).unwrap();
        b.auth_address = a.auth_address;

        assert!(matches!(
            merge(&[a, b]),
            Err(MultisigError::PreImageMismatch)
        ));
    }

    #[test]
    fn test_merge_auth_addr_mismatch() {
        let (secrets, preimage) = two_of_three();
        let txn = payment(1000, preimage.address());

        let a = partial_sign(&txn, &preimage, &secrets[0]).unwrap();
        let mut b = partial_sign(&txn, &preimage, &secrets[1]).unwrap();
        b.auth_address = Some(Address::new([0x55u8; 32]));

        assert!(matches!(
            merge(&[a, b]),
            Err(MultisigError::AuthAddrMismatch)
        ));
    }

    #[test]
    fn test_merge_requires_two() {
        let (secrets, preimage) = two_of_three();
        let txn = payment(1000, preimage.address());
        let a = partial_sign(&txn, &preimage, &secrets[0]).unwrap();
        assert!(matches!(merge(&[a]), Err(MultisigError::TooFewBlobs(1))));
        assert!(matches!(merge(&[]), Err(MultisigError::TooFewBlobs(0))));
    }

    #[test]
    fn test_merge_blobs_roundtrip() {
        let (secrets, preimage) = two_of_three();
        let txn = payment(1000, preimage.address());

        let a = partial_sign(&txn, &preimage, &secrets[0]).unwrap().encode();
        let b = partial_sign(&txn, &preimage, &secrets[1]).unwrap().encode();

        let merged = merge_blobs(&[&a, &b]).unwrap();
        let envelope = SignedTransaction::decode(&merged).unwrap();
        assert_eq!(envelope.msig.unwrap().signature_count(), 2);
    }
}
