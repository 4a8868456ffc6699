//! Threshold verification of multisig records.

use crate::preimage::MultisigPreImage;
use algorand_crypto::ed25519;
use algorand_tx::types::MultisigSignature;
use algorand_types::Address;

/// Verify a multisig record over a signed byte string.
///
/// True iff the pre-image derives to `expected`, at least `threshold`
/// slots carry a signature, and every carried signature verifies against
/// its slot's key. Unsigned slots are ignored; any failure, including a
/// malformed pre-image, is a plain `false`.
pub fn verify(message: &[u8], msig: &MultisigSignature, expected: &Address) -> bool {
    let preimage = MultisigPreImage::from_signature(msig);
    if preimage.validate().is_err() {
        return false;
    }
    if preimage.address() != *expected {
        return false;
    }

    let mut verified = 0usize;
    for subsig in &msig.subsigs {
        if let Some(signature) = &subsig.signature {
            if !ed25519::verify(&subsig.public_key, message, signature) {
                return false;
            }
            verified += 1;
        }
    }

    verified >= msig.threshold as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sign::partial_sign;
    use crate::merge::merge;
    use algorand_tx::params::{PaymentParams, SuggestedParams, TxParams};
    use algorand_tx::types::Transaction;

    fn payment(sender: Address) -> Transaction {
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
                amount: 1000,
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
    fn test_verify_at_threshold() {
        let (secrets, preimage) = two_of_three();
        let txn = payment(preimage.address());

        let a = partial_sign(&txn, &preimage, &secrets[0]).unwrap();
        let b = partial_sign(&txn, &preimage, &secrets[1]).unwrap();
        let merged = merge(&[a, b]).unwrap();

        assert!(verify(
            &txn.bytes_to_sign(),
            merged.msig.as_ref().unwrap(),
            &preimage.address()
        ));
    }

    #[test]
    fn test_verify_below_threshold_fails() {
        let (secrets, preimage) = two_of_three();
        let txn = payment(preimage.address());
        let a = partial_sign(&txn, &preimage, &secrets[0]).unwrap();

        assert!(!verify(
            &txn.bytes_to_sign(),
            a.msig.as_ref().unwrap(),
            &preimage.address()
        ));
    }

    #[test]
    fn test_verify_wrong_expected_address_fails() {
        let (secrets, preimage) = two_of_three();
        let txn = payment(preimage.address());

        let a = partial_sign(&txn, &preimage, &secrets[0]).unwrap();
        let b = partial_sign(&txn, &preimage, &secrets[1]).unwrap();
        let merged = merge(&[a, b]).unwrap();

        assert!(!verify(
            &txn.bytes_to_sign(),
            merged.msig.as_ref().unwrap(),
            &Address::new([0x99u8; 32])
        ));
    }

    #[test]
    fn test_verify_corrupt_signature_fails() {
        let (secrets, preimage) = two_of_three();
        let txn = payment(preimage.address());

        let a = partial_sign(&txn, &preimage, &secrets[0]).unwrap();
        let b = partial_sign(&txn, &preimage, &secrets[1]).unwrap();
        let mut merged = merge(&[a, b]).unwrap();
        if let Some(msig) = merged.msig.as_mut() {
            msig.subsigs[0].signature = Some([0xEEu8; 64]);
        }

        assert!(!verify(
            &txn.bytes_to_sign(),
            merged.msig.as_ref().unwrap(),
            &preimage.address()
        ));
    }

    #[test]
    fn test_verify_extra_signature_still_passes() {
        let (secrets, preimage) = two_of_three();
        let txn = payment(preimage.address());

        let partials: Vec<_> = secrets
            .iter()
            .map(|secret| partial_sign(&txn, &preimage, secret).unwrap())
            .collect();
        let merged = merge(&partials).unwrap();

        assert_eq!(merged.msig.as_ref().unwrap().signature_count(), 3);
        assert!(verify(
            &txn.bytes_to_sign(),
            merged.msig.as_ref().unwrap(),
            &preimage.address()
        ));
    }
}
