//! Signing preimage, transaction IDs, and single-signature envelopes.
//!
//! The signing preimage is the literal ASCII prefix `TX` followed by the
//! canonical encoding; the transaction ID is its SHA-512/256. Multisig
//! envelopes are built by the coordinator crate on top of the same
//! primitives.

use crate::encode;
use crate::types::{SignedTransaction, Transaction};
use crate::TxError;
use algorand_crypto::ed25519;
use algorand_crypto::sha512_256;
use algorand_types::base32;
use algorand_types::constants::{HASH_SIZE, TXID_LEN, TXID_PREFIX};
use algorand_types::Address;

impl Transaction {
    /// The bytes that are signed: `"TX" || canonical encoding`.
    pub fn bytes_to_sign(&self) -> Vec<u8> {
        let encoded = encode::encode_transaction(self);
        let mut buf = Vec::with_capacity(TXID_PREFIX.len() + encoded.len());
        buf.extend_from_slice(TXID_PREFIX);
        buf.extend_from_slice(&encoded);
        buf
    }

    /// The 32-byte transaction ID: SHA-512/256 of the signing preimage.
    pub fn id_raw(&self) -> [u8; HASH_SIZE] {
        sha512_256(&self.bytes_to_sign())
    }

    /// The textual transaction ID: unpadded base32, 52 characters.
    pub fn id(&self) -> String {
        let mut id = base32::encode(&self.id_raw());
        id.truncate(TXID_LEN);
        id
    }

    /// Raw Ed25519 signature over the signing preimage.
    pub fn raw_sign(&self, secret: &[u8; 32]) -> [u8; 64] {
        ed25519::sign(secret, &self.bytes_to_sign())
    }

    /// Sign with a secret key, producing the signed envelope. The
    /// auth-address is attached iff the key's address differs from the
    /// sender (i.e. the account has been rekeyed to this signer).
    pub fn sign(&self, secret: &[u8; 32]) -> SignedTransaction {
        let signature = self.raw_sign(secret);
        let signer = Address::new(ed25519::public_key(secret));
        let auth_address = (signer != self.sender).then_some(signer);
        SignedTransaction {
            txn: self.clone(),
            sig: Some(signature),
            msig: None,
            lsig: None,
            auth_address,
        }
    }

    /// Attach an externally produced signature (hardware wallet, remote
    /// signer). The signature is taken as given after a length check;
    /// `signer` states whose key produced it.
    pub fn attach_signature(
        &self,
        signature: &[u8],
        signer: Address,
    ) -> Result<SignedTransaction, TxError> {
        if !ed25519::is_valid_signature_len(signature.len()) {
            return Err(TxError::BadSignatureLength {
                expected: ed25519::SIGNATURE_SIZE,
                actual: signature.len(),
            });
        }
        let mut sig = [0u8; 64];
        sig.copy_from_slice(signature);
        let auth_address = (signer != self.sender).then_some(signer);
        Ok(SignedTransaction {
            txn: self.clone(),
            sig: Some(sig),
            msig: None,
            lsig: None,
            auth_address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{PaymentParams, SuggestedParams, TxParams};

    fn payment_from(sender: Address) -> Transaction {
        let params = TxParams {
            tx_type: "pay".to_string(),
            sender: sender.encode(),
            suggested_params: SuggestedParams {
                fee: 1000,
                min_fee: 1000,
                flat_fee: true,
                first_valid: 1,
                last_valid: 1001,
                genesis_id: Some("testnet-v1.0".to_string()),
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

    #[test]
    fn test_bytes_to_sign_prefixed() {
        let txn = payment_from(Address::new([1u8; 32]));
        let bytes = txn.bytes_to_sign();
        assert_eq!(&bytes[..2], b"TX");
        assert_eq!(&bytes[2..], encode::encode_transaction(&txn).as_slice());
    }

    #[test]
    fn test_txid_stable_and_sized() {
        let txn = payment_from(Address::new([1u8; 32]));
        let id = txn.id();
        assert_eq!(id.len(), TXID_LEN);
        assert_eq!(id, txn.id(), "txID must be stable across calls");
        assert_eq!(txn.id_raw(), sha512_256(&txn.bytes_to_sign()));
    }

    #[test]
    fn test_group_changes_txid() {
        let mut txn = payment_from(Address::new([1u8; 32]));
        let before = txn.id();
        txn.set_group([3u8; 32]).unwrap();
        assert_ne!(before, txn.id());
    }

    #[test]
    fn test_sign_verifies() {
        let secret = ed25519::generate_secret();
        let sender = Address::new(ed25519::public_key(&secret));
        let txn = payment_from(sender);
        let st = txn.sign(&secret);

        let sig = st.sig.unwrap();
        assert!(ed25519::verify(
            sender.as_bytes(),
            &txn.bytes_to_sign(),
            &sig
        ));
        assert!(st.auth_address.is_none(), "sender key sets no sgnr");
    }

    #[test]
    fn test_sign_with_foreign_key_sets_auth_address() {
        let secret = ed25519::generate_secret();
        let signer = Address::new(ed25519::public_key(&secret));
        let txn = payment_from(Address::new([1u8; 32]));
        let st = txn.sign(&secret);
        assert_eq!(st.auth_address, Some(signer));
    }

    #[test]
    fn test_attach_signature_length_checked() {
        let txn = payment_from(Address::new([1u8; 32]));
        assert!(matches!(
            txn.attach_signature(&[0u8; 63], Address::new([1u8; 32])),
            Err(TxError::BadSignatureLength { .. })
        ));

        let st = txn
            .attach_signature(&[7u8; 64], Address::new([9u8; 32]))
            .unwrap();
        assert_eq!(st.sig, Some([7u8; 64]));
        assert_eq!(st.auth_address, Some(Address::new([9u8; 32])));
    }
}
