//! Building multisig envelopes and applying one signer's partial.

use crate::merge::merge;
use crate::preimage::MultisigPreImage;
use crate::MultisigError;
use algorand_crypto::ed25519;
use algorand_tx::types::{SignedTransaction, Transaction};

/// Build the empty multisig envelope for a transaction: every slot
/// present, none signed. The auth-address is attached iff the
/// transaction's sender differs from the multisig address (the usual
/// rekeyed-to-multisig case).
pub fn create_unsigned(
    txn: &Transaction,
    preimage: &MultisigPreImage,
) -> Result<SignedTransaction, MultisigError> {
    preimage.validate()?;
    let msig_address = preimage.address();
    let auth_address = (*txn.sender() != msig_address).then_some(msig_address);
    Ok(SignedTransaction {
        txn: txn.clone(),
        sig: None,
        msig: Some(preimage.blank_signature()),
        lsig: None,
        auth_address,
    })
}

/// Sign with one participant's secret key, producing an envelope with that
/// slot populated. The key's public half must appear in the pre-image.
pub fn partial_sign(
    txn: &Transaction,
    preimage: &MultisigPreImage,
    secret: &[u8; 32],
) -> Result<SignedTransaction, MultisigError> {
    let public_key = ed25519::public_key(secret);
    let signature = txn.raw_sign(secret);
    attach_partial(txn, preimage, &public_key, signature)
}

/// Like [`partial_sign`], but the 64-byte signature was produced
/// externally; `signer_key` identifies which slot it belongs to.
pub fn partial_sign_with_signature(
    txn: &Transaction,
    preimage: &MultisigPreImage,
    signer_key: &[u8; 32],
    signature: &[u8],
) -> Result<SignedTransaction, MultisigError> {
    if !ed25519::is_valid_signature_len(signature.len()) {
        return Err(MultisigError::BadSignatureLength {
            expected: ed25519::SIGNATURE_SIZE,
            actual: signature.len(),
        });
    }
    let mut sig = [0u8; 64];
    sig.copy_from_slice(signature);
    attach_partial(txn, preimage, signer_key, sig)
}

fn attach_partial(
    txn: &Transaction,
    preimage: &MultisigPreImage,
    signer_key: &[u8; 32],
    signature: [u8; 64],
) -> Result<SignedTransaction, MultisigError> {
    let index = preimage
        .index_of(signer_key)
        .ok_or(MultisigError::KeyNotFound)?;
    let mut envelope = create_unsigned(txn, preimage)?;
    if let Some(msig) = envelope.msig.as_mut() {
        msig.subsigs[index].signature = Some(signature);
    }
    Ok(envelope)
}

/// Decode an existing multisig envelope, add a fresh partial signature
/// over the contained transaction, and merge. Returns the new envelope
/// bytes and the (unchanged) transaction ID.
///
/// The supplied pre-image must equal the one already embedded in the
/// envelope; a differing pre-image would amount to mutating the multisig
/// account under existing signatures.
pub fn append_sign(
    blob: &[u8],
    preimage: &MultisigPreImage,
    secret: &[u8; 32],
) -> Result<(Vec<u8>, String), MultisigError> {
    let existing = SignedTransaction::decode(blob)?;
    let msig = existing.msig.as_ref().ok_or(MultisigError::MissingMultisig)?;
    if MultisigPreImage::from_signature(msig) != *preimage {
        return Err(MultisigError::PreImageMismatch);
    }

    let fresh = partial_sign(&existing.txn, preimage, secret)?;
    let merged = merge(&[existing, fresh])?;
    let tx_id = merged.txn.id();
    Ok((merged.encode(), tx_id))
}
