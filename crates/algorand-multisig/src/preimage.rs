//! The multisig pre-image: version, threshold, and ordered public keys.

use crate::MultisigError;
use algorand_tx::types::{MultisigSignature, MultisigSubsig};
use algorand_types::constants::{KEY_SIZE, MULTISIG_VERSION};
use algorand_types::Address;
use serde::{Deserialize, Serialize};

/// The tuple that deterministically yields a multisig address. The order
/// of `public_keys` is semantically significant: permuting it produces a
/// different address and a different account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultisigPreImage {
    pub version: u8,
    pub threshold: u8,
    pub public_keys: Vec<[u8; KEY_SIZE]>,
}

impl MultisigPreImage {
    /// Build and validate a pre-image.
    pub fn new(
        version: u8,
        threshold: u8,
        public_keys: Vec<[u8; KEY_SIZE]>,
    ) -> Result<Self, MultisigError> {
        let preimage = Self {
            version,
            threshold,
            public_keys,
        };
        preimage.validate()?;
        Ok(preimage)
    }

    pub fn validate(&self) -> Result<(), MultisigError> {
        if self.version != MULTISIG_VERSION {
            return Err(MultisigError::InvalidVersion(self.version));
        }
        if self.public_keys.is_empty()
            || self.threshold == 0
            || self.threshold as usize > self.public_keys.len()
        {
            return Err(MultisigError::InvalidThreshold {
                threshold: self.threshold,
                keys: self.public_keys.len(),
            });
        }
        Ok(())
    }

    /// The address this pre-image derives to.
    pub fn address(&self) -> Address {
        Address::from_multisig_preimage(self.version, self.threshold, &self.public_keys)
    }

    /// Position of a public key within the pre-image.
    pub fn index_of(&self, public_key: &[u8; KEY_SIZE]) -> Option<usize> {
        self.public_keys.iter().position(|pk| pk == public_key)
    }

    /// Reconstruct the pre-image of an existing multisig record.
    pub fn from_signature(msig: &MultisigSignature) -> Self {
        Self {
            version: msig.version,
            threshold: msig.threshold,
            public_keys: msig.public_keys(),
        }
    }

    /// A multisig record with every slot unsigned.
    pub fn blank_signature(&self) -> MultisigSignature {
        MultisigSignature {
            version: self.version,
            threshold: self.threshold,
            subsigs: self
                .public_keys
                .iter()
                .map(|&public_key| MultisigSubsig {
                    public_key,
                    signature: None,
                })
                .collect(),
        }
    }
}
