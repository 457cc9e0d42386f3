use ssz_derive::{Decode, Encode};
use ssz_types::{BitList, VariableList};
use tree_hash_derive::TreeHash;

use crate::{
    combined::ExecutionPayloadHeader,
    phase0::primitives::{
        CommitteeIndex, DepositIndex, Epoch, ExecutionBlockHash, Gwei, PublicKeyBytes,
        SignatureBytes, Slot, ValidatorIndex, Version, H256,
    },
    preset::Preset,
};

// Public keys and signatures stay compressed; the archive never checks them.

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Debug, Encode, Decode, TreeHash)]
pub struct Checkpoint {
    pub epoch: Epoch,
    pub root: H256,
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Encode, Decode, TreeHash)]
pub struct Eth1Data {
    pub deposit_root: H256,
    pub deposit_count: DepositIndex,
    pub block_hash: ExecutionBlockHash,
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Encode, Decode, TreeHash)]
pub struct Fork {
    pub previous_version: Version,
    pub current_version: Version,
    pub epoch: Epoch,
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Encode, Decode, TreeHash)]
pub struct BeaconBlockHeader {
    pub slot: Slot,
    pub proposer_index: ValidatorIndex,
    pub parent_root: H256,
    pub state_root: H256,
    pub body_root: H256,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Debug, Encode, Decode, TreeHash)]
pub struct AttestationData {
    pub slot: Slot,
    pub index: CommitteeIndex,
    pub beacon_block_root: H256,
    pub source: Checkpoint,
    pub target: Checkpoint,
}

#[derive(Clone, PartialEq, Debug, Encode, Decode)]
pub struct Attestation<P: Preset> {
    pub aggregation_bits: BitList<P::MaxValidatorsPerCommittee>,
    pub data: AttestationData,
    pub signature: SignatureBytes,
}

#[derive(Clone, PartialEq, Debug, Encode, Decode)]
pub struct PendingAttestation<P: Preset> {
    pub aggregation_bits: BitList<P::MaxValidatorsPerCommittee>,
    pub data: AttestationData,
    pub inclusion_delay: u64,
    pub proposer_index: ValidatorIndex,
}

#[derive(Clone, PartialEq, Eq, Default, Debug, Encode, Decode)]
pub struct Validator {
    pub pubkey: PublicKeyBytes,
    pub withdrawal_credentials: H256,
    pub effective_balance: Gwei,
    pub slashed: bool,
    pub activation_eligibility_epoch: Epoch,
    pub activation_epoch: Epoch,
    pub exit_epoch: Epoch,
    pub withdrawable_epoch: Epoch,
}

impl Validator {
    // > Check if ``validator`` is active.
    #[inline]
    #[must_use]
    pub const fn is_active_at(&self, epoch: Epoch) -> bool {
        self.activation_epoch <= epoch && epoch < self.exit_epoch
    }
}

/// A block as the archive stores it: blinded, with the body root computed at
/// ingestion. Recomputing the root here would be wasted work since blinded
/// and full bodies merkleize identically.
#[derive(Clone, PartialEq, Debug)]
pub struct BeaconBlock<P: Preset> {
    pub slot: Slot,
    pub proposer_index: ValidatorIndex,
    pub parent_root: H256,
    pub state_root: H256,
    pub body_root: H256,
    pub body: BeaconBlockBody<P>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct BeaconBlockBody<P: Preset> {
    pub randao_reveal: SignatureBytes,
    pub eth1_data: Eth1Data,
    pub graffiti: H256,
    pub attestations: VariableList<Attestation<P>, P::MaxAttestations>,
    pub execution_payload_header: Option<ExecutionPayloadHeader>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct SignedBeaconBlock<P: Preset> {
    pub message: BeaconBlock<P>,
    pub signature: SignatureBytes,
}

impl<P: Preset> SignedBeaconBlock<P> {
    #[must_use]
    pub fn to_header(&self) -> BeaconBlockHeader {
        let BeaconBlock {
            slot,
            proposer_index,
            parent_root,
            state_root,
            body_root,
            body: _,
        } = self.message;

        BeaconBlockHeader {
            slot,
            proposer_index,
            parent_root,
            state_root,
            body_root,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::phase0::consts::FAR_FUTURE_EPOCH;

    use super::*;

    #[test]
    fn validator_activity_covers_the_half_open_range() {
        let validator = Validator {
            activation_epoch: 3,
            exit_epoch: 7,
            withdrawable_epoch: FAR_FUTURE_EPOCH,
            ..Validator::default()
        };

        assert!(!validator.is_active_at(2));
        assert!(validator.is_active_at(3));
        assert!(validator.is_active_at(6));
        assert!(!validator.is_active_at(7));
    }
}
