use ssz_derive::{Decode, Encode};
use ssz_types::FixedVector;

use crate::{phase0::primitives::PublicKeyBytes, preset::Preset};

#[derive(Clone, PartialEq, Default, Debug, Encode, Decode)]
pub struct SyncCommittee<P: Preset> {
    pub pubkeys: FixedVector<PublicKeyBytes, P::SyncCommitteeSize>,
    pub aggregate_pubkey: PublicKeyBytes,
}
