use ssz_types::{FixedVector, VariableList};

use crate::{
    altair::primitives::ParticipationFlags,
    capella::containers::HistoricalSummary,
    phase0::{
        containers::{Eth1Data, PendingAttestation, Validator},
        primitives::{Gwei, H256},
    },
    preset::Preset,
};

pub type RecentRoots<P> = FixedVector<H256, <P as Preset>::SlotsPerHistoricalRoot>;
pub type HistoricalRoots<P> = VariableList<H256, <P as Preset>::HistoricalRootsLimit>;
pub type Eth1DataVotes<P> = VariableList<Eth1Data, <P as Preset>::Eth1DataVotesLimit>;
pub type Validators<P> = VariableList<Validator, <P as Preset>::ValidatorRegistryLimit>;
pub type Balances<P> = VariableList<Gwei, <P as Preset>::ValidatorRegistryLimit>;
pub type RandaoMixes<P> = FixedVector<H256, <P as Preset>::EpochsPerHistoricalVector>;
pub type Slashings<P> = FixedVector<Gwei, <P as Preset>::EpochsPerSlashingsVector>;
pub type Attestations<P> = VariableList<PendingAttestation<P>, <P as Preset>::MaxPendingAttestations>;
pub type EpochParticipation<P> = VariableList<ParticipationFlags, <P as Preset>::ValidatorRegistryLimit>;
pub type InactivityScores<P> = VariableList<u64, <P as Preset>::ValidatorRegistryLimit>;
pub type HistoricalSummaries<P> = VariableList<HistoricalSummary, <P as Preset>::HistoricalRootsLimit>;
