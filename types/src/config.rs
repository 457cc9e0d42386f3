use core::num::NonZeroU64;
use std::borrow::Cow;

use hex_literal::hex;
use nonzero_ext::nonzero;
use serde::{Deserialize, Serialize};

use crate::{
    nonstandard::Phase,
    phase0::{
        consts::FAR_FUTURE_EPOCH,
        primitives::{Epoch, Slot, Version},
    },
    preset::Preset,
};

/// Configuration variables customizable at runtime.
///
/// The `*_fork_epoch` fields have type `Epoch` for compatibility with
/// standard configurations; `FAR_FUTURE_EPOCH` means the fork is not
/// scheduled.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Config {
    // Meta
    pub config_name: Cow<'static, str>,

    // Genesis
    pub genesis_fork_version: Version,

    // Forking
    #[serde(with = "crate::config::serde_string_or_native")]
    pub altair_fork_epoch: Epoch,
    pub altair_fork_version: Version,
    #[serde(with = "crate::config::serde_string_or_native")]
    pub bellatrix_fork_epoch: Epoch,
    pub bellatrix_fork_version: Version,
    #[serde(with = "crate::config::serde_string_or_native")]
    pub capella_fork_epoch: Epoch,
    pub capella_fork_version: Version,

    // Archival
    //
    // Full snapshots of the validator-indexed lists are written every
    // `slots_per_dump` slots; everything in between is differential.
    #[serde(with = "crate::config::serde_string_or_native")]
    pub slots_per_dump: NonZeroU64,
}

impl Default for Config {
    fn default() -> Self {
        Self::mainnet()
    }
}

impl Config {
    #[must_use]
    pub const fn mainnet() -> Self {
        Self {
            config_name: Cow::Borrowed("mainnet"),
            genesis_fork_version: Version::new(hex!("00000000")),
            altair_fork_epoch: 74_240,
            altair_fork_version: Version::new(hex!("01000000")),
            bellatrix_fork_epoch: 144_896,
            bellatrix_fork_version: Version::new(hex!("02000000")),
            capella_fork_epoch: 194_048,
            capella_fork_version: Version::new(hex!("03000000")),
            slots_per_dump: nonzero!(2048_u64),
        }
    }

    #[must_use]
    pub const fn minimal() -> Self {
        Self {
            config_name: Cow::Borrowed("minimal"),
            genesis_fork_version: Version::new(hex!("00000001")),
            altair_fork_epoch: FAR_FUTURE_EPOCH,
            altair_fork_version: Version::new(hex!("01000001")),
            bellatrix_fork_epoch: FAR_FUTURE_EPOCH,
            bellatrix_fork_version: Version::new(hex!("02000001")),
            capella_fork_epoch: FAR_FUTURE_EPOCH,
            capella_fork_version: Version::new(hex!("03000001")),
            slots_per_dump: nonzero!(256_u64),
        }
    }

    #[must_use]
    pub fn phase_at_epoch(&self, epoch: Epoch) -> Phase {
        if epoch >= self.capella_fork_epoch {
            Phase::Capella
        } else if epoch >= self.bellatrix_fork_epoch {
            Phase::Bellatrix
        } else if epoch >= self.altair_fork_epoch {
            Phase::Altair
        } else {
            Phase::Phase0
        }
    }

    #[must_use]
    pub fn phase_at_slot<P: Preset>(&self, slot: Slot) -> Phase {
        self.phase_at_epoch(slot / P::SLOTS_PER_EPOCH)
    }

    #[must_use]
    pub const fn version_at_phase(&self, phase: Phase) -> Version {
        match phase {
            Phase::Phase0 => self.genesis_fork_version,
            Phase::Altair => self.altair_fork_version,
            Phase::Bellatrix => self.bellatrix_fork_version,
            Phase::Capella => self.capella_fork_version,
        }
    }

    #[must_use]
    pub const fn fork_epoch(&self, phase: Phase) -> Epoch {
        match phase {
            Phase::Phase0 => 0,
            Phase::Altair => self.altair_fork_epoch,
            Phase::Bellatrix => self.bellatrix_fork_epoch,
            Phase::Capella => self.capella_fork_epoch,
        }
    }
}

// Standard configuration files represent integers as strings.
pub(crate) mod serde_string_or_native {
    use core::{fmt::Display, str::FromStr};

    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<T: Display, S: Serializer>(
        value: &T,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StringOrNative<'s> {
            String(&'s str),
            Native(u64),
        }

        match StringOrNative::deserialize(deserializer)? {
            StringOrNative::String(string) => string.parse().map_err(D::Error::custom),
            StringOrNative::Native(native) => native
                .to_string()
                .parse()
                .map_err(|error| D::Error::custom(format!("{error}"))),
        }
    }
}
