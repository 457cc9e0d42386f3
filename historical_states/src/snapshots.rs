//! Periodic full snapshots of the validator-indexed uint64 lists.
//!
//! Snapshots live on the filesystem rather than in the key-value store to
//! keep the large write bursts from fragmenting it. Each file is
//! `u64_le(decompressed length) || zstd(payload)` where the payload is the
//! raw little-endian list.

use core::{fmt, num::NonZeroU64};
use std::{
    io::{ErrorKind, Read as _, Write as _},
    path::{Path, PathBuf},
};

use anyhow::{bail, ensure, Result};

use crate::{base_encoding::read_zstd, error::Error, misc};
use types::phase0::primitives::Slot;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DumpSuffix {
    Balances,
    EffectiveBalances,
}

impl fmt::Display for DumpSuffix {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Balances => formatter.write_str("balances"),
            Self::EffectiveBalances => formatter.write_str("effective_balances"),
        }
    }
}

pub struct SnapshotStore {
    directory: PathBuf,
    slots_per_dump: NonZeroU64,
}

impl SnapshotStore {
    pub fn new(directory: impl Into<PathBuf>, slots_per_dump: NonZeroU64) -> Self {
        Self {
            directory: directory.into(),
            slots_per_dump,
        }
    }

    #[must_use]
    pub fn dump_slot(&self, slot: Slot) -> Slot {
        misc::round_slot_to_dump(slot, self.slots_per_dump.get())
    }

    /// Loads the snapshot covering `slot`, i.e. the one at the nearest dump
    /// boundary at or below it.
    pub fn load_dump(&self, slot: Slot, suffix: DumpSuffix) -> Result<Vec<u8>> {
        let path = self.dump_path(slot, suffix);

        let mut file = match fs_err::File::open(&path) {
            Ok(file) => file,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                bail!(Error::SnapshotMissing { path })
            }
            Err(error) => return Err(error.into()),
        };

        let corrupt = || Error::CorruptSnapshot { path: path.clone() };

        let mut length_bytes = [0; size_of::<u64>()];
        file.read_exact(&mut length_bytes).map_err(|_| corrupt())?;

        let length = usize::try_from(u64::from_le_bytes(length_bytes))?;
        let mut payload = vec![0; length];

        let mut decoder = zstd::Decoder::new(file).map_err(|_| corrupt())?;
        let filled = read_zstd(&mut decoder, &mut payload).map_err(|_| corrupt())?;

        ensure!(filled == length, corrupt());

        Ok(payload)
    }

    /// Writes a snapshot at the dump boundary covering `slot`. This is the
    /// ingestion half of the format; the reader only needs it in tests.
    pub fn store_dump(&self, slot: Slot, suffix: DumpSuffix, payload: &[u8]) -> Result<()> {
        fs_err::create_dir_all(&self.directory)?;

        let file = fs_err::File::create(self.dump_path(slot, suffix))?;

        let length = u64::try_from(payload.len())?;
        let mut encoder = zstd::Encoder::new(file, 0)?;

        encoder.get_mut().write_all(&length.to_le_bytes())?;
        encoder.write_all(payload)?;
        encoder.finish()?;

        Ok(())
    }

    fn dump_path(&self, slot: Slot, suffix: DumpSuffix) -> PathBuf {
        let dump_slot = self.dump_slot(slot);
        self.directory.join(format!("{dump_slot}.{suffix}"))
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}
