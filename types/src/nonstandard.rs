use strum::{AsRefStr, Display, EnumString, FromRepr};

/// Protocol revision a state belongs to.
///
/// Determines which fields exist on the reconstructed state. Later phases
/// are strict supersets of earlier ones as far as this archive is concerned.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    AsRefStr,
    Display,
    EnumString,
    FromRepr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[repr(u8)]
pub enum Phase {
    Phase0 = 0,
    Altair = 1,
    Bellatrix = 2,
    Capella = 3,
}

/// Distinguishes the two epochs attestations may target relative to a state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AttestationEpoch {
    Previous,
    Current,
}
