//! Chip revision and emulation accuracy settings.

use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration errors, raised before the core runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unsupported Agnus revision: {0}")]
    UnsupportedRevision(String),
    #[error("invalid blitter accuracy level {0} (expected 0, 1 or 2)")]
    InvalidAccuracy(u8),
}

/// Agnus chip revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AgnusRevision {
    /// OCS Agnus, 512 KiB of chip RAM.
    Agnus8367,
    /// ECS Fat Agnus, 1 MiB of chip RAM.
    #[default]
    Agnus8372,
    /// ECS Fat Agnus, 2 MiB of chip RAM.
    Agnus8375,
}

/// Identification bits of the 8375 in VPOSR.
///
/// Uncertain: copied from the 8372 and not yet confirmed on real hardware.
pub const AGNUS_8375_ID_UNVERIFIED: u16 = 0x20;

impl AgnusRevision {
    /// Addressable chip RAM in KiB.
    #[must_use]
    pub const fn chip_ram_limit_kib(self) -> u32 {
        match self {
            Self::Agnus8367 => 512,
            Self::Agnus8372 => 1024,
            Self::Agnus8375 => 2048,
        }
    }

    /// Mask applied to every chip RAM DMA pointer.
    #[must_use]
    pub const fn chip_ptr_mask(self) -> u32 {
        (self.chip_ram_limit_kib() * 1024 - 1) & !1
    }

    /// Identification bits placed in VPOSR bits 14..8.
    #[must_use]
    pub const fn id_bits(self) -> u16 {
        match self {
            Self::Agnus8367 => 0x00,
            Self::Agnus8372 => 0x20,
            Self::Agnus8375 => AGNUS_8375_ID_UNVERIFIED,
        }
    }

    /// Writable bits of DDFSTRT and DDFSTOP (ECS adds H2).
    #[must_use]
    pub const fn ddf_mask(self) -> u16 {
        if self.is_ecs() { 0x00FE } else { 0x00FC }
    }

    /// Rasterline in which VERTB is strobed. ECS Agnus strobes one line earlier.
    #[must_use]
    pub const fn vbl_strobe_line(self) -> u16 {
        if self.is_ecs() { 0 } else { 1 }
    }

    #[must_use]
    pub const fn is_ecs(self) -> bool {
        !matches!(self, Self::Agnus8367)
    }
}

impl TryFrom<u16> for AgnusRevision {
    type Error = ConfigError;

    fn try_from(chip: u16) -> Result<Self, Self::Error> {
        match chip {
            8367 => Ok(Self::Agnus8367),
            8372 => Ok(Self::Agnus8372),
            8375 => Ok(Self::Agnus8375),
            other => Err(ConfigError::UnsupportedRevision(other.to_string())),
        }
    }
}

impl FromStr for AgnusRevision {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "8367" | "OCS" => Ok(Self::Agnus8367),
            "8372" | "ECS" => Ok(Self::Agnus8372),
            "8375" => Ok(Self::Agnus8375),
            _ => Err(ConfigError::UnsupportedRevision(s.to_string())),
        }
    }
}

/// How faithfully blits are emulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BlitterAccuracy {
    /// Moves the data in one chunk and finishes without using bus cycles.
    Fast,
    /// Moves the data in one chunk, then occupies the bus like the real blitter.
    Fake,
    /// Runs the micro-program word by word.
    #[default]
    Slow,
}

impl TryFrom<u8> for BlitterAccuracy {
    type Error = ConfigError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(Self::Fast),
            1 => Ok(Self::Fake),
            2 => Ok(Self::Slow),
            other => Err(ConfigError::InvalidAccuracy(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgnusConfig {
    pub revision: AgnusRevision,
    pub blitter_accuracy: BlitterAccuracy,
}

impl AgnusConfig {
    /// Builds a configuration from raw chip number and accuracy level.
    pub fn from_raw(chip: u16, accuracy: u8) -> Result<Self, ConfigError> {
        Ok(Self {
            revision: AgnusRevision::try_from(chip)?,
            blitter_accuracy: BlitterAccuracy::try_from(accuracy)?,
        })
    }
}
