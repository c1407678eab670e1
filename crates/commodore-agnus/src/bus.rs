//! Per-line bus ownership table and usage statistics.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::beam::SLOTS;

/// Client holding the chip bus in one DMA cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BusOwner {
    #[default]
    None,
    Cpu,
    Refresh,
    Disk,
    Audio,
    Sprite,
    Bitplane,
    Copper,
    Blitter,
}

pub const BUS_OWNER_COUNT: usize = 9;

impl BusOwner {
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Who owned each slot of the current line and what went over the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BusTable {
    #[cfg_attr(feature = "serde", serde(with = "serde_with::As::<[serde_with::Same; SLOTS]>"))]
    owner: [BusOwner; SLOTS],
    #[cfg_attr(feature = "serde", serde(with = "serde_with::As::<[serde_with::Same; SLOTS]>"))]
    value: [u16; SLOTS],
}

impl BusTable {
    #[must_use]
    pub fn new() -> Self {
        Self { owner: [BusOwner::None; SLOTS], value: [0; SLOTS] }
    }

    #[must_use]
    pub fn owner(&self, hpos: usize) -> BusOwner {
        self.owner[hpos]
    }

    #[must_use]
    pub fn value(&self, hpos: usize) -> u16 {
        self.value[hpos]
    }

    #[must_use]
    pub fn is_free(&self, hpos: usize) -> bool {
        self.owner[hpos] == BusOwner::None
    }

    /// Stamps a slot with its owner and the transferred word.
    pub fn stamp(&mut self, hpos: usize, owner: BusOwner, value: u16) {
        self.owner[hpos] = owner;
        self.value[hpos] = value;
    }

    /// Claims a slot without a transfer.
    pub fn claim(&mut self, hpos: usize, owner: BusOwner) {
        self.owner[hpos] = owner;
    }

    /// Releases every slot. Called at each line start.
    pub fn clear(&mut self) {
        self.owner = [BusOwner::None; SLOTS];
    }
}

impl Default for BusTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Bus cycles granted per owner since the last clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BusStats {
    pub count: [u64; BUS_OWNER_COUNT],
}

impl BusStats {
    pub fn record(&mut self, owner: BusOwner) {
        self.count[owner.index()] += 1;
    }

    #[must_use]
    pub fn get(&self, owner: BusOwner) -> u64 {
        self.count[owner.index()]
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
