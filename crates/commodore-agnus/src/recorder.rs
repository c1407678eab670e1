//! Delayed register writes.
//!
//! Some Agnus registers only become visible a few DMA cycles after the write
//! reached the chip. A write to one of them is recorded here with its target
//! cycle, and the `Reg` slot applies it once the clock gets there.

use std::collections::VecDeque;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::beam::Cycle;

/// Registers whose writes pass through the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChipReg {
    Dmacon,
    Diwstrt,
    Diwstop,
    Ddfstrt,
    Ddfstop,
    /// High word of a bitplane pointer (0-based plane).
    BplPtHi(u8),
    /// Low word of a bitplane pointer (0-based plane).
    BplPtLo(u8),
    Bpl1Mod,
    Bpl2Mod,
    Bplcon0,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegChange {
    pub cycle: Cycle,
    pub reg: ChipReg,
    pub value: u16,
}

/// Pending changes ordered by target cycle. Changes due at the same cycle
/// keep their submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChangeRecorder {
    queue: VecDeque<RegChange>,
}

impl ChangeRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, cycle: Cycle, reg: ChipReg, value: u16) {
        let at = self.queue.partition_point(|c| c.cycle <= cycle);
        self.queue.insert(at, RegChange { cycle, reg, value });
    }

    /// Target cycle of the earliest pending change.
    #[must_use]
    pub fn next_cycle(&self) -> Option<Cycle> {
        self.queue.front().map(|c| c.cycle)
    }

    /// Removes and returns the earliest change if it is due at `clock`.
    pub fn pop_due(&mut self, clock: Cycle) -> Option<RegChange> {
        if self.queue.front().is_some_and(|c| c.cycle <= clock) {
            self.queue.pop_front()
        } else {
            None
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_come_out_in_cycle_order() {
        let mut rec = ChangeRecorder::new();
        rec.add(16, ChipReg::Ddfstop, 0xD0);
        rec.add(8, ChipReg::Ddfstrt, 0x38);
        assert_eq!(rec.next_cycle(), Some(8));

        assert_eq!(rec.pop_due(7), None);
        assert_eq!(rec.pop_due(8).map(|c| c.reg), Some(ChipReg::Ddfstrt));
        assert_eq!(rec.pop_due(15), None);
        assert_eq!(rec.pop_due(20).map(|c| c.reg), Some(ChipReg::Ddfstop));
        assert!(rec.is_empty());
    }

    #[test]
    fn same_cycle_changes_keep_submission_order() {
        let mut rec = ChangeRecorder::new();
        rec.add(8, ChipReg::BplPtHi(0), 1);
        rec.add(12, ChipReg::Bplcon0, 0x1200);
        rec.add(8, ChipReg::BplPtLo(0), 2);
        rec.add(8, ChipReg::Bpl1Mod, 3);

        let order: Vec<u16> = std::iter::from_fn(|| rec.pop_due(8)).map(|c| c.value).collect();
        assert_eq!(order, [1, 2, 3]);
        assert_eq!(rec.len(), 1);
    }
}
