//! Copper - Coprocessor for synchronized register updates.
//!
//! The copper runs entirely from the `Cop` slot. Every instruction takes two
//! fetches, and each fetch needs a free even bus slot. A WAIT does not poll
//! the beam: the slot is rescheduled directly at the first position that
//! satisfies the comparison.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::agnus::Agnus;
use crate::beam::{Cycle, HPOS_MAX, dma_cycles};
use crate::events::{EventId, Slot};
use crate::host::Host;
use crate::regs::PokeSource;

/// Registers below this offset are never written by the copper.
const COPPER_FLOOR: u16 = 0x40;
/// Registers below this offset need the danger bit.
const COPPER_DANGER_FLOOR: u16 = 0x80;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Copper {
    pub cop1lc: u32,
    pub cop2lc: u32,
    pub pc: u32,
    pub ir1: u16,
    pub ir2: u16,
    /// COPCON bit 1.
    pub danger: bool,
    /// Set by an illegal MOVE, cleared by the next jump.
    pub halted: bool,
}

impl Copper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_copcon(&mut self, value: u16) {
        self.danger = value & 0b10 != 0;
    }

    /// `true` if a MOVE to `reg` is allowed.
    #[must_use]
    pub fn may_write(&self, reg: u16) -> bool {
        reg >= COPPER_DANGER_FLOOR || (self.danger && reg >= COPPER_FLOOR)
    }

    /// `true` if the current instruction is a SKIP rather than a WAIT.
    #[must_use]
    pub fn is_skip(&self) -> bool {
        self.ir2 & 1 != 0
    }

    /// Blitter finish disable: if clear, a WAIT also waits for the blitter.
    #[must_use]
    pub fn bfd(&self) -> bool {
        self.ir2 & 0x8000 != 0
    }

    /// Compares the beam against the position of the current WAIT or SKIP.
    /// `hpos` is in DMA cycles; bit 0 is not compared.
    #[must_use]
    pub fn check_wait(&self, vpos: u16, hpos: u16) -> bool {
        // End-of-list marker ($FFFF,$FFFE): never resolves.
        if self.ir1 == 0xFFFF && self.ir2 == 0xFFFE {
            return false;
        }

        let wait_v = (self.ir1 >> 8) & 0xFF;
        let wait_h = (self.ir1 >> 1) & 0x7F;
        // V7 has no mask bit and is always compared
        let mask_v = ((self.ir2 >> 8) & 0x7F) | 0x80;
        let mask_h = (self.ir2 >> 1) & 0x7F;

        let cur_v = vpos & 0xFF;
        let cur_h = (hpos >> 1) & 0x7F;

        let cmp_cur = ((cur_v & mask_v) << 7) | (cur_h & mask_h);
        let cmp_wait = ((wait_v & mask_v) << 7) | (wait_h & mask_h);
        cmp_cur >= cmp_wait
    }
}

impl Agnus {
    /// Resumes the copper after copper DMA has been switched on.
    pub(crate) fn arm_copper(&mut self) {
        if self.copper.halted {
            return;
        }
        // Copper fetches happen in even cycles
        let delta = if self.pos.h % 2 == 0 { 2 } else { 1 };
        let next = self.clock + dma_cycles(delta);
        if !self.scheduler.has_event(Slot::Cop) {
            self.scheduler.schedule_abs(Slot::Cop, next, EventId::CopFetch);
        } else if !self.scheduler.is_pending(Slot::Cop) {
            self.scheduler.reschedule_abs(Slot::Cop, next);
        }
    }

    /// Restarts the copper from COP1LC at the beginning of a frame.
    pub(crate) fn copper_vsync(&mut self) {
        self.schedule_rel(Slot::Cop, dma_cycles(1), EventId::CopJmp1);
    }

    pub(crate) fn service_cop_event(&mut self, host: &mut impl Host) {
        match self.scheduler.id(Slot::Cop) {
            EventId::CopJmp1 => self.copper_jump(self.copper.cop1lc),
            EventId::CopJmp2 => self.copper_jump(self.copper.cop2lc),
            EventId::CopFetch => self.copper_fetch(host),
            EventId::CopMove => self.copper_move(host),
            EventId::CopWaitOrSkip => self.copper_wait_or_skip(host),
            EventId::CopWait => self.copper_wake_up(),
            id => debug_assert!(false, "unexpected COP event {id:?}"),
        }
    }

    fn copper_jump(&mut self, location: u32) {
        log::trace!("Copper jumps to {location:06X} at {}", self.pos);
        self.copper.pc = location;
        self.copper.halted = false;
        self.schedule_rel(Slot::Cop, dma_cycles(2), EventId::CopFetch);
    }

    /// Checks for a usable bus slot. On failure the event stays in the slot:
    /// it is retried next cycle, or disarmed while copper DMA is off.
    fn copper_bus_ready(&mut self) -> bool {
        if self.copper_can_do_dma() {
            return true;
        }
        if self.cop_dma() {
            self.reschedule_rel(Slot::Cop, dma_cycles(1));
        } else {
            self.scheduler.disarm(Slot::Cop);
        }
        false
    }

    fn copper_next_word(&mut self, host: &mut impl Host) -> u16 {
        let value = self.copper_read(self.copper.pc, host);
        self.copper.pc = self.inc_chip_ptr(self.copper.pc, 2);
        value
    }

    fn copper_fetch(&mut self, host: &mut impl Host) {
        if !self.copper_bus_ready() {
            return;
        }
        self.copper.ir1 = self.copper_next_word(host);
        let next = if self.copper.ir1 & 1 == 0 { EventId::CopMove } else { EventId::CopWaitOrSkip };
        self.schedule_rel(Slot::Cop, dma_cycles(2), next);
    }

    fn copper_move(&mut self, host: &mut impl Host) {
        if !self.copper_bus_ready() {
            return;
        }
        self.copper.ir2 = self.copper_next_word(host);
        let reg = self.copper.ir1 & 0x1FE;
        let value = self.copper.ir2;

        if !self.copper.may_write(reg) {
            log::debug!("Copper halted by MOVE to {reg:03X} at {}", self.pos);
            self.copper.halted = true;
            self.scheduler.cancel(Slot::Cop);
            return;
        }

        // Scheduled first so that a write to COPJMPx can replace it
        self.schedule_rel(Slot::Cop, dma_cycles(2), EventId::CopFetch);
        if !self.poke(reg, value, PokeSource::Copper) {
            host.poke_custom(reg, value);
        }
    }

    fn copper_wait_or_skip(&mut self, host: &mut impl Host) {
        if !self.copper_bus_ready() {
            return;
        }
        self.copper.ir2 = self.copper_next_word(host);

        if self.copper.is_skip() {
            if self.copper.check_wait(self.pos.v, self.pos.h) {
                self.copper.pc = self.inc_chip_ptr(self.copper.pc, 4);
            }
            self.schedule_rel(Slot::Cop, dma_cycles(2), EventId::CopFetch);
            return;
        }

        match self.copper_wake_up_cycle() {
            Some(cycle) => self.scheduler.schedule_abs(Slot::Cop, cycle, EventId::CopWait),
            None => {
                log::trace!("Copper waits for the next frame at {}", self.pos);
                self.scheduler.cancel(Slot::Cop);
            }
        }
    }

    /// First cycle of the current frame at which the pending WAIT resolves.
    fn copper_wake_up_cycle(&self) -> Option<Cycle> {
        let mut beam = self.pos.advanced(2);
        // Comparisons ignore bit 0 of the horizontal position
        beam.h &= !1;

        while beam.v < self.frame.num_lines {
            if self.copper.check_wait(beam.v, beam.h) {
                return Some(self.beam_to_cycle(beam));
            }
            beam.h += 2;
            if beam.h > HPOS_MAX {
                beam.h = 0;
                beam.v += 1;
            }
        }
        None
    }

    fn copper_wake_up(&mut self) {
        if !self.copper.bfd() && self.blitter.bbusy {
            self.reschedule_rel(Slot::Cop, dma_cycles(1));
            return;
        }
        self.schedule_rel(Slot::Cop, dma_cycles(2), EventId::CopFetch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn copper(ir1: u16, ir2: u16) -> Copper {
        Copper { ir1, ir2, ..Copper::default() }
    }

    #[test]
    fn wait_compares_masked_position() {
        // WAIT for line $40, h $20 (in DMA cycles), full masks
        let cop = copper(0x4021, 0xFFFE);
        assert!(!cop.check_wait(0x3F, 0xE2));
        assert!(!cop.check_wait(0x40, 0x1E));
        assert!(cop.check_wait(0x40, 0x20));
        assert!(cop.check_wait(0x41, 0x00));
    }

    #[test]
    fn horizontal_mask_ignores_masked_bits() {
        // Only compare the vertical position
        let cop = copper(0x40FF, 0xFF00);
        assert!(cop.check_wait(0x40, 0x00));
    }

    #[test]
    fn v7_is_always_compared() {
        // WAIT for line $F4 with V6..V0 masked out entirely
        let cop = copper(0xF401, 0x8000);
        assert!(!cop.check_wait(0x74, 0x00));
        assert!(cop.check_wait(0x80, 0x00));
    }

    #[test]
    fn end_of_list_never_resolves() {
        let cop = copper(0xFFFF, 0xFFFE);
        assert!(!cop.check_wait(0xFF, HPOS_MAX));
    }

    #[test]
    fn danger_bit_opens_the_blitter_registers() {
        let mut cop = Copper::new();
        assert!(!cop.may_write(0x040));
        assert!(cop.may_write(0x080));
        cop.write_copcon(0x0002);
        assert!(cop.may_write(0x040));
        assert!(!cop.may_write(0x03E));
    }
}
