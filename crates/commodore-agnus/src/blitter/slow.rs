//! Slow blitter: executes the micro-program one DMA cycle at a time.
//!
//! An instruction is executed in a fixed order: WRITE_D, the fetches, the
//! hold stages A to D, then REPEAT and DONE. Because the copy programs are
//! pipelined, the D word written in an iteration was computed in the one
//! before, and the first WRITE_D of a copy blit writes nothing.

use super::Blitter;
use super::line::LineState;
use super::logic::{barrel_shift, fill, minterm, minterm_per_bit};
use super::microcode::{
    BUS, DONE, FETCH_A, FETCH_B, FETCH_C, HOLD_A, HOLD_B, HOLD_C, HOLD_D, Microcode, REPEAT,
    WRITE_D,
};
use super::BlitterError;
use crate::agnus::Agnus;
use crate::beam::dma_cycles;
use crate::bus::BusOwner;
use crate::events::Slot;
use crate::host::Host;

fn has(instr: u16, op: u16) -> bool {
    instr & op == op
}

impl Blitter {
    /// Loads the micro-program for the blit described by the registers.
    pub(crate) fn prepare(&mut self, fake: bool) -> Result<(), BlitterError> {
        self.microcode = if self.line_mode() { Microcode::Line } else { Microcode::copy(self.channels())? };
        self.pc = 0;
        self.iteration = 0;
        self.fake = fake;
        self.primed = false;
        self.aold = 0;
        self.bold = 0;
        self.fill_carry = self.fci();
        self.y_counter = self.size_h;
        self.set_x_counter(self.row_width());
        if self.line_mode() {
            self.line = LineState::new(self.ash(), self.apt, self.bnew);
        }
        Ok(())
    }

    fn set_x_counter(&mut self, x: u16) {
        self.x_counter = x;
        self.mask = 0xFFFF;
        if x == self.row_width() {
            self.mask &= self.afwm;
        }
        if x == 1 {
            self.mask &= self.alwm;
        }
    }

    /// Source pointer after a fetch: the next word, plus the modulo after
    /// the last word of a row.
    fn next_source_ptr(&self, ptr: u32, modulo: i16, chip_mask: u32) -> u32 {
        let mut next = ptr.wrapping_add_signed(self.incr());
        if self.x_counter == 1 {
            next = next.wrapping_add_signed(self.row_mod(modulo));
        }
        next & chip_mask
    }

    /// The hold stages. None of them touches the bus.
    fn hold(&mut self, instr: u16) {
        let line = self.line_mode();
        let (sing, efe) = (self.sing(), self.efe());

        if has(instr, HOLD_A) {
            if line {
                self.ahold = self.line.a_value(sing);
            } else {
                let a = self.anew & self.mask;
                self.ahold = barrel_shift(a, self.aold, self.ash(), self.desc());
                self.aold = a;
            }
        }

        if has(instr, HOLD_B) {
            if line {
                self.bhold = self.line.b_value(self.bsh());
            } else {
                self.bhold = barrel_shift(self.bnew, self.bold, self.bsh(), self.desc());
                self.bold = self.bnew;
                self.hold_x = self.x_counter;
                self.primed = true;
            }
        }

        if has(instr, HOLD_C) {
            self.chold = self.cnew;
        }

        if has(instr, HOLD_D) && (line || self.primed) {
            let mut result = minterm(self.ahold, self.bhold, self.chold, self.minterm());
            debug_assert_eq!(result, minterm_per_bit(self.ahold, self.bhold, self.chold, self.minterm()));

            if self.fill() {
                // The carry restarts with the first word of every row
                if self.hold_x == self.row_width() {
                    self.fill_carry = self.fci();
                }
                result = fill(result, &mut self.fill_carry, efe);
            }
            if result != 0 {
                self.bzero = false;
            }
            self.dhold = result;
            self.d_x = self.hold_x;
        }
    }

    /// `true` if the instruction writes D. The first WRITE_D of a copy blit
    /// comes before any result and is skipped.
    fn writes_d(&self, instr: u16) -> bool {
        has(instr, WRITE_D) && (self.line_mode() || self.iteration > 0)
    }

    /// Advances the word counters. Clears BBUSY once the last word has
    /// entered the pipeline.
    fn repeat(&mut self, chip_mask: u32) {
        self.iteration += 1;
        if self.line_mode() && !self.fake {
            self.advance_line(chip_mask);
        }

        if self.y_counter > 1 || self.x_counter > 1 {
            self.pc = 0;
            if self.x_counter > 1 {
                self.set_x_counter(self.x_counter - 1);
            } else {
                self.set_x_counter(self.row_width());
                self.y_counter -= 1;
            }
        } else {
            self.bbusy = false;
        }
    }
}

impl Agnus {
    /// Executes one micro-instruction. Bus instructions wait for a free slot.
    pub(crate) fn execute_blitter_step(&mut self, host: &mut impl Host) {
        if !self.blt_dma() {
            self.kill_blit();
            return;
        }

        let instr = self.blitter.microcode.instruction(self.blitter.pc);
        if instr & BUS != 0 && !self.allocate_bus(BusOwner::Blitter) {
            self.reschedule_rel(Slot::Blt, dma_cycles(1));
            return;
        }
        self.blitter.pc += 1;

        if self.blitter.fake {
            if instr & BUS != 0 && (!has(instr, WRITE_D) || self.blitter.writes_d(instr)) {
                self.stats.record(BusOwner::Blitter);
            }
        } else {
            self.execute_bus_ops(instr, host);
            self.blitter.hold(instr);
        }

        if has(instr, REPEAT) {
            self.blitter.repeat(self.chip_mask());
        }
        if has(instr, DONE) {
            self.end_blit();
            return;
        }
        self.reschedule_rel(Slot::Blt, dma_cycles(1));
    }

    fn execute_bus_ops(&mut self, instr: u16, host: &mut impl Host) {
        let chip_mask = self.chip_mask();
        let line = self.blitter.line_mode();

        if self.blitter.writes_d(instr) {
            let (dpt, value) = (self.blitter.dpt, self.blitter.dhold);
            self.blitter_write(dpt, value, host);
            // Line mode moves D together with C
            if !line {
                let mut next = self.inc_chip_ptr(dpt, self.blitter.incr());
                if self.blitter.d_x == 1 {
                    next = self.inc_chip_ptr(next, self.blitter.row_mod(self.blitter.dmod));
                }
                self.blitter.dpt = next;
            }
        }

        if has(instr, FETCH_A) {
            let apt = self.blitter.apt;
            self.blitter.anew = self.blitter_read(apt, host);
            self.blitter.apt = self.blitter.next_source_ptr(apt, self.blitter.amod, chip_mask);
        }

        if has(instr, FETCH_B) {
            let bpt = self.blitter.bpt;
            self.blitter.bnew = self.blitter_read(bpt, host);
            self.blitter.bpt = self.blitter.next_source_ptr(bpt, self.blitter.bmod, chip_mask);
        }

        if has(instr, FETCH_C) {
            let cpt = self.blitter.cpt;
            let value = self.blitter_read(cpt, host);
            if line {
                self.blitter.cnew = value;
            } else {
                self.blitter.chold = value;
                self.blitter.cpt = self.blitter.next_source_ptr(cpt, self.blitter.cmod, chip_mask);
            }
        }
    }
}
