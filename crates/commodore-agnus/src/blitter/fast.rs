//! Fast blitter: performs a whole blit in one call.
//!
//! Used on its own at the fast accuracy level, where a blit completes
//! without occupying any bus slots, and ahead of the timing-only
//! micro-program at the fake level.

use super::Blitter;
use super::line::{LineState, Octant};
use super::logic::{barrel_shift, fill, minterm};
use crate::host::ChipRam;

impl Blitter {
    pub(crate) fn fast_blit(&mut self, ram: &mut impl ChipRam, chip_mask: u32) {
        if self.line_mode() {
            self.fast_line(ram, chip_mask);
        } else {
            self.fast_copy(ram, chip_mask);
        }
    }

    fn fast_copy(&mut self, ram: &mut impl ChipRam, chip_mask: u32) {
        let (use_a, use_b, use_c, use_d) = (self.use_a(), self.use_b(), self.use_c(), self.use_d());
        let (ash, bsh, lf) = (self.ash(), self.bsh(), self.minterm());
        let (desc, fci, efe, do_fill) = (self.desc(), self.fci(), self.efe(), self.fill());
        let incr = self.incr();
        let next = |ptr: u32, delta: i32| ptr.wrapping_add_signed(delta) & chip_mask;

        // The barrel shifters carry bits from one row into the next
        self.aold = 0;
        self.bold = 0;

        for _ in 0..self.size_h {
            let mut carry = fci;

            for col in 0..self.size_w {
                if use_a {
                    self.anew = ram.read_chip_word(self.apt);
                    self.apt = next(self.apt, incr);
                }
                if use_b {
                    self.bnew = ram.read_chip_word(self.bpt);
                    self.bpt = next(self.bpt, incr);
                }
                if use_c {
                    self.chold = ram.read_chip_word(self.cpt);
                    self.cpt = next(self.cpt, incr);
                }

                let mut mask = 0xFFFF;
                if col == 0 {
                    mask &= self.afwm;
                }
                if col == self.size_w - 1 {
                    mask &= self.alwm;
                }
                let a = self.anew & mask;
                self.ahold = barrel_shift(a, self.aold, ash, desc);
                self.aold = a;
                self.bhold = barrel_shift(self.bnew, self.bold, bsh, desc);
                self.bold = self.bnew;

                // Without any channel the blitter computes nothing
                if self.channels() == 0 {
                    continue;
                }

                let mut result = minterm(self.ahold, self.bhold, self.chold, lf);
                if do_fill {
                    result = fill(result, &mut carry, efe);
                }
                if result != 0 {
                    self.bzero = false;
                }
                self.dhold = result;

                if use_d {
                    ram.write_chip_word(self.dpt, result);
                    self.dpt = next(self.dpt, incr);
                }
            }

            if use_a {
                self.apt = next(self.apt, self.row_mod(self.amod));
            }
            if use_b {
                self.bpt = next(self.bpt, self.row_mod(self.bmod));
            }
            if use_c {
                self.cpt = next(self.cpt, self.row_mod(self.cmod));
            }
            if use_d {
                self.dpt = next(self.dpt, self.row_mod(self.dmod));
            }
        }
    }

    fn fast_line(&mut self, ram: &mut impl ChipRam, chip_mask: u32) {
        let (sing, bsh, lf) = (self.sing(), self.bsh(), self.minterm());
        self.line = LineState::new(self.ash(), self.apt, self.bnew);

        for _ in 0..self.size_h {
            self.cnew = ram.read_chip_word(self.cpt);
            self.chold = self.cnew;
            self.ahold = self.line.a_value(sing);
            self.bhold = self.line.b_value(bsh);

            let result = minterm(self.ahold, self.bhold, self.chold, lf);
            if result != 0 {
                self.bzero = false;
            }
            self.dhold = result;
            ram.write_chip_word(self.dpt, result);

            self.advance_line(chip_mask);
        }
    }

    /// Moves C and D to the next pixel and publishes the line registers.
    pub(super) fn advance_line(&mut self, chip_mask: u32) {
        let octant = Octant::from_bltcon1(self.bltcon1);
        let offset = self.line.step(octant, self.amod, self.bmod, self.cmod);
        self.cpt = self.cpt.wrapping_add_signed(offset) & chip_mask;
        self.dpt = self.dpt.wrapping_add_signed(offset) & chip_mask;
        self.apt = u32::from(self.line.error as u16);
        self.bnew = self.line.texture;
    }
}
