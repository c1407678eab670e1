//! Blitter - area copies, fills and line drawing.
//!
//! The blitter state lives here; the engines that move data are split by
//! accuracy. The fast engine performs a blit in one call. The slow engine
//! runs a micro-program one DMA cycle at a time from the `Blt` slot, so
//! every fetch and write competes for the bus like on the real chip.

mod fast;
pub mod line;
pub mod logic;
pub mod microcode;
mod slow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::agnus::Agnus;
use crate::beam::dma_cycles;
use crate::config::BlitterAccuracy;
use crate::events::{EventId, Slot};
use crate::host::Host;
use crate::regs::INT_BLIT;

use line::LineState;
use microcode::Microcode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BlitterError {
    #[error("no micro-program for channel mask {0:#X}")]
    UnsupportedChannels(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Blitter {
    accuracy: BlitterAccuracy,

    // Registers
    pub bltcon0: u16,
    pub bltcon1: u16,
    pub apt: u32,
    pub bpt: u32,
    pub cpt: u32,
    pub dpt: u32,
    pub afwm: u16,
    pub alwm: u16,
    pub amod: i16,
    pub bmod: i16,
    pub cmod: i16,
    pub dmod: i16,
    /// Width in words.
    pub size_w: u16,
    /// Height in rows (pixels in line mode).
    pub size_h: u16,

    // Data path
    pub anew: u16,
    pub bnew: u16,
    pub aold: u16,
    pub bold: u16,
    pub ahold: u16,
    pub bhold: u16,
    pub chold: u16,
    /// C word fetched in line mode, moved to `chold` by HOLD_C.
    pub cnew: u16,
    pub dhold: u16,

    // Micro-program execution
    microcode: Microcode,
    pc: usize,
    iteration: u32,
    x_counter: u16,
    y_counter: u16,
    /// Mask applied to the A word of the current column.
    mask: u16,
    fill_carry: bool,
    /// The hold stage has seen a word. Pipelined programs compute D before
    /// the first word has arrived.
    primed: bool,
    /// Column of the word in the B holding register.
    hold_x: u16,
    /// Column of the word in the D holding register.
    d_x: u16,
    /// Replays bus timing only. The fast engine has already moved the data.
    fake: bool,
    line: LineState,

    pub running: bool,
    /// BBUSY in DMACONR.
    pub bbusy: bool,
    /// BZERO in DMACONR: every D word of the last blit was zero.
    pub bzero: bool,

    /// Blits started since the last VSYNC.
    pub copy_count: u32,
    pub line_count: u32,
}

impl Blitter {
    #[must_use]
    pub fn new(accuracy: BlitterAccuracy) -> Self {
        Self {
            accuracy,
            bltcon0: 0,
            bltcon1: 0,
            apt: 0,
            bpt: 0,
            cpt: 0,
            dpt: 0,
            afwm: 0xFFFF,
            alwm: 0xFFFF,
            amod: 0,
            bmod: 0,
            cmod: 0,
            dmod: 0,
            size_w: 64,
            size_h: 1024,
            anew: 0,
            bnew: 0,
            aold: 0,
            bold: 0,
            ahold: 0,
            bhold: 0,
            chold: 0,
            cnew: 0,
            dhold: 0,
            microcode: Microcode::default(),
            pc: 0,
            iteration: 0,
            x_counter: 0,
            y_counter: 0,
            mask: 0xFFFF,
            fill_carry: false,
            primed: false,
            hold_x: 0,
            d_x: 0,
            fake: false,
            line: LineState::default(),
            running: false,
            bbusy: false,
            bzero: false,
            copy_count: 0,
            line_count: 0,
        }
    }

    #[must_use]
    pub fn accuracy(&self) -> BlitterAccuracy {
        self.accuracy
    }

    //
    // Register writes
    //

    pub fn write_bltcon0(&mut self, value: u16) {
        self.bltcon0 = value;
    }

    /// ECS: replaces the minterm byte only.
    pub fn write_bltcon0l(&mut self, value: u16) {
        self.bltcon0 = (self.bltcon0 & 0xFF00) | (value & 0x00FF);
    }

    pub fn write_bltcon1(&mut self, value: u16) {
        self.bltcon1 = value;
    }

    /// OCS size register: 10 bits of height, 6 bits of width, 0 = maximum.
    pub fn write_bltsize(&mut self, value: u16) {
        self.size_h = match value >> 6 {
            0 => 1024,
            h => h,
        };
        self.size_w = match value & 0x3F {
            0 => 64,
            w => w,
        };
    }

    /// ECS: 15 bits of height.
    pub fn write_bltsizv(&mut self, value: u16) {
        self.size_h = match value & 0x7FFF {
            0 => 0x8000,
            h => h,
        };
    }

    /// ECS: 11 bits of width. Writing it starts the blit.
    pub fn write_bltsizh(&mut self, value: u16) {
        self.size_w = match value & 0x07FF {
            0 => 0x0800,
            w => w,
        };
    }

    //
    // BLTCON decoding
    //

    #[must_use]
    pub fn ash(&self) -> u16 {
        self.bltcon0 >> 12
    }

    #[must_use]
    pub fn bsh(&self) -> u16 {
        self.bltcon1 >> 12
    }

    /// Channel enable bits: A = 8, B = 4, C = 2, D = 1.
    #[must_use]
    pub fn channels(&self) -> u16 {
        (self.bltcon0 >> 8) & 0xF
    }

    #[must_use]
    pub fn use_a(&self) -> bool {
        self.bltcon0 & 0x0800 != 0
    }

    #[must_use]
    pub fn use_b(&self) -> bool {
        self.bltcon0 & 0x0400 != 0
    }

    #[must_use]
    pub fn use_c(&self) -> bool {
        self.bltcon0 & 0x0200 != 0
    }

    #[must_use]
    pub fn use_d(&self) -> bool {
        self.bltcon0 & 0x0100 != 0
    }

    #[must_use]
    pub fn minterm(&self) -> u8 {
        self.bltcon0 as u8
    }

    #[must_use]
    pub fn line_mode(&self) -> bool {
        self.bltcon1 & 0x0001 != 0
    }

    /// Descending mode. The bit means SING in line mode.
    #[must_use]
    pub fn desc(&self) -> bool {
        !self.line_mode() && self.bltcon1 & 0x0002 != 0
    }

    #[must_use]
    pub fn sing(&self) -> bool {
        self.line_mode() && self.bltcon1 & 0x0002 != 0
    }

    #[must_use]
    pub fn fci(&self) -> bool {
        self.bltcon1 & 0x0004 != 0
    }

    #[must_use]
    pub fn ife(&self) -> bool {
        self.bltcon1 & 0x0008 != 0
    }

    #[must_use]
    pub fn efe(&self) -> bool {
        self.bltcon1 & 0x0010 != 0
    }

    /// Area fill. IFE and EFE share their bits with the octant in line mode.
    #[must_use]
    pub fn fill(&self) -> bool {
        !self.line_mode() && (self.ife() || self.efe())
    }

    /// Pointer increment per word.
    #[must_use]
    pub fn incr(&self) -> i32 {
        if self.desc() { -2 } else { 2 }
    }

    /// A modulo as applied at the end of a row (negated in descending mode).
    fn row_mod(&self, modulo: i16) -> i32 {
        if self.desc() { -i32::from(modulo) } else { i32::from(modulo) }
    }

    /// Words per row as counted by the micro-program.
    fn row_width(&self) -> u16 {
        if self.line_mode() { 1 } else { self.size_w }
    }

    #[must_use]
    pub fn microcode(&self) -> Microcode {
        self.microcode
    }

    /// Program counter and iteration of the running micro-program.
    #[must_use]
    pub fn progress(&self) -> (usize, u32) {
        (self.pc, self.iteration)
    }
}

impl Default for Blitter {
    fn default() -> Self {
        Self::new(BlitterAccuracy::default())
    }
}

impl Agnus {
    /// BLTSIZE (or BLTSIZH) has been written.
    pub(crate) fn start_blit(&mut self) {
        if self.blitter.running {
            log::warn!("Blit restarted while running at {}", self.pos);
        }
        log::debug!(
            "Blit {}x{} BLTCON0={:04X} BLTCON1={:04X} at {}",
            self.blitter.size_w,
            self.blitter.size_h,
            self.blitter.bltcon0,
            self.blitter.bltcon1,
            self.pos
        );
        self.blitter.running = true;
        self.blitter.bbusy = true;
        self.blitter.bzero = true;
        self.schedule_rel(Slot::Blt, dma_cycles(1), EventId::BltStart);
    }

    /// Terminates the running blit without an interrupt.
    pub fn kill_blit(&mut self) {
        if self.blitter.running {
            log::debug!("Blit aborted at {}", self.pos);
        }
        self.blitter.running = false;
        self.blitter.bbusy = false;
        self.scheduler.cancel(Slot::Blt);
    }

    fn end_blit(&mut self) {
        log::trace!("Blit done at {}", self.pos);
        self.blitter.running = false;
        self.blitter.bbusy = false;
        self.scheduler.cancel(Slot::Blt);
        self.schedule_irq(INT_BLIT, 0);
    }

    pub(crate) fn service_blt_event(&mut self, host: &mut impl Host) {
        match self.scheduler.id(Slot::Blt) {
            EventId::BltStart => self.begin_blit(host),
            EventId::BltExecute => self.execute_blitter_step(host),
            id => debug_assert!(false, "unexpected BLT event {id:?}"),
        }
    }

    fn begin_blit(&mut self, host: &mut impl Host) {
        // Resumed by DMACON once blitter DMA is switched on
        if !self.blt_dma() {
            self.scheduler.disarm(Slot::Blt);
            return;
        }

        if self.blitter.line_mode() {
            self.blitter.line_count += 1;
        } else {
            self.blitter.copy_count += 1;
        }

        let chip_mask = self.chip_mask();
        match self.blitter.accuracy {
            BlitterAccuracy::Fast => {
                self.blitter.fast_blit(host, chip_mask);
                self.end_blit();
            }
            BlitterAccuracy::Fake => {
                self.blitter.fast_blit(host, chip_mask);
                self.begin_micro_program(true);
            }
            BlitterAccuracy::Slow => self.begin_micro_program(false),
        }
    }

    fn begin_micro_program(&mut self, fake: bool) {
        match self.blitter.prepare(fake) {
            Ok(()) => self.schedule_rel(Slot::Blt, dma_cycles(1), EventId::BltExecute),
            Err(err) => {
                log::error!("{err}");
                self.kill_blit();
            }
        }
    }

    /// Logs and resets the per-frame blit counters.
    pub(crate) fn blitter_vsync(&mut self) {
        if self.blitter.copy_count + self.blitter.line_count > 0 {
            log::trace!(
                "{} copy blits, {} line blits in frame {}",
                self.blitter.copy_count,
                self.blitter.line_count,
                self.frame.nr
            );
        }
        self.blitter.copy_count = 0;
        self.blitter.line_count = 0;
    }
}
