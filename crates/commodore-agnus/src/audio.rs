//! Audio DMA state machines, one per channel.
//!
//! A channel is driven lazily: it remembers the clock it was last brought up
//! to and catches up whenever Agnus reaches one of its DAS slots or the end
//! of a line. Memory, pointers and interrupts are reached through
//! [`AudioDma`], so the channel never touches Agnus directly.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::beam::{Cycle, as_dma_cycles, dma_cycles};

/// Services a channel needs from the DMA controller.
pub trait AudioDma {
    /// Fetches the next sample word and advances the channel's pointer.
    fn fetch(&mut self, channel: usize) -> u16;
    /// Reloads the channel's pointer from its location latch.
    fn reload(&mut self, channel: usize, location: u32);
    fn interrupt(&mut self, channel: usize);
    fn sample(&mut self, channel: usize, sample: i16);
}

/// States of the channel sequencer (binary codes as in the hardware docs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AudioState {
    /// 000: idle, waiting for DMA.
    #[default]
    Idle,
    /// 001: length loaded, first interrupt pending.
    Start,
    /// 101: first word fetch.
    Fetch,
    /// 010: period countdown before the high byte is output.
    High,
    /// 011: period countdown before the low byte is output.
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AudioChannel {
    nr: u8,
    pub state: AudioState,
    /// Clock the channel has been brought up to.
    pub clock: Cycle,
    dma: bool,

    /// AUDxLC
    pub lc_latch: u32,
    pub len_latch: u16,
    len_internal: u16,
    pub per_latch: u16,
    per_internal: i64,
    pub vol_latch: u16,
    vol_internal: u16,
    pub dat_latch: u16,
    dat_internal: u16,
}

impl AudioChannel {
    #[must_use]
    pub fn new(nr: u8) -> Self {
        debug_assert!(nr < 4);
        Self {
            nr,
            state: AudioState::Idle,
            clock: 0,
            dma: false,
            lc_latch: 0,
            len_latch: 0,
            len_internal: 0,
            per_latch: 0,
            per_internal: 0,
            vol_latch: 0,
            vol_internal: 0,
            dat_latch: 0,
            dat_internal: 0,
        }
    }

    #[must_use]
    pub fn nr(&self) -> usize {
        usize::from(self.nr)
    }

    #[must_use]
    pub fn dma_enabled(&self) -> bool {
        self.dma
    }

    pub fn enable_dma(&mut self) {
        self.dma = true;
    }

    pub fn disable_dma(&mut self) {
        self.dma = false;
        self.state = AudioState::Idle;
    }

    pub fn write_lch(&mut self, value: u16, chip_mask: u32) {
        self.lc_latch = crate::regs::replace_hi_word(self.lc_latch, value) & chip_mask;
    }

    pub fn write_lcl(&mut self, value: u16, chip_mask: u32) {
        self.lc_latch = crate::regs::replace_lo_word(self.lc_latch, value) & chip_mask;
    }

    pub fn write_len(&mut self, value: u16) {
        self.len_latch = value;
    }

    pub fn write_per(&mut self, value: u16) {
        self.per_latch = value;
    }

    /// Volumes above 64 are clamped.
    pub fn write_vol(&mut self, value: u16) {
        self.vol_latch = (value & 0x7F).min(64);
    }

    pub fn write_dat(&mut self, value: u16) {
        self.dat_latch = value;
    }

    /// Current output: the active byte scaled by the volume.
    #[must_use]
    pub fn sample(&self) -> i16 {
        i16::from(self.dat_internal as u8 as i8) * self.vol_internal as i16
    }

    /// Runs the sequencer up to `target` and publishes the resulting sample.
    pub fn execute_until(&mut self, target: Cycle, port: &mut impl AudioDma) {
        let cycles = as_dma_cycles(target - self.clock);
        if cycles <= 0 {
            return;
        }
        self.clock += dma_cycles(cycles);

        if self.dma {
            self.execute(cycles, port);
            port.sample(self.nr(), self.sample());
        }
    }

    /// Immediate states fall through. The period countdown consumes the
    /// cycle budget once and may switch bytes several times if it is long.
    fn execute(&mut self, cycles: i64, port: &mut impl AudioDma) {
        let nr = self.nr();
        let mut budget = cycles;

        loop {
            match self.state {
                AudioState::Idle => {
                    self.len_internal = self.len_latch;
                    port.reload(nr, self.lc_latch);
                    self.per_internal = 0;
                    self.state = AudioState::Start;
                }
                AudioState::Start => {
                    if self.len_internal > 1 {
                        self.len_internal -= 1;
                    }
                    port.interrupt(nr);
                    self.state = AudioState::Fetch;
                }
                AudioState::Fetch => {
                    self.vol_internal = self.vol_latch;
                    self.per_internal = 0;
                    self.fetch(port);
                    self.state = AudioState::High;
                }
                AudioState::High | AudioState::Low => {
                    self.per_internal -= budget;
                    budget = 0;
                    if self.per_internal >= 0 {
                        return;
                    }

                    // A zero period would never let the countdown recover
                    self.per_internal += i64::from(self.per_latch.max(1));
                    self.vol_internal = self.vol_latch;

                    if self.state == AudioState::High {
                        self.dat_internal = self.dat_latch >> 8;
                        self.state = AudioState::Low;
                    } else {
                        self.dat_internal = self.dat_latch & 0xFF;
                        self.fetch(port);
                        self.state = AudioState::High;
                    }
                }
            }
        }
    }

    /// Fetches the next word and counts it against the length.
    fn fetch(&mut self, port: &mut impl AudioDma) {
        let nr = self.nr();
        self.dat_latch = port.fetch(nr);

        if self.len_internal > 1 {
            self.len_internal -= 1;
        } else {
            self.len_internal = self.len_latch;
            port.reload(nr, self.lc_latch);
            port.interrupt(nr);
        }
    }
}
