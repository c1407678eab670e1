//! Beam position and master-clock arithmetic.
//!
//! Agnus advances in DMA cycles (colour clocks). Every other component counts
//! master-clock ticks, so the conversions live here and nowhere else.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Absolute master-clock tick count.
pub type Cycle = i64;

/// Trigger value of a disarmed event slot.
pub const NEVER: Cycle = i64::MAX;

/// Master ticks per DMA cycle.
pub const TICKS_PER_DMA_CYCLE: Cycle = 4;
/// Master ticks per CPU cycle (a DMA cycle spans two CPU cycles).
pub const TICKS_PER_CPU_CYCLE: Cycle = 2;
/// Master ticks per CIA E-clock cycle (ten CPU cycles).
pub const TICKS_PER_CIA_CYCLE: Cycle = 20;

/// DMA cycles per rasterline.
pub const HPOS_CNT: u16 = 227;
/// Last horizontal slot of a rasterline.
pub const HPOS_MAX: u16 = HPOS_CNT - 1;
/// Length of every per-slot table.
pub const SLOTS: usize = HPOS_CNT as usize;

/// Lines in a long PAL frame.
pub const LINES_LONG_FRAME: u16 = 313;
/// Lines in a short PAL frame.
pub const LINES_SHORT_FRAME: u16 = 312;

#[must_use]
pub const fn dma_cycles(n: i64) -> Cycle {
    n * TICKS_PER_DMA_CYCLE
}

#[must_use]
pub const fn cpu_cycles(n: i64) -> Cycle {
    n * TICKS_PER_CPU_CYCLE
}

#[must_use]
pub const fn cia_cycles(n: i64) -> Cycle {
    n * TICKS_PER_CIA_CYCLE
}

#[must_use]
pub const fn as_dma_cycles(cycle: Cycle) -> i64 {
    cycle / TICKS_PER_DMA_CYCLE
}

#[must_use]
pub const fn as_cpu_cycles(cycle: Cycle) -> i64 {
    cycle / TICKS_PER_CPU_CYCLE
}

/// Aligns a tick count down to the DMA-cycle raster.
#[must_use]
pub const fn align_to_dma(cycle: Cycle) -> Cycle {
    cycle - cycle.rem_euclid(TICKS_PER_DMA_CYCLE)
}

/// Position of the electron beam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Beam {
    /// Vertical position (rasterline).
    pub v: u16,
    /// Horizontal position in DMA cycles.
    pub h: u16,
}

impl Beam {
    #[must_use]
    pub const fn new(v: u16, h: u16) -> Self {
        Self { v, h }
    }

    /// Builds a beam from a DMA-cycle offset into the frame.
    #[must_use]
    pub const fn from_offset(offset: i64) -> Self {
        Self {
            v: (offset / HPOS_CNT as i64) as u16,
            h: (offset % HPOS_CNT as i64) as u16,
        }
    }

    /// DMA cycles elapsed between the frame start and this position.
    #[must_use]
    pub const fn offset(self) -> i64 {
        self.v as i64 * HPOS_CNT as i64 + self.h as i64
    }

    /// Position reached after `cycles` further DMA cycles.
    #[must_use]
    pub const fn advanced(self, cycles: i64) -> Self {
        Self::from_offset(self.offset() + cycles)
    }

    /// Signed distance in DMA cycles from `earlier` to `self`.
    #[must_use]
    pub const fn since(self, earlier: Beam) -> i64 {
        self.offset() - earlier.offset()
    }

    /// Steps one DMA cycle forward, wrapping into the next line.
    pub fn increment(&mut self) {
        if self.h >= HPOS_MAX {
            self.h = 0;
            self.v += 1;
        } else {
            self.h += 1;
        }
    }

    /// Steps one DMA cycle back, wrapping into the previous line.
    pub fn decrement(&mut self) {
        if self.h == 0 {
            self.h = HPOS_MAX;
            self.v = self.v.wrapping_sub(1);
        } else {
            self.h -= 1;
        }
    }

    /// Raw VHPOSR layout: V7..V0 in the high byte, H8..H1 in the low byte.
    #[must_use]
    pub const fn vhpos_bits(self) -> u16 {
        ((self.v & 0xFF) << 8) | (self.h & 0xFF)
    }
}

impl std::fmt::Display for Beam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{:02X})", self.v, self.h)
    }
}

/// Per-frame bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameInfo {
    /// Frames completed since power-up.
    pub nr: u64,
    /// Whether the frame is drawn in interlace mode.
    pub interlaced: bool,
    /// Rasterlines in this frame.
    pub num_lines: u16,
}

impl Default for FrameInfo {
    fn default() -> Self {
        Self { nr: 0, interlaced: false, num_lines: LINES_LONG_FRAME }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_round_trips_every_slot_of_a_long_frame() {
        for v in 0..LINES_LONG_FRAME {
            for h in 0..HPOS_CNT {
                let beam = Beam::new(v, h);
                assert_eq!(Beam::from_offset(beam.offset()), beam);
            }
        }
    }

    #[test]
    fn increment_wraps_at_end_of_line() {
        let mut beam = Beam::new(10, HPOS_MAX);
        beam.increment();
        assert_eq!(beam, Beam::new(11, 0));
        beam.decrement();
        assert_eq!(beam, Beam::new(10, HPOS_MAX));
    }

    #[test]
    fn advanced_and_since_are_inverse() {
        let start = Beam::new(20, 0xE0);
        let end = start.advanced(10);
        assert_eq!(end, Beam::new(21, 0xE0 + 10 - HPOS_CNT));
        assert_eq!(end.since(start), 10);
    }

    #[test]
    fn clock_units_are_consistent() {
        assert_eq!(dma_cycles(1), 2 * cpu_cycles(1));
        assert_eq!(cia_cycles(1), 10 * cpu_cycles(1));
        assert_eq!(as_dma_cycles(dma_cycles(57)), 57);
        assert_eq!(align_to_dma(dma_cycles(3) + 3), dma_cycles(3));
    }
}
