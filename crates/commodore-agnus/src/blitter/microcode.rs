//! Blitter micro-programs.
//!
//! Each instruction is a bit set of actions executed in one DMA cycle.
//! Instructions with [`BUS`] set need a bus slot. The copy programs are
//! pipelined: the D word computed in one iteration is written in the next,
//! so most programs end with a flushing write after the loop.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::BlitterError;

pub const BUS: u16 = 0x1000;

pub const IDLE: u16 = 0x0000;
pub const FETCH_A: u16 = 0x0001 | BUS;
pub const FETCH_B: u16 = 0x0002 | BUS;
pub const FETCH_C: u16 = 0x0004 | BUS;
pub const HOLD_A: u16 = 0x0008;
pub const HOLD_B: u16 = 0x0010;
pub const HOLD_D: u16 = 0x0020;
pub const WRITE_D: u16 = 0x0040 | BUS;
pub const DONE: u16 = 0x0080;
pub const REPEAT: u16 = 0x0100;
/// Line mode only: moves the fetched C word into the holding register.
pub const HOLD_C: u16 = 0x0200;

/// Copy programs indexed by the channel enable bits (A = 8, B = 4, C = 2, D = 1).
static COPY_PROGRAMS: [&[u16]; 16] = [
    // ----
    &[IDLE, REPEAT, DONE],
    // ---D
    &[WRITE_D | HOLD_A | HOLD_B, HOLD_D | REPEAT, WRITE_D | DONE],
    // --C-
    &[FETCH_C | HOLD_A | HOLD_B, HOLD_D | REPEAT, DONE],
    // --CD
    &[FETCH_C | HOLD_A | HOLD_B, WRITE_D, HOLD_D | REPEAT, WRITE_D | DONE],
    // -B--
    &[FETCH_B, HOLD_A | HOLD_B, HOLD_D | REPEAT, DONE],
    // -B-D
    &[FETCH_B, WRITE_D | HOLD_A | HOLD_B, HOLD_D | REPEAT, WRITE_D | DONE],
    // -BC-
    &[FETCH_B | HOLD_D, FETCH_C | HOLD_A | HOLD_B | REPEAT, HOLD_D | DONE],
    // -BCD
    &[FETCH_B | HOLD_A, FETCH_C | HOLD_B, WRITE_D | HOLD_D, REPEAT, WRITE_D | DONE],
    // A---
    &[FETCH_A | HOLD_D, HOLD_A | HOLD_B | REPEAT, HOLD_D | DONE],
    // A--D
    &[FETCH_A | HOLD_D, WRITE_D | HOLD_A | HOLD_B | REPEAT, HOLD_D, WRITE_D | DONE],
    // A-C-
    &[FETCH_A | HOLD_D, FETCH_C | HOLD_A | HOLD_B | REPEAT, HOLD_D | DONE],
    // A-CD
    &[FETCH_A | HOLD_D, FETCH_C | HOLD_A | HOLD_B, WRITE_D | REPEAT, HOLD_D, WRITE_D | DONE],
    // AB--
    &[FETCH_A | HOLD_D, FETCH_B | HOLD_A, HOLD_B | REPEAT, HOLD_D | DONE],
    // AB-D
    &[FETCH_A | HOLD_D, FETCH_B | HOLD_A, WRITE_D | HOLD_B | REPEAT, HOLD_D, WRITE_D | DONE],
    // ABC-
    &[FETCH_A | HOLD_D, FETCH_B | HOLD_A, FETCH_C | HOLD_B | REPEAT, HOLD_D | DONE],
    // ABCD
    &[FETCH_A, FETCH_B | HOLD_A, FETCH_C | HOLD_B, WRITE_D | HOLD_D | REPEAT, WRITE_D | DONE],
];

/// One pixel per iteration: read the destination, combine, write it back.
static LINE_PROGRAM: &[u16] = &[FETCH_C, HOLD_A | HOLD_B | HOLD_C, HOLD_D, WRITE_D, REPEAT, DONE];

/// Program selected for the running blit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Microcode {
    /// Copy blit with the given channel mask.
    Copy(u8),
    Line,
}

impl Default for Microcode {
    fn default() -> Self {
        Self::Copy(0)
    }
}

impl Microcode {
    /// Selects the copy program for a channel mask.
    pub fn copy(channels: u16) -> Result<Self, BlitterError> {
        if usize::from(channels) < COPY_PROGRAMS.len() {
            Ok(Self::Copy(channels as u8))
        } else {
            Err(BlitterError::UnsupportedChannels(channels))
        }
    }

    #[must_use]
    pub fn program(self) -> &'static [u16] {
        match self {
            Self::Copy(mask) => COPY_PROGRAMS[usize::from(mask & 0xF)],
            Self::Line => LINE_PROGRAM,
        }
    }

    /// Instruction at `pc`. Running past the end yields DONE.
    #[must_use]
    pub fn instruction(self, pc: usize) -> u16 {
        self.program().get(pc).copied().unwrap_or(DONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(program: &[u16], op: u16) -> usize {
        program.iter().filter(|&&instr| instr & op == op).count()
    }

    #[test]
    fn every_program_loops_once_and_terminates() {
        for mask in 0..16 {
            let program = Microcode::copy(mask).map(Microcode::program).unwrap_or_default();
            assert_eq!(count(program, REPEAT), 1, "mask {mask:X}");
            assert_eq!(program.last().copied().map(|i| i & DONE), Some(DONE), "mask {mask:X}");
        }
    }

    #[test]
    fn programs_fetch_exactly_the_enabled_channels() {
        for mask in 1..16u16 {
            let program = Microcode::copy(mask).map(Microcode::program).unwrap_or_default();
            let repeat = program.iter().position(|i| i & REPEAT != 0).unwrap_or(0);
            let body = &program[..=repeat];
            assert_eq!(count(body, FETCH_A), usize::from(mask & 8 != 0), "mask {mask:X}");
            assert_eq!(count(body, FETCH_B), usize::from(mask & 4 != 0), "mask {mask:X}");
            assert_eq!(count(body, FETCH_C), usize::from(mask & 2 != 0), "mask {mask:X}");
            assert_eq!(count(body, WRITE_D), usize::from(mask & 1 != 0), "mask {mask:X}");
            assert_eq!(count(body, HOLD_A), 1, "mask {mask:X}");
            assert_eq!(count(body, HOLD_B), 1, "mask {mask:X}");
        }
    }

    #[test]
    fn pipelined_programs_compute_d_twice() {
        let holds: Vec<usize> =
            (0..16).map(|mask| Microcode::copy(mask).map(|m| count(m.program(), HOLD_D)).unwrap_or(0)).collect();
        assert_eq!(holds, [0, 1, 1, 1, 1, 1, 2, 1, 2, 2, 2, 2, 2, 2, 2, 1]);
    }

    #[test]
    fn program_lengths() {
        let lengths: Vec<usize> =
            (0..16).map(|mask| Microcode::copy(mask).map(|m| m.program().len()).unwrap_or(0)).collect();
        assert_eq!(lengths, [3, 3, 3, 4, 4, 4, 3, 5, 3, 4, 3, 5, 4, 5, 4, 5]);
        assert_eq!(Microcode::Line.program().len(), 6);
    }

    #[test]
    fn rejects_masks_beyond_four_channels() {
        assert_eq!(Microcode::copy(16), Err(BlitterError::UnsupportedChannels(16)));
    }

    #[test]
    fn running_past_the_end_is_done() {
        assert_eq!(Microcode::Copy(0xF).instruction(99), DONE);
        assert_eq!(Microcode::Line.instruction(0), FETCH_C);
    }
}
