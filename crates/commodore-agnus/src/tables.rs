//! DMA event lookup tables and the per-line jump tables derived from them.
//!
//! The lookup families are built once. At runtime a row is copied into the
//! live [`EventLine`] for the current line, and its jump table is rebuilt so
//! the scheduler can skip straight to the next slot with an event.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::beam::{HPOS_MAX, SLOTS};
use crate::events::{EventId, TableDump};
use crate::regs::{DMACON_AUD0EN, DMACON_SPREN};

/// Last horizontal position covered by a fetch unit.
pub const LAST_FETCH_UNIT: usize = 0xD8;
/// First slot of the sprite DMA area.
pub const SPRITE_SLOT_FIRST: usize = 0x15;
/// DAS slot running the per-line sprite state update.
pub const SDMA_SLOT: usize = 0xDF;

const MAX_BPU: usize = 6;
const DAS_ROWS: usize = 64;

type Row = [EventId; SLOTS];

/// The static bitplane and disk/audio/sprite lookup families.
#[derive(Debug, Clone)]
pub struct EventTables {
    lores: Box<[Row; MAX_BPU + 1]>,
    hires: Box<[Row; MAX_BPU + 1]>,
    das: Box<[Row; DAS_ROWS]>,
}

impl EventTables {
    #[must_use]
    pub fn new() -> Self {
        let mut tables = Self {
            lores: Box::new([[EventId::None; SLOTS]; MAX_BPU + 1]),
            hires: Box::new([[EventId::None; SLOTS]; MAX_BPU + 1]),
            das: Box::new([[EventId::None; SLOTS]; DAS_ROWS]),
        };
        tables.init_lores();
        tables.init_hires();
        tables.init_das();
        tables
    }

    fn init_lores(&mut self) {
        // Slot within a fetch unit for each plane, innermost plane last.
        const LAYOUT: [(usize, u8); 6] = [(7, 0), (3, 1), (5, 2), (1, 3), (6, 4), (2, 5)];

        for (bpu, row) in self.lores.iter_mut().enumerate() {
            for unit in (0..=LAST_FETCH_UNIT).step_by(8) {
                for &(offset, plane) in &LAYOUT[..bpu] {
                    row[unit + offset] = EventId::BplLores(plane);
                }
            }
            debug_assert!(row[SLOTS - 1].is_none());
            row[SLOTS - 1] = EventId::BplEol;
        }
    }

    fn init_hires(&mut self) {
        // Hires fetches each plane twice per 8-slot group.
        const LAYOUT: [(usize, u8); 4] = [(3, 0), (1, 1), (2, 2), (0, 3)];

        for (bpu, row) in self.hires.iter_mut().enumerate() {
            let planes = bpu.min(4);
            for unit in (0..=LAST_FETCH_UNIT).step_by(8) {
                for &(offset, plane) in &LAYOUT[..planes] {
                    row[unit + offset] = EventId::BplHires(plane);
                    row[unit + offset + 4] = EventId::BplHires(plane);
                }
            }
            debug_assert!(row[SLOTS - 1].is_none());
            row[SLOTS - 1] = EventId::BplEol;
        }
    }

    fn init_das(&mut self) {
        for (dmacon, row) in self.das.iter_mut().enumerate() {
            row[0x01] = EventId::DasRefresh;

            if dmacon != 0 {
                row[0x07] = EventId::DasDisk(0);
                row[0x09] = EventId::DasDisk(1);
                row[0x0B] = EventId::DasDisk(2);
            }

            for ch in 0..4u8 {
                if dmacon as u16 & (DMACON_AUD0EN << ch) != 0 {
                    row[0x0D + 2 * ch as usize] = EventId::DasAudio(ch);
                }
            }

            if dmacon as u16 & DMACON_SPREN != 0 {
                for nr in 0..8u8 {
                    let slot = SPRITE_SLOT_FIRST + 4 * nr as usize;
                    row[slot] = EventId::DasSpriteFirst(nr);
                    row[slot + 2] = EventId::DasSpriteSecond(nr);
                }
            }

            row[SDMA_SLOT] = EventId::DasSdma;
        }
    }

    /// Bitplane row for `bpu` active planes.
    #[must_use]
    pub fn bpl_row(&self, hires: bool, bpu: usize) -> &Row {
        debug_assert!(bpu <= MAX_BPU);
        if hires { &self.hires[bpu] } else { &self.lores[bpu] }
    }

    /// DAS row for the low six DMACON bits.
    #[must_use]
    pub fn das_row(&self, dmacon: u16) -> &Row {
        &self.das[usize::from(dmacon & 0x3F)]
    }
}

impl Default for EventTables {
    fn default() -> Self {
        Self::new()
    }
}

/// The live event table of the current line and its jump table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventLine {
    #[cfg_attr(feature = "serde", serde(with = "serde_with::As::<[serde_with::Same; SLOTS]>"))]
    events: [EventId; SLOTS],
    /// Next position holding an event, strictly after the index.
    #[cfg_attr(feature = "serde", serde(with = "serde_with::As::<[serde_with::Same; SLOTS]>"))]
    next: [Option<u8>; SLOTS],
}

impl EventLine {
    #[must_use]
    pub fn new() -> Self {
        Self { events: [EventId::None; SLOTS], next: [None; SLOTS] }
    }

    #[must_use]
    pub fn event(&self, hpos: usize) -> EventId {
        self.events[hpos]
    }

    #[must_use]
    pub fn events(&self) -> &[EventId; SLOTS] {
        &self.events
    }

    pub fn set(&mut self, hpos: usize, id: EventId) {
        self.events[hpos] = id;
    }

    /// First position after `hpos` that holds an event.
    #[must_use]
    pub fn next_after(&self, hpos: usize) -> Option<usize> {
        self.next.get(hpos).copied().flatten().map(usize::from)
    }

    /// Copies `src[range]` into the live table.
    pub fn copy_from(&mut self, src: &Row, range: std::ops::Range<usize>) {
        self.events[range.clone()].copy_from_slice(&src[range]);
    }

    /// Clears every slot, leaving only `tail` in the last one.
    pub fn clear(&mut self, tail: EventId) {
        self.events = [EventId::None; SLOTS];
        self.events[SLOTS - 1] = tail;
        self.update_jump_table(SLOTS - 1);
    }

    /// Rebuilds the jump table for positions `0..=end`, scanning backwards.
    /// Entries beyond `end` are kept and `next[end]` seeds the scan.
    pub fn update_jump_table(&mut self, end: usize) {
        debug_assert!(end < SLOTS);
        let mut next = self.next[end];
        for i in (0..=end).rev() {
            self.next[i] = next;
            if !self.events[i].is_none() {
                next = Some(i as u8);
            }
        }
    }

    /// Checks the jump table against the event table. Used by assertions.
    #[must_use]
    pub fn jump_table_is_consistent(&self) -> bool {
        (0..SLOTS).all(|i| match self.next[i] {
            Some(j) => {
                let j = usize::from(j);
                j > i
                    && !self.events[j].is_none()
                    && self.events[i + 1..j].iter().all(|e| e.is_none())
            }
            None => self.events[i + 1..].iter().all(|e| e.is_none()),
        })
    }

    /// Text rendering of `range` for debugging.
    #[must_use]
    pub fn dump(&self, range: std::ops::Range<usize>) -> String {
        TableDump { table: &self.events[range.clone()], from: range.start }.to_string()
    }
}

impl Default for EventLine {
    fn default() -> Self {
        Self::new()
    }
}

/// `true` if the last slot of a bitplane line holds the end-of-line marker
/// and the slot before it jumps there.
#[must_use]
pub fn bpl_line_terminates(line: &EventLine) -> bool {
    let last = usize::from(HPOS_MAX);
    line.event(last) == EventId::BplEol && line.next_after(last - 1) == Some(last)
}
