//! Event identifiers and the slot set of the scheduler.
//!
//! Every independent hardware activity owns exactly one slot. A slot holds
//! an absolute trigger cycle, the event to run when the trigger is reached,
//! and an optional payload. Slots are never created or destroyed after
//! power-up, only armed and disarmed.
//!
//! Slots before [`Slot::Sec`] are primary and are checked on every dispatch.
//! The remaining ones are secondary: their earliest trigger is mirrored into
//! the `Sec` slot so the hot path only looks at one of them.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::beam::{Cycle, NEVER};

/// What a slot (or an event table entry) does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EventId {
    #[default]
    None,

    // Bitplane table entries (0-based plane)
    BplLores(u8),
    BplHires(u8),
    BplEol,

    // Disk, audio and sprite table entries
    DasRefresh,
    DasDisk(u8),
    DasAudio(u8),
    DasSpriteFirst(u8),
    DasSpriteSecond(u8),
    DasSdma,

    RegChange,
    RasHsync,
    CiaExecute,

    CopFetch,
    CopMove,
    CopWaitOrSkip,
    CopWait,
    CopJmp1,
    CopJmp2,

    BltStart,
    BltExecute,

    SecTrigger,
    DskRotate,
    VblStrobe,
    IrqCheck,
}

impl EventId {
    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    /// Plane fetched by a bitplane table entry.
    #[must_use]
    pub const fn bitplane(self) -> Option<usize> {
        match self {
            Self::BplLores(p) | Self::BplHires(p) => Some(p as usize),
            _ => None,
        }
    }

    /// Two-character mnemonic used by the event table dumps.
    #[must_use]
    pub fn mnemonic(self) -> [char; 2] {
        let digit = |n: u8| char::from(b'0' + n);
        match self {
            Self::None => ['.', '.'],
            Self::BplLores(p) => ['L', digit(p + 1)],
            Self::BplHires(p) => ['H', digit(p + 1)],
            Self::BplEol => ['E', 'O'],
            Self::DasRefresh => ['R', 'E'],
            Self::DasDisk(n) => ['D', digit(n)],
            Self::DasAudio(n) => ['A', digit(n)],
            Self::DasSpriteFirst(n) => [digit(n), '1'],
            Self::DasSpriteSecond(n) => [digit(n), '2'],
            Self::DasSdma => ['S', 'D'],
            _ => ['?', '?'],
        }
    }
}

/// Renders one stretch of an event table as four text rows: the two hex
/// digits of each slot number followed by the two mnemonic characters.
pub struct TableDump<'a> {
    pub table: &'a [EventId],
    pub from: usize,
}

impl fmt::Display for TableDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: [String; 4] = [
            (0..self.table.len()).map(|i| hex_digit((self.from + i) / 16)).collect(),
            (0..self.table.len()).map(|i| hex_digit((self.from + i) % 16)).collect(),
            self.table.iter().map(|e| e.mnemonic()[0]).collect(),
            self.table.iter().map(|e| e.mnemonic()[1]).collect(),
        ];
        for row in rows {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

fn hex_digit(n: usize) -> char {
    char::from_digit((n % 16) as u32, 16).map_or('?', |c| c.to_ascii_uppercase())
}

/// Named scheduler slots, in dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Slot {
    /// Delayed register writes.
    Reg,
    /// Rasterline boundary (HSYNC).
    Ras,
    CiaA,
    CiaB,
    /// Bitplane DMA.
    Bpl,
    /// Disk, audio and sprite DMA.
    Das,
    Cop,
    Blt,
    /// Mirror of the earliest secondary trigger.
    Sec,
    Dsk,
    Vbl,
    Irq,
}

pub const SLOT_COUNT: usize = 12;

impl Slot {
    pub const ALL: [Slot; SLOT_COUNT] = [
        Slot::Reg,
        Slot::Ras,
        Slot::CiaA,
        Slot::CiaB,
        Slot::Bpl,
        Slot::Das,
        Slot::Cop,
        Slot::Blt,
        Slot::Sec,
        Slot::Dsk,
        Slot::Vbl,
        Slot::Irq,
    ];

    pub const PRIMARY: [Slot; 9] = [
        Slot::Reg,
        Slot::Ras,
        Slot::CiaA,
        Slot::CiaB,
        Slot::Bpl,
        Slot::Das,
        Slot::Cop,
        Slot::Blt,
        Slot::Sec,
    ];

    pub const SECONDARY: [Slot; 3] = [Slot::Dsk, Slot::Vbl, Slot::Irq];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn is_secondary(self) -> bool {
        self as usize > Slot::Sec as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventSlot {
    pub id: EventId,
    pub trigger: Cycle,
    pub data: i64,
}

impl Default for EventSlot {
    fn default() -> Self {
        Self { id: EventId::None, trigger: NEVER, data: 0 }
    }
}

/// The fixed slot set plus the cached earliest primary trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Scheduler {
    slots: [EventSlot; SLOT_COUNT],
    next_trigger: Cycle,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self { slots: [EventSlot::default(); SLOT_COUNT], next_trigger: NEVER }
    }

    #[must_use]
    pub fn slot(&self, s: Slot) -> &EventSlot {
        &self.slots[s.index()]
    }

    #[must_use]
    pub fn id(&self, s: Slot) -> EventId {
        self.slots[s.index()].id
    }

    #[must_use]
    pub fn trigger(&self, s: Slot) -> Cycle {
        self.slots[s.index()].trigger
    }

    #[must_use]
    pub fn data(&self, s: Slot) -> i64 {
        self.slots[s.index()].data
    }

    pub fn set_data(&mut self, s: Slot, data: i64) {
        self.slots[s.index()].data = data;
    }

    /// Earliest trigger among the primary slots.
    #[must_use]
    pub fn next_trigger(&self) -> Cycle {
        self.next_trigger
    }

    /// `true` if the slot holds an event, armed or not.
    #[must_use]
    pub fn has_event(&self, s: Slot) -> bool {
        !self.slots[s.index()].id.is_none()
    }

    /// `true` if the slot's trigger is not [`NEVER`].
    #[must_use]
    pub fn is_pending(&self, s: Slot) -> bool {
        self.slots[s.index()].trigger != NEVER
    }

    #[must_use]
    pub fn is_due(&self, s: Slot, clock: Cycle) -> bool {
        clock >= self.slots[s.index()].trigger
    }

    pub fn schedule_abs(&mut self, s: Slot, cycle: Cycle, id: EventId) {
        let slot = &mut self.slots[s.index()];
        slot.trigger = cycle;
        slot.id = id;
        self.lower_trigger(s, cycle);
    }

    pub fn schedule_abs_with(&mut self, s: Slot, cycle: Cycle, id: EventId, data: i64) {
        self.schedule_abs(s, cycle, id);
        self.slots[s.index()].data = data;
    }

    /// Moves the trigger of an already scheduled event.
    pub fn reschedule_abs(&mut self, s: Slot, cycle: Cycle) {
        self.slots[s.index()].trigger = cycle;
        self.lower_trigger(s, cycle);
    }

    pub fn cancel(&mut self, s: Slot) {
        self.slots[s.index()] = EventSlot::default();
    }

    /// Disarms a slot but keeps its event id.
    pub fn disarm(&mut self, s: Slot) {
        self.slots[s.index()].trigger = NEVER;
    }

    fn lower_trigger(&mut self, s: Slot, cycle: Cycle) {
        if s.is_secondary() {
            let sec = &mut self.slots[Slot::Sec.index()];
            if cycle < sec.trigger {
                sec.trigger = cycle;
                sec.id = EventId::SecTrigger;
            }
        }
        self.next_trigger = self.next_trigger.min(cycle);
    }

    /// Recomputes the cached triggers after a dispatch round.
    pub fn refresh_next_trigger(&mut self) {
        let sec = Slot::SECONDARY
            .iter()
            .map(|s| self.slots[s.index()].trigger)
            .min()
            .unwrap_or(NEVER);
        self.slots[Slot::Sec.index()].trigger = sec;

        self.next_trigger = Slot::PRIMARY
            .iter()
            .map(|s| self.slots[s.index()].trigger)
            .min()
            .unwrap_or(NEVER);
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_scheduler_has_every_slot_disarmed() {
        let scheduler = Scheduler::new();
        for s in Slot::ALL {
            assert!(!scheduler.is_pending(s));
            assert!(!scheduler.has_event(s));
        }
        assert_eq!(scheduler.next_trigger(), NEVER);
    }

    #[test]
    fn scheduling_lowers_next_trigger() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_abs(Slot::Cop, 400, EventId::CopFetch);
        scheduler.schedule_abs(Slot::Ras, 100, EventId::RasHsync);
        assert_eq!(scheduler.next_trigger(), 100);
        assert!(scheduler.is_due(Slot::Ras, 100));
        assert!(!scheduler.is_due(Slot::Cop, 399));
    }

    #[test]
    fn secondary_slots_are_mirrored_into_sec() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_abs(Slot::Vbl, 900, EventId::VblStrobe);
        scheduler.schedule_abs(Slot::Irq, 300, EventId::IrqCheck);
        assert_eq!(scheduler.trigger(Slot::Sec), 300);
        assert_eq!(scheduler.id(Slot::Sec), EventId::SecTrigger);
        assert_eq!(scheduler.next_trigger(), 300);

        scheduler.cancel(Slot::Irq);
        scheduler.refresh_next_trigger();
        assert_eq!(scheduler.trigger(Slot::Sec), 900);
        assert_eq!(scheduler.next_trigger(), 900);
    }

    #[test]
    fn cancel_clears_payload() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_abs_with(Slot::Blt, 8, EventId::BltExecute, 42);
        assert_eq!(scheduler.data(Slot::Blt), 42);
        scheduler.cancel(Slot::Blt);
        assert_eq!(scheduler.data(Slot::Blt), 0);
        assert_eq!(scheduler.id(Slot::Blt), EventId::None);
    }

    #[test]
    fn table_dump_prints_slot_numbers_and_mnemonics() {
        let table = [EventId::None, EventId::BplLores(3), EventId::BplEol];
        let text = TableDump { table: &table, from: 0x1E }.to_string();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows, ["112", "EF0", ".LE", ".4O"]);
    }
}
