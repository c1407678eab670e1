//! Agnus - beam counter, event scheduler and DMA controller.
//!
//! Agnus owns the master clock. [`Agnus::execute`] advances it by one DMA
//! cycle and dispatches every slot whose trigger has been reached.
//! [`Agnus::execute_until`] jumps straight to a target cycle when no slot is
//! due before it, which yields the same state as stepping cycle by cycle.

mod arbiter;
mod dma;
mod registers;
mod service;
mod timing;

pub use dma::{AUDIO_SLOT_BASE_UNVERIFIED, SpriteDma, SpriteState};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::audio::AudioChannel;
use crate::beam::{
    Beam, Cycle, FrameInfo, HPOS_CNT, HPOS_MAX, LINES_LONG_FRAME, NEVER, align_to_dma,
    as_dma_cycles, cia_cycles, dma_cycles,
};
use crate::blitter::Blitter;
use crate::bus::{BusStats, BusTable};
use crate::config::{AgnusConfig, AgnusRevision};
use crate::copper::Copper;
use crate::events::{EventId, EventSlot, Scheduler, Slot};
use crate::host::Host;
use crate::inspect::Inspector;
use crate::recorder::ChangeRecorder;
use crate::regs::{
    DMACON_AUD0EN, DMACON_BLTEN, DMACON_BLTPRI, DMACON_BPLEN, DMACON_COPEN, DMACON_DMAEN,
    DMACON_DSKEN, DMACON_SPREN,
};
use crate::tables::{EventLine, EventTables};

/// Interval between two disk rotation ticks.
pub const DISK_ROTATE_INTERVAL: Cycle = dma_cycles(56);

/// Work deferred to the next HSYNC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HsyncActions(u8);

impl HsyncActions {
    pub const COMPUTE_DDF_WINDOW: Self = Self(0x01);
    pub const UPDATE_BPL_TABLE: Self = Self(0x02);
    pub const UPDATE_DAS_TABLE: Self = Self(0x04);

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns the pending actions and clears them.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Agnus {
    config: AgnusConfig,
    chip_mask: u32,

    /// Master clock in ticks.
    pub clock: Cycle,
    pub pos: Beam,
    pub frame: FrameInfo,
    /// Long frame flip-flop.
    pub lof: bool,

    pub(crate) scheduler: Scheduler,
    #[cfg_attr(feature = "serde", serde(skip))]
    tables: EventTables,
    pub(crate) bpl_line: EventLine,
    pub(crate) das_line: EventLine,
    pub(crate) bus: BusTable,
    pub(crate) stats: BusStats,
    pub(crate) recorder: ChangeRecorder,
    pub(crate) hsync_actions: HsyncActions,

    // Registers
    pub dmacon: u16,
    pub bplcon0: u16,
    pub diwstrt: u16,
    pub diwstop: u16,
    pub ddfstrt: u16,
    pub ddfstop: u16,
    pub bpl1mod: i16,
    pub bpl2mod: i16,

    // DMA pointers
    pub bpl_pt: [u32; 6],
    pub spr_pt: [u32; 8],
    pub dsk_pt: u32,
    /// Audio fetch pointers. The location latches live in the channels.
    pub aud_pt: [u32; 4],

    // Values latched at the start of the line for the DDFSTRT comparison
    pub(crate) dmacon_at_ddfstrt: u16,
    pub(crate) bplcon0_at_ddfstrt: u16,

    // Display window
    pub(crate) diw_vstrt: i16,
    pub(crate) diw_vstop: i16,
    pub(crate) diw_hstrt: i16,
    pub(crate) diw_hstop: i16,
    pub(crate) diw_h_flop_on: i16,
    pub(crate) diw_h_flop_off: i16,
    pub(crate) diw_v_flop: bool,
    pub(crate) diw_h_flop: bool,

    // Data fetch window
    pub(crate) ddf_v_flop: bool,
    pub(crate) ddfstrt_reached: i16,
    pub(crate) ddfstop_reached: i16,
    pub(crate) dma_strt_lores: i16,
    pub(crate) dma_strt_hires: i16,
    pub(crate) dma_stop_lores: i16,
    pub(crate) dma_stop_hires: i16,

    pub(crate) old_bpl_dma_line: bool,
    /// DAS enable bits the live DAS table was built for.
    pub(crate) dma_das: u16,

    /// Blitter slow-down line, asserted while the CPU is kept off the bus.
    pub bls: bool,

    pub sprites: [SpriteDma; 8],
    pub copper: Copper,
    pub blitter: Blitter,
    pub audio: [AudioChannel; 4],

    #[cfg_attr(feature = "serde", serde(skip))]
    inspector: Inspector,
}

impl Agnus {
    #[must_use]
    pub fn new(config: AgnusConfig) -> Self {
        let mut agnus = Self::power_up_state(config, EventTables::new(), Inspector::default());
        agnus.schedule_initial_events();
        agnus
    }

    /// Puts every register, table and slot into its power-up state. The
    /// lookup families and the inspector handle survive.
    pub fn reset(&mut self) {
        let tables = std::mem::take(&mut self.tables);
        let inspector = std::mem::take(&mut self.inspector);
        *self = Self::power_up_state(self.config, tables, inspector);
        self.schedule_initial_events();
    }

    fn power_up_state(config: AgnusConfig, tables: EventTables, inspector: Inspector) -> Self {
        Self {
            config,
            chip_mask: config.revision.chip_ptr_mask(),
            clock: 0,
            pos: Beam::default(),
            frame: FrameInfo::default(),
            lof: true,
            scheduler: Scheduler::new(),
            tables,
            bpl_line: EventLine::new(),
            das_line: EventLine::new(),
            bus: BusTable::new(),
            stats: BusStats::default(),
            recorder: ChangeRecorder::new(),
            hsync_actions: HsyncActions::default(),
            dmacon: 0,
            bplcon0: 0,
            diwstrt: 0,
            diwstop: 0,
            ddfstrt: 0,
            ddfstop: 0,
            bpl1mod: 0,
            bpl2mod: 0,
            bpl_pt: [0; 6],
            spr_pt: [0; 8],
            dsk_pt: 0,
            aud_pt: [0; 4],
            dmacon_at_ddfstrt: 0,
            bplcon0_at_ddfstrt: 0,
            diw_vstrt: 0,
            diw_vstop: 0,
            diw_hstrt: 0,
            diw_hstop: 0,
            diw_h_flop_on: 0,
            diw_h_flop_off: 0,
            diw_v_flop: false,
            diw_h_flop: false,
            ddf_v_flop: false,
            ddfstrt_reached: 0,
            ddfstop_reached: 0,
            dma_strt_lores: 0,
            dma_strt_hires: 0,
            dma_stop_lores: 0,
            dma_stop_hires: 0,
            old_bpl_dma_line: false,
            dma_das: 0,
            bls: false,
            sprites: [SpriteDma::default(); 8],
            copper: Copper::new(),
            blitter: Blitter::new(config.blitter_accuracy),
            audio: std::array::from_fn(|nr| AudioChannel::new(nr as u8)),
            inspector,
        }
    }

    fn schedule_initial_events(&mut self) {
        self.bpl_line.clear(EventId::BplEol);
        self.update_das_dma(0);

        let strobe_line = i64::from(self.config.revision.vbl_strobe_line());
        let strobe = dma_cycles(i64::from(HPOS_CNT) * strobe_line + 1);

        self.scheduler.schedule_abs(Slot::Ras, dma_cycles(i64::from(HPOS_CNT)), EventId::RasHsync);
        self.scheduler.schedule_abs(Slot::CiaA, cia_cycles(1), EventId::CiaExecute);
        self.scheduler.schedule_abs(Slot::CiaB, cia_cycles(1), EventId::CiaExecute);
        self.scheduler.schedule_abs(Slot::Dsk, DISK_ROTATE_INTERVAL, EventId::DskRotate);
        self.scheduler.schedule_abs(Slot::Vbl, strobe, EventId::VblStrobe);
        self.schedule_next_bpl_event();
        self.schedule_next_das_event();

        log::debug!("Agnus reset ({:?}, {:?})", self.config.revision, self.config.blitter_accuracy);
    }

    #[must_use]
    pub fn config(&self) -> AgnusConfig {
        self.config
    }

    #[must_use]
    pub fn revision(&self) -> AgnusRevision {
        self.config.revision
    }

    /// Mask applied to chip RAM DMA pointers.
    #[must_use]
    pub fn chip_mask(&self) -> u32 {
        self.chip_mask
    }

    #[must_use]
    pub fn slot(&self, slot: Slot) -> &EventSlot {
        self.scheduler.slot(slot)
    }

    #[must_use]
    pub fn next_trigger(&self) -> Cycle {
        self.scheduler.next_trigger()
    }

    /// Live bitplane event table of the current line.
    #[must_use]
    pub fn bpl_events(&self) -> &EventLine {
        &self.bpl_line
    }

    /// Live disk/audio/sprite event table of the current line.
    #[must_use]
    pub fn das_events(&self) -> &EventLine {
        &self.das_line
    }

    #[must_use]
    pub fn tables(&self) -> &EventTables {
        &self.tables
    }

    #[must_use]
    pub fn bus(&self) -> &BusTable {
        &self.bus
    }

    #[must_use]
    pub fn stats(&self) -> &BusStats {
        &self.stats
    }

    pub fn clear_stats(&mut self) {
        self.stats.clear();
    }

    #[must_use]
    pub fn pending_changes(&self) -> &ChangeRecorder {
        &self.recorder
    }

    #[must_use]
    pub fn hsync_actions(&self) -> HsyncActions {
        self.hsync_actions
    }

    /// Handle for requesting inspection snapshots from another thread.
    #[must_use]
    pub fn inspector(&self) -> Inspector {
        self.inspector.clone()
    }

    //
    // Scheduling relative to the current clock
    //

    pub(crate) fn schedule_rel(&mut self, slot: Slot, delta: Cycle, id: EventId) {
        self.scheduler.schedule_abs(slot, self.clock + delta, id);
    }

    pub(crate) fn reschedule_rel(&mut self, slot: Slot, delta: Cycle) {
        self.scheduler.reschedule_abs(slot, self.clock + delta);
    }

    /// Requests an interrupt through the IRQ slot. Requests already pending
    /// in the slot are kept and the earlier trigger wins.
    pub(crate) fn schedule_irq(&mut self, bit: u8, delay: Cycle) {
        let pending = if self.scheduler.has_event(Slot::Irq) { self.scheduler.data(Slot::Irq) } else { 0 };
        let at = (self.clock + delay).min(self.scheduler.trigger(Slot::Irq));
        self.scheduler.schedule_abs_with(Slot::Irq, at, EventId::IrqCheck, pending | (1 << bit));
    }

    //
    // Running
    //

    /// Executes one DMA cycle.
    pub fn execute(&mut self, host: &mut impl Host) {
        if self.scheduler.next_trigger() <= self.clock {
            self.execute_events_until(self.clock, host);
        }

        self.clock += dma_cycles(1);
        debug_assert!(self.pos.h <= HPOS_MAX);
        self.pos.h = if self.pos.h < HPOS_MAX { self.pos.h + 1 } else { 0 };
    }

    /// Runs until `target` (aligned down to the DMA raster) is reached.
    pub fn execute_until(&mut self, target: Cycle, host: &mut impl Host) {
        let target = align_to_dma(target);
        let cycles = as_dma_cycles(target - self.clock);
        if cycles <= 0 {
            return;
        }

        // Nothing fires before the next trigger, and the trigger cycle itself
        // is dispatched by the next call to `execute`
        if target <= self.scheduler.next_trigger() {
            self.clock = target;
            self.pos.h += cycles as u16;
            debug_assert!(self.pos.h <= HPOS_CNT, "HSYNC has not been served");
        } else {
            for _ in 0..cycles {
                self.execute(host);
            }
        }
    }

    /// Runs until the frame counter advances, skipping idle stretches. On
    /// return the first cycle of the new frame has been executed.
    pub fn execute_frame(&mut self, host: &mut impl Host) {
        let frame = self.frame.nr;
        while self.frame.nr == frame {
            let next = self.scheduler.next_trigger();
            if next > self.clock {
                self.execute_until(next, host);
            }
            self.execute(host);
        }
    }

    //
    // Beam and frame arithmetic
    //

    #[must_use]
    pub fn is_long_frame(&self) -> bool {
        self.lof
    }

    #[must_use]
    pub fn cycles_in_frame(&self) -> Cycle {
        dma_cycles(i64::from(self.frame.num_lines) * i64::from(HPOS_CNT))
    }

    #[must_use]
    pub fn start_of_frame(&self) -> Cycle {
        self.clock - dma_cycles(self.pos.offset())
    }

    #[must_use]
    pub fn start_of_next_frame(&self) -> Cycle {
        self.start_of_frame() + self.cycles_in_frame()
    }

    #[must_use]
    pub fn belongs_to_previous_frame(&self, cycle: Cycle) -> bool {
        cycle < self.start_of_frame()
    }

    #[must_use]
    pub fn belongs_to_current_frame(&self, cycle: Cycle) -> bool {
        !self.belongs_to_previous_frame(cycle) && !self.belongs_to_next_frame(cycle)
    }

    #[must_use]
    pub fn belongs_to_next_frame(&self, cycle: Cycle) -> bool {
        cycle >= self.start_of_next_frame()
    }

    #[must_use]
    pub fn beam_to_cycle(&self, beam: Beam) -> Cycle {
        self.start_of_frame() + dma_cycles(beam.offset())
    }

    #[must_use]
    pub fn cycle_to_beam(&self, cycle: Cycle) -> Beam {
        let diff = as_dma_cycles(cycle - self.start_of_frame());
        debug_assert!(diff >= 0);
        Beam::from_offset(diff)
    }

    #[must_use]
    pub fn add_to_beam(beam: Beam, cycles: i64) -> Beam {
        beam.advanced(cycles)
    }

    /// Master ticks from one beam position to another, or [`NEVER`] if the
    /// end position lies beyond the last line of any frame.
    #[must_use]
    pub fn beam_diff(v_start: i16, h_start: i16, v_end: i16, h_end: i16) -> Cycle {
        debug_assert!(h_end <= HPOS_MAX as i16);
        if v_end > LINES_LONG_FRAME as i16 - 1 {
            return NEVER;
        }
        let v_diff = i64::from(v_end) - i64::from(v_start);
        let h_diff = i64::from(h_end) - i64::from(h_start);
        dma_cycles(v_diff * i64::from(HPOS_CNT) + h_diff)
    }

    //
    // Register decoding
    //

    /// Active bitplanes encoded in a BPLCON0 value. Illegal values enable
    /// no planes in hires mode and four planes in lores mode.
    #[must_use]
    pub const fn bpu_of(bplcon0: u16) -> usize {
        let bpu = ((bplcon0 >> 12) & 0b111) as usize;
        if Self::hires_of(bplcon0) {
            if bpu < 5 { bpu } else { 0 }
        } else if bpu < 7 {
            bpu
        } else {
            4
        }
    }

    #[must_use]
    pub const fn hires_of(bplcon0: u16) -> bool {
        bplcon0 & 0x8000 != 0
    }

    #[must_use]
    pub fn bpu(&self) -> usize {
        Self::bpu_of(self.bplcon0)
    }

    #[must_use]
    pub fn hires(&self) -> bool {
        Self::hires_of(self.bplcon0)
    }

    /// LACE bit of BPLCON0.
    #[must_use]
    pub fn lace(&self) -> bool {
        self.bplcon0 & 0x0004 != 0
    }

    #[must_use]
    pub const fn dma_enabled(dmacon: u16, bit: u16) -> bool {
        dmacon & DMACON_DMAEN != 0 && dmacon & bit != 0
    }

    #[must_use]
    pub fn bpl_dma(&self) -> bool {
        Self::dma_enabled(self.dmacon, DMACON_BPLEN)
    }

    #[must_use]
    pub fn cop_dma(&self) -> bool {
        Self::dma_enabled(self.dmacon, DMACON_COPEN)
    }

    #[must_use]
    pub fn blt_dma(&self) -> bool {
        Self::dma_enabled(self.dmacon, DMACON_BLTEN)
    }

    #[must_use]
    pub fn spr_dma(&self) -> bool {
        Self::dma_enabled(self.dmacon, DMACON_SPREN)
    }

    #[must_use]
    pub fn dsk_dma(&self) -> bool {
        Self::dma_enabled(self.dmacon, DMACON_DSKEN)
    }

    #[must_use]
    pub fn aud_dma(&self, channel: usize) -> bool {
        Self::dma_enabled(self.dmacon, DMACON_AUD0EN << channel)
    }

    /// Blitter priority bit (BLTPRI).
    #[must_use]
    pub fn bltpri(&self) -> bool {
        self.dmacon & DMACON_BLTPRI != 0
    }

    /// `true` if bitplane DMA runs in the current line for the given
    /// register values.
    #[must_use]
    pub fn in_bpl_dma_line_with(&self, dmacon: u16, bplcon0: u16) -> bool {
        self.ddf_v_flop && Self::bpu_of(bplcon0) != 0 && Self::dma_enabled(dmacon, DMACON_BPLEN)
    }

    #[must_use]
    pub fn in_bpl_dma_line(&self) -> bool {
        self.in_bpl_dma_line_with(self.dmacon, self.bplcon0)
    }

    #[must_use]
    pub fn in_last_rasterline(&self) -> bool {
        self.pos.v + 1 >= self.frame.num_lines
    }

    /// Vertical and horizontal display window flip-flops.
    #[must_use]
    pub fn diw_flops(&self) -> (bool, bool) {
        (self.diw_v_flop, self.diw_h_flop)
    }

    /// Horizontal positions at which the display window flip-flop switches
    /// on and off in the current line, `-1` if it does not switch.
    #[must_use]
    pub fn diw_h_triggers(&self) -> (i16, i16) {
        (self.diw_h_flop_on, self.diw_h_flop_off)
    }

    /// Display window edges as decoded from DIWSTRT and DIWSTOP:
    /// `(vstrt, vstop, hstrt, hstop)`.
    #[must_use]
    pub fn diw_edges(&self) -> (i16, i16, i16, i16) {
        (self.diw_vstrt, self.diw_vstop, self.diw_hstrt, self.diw_hstop)
    }

    /// Bitplane DMA area of the current line as `[start, stop)` in lores
    /// and hires mode.
    #[must_use]
    pub fn dma_window(&self) -> ((i16, i16), (i16, i16)) {
        (
            (self.dma_strt_lores, self.dma_stop_lores),
            (self.dma_strt_hires, self.dma_stop_hires),
        )
    }

    pub(crate) fn inc_chip_ptr(&self, ptr: u32, delta: i32) -> u32 {
        ptr.wrapping_add_signed(delta) & self.chip_mask
    }
}

impl Default for Agnus {
    fn default() -> Self {
        Self::new(AgnusConfig::default())
    }
}
