//! Line and frame timing: the data fetch window, the live event tables and
//! the HSYNC/VSYNC handlers.

use super::{Agnus, HsyncActions};
use crate::beam::{HPOS_CNT, HPOS_MAX, LINES_LONG_FRAME, LINES_SHORT_FRAME, dma_cycles};
use crate::events::{EventId, Slot};
use crate::host::Host;
use crate::regs::{DMACON_DMAEN, DMACON_SPREN};
use crate::tables::LAST_FETCH_UNIT;

/// First slot a fetch unit may start in.
const DDF_FIRST: i16 = 0x18;
/// No fetch unit ends beyond this slot.
const DDF_LIMIT: i16 = 0xE0;
/// First line with sprite DMA.
const FIRST_SPRITE_LINE: u16 = 25;

impl Agnus {
    //
    // Data fetch window
    //

    pub(crate) fn compute_ddf_window(&mut self) {
        self.compute_ddf_strt();
        self.compute_ddf_stop();
    }

    /// Aligns the start to the next fetch unit boundary.
    fn compute_ddf_strt(&mut self) {
        let strt = self.ddfstrt_reached;
        let hires_shift = (4 - (strt & 0b11)) & 0b11;
        let lores_shift = (8 - (strt & 0b111)) & 0b111;

        self.dma_strt_hires = (strt + hires_shift).max(DDF_FIRST);
        self.dma_strt_lores = (strt + lores_shift).max(DDF_FIRST);
    }

    /// Ends the window after the number of fetch units that fit between
    /// DDFSTRT and DDFSTOP. A stop position before the start yields an
    /// empty window.
    fn compute_ddf_stop(&mut self) {
        let strt = self.ddfstrt_reached.max(DDF_FIRST);
        let stop = self.ddfstop_reached.min(LAST_FETCH_UNIT as i16);
        let fetch_units = ((stop - strt) + 15) >> 3;

        self.dma_stop_lores = (self.dma_strt_lores + 8 * fetch_units).min(DDF_LIMIT).max(self.dma_strt_lores);
        self.dma_stop_hires = (self.dma_strt_hires + 8 * fetch_units).min(DDF_LIMIT).max(self.dma_strt_hires);

        log::trace!(
            "DDF window lores [{:02X},{:02X}) hires [{:02X},{:02X})",
            self.dma_strt_lores,
            self.dma_stop_lores,
            self.dma_strt_hires,
            self.dma_stop_hires
        );
    }

    #[must_use]
    pub fn in_lores_dma_area(&self, h: usize) -> bool {
        (self.dma_strt_lores..self.dma_stop_lores).contains(&(h as i16))
    }

    #[must_use]
    pub fn in_hires_dma_area(&self, h: usize) -> bool {
        (self.dma_strt_hires..self.dma_stop_hires).contains(&(h as i16))
    }

    /// `true` while the beam is in the last fetch unit of the window, where
    /// the modulos are added.
    pub(crate) fn in_last_fetch_unit(&self) -> bool {
        let h = self.pos.h as i16;
        if self.hires() { h >= self.dma_stop_hires - 4 } else { h >= self.dma_stop_lores - 8 }
    }

    //
    // Bitplane event table
    //

    /// Rebuilds the bitplane table from `first` to the end of the line for
    /// the given register values.
    pub(crate) fn allocate_bpl_slots(&mut self, dmacon: u16, bplcon0: u16, first: u16) {
        let last = usize::from(HPOS_MAX) - 1;
        let first = usize::from(first).min(last + 1);

        let hires = Self::hires_of(bplcon0);
        let channels =
            if self.in_bpl_dma_line_with(dmacon, bplcon0) { Self::bpu_of(bplcon0) } else { 0 };
        let row = self.tables.bpl_row(hires, channels);

        for i in first..=last {
            let in_area =
                if hires { self.in_hires_dma_area(i) } else { self.in_lores_dma_area(i) };
            self.bpl_line.set(i, if in_area { row[i] } else { EventId::None });
        }
        self.bpl_line.update_jump_table(usize::from(HPOS_MAX));
    }

    /// Fills the fetch window with the current plane configuration.
    pub(crate) fn switch_bpl_dma_on(&mut self) {
        let hires = self.hires();
        let (start, stop) = if hires {
            (self.dma_strt_hires, self.dma_stop_hires)
        } else {
            (self.dma_strt_lores, self.dma_stop_lores)
        };
        let start = (start.max(0) as usize).min(usize::from(HPOS_MAX));
        let stop = (stop.max(0) as usize).clamp(start, usize::from(HPOS_MAX));

        for i in (0..start).chain(stop..usize::from(HPOS_MAX)) {
            self.bpl_line.set(i, EventId::None);
        }
        let bpu = self.bpu();
        self.bpl_line.copy_from(self.tables.bpl_row(hires, bpu), start..stop);
        self.bpl_line.update_jump_table(usize::from(HPOS_MAX));
    }

    pub(crate) fn switch_bpl_dma_off(&mut self) {
        // Nothing to do if only the end-of-line marker is left
        if self.bpl_line.next_after(0) == Some(usize::from(HPOS_MAX)) {
            return;
        }
        self.bpl_line.clear(EventId::BplEol);
        self.schedule_next_bpl_event();
    }

    pub(crate) fn update_bpl_dma(&mut self) {
        if self.in_bpl_dma_line() {
            self.switch_bpl_dma_on();
        } else {
            self.switch_bpl_dma_off();
        }
    }

    /// Re-reads the bitplane table at the current position.
    pub(crate) fn update_bpl_event(&mut self) {
        self.schedule_bpl_event_for_cycle(usize::from(self.pos.h));
    }

    //
    // Disk, audio and sprite event table
    //

    /// Copies the full DAS row for the given enable bits.
    pub(crate) fn update_das_dma(&mut self, das: u16) {
        debug_assert!(das < 64);
        self.das_line.copy_from(self.tables.das_row(das), 0..usize::from(HPOS_CNT));
        self.das_line.update_jump_table(usize::from(HPOS_MAX));
    }

    //
    // Scheduling from the live tables
    //

    pub(crate) fn schedule_next_bpl_event(&mut self) {
        let h = usize::from(self.pos.h);
        match self.bpl_line.next_after(h) {
            Some(next) => {
                let delta = dma_cycles((next - h) as i64);
                self.schedule_rel(Slot::Bpl, delta, self.bpl_line.event(next));
            }
            None => self.scheduler.cancel(Slot::Bpl),
        }
    }

    pub(crate) fn schedule_bpl_event_for_cycle(&mut self, h: usize) {
        debug_assert!(h >= usize::from(self.pos.h));
        let id = self.bpl_line.events().get(h).copied().unwrap_or_default();
        if id.is_none() {
            self.schedule_next_bpl_event();
        } else {
            let delta = dma_cycles((h - usize::from(self.pos.h)) as i64);
            self.schedule_rel(Slot::Bpl, delta, id);
        }
    }

    pub(crate) fn schedule_next_das_event(&mut self) {
        let h = usize::from(self.pos.h);
        match self.das_line.next_after(h) {
            Some(next) => {
                let delta = dma_cycles((next - h) as i64);
                self.schedule_rel(Slot::Das, delta, self.das_line.event(next));
            }
            None => self.scheduler.cancel(Slot::Das),
        }
    }

    pub(crate) fn schedule_das_event_for_cycle(&mut self, h: usize) {
        debug_assert!(h >= usize::from(self.pos.h));
        let id = self.das_line.events().get(h).copied().unwrap_or_default();
        if id.is_none() {
            self.schedule_next_das_event();
        } else {
            let delta = dma_cycles((h - usize::from(self.pos.h)) as i64);
            self.schedule_rel(Slot::Das, delta, id);
        }
    }

    //
    // Sync handlers
    //

    pub(crate) fn hsync_handler(&mut self, host: &mut impl Host) {
        debug_assert!(self.pos.h == 0 || self.pos.h == HPOS_CNT);

        host.end_line(self.pos.v);
        for channel in 0..4 {
            self.run_audio(channel, host);
        }
        host.cia_b_tod();

        self.pos.h = 0;
        self.pos.v += 1;
        if self.pos.v >= self.frame.num_lines {
            self.vsync_handler(host);
        }

        self.dmacon_at_ddfstrt = self.dmacon;
        self.bplcon0_at_ddfstrt = self.bplcon0;

        // Vertical display window flip-flop
        let v = self.pos.v as i16;
        if v == self.diw_vstrt && !self.diw_v_flop {
            self.diw_v_flop = true;
            self.update_bpl_dma();
        }
        if v == self.diw_vstop && self.diw_v_flop {
            self.diw_v_flop = false;
            self.update_bpl_dma();
        }

        // Horizontal flip-flop: the last transition of the previous line wins
        self.diw_h_flop = if self.diw_h_flop_off != -1 {
            false
        } else if self.diw_h_flop_on != -1 {
            true
        } else {
            self.diw_h_flop
        };
        self.diw_h_flop_on = self.diw_hstrt;
        self.diw_h_flop_off = self.diw_hstop;

        self.ddf_v_flop = !self.in_last_rasterline() && self.diw_v_flop;
        self.ddfstrt_reached = self.ddfstrt as i16;
        self.ddfstop_reached = self.ddfstop as i16;

        let bpl_dma_line = self.in_bpl_dma_line();
        if bpl_dma_line != self.old_bpl_dma_line {
            self.hsync_actions.insert(HsyncActions::UPDATE_BPL_TABLE);
            self.old_bpl_dma_line = bpl_dma_line;
        }

        let das = self.das_enables(self.dmacon);
        if das != self.dma_das {
            self.hsync_actions.insert(HsyncActions::UPDATE_DAS_TABLE);
            self.dma_das = das;
        }

        let actions = self.hsync_actions.take();
        if actions.contains(HsyncActions::COMPUTE_DDF_WINDOW) {
            self.compute_ddf_window();
        }
        if actions.contains(HsyncActions::UPDATE_BPL_TABLE) {
            self.update_bpl_dma();
        }
        if actions.contains(HsyncActions::UPDATE_DAS_TABLE) {
            self.update_das_dma(self.dma_das);
        }

        self.bus.clear();
        self.schedule_next_bpl_event();
        self.schedule_next_das_event();

        host.begin_line(self.pos.v);
    }

    /// DAS enable bits `dmacon` grants in the current line. Sprite DMA is
    /// held off above the first sprite line and in the last line.
    pub(crate) fn das_enables(&self, dmacon: u16) -> u16 {
        if dmacon & DMACON_DMAEN == 0 {
            return 0;
        }
        let das = dmacon & 0x3F;
        if self.pos.v < FIRST_SPRITE_LINE || self.in_last_rasterline() {
            das & !DMACON_SPREN
        } else {
            das
        }
    }

    fn vsync_handler(&mut self, host: &mut impl Host) {
        self.frame.nr += 1;
        self.frame.interlaced = self.lace();
        self.lof = if self.frame.interlaced { !self.lof } else { true };
        self.frame.num_lines = if self.lof { LINES_LONG_FRAME } else { LINES_SHORT_FRAME };

        self.pos.v = 0;
        self.diw_v_flop = false;
        self.diw_h_flop = true;

        host.cia_a_tod();
        self.blitter_vsync();
        self.copper_vsync();
        host.begin_frame(self.frame.interlaced);
        host.disk_vsync();

        if self.inspector.is_requested() {
            let snapshot = self.inspect();
            self.inspector.publish(snapshot);
        }

        log::trace!("Frame {} ({} lines)", self.frame.nr, self.frame.num_lines);
    }
}
