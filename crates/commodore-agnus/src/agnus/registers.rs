//! Register reads and writes.
//!
//! Writes that steer the DMA engine do not take effect immediately: they are
//! queued in the change recorder and applied by the `Reg` slot a few cycles
//! later, which is where the `set_*` handlers below run.

use super::{Agnus, HsyncActions};
use crate::beam::{Cycle, HPOS_CNT, HPOS_MAX, LINES_LONG_FRAME, LINES_SHORT_FRAME, dma_cycles};
use crate::events::{EventId, Slot};
use crate::host::Host;
use crate::recorder::ChipReg;
use crate::regs::{
    AUD_DAT, AUD_LCH, AUD_LCL, AUD_LEN, AUD_PER, AUD_STRIDE, AUD_VOL, AUD0LCH, BLTADAT, BLTAFWM,
    BLTALWM, BLTAMOD, BLTAPTH, BLTAPTL, BLTBDAT, BLTBMOD, BLTBPTH, BLTBPTL, BLTCDAT, BLTCMOD,
    BLTCON0, BLTCON0L, BLTCON1, BLTCPTH, BLTCPTL, BLTDMOD, BLTDPTH, BLTDPTL, BLTSIZE, BLTSIZH,
    BLTSIZV, BPL1MOD, BPL1PTH, BPL2MOD, BPL6PTL, BPLCON0, COP1LCH, COP1LCL, COP2LCH, COP2LCL,
    COPCON, COPJMP1, COPJMP2, DDFSTOP, DDFSTRT, DIWSTOP, DIWSTRT, DMACON, DMACON_BBUSY,
    DMACON_BLTEN, DMACON_BPLEN, DMACON_BZERO, DMACON_COPEN, DMACON_DMAEN, DMACON_SETCLR,
    DMACON_WRITABLE, DMACONR, DSKPTH, DSKPTL, PokeSource, SPR_STRIDE, SPR0POS, SPR0PTH, SPR7DATB,
    SPR7PTL, VHPOSR, VHPOSW, VPOSR, VPOSW, replace_hi_word, replace_lo_word,
};

/// Delay of most recorded writes.
const REG_DELAY: Cycle = dma_cycles(2);
/// BPLCON0 takes longer to reach the fetch logic.
const BPLCON0_DELAY: Cycle = dma_cycles(4);

impl Agnus {
    /// Reads a register Agnus drives, `None` for every other offset.
    #[must_use]
    pub fn peek(&self, reg: u16) -> Option<u16> {
        match reg & 0x1FE {
            DMACONR => Some(self.peek_dmaconr()),
            VPOSR => Some(self.peek_vposr()),
            VHPOSR => Some(self.peek_vhposr()),
            _ => None,
        }
    }

    #[must_use]
    pub fn peek_dmaconr(&self) -> u16 {
        let mut result = self.dmacon;
        if self.blitter.bbusy {
            result |= DMACON_BBUSY;
        }
        if self.blitter.bzero {
            result |= DMACON_BZERO;
        }
        result
    }

    /// LOF in bit 15, chip identification in bits 14..8, V8 in bit 0.
    #[must_use]
    pub fn peek_vposr(&self) -> u16 {
        let mut result = self.pos.v >> 8;
        if self.lof {
            result |= 0x8000;
        }
        result | (self.revision().id_bits() << 8)
    }

    /// V7..V0 and H8..H1. The counter is read four cycles ahead of the
    /// beam, and the first two slots of a line still report the previous
    /// line.
    #[must_use]
    pub fn peek_vhposr(&self) -> u16 {
        let mut h = self.pos.h + 4;
        let mut v = self.pos.v;

        if h > HPOS_MAX {
            h -= HPOS_CNT;
            v += 1;
            if v >= self.frame.num_lines {
                v = 0;
            }
        }

        if h <= 1 {
            v = if v == 0 {
                if self.lof { LINES_SHORT_FRAME } else { LINES_LONG_FRAME }
            } else {
                v - 1
            };
        }

        (v << 8) | h
    }

    /// Writes a register. Returns `false` if the write must also reach
    /// another chip (or Agnus does not handle the offset at all).
    pub fn poke(&mut self, reg: u16, value: u16, source: PokeSource) -> bool {
        log::trace!("poke {reg:03X} = {value:04X} ({source:?}) at {}", self.pos);

        match reg & 0x1FE {
            DSKPTH => self.dsk_pt = replace_hi_word(self.dsk_pt, value) & self.chip_mask,
            DSKPTL => self.dsk_pt = replace_lo_word(self.dsk_pt, value),
            VPOSW | VHPOSW => log::debug!("ignoring beam counter write {reg:03X} = {value:04X}"),
            COPCON => self.copper.write_copcon(value),

            BLTCON0 => self.blitter.write_bltcon0(value),
            BLTCON0L => {
                if self.revision().is_ecs() {
                    self.blitter.write_bltcon0l(value);
                }
            }
            BLTCON1 => self.blitter.write_bltcon1(value),
            BLTAFWM => self.blitter.afwm = value,
            BLTALWM => self.blitter.alwm = value,
            BLTAPTH => self.blitter.apt = replace_hi_word(self.blitter.apt, value) & self.chip_mask,
            BLTAPTL => self.blitter.apt = replace_lo_word(self.blitter.apt, value),
            BLTBPTH => self.blitter.bpt = replace_hi_word(self.blitter.bpt, value) & self.chip_mask,
            BLTBPTL => self.blitter.bpt = replace_lo_word(self.blitter.bpt, value),
            BLTCPTH => self.blitter.cpt = replace_hi_word(self.blitter.cpt, value) & self.chip_mask,
            BLTCPTL => self.blitter.cpt = replace_lo_word(self.blitter.cpt, value),
            BLTDPTH => self.blitter.dpt = replace_hi_word(self.blitter.dpt, value) & self.chip_mask,
            BLTDPTL => self.blitter.dpt = replace_lo_word(self.blitter.dpt, value),
            BLTAMOD => self.blitter.amod = (value & 0xFFFE) as i16,
            BLTBMOD => self.blitter.bmod = (value & 0xFFFE) as i16,
            BLTCMOD => self.blitter.cmod = (value & 0xFFFE) as i16,
            BLTDMOD => self.blitter.dmod = (value & 0xFFFE) as i16,
            BLTADAT => self.blitter.anew = value,
            BLTBDAT => self.blitter.bnew = value,
            BLTCDAT => self.blitter.chold = value,
            BLTSIZE => {
                self.blitter.write_bltsize(value);
                self.start_blit();
            }
            BLTSIZV => {
                if self.revision().is_ecs() {
                    self.blitter.write_bltsizv(value);
                }
            }
            BLTSIZH => {
                if self.revision().is_ecs() {
                    self.blitter.write_bltsizh(value);
                    self.start_blit();
                }
            }

            COP1LCH => self.copper.cop1lc = replace_hi_word(self.copper.cop1lc, value) & self.chip_mask,
            COP1LCL => self.copper.cop1lc = replace_lo_word(self.copper.cop1lc, value),
            COP2LCH => self.copper.cop2lc = replace_hi_word(self.copper.cop2lc, value) & self.chip_mask,
            COP2LCL => self.copper.cop2lc = replace_lo_word(self.copper.cop2lc, value),
            COPJMP1 => self.schedule_rel(Slot::Cop, dma_cycles(1), EventId::CopJmp1),
            COPJMP2 => self.schedule_rel(Slot::Cop, dma_cycles(1), EventId::CopJmp2),

            DIWSTRT => self.record_change(REG_DELAY, ChipReg::Diwstrt, value),
            DIWSTOP => self.record_change(REG_DELAY, ChipReg::Diwstop, value),
            DDFSTRT => {
                let value = value & self.revision().ddf_mask();
                self.record_change(REG_DELAY, ChipReg::Ddfstrt, value);
            }
            DDFSTOP => {
                let value = value & self.revision().ddf_mask();
                self.record_change(REG_DELAY, ChipReg::Ddfstop, value);
            }
            DMACON => self.record_change(REG_DELAY, ChipReg::Dmacon, value),

            r if (AUD0LCH..AUD0LCH + 4 * AUD_STRIDE).contains(&r) => {
                let channel = &mut self.audio[usize::from((r - AUD0LCH) / AUD_STRIDE)];
                match (r - AUD0LCH) % AUD_STRIDE {
                    AUD_LCH => channel.write_lch(value, self.chip_mask),
                    AUD_LCL => channel.write_lcl(value, self.chip_mask),
                    AUD_LEN => channel.write_len(value),
                    AUD_PER => channel.write_per(value),
                    AUD_VOL => channel.write_vol(value),
                    AUD_DAT => channel.write_dat(value),
                    _ => return false,
                }
            }

            // Pointer writes land two cycles late, and a write just ahead of
            // the last fetch of its plane is dropped, as in the hardware pipeline
            r if (BPL1PTH..=BPL6PTL).contains(&r) => {
                let plane = usize::from((r - BPL1PTH) / 4);
                if self.skip_bplxpt(plane) {
                    log::debug!("BPL{}PT write {value:04X} is lost at {}", plane + 1, self.pos);
                } else if r & 2 == 0 {
                    self.record_change(REG_DELAY, ChipReg::BplPtHi(plane as u8), value);
                } else {
                    self.record_change(REG_DELAY, ChipReg::BplPtLo(plane as u8), value);
                }
            }
            BPLCON0 => {
                if value != self.bplcon0 {
                    self.record_change(BPLCON0_DELAY, ChipReg::Bplcon0, value);
                }
                return false;
            }
            BPL1MOD => self.record_change(REG_DELAY, ChipReg::Bpl1Mod, value),
            BPL2MOD => self.record_change(REG_DELAY, ChipReg::Bpl2Mod, value),

            r if (SPR0PTH..=SPR7PTL).contains(&r) => {
                let nr = usize::from((r - SPR0PTH) / 4);
                self.spr_pt[nr] = if r & 2 == 0 {
                    replace_hi_word(self.spr_pt[nr], value) & self.chip_mask
                } else {
                    replace_lo_word(self.spr_pt[nr], value)
                };
            }
            r if (SPR0POS..=SPR7DATB).contains(&r) => {
                let nr = usize::from((r - SPR0POS) / SPR_STRIDE);
                let v = self.sprite_compare_line();
                match (r - SPR0POS) % SPR_STRIDE {
                    0 => self.sprites[nr].write_pos(value, v),
                    2 => self.sprites[nr].write_ctl(value, v),
                    _ => {}
                }
                // Denise keeps its own copy of the sprite registers
                return false;
            }

            _ => return false,
        }
        true
    }

    fn record_change(&mut self, delay: Cycle, reg: ChipReg, value: u16) {
        self.recorder.add(self.clock + delay, reg, value);
        if let Some(cycle) = self.recorder.next_cycle() {
            self.scheduler.schedule_abs(Slot::Reg, cycle, EventId::RegChange);
        }
    }

    /// A pointer write is lost if the plane is fetched in the next cycle and
    /// no fetch follows in the cycle after, where the new value would land.
    fn skip_bplxpt(&self, plane: usize) -> bool {
        let h = usize::from(self.pos.h);
        let next = self.bpl_line.events().get(h + 1).copied().unwrap_or_default();
        let after = self.bpl_line.events().get(h + 2).copied().unwrap_or_default();
        next.bitplane() == Some(plane) && after.is_none()
    }

    /// Applies a recorded change. Runs in the `Reg` slot.
    pub(crate) fn apply_change(&mut self, reg: ChipReg, value: u16, host: &mut impl Host) {
        match reg {
            ChipReg::Dmacon => self.set_dmacon(self.dmacon, value, host),
            ChipReg::Diwstrt => self.set_diwstrt(value),
            ChipReg::Diwstop => self.set_diwstop(value),
            ChipReg::Ddfstrt => self.set_ddfstrt(value),
            ChipReg::Ddfstop => self.set_ddfstop(value),
            ChipReg::BplPtHi(plane) => {
                let plane = usize::from(plane);
                self.bpl_pt[plane] = replace_hi_word(self.bpl_pt[plane], value) & self.chip_mask;
            }
            ChipReg::BplPtLo(plane) => {
                let plane = usize::from(plane);
                self.bpl_pt[plane] = replace_lo_word(self.bpl_pt[plane], value);
            }
            ChipReg::Bpl1Mod => self.bpl1mod = (value & 0xFFFE) as i16,
            ChipReg::Bpl2Mod => self.bpl2mod = (value & 0xFFFE) as i16,
            ChipReg::Bplcon0 => self.set_bplcon0(self.bplcon0, value),
        }
    }

    //
    // DMACON
    //

    /// Applies a DMACON write (SET/CLR in bit 15).
    pub(crate) fn set_dmacon(&mut self, old: u16, value: u16, host: &mut impl Host) {
        let new = if value & DMACON_SETCLR != 0 {
            (old | value) & DMACON_WRITABLE
        } else {
            (old & !value) & DMACON_WRITABLE
        };
        if old == new {
            return;
        }

        let h = self.pos.h as i16;
        if h + 2 < self.ddfstrt_reached {
            self.dmacon_at_ddfstrt = new;
        }

        let old_dmaen = old & DMACON_DMAEN != 0;
        let new_dmaen = new & DMACON_DMAEN != 0;
        let old_bplen = Self::dma_enabled(old, DMACON_BPLEN);
        let new_bplen = Self::dma_enabled(new, DMACON_BPLEN);
        let old_copen = Self::dma_enabled(old, DMACON_COPEN);
        let new_copen = Self::dma_enabled(new, DMACON_COPEN);
        let old_blten = Self::dma_enabled(old, DMACON_BLTEN);
        let new_blten = Self::dma_enabled(new, DMACON_BLTEN);
        let old_das = if old_dmaen { old & 0x3F } else { 0 };
        let new_das = if new_dmaen { new & 0x3F } else { 0 };

        // Audio channels are caught up before their enable bit changes
        for channel in 0..4 {
            if (old_das ^ new_das) & (1 << channel) != 0 {
                self.run_audio(channel, host);
            }
        }

        self.dmacon = new;
        host.dmacon_changed(old, new);

        if old_bplen != new_bplen {
            self.hsync_actions.insert(HsyncActions::UPDATE_BPL_TABLE);

            let first = (self.pos.h + 2).min(HPOS_MAX - 1);
            if new_bplen {
                if h + 2 < self.ddfstrt_reached
                    || Self::dma_enabled(self.dmacon_at_ddfstrt, DMACON_BPLEN)
                {
                    self.allocate_bpl_slots(new, self.bplcon0, first);
                    self.update_bpl_event();
                }
            } else {
                self.allocate_bpl_slots(new, self.bplcon0, first);
                self.update_bpl_event();
            }
        }

        if old_das != new_das {
            self.hsync_actions.insert(HsyncActions::UPDATE_DAS_TABLE);

            let h = usize::from(self.pos.h);
            let row = self.tables.das_row(self.das_enables(new));
            self.das_line.copy_from(row, h..usize::from(HPOS_CNT));
            self.das_line.update_jump_table(usize::from(HPOS_MAX));
            self.schedule_das_event_for_cycle(h);
        }

        if old_copen != new_copen {
            if new_copen {
                log::debug!("Copper DMA switched on at {}", self.pos);
                self.arm_copper();
            } else {
                log::debug!("Copper DMA switched off at {}", self.pos);
            }
        }

        if old_blten != new_blten {
            if new_blten {
                // A blit requested while DMA was off starts now
                if self.scheduler.id(Slot::Blt) == EventId::BltStart
                    && !self.scheduler.is_pending(Slot::Blt)
                {
                    self.schedule_rel(Slot::Blt, dma_cycles(1), EventId::BltStart);
                }
            } else {
                self.kill_blit();
            }
        }

        for channel in 0..4 {
            let bit = 1 << channel;
            if old_das & bit == 0 && new_das & bit != 0 {
                self.audio[channel].enable_dma();
            }
            if old_das & bit != 0 && new_das & bit == 0 {
                self.audio[channel].disable_dma();
            }
        }
    }

    //
    // Display window
    //

    pub(crate) fn set_diwstrt(&mut self, value: u16) {
        // 15 14 13 12 11 10 09 08 07 06 05 04 03 02 01 00
        // V7 V6 V5 V4 V3 V2 V1 V0 H7 H6 H5 H4 H3 H2 H1 H0, H8 = 0, V8 = 0
        self.diwstrt = value;

        let new_vstrt = (value >> 8) as i16;
        let mut new_hstrt = (value & 0xFF) as i16;
        if new_hstrt < 2 {
            new_hstrt = -1;
        }

        let cur = 2 * self.pos.h as i16;

        // Flip-flop not reached yet, new position still ahead
        if cur < self.diw_hstrt && cur < new_hstrt {
            self.diw_h_flop_on = new_hstrt;
        }
        // Flip-flop not reached yet, new position already passed
        if new_hstrt < cur && cur < self.diw_hstrt {
            self.diw_h_flop_on = -1;
        }

        self.diw_vstrt = new_vstrt;
        self.diw_hstrt = new_hstrt;
    }

    pub(crate) fn set_diwstop(&mut self, value: u16) {
        // 15 14 13 12 11 10 09 08 07 06 05 04 03 02 01 00
        // V7 V6 V5 V4 V3 V2 V1 V0 H7 H6 H5 H4 H3 H2 H1 H0, H8 = 1, V8 = !V7
        self.diwstop = value;

        let new_vstop = ((value >> 8) | if value & 0x8000 != 0 { 0 } else { 0x100 }) as i16;
        let mut new_hstop = ((value & 0xFF) | 0x100) as i16;
        if new_hstop > 0x1C7 {
            new_hstop = -1;
        }

        let cur = 2 * self.pos.h as i16;

        if cur < self.diw_hstop && cur < new_hstop {
            self.diw_h_flop_off = new_hstop;
        }
        if new_hstop < cur && cur < self.diw_hstop {
            self.diw_h_flop_off = -1;
        }

        self.diw_vstop = new_vstop;
        self.diw_hstop = new_hstop;
    }

    //
    // Data fetch window
    //

    pub(crate) fn set_ddfstrt(&mut self, value: u16) {
        self.ddfstrt = value;
        self.hsync_actions.insert(HsyncActions::COMPUTE_DDF_WINDOW);
        self.hsync_actions.insert(HsyncActions::UPDATE_BPL_TABLE);

        let h = self.pos.h as i16;
        let ddfstrt = value as i16;

        // Only a start position that has not been passed matters this line
        if h < self.ddfstrt_reached {
            if ddfstrt <= h + 2 {
                self.ddfstrt_reached = -1;
                self.switch_bpl_dma_off();
            } else {
                self.ddfstrt_reached = ddfstrt;
                self.compute_ddf_window();
                self.update_bpl_dma();
                self.schedule_next_bpl_event();
            }
        }
    }

    pub(crate) fn set_ddfstop(&mut self, value: u16) {
        self.ddfstop = value;
        self.hsync_actions.insert(HsyncActions::COMPUTE_DDF_WINDOW);
        self.hsync_actions.insert(HsyncActions::UPDATE_BPL_TABLE);

        let h = self.pos.h as i16;
        let ddfstop = value as i16;

        if h < self.ddfstop_reached || self.ddfstop_reached == -1 {
            if ddfstop <= h + 2 {
                self.ddfstop_reached = -1;
            } else {
                self.ddfstop_reached = ddfstop;
                if self.ddfstrt_reached >= 0 {
                    self.compute_ddf_window();
                    self.update_bpl_dma();
                    self.schedule_next_bpl_event();
                }
            }
        }
    }

    //
    // BPLCON0
    //

    pub(crate) fn set_bplcon0(&mut self, old: u16, new: u16) {
        let h = self.pos.h as i16;
        if h < self.ddfstrt_reached {
            self.bplcon0_at_ddfstrt = new;
        }

        self.hsync_actions.insert(HsyncActions::UPDATE_BPL_TABLE);

        // Resolution or plane count changed: rebuild the rest of the line
        if (old ^ new) & 0xF000 != 0 {
            let h = usize::from(self.pos.h);
            self.allocate_bpl_slots(self.dmacon, new, self.pos.h);
            self.schedule_bpl_event_for_cycle(h);
        }

        self.bplcon0 = new;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::RamHost;
    use crate::recorder::RegChange;

    #[test]
    fn dmaconr_reports_blitter_flags() {
        let mut agnus = Agnus::default();
        agnus.dmacon = 0x0240;
        agnus.blitter.bbusy = true;
        agnus.blitter.bzero = true;
        assert_eq!(agnus.peek(DMACONR), Some(0x6240));
    }

    #[test]
    fn vposr_carries_lof_and_chip_id() {
        let mut agnus = Agnus::default();
        agnus.pos.v = 0x105;
        assert_eq!(agnus.peek_vposr(), 0x8000 | 0x2000 | 1);
        agnus.lof = false;
        assert_eq!(agnus.peek_vposr(), 0x2001);
    }

    #[test]
    fn vhposr_runs_four_cycles_ahead() {
        let mut agnus = Agnus::default();
        agnus.pos.v = 0x30;
        agnus.pos.h = 0x40;
        assert_eq!(agnus.peek_vhposr(), 0x3044);

        // Early slots still report the previous line
        agnus.pos.h = HPOS_MAX - 2;
        assert_eq!(agnus.peek_vhposr(), 0x3001);
        agnus.pos.h = HPOS_MAX;
        assert_eq!(agnus.peek_vhposr(), 0x3103);
    }

    #[test]
    fn vhposr_wraps_line_zero_into_the_previous_frame() {
        let mut agnus = Agnus::default();
        agnus.pos.v = 312;
        agnus.pos.h = HPOS_MAX - 2;
        // Reading ahead wraps into line 0, which reports the previous frame
        assert_eq!(agnus.peek_vhposr(), 0x3801);
    }

    #[test]
    fn delayed_writes_land_two_cycles_later() {
        let mut agnus = Agnus::default();
        assert!(agnus.poke(DDFSTRT, 0x38, PokeSource::Cpu));
        assert_eq!(agnus.ddfstrt, 0);
        assert_eq!(
            agnus.pending_changes().next_cycle(),
            Some(agnus.clock + dma_cycles(2))
        );
        assert_eq!(agnus.slot(Slot::Reg).id, EventId::RegChange);
    }

    #[test]
    fn ddf_values_are_masked_per_revision() {
        let mut agnus = Agnus::new(crate::config::AgnusConfig {
            revision: crate::config::AgnusRevision::Agnus8367,
            ..Default::default()
        });
        agnus.poke(DDFSTOP, 0x00D2, PokeSource::Cpu);
        let mut recorder = agnus.pending_changes().clone();
        let change: Option<RegChange> = recorder.pop_due(crate::beam::NEVER - 1);
        assert_eq!(change.map(|c| c.value), Some(0xD0));
    }

    #[test]
    fn bplcon0_is_shared_with_denise() {
        let mut agnus = Agnus::default();
        assert!(!agnus.poke(BPLCON0, 0x1200, PokeSource::Copper));
        assert_eq!(agnus.pending_changes().len(), 1);
        // Rewriting the current value is not recorded
        assert!(!agnus.poke(BPLCON0, 0x0000, PokeSource::Cpu));
        assert_eq!(agnus.pending_changes().len(), 1);
    }

    #[test]
    fn unknown_registers_are_passed_on() {
        let mut agnus = Agnus::default();
        assert!(!agnus.poke(0x180, 0x0FFF, PokeSource::Copper));
        assert_eq!(agnus.peek(0x180), None);
    }

    #[test]
    fn audio_registers_reach_their_channel() {
        let mut agnus = Agnus::default();
        agnus.poke(0x0C0, 0x0001, PokeSource::Cpu);
        agnus.poke(0x0C2, 0x2345, PokeSource::Cpu);
        agnus.poke(0x0C8, 0x0050, PokeSource::Cpu);
        assert_eq!(agnus.audio[2].lc_latch, 0x0001_2344);
        assert_eq!(agnus.audio[2].vol_latch, 64);
        assert_eq!(agnus.audio[0].lc_latch, 0);
    }

    #[test]
    fn dmacon_set_and_clear() {
        let mut host = RamHost::new();
        let mut agnus = Agnus::default();
        agnus.set_dmacon(0, 0x8000 | DMACON_DMAEN | DMACON_COPEN, &mut host);
        assert_eq!(agnus.dmacon, DMACON_DMAEN | DMACON_COPEN);
        agnus.set_dmacon(agnus.dmacon, DMACON_COPEN, &mut host);
        assert_eq!(agnus.dmacon, DMACON_DMAEN);
        // Bits above BLTPRI are read-only
        agnus.set_dmacon(agnus.dmacon, 0xFFFF, &mut host);
        assert_eq!(agnus.dmacon, DMACON_WRITABLE);
    }

    #[test]
    fn diwstop_decodes_implicit_bits() {
        let mut agnus = Agnus::default();
        agnus.set_diwstop(0x2CC1);
        assert_eq!(agnus.diw_vstop, 0x12C);
        assert_eq!(agnus.diw_hstop, 0x1C1);
        agnus.set_diwstop(0xF4C8);
        assert_eq!(agnus.diw_vstop, 0xF4);
        assert_eq!(agnus.diw_hstop, -1);
    }
}
