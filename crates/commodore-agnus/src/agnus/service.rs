//! Slot services: what happens when a scheduler slot fires.

use super::{Agnus, DISK_ROTATE_INTERVAL};
use crate::beam::{Cycle, HPOS_CNT, cia_cycles, dma_cycles};
use crate::bus::BusOwner;
use crate::events::{EventId, Slot};
use crate::host::{DiskDirection, Host};
use crate::regs::INT_VERTB;

impl Agnus {
    /// Serves every slot due at `cycle`, primary slots in dispatch order
    /// and the secondary ones behind `Sec`.
    pub(crate) fn execute_events_until(&mut self, cycle: Cycle, host: &mut impl Host) {
        if self.scheduler.is_due(Slot::Reg, cycle) {
            self.service_reg_event(host);
        }
        if self.scheduler.is_due(Slot::Ras, cycle) {
            self.service_ras_event(host);
        }
        if self.scheduler.is_due(Slot::CiaA, cycle) {
            host.cia_a_execute();
            self.reschedule_rel(Slot::CiaA, cia_cycles(1));
        }
        if self.scheduler.is_due(Slot::CiaB, cycle) {
            host.cia_b_execute();
            self.reschedule_rel(Slot::CiaB, cia_cycles(1));
        }
        if self.scheduler.is_due(Slot::Bpl, cycle) {
            self.service_bpl_event(host);
        }
        if self.scheduler.is_due(Slot::Das, cycle) {
            self.service_das_event(host);
        }
        if self.scheduler.is_due(Slot::Cop, cycle) {
            self.service_cop_event(host);
        }
        if self.scheduler.is_due(Slot::Blt, cycle) {
            self.service_blt_event(host);
        }

        if self.scheduler.is_due(Slot::Sec, cycle) {
            if self.scheduler.is_due(Slot::Dsk, cycle) {
                host.disk_rotate();
                self.reschedule_rel(Slot::Dsk, DISK_ROTATE_INTERVAL);
            }
            if self.scheduler.is_due(Slot::Vbl, cycle) {
                self.service_vbl_event(host);
            }
            if self.scheduler.is_due(Slot::Irq, cycle) {
                self.service_irq_event(host);
            }
        }

        self.scheduler.refresh_next_trigger();
    }

    fn service_reg_event(&mut self, host: &mut impl Host) {
        while let Some(change) = self.recorder.pop_due(self.clock) {
            self.apply_change(change.reg, change.value, host);
        }
        match self.recorder.next_cycle() {
            Some(cycle) => self.scheduler.schedule_abs(Slot::Reg, cycle, EventId::RegChange),
            None => self.scheduler.cancel(Slot::Reg),
        }
    }

    fn service_ras_event(&mut self, host: &mut impl Host) {
        debug_assert_eq!(self.scheduler.id(Slot::Ras), EventId::RasHsync);
        self.hsync_handler(host);
        self.reschedule_rel(Slot::Ras, dma_cycles(i64::from(HPOS_CNT)));
    }

    fn service_bpl_event(&mut self, host: &mut impl Host) {
        match self.scheduler.id(Slot::Bpl) {
            EventId::BplLores(plane) | EventId::BplHires(plane) => {
                let plane = usize::from(plane);
                let value = self.do_bitplane_dma(plane, host);
                host.bitplane_word(plane, value);
                if self.in_last_fetch_unit() {
                    self.add_bpl_mod(plane);
                }
            }
            EventId::BplEol => debug_assert_eq!(self.pos.h, crate::beam::HPOS_MAX),
            id => debug_assert!(false, "unexpected BPL event {id:?}"),
        }
        self.schedule_next_bpl_event();
    }

    fn service_das_event(&mut self, host: &mut impl Host) {
        match self.scheduler.id(Slot::Das) {
            EventId::DasRefresh => {
                let h = usize::from(self.pos.h);
                for slot in [h, h + 2, h + 4] {
                    self.bus.claim(slot, BusOwner::Refresh);
                    self.stats.record(BusOwner::Refresh);
                }
            }
            EventId::DasDisk(_) => {
                if self.dsk_dma() {
                    match host.disk_dma_direction() {
                        Some(DiskDirection::Read) => {
                            if let Some(value) = host.disk_read_word() {
                                self.do_disk_dma_write(value, host);
                            }
                        }
                        Some(DiskDirection::Write) => {
                            let value = self.do_disk_dma_read(host);
                            host.disk_write_word(value);
                        }
                        None => {}
                    }
                }
            }
            EventId::DasAudio(channel) => self.run_audio(usize::from(channel), host),
            EventId::DasSpriteFirst(nr) => self.execute_first_sprite_cycle(usize::from(nr), host),
            EventId::DasSpriteSecond(nr) => self.execute_second_sprite_cycle(usize::from(nr), host),
            EventId::DasSdma => self.update_sprite_dma(),
            id => debug_assert!(false, "unexpected DAS event {id:?}"),
        }
        self.schedule_next_das_event();
    }

    fn service_vbl_event(&mut self, host: &mut impl Host) {
        host.raise_interrupt(INT_VERTB);
        self.reschedule_rel(Slot::Vbl, self.cycles_in_frame());
    }

    fn service_irq_event(&mut self, host: &mut impl Host) {
        let pending = self.scheduler.data(Slot::Irq);
        for bit in (0..16u8).filter(|bit| pending & (1 << bit) != 0) {
            host.raise_interrupt(bit);
        }
        self.scheduler.cancel(Slot::Irq);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::RamHost;
    use crate::regs::{DMACON, DMACON_AUD2EN, DMACON_DMAEN, DMACON_SETCLR, INT_BLIT, PokeSource};

    #[test]
    fn refresh_claims_three_slots_per_line() {
        let mut host = RamHost::new();
        let mut agnus = Agnus::default();
        agnus.execute_until(dma_cycles(0x10), &mut host);
        assert_eq!(agnus.bus().owner(0x01), BusOwner::Refresh);
        assert_eq!(agnus.bus().owner(0x03), BusOwner::Refresh);
        assert_eq!(agnus.bus().owner(0x05), BusOwner::Refresh);
        assert_eq!(agnus.stats().get(BusOwner::Refresh), 3);
    }

    #[test]
    fn vertb_is_raised_once_per_frame() {
        let mut host = RamHost::new();
        let mut agnus = Agnus::default();
        agnus.execute_frame(&mut host);
        agnus.execute_frame(&mut host);
        assert_eq!(host.irqs.iter().filter(|&&bit| bit == INT_VERTB).count(), 2);
    }

    #[test]
    fn irq_slot_raises_every_merged_bit() {
        let mut host = RamHost::new();
        let mut agnus = Agnus::default();
        agnus.schedule_irq(INT_BLIT, dma_cycles(4));
        agnus.schedule_irq(4, dma_cycles(2));
        assert_eq!(agnus.slot(Slot::Irq).trigger, dma_cycles(2));

        agnus.execute_until(dma_cycles(3), &mut host);
        host.irqs.retain(|&bit| bit != INT_VERTB);
        assert_eq!(host.irqs, [4, INT_BLIT]);
        assert!(!agnus.scheduler.is_pending(Slot::Irq));
    }

    #[test]
    fn recorded_writes_apply_in_the_reg_slot() {
        let mut host = RamHost::new();
        let mut agnus = Agnus::default();
        agnus.poke(DMACON, DMACON_SETCLR | DMACON_DMAEN | DMACON_AUD2EN, PokeSource::Cpu);
        agnus.execute_until(dma_cycles(2), &mut host);
        assert_eq!(agnus.dmacon, 0);
        agnus.execute_until(dma_cycles(3), &mut host);
        assert_eq!(agnus.dmacon, DMACON_DMAEN | DMACON_AUD2EN);
        assert!(agnus.audio[2].dma_enabled());
        assert_eq!(agnus.das_events().event(0x11), EventId::DasAudio(2));
        assert!(!agnus.scheduler.is_pending(Slot::Reg));
    }
}
