//! Bus arbitration between the CPU, the copper and the blitter.
//!
//! Fixed DMA (refresh, disk, audio, sprites, bitplanes) never asks: it is
//! dispatched before anything else in a cycle and simply stamps the bus.

use super::Agnus;
use crate::beam::{HPOS_MAX, as_cpu_cycles, dma_cycles};
use crate::bus::BusOwner;
use crate::host::Host;

/// Horizontal position in which the copper never gets the bus.
const COPPER_BLOCKED_HPOS: u16 = 0xE0;

impl Agnus {
    #[must_use]
    pub fn bus_is_free(&self, owner: BusOwner) -> bool {
        let h = usize::from(self.pos.h);
        match owner {
            BusOwner::Copper => self.bus.is_free(h),
            BusOwner::Blitter => {
                // The CPU wins if it has been blocked for too long
                if self.bls && !self.bltpri() {
                    return false;
                }
                self.bus.is_free(h)
            }
            _ => {
                debug_assert!(false, "{owner:?} does not arbitrate");
                false
            }
        }
    }

    /// Claims the current slot for the copper or the blitter.
    pub fn allocate_bus(&mut self, owner: BusOwner) -> bool {
        if !self.bus_is_free(owner) {
            return false;
        }
        self.bus.claim(usize::from(self.pos.h), owner);
        true
    }

    /// `true` if copper DMA is on and the current slot is free.
    #[must_use]
    pub fn copper_can_run(&self) -> bool {
        self.cop_dma() && self.bus_is_free(BusOwner::Copper)
    }

    /// Like [`Self::copper_can_run`], but also honours the slot the copper
    /// can never use.
    #[must_use]
    pub fn copper_can_do_dma(&self) -> bool {
        self.pos.h != COPPER_BLOCKED_HPOS && self.copper_can_run()
    }

    /// Runs Agnus until the CPU can access the bus in the cycle it wants.
    ///
    /// The cycle being checked is the one Agnus has just executed. Each
    /// blocked cycle becomes CPU wait states, and BLS is asserted once the
    /// CPU has been held off for two cycles in a row.
    pub fn execute_until_bus_is_free(&mut self, host: &mut impl Host) {
        let mut posh = if self.pos.h == 0 { HPOS_MAX } else { self.pos.h - 1 };

        if !self.bus.is_free(usize::from(posh)) {
            let mut delay = 0;
            loop {
                posh = self.pos.h;
                self.execute(host);
                delay += 1;
                if delay == 2 {
                    self.bls = true;
                }
                if self.bus.is_free(usize::from(posh)) {
                    break;
                }
            }
            self.bls = false;

            let wait = as_cpu_cycles(dma_cycles(delay));
            log::trace!("CPU blocked for {delay} DMA cycles at {}", self.pos);
            host.add_wait_states(wait);
        }

        self.bus.claim(usize::from(posh), BusOwner::Cpu);
        self.stats.record(BusOwner::Cpu);
    }
}
