//! Debugger snapshots.
//!
//! A front end asks for a snapshot through an [`Inspector`] handle from any
//! thread. Agnus copies its state into the shared slot at the next VSYNC, so
//! the only lock on the emulation thread is one short copy per frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::agnus::Agnus;
use crate::beam::{Beam, Cycle};
use crate::blitter::microcode::Microcode;
use crate::bus::BusStats;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgnusInfo {
    pub clock: Cycle,
    pub pos: Beam,
    pub frame: u64,
    pub lof: bool,
    pub dmacon: u16,
    pub bplcon0: u16,
    pub diwstrt: u16,
    pub diwstop: u16,
    pub ddfstrt: u16,
    pub ddfstop: u16,
    pub bpl1mod: i16,
    pub bpl2mod: i16,
    pub bpl_pt: [u32; 6],
    pub spr_pt: [u32; 8],
    pub dsk_pt: u32,
    pub aud_pt: [u32; 4],
    pub cop1lc: u32,
    pub cop2lc: u32,
    pub copper_pc: u32,
    pub next_trigger: Cycle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlitterInfo {
    pub bltcon0: u16,
    pub bltcon1: u16,
    pub apt: u32,
    pub bpt: u32,
    pub cpt: u32,
    pub dpt: u32,
    pub afwm: u16,
    pub alwm: u16,
    pub amod: i16,
    pub bmod: i16,
    pub cmod: i16,
    pub dmod: i16,
    pub size_w: u16,
    pub size_h: u16,
    pub anew: u16,
    pub bnew: u16,
    pub ahold: u16,
    pub bhold: u16,
    pub chold: u16,
    pub dhold: u16,
    pub microcode: Microcode,
    pub pc: usize,
    pub iteration: u32,
    pub bbusy: bool,
    pub bzero: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub agnus: AgnusInfo,
    pub blitter: BlitterInfo,
    pub stats: BusStats,
}

/// Shared handle for requesting and collecting snapshots.
#[derive(Debug, Clone, Default)]
pub struct Inspector {
    requested: Arc<AtomicBool>,
    latest: Arc<Mutex<Option<Snapshot>>>,
}

impl Inspector {
    /// Asks for a snapshot at the next VSYNC.
    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Most recent snapshot, left in place.
    #[must_use]
    pub fn latest(&self) -> Option<Snapshot> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Most recent snapshot, removed from the slot.
    #[must_use]
    pub fn take(&self) -> Option<Snapshot> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    pub(crate) fn publish(&self, snapshot: Snapshot) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
        self.requested.store(false, Ordering::Release);
    }
}

impl Agnus {
    /// Copies the current state into a snapshot.
    #[must_use]
    pub fn inspect(&self) -> Snapshot {
        let b = &self.blitter;
        let (pc, iteration) = b.progress();
        Snapshot {
            agnus: AgnusInfo {
                clock: self.clock,
                pos: self.pos,
                frame: self.frame.nr,
                lof: self.lof,
                dmacon: self.dmacon,
                bplcon0: self.bplcon0,
                diwstrt: self.diwstrt,
                diwstop: self.diwstop,
                ddfstrt: self.ddfstrt,
                ddfstop: self.ddfstop,
                bpl1mod: self.bpl1mod,
                bpl2mod: self.bpl2mod,
                bpl_pt: self.bpl_pt,
                spr_pt: self.spr_pt,
                dsk_pt: self.dsk_pt,
                aud_pt: self.aud_pt,
                cop1lc: self.copper.cop1lc,
                cop2lc: self.copper.cop2lc,
                copper_pc: self.copper.pc,
                next_trigger: self.next_trigger(),
            },
            blitter: BlitterInfo {
                bltcon0: b.bltcon0,
                bltcon1: b.bltcon1,
                apt: b.apt,
                bpt: b.bpt,
                cpt: b.cpt,
                dpt: b.dpt,
                afwm: b.afwm,
                alwm: b.alwm,
                amod: b.amod,
                bmod: b.bmod,
                cmod: b.cmod,
                dmod: b.dmod,
                size_w: b.size_w,
                size_h: b.size_h,
                anew: b.anew,
                bnew: b.bnew,
                ahold: b.ahold,
                bhold: b.bhold,
                chold: b.chold,
                dhold: b.dhold,
                microcode: b.microcode(),
                pc,
                iteration,
                bbusy: b.bbusy,
                bzero: b.bzero,
            },
            stats: *self.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::RamHost;

    #[test]
    fn snapshot_is_published_at_vsync_only_on_request() {
        let mut host = RamHost::new();
        let mut agnus = Agnus::default();
        let inspector = agnus.inspector();

        agnus.execute_frame(&mut host);
        assert!(inspector.latest().is_none());

        agnus.dmacon = 0x0200;
        inspector.request();
        agnus.execute_frame(&mut host);
        assert!(!inspector.is_requested());

        let snapshot = inspector.take();
        assert_eq!(snapshot.map(|s| (s.agnus.dmacon, s.agnus.frame, s.agnus.pos.v)), Some((0x0200, 2, 0)));
        assert!(inspector.take().is_none());
    }

    #[test]
    fn handle_works_across_threads() {
        let agnus = Agnus::default();
        let inspector = agnus.inspector();
        let remote = inspector.clone();
        std::thread::spawn(move || remote.request()).join().ok();
        assert!(inspector.is_requested());
    }
}
