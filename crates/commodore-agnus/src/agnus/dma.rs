//! DMA drivers: every transfer a DMA channel makes goes through here, so
//! pointer arithmetic, bus stamping and statistics stay in one place.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::Agnus;
use crate::audio::AudioDma;
use crate::bus::{BusOwner, BusStats, BusTable};
use crate::host::Host;
use crate::regs::INT_AUD0;

/// Bus slot stamped by audio channel 0; channel `n` uses `base + 2n`.
///
/// Uncertain: audio fetches are executed by the channel state machines,
/// detached from the DAS slot they were granted, so the stamp reuses the
/// nominal slot instead of the cycle the fetch actually happens in.
pub const AUDIO_SLOT_BASE_UNVERIFIED: usize = 0x0D;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SpriteState {
    #[default]
    Idle,
    Active,
}

/// Vertical trigger lines and fetch state of one sprite channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpriteDma {
    pub vstrt: i16,
    pub vstop: i16,
    pub state: SpriteState,
}

impl SpriteDma {
    /// Applies a SPRxPOS write seen in line `v`.
    pub fn write_pos(&mut self, value: u16, v: i16) {
        self.vstrt = ((value >> 8) as i16) | (self.vstrt & 0x100);
        self.check_trigger_lines(v);
    }

    /// Applies a SPRxCTL write seen in line `v`.
    pub fn write_ctl(&mut self, value: u16, v: i16) {
        self.vstrt = (((value & 0b100) << 6) as i16) | (self.vstrt & 0xFF);
        self.vstop = (((value & 0b010) << 7) as i16) | (value >> 8) as i16;
        self.check_trigger_lines(v);
    }

    fn check_trigger_lines(&mut self, v: i16) {
        if self.vstrt == v {
            self.state = SpriteState::Active;
        }
        if self.vstop == v {
            self.state = SpriteState::Idle;
        }
    }
}

impl Agnus {
    fn stamp(&mut self, owner: BusOwner, value: u16) {
        let h = usize::from(self.pos.h);
        debug_assert!(
            self.bus.is_free(h) || self.bus.owner(h) == owner,
            "{owner:?} collides with {:?} at {}",
            self.bus.owner(h),
            self.pos
        );
        self.bus.stamp(h, owner, value);
        self.stats.record(owner);
    }

    /// Disk DMA towards the drive: reads the next word from memory.
    pub(crate) fn do_disk_dma_read(&mut self, host: &mut impl Host) -> u16 {
        let value = host.read_chip_word(self.dsk_pt);
        self.dsk_pt = self.inc_chip_ptr(self.dsk_pt, 2);
        self.stamp(BusOwner::Disk, value);
        value
    }

    /// Disk DMA from the drive: stores one word in memory.
    pub(crate) fn do_disk_dma_write(&mut self, value: u16, host: &mut impl Host) {
        host.write_chip_word(self.dsk_pt, value);
        self.dsk_pt = self.inc_chip_ptr(self.dsk_pt, 2);
        self.stamp(BusOwner::Disk, value);
    }

    /// An early DDFSTRT lets bitplane fetches take over sprite slots. The
    /// sprite fetch is lost and its pointer stays put.
    fn sprite_slot_stolen(&self) -> bool {
        self.bus.owner(usize::from(self.pos.h)) == BusOwner::Bitplane
    }

    pub(crate) fn do_sprite_dma(&mut self, nr: usize, host: &mut impl Host) -> u16 {
        let value = host.read_chip_word(self.spr_pt[nr]);
        self.spr_pt[nr] = self.inc_chip_ptr(self.spr_pt[nr], 2);
        self.stamp(BusOwner::Sprite, value);
        value
    }

    pub(crate) fn do_bitplane_dma(&mut self, plane: usize, host: &mut impl Host) -> u16 {
        let value = host.read_chip_word(self.bpl_pt[plane]);
        self.bpl_pt[plane] = self.inc_chip_ptr(self.bpl_pt[plane], 2);
        self.stamp(BusOwner::Bitplane, value);
        value
    }

    /// Adds the plane's modulo after the last fetch of a line.
    pub(crate) fn add_bpl_mod(&mut self, plane: usize) {
        let modulo = if plane % 2 == 0 { self.bpl1mod } else { self.bpl2mod };
        self.bpl_pt[plane] = self.inc_chip_ptr(self.bpl_pt[plane], i32::from(modulo));
    }

    pub(crate) fn copper_read(&mut self, addr: u32, host: &mut impl Host) -> u16 {
        let value = host.read_chip_word(addr & self.chip_mask);
        self.stamp(BusOwner::Copper, value);
        value
    }

    /// Blitter read in a slot won through [`Agnus::allocate_bus`].
    pub(crate) fn blitter_read(&mut self, addr: u32, host: &mut impl Host) -> u16 {
        debug_assert_eq!(self.bus.owner(usize::from(self.pos.h)), BusOwner::Blitter);
        let value = host.read_chip_word(addr & self.chip_mask);
        self.stamp(BusOwner::Blitter, value);
        value
    }

    pub(crate) fn blitter_write(&mut self, addr: u32, value: u16, host: &mut impl Host) {
        debug_assert_eq!(self.bus.owner(usize::from(self.pos.h)), BusOwner::Blitter);
        host.write_chip_word(addr & self.chip_mask, value);
        self.stamp(BusOwner::Blitter, value);
    }

    //
    // Sprites
    //

    /// First DAS slot of a sprite: the POS word, or the first data word.
    pub(crate) fn execute_first_sprite_cycle(&mut self, nr: usize, host: &mut impl Host) {
        if self.sprite_slot_stolen() {
            return;
        }
        if self.pos.v as i16 == self.sprites[nr].vstop {
            self.sprites[nr].state = SpriteState::Idle;

            let value = self.do_sprite_dma(nr, host);
            self.sprites[nr].write_pos(value, self.pos.v as i16);
            host.sprite_pos(nr, value);
        } else if self.sprites[nr].state == SpriteState::Active {
            let value = self.do_sprite_dma(nr, host);
            host.sprite_data_a(nr, value);
        }
    }

    /// Second DAS slot of a sprite: the CTL word, or the second data word.
    pub(crate) fn execute_second_sprite_cycle(&mut self, nr: usize, host: &mut impl Host) {
        if self.sprite_slot_stolen() {
            return;
        }
        if self.pos.v as i16 == self.sprites[nr].vstop {
            self.sprites[nr].state = SpriteState::Idle;

            let value = self.do_sprite_dma(nr, host);
            self.sprites[nr].write_ctl(value, self.pos.v as i16);
            host.sprite_ctl(nr, value);
        } else if self.sprites[nr].state == SpriteState::Active {
            let value = self.do_sprite_dma(nr, host);
            host.sprite_data_b(nr, value);
        }
    }

    /// Per-line sprite state update, run near the end of each line for the
    /// line that follows.
    pub(crate) fn update_sprite_dma(&mut self) {
        let v = self.pos.v as i16 + 1;

        // The first DMA line fetches the control words of every sprite
        if v == 25 && self.spr_dma() {
            for sprite in &mut self.sprites {
                sprite.vstop = 25;
            }
            return;
        }

        // Sprite DMA stops in the last line
        if v == self.frame.num_lines as i16 - 1 {
            for sprite in &mut self.sprites {
                sprite.state = SpriteState::Idle;
            }
            return;
        }

        for sprite in &mut self.sprites {
            if v == sprite.vstrt {
                sprite.state = SpriteState::Active;
            }
            if v == sprite.vstop {
                sprite.state = SpriteState::Idle;
            }
        }
    }

    /// Vertical position a sprite register write is compared against.
    pub(crate) fn sprite_compare_line(&self) -> i16 {
        if self.pos.h < 0xDF { self.pos.v as i16 } else { self.pos.v as i16 + 1 }
    }

    //
    // Audio
    //

    /// Brings one audio channel up to the current clock.
    pub(crate) fn run_audio(&mut self, channel: usize, host: &mut impl Host) {
        let clock = self.clock;
        let mut port = AudioPort {
            pt: &mut self.aud_pt,
            bus: &mut self.bus,
            stats: &mut self.stats,
            chip_mask: self.chip_mask,
            host,
        };
        self.audio[channel].execute_until(clock, &mut port);
    }
}

/// The memory and interrupt side of the audio channels.
struct AudioPort<'a, H> {
    pt: &'a mut [u32; 4],
    bus: &'a mut BusTable,
    stats: &'a mut BusStats,
    chip_mask: u32,
    host: &'a mut H,
}

impl<H: Host> AudioDma for AudioPort<'_, H> {
    fn fetch(&mut self, channel: usize) -> u16 {
        let addr = self.pt[channel];
        let value = self.host.read_chip_word(addr);
        self.pt[channel] = addr.wrapping_add(2) & self.chip_mask;
        self.bus.stamp(AUDIO_SLOT_BASE_UNVERIFIED + 2 * channel, BusOwner::Audio, value);
        self.stats.record(BusOwner::Audio);
        value
    }

    fn reload(&mut self, channel: usize, location: u32) {
        self.pt[channel] = location & self.chip_mask;
    }

    fn interrupt(&mut self, channel: usize) {
        self.host.raise_interrupt(INT_AUD0 + channel as u8);
    }

    fn sample(&mut self, channel: usize, sample: i16) {
        self.host.audio_sample(channel, sample);
    }
}
