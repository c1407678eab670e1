//! Commodore Agnus - DMA event scheduler, bus arbiter, copper and blitter.
//!
//! Agnus owns the master clock of an Amiga. Every DMA activity (refresh,
//! disk, audio, sprites, bitplanes, copper, blitter) is driven from a fixed
//! set of event slots, and a per-line bus table records who used each DMA
//! cycle. Everything outside the chip is reached through the [`host::Host`]
//! traits passed into the execution entry points.

mod agnus;
pub mod audio;
pub mod beam;
pub mod blitter;
pub mod bus;
pub mod config;
pub mod copper;
pub mod events;
pub mod host;
pub mod inspect;
pub mod recorder;
pub mod regs;
pub mod tables;

pub use agnus::{
    AUDIO_SLOT_BASE_UNVERIFIED, Agnus, DISK_ROTATE_INTERVAL, HsyncActions, SpriteDma, SpriteState,
};
pub use beam::{Beam, Cycle, NEVER};
pub use blitter::{Blitter, BlitterError};
pub use bus::{BusOwner, BusStats};
pub use config::{AgnusConfig, AgnusRevision, BlitterAccuracy, ConfigError};
pub use copper::Copper;
pub use events::{EventId, Slot};
pub use host::Host;
pub use inspect::{AgnusInfo, BlitterInfo, Inspector, Snapshot};
