//! Collaborators outside Agnus.
//!
//! Agnus never owns memory, Denise, Paula's interrupt logic, the CPU or the
//! CIAs. Each execution entry point takes a `&mut impl Host` instead, so the
//! machine decides how those pieces are wired together.

/// Chip RAM as seen by DMA. Addresses arrive already masked to the
/// revision's chip RAM limit and word aligned.
pub trait ChipRam {
    fn read_chip_word(&mut self, addr: u32) -> u16;
    fn write_chip_word(&mut self, addr: u32, value: u16);
}

/// Interrupt controller (INTREQ).
pub trait Interrupts {
    fn raise_interrupt(&mut self, bit: u8);
}

/// Video pipeline (Denise and the pixel engine).
#[allow(unused_variables)]
pub trait Video {
    fn begin_line(&mut self, v: u16) {}
    fn end_line(&mut self, v: u16) {}
    fn begin_frame(&mut self, interlaced: bool) {}
    /// A bitplane word fetched by DMA. `plane` is 0-based.
    fn bitplane_word(&mut self, plane: usize, value: u16) {}
    fn sprite_pos(&mut self, sprite: usize, value: u16) {}
    fn sprite_ctl(&mut self, sprite: usize, value: u16) {}
    fn sprite_data_a(&mut self, sprite: usize, value: u16) {}
    fn sprite_data_b(&mut self, sprite: usize, value: u16) {}
    fn dmacon_changed(&mut self, old: u16, new: u16) {}
}

/// The CPU, as far as bus contention is concerned.
#[allow(unused_variables)]
pub trait Cpu {
    fn add_wait_states(&mut self, cpu_cycles: i64) {}
}

/// Both CIAs, clocked from the E clock and counting sync pulses.
pub trait Cias {
    fn cia_a_execute(&mut self) {}
    fn cia_b_execute(&mut self) {}
    /// VSYNC pulse on CIA A's TOD input.
    fn cia_a_tod(&mut self) {}
    /// HSYNC pulse on CIA B's TOD input.
    fn cia_b_tod(&mut self) {}
}

/// Direction of a pending disk DMA transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskDirection {
    /// Words flow from the drive into chip RAM.
    Read,
    /// Words flow from chip RAM to the drive.
    Write,
}

/// Disk controller side of the three disk DMA slots.
#[allow(unused_variables)]
pub trait DiskPort {
    fn disk_dma_direction(&self) -> Option<DiskDirection> {
        None
    }
    /// Next word from the drive FIFO, if one is ready.
    fn disk_read_word(&mut self) -> Option<u16> {
        None
    }
    fn disk_write_word(&mut self, value: u16) {}
    /// Periodic drive rotation tick.
    fn disk_rotate(&mut self) {}
    fn disk_vsync(&mut self) {}
}

/// Registers owned by other chips, plus audio output.
#[allow(unused_variables)]
pub trait CustomRegisters {
    /// A copper MOVE to a register Agnus does not handle.
    fn poke_custom(&mut self, reg: u16, value: u16) {}
    /// Current output of one audio channel.
    fn audio_sample(&mut self, channel: usize, sample: i16) {}
}

/// Everything Agnus needs from the surrounding machine.
pub trait Host: ChipRam + Interrupts + Video + Cpu + Cias + DiskPort + CustomRegisters {}

impl<T> Host for T where T: ChipRam + Interrupts + Video + Cpu + Cias + DiskPort + CustomRegisters {}
