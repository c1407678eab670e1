//! Custom register offsets and bit assignments handled by Agnus.

// DMACON bits
pub const DMACON_AUD0EN: u16 = 0x0001;
pub const DMACON_AUD1EN: u16 = 0x0002;
pub const DMACON_AUD2EN: u16 = 0x0004;
pub const DMACON_AUD3EN: u16 = 0x0008;
pub const DMACON_DSKEN: u16 = 0x0010;
pub const DMACON_SPREN: u16 = 0x0020;
pub const DMACON_BLTEN: u16 = 0x0040;
pub const DMACON_COPEN: u16 = 0x0080;
pub const DMACON_BPLEN: u16 = 0x0100;
pub const DMACON_DMAEN: u16 = 0x0200;
pub const DMACON_BLTPRI: u16 = 0x0400;
pub const DMACON_BZERO: u16 = 0x2000;
pub const DMACON_BBUSY: u16 = 0x4000;
pub const DMACON_SETCLR: u16 = 0x8000;

/// Bits of DMACON that can be written.
pub const DMACON_WRITABLE: u16 = 0x07FF;

// INTREQ bit numbers
pub const INT_COPER: u8 = 4;
pub const INT_VERTB: u8 = 5;
pub const INT_BLIT: u8 = 6;
pub const INT_AUD0: u8 = 7;

// Read-only registers
pub const DMACONR: u16 = 0x002;
pub const VPOSR: u16 = 0x004;
pub const VHPOSR: u16 = 0x006;

pub const DSKPTH: u16 = 0x020;
pub const DSKPTL: u16 = 0x022;
pub const VPOSW: u16 = 0x02A;
pub const VHPOSW: u16 = 0x02C;
pub const COPCON: u16 = 0x02E;

pub const BLTCON0: u16 = 0x040;
pub const BLTCON1: u16 = 0x042;
pub const BLTAFWM: u16 = 0x044;
pub const BLTALWM: u16 = 0x046;
pub const BLTCPTH: u16 = 0x048;
pub const BLTCPTL: u16 = 0x04A;
pub const BLTBPTH: u16 = 0x04C;
pub const BLTBPTL: u16 = 0x04E;
pub const BLTAPTH: u16 = 0x050;
pub const BLTAPTL: u16 = 0x052;
pub const BLTDPTH: u16 = 0x054;
pub const BLTDPTL: u16 = 0x056;
pub const BLTSIZE: u16 = 0x058;
pub const BLTCON0L: u16 = 0x05A;
pub const BLTSIZV: u16 = 0x05C;
pub const BLTSIZH: u16 = 0x05E;
pub const BLTCMOD: u16 = 0x060;
pub const BLTBMOD: u16 = 0x062;
pub const BLTAMOD: u16 = 0x064;
pub const BLTDMOD: u16 = 0x066;
pub const BLTCDAT: u16 = 0x070;
pub const BLTBDAT: u16 = 0x072;
pub const BLTADAT: u16 = 0x074;

pub const COP1LCH: u16 = 0x080;
pub const COP1LCL: u16 = 0x082;
pub const COP2LCH: u16 = 0x084;
pub const COP2LCL: u16 = 0x086;
pub const COPJMP1: u16 = 0x088;
pub const COPJMP2: u16 = 0x08A;

pub const DIWSTRT: u16 = 0x08E;
pub const DIWSTOP: u16 = 0x090;
pub const DDFSTRT: u16 = 0x092;
pub const DDFSTOP: u16 = 0x094;
pub const DMACON: u16 = 0x096;

/// First audio register block; each channel spans 0x10 bytes.
pub const AUD0LCH: u16 = 0x0A0;
pub const AUD_STRIDE: u16 = 0x010;
pub const AUD_LCH: u16 = 0x0;
pub const AUD_LCL: u16 = 0x2;
pub const AUD_LEN: u16 = 0x4;
pub const AUD_PER: u16 = 0x6;
pub const AUD_VOL: u16 = 0x8;
pub const AUD_DAT: u16 = 0xA;

pub const BPL1PTH: u16 = 0x0E0;
pub const BPL6PTL: u16 = 0x0F6;
pub const BPLCON0: u16 = 0x100;
pub const BPL1MOD: u16 = 0x108;
pub const BPL2MOD: u16 = 0x10A;

pub const SPR0PTH: u16 = 0x120;
pub const SPR7PTL: u16 = 0x13E;
pub const SPR0POS: u16 = 0x140;
/// Each sprite's POS/CTL/DATA/DATB block spans 8 bytes.
pub const SPR_STRIDE: u16 = 0x008;
pub const SPR7DATB: u16 = 0x17E;

/// Who performed a register write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PokeSource {
    Cpu,
    Copper,
}

/// Replaces the high word of a pointer.
#[must_use]
pub const fn replace_hi_word(ptr: u32, value: u16) -> u32 {
    (ptr & 0x0000_FFFF) | ((value as u32) << 16)
}

/// Replaces the low word of a pointer, forcing word alignment.
#[must_use]
pub const fn replace_lo_word(ptr: u32, value: u16) -> u32 {
    (ptr & 0xFFFF_0000) | (value & 0xFFFE) as u32
}
