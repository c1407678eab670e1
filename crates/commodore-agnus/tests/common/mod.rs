#![allow(dead_code)]

use commodore_agnus::host::{ChipRam, Cias, Cpu, CustomRegisters, DiskPort, Interrupts, Video};
use commodore_agnus::regs::{DMACON, DMACON_DMAEN, DMACON_SETCLR, PokeSource};
use commodore_agnus::{Agnus, AgnusConfig, Beam};

/// Chip RAM plus a log of everything Agnus hands to the rest of the machine.
pub struct RecordingHost {
    pub ram: Vec<u16>,
    pub line: u16,
    pub irqs: Vec<u8>,
    pub pokes: Vec<(u16, u16, u16)>,
    pub bitplane_words: Vec<(u16, usize, u16)>,
    pub dmacon_changes: Vec<(u16, u16)>,
    pub wait_states: i64,
    pub frames: u32,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            ram: vec![0; 0x4_0000],
            line: 0,
            irqs: Vec::new(),
            pokes: Vec::new(),
            bitplane_words: Vec::new(),
            dmacon_changes: Vec::new(),
            wait_states: 0,
            frames: 0,
        }
    }

    pub fn load(&mut self, addr: u32, words: &[u16]) {
        for (i, w) in words.iter().enumerate() {
            self.write_chip_word(addr + 2 * i as u32, *w);
        }
    }

    pub fn word(&self, addr: u32) -> u16 {
        self.ram[(addr as usize >> 1) % self.ram.len()]
    }

    pub fn words(&self, addr: u32, count: usize) -> Vec<u16> {
        (0..count).map(|i| self.word(addr + 2 * i as u32)).collect()
    }

    /// Planes fetched in line `v`, in fetch order.
    pub fn planes_in_line(&self, v: u16) -> Vec<usize> {
        self.bitplane_words.iter().filter(|(line, _, _)| *line == v).map(|(_, p, _)| *p).collect()
    }
}

impl ChipRam for RecordingHost {
    fn read_chip_word(&mut self, addr: u32) -> u16 {
        self.word(addr)
    }

    fn write_chip_word(&mut self, addr: u32, value: u16) {
        let len = self.ram.len();
        self.ram[(addr as usize >> 1) % len] = value;
    }
}

impl Interrupts for RecordingHost {
    fn raise_interrupt(&mut self, bit: u8) {
        self.irqs.push(bit);
    }
}

impl Video for RecordingHost {
    fn begin_line(&mut self, v: u16) {
        self.line = v;
    }

    fn begin_frame(&mut self, _interlaced: bool) {
        self.frames += 1;
    }

    fn bitplane_word(&mut self, plane: usize, value: u16) {
        self.bitplane_words.push((self.line, plane, value));
    }

    fn dmacon_changed(&mut self, old: u16, new: u16) {
        self.dmacon_changes.push((old, new));
    }
}

impl Cpu for RecordingHost {
    fn add_wait_states(&mut self, cpu_cycles: i64) {
        self.wait_states += cpu_cycles;
    }
}

impl Cias for RecordingHost {}
impl DiskPort for RecordingHost {}

impl CustomRegisters for RecordingHost {
    fn poke_custom(&mut self, reg: u16, value: u16) {
        self.pokes.push((self.line, reg, value));
    }
}

pub fn agnus(config: AgnusConfig) -> Agnus {
    Agnus::new(config)
}

/// CPU write to a custom register.
pub fn poke(agnus: &mut Agnus, reg: u16, value: u16) {
    agnus.poke(reg, value, PokeSource::Cpu);
}

/// Writes a chip pointer through its high and low register halves.
pub fn poke_ptr(agnus: &mut Agnus, reg_hi: u16, addr: u32) {
    poke(agnus, reg_hi, (addr >> 16) as u16);
    poke(agnus, reg_hi + 2, addr as u16);
}

pub fn enable_dma(agnus: &mut Agnus, bits: u16) {
    poke(agnus, DMACON, DMACON_SETCLR | DMACON_DMAEN | bits);
}

/// Runs until the beam reaches `(v, h)` in the current frame.
pub fn run_to(agnus: &mut Agnus, host: &mut RecordingHost, v: u16, h: u16) {
    let target = agnus.beam_to_cycle(Beam::new(v, h));
    agnus.execute_until(target, host);
}

/// Runs `cycles` DMA cycles one at a time.
pub fn step(agnus: &mut Agnus, host: &mut RecordingHost, cycles: usize) {
    for _ in 0..cycles {
        agnus.execute(host);
    }
}
