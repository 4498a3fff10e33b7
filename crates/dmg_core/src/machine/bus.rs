use crate::cpu::{Bus, InterruptFlags, IF_ADDR};
use crate::error::CartridgeError;

use super::cartridge::{Cartridge, CartridgeHeader, RomOnly};

const VRAM_START: u16 = 0x8000;
const VRAM_SIZE: usize = 0x2000;
const WRAM_START: u16 = 0xC000;
const WRAM_SIZE: usize = 0x2000;
const ECHO_START: u16 = 0xE000;
const OAM_START: u16 = 0xFE00;
const OAM_SIZE: usize = 0xA0;
const UNUSED_START: u16 = 0xFEA0;
const UNUSED_SIZE: usize = 0x60;
const IO_START: u16 = 0xFF00;
const IO_SIZE: usize = 0x80;
const HRAM_START: u16 = 0xFF80;
const HRAM_SIZE: usize = 0x7F;

const DIV: u16 = 0xFF04;
const STAT: u16 = 0xFF41;
const LY: u16 = 0xFF44;
const LYC: u16 = 0xFF45;

const STAT_COINCIDENCE: u8 = 0b0000_0100;
const STAT_LYC_INTERRUPT: u8 = 0b0100_0000;

/// DIV increments at 16384 Hz.
const DIV_PERIOD: u32 = 256;
const CYCLES_PER_LINE: u32 = 456;
const LINES_PER_FRAME: u8 = 154;
const VBLANK_LINE: u8 = 144;

/// The DMG address space.
///
/// ```text
/// 0000-7FFF  cartridge ROM
/// 8000-9FFF  VRAM
/// A000-BFFF  cartridge RAM
/// C000-DFFF  work RAM
/// E000-FDFF  echo of C000-DDFF
/// FE00-FE9F  OAM
/// FEA0-FEFF  unused
/// FF00-FF7F  I/O registers
/// FF80-FFFE  high RAM
/// FFFF       IE
/// ```
///
/// Everything outside the cartridge behaves as plain storage; the only
/// registers with behaviour are DIV, LY and STAT, driven by `tick`.
pub struct MemoryBus {
    cartridge: Box<dyn Cartridge>,
    vram: [u8; VRAM_SIZE],
    wram: [u8; WRAM_SIZE],
    oam: [u8; OAM_SIZE],
    unused: [u8; UNUSED_SIZE],
    io: [u8; IO_SIZE],
    hram: [u8; HRAM_SIZE],
    ie: u8,
    header: Option<CartridgeHeader>,
    div_cycles: u32,
    line_cycles: u32,
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::with_cartridge(Box::new(RomOnly::new()))
    }
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cartridge(cartridge: Box<dyn Cartridge>) -> Self {
        Self {
            cartridge,
            vram: [0; VRAM_SIZE],
            wram: [0; WRAM_SIZE],
            oam: [0; OAM_SIZE],
            unused: [0; UNUSED_SIZE],
            io: [0; IO_SIZE],
            hram: [0; HRAM_SIZE],
            ie: 0,
            header: None,
            div_cycles: 0,
            line_cycles: 0,
        }
    }

    /// Hand the image to the cartridge and keep its header for later
    /// inspection.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), CartridgeError> {
        self.cartridge.load_rom(rom)?;
        self.header = CartridgeHeader::parse(rom);
        Ok(())
    }

    pub fn cartridge_header(&self) -> Option<&CartridgeHeader> {
        self.header.as_ref()
    }

    /// Clear every RAM region and peripheral counter. The loaded ROM stays.
    pub fn reset(&mut self) {
        self.vram.fill(0);
        self.wram.fill(0);
        self.oam.fill(0);
        self.unused.fill(0);
        self.io.fill(0);
        self.hram.fill(0);
        self.ie = 0;
        self.div_cycles = 0;
        self.line_cycles = 0;
        self.cartridge.clear_ram();
    }

    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF => self.cartridge.read_rom(addr),
            0x8000..=0x9FFF => self.vram[(addr - VRAM_START) as usize],
            0xA000..=0xBFFF => self.cartridge.read_ram(addr),
            0xC000..=0xDFFF => self.wram[(addr - WRAM_START) as usize],
            0xE000..=0xFDFF => self.wram[(addr - ECHO_START) as usize],
            0xFE00..=0xFE9F => self.oam[(addr - OAM_START) as usize],
            0xFEA0..=0xFEFF => self.unused[(addr - UNUSED_START) as usize],
            0xFF00..=0xFF7F => self.io[(addr - IO_START) as usize],
            0xFF80..=0xFFFE => self.hram[(addr - HRAM_START) as usize],
            0xFFFF => self.ie,
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x7FFF => self.cartridge.write_rom(addr, value),
            0x8000..=0x9FFF => self.vram[(addr - VRAM_START) as usize] = value,
            0xA000..=0xBFFF => self.cartridge.write_ram(addr, value),
            0xC000..=0xDFFF => self.wram[(addr - WRAM_START) as usize] = value,
            0xE000..=0xFDFF => self.wram[(addr - ECHO_START) as usize] = value,
            0xFE00..=0xFE9F => self.oam[(addr - OAM_START) as usize] = value,
            0xFEA0..=0xFEFF => self.unused[(addr - UNUSED_START) as usize] = value,
            0xFF00..=0xFF7F => self.io[(addr - IO_START) as usize] = value,
            0xFF80..=0xFFFE => self.hram[(addr - HRAM_START) as usize] = value,
            0xFFFF => self.ie = value,
        }
    }

    /// Little-endian 16-bit read.
    pub fn read16(&self, addr: u16) -> u16 {
        u16::from_le_bytes([self.read(addr), self.read(addr.wrapping_add(1))])
    }

    /// Little-endian 16-bit write.
    pub fn write16(&mut self, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write(addr, lo);
        self.write(addr.wrapping_add(1), hi);
    }

    /// Copy `len` bytes starting at `addr`, wrapping at the top of the
    /// address space.
    pub fn read_n(&self, addr: u16, len: usize) -> Vec<u8> {
        (0..len)
            .map(|i| self.read(addr.wrapping_add(i as u16)))
            .collect()
    }

    /// Set bits in IF.
    pub fn request_interrupt(&mut self, flags: InterruptFlags) {
        let offset = (IF_ADDR - IO_START) as usize;
        self.io[offset] |= flags.bits();
    }

    fn io_mut(&mut self, addr: u16) -> &mut u8 {
        &mut self.io[(addr - IO_START) as usize]
    }

    /// Advance DIV and the scanline counter by `cycles` T-cycles.
    pub fn tick(&mut self, cycles: u32) {
        self.div_cycles += cycles;
        while self.div_cycles >= DIV_PERIOD {
            self.div_cycles -= DIV_PERIOD;
            let div = self.io_mut(DIV);
            *div = div.wrapping_add(1);
        }

        self.line_cycles += cycles;
        while self.line_cycles >= CYCLES_PER_LINE {
            self.line_cycles -= CYCLES_PER_LINE;
            self.next_line();
        }
    }

    fn next_line(&mut self) {
        // LY is plain storage, so a program may have parked any value in it.
        let ly = self.read(LY).wrapping_add(1) % LINES_PER_FRAME;
        *self.io_mut(LY) = ly;
        if ly == VBLANK_LINE {
            self.request_interrupt(InterruptFlags::VBLANK);
        }

        let stat = self.read(STAT);
        if ly == self.read(LYC) {
            *self.io_mut(STAT) = stat | STAT_COINCIDENCE;
            if stat & STAT_LYC_INTERRUPT != 0 {
                self.request_interrupt(InterruptFlags::LCD_STAT);
            }
        } else {
            *self.io_mut(STAT) = stat & !STAT_COINCIDENCE;
        }
    }
}

impl Bus for MemoryBus {
    #[inline]
    fn read8(&mut self, addr: u16) -> u8 {
        self.read(addr)
    }

    #[inline]
    fn write8(&mut self, addr: u16, value: u8) {
        self.write(addr, value);
    }

    fn tick(&mut self, cycles: u32) {
        MemoryBus::tick(self, cycles);
    }
}
