mod rom_only;

pub use rom_only::RomOnly;

use crate::error::CartridgeError;

/// Cartridge media behind the `0x0000-0x7FFF` and `0xA000-0xBFFF` windows.
///
/// Addresses are passed through unchanged; implementations map them onto
/// their own storage.
pub trait Cartridge: Send {
    fn load_rom(&mut self, rom: &[u8]) -> Result<(), CartridgeError>;
    fn read_rom(&self, addr: u16) -> u8;
    /// ROM-area writes; mappers use these for bank registers.
    fn write_rom(&mut self, addr: u16, value: u8);
    fn read_ram(&self, addr: u16) -> u8;
    fn write_ram(&mut self, addr: u16, value: u8);

    /// Reset external RAM without dropping the loaded ROM.
    fn clear_ram(&mut self) {}
}

/// Mapper type named by header byte 0x147.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CartridgeKind {
    RomOnly,
    RomRam,
    Mbc1,
    Mbc2,
    Mbc3,
    Mbc5,
    Other(u8),
}

impl CartridgeKind {
    pub fn from_header_byte(byte: u8) -> Self {
        match byte {
            0x00 => CartridgeKind::RomOnly,
            0x08 | 0x09 => CartridgeKind::RomRam,
            0x01..=0x03 => CartridgeKind::Mbc1,
            0x05 | 0x06 => CartridgeKind::Mbc2,
            0x0F..=0x13 => CartridgeKind::Mbc3,
            0x19..=0x1E => CartridgeKind::Mbc5,
            other => CartridgeKind::Other(other),
        }
    }

    /// Whether the flat ROM-only mapping is faithful for this media.
    pub fn is_flat(self) -> bool {
        matches!(self, CartridgeKind::RomOnly | CartridgeKind::RomRam)
    }
}

const TITLE_START: usize = 0x0134;
const TITLE_END: usize = 0x0143;
const TYPE_OFFSET: usize = 0x0147;
const ROM_SIZE_OFFSET: usize = 0x0148;
const RAM_SIZE_OFFSET: usize = 0x0149;
const HEADER_END: usize = 0x0150;

/// Fields of the cartridge header at 0x0100-0x014F.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartridgeHeader {
    pub title: String,
    pub kind: CartridgeKind,
    pub rom_size_code: u8,
    pub ram_size_code: u8,
}

impl CartridgeHeader {
    /// Parse the header out of a ROM image. `None` if the image is too
    /// short to contain one.
    pub fn parse(rom: &[u8]) -> Option<Self> {
        if rom.len() < HEADER_END {
            return None;
        }

        let title = rom[TITLE_START..=TITLE_END]
            .iter()
            .take_while(|&&b| b != 0)
            .filter(|b| b.is_ascii_graphic() || **b == b' ')
            .map(|&b| b as char)
            .collect::<String>()
            .trim_end()
            .to_string();

        Some(Self {
            title,
            kind: CartridgeKind::from_header_byte(rom[TYPE_OFFSET]),
            rom_size_code: rom[ROM_SIZE_OFFSET],
            ram_size_code: rom[RAM_SIZE_OFFSET],
        })
    }

    /// ROM size in bytes declared by the header (32 KiB << code).
    pub fn rom_size(&self) -> Option<usize> {
        (self.rom_size_code <= 8).then(|| 0x8000usize << self.rom_size_code)
    }
}
