use crate::error::CartridgeError;

use super::Cartridge;

const ROM_SIZE: usize = 0x8000;
const RAM_SIZE: usize = 0x2000;
const RAM_START: u16 = 0xA000;

/// Cartridge with no mapper: 32 KiB of fixed ROM and 8 KiB of plain RAM.
///
/// ROM writes are dropped. Images larger than 32 KiB are truncated to the
/// first two banks.
pub struct RomOnly {
    rom: Box<[u8; ROM_SIZE]>,
    ram: Box<[u8; RAM_SIZE]>,
}

impl Default for RomOnly {
    fn default() -> Self {
        Self {
            rom: Box::new([0; ROM_SIZE]),
            ram: Box::new([0; RAM_SIZE]),
        }
    }
}

impl RomOnly {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rom(rom: &[u8]) -> Result<Self, CartridgeError> {
        let mut cart = Self::new();
        cart.load_rom(rom)?;
        Ok(cart)
    }
}

impl Cartridge for RomOnly {
    fn load_rom(&mut self, rom: &[u8]) -> Result<(), CartridgeError> {
        if rom.is_empty() {
            return Err(CartridgeError::Empty);
        }
        if rom.len() > ROM_SIZE {
            log::warn!(
                "ROM image is {} bytes; only the first {} are mapped",
                rom.len(),
                ROM_SIZE
            );
        }

        let len = rom.len().min(ROM_SIZE);
        self.rom.fill(0);
        self.rom[..len].copy_from_slice(&rom[..len]);
        Ok(())
    }

    fn read_rom(&self, addr: u16) -> u8 {
        self.rom.get(addr as usize).copied().unwrap_or(0xFF)
    }

    fn write_rom(&mut self, addr: u16, value: u8) {
        log::trace!("ignored ROM write {value:#04x} to {addr:#06x}");
    }

    fn read_ram(&self, addr: u16) -> u8 {
        let offset = addr.wrapping_sub(RAM_START) as usize;
        self.ram.get(offset).copied().unwrap_or(0xFF)
    }

    fn write_ram(&mut self, addr: u16, value: u8) {
        let offset = addr.wrapping_sub(RAM_START) as usize;
        if let Some(slot) = self.ram.get_mut(offset) {
            *slot = value;
        }
    }

    fn clear_ram(&mut self) {
        self.ram.fill(0);
    }
}
