use super::{Cpu, Reg16};

impl Cpu {
    /// CPU state as left by the DMG boot ROM, with PC on the cartridge
    /// entry point.
    pub fn with_boot_state() -> Self {
        let mut cpu = Self::new();
        cpu.apply_boot_state();
        cpu
    }

    /// Reset registers and interrupt latches to the post-boot values.
    pub fn apply_boot_state(&mut self) {
        self.regs.set16(Reg16::AF, 0x01B0);
        self.regs.set16(Reg16::BC, 0x0013);
        self.regs.set16(Reg16::DE, 0x00D8);
        self.regs.set16(Reg16::HL, 0x014D);
        self.regs.set16(Reg16::SP, 0xFFFE);
        self.regs.set16(Reg16::PC, 0x0100);
        self.ime = false;
        self.ime_enable_pending = false;
        self.ime_enable_delay = false;
    }
}
