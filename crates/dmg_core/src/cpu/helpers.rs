use super::{Bus, Cpu, Flags, Instruction, Reg8};

impl Cpu {
    /// Read an 8-bit operand by its 3-bit field: `B C D E H L (HL) A`.
    #[inline]
    pub(super) fn read_operand(&mut self, bus: &mut dyn Bus, index: u8) -> u8 {
        match Reg8::from_operand(index) {
            Some(reg) => self.regs.get8(reg),
            None => bus.read8(self.regs.hl()),
        }
    }

    /// Write an 8-bit operand by its 3-bit field. The encoding matches
    /// `read_operand`.
    #[inline]
    pub(super) fn write_operand(&mut self, bus: &mut dyn Bus, index: u8, value: u8) {
        match Reg8::from_operand(index) {
            Some(reg) => self.regs.set8(reg, value),
            None => bus.write8(self.regs.hl(), value),
        }
    }

    /// Move PC past `ins`.
    #[inline]
    pub(super) fn advance(&mut self, ins: &Instruction) {
        let pc = self.regs.pc().wrapping_add(ins.len());
        self.regs.set_pc(pc);
    }

    #[inline]
    pub(super) fn push_u16(&mut self, bus: &mut dyn Bus, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        // Stack grows downward: high byte first, so memory[SP] ends up low.
        let mut sp = self.regs.sp().wrapping_sub(1);
        bus.write8(sp, hi);
        sp = sp.wrapping_sub(1);
        bus.write8(sp, lo);
        self.regs.set_sp(sp);
    }

    #[inline]
    pub(super) fn pop_u16(&mut self, bus: &mut dyn Bus) -> u16 {
        let sp = self.regs.sp();
        let lo = bus.read8(sp);
        let hi = bus.read8(sp.wrapping_add(1));
        self.regs.set_sp(sp.wrapping_add(2));
        u16::from_be_bytes([hi, lo])
    }

    /// Evaluate the 2-bit condition field: NZ, Z, NC, C.
    #[inline]
    pub(super) fn condition(&self, cc: u8) -> bool {
        match cc & 0x03 {
            0 => !self.regs.flag(Flags::Z),
            1 => self.regs.flag(Flags::Z),
            2 => !self.regs.flag(Flags::C),
            _ => self.regs.flag(Flags::C),
        }
    }

    #[inline]
    pub(super) fn set_flag(&mut self, flag: Flags, value: bool) {
        self.regs.set_flag(flag, value);
    }

    #[inline]
    pub(super) fn flag(&self, flag: Flags) -> bool {
        self.regs.flag(flag)
    }

    #[inline]
    pub(super) fn clear_flags(&mut self) {
        self.regs.set_flags(Flags::empty());
    }
}
