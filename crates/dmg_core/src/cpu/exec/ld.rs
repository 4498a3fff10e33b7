use crate::cpu::{Bus, Cpu, Instruction, Reg16, Reg8};

impl Cpu {
    /// LD rr,d16
    pub(in crate::cpu) fn ld_rr_d16(&mut self, _bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let reg = Reg16::from_rp(ins.opcode() >> 4);
        self.regs.set16(reg, ins.imm16());
        self.advance(ins);
        12
    }

    /// Address for the `(BC) (DE) (HL+) (HL-)` column, applying the HL
    /// post-increment or post-decrement.
    fn indirect_addr(&mut self, opcode: u8) -> u16 {
        match (opcode >> 4) & 0x03 {
            0 => self.regs.get16(Reg16::BC),
            1 => self.regs.get16(Reg16::DE),
            2 => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_add(1));
                hl
            }
            _ => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_sub(1));
                hl
            }
        }
    }

    /// LD (BC/DE/HL+/HL-),A
    pub(in crate::cpu) fn ld_indirect_a(&mut self, bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let addr = self.indirect_addr(ins.opcode());
        bus.write8(addr, self.regs.a());
        self.advance(ins);
        8
    }

    /// LD A,(BC/DE/HL+/HL-)
    pub(in crate::cpu) fn ld_a_indirect(&mut self, bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let addr = self.indirect_addr(ins.opcode());
        let value = bus.read8(addr);
        self.regs.set_a(value);
        self.advance(ins);
        8
    }

    /// LD (a16),SP
    pub(in crate::cpu) fn ld_a16_sp(&mut self, bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let addr = ins.imm16();
        let [hi, lo] = self.regs.sp().to_be_bytes();
        bus.write8(addr, lo);
        bus.write8(addr.wrapping_add(1), hi);
        self.advance(ins);
        20
    }

    /// LD r,d8 and LD (HL),d8
    pub(in crate::cpu) fn ld_r_d8(&mut self, bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let dst = (ins.opcode() >> 3) & 0x07;
        self.write_operand(bus, dst, ins.imm8());
        self.advance(ins);
        if dst == 6 {
            12
        } else {
            8
        }
    }

    /// LD r1,r2 over 0x40-0x7F, minus HALT.
    pub(in crate::cpu) fn ld_r_r(&mut self, bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let dst = (ins.opcode() >> 3) & 0x07;
        let src = ins.opcode() & 0x07;
        let value = self.read_operand(bus, src);
        self.write_operand(bus, dst, value);
        self.advance(ins);
        if dst == 6 || src == 6 {
            8
        } else {
            4
        }
    }

    /// LDH (a8),A
    pub(in crate::cpu) fn ldh_a8_a(&mut self, bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        bus.write8(0xFF00 | ins.imm8() as u16, self.regs.a());
        self.advance(ins);
        12
    }

    /// LDH A,(a8)
    pub(in crate::cpu) fn ldh_a_a8(&mut self, bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let value = bus.read8(0xFF00 | ins.imm8() as u16);
        self.regs.set_a(value);
        self.advance(ins);
        12
    }

    /// LD (C),A
    pub(in crate::cpu) fn ldh_c_a(&mut self, bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let addr = 0xFF00 | self.regs.get8(Reg8::C) as u16;
        bus.write8(addr, self.regs.a());
        self.advance(ins);
        8
    }

    /// LD A,(C)
    pub(in crate::cpu) fn ldh_a_c(&mut self, bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let addr = 0xFF00 | self.regs.get8(Reg8::C) as u16;
        let value = bus.read8(addr);
        self.regs.set_a(value);
        self.advance(ins);
        8
    }

    /// LD (a16),A
    pub(in crate::cpu) fn ld_a16_a(&mut self, bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        bus.write8(ins.imm16(), self.regs.a());
        self.advance(ins);
        16
    }

    /// LD A,(a16)
    pub(in crate::cpu) fn ld_a_a16(&mut self, bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let value = bus.read8(ins.imm16());
        self.regs.set_a(value);
        self.advance(ins);
        16
    }

    /// LD SP,HL
    pub(in crate::cpu) fn ld_sp_hl(&mut self, _bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        self.regs.set_sp(self.regs.hl());
        self.advance(ins);
        8
    }

    /// LD HL,SP+r8
    pub(in crate::cpu) fn ld_hl_sp_r8(&mut self, _bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let value = self.alu_add16_signed(self.regs.sp(), ins.offset());
        self.regs.set_hl(value);
        self.advance(ins);
        12
    }
}
