use crate::cpu::{Bus, Cpu, Flags, Instruction, Reg16};

impl Cpu {
    /// ADD/ADC/SUB/SBC/AND/XOR/OR/CP with a register or (HL) operand.
    pub(in crate::cpu) fn alu_r(&mut self, bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let op = (ins.opcode() >> 3) & 0x07;
        let src = ins.opcode() & 0x07;
        let value = self.read_operand(bus, src);
        self.alu_op(op, value);
        self.advance(ins);
        if src == 6 {
            8
        } else {
            4
        }
    }

    /// The same eight operations with an immediate operand.
    pub(in crate::cpu) fn alu_d8(&mut self, _bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        self.alu_op((ins.opcode() >> 3) & 0x07, ins.imm8());
        self.advance(ins);
        8
    }

    /// ADD HL,rr
    pub(in crate::cpu) fn add_hl_rr(&mut self, _bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let value = self.regs.get16(Reg16::from_rp(ins.opcode() >> 4));
        self.alu_add16_hl(value);
        self.advance(ins);
        8
    }

    /// ADD SP,r8
    pub(in crate::cpu) fn add_sp_r8(&mut self, _bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let value = self.alu_add16_signed(self.regs.sp(), ins.offset());
        self.regs.set_sp(value);
        self.advance(ins);
        16
    }

    pub(in crate::cpu) fn daa(&mut self, _bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        self.alu_daa();
        self.advance(ins);
        4
    }

    pub(in crate::cpu) fn cpl(&mut self, _bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        self.regs.set_a(!self.regs.a());
        self.set_flag(Flags::N, true);
        self.set_flag(Flags::H, true);
        self.advance(ins);
        4
    }

    pub(in crate::cpu) fn scf(&mut self, _bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        self.set_flag(Flags::N, false);
        self.set_flag(Flags::H, false);
        self.set_flag(Flags::C, true);
        self.advance(ins);
        4
    }

    pub(in crate::cpu) fn ccf(&mut self, _bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let carry = self.flag(Flags::C);
        self.set_flag(Flags::N, false);
        self.set_flag(Flags::H, false);
        self.set_flag(Flags::C, !carry);
        self.advance(ins);
        4
    }

    /// A-only rotates share the CB rotate core but always clear Z.
    fn rotate_a(&mut self, op: u8, ins: &Instruction) -> u32 {
        let result = self.alu_rotate(op, self.regs.a());
        self.regs.set_a(result);
        self.set_flag(Flags::Z, false);
        self.advance(ins);
        4
    }

    pub(in crate::cpu) fn rlca(&mut self, _bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        self.rotate_a(0, ins)
    }

    pub(in crate::cpu) fn rrca(&mut self, _bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        self.rotate_a(1, ins)
    }

    pub(in crate::cpu) fn rla(&mut self, _bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        self.rotate_a(2, ins)
    }

    pub(in crate::cpu) fn rra(&mut self, _bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        self.rotate_a(3, ins)
    }
}
