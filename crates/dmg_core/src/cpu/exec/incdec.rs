use crate::cpu::{Bus, Cpu, Instruction, Reg16};

impl Cpu {
    /// INC r / INC (HL)
    pub(in crate::cpu) fn inc_r(&mut self, bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let target = (ins.opcode() >> 3) & 0x07;
        let value = self.read_operand(bus, target);
        let result = self.alu_inc8(value);
        self.write_operand(bus, target, result);
        self.advance(ins);
        if target == 6 {
            12
        } else {
            4
        }
    }

    /// DEC r / DEC (HL)
    pub(in crate::cpu) fn dec_r(&mut self, bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let target = (ins.opcode() >> 3) & 0x07;
        let value = self.read_operand(bus, target);
        let result = self.alu_dec8(value);
        self.write_operand(bus, target, result);
        self.advance(ins);
        if target == 6 {
            12
        } else {
            4
        }
    }

    /// INC rr. No flags.
    pub(in crate::cpu) fn inc_rr(&mut self, _bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let reg = Reg16::from_rp(ins.opcode() >> 4);
        self.regs.set16(reg, self.regs.get16(reg).wrapping_add(1));
        self.advance(ins);
        8
    }

    /// DEC rr. No flags.
    pub(in crate::cpu) fn dec_rr(&mut self, _bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let reg = Reg16::from_rp(ins.opcode() >> 4);
        self.regs.set16(reg, self.regs.get16(reg).wrapping_sub(1));
        self.advance(ins);
        8
    }
}
