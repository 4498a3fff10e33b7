use crate::cpu::{Bus, Cpu, Instruction, Reg16};

impl Cpu {
    /// PUSH rr (BC, DE, HL, AF)
    pub(in crate::cpu) fn push_rr(&mut self, bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let value = self.regs.get16(Reg16::from_rp2(ins.opcode() >> 4));
        self.push_u16(bus, value);
        self.advance(ins);
        16
    }

    /// POP rr. POP AF drops the low nibble of F.
    pub(in crate::cpu) fn pop_rr(&mut self, bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let value = self.pop_u16(bus);
        self.regs.set16(Reg16::from_rp2(ins.opcode() >> 4), value);
        self.advance(ins);
        12
    }
}
