use super::{Bus, Cpu, Flags, Instruction};

impl Cpu {
    /// RLC/RRC/RL/RR/SLA/SRA/SWAP/SRL r
    pub(super) fn cb_rotate(&mut self, bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let cb = ins.cb_opcode();
        let target = cb & 0x07;
        let value = self.read_operand(bus, target);
        let result = self.alu_rotate((cb >> 3) & 0x07, value);
        self.write_operand(bus, target, result);
        self.advance(ins);
        if target == 6 {
            16
        } else {
            8
        }
    }

    /// BIT b,r: Z = !bit, N cleared, H set, C preserved.
    pub(super) fn cb_bit(&mut self, bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let cb = ins.cb_opcode();
        let target = cb & 0x07;
        let bit = (cb >> 3) & 0x07;
        let value = self.read_operand(bus, target);

        self.set_flag(Flags::Z, value & (1 << bit) == 0);
        self.set_flag(Flags::N, false);
        self.set_flag(Flags::H, true);
        self.advance(ins);
        if target == 6 {
            12
        } else {
            8
        }
    }

    /// RES b,r
    pub(super) fn cb_res(&mut self, bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let cb = ins.cb_opcode();
        let target = cb & 0x07;
        let value = self.read_operand(bus, target) & !(1 << ((cb >> 3) & 0x07));
        self.write_operand(bus, target, value);
        self.advance(ins);
        if target == 6 {
            16
        } else {
            8
        }
    }

    /// SET b,r
    pub(super) fn cb_set(&mut self, bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let cb = ins.cb_opcode();
        let target = cb & 0x07;
        let value = self.read_operand(bus, target) | (1 << ((cb >> 3) & 0x07));
        self.write_operand(bus, target, value);
        self.advance(ins);
        if target == 6 {
            16
        } else {
            8
        }
    }
}
