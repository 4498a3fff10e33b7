use crate::cpu::{Bus, Cpu, Instruction};

impl Cpu {
    /// Target of a relative jump: displacement counts from the byte after
    /// the instruction.
    fn relative_target(&self, ins: &Instruction) -> u16 {
        self.regs
            .pc()
            .wrapping_add(ins.len())
            .wrapping_add(ins.offset() as i16 as u16)
    }

    /// JR r8
    pub(in crate::cpu) fn jr(&mut self, _bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let target = self.relative_target(ins);
        self.regs.set_pc(target);
        12
    }

    /// JR cc,r8
    pub(in crate::cpu) fn jr_cc(&mut self, _bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let cc = (ins.opcode() >> 3) & 0x03;
        if self.condition(cc) {
            let target = self.relative_target(ins);
            self.regs.set_pc(target);
            12
        } else {
            self.advance(ins);
            8
        }
    }

    /// JP a16
    pub(in crate::cpu) fn jp(&mut self, _bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        self.regs.set_pc(ins.imm16());
        16
    }

    /// JP cc,a16
    pub(in crate::cpu) fn jp_cc(&mut self, _bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let cc = (ins.opcode() >> 3) & 0x03;
        if self.condition(cc) {
            self.regs.set_pc(ins.imm16());
            16
        } else {
            self.advance(ins);
            12
        }
    }

    /// JP (HL)
    pub(in crate::cpu) fn jp_hl(&mut self, _bus: &mut dyn Bus, _ins: &Instruction) -> u32 {
        self.regs.set_pc(self.regs.hl());
        4
    }

    /// CALL a16
    pub(in crate::cpu) fn call(&mut self, bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let ret = self.regs.pc().wrapping_add(ins.len());
        self.push_u16(bus, ret);
        self.regs.set_pc(ins.imm16());
        24
    }

    /// CALL cc,a16
    pub(in crate::cpu) fn call_cc(&mut self, bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let cc = (ins.opcode() >> 3) & 0x03;
        if self.condition(cc) {
            self.call(bus, ins)
        } else {
            self.advance(ins);
            12
        }
    }

    pub(in crate::cpu) fn ret(&mut self, bus: &mut dyn Bus, _ins: &Instruction) -> u32 {
        let addr = self.pop_u16(bus);
        self.regs.set_pc(addr);
        16
    }

    /// RET cc
    pub(in crate::cpu) fn ret_cc(&mut self, bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let cc = (ins.opcode() >> 3) & 0x03;
        if self.condition(cc) {
            let addr = self.pop_u16(bus);
            self.regs.set_pc(addr);
            20
        } else {
            self.advance(ins);
            8
        }
    }

    /// RETI: return and enable IME with no delay.
    pub(in crate::cpu) fn reti(&mut self, bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let cycles = self.ret(bus, ins);
        self.ime = true;
        cycles
    }

    /// RST n: call to the fixed vector encoded in bits 3-5.
    pub(in crate::cpu) fn rst(&mut self, bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        let vector = (ins.opcode() & 0x38) as u16;
        let ret = self.regs.pc().wrapping_add(ins.len());
        self.push_u16(bus, ret);
        self.regs.set_pc(vector);
        16
    }
}
