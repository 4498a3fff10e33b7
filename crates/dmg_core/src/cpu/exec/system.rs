use crate::cpu::{Bus, Cpu, Instruction, CB_OPCODES};

impl Cpu {
    pub(in crate::cpu) fn nop(&mut self, _bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        self.advance(ins);
        4
    }

    /// HALT is decoded but does not suspend the core; execution carries
    /// on with the next instruction.
    pub(in crate::cpu) fn halt(&mut self, _bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        log::debug!("HALT at {:#06x} treated as NOP", self.regs.pc());
        self.advance(ins);
        4
    }

    /// STOP skips its padding byte and otherwise behaves like HALT.
    pub(in crate::cpu) fn stop(&mut self, _bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        log::debug!("STOP at {:#06x} treated as NOP", self.regs.pc());
        self.advance(ins);
        4
    }

    /// DI takes effect at once and cancels an EI still in flight.
    pub(in crate::cpu) fn di(&mut self, _bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        self.ime = false;
        self.ime_enable_pending = false;
        self.ime_enable_delay = false;
        self.advance(ins);
        4
    }

    /// EI arms IME for after the next instruction.
    pub(in crate::cpu) fn ei(&mut self, _bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        self.ime_enable_pending = true;
        self.advance(ins);
        4
    }

    /// 0xCB: run the CB table entry named by the second byte. `decode`
    /// already resolves the prefix itself; this covers callers holding
    /// the unprefixed descriptor.
    pub(in crate::cpu) fn prefix_cb(&mut self, bus: &mut dyn Bus, ins: &Instruction) -> u32 {
        match CB_OPCODES[ins.cb_opcode() as usize].handler {
            Some(handler) => handler(self, bus, ins),
            // Every CB byte is defined.
            None => unreachable!("CB {:#04x} has no handler", ins.cb_opcode()),
        }
    }
}
