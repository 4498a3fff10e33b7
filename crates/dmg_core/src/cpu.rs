mod alu;
mod cb;
mod decode;
mod exec;
mod helpers;
mod init;
mod interrupts;
mod regs;

#[cfg(test)]
mod tests;

pub use decode::{
    decode, lookup, Decoded, Handler, Instruction, OpcodeInfo, Timing, CB_OPCODES, OPCODES,
};
pub use interrupts::{Interrupt, InterruptFlags, IE_ADDR, IF_ADDR};
pub use regs::{Flags, Reg16, Reg8, RegisterFile};

use crate::error::CpuError;

/// Abstraction over the Game Boy bus as seen from the CPU.
///
/// Handlers only ever need byte reads and writes; everything else the
/// machine does with elapsed time goes through `tick`.
pub trait Bus {
    fn read8(&mut self, addr: u16) -> u8;
    fn write8(&mut self, addr: u16, value: u8);
    /// Advance bus-side peripherals by a given number of CPU cycles.
    ///
    /// Default implementation does nothing; the system bus overrides this
    /// to drive DIV and LY.
    fn tick(&mut self, _cycles: u32) {}
}

/// Sharp LR35902 core.
///
/// Holds the register file and the interrupt master enable. The EI delay
/// is modelled with two latches so that IME only turns on after the
/// instruction that follows EI has run.
#[derive(Clone, Debug, Default)]
pub struct Cpu {
    pub regs: RegisterFile,
    pub ime: bool,
    ime_enable_pending: bool,
    ime_enable_delay: bool,
}

impl Cpu {
    /// A CPU with every register zeroed, PC at 0x0000 and IME off.
    pub fn new() -> Self {
        Self::default()
    }

    /// True between an EI and the point where IME actually turns on.
    pub fn ime_scheduled(&self) -> bool {
        self.ime_enable_pending || self.ime_enable_delay
    }

    /// Run one decoder pass: service a pending interrupt if IME allows it,
    /// otherwise fetch, decode and execute one instruction.
    ///
    /// Returns the number of T-cycles consumed. An opcode with no handler
    /// leaves PC on the offending byte and reports it.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> Result<u32, CpuError> {
        if let Some(cycles) = self.service_interrupts(bus) {
            return Ok(cycles);
        }

        let pc = self.regs.pc();
        let decoded = decode(bus, pc);
        let Some(handler) = decoded.info.handler else {
            let opcode = decoded.instruction.opcode();
            log::error!("illegal opcode {opcode:#04x} at {pc:#06x}");
            return Err(CpuError::IllegalOpcode { opcode, pc });
        };

        log::trace!("{pc:04X}  {}", decoded.info.mnemonic);
        let cycles = handler(self, bus, &decoded.instruction);
        self.advance_ime_delay();
        Ok(cycles)
    }

    fn advance_ime_delay(&mut self) {
        if self.ime_enable_delay {
            self.ime = true;
            self.ime_enable_delay = false;
        } else if self.ime_enable_pending {
            self.ime_enable_pending = false;
            self.ime_enable_delay = true;
        }
    }
}
