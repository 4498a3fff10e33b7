//! Game Boy (DMG) CPU core.
//!
//! The crate is split the same way the hardware is: `cpu` owns the
//! register file, the opcode descriptor tables and the instruction
//! semantics, while `machine` wires the CPU to a memory bus, a
//! cartridge and a cycle clock behind the [`Emulator`] front door.

pub mod cpu;
pub mod disasm;
pub mod error;
pub mod machine;

pub use cpu::{Bus, Cpu, Flags, Reg16, Reg8, RegisterFile};
pub use error::{CartridgeError, CpuError, EmuError};
pub use machine::{
    Cartridge, CartridgeHeader, CartridgeKind, Clock, Command, ControlHandle, Emulator, MemoryBus,
    RealtimeClock, RomOnly, RunConfig, RunStop, Scheduler, StepOutcome, VirtualClock,
};
