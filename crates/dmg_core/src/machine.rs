mod bus;
mod cartridge;
mod control;
mod emulator;
mod timing;


pub use bus::MemoryBus;
pub use cartridge::{Cartridge, CartridgeHeader, CartridgeKind, RomOnly};
pub use control::{Command, ControlHandle};
pub use emulator::{Emulator, RunConfig, RunStop, StepOutcome};
pub use timing::{Clock, RealtimeClock, Scheduler, VirtualClock, CPU_HZ};
