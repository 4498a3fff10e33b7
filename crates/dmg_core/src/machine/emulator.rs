use std::collections::BTreeSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;

use typed_builder::TypedBuilder;

use crate::cpu::{Cpu, Interrupt, RegisterFile};
use crate::disasm::{self, Disassembly};
use crate::error::{CartridgeError, EmuError};

use super::bus::MemoryBus;
use super::cartridge::{Cartridge, CartridgeHeader};
use super::control::{Command, ControlHandle};
use super::timing::{Clock, RealtimeClock, Scheduler, VirtualClock};

/// Result of a single step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepOutcome {
    /// T-cycles the instruction (or interrupt entry) took.
    pub cycles: u32,
    /// Cycles executed but not yet settled by a scheduler.
    pub owed: u64,
}

/// Why `run` handed control back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStop {
    /// PC reached a breakpoint; the emulator is now paused.
    Breakpoint(u16),
    Paused,
    /// The instruction budget ran out.
    Limit,
}

/// Options for [`Emulator::run_with`].
#[derive(Clone, Debug, TypedBuilder)]
pub struct RunConfig {
    #[builder(default)]
    pub max_instructions: Option<u64>,
    /// Pace execution to the DMG clock instead of running flat out.
    #[builder(default = false)]
    pub realtime: bool,
    /// Minimum lead, in cycles, before the realtime scheduler sleeps.
    #[builder(default = 456)]
    pub sleep_quantum: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RunConfig {
    pub fn scheduler(&self) -> Box<dyn Scheduler> {
        if self.realtime {
            Box::new(RealtimeClock::new(self.sleep_quantum))
        } else {
            Box::new(VirtualClock)
        }
    }
}

/// A DMG: CPU, bus and cartridge plus the run-loop state around them.
///
/// The emulator is either running or paused. Pausing never alters CPU or
/// memory state; it only keeps `run` from fetching. Other threads reach it
/// through a [`ControlHandle`].
pub struct Emulator {
    cpu: Cpu,
    bus: MemoryBus,
    clock: Clock,
    breakpoints: BTreeSet<u16>,
    paused: Arc<AtomicBool>,
    published_cycles: Arc<AtomicU64>,
    commands: Receiver<Command>,
    command_tx: Sender<Command>,
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Emulator {
    /// A ROM-only machine in the post-boot state.
    pub fn new() -> Self {
        Self::with_bus(MemoryBus::new())
    }

    pub fn with_cartridge(cartridge: Box<dyn Cartridge>) -> Self {
        Self::with_bus(MemoryBus::with_cartridge(cartridge))
    }

    fn with_bus(bus: MemoryBus) -> Self {
        let (command_tx, commands) = mpsc::channel();
        Self {
            cpu: Cpu::with_boot_state(),
            bus,
            clock: Clock::new(),
            breakpoints: BTreeSet::new(),
            paused: Arc::new(AtomicBool::new(false)),
            published_cycles: Arc::new(AtomicU64::new(0)),
            commands,
            command_tx,
        }
    }

    /// Load a ROM image into the cartridge.
    ///
    /// Headers naming a mapper are accepted but mapped flat, with a
    /// warning.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), EmuError> {
        self.bus.load_rom(rom)?;
        match self.bus.cartridge_header() {
            Some(header) => {
                log::info!(
                    "loaded {:?}: {:?}, {} bytes",
                    header.title,
                    header.kind,
                    rom.len()
                );
                if !header.kind.is_flat() {
                    log::warn!(
                        "cartridge type {:?} is not supported, mapping as ROM-only",
                        header.kind
                    );
                }
            }
            None => log::info!("loaded {} byte image without a cartridge header", rom.len()),
        }
        Ok(())
    }

    pub fn load_rom_file(&mut self, path: impl AsRef<Path>) -> Result<(), EmuError> {
        let path = path.as_ref();
        let rom = std::fs::read(path).map_err(|source| CartridgeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_rom(&rom)
    }

    /// Back to the post-boot state with the same cartridge and breakpoints.
    pub fn reset(&mut self) {
        self.cpu.apply_boot_state();
        self.bus.reset();
        self.clock = Clock::new();
        self.published_cycles.store(0, Ordering::Relaxed);
        self.resume();
    }

    /// Apply queued control commands.
    fn drain_commands(&mut self) {
        loop {
            match self.commands.try_recv() {
                Ok(Command::Pause) => self.pause(),
                Ok(Command::Resume) => self.resume(),
                Ok(Command::AddBreakpoint(addr)) => {
                    self.add_breakpoint(addr);
                }
                Ok(Command::RemoveBreakpoint(addr)) => {
                    self.remove_breakpoint(addr);
                }
                // The emulator holds a sender itself, so the channel never
                // disconnects while it is alive.
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
    }

    fn execute(&mut self) -> Result<StepOutcome, EmuError> {
        let cycles = self.cpu.step(&mut self.bus)?;
        self.bus.tick(cycles);
        self.clock.charge(cycles);
        self.published_cycles
            .store(self.clock.target(), Ordering::Relaxed);
        Ok(StepOutcome {
            cycles,
            owed: self.clock.owed(),
        })
    }

    /// Execute one instruction (or interrupt entry) regardless of the pause
    /// flag. The cost is charged to the clock; settling it is up to the
    /// caller.
    pub fn step(&mut self) -> Result<StepOutcome, EmuError> {
        self.drain_commands();
        self.execute()
    }

    /// Let `scheduler` settle whatever cycles are still owed.
    pub fn settle<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        scheduler.settle(&mut self.clock);
    }

    /// Step until a breakpoint, a pause request or `limit` instructions.
    ///
    /// The instruction at the starting PC always runs, so continuing from
    /// a breakpoint does not stop on it again.
    pub fn run<S: Scheduler + ?Sized>(
        &mut self,
        scheduler: &mut S,
        limit: Option<u64>,
    ) -> Result<RunStop, EmuError> {
        let mut executed: u64 = 0;
        loop {
            self.drain_commands();
            if self.is_paused() {
                return Ok(RunStop::Paused);
            }

            let pc = self.cpu.regs.pc();
            if executed > 0 && self.breakpoints.contains(&pc) {
                log::info!("breakpoint hit at {pc:#06x}");
                self.pause();
                return Ok(RunStop::Breakpoint(pc));
            }
            if limit.is_some_and(|max| executed >= max) {
                return Ok(RunStop::Limit);
            }

            self.execute()?;
            scheduler.settle(&mut self.clock);
            executed += 1;
        }
    }

    pub fn run_with(&mut self, config: &RunConfig) -> Result<RunStop, EmuError> {
        let mut scheduler = config.scheduler();
        self.run(scheduler.as_mut(), config.max_instructions)
    }

    /// Returns `true` if the breakpoint was not already set.
    pub fn add_breakpoint(&mut self, addr: u16) -> bool {
        self.breakpoints.insert(addr)
    }

    /// Returns `true` if a breakpoint was removed.
    pub fn remove_breakpoint(&mut self, addr: u16) -> bool {
        self.breakpoints.remove(&addr)
    }

    pub fn breakpoints(&self) -> impl Iterator<Item = u16> + '_ {
        self.breakpoints.iter().copied()
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn control(&self) -> ControlHandle {
        ControlHandle::new(
            self.command_tx.clone(),
            Arc::clone(&self.paused),
            Arc::clone(&self.published_cycles),
        )
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.cpu.regs
    }

    pub fn pc(&self) -> u16 {
        self.cpu.regs.pc()
    }

    pub fn ime(&self) -> bool {
        self.cpu.ime
    }

    /// Total T-cycles executed since the last reset.
    pub fn cycles(&self) -> u64 {
        self.clock.target()
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn bus(&self) -> &MemoryBus {
        &self.bus
    }

    pub fn cartridge_header(&self) -> Option<&CartridgeHeader> {
        self.bus.cartridge_header()
    }

    pub fn peek(&self, addr: u16) -> u8 {
        self.bus.read(addr)
    }

    pub fn peek_range(&self, addr: u16, len: usize) -> Vec<u8> {
        self.bus.read_n(addr, len)
    }

    /// Write one byte through the bus, as a store instruction would.
    /// ROM stays read-only.
    pub fn poke(&mut self, addr: u16, value: u8) {
        self.bus.write(addr, value);
    }

    pub fn disassemble_at(&self, addr: u16) -> Disassembly {
        disasm::disassemble(&self.peek_range(addr, 3), addr)
    }

    /// Raise an interrupt request; it is taken on a later step if enabled
    /// in IE and IME is set.
    pub fn request_interrupt(&mut self, interrupt: Interrupt) {
        self.bus.request_interrupt(interrupt.flag());
    }
}
