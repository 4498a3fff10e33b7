use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// Requests from outside the step loop. Drained once per step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Pause,
    Resume,
    AddBreakpoint(u16),
    RemoveBreakpoint(u16),
}

/// Cloneable handle for driving an [`Emulator`](super::Emulator) from
/// another thread.
///
/// Pause and resume flip the shared flag directly so they take effect on
/// the very next step; breakpoint edits go through the command channel.
#[derive(Clone, Debug)]
pub struct ControlHandle {
    commands: Sender<Command>,
    paused: Arc<AtomicBool>,
    cycles: Arc<AtomicU64>,
}

impl ControlHandle {
    pub(super) fn new(
        commands: Sender<Command>,
        paused: Arc<AtomicBool>,
        cycles: Arc<AtomicU64>,
    ) -> Self {
        Self {
            commands,
            paused,
            cycles,
        }
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

    /// Deliver a command. Returns `false` once the emulator is gone.
    pub fn send(&self, command: Command) -> bool {
        match command {
            Command::Pause => {
                self.pause();
                true
            }
            Command::Resume => {
                self.resume();
                true
            }
            _ => self.commands.send(command).is_ok(),
        }
    }

    pub fn add_breakpoint(&self, addr: u16) -> bool {
        self.send(Command::AddBreakpoint(addr))
    }

    pub fn remove_breakpoint(&self, addr: u16) -> bool {
        self.send(Command::RemoveBreakpoint(addr))
    }

    /// Total cycles executed, as last published by the step loop.
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }
}
