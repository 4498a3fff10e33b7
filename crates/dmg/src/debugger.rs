//! Line-oriented debugger over an [`Emulator`].

use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

use anyhow::{bail, Context, Result};
use dmg_core::{Emulator, RealtimeClock, RunStop, VirtualClock};

use crate::{format_registers, parse_addr};

const DEFAULT_DUMP_LEN: usize = 16;
const DEFAULT_LISTING_LEN: usize = 8;

const HELP: &str = "\
b|break ADDR     set a breakpoint
d|delete ADDR    remove a breakpoint
bl|breakpoints   list breakpoints
n|next [N]       execute N instructions (default 1)
c|continue       run until a breakpoint or pause (type p to pause)
r|run            reset and run
regs             show registers
x ADDR [N]       dump N bytes of memory
dis [ADDR] [N]   disassemble N instructions (default at PC)
q|quit           leave the debugger";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebugCommand {
    Break(u16),
    Delete(u16),
    Breakpoints,
    Next(u64),
    Continue,
    Run,
    Regs,
    Examine(u16, usize),
    Disassemble(Option<u16>, usize),
    Help,
    Quit,
}

impl DebugCommand {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let addr_arg = |i: usize| -> Result<u16> {
            match args.get(i) {
                Some(text) => parse_addr(text),
                None => bail!("{name}: missing address"),
            }
        };
        let count_arg = |i: usize, default: usize| -> Result<usize> {
            match args.get(i) {
                Some(text) => text
                    .parse()
                    .with_context(|| format!("{name}: invalid count '{text}'")),
                None => Ok(default),
            }
        };

        let command = match name {
            "b" | "break" => DebugCommand::Break(addr_arg(0)?),
            "d" | "delete" => DebugCommand::Delete(addr_arg(0)?),
            "bl" | "breakpoints" => DebugCommand::Breakpoints,
            "n" | "next" => DebugCommand::Next(count_arg(0, 1)? as u64),
            "c" | "continue" => DebugCommand::Continue,
            "r" | "run" => DebugCommand::Run,
            "regs" => DebugCommand::Regs,
            "x" => DebugCommand::Examine(addr_arg(0)?, count_arg(1, DEFAULT_DUMP_LEN)?),
            "dis" => {
                let addr = args.first().map(|text| parse_addr(text)).transpose()?;
                DebugCommand::Disassemble(addr, count_arg(1, DEFAULT_LISTING_LEN)?)
            }
            "h" | "help" | "?" => DebugCommand::Help,
            "q" | "quit" => DebugCommand::Quit,
            other => bail!("unknown command '{other}' (try help)"),
        };
        Ok(Some(command))
    }
}

/// What the REPL should do after a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Debugger<'a> {
    emu: &'a mut Emulator,
}

impl<'a> Debugger<'a> {
    pub fn new(emu: &'a mut Emulator) -> Self {
        Self { emu }
    }

    /// Execute `command`, writing its output to `out`. Emulation errors are
    /// reported to `out`; only I/O failures are returned.
    pub fn execute(&mut self, command: DebugCommand, out: &mut impl Write) -> Result<Flow> {
        match command {
            DebugCommand::Break(addr) => {
                if self.emu.add_breakpoint(addr) {
                    writeln!(out, "breakpoint set at ${addr:04X}")?;
                } else {
                    writeln!(out, "breakpoint already set at ${addr:04X}")?;
                }
            }
            DebugCommand::Delete(addr) => {
                if self.emu.remove_breakpoint(addr) {
                    writeln!(out, "breakpoint removed at ${addr:04X}")?;
                } else {
                    writeln!(out, "no breakpoint at ${addr:04X}")?;
                }
            }
            DebugCommand::Breakpoints => {
                let addrs: Vec<String> = self
                    .emu
                    .breakpoints()
                    .map(|addr| format!("${addr:04X}"))
                    .collect();
                if addrs.is_empty() {
                    writeln!(out, "no breakpoints")?;
                } else {
                    writeln!(out, "{}", addrs.join(" "))?;
                }
            }
            DebugCommand::Next(count) => {
                for _ in 0..count {
                    if let Err(err) = self.emu.step() {
                        writeln!(out, "error: {err}")?;
                        break;
                    }
                }
                self.emu.settle(&mut VirtualClock);
                self.show_current(out)?;
            }
            DebugCommand::Continue => {
                self.emu.resume();
                self.continue_run(out)?;
            }
            DebugCommand::Run => {
                self.emu.reset();
                self.continue_run(out)?;
            }
            DebugCommand::Regs => {
                writeln!(
                    out,
                    "{}",
                    format_registers(self.emu.registers(), self.emu.ime(), self.emu.cycles())
                )?;
            }
            DebugCommand::Examine(addr, len) => {
                let bytes = self.emu.peek_range(addr, len);
                for (row, chunk) in bytes.chunks(16).enumerate() {
                    let line = chunk
                        .iter()
                        .map(|b| format!("{b:02X}"))
                        .collect::<Vec<_>>()
                        .join(" ");
                    let row_addr = addr.wrapping_add((row * 16) as u16);
                    writeln!(out, "{row_addr:04X}: {line}")?;
                }
            }
            DebugCommand::Disassemble(addr, count) => {
                let mut addr = addr.unwrap_or_else(|| self.emu.pc());
                for _ in 0..count {
                    let dis = self.emu.disassemble_at(addr);
                    writeln!(out, "{addr:04X}: {}", dis.text)?;
                    addr = addr.wrapping_add(dis.length as u16);
                }
            }
            DebugCommand::Help => writeln!(out, "{HELP}")?,
            DebugCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn continue_run(&mut self, out: &mut impl Write) -> Result<()> {
        let mut scheduler = RealtimeClock::default();
        match self.emu.run(&mut scheduler, None) {
            Ok(RunStop::Breakpoint(addr)) => writeln!(out, "breakpoint at ${addr:04X}")?,
            Ok(RunStop::Paused) => writeln!(out, "paused")?,
            Ok(RunStop::Limit) => {}
            Err(err) => writeln!(out, "error: {err}")?,
        }
        self.show_current(out)
    }

    fn show_current(&self, out: &mut impl Write) -> Result<()> {
        let pc = self.emu.pc();
        writeln!(out, "{pc:04X}: {}", self.emu.disassemble_at(pc).text)?;
        Ok(())
    }
}

/// Interactive loop on stdin/stdout.
///
/// Stdin is read on its own thread so that `p`/`pause` reaches the
/// emulator while `continue` is running on this one.
pub fn repl(emu: &mut Emulator) -> Result<()> {
    let control = emu.control();
    let (lines_tx, lines) = mpsc::channel::<String>();

    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if matches!(line.trim(), "p" | "pause") {
                control.pause();
                continue;
            }
            if lines_tx.send(line).is_err() {
                break;
            }
        }
    });

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut debugger = Debugger::new(emu);
    debugger.show_current(&mut out)?;
    write!(out, "> ")?;
    out.flush()?;

    for line in lines {
        let flow = match DebugCommand::parse(&line) {
            Ok(Some(command)) => debugger.execute(command, &mut out)?,
            Ok(None) => Flow::Continue,
            Err(err) => {
                writeln!(out, "{err:#}")?;
                Flow::Continue
            }
        };
        if flow == Flow::Quit {
            break;
        }
        write!(out, "> ")?;
        out.flush()?;
    }
    Ok(())
}
