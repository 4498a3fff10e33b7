//! Command implementations behind the `dmg` binary.

mod debugger;

pub use debugger::{repl, DebugCommand, Debugger, Flow};

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use dmg_core::disasm::disassemble_rom;
use dmg_core::{Emulator, Flags, Reg16, RegisterFile, RunConfig, RunStop};

/// Entry point of a cartridge, where listings start by default.
const ENTRY_POINT: usize = 0x0100;

/// Parse an address written as `0x1A2B`, `$1A2B` or bare hex.
pub fn parse_addr(text: &str) -> Result<u16> {
    let digits = text
        .trim()
        .trim_start_matches("0x")
        .trim_start_matches("0X")
        .trim_start_matches('$');
    if digits.is_empty() {
        bail!("empty address");
    }
    u16::from_str_radix(digits, 16).with_context(|| format!("invalid address '{text}'"))
}

pub fn load_emulator(path: &Path) -> Result<Emulator> {
    let mut emu = Emulator::new();
    emu.load_rom_file(path)
        .with_context(|| format!("loading ROM {}", path.display()))?;
    Ok(emu)
}

/// One-line register dump used by `run` and the debugger.
pub fn format_registers(regs: &RegisterFile, ime: bool, cycles: u64) -> String {
    let flags = regs.flags();
    let flag = |f: Flags, c: char| if flags.contains(f) { c } else { '-' };
    format!(
        "AF={:04X} BC={:04X} DE={:04X} HL={:04X} SP={:04X} PC={:04X} [{}{}{}{}] IME={} cycles={}",
        regs.get16(Reg16::AF),
        regs.get16(Reg16::BC),
        regs.get16(Reg16::DE),
        regs.get16(Reg16::HL),
        regs.get16(Reg16::SP),
        regs.get16(Reg16::PC),
        flag(Flags::Z, 'Z'),
        flag(Flags::N, 'N'),
        flag(Flags::H, 'H'),
        flag(Flags::C, 'C'),
        u8::from(ime),
        cycles,
    )
}

/// Run a ROM until it stops, then print where it ended up.
pub fn run_rom(path: &Path, config: &RunConfig) -> Result<()> {
    let mut emu = load_emulator(path)?;
    log::info!(
        "running {} ({})",
        path.display(),
        if config.realtime { "realtime" } else { "unthrottled" }
    );

    let stop = emu.run_with(config).with_context(|| {
        format!(
            "emulation halted: {}",
            format_registers(emu.registers(), emu.ime(), emu.cycles())
        )
    })?;
    match stop {
        RunStop::Limit => log::info!("instruction budget exhausted"),
        RunStop::Breakpoint(addr) => log::info!("breakpoint at {addr:#06x}"),
        RunStop::Paused => log::info!("paused"),
    }
    println!(
        "{}",
        format_registers(emu.registers(), emu.ime(), emu.cycles())
    );
    Ok(())
}

/// Write a linear listing of `path`.
///
/// With `gbrom` the image is treated as a cartridge: the header title is
/// printed and the listing starts at the entry point.
pub fn disasm_file(
    path: &Path,
    gbrom: bool,
    start: Option<usize>,
    end: Option<usize>,
    out: &mut impl Write,
) -> Result<()> {
    let image =
        std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;

    let default_start = if gbrom { ENTRY_POINT } else { 0 };
    let start = start.unwrap_or(default_start);
    let end = end.unwrap_or(image.len());
    if start > image.len() {
        bail!(
            "start {start:#06x} is past the end of a {} byte image",
            image.len()
        );
    }

    if gbrom {
        match dmg_core::CartridgeHeader::parse(&image) {
            Some(header) => writeln!(out, "; {} ({:?})", header.title, header.kind)?,
            None => log::warn!("{} is too short for a cartridge header", path.display()),
        }
    }
    for line in disassemble_rom(&image, start, end) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}
