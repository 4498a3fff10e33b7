use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dmg_core::RunConfig;

#[derive(Parser, Debug)]
#[command(name = "dmg", version, about = "Game Boy CPU core runner, debugger and disassembler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute a ROM until it stops or hits the instruction budget.
    Run {
        rom: PathBuf,
        /// Pace execution to the 4.19 MHz DMG clock.
        #[arg(long)]
        realtime: bool,
        #[arg(long, value_name = "N")]
        max_instructions: Option<u64>,
    },
    /// Interactive line debugger.
    Debug { rom: PathBuf },
    /// Print a linear disassembly of a file.
    Disasm {
        file: PathBuf,
        /// Treat the file as a cartridge image (header, entry point).
        #[arg(long)]
        gbrom: bool,
        #[arg(long, value_parser = parse_offset)]
        start: Option<usize>,
        #[arg(long, value_parser = parse_offset)]
        end: Option<usize>,
    },
}

fn parse_offset(text: &str) -> Result<usize, String> {
    let digits = text
        .trim_start_matches("0x")
        .trim_start_matches("0X")
        .trim_start_matches('$');
    usize::from_str_radix(digits, 16).map_err(|e| format!("invalid offset '{text}': {e}"))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            rom,
            realtime,
            max_instructions,
        } => {
            let config = RunConfig::builder()
                .realtime(realtime)
                .max_instructions(max_instructions)
                .build();
            dmg::run_rom(&rom, &config)
        }
        Commands::Debug { rom } => {
            let mut emu = dmg::load_emulator(&rom)?;
            dmg::repl(&mut emu)
        }
        Commands::Disasm {
            file,
            gbrom,
            start,
            end,
        } => {
            let stdout = std::io::stdout();
            dmg::disasm_file(&file, gbrom, start, end, &mut stdout.lock())
        }
    }
}
