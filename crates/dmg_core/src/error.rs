use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("failed to read ROM image {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("ROM image is empty")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("illegal opcode {opcode:#04x} at {pc:#06x}")]
    IllegalOpcode { opcode: u8, pc: u16 },
}

#[derive(Debug, Error)]
pub enum EmuError {
    #[error("failed to load ROM")]
    RomLoad(#[from] CartridgeError),
    #[error(transparent)]
    Cpu(#[from] CpuError),
}
