//! Text rendering of instructions from the descriptor tables.

use std::fmt;

use crate::cpu::{lookup, Instruction, OpcodeInfo};

/// One decoded instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Disassembly {
    pub text: String,
    /// Encoded length in bytes.
    pub length: u8,
    pub illegal: bool,
}

/// A listing line: address, raw bytes and text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub addr: usize,
    pub bytes: Vec<u8>,
    pub text: String,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self
            .bytes
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "{:04X}: {bytes:<9} {}", self.addr, self.text)
    }
}

/// Disassemble the instruction at the start of `bytes`, which were read
/// from `addr`. Missing trailing operand bytes read as zero.
pub fn disassemble(bytes: &[u8], addr: u16) -> Disassembly {
    disassemble_from(bytes, Location::Bus(addr))
}

/// Linear sweep over `rom[start..end]`. An instruction running past `end`
/// is still shown whole as long as its bytes exist.
///
/// Images larger than the 64 KiB address space are listed by file offset,
/// and relative jump targets are file offsets too.
pub fn disassemble_rom(rom: &[u8], start: usize, end: usize) -> Vec<Line> {
    let end = end.min(rom.len());
    let flat = rom.len() > 0x1_0000;
    let mut lines = Vec::new();
    let mut offset = start;

    while offset < end {
        let window = &rom[offset..rom.len().min(offset + 3)];
        let location = if flat {
            Location::File(offset)
        } else {
            Location::Bus(offset as u16)
        };
        let dis = disassemble_from(window, location);
        let len = (dis.length as usize).min(rom.len() - offset);
        lines.push(Line {
            addr: offset,
            bytes: rom[offset..offset + len].to_vec(),
            text: dis.text,
        });
        offset += len;
    }
    lines
}

/// Where an instruction was read from, for resolving relative jumps.
#[derive(Clone, Copy)]
enum Location {
    /// CPU address; targets wrap at 0xFFFF.
    Bus(u16),
    /// Offset into an image bigger than the address space.
    File(usize),
}

impl Location {
    fn relative_target(self, len: u16, offset: i8) -> usize {
        match self {
            Location::Bus(addr) => {
                let target = addr.wrapping_add(len).wrapping_add(offset as i16 as u16);
                usize::from(target)
            }
            Location::File(addr) => (addr + usize::from(len))
                .checked_add_signed(isize::from(offset))
                .unwrap_or(0),
        }
    }
}

fn disassemble_from(bytes: &[u8], location: Location) -> Disassembly {
    let mut buf = [0u8; 3];
    let n = bytes.len().min(3);
    buf[..n].copy_from_slice(&bytes[..n]);

    let info = lookup(buf[0], buf[1]);
    let instruction = Instruction::new(&buf[..info.length.max(1) as usize]);
    Disassembly {
        text: render(info, &instruction, location),
        length: info.length.max(1),
        illegal: info.is_illegal(),
    }
}

fn render(info: &OpcodeInfo, ins: &Instruction, location: Location) -> String {
    let template = info.mnemonic.as_str();

    if template.contains("d16") || template.contains("a16") {
        let value = format!("${:04X}", ins.imm16());
        return template.replace("d16", &value).replace("a16", &value);
    }
    if template.contains("a8") {
        return template.replace("a8", &format!("$FF{:02X}", ins.imm8()));
    }
    if template.contains("d8") {
        return template.replace("d8", &format!("${:02X}", ins.imm8()));
    }
    if template.contains("r8") {
        let offset = ins.offset();
        if template.starts_with("JR") {
            let target = location.relative_target(ins.len(), offset);
            return template.replace("r8", &format!("${target:04X}"));
        }
        if template.contains("+r8") {
            let signed = if offset < 0 {
                format!("-{}", offset.unsigned_abs())
            } else {
                format!("+{offset}")
            };
            return template.replace("+r8", &signed);
        }
        return template.replace("r8", &offset.to_string());
    }
    template.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediates_are_substituted() {
        assert_eq!(disassemble(&[0x0E, 0xAD], 0).text, "LD C,$AD");
        assert_eq!(disassemble(&[0xC3, 0x50, 0x01], 0x100).text, "JP $0150");
        assert_eq!(disassemble(&[0x31, 0xFE, 0xFF], 0).text, "LD SP,$FFFE");
        assert_eq!(disassemble(&[0xE0, 0x40], 0).text, "LDH ($FF40),A");
        assert_eq!(disassemble(&[0xFE, 0x90], 0).text, "CP $90");
    }

    #[test]
    fn relative_jumps_show_target() {
        let dis = disassemble(&[0x20, 0xFE], 0x0150);
        assert_eq!(dis.text, "JR NZ,$0150");
        assert_eq!(dis.length, 2);
        assert_eq!(disassemble(&[0x18, 0x05], 0x0200).text, "JR $0207");
    }

    #[test]
    fn relative_targets_wrap_in_address_space() {
        assert_eq!(disassemble(&[0x18, 0x10], 0xFFF8).text, "JR $000A");
        assert_eq!(disassemble(&[0x18, 0xF0], 0x0004).text, "JR $FFF6");
    }

    #[test]
    fn large_images_use_file_offsets() {
        let mut rom = vec![0u8; 0x2_0000];
        // JR -2 at 0x14000, JR +4 just below the 64 KiB mark.
        rom[0x1_4000..0x1_4002].copy_from_slice(&[0x18, 0xFE]);
        rom[0xFFFE..0x1_0000].copy_from_slice(&[0x18, 0x04]);

        let lines = disassemble_rom(&rom, 0x1_4000, 0x1_4002);
        assert_eq!(lines[0].to_string(), "14000: 18 FE     JR $14000");

        let lines = disassemble_rom(&rom, 0xFFFE, 0x1_0000);
        assert_eq!(lines[0].text, "JR $10004");
    }

    #[test]
    fn signed_stack_offsets() {
        assert_eq!(disassemble(&[0xE8, 0xFD], 0).text, "ADD SP,-3");
        assert_eq!(disassemble(&[0xF8, 0x05], 0).text, "LD HL,SP+5");
        assert_eq!(disassemble(&[0xF8, 0x80], 0).text, "LD HL,SP-128");
    }

    #[test]
    fn cb_and_illegal_opcodes() {
        assert_eq!(disassemble(&[0xCB, 0x7C], 0).text, "BIT 7,H");
        let dis = disassemble(&[0xDD], 0);
        assert_eq!(dis.text, "DB $DD");
        assert!(dis.illegal);
        assert_eq!(dis.length, 1);
    }

    #[test]
    fn rom_sweep_formats_lines() {
        let rom = [0x00, 0xC3, 0x50, 0x01, 0xAF, 0xCB];
        let lines = disassemble_rom(&rom, 0, rom.len());

        let text: Vec<String> = lines.iter().map(ToString::to_string).collect();
        assert_eq!(
            text,
            vec![
                "0000: 00        NOP",
                "0001: C3 50 01  JP $0150",
                "0004: AF        XOR A",
                "0005: CB        RLC B",
            ]
        );
    }
}
