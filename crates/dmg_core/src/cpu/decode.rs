//! Opcode descriptor tables and the fetch/decode half of a step.
//!
//! Both tables are built once from the usual `x/y/z/p/q` field split of
//! the opcode byte and hold one descriptor per byte value, illegal
//! encodings included.

use std::fmt;

use lazy_static::lazy_static;

use super::{Bus, Cpu};

/// Instruction handler. Receives the full instruction bytes and returns
/// the T-cycles consumed. Handlers own PC: they either advance it past
/// the instruction or set it to a branch target.
pub type Handler = fn(&mut Cpu, &mut dyn Bus, &Instruction) -> u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timing {
    Fixed(u32),
    /// Conditional control flow: the cost depends on whether the branch
    /// is taken.
    Branch { taken: u32, not_taken: u32 },
    /// The 0xCB prefix entry; the real cost lives in the CB table.
    Prefixed,
}

impl Timing {
    /// Whether `cycles` is a cost this timing can produce.
    pub fn allows(&self, cycles: u32) -> bool {
        match *self {
            Timing::Fixed(n) => cycles == n,
            Timing::Branch { taken, not_taken } => cycles == taken || cycles == not_taken,
            Timing::Prefixed => CB_OPCODES.iter().any(|info| info.timing.allows(cycles)),
        }
    }
}

#[derive(Clone)]
pub struct OpcodeInfo {
    /// Assembly template; `d8`, `d16`, `a8`, `a16` and `r8` stand for the
    /// immediate operand bytes.
    pub mnemonic: String,
    /// Total encoded length including the opcode (and CB prefix).
    pub length: u8,
    pub timing: Timing,
    /// `None` for encodings the LR35902 does not define.
    pub handler: Option<Handler>,
}

impl OpcodeInfo {
    pub fn is_illegal(&self) -> bool {
        self.handler.is_none()
    }
}

impl fmt::Debug for OpcodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpcodeInfo")
            .field("mnemonic", &self.mnemonic)
            .field("length", &self.length)
            .field("timing", &self.timing)
            .field("legal", &self.handler.is_some())
            .finish()
    }
}

/// Raw bytes of one instruction, opcode first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Instruction {
    bytes: [u8; 3],
    len: u8,
}

impl Instruction {
    /// Build from up to three bytes; anything past the third is ignored.
    pub fn new(bytes: &[u8]) -> Self {
        let mut buf = [0u8; 3];
        let len = bytes.len().min(3);
        buf[..len].copy_from_slice(&bytes[..len]);
        Self {
            bytes: buf,
            len: len as u8,
        }
    }

    #[inline]
    pub fn opcode(&self) -> u8 {
        self.bytes[0]
    }

    /// Encoded length in bytes, as a PC increment.
    #[inline]
    pub fn len(&self) -> u16 {
        self.len as u16
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    #[inline]
    pub fn imm8(&self) -> u8 {
        self.bytes[1]
    }

    /// Little-endian 16-bit immediate.
    #[inline]
    pub fn imm16(&self) -> u16 {
        u16::from_le_bytes([self.bytes[1], self.bytes[2]])
    }

    /// Signed displacement used by JR, ADD SP and LD HL,SP+r8.
    #[inline]
    pub fn offset(&self) -> i8 {
        self.bytes[1] as i8
    }

    /// Second byte of a CB-prefixed instruction.
    #[inline]
    pub fn cb_opcode(&self) -> u8 {
        self.bytes[1]
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Decoded {
    pub info: &'static OpcodeInfo,
    pub instruction: Instruction,
}

lazy_static! {
    pub static ref OPCODES: Vec<OpcodeInfo> = (0..=0xFFu8).map(describe).collect();
    pub static ref CB_OPCODES: Vec<OpcodeInfo> = (0..=0xFFu8).map(describe_cb).collect();
}

/// Descriptor for an instruction starting with `opcode`; `next` is only
/// consulted after a 0xCB prefix.
pub fn lookup(opcode: u8, next: u8) -> &'static OpcodeInfo {
    if opcode == 0xCB {
        &CB_OPCODES[next as usize]
    } else {
        &OPCODES[opcode as usize]
    }
}

/// Read the instruction at `pc` and resolve its descriptor. Does not move
/// PC.
pub fn decode(bus: &mut dyn Bus, pc: u16) -> Decoded {
    let opcode = bus.read8(pc);
    let next = bus.read8(pc.wrapping_add(1));
    let info = lookup(opcode, next);

    let mut bytes = [opcode, next, 0];
    if info.length > 2 {
        bytes[2] = bus.read8(pc.wrapping_add(2));
    }
    let instruction = Instruction::new(&bytes[..info.length.max(1) as usize]);
    Decoded { info, instruction }
}

const R8: [&str; 8] = ["B", "C", "D", "E", "H", "L", "(HL)", "A"];
const RP: [&str; 4] = ["BC", "DE", "HL", "SP"];
const RP2: [&str; 4] = ["BC", "DE", "HL", "AF"];
const CC: [&str; 4] = ["NZ", "Z", "NC", "C"];
const ALU: [&str; 8] = [
    "ADD A,", "ADC A,", "SUB ", "SBC A,", "AND ", "XOR ", "OR ", "CP ",
];
const ROT: [&str; 8] = ["RLC", "RRC", "RL", "RR", "SLA", "SRA", "SWAP", "SRL"];

fn op(mnemonic: impl Into<String>, length: u8, timing: Timing, handler: Handler) -> OpcodeInfo {
    OpcodeInfo {
        mnemonic: mnemonic.into(),
        length,
        timing,
        handler: Some(handler),
    }
}

fn illegal(opcode: u8) -> OpcodeInfo {
    OpcodeInfo {
        mnemonic: format!("DB ${opcode:02X}"),
        length: 1,
        timing: Timing::Fixed(0),
        handler: None,
    }
}

fn fixed(cycles: u32) -> Timing {
    Timing::Fixed(cycles)
}

fn branch(taken: u32, not_taken: u32) -> Timing {
    Timing::Branch { taken, not_taken }
}

/// Register operand cost: the (HL) form pays for the memory access.
fn r8_cost(index: u8, reg: u32, mem: u32) -> Timing {
    fixed(if index == 6 { mem } else { reg })
}

fn describe(opcode: u8) -> OpcodeInfo {
    let x = opcode >> 6;
    let y = (opcode >> 3) & 0x07;
    let z = opcode & 0x07;
    let p = (y >> 1) as usize;
    let q = y & 0x01;
    let (y_us, z_us) = (y as usize, z as usize);

    match x {
        0 => match z {
            0 => match y {
                0 => op("NOP", 1, fixed(4), Cpu::nop),
                1 => op("LD (a16),SP", 3, fixed(20), Cpu::ld_a16_sp),
                2 => op("STOP", 2, fixed(4), Cpu::stop),
                3 => op("JR r8", 2, fixed(12), Cpu::jr),
                _ => op(
                    format!("JR {},r8", CC[y_us - 4]),
                    2,
                    branch(12, 8),
                    Cpu::jr_cc,
                ),
            },
            1 if q == 0 => op(format!("LD {},d16", RP[p]), 3, fixed(12), Cpu::ld_rr_d16),
            1 => op(format!("ADD HL,{}", RP[p]), 1, fixed(8), Cpu::add_hl_rr),
            2 => {
                let target = ["(BC)", "(DE)", "(HL+)", "(HL-)"][p];
                if q == 0 {
                    op(format!("LD {target},A"), 1, fixed(8), Cpu::ld_indirect_a)
                } else {
                    op(format!("LD A,{target}"), 1, fixed(8), Cpu::ld_a_indirect)
                }
            }
            3 if q == 0 => op(format!("INC {}", RP[p]), 1, fixed(8), Cpu::inc_rr),
            3 => op(format!("DEC {}", RP[p]), 1, fixed(8), Cpu::dec_rr),
            4 => op(format!("INC {}", R8[y_us]), 1, r8_cost(y, 4, 12), Cpu::inc_r),
            5 => op(format!("DEC {}", R8[y_us]), 1, r8_cost(y, 4, 12), Cpu::dec_r),
            6 => op(format!("LD {},d8", R8[y_us]), 2, r8_cost(y, 8, 12), Cpu::ld_r_d8),
            _ => {
                let (name, handler): (&str, Handler) = match y {
                    0 => ("RLCA", Cpu::rlca),
                    1 => ("RRCA", Cpu::rrca),
                    2 => ("RLA", Cpu::rla),
                    3 => ("RRA", Cpu::rra),
                    4 => ("DAA", Cpu::daa),
                    5 => ("CPL", Cpu::cpl),
                    6 => ("SCF", Cpu::scf),
                    _ => ("CCF", Cpu::ccf),
                };
                op(name, 1, fixed(4), handler)
            }
        },
        1 if opcode == 0x76 => op("HALT", 1, fixed(4), Cpu::halt),
        1 => {
            let cycles = if y == 6 || z == 6 { 8 } else { 4 };
            op(
                format!("LD {},{}", R8[y_us], R8[z_us]),
                1,
                fixed(cycles),
                Cpu::ld_r_r,
            )
        }
        2 => op(
            format!("{}{}", ALU[y_us], R8[z_us]),
            1,
            r8_cost(z, 4, 8),
            Cpu::alu_r,
        ),
        _ => match z {
            0 => match y {
                0..=3 => op(format!("RET {}", CC[y_us]), 1, branch(20, 8), Cpu::ret_cc),
                4 => op("LDH (a8),A", 2, fixed(12), Cpu::ldh_a8_a),
                5 => op("ADD SP,r8", 2, fixed(16), Cpu::add_sp_r8),
                6 => op("LDH A,(a8)", 2, fixed(12), Cpu::ldh_a_a8),
                _ => op("LD HL,SP+r8", 2, fixed(12), Cpu::ld_hl_sp_r8),
            },
            1 if q == 0 => op(format!("POP {}", RP2[p]), 1, fixed(12), Cpu::pop_rr),
            1 => match p {
                0 => op("RET", 1, fixed(16), Cpu::ret),
                1 => op("RETI", 1, fixed(16), Cpu::reti),
                2 => op("JP (HL)", 1, fixed(4), Cpu::jp_hl),
                _ => op("LD SP,HL", 1, fixed(8), Cpu::ld_sp_hl),
            },
            2 => match y {
                0..=3 => op(
                    format!("JP {},a16", CC[y_us]),
                    3,
                    branch(16, 12),
                    Cpu::jp_cc,
                ),
                4 => op("LD (C),A", 1, fixed(8), Cpu::ldh_c_a),
                5 => op("LD (a16),A", 3, fixed(16), Cpu::ld_a16_a),
                6 => op("LD A,(C)", 1, fixed(8), Cpu::ldh_a_c),
                _ => op("LD A,(a16)", 3, fixed(16), Cpu::ld_a_a16),
            },
            3 => match y {
                0 => op("JP a16", 3, fixed(16), Cpu::jp),
                1 => OpcodeInfo {
                    mnemonic: "PREFIX CB".to_string(),
                    length: 2,
                    timing: Timing::Prefixed,
                    handler: Some(Cpu::prefix_cb),
                },
                6 => op("DI", 1, fixed(4), Cpu::di),
                7 => op("EI", 1, fixed(4), Cpu::ei),
                _ => illegal(opcode),
            },
            4 if y < 4 => op(
                format!("CALL {},a16", CC[y_us]),
                3,
                branch(24, 12),
                Cpu::call_cc,
            ),
            4 => illegal(opcode),
            5 if q == 0 => op(format!("PUSH {}", RP2[p]), 1, fixed(16), Cpu::push_rr),
            5 if p == 0 => op("CALL a16", 3, fixed(24), Cpu::call),
            5 => illegal(opcode),
            6 => op(format!("{}d8", ALU[y_us]), 2, fixed(8), Cpu::alu_d8),
            _ => op(format!("RST {:02X}H", y * 8), 1, fixed(16), Cpu::rst),
        },
    }
}

fn describe_cb(opcode: u8) -> OpcodeInfo {
    let x = opcode >> 6;
    let y = (opcode >> 3) & 0x07;
    let z = opcode & 0x07;
    let target = R8[z as usize];

    match x {
        0 => op(
            format!("{} {target}", ROT[y as usize]),
            2,
            r8_cost(z, 8, 16),
            Cpu::cb_rotate,
        ),
        1 => op(format!("BIT {y},{target}"), 2, r8_cost(z, 8, 12), Cpu::cb_bit),
        2 => op(format!("RES {y},{target}"), 2, r8_cost(z, 8, 16), Cpu::cb_res),
        _ => op(format!("SET {y},{target}"), 2, r8_cost(z, 8, 16), Cpu::cb_set),
    }
}
