use bitflags::bitflags;

bitflags! {
    /// Flag bits in the F register.
    ///
    /// Bits 0-3 of F do not exist on hardware and always read as zero.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Flags: u8 {
        const Z = 0b1000_0000;
        const N = 0b0100_0000;
        const H = 0b0010_0000;
        const C = 0b0001_0000;
    }
}

/// 8-bit register names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reg8 {
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
}

/// 16-bit register names. `AF`, `BC`, `DE` and `HL` are pairs of 8-bit
/// registers; `SP` and `PC` only exist as 16-bit values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reg16 {
    AF,
    BC,
    DE,
    HL,
    SP,
    PC,
}

#[derive(Clone, Copy)]
enum Half {
    High,
    Low,
}

impl Reg8 {
    /// Map the 3-bit register field used by opcodes (`B C D E H L (HL) A`).
    ///
    /// Index 6 names the memory operand `(HL)` and has no register, so it
    /// yields `None` (as does anything above 7).
    pub fn from_operand(index: u8) -> Option<Self> {
        match index {
            0 => Some(Reg8::B),
            1 => Some(Reg8::C),
            2 => Some(Reg8::D),
            3 => Some(Reg8::E),
            4 => Some(Reg8::H),
            5 => Some(Reg8::L),
            7 => Some(Reg8::A),
            _ => None,
        }
    }

    fn slot(self) -> (Reg16, Half) {
        match self {
            Reg8::A => (Reg16::AF, Half::High),
            Reg8::F => (Reg16::AF, Half::Low),
            Reg8::B => (Reg16::BC, Half::High),
            Reg8::C => (Reg16::BC, Half::Low),
            Reg8::D => (Reg16::DE, Half::High),
            Reg8::E => (Reg16::DE, Half::Low),
            Reg8::H => (Reg16::HL, Half::High),
            Reg8::L => (Reg16::HL, Half::Low),
        }
    }
}

impl Reg16 {
    /// `rp` table used by loads, INC/DEC and ADD HL: `BC DE HL SP`.
    pub fn from_rp(index: u8) -> Self {
        match index & 0x03 {
            0 => Reg16::BC,
            1 => Reg16::DE,
            2 => Reg16::HL,
            _ => Reg16::SP,
        }
    }

    /// `rp2` table used by PUSH/POP: `BC DE HL AF`.
    pub fn from_rp2(index: u8) -> Self {
        match index & 0x03 {
            0 => Reg16::BC,
            1 => Reg16::DE,
            2 => Reg16::HL,
            _ => Reg16::AF,
        }
    }

    fn slot(self) -> usize {
        match self {
            Reg16::AF => 0,
            Reg16::BC => 1,
            Reg16::DE => 2,
            Reg16::HL => 3,
            Reg16::SP => 4,
            Reg16::PC => 5,
        }
    }
}

/// Register file for the LR35902.
///
/// Storage is one `u16` per pair, so an 8-bit write to `B` is visible
/// through `BC` and vice versa. The high byte of a pair is the first
/// named register (`B` in `BC`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegisterFile {
    pairs: [u16; 6],
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get8(&self, reg: Reg8) -> u8 {
        let (pair, half) = reg.slot();
        let [hi, lo] = self.pairs[pair.slot()].to_be_bytes();
        match half {
            Half::High => hi,
            Half::Low => lo,
        }
    }

    #[inline]
    pub fn set8(&mut self, reg: Reg8, value: u8) {
        let (pair, half) = reg.slot();
        let value = if reg == Reg8::F { value & 0xF0 } else { value };
        let [hi, lo] = self.pairs[pair.slot()].to_be_bytes();
        self.pairs[pair.slot()] = match half {
            Half::High => u16::from_be_bytes([value, lo]),
            Half::Low => u16::from_be_bytes([hi, value]),
        };
    }

    #[inline]
    pub fn get16(&self, reg: Reg16) -> u16 {
        self.pairs[reg.slot()]
    }

    #[inline]
    pub fn set16(&mut self, reg: Reg16, value: u16) {
        // Lower 4 bits of F are always zero.
        let value = if reg == Reg16::AF { value & 0xFFF0 } else { value };
        self.pairs[reg.slot()] = value;
    }

    #[inline]
    pub fn flags(&self) -> Flags {
        Flags::from_bits_truncate(self.get8(Reg8::F))
    }

    #[inline]
    pub fn set_flags(&mut self, flags: Flags) {
        self.set8(Reg8::F, flags.bits());
    }

    #[inline]
    pub fn flag(&self, flag: Flags) -> bool {
        self.flags().contains(flag)
    }

    #[inline]
    pub fn set_flag(&mut self, flag: Flags, value: bool) {
        let mut flags = self.flags();
        flags.set(flag, value);
        self.set_flags(flags);
    }

    #[inline]
    pub fn a(&self) -> u8 {
        self.get8(Reg8::A)
    }

    #[inline]
    pub fn set_a(&mut self, value: u8) {
        self.set8(Reg8::A, value);
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        self.get16(Reg16::HL)
    }

    #[inline]
    pub fn set_hl(&mut self, value: u16) {
        self.set16(Reg16::HL, value);
    }

    #[inline]
    pub fn sp(&self) -> u16 {
        self.get16(Reg16::SP)
    }

    #[inline]
    pub fn set_sp(&mut self, value: u16) {
        self.set16(Reg16::SP, value);
    }

    #[inline]
    pub fn pc(&self) -> u16 {
        self.get16(Reg16::PC)
    }

    #[inline]
    pub fn set_pc(&mut self, value: u16) {
        self.set16(Reg16::PC, value);
    }
}
