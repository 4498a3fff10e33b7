use bitflags::bitflags;

use super::{Bus, Cpu};

/// Interrupt enable register.
pub const IE_ADDR: u16 = 0xFFFF;
/// Interrupt request register.
pub const IF_ADDR: u16 = 0xFF0F;

/// Cost of an interrupt entry in T-cycles.
const DISPATCH_CYCLES: u32 = 20;

bitflags! {
    /// Bit layout shared by IE and IF. Lower bits win arbitration.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct InterruptFlags: u8 {
        const VBLANK = 0b0000_0001;
        const LCD_STAT = 0b0000_0010;
        const TIMER = 0b0000_0100;
        const SERIAL = 0b0000_1000;
        const JOYPAD = 0b0001_0000;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Interrupt {
    VBlank,
    LcdStat,
    Timer,
    Serial,
    Joypad,
}

impl Interrupt {
    /// Handler address the CPU jumps to on dispatch.
    pub fn vector(self) -> u16 {
        match self {
            Interrupt::VBlank => 0x0040,
            Interrupt::LcdStat => 0x0048,
            Interrupt::Timer => 0x0050,
            Interrupt::Serial => 0x0058,
            Interrupt::Joypad => 0x0060,
        }
    }

    pub fn flag(self) -> InterruptFlags {
        match self {
            Interrupt::VBlank => InterruptFlags::VBLANK,
            Interrupt::LcdStat => InterruptFlags::LCD_STAT,
            Interrupt::Timer => InterruptFlags::TIMER,
            Interrupt::Serial => InterruptFlags::SERIAL,
            Interrupt::Joypad => InterruptFlags::JOYPAD,
        }
    }

    /// Highest-priority interrupt among `pending`.
    pub fn highest(pending: InterruptFlags) -> Option<Self> {
        let bits = pending.bits();
        match bits & bits.wrapping_neg() {
            0x01 => Some(Interrupt::VBlank),
            0x02 => Some(Interrupt::LcdStat),
            0x04 => Some(Interrupt::Timer),
            0x08 => Some(Interrupt::Serial),
            0x10 => Some(Interrupt::Joypad),
            _ => None,
        }
    }
}

impl Cpu {
    /// Take the highest-priority interrupt that is both enabled and
    /// requested, if IME allows it.
    ///
    /// Entry clears IME, pushes PC (high byte first), jumps to the vector
    /// and acknowledges the request bit in IF. Returns `Some(cycles)` when
    /// an interrupt was taken.
    pub fn service_interrupts(&mut self, bus: &mut dyn Bus) -> Option<u32> {
        if !self.ime {
            return None;
        }

        let ie = InterruptFlags::from_bits_truncate(bus.read8(IE_ADDR));
        let requested = InterruptFlags::from_bits_truncate(bus.read8(IF_ADDR));
        let interrupt = Interrupt::highest(ie & requested)?;

        self.ime = false;
        self.ime_enable_pending = false;
        self.ime_enable_delay = false;

        let pc = self.regs.pc();
        self.push_u16(bus, pc);
        self.regs.set_pc(interrupt.vector());

        let remaining = bus.read8(IF_ADDR) & !interrupt.flag().bits();
        bus.write8(IF_ADDR, remaining);

        log::debug!(
            "interrupt {:?}: pc={:#06x} -> {:#06x} sp={:#06x}",
            interrupt,
            pc,
            interrupt.vector(),
            self.regs.sp()
        );
        Some(DISPATCH_CYCLES)
    }
}
