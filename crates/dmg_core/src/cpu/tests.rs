use super::*;

struct TestBus {
    memory: [u8; 0x10000],
}

impl Default for TestBus {
    fn default() -> Self {
        Self {
            memory: [0; 0x10000],
        }
    }
}

impl TestBus {
    fn with_program(at: u16, program: &[u8]) -> Self {
        let mut bus = Self::default();
        let start = at as usize;
        bus.memory[start..start + program.len()].copy_from_slice(program);
        bus
    }
}

impl Bus for TestBus {
    fn read8(&mut self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    fn write8(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize] = value;
    }
}

fn run(cpu: &mut Cpu, bus: &mut TestBus, steps: usize) -> u32 {
    (0..steps)
        .map(|_| cpu.step(bus).expect("legal opcode"))
        .sum()
}

#[test]
fn ld_c_d8_loads_and_advances() {
    let mut cpu = Cpu::new();
    let mut bus = TestBus::with_program(0, &[0x0E, 0xAD]);

    let cycles = cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.regs.get8(Reg8::C), 0xAD);
    assert_eq!(cpu.regs.pc(), 2);
    assert_eq!(cycles, 8);
}

#[test]
fn add_a_b_sets_only_carry_on_overflow() {
    let mut cpu = Cpu::new();
    cpu.regs.set_a(0xF0);
    cpu.regs.set8(Reg8::B, 0xF0);
    let mut bus = TestBus::with_program(0, &[0x80]);

    cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.regs.a(), 0xE0);
    assert_eq!(cpu.regs.get8(Reg8::F), 0x10);
}

#[test]
fn jr_nz_falls_through_when_zero_set() {
    let mut cpu = Cpu::new();
    cpu.regs.set_pc(0x0100);
    cpu.regs.set_flag(Flags::Z, true);
    let mut bus = TestBus::with_program(0x0100, &[0x20, 0x10]);

    let cycles = cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.regs.pc(), 0x0102);
    assert_eq!(cycles, 8);
}

#[test]
fn jr_nz_taken_lands_relative_to_next_instruction() {
    let mut cpu = Cpu::new();
    cpu.regs.set_pc(0x0100);
    let mut bus = TestBus::with_program(0x0100, &[0x20, 0xFE]);

    let cycles = cpu.step(&mut bus).unwrap();

    // -2 from 0x0102 is the JR itself.
    assert_eq!(cpu.regs.pc(), 0x0100);
    assert_eq!(cycles, 12);
}

#[test]
fn rlca_moves_bit7_into_carry_and_bit0() {
    let mut cpu = Cpu::new();
    cpu.regs.set_a(0x85);
    let mut bus = TestBus::with_program(0, &[0x07]);

    cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.regs.a(), 0x0B);
    assert_eq!(cpu.regs.get8(Reg8::F), 0x10);
}

#[test]
fn rla_clears_zero_even_for_zero_result() {
    let mut cpu = Cpu::new();
    cpu.regs.set_a(0x80);
    let mut bus = TestBus::with_program(0, &[0x17]);

    cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.regs.a(), 0x00);
    assert!(!cpu.regs.flag(Flags::Z));
    assert!(cpu.regs.flag(Flags::C));
}

#[test]
fn sub_and_cp_set_borrow_flags() {
    let mut cpu = Cpu::new();
    cpu.regs.set_a(0x10);
    // SUB d8 0x01 ; CP d8 0x0F
    let mut bus = TestBus::with_program(0, &[0xD6, 0x01, 0xFE, 0x0F]);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.a(), 0x0F);
    assert_eq!(cpu.regs.flags(), Flags::N | Flags::H);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.a(), 0x0F);
    assert_eq!(cpu.regs.flags(), Flags::Z | Flags::N);
}

#[test]
fn adc_and_sbc_consume_carry() {
    let mut cpu = Cpu::new();
    cpu.regs.set_a(0x0E);
    cpu.regs.set_flag(Flags::C, true);
    // ADC A,d8 0x01 ; SBC A,d8 0x00
    let mut bus = TestBus::with_program(0, &[0xCE, 0x01, 0xDE, 0x00]);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.a(), 0x10);
    assert_eq!(cpu.regs.flags(), Flags::H);

    cpu.regs.set_flag(Flags::C, true);
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.a(), 0x0F);
    assert_eq!(cpu.regs.flags(), Flags::N | Flags::H);
}

#[test]
fn logic_ops_force_half_and_carry() {
    let mut cpu = Cpu::new();
    cpu.regs.set_a(0xF0);
    cpu.regs.set_flag(Flags::C, true);
    // AND d8 0x0F ; OR d8 0x00 ; XOR A
    let mut bus = TestBus::with_program(0, &[0xE6, 0x0F, 0xF6, 0x00, 0xAF]);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.flags(), Flags::Z | Flags::H);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.flags(), Flags::Z);

    cpu.regs.set_a(0x55);
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.a(), 0);
    assert_eq!(cpu.regs.flags(), Flags::Z);
}

#[test]
fn inc_dec_leave_carry_alone() {
    let mut cpu = Cpu::new();
    cpu.regs.set8(Reg8::B, 0x0F);
    cpu.regs.set_flag(Flags::C, true);
    // INC B ; DEC B ; DEC B...
    let mut bus = TestBus::with_program(0, &[0x04, 0x05]);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.get8(Reg8::B), 0x10);
    assert_eq!(cpu.regs.flags(), Flags::H | Flags::C);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.get8(Reg8::B), 0x0F);
    assert_eq!(cpu.regs.flags(), Flags::N | Flags::H | Flags::C);
}

#[test]
fn inc_hl_indirect_goes_through_memory() {
    let mut cpu = Cpu::new();
    cpu.regs.set_hl(0xC000);
    let mut bus = TestBus::with_program(0, &[0x34]);
    bus.memory[0xC000] = 0xFF;

    let cycles = cpu.step(&mut bus).unwrap();

    assert_eq!(bus.memory[0xC000], 0x00);
    assert!(cpu.regs.flag(Flags::Z));
    assert_eq!(cycles, 12);
}

#[test]
fn add_hl_uses_bit11_and_bit15_carries() {
    let mut cpu = Cpu::new();
    cpu.regs.set_hl(0x8FFF);
    cpu.regs.set16(Reg16::BC, 0x8001);
    cpu.regs.set_flag(Flags::Z, true);
    let mut bus = TestBus::with_program(0, &[0x09]);

    cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.regs.hl(), 0x1000);
    assert_eq!(cpu.regs.flags(), Flags::Z | Flags::H | Flags::C);
}

#[test]
fn add_sp_r8_clears_zero_and_subtract() {
    let mut cpu = Cpu::new();
    cpu.regs.set_sp(0x0FFF);
    cpu.regs.set_flags(Flags::Z | Flags::N);
    let mut bus = TestBus::with_program(0, &[0xE8, 0x01]);

    let cycles = cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.regs.sp(), 0x1000);
    assert_eq!(cpu.regs.flags(), Flags::H);
    assert_eq!(cycles, 16);
}

#[test]
fn ld_hl_sp_r8_handles_negative_offset() {
    let mut cpu = Cpu::new();
    cpu.regs.set_sp(0xFFF8);
    let mut bus = TestBus::with_program(0, &[0xF8, 0xFE]);

    cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.regs.hl(), 0xFFF6);
    assert_eq!(cpu.regs.sp(), 0xFFF8);
    assert!(!cpu.regs.flag(Flags::Z));
    assert!(!cpu.regs.flag(Flags::N));
}

#[test]
fn hl_increment_and_decrement_loads() {
    let mut cpu = Cpu::new();
    cpu.regs.set_hl(0xC000);
    cpu.regs.set_a(0x42);
    // LD (HL+),A ; LD A,(HL-)
    let mut bus = TestBus::with_program(0, &[0x22, 0x3A]);
    bus.memory[0xC001] = 0x99;

    cpu.step(&mut bus).unwrap();
    assert_eq!(bus.memory[0xC000], 0x42);
    assert_eq!(cpu.regs.hl(), 0xC001);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.a(), 0x99);
    assert_eq!(cpu.regs.hl(), 0xC000);
}

#[test]
fn ld_a16_sp_stores_little_endian() {
    let mut cpu = Cpu::new();
    cpu.regs.set_sp(0xBEEF);
    let mut bus = TestBus::with_program(0, &[0x08, 0x00, 0xC0]);

    let cycles = cpu.step(&mut bus).unwrap();

    assert_eq!(bus.memory[0xC000], 0xEF);
    assert_eq!(bus.memory[0xC001], 0xBE);
    assert_eq!(cycles, 20);
}

#[test]
fn ldh_forms_address_high_page() {
    let mut cpu = Cpu::new();
    cpu.regs.set_a(0x5A);
    cpu.regs.set8(Reg8::C, 0x81);
    // LDH (0x80),A ; LD (C),A
    let mut bus = TestBus::with_program(0, &[0xE0, 0x80, 0xE2]);

    cpu.step(&mut bus).unwrap();
    cpu.step(&mut bus).unwrap();

    assert_eq!(bus.memory[0xFF80], 0x5A);
    assert_eq!(bus.memory[0xFF81], 0x5A);
    assert_eq!(cpu.regs.pc(), 3);
}

#[test]
fn push_pop_round_trip_and_stack_layout() {
    let mut cpu = Cpu::new();
    cpu.regs.set_sp(0xFFFE);
    cpu.regs.set16(Reg16::BC, 0x1234);
    // PUSH BC ; POP DE
    let mut bus = TestBus::with_program(0, &[0xC5, 0xD1]);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.sp(), 0xFFFC);
    assert_eq!(bus.memory[0xFFFD], 0x12);
    assert_eq!(bus.memory[0xFFFC], 0x34);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.get16(Reg16::DE), 0x1234);
    assert_eq!(cpu.regs.sp(), 0xFFFE);
}

#[test]
fn push_then_pop_restores_each_pair() {
    for index in 0..4u8 {
        let reg = Reg16::from_rp2(index);
        let value = match reg {
            Reg16::AF => 0xA5B0,
            _ => 0x1234u16.wrapping_mul(u16::from(index) + 3),
        };
        let mut cpu = Cpu::new();
        cpu.regs.set_sp(0xD000);
        cpu.regs.set16(reg, value);
        let push = 0xC5 | (index << 4);
        let pop = 0xC1 | (index << 4);
        let mut bus = TestBus::with_program(0, &[push, pop]);

        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.regs.sp(), 0xCFFE, "{reg:?}");
        cpu.regs.set16(reg, 0);

        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.regs.get16(reg), value, "{reg:?}");
        assert_eq!(cpu.regs.sp(), 0xD000, "{reg:?}");
    }
}

#[test]
fn pop_af_masks_low_nibble() {
    let mut cpu = Cpu::new();
    cpu.regs.set_sp(0xC000);
    let mut bus = TestBus::with_program(0, &[0xF1]);
    bus.memory[0xC000] = 0xFF;
    bus.memory[0xC001] = 0x12;

    cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.regs.get16(Reg16::AF), 0x12F0);
}

#[test]
fn call_and_ret_round_trip() {
    let mut cpu = Cpu::new();
    cpu.regs.set_sp(0xFFFE);
    cpu.regs.set_pc(0x0100);
    let mut bus = TestBus::with_program(0x0100, &[0xCD, 0x00, 0x02]);
    bus.memory[0x0200] = 0xC9;

    assert_eq!(cpu.step(&mut bus).unwrap(), 24);
    assert_eq!(cpu.regs.pc(), 0x0200);
    assert_eq!(bus.memory[0xFFFD], 0x01);
    assert_eq!(bus.memory[0xFFFC], 0x03);

    assert_eq!(cpu.step(&mut bus).unwrap(), 16);
    assert_eq!(cpu.regs.pc(), 0x0103);
    assert_eq!(cpu.regs.sp(), 0xFFFE);
}

#[test]
fn conditional_call_and_ret_costs() {
    let mut cpu = Cpu::new();
    cpu.regs.set_sp(0xFFFE);
    cpu.regs.set_flag(Flags::C, true);
    // CALL NC,a16 (not taken) ; RET C (taken, pops 0x1234)
    let mut bus = TestBus::with_program(0, &[0xD4, 0x00, 0x40, 0xD8]);
    bus.memory[0xFFFE] = 0x34;
    bus.memory[0xFFFF] = 0x12;

    assert_eq!(cpu.step(&mut bus).unwrap(), 12);
    assert_eq!(cpu.regs.pc(), 3);

    assert_eq!(cpu.step(&mut bus).unwrap(), 20);
    assert_eq!(cpu.regs.pc(), 0x1234);
}

#[test]
fn jp_cc_and_jp_hl() {
    let mut cpu = Cpu::new();
    cpu.regs.set_hl(0x4000);
    // JP Z,0x2000 (not taken) ; JP (HL)
    let mut bus = TestBus::with_program(0, &[0xCA, 0x00, 0x20, 0xE9]);

    assert_eq!(cpu.step(&mut bus).unwrap(), 12);
    assert_eq!(cpu.regs.pc(), 3);
    assert_eq!(cpu.step(&mut bus).unwrap(), 4);
    assert_eq!(cpu.regs.pc(), 0x4000);
}

#[test]
fn rst_pushes_next_address() {
    let mut cpu = Cpu::new();
    cpu.regs.set_sp(0xD000);
    cpu.regs.set_pc(0x0150);
    let mut bus = TestBus::with_program(0x0150, &[0xEF]);

    cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.regs.pc(), 0x0028);
    assert_eq!(bus.memory[0xCFFE], 0x51);
    assert_eq!(bus.memory[0xCFFF], 0x01);
}

#[test]
fn daa_adjusts_bcd_addition_and_subtraction() {
    let mut cpu = Cpu::new();
    // 0x45 + 0x38 = 0x7D -> DAA -> 0x83
    cpu.regs.set_a(0x45);
    let mut bus = TestBus::with_program(0, &[0xC6, 0x38, 0x27]);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.regs.a(), 0x83);
    assert!(!cpu.regs.flag(Flags::C));

    // 0x99 + 0x01 = 0x9A -> DAA -> 0x00 with carry
    let mut cpu = Cpu::new();
    cpu.regs.set_a(0x99);
    let mut bus = TestBus::with_program(0, &[0xC6, 0x01, 0x27]);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.regs.a(), 0x00);
    assert_eq!(cpu.regs.flags(), Flags::Z | Flags::C);

    // 0x42 - 0x15 = 0x2D -> DAA -> 0x27, N kept
    let mut cpu = Cpu::new();
    cpu.regs.set_a(0x42);
    let mut bus = TestBus::with_program(0, &[0xD6, 0x15, 0x27]);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.regs.a(), 0x27);
    assert_eq!(cpu.regs.flags(), Flags::N);
}

#[test]
fn cpl_scf_ccf_flag_rules() {
    let mut cpu = Cpu::new();
    cpu.regs.set_a(0x0F);
    cpu.regs.set_flag(Flags::Z, true);
    // CPL ; SCF ; CCF
    let mut bus = TestBus::with_program(0, &[0x2F, 0x37, 0x3F]);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.a(), 0xF0);
    assert_eq!(cpu.regs.flags(), Flags::Z | Flags::N | Flags::H);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.flags(), Flags::Z | Flags::C);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.flags(), Flags::Z);
}

#[test]
fn cb_bit_preserves_carry_and_target() {
    let mut cpu = Cpu::new();
    cpu.regs.set8(Reg8::H, 0x7F);
    cpu.regs.set_flag(Flags::C, true);
    let mut bus = TestBus::with_program(0, &[0xCB, 0x7C]);

    let cycles = cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.regs.get8(Reg8::H), 0x7F);
    assert_eq!(cpu.regs.flags(), Flags::Z | Flags::H | Flags::C);
    assert_eq!(cpu.regs.pc(), 2);
    assert_eq!(cycles, 8);
}

#[test]
fn cb_shifts_swap_and_bit_ops_on_memory() {
    let mut cpu = Cpu::new();
    cpu.regs.set_hl(0xC000);
    // SWAP (HL) ; SRL (HL) ; SET 0,(HL) ; RES 7,(HL) ; SRA (HL)
    let mut bus = TestBus::with_program(
        0,
        &[0xCB, 0x36, 0xCB, 0x3E, 0xCB, 0xC6, 0xCB, 0xBE, 0xCB, 0x2E],
    );
    bus.memory[0xC000] = 0x1F;

    assert_eq!(cpu.step(&mut bus).unwrap(), 16);
    assert_eq!(bus.memory[0xC000], 0xF1);

    cpu.step(&mut bus).unwrap();
    assert_eq!(bus.memory[0xC000], 0x78);
    assert!(cpu.regs.flag(Flags::C));

    cpu.step(&mut bus).unwrap();
    assert_eq!(bus.memory[0xC000], 0x79);

    bus.memory[0xC000] = 0xF0;
    cpu.step(&mut bus).unwrap();
    assert_eq!(bus.memory[0xC000], 0x70);

    bus.memory[0xC000] = 0x81;
    cpu.step(&mut bus).unwrap();
    assert_eq!(bus.memory[0xC000], 0xC0);
    assert!(cpu.regs.flag(Flags::C));
}

#[test]
fn cb_rl_rr_rotate_through_carry() {
    let mut cpu = Cpu::new();
    cpu.regs.set8(Reg8::C, 0x80);
    // RL C ; RR C
    let mut bus = TestBus::with_program(0, &[0xCB, 0x11, 0xCB, 0x19]);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.get8(Reg8::C), 0x00);
    assert_eq!(cpu.regs.flags(), Flags::Z | Flags::C);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.get8(Reg8::C), 0x80);
    assert_eq!(cpu.regs.flags(), Flags::empty());
}

#[test]
fn illegal_opcode_reports_and_keeps_pc() {
    let mut cpu = Cpu::new();
    cpu.regs.set_pc(0x0200);
    let mut bus = TestBus::with_program(0x0200, &[0xD3]);

    let err = cpu.step(&mut bus).unwrap_err();

    assert!(matches!(
        err,
        crate::error::CpuError::IllegalOpcode {
            opcode: 0xD3,
            pc: 0x0200
        }
    ));
    assert_eq!(cpu.regs.pc(), 0x0200);
}

#[test]
fn halt_and_stop_advance_by_their_length() {
    let mut cpu = Cpu::new();
    let mut bus = TestBus::with_program(0, &[0x76, 0x10, 0x00, 0x00]);

    assert_eq!(cpu.step(&mut bus).unwrap(), 4);
    assert_eq!(cpu.regs.pc(), 1);
    assert_eq!(cpu.step(&mut bus).unwrap(), 4);
    assert_eq!(cpu.regs.pc(), 3);
}

#[test]
fn handler_cycles_agree_with_descriptors() {
    for opcode in 0..=0xFFu8 {
        let info = &OPCODES[opcode as usize];
        if info.is_illegal() {
            continue;
        }
        // Both flag states so conditional entries hit taken and not taken.
        for flags in [Flags::empty(), Flags::all()] {
            let mut cpu = Cpu::new();
            cpu.regs.set_sp(0xD000);
            cpu.regs.set_hl(0xC000);
            cpu.regs.set_pc(0x0100);
            cpu.regs.set_flags(flags);
            let mut bus = TestBus::with_program(0x0100, &[opcode, 0x00, 0xC0]);

            let cycles = cpu.step(&mut bus).unwrap();
            assert!(
                info.timing.allows(cycles),
                "{} returned {cycles}, table says {:?}",
                info.mnemonic,
                info.timing
            );
        }
    }

    for cb in 0..=0xFFu8 {
        let info = &CB_OPCODES[cb as usize];
        let mut cpu = Cpu::new();
        cpu.regs.set_hl(0xC000);
        let mut bus = TestBus::with_program(0, &[0xCB, cb]);

        let cycles = cpu.step(&mut bus).unwrap();
        assert_eq!(info.timing, Timing::Fixed(cycles), "{}", info.mnemonic);
        assert_eq!(cpu.regs.pc(), 2, "{}", info.mnemonic);
    }
}

#[test]
fn executed_instructions_never_set_low_flag_bits() {
    let seeds = [0x00u8, 0x0F, 0x80, 0x99, 0xFF];
    for opcode in 0..=0xFFu8 {
        let info = &OPCODES[opcode as usize];
        if info.is_illegal() {
            continue;
        }
        for &a in &seeds {
            for flags in [Flags::empty(), Flags::all()] {
                let mut cpu = Cpu::new();
                cpu.regs.set_sp(0xD000);
                cpu.regs.set_hl(0xC000);
                cpu.regs.set_pc(0x0100);
                cpu.regs.set_a(a);
                cpu.regs.set8(Reg8::B, a.rotate_left(4));
                cpu.regs.set_flags(flags);
                let mut bus = TestBus::with_program(0x0100, &[opcode, a, 0xC0]);
                bus.memory[0xC000] = !a;
                // POP AF reads this.
                bus.memory[0xD000] = 0xFF;

                cpu.step(&mut bus).unwrap();
                assert_eq!(cpu.regs.get8(Reg8::F) & 0x0F, 0, "{}", info.mnemonic);
                assert_eq!(cpu.regs.get16(Reg16::AF) & 0x0F, 0, "{}", info.mnemonic);
            }
        }
    }
}

#[test]
fn non_branching_handlers_advance_by_length() {
    let branching = |m: &str| {
        ["JR", "JP", "CALL", "RET", "RST"]
            .iter()
            .any(|prefix| m.starts_with(prefix))
    };
    for (opcode, info) in OPCODES.iter().enumerate() {
        if info.is_illegal() || branching(&info.mnemonic) || opcode == 0xCB {
            continue;
        }
        let mut cpu = Cpu::new();
        cpu.regs.set_sp(0xD000);
        cpu.regs.set_hl(0xC000);
        cpu.regs.set_pc(0x0100);
        let mut bus = TestBus::with_program(0x0100, &[opcode as u8, 0x00, 0xC0]);

        cpu.step(&mut bus).unwrap();
        assert_eq!(
            cpu.regs.pc(),
            0x0100 + info.length as u16,
            "{}",
            info.mnemonic
        );
    }
}

#[test]
fn vblank_dispatch_pushes_pc_and_acks() {
    let mut cpu = Cpu::new();
    cpu.regs.set_pc(0x1234);
    cpu.regs.set_sp(0xD000);
    cpu.ime = true;
    let mut bus = TestBus::default();
    bus.memory[IE_ADDR as usize] = 0xFF;
    bus.memory[IF_ADDR as usize] = 0x01;

    let cycles = cpu.service_interrupts(&mut bus);

    assert_eq!(cycles, Some(20));
    assert_eq!(cpu.regs.pc(), 0x0040);
    assert_eq!(bus.memory[IF_ADDR as usize] & 0x01, 0);
    assert!(!cpu.ime);
    assert_eq!(cpu.regs.sp(), 0xCFFE);
    assert_eq!(bus.memory[0xCFFF], 0x12);
    assert_eq!(bus.memory[0xCFFE], 0x34);
}

#[test]
fn lowest_pending_bit_wins_arbitration() {
    let cases = [
        (0x1F, 0x0040, 0x1E),
        (0x1E, 0x0048, 0x1C),
        (0x1C, 0x0050, 0x18),
        (0x18, 0x0058, 0x10),
        (0x10, 0x0060, 0x00),
    ];
    for (requested, vector, left) in cases {
        let mut cpu = Cpu::new();
        cpu.regs.set_sp(0xD000);
        cpu.ime = true;
        let mut bus = TestBus::default();
        bus.memory[IE_ADDR as usize] = 0x1F;
        bus.memory[IF_ADDR as usize] = requested;

        cpu.service_interrupts(&mut bus);

        assert_eq!(cpu.regs.pc(), vector);
        assert_eq!(bus.memory[IF_ADDR as usize], left);
    }
}

#[test]
fn masked_or_disabled_interrupts_are_ignored() {
    let mut cpu = Cpu::new();
    let mut bus = TestBus::default();
    bus.memory[IE_ADDR as usize] = 0x02;
    bus.memory[IF_ADDR as usize] = 0x01;

    assert_eq!(cpu.service_interrupts(&mut bus), None);
    cpu.ime = true;
    assert_eq!(cpu.service_interrupts(&mut bus), None);
    assert_eq!(bus.memory[IF_ADDR as usize], 0x01);
}

#[test]
fn ei_enables_after_following_instruction() {
    let mut cpu = Cpu::new();
    cpu.regs.set_sp(0xD000);
    // EI ; NOP ; NOP
    let mut bus = TestBus::with_program(0, &[0xFB, 0x00, 0x00]);
    bus.memory[IE_ADDR as usize] = 0x01;
    bus.memory[IF_ADDR as usize] = 0x01;

    cpu.step(&mut bus).unwrap();
    assert!(!cpu.ime);
    assert!(cpu.ime_scheduled());

    // The instruction after EI still runs uninterrupted.
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.pc(), 2);
    assert!(cpu.ime);

    assert_eq!(cpu.step(&mut bus).unwrap(), 20);
    assert_eq!(cpu.regs.pc(), 0x0040);
}

#[test]
fn di_cancels_pending_ei() {
    let mut cpu = Cpu::new();
    // EI ; DI ; NOP
    let mut bus = TestBus::with_program(0, &[0xFB, 0xF3, 0x00]);

    run(&mut cpu, &mut bus, 3);

    assert!(!cpu.ime);
    assert!(!cpu.ime_scheduled());
}

#[test]
fn reti_enables_ime_immediately() {
    let mut cpu = Cpu::new();
    cpu.regs.set_sp(0xC000);
    let mut bus = TestBus::with_program(0, &[0xD9]);
    bus.memory[0xC000] = 0x00;
    bus.memory[0xC001] = 0x02;

    cpu.step(&mut bus).unwrap();

    assert!(cpu.ime);
    assert_eq!(cpu.regs.pc(), 0x0200);
}

#[test]
fn boot_state_matches_dmg() {
    let cpu = Cpu::with_boot_state();
    assert_eq!(cpu.regs.get16(Reg16::AF), 0x01B0);
    assert_eq!(cpu.regs.get16(Reg16::BC), 0x0013);
    assert_eq!(cpu.regs.get16(Reg16::DE), 0x00D8);
    assert_eq!(cpu.regs.hl(), 0x014D);
    assert_eq!(cpu.regs.sp(), 0xFFFE);
    assert_eq!(cpu.regs.pc(), 0x0100);
}

#[test]
fn prefix_entry_runs_cb_table_handlers() {
    let info = &OPCODES[0xCB];
    assert_eq!(info.timing, Timing::Prefixed);
    let handler = info.handler.expect("prefix entry has a handler");

    for cb in 0..=0xFFu8 {
        let ins = Instruction::new(&[0xCB, cb]);
        let entry = &CB_OPCODES[cb as usize];
        let direct = entry.handler.expect("CB entry");

        let mut via_prefix = Cpu::new();
        via_prefix.regs.set_hl(0xC000);
        via_prefix.regs.set_a(0x5A);
        let mut expected = via_prefix.clone();
        let mut bus_a = TestBus::default();
        bus_a.memory[0xC000] = 0xA5;
        let mut bus_b = TestBus::default();
        bus_b.memory[0xC000] = 0xA5;

        let cycles = handler(&mut via_prefix, &mut bus_a, &ins);
        let direct_cycles = direct(&mut expected, &mut bus_b, &ins);

        assert_eq!(cycles, direct_cycles, "{}", entry.mnemonic);
        assert_eq!(via_prefix.regs, expected.regs, "{}", entry.mnemonic);
        assert_eq!(bus_a.memory[0xC000], bus_b.memory[0xC000]);
    }

    let mut cpu = Cpu::new();
    cpu.regs.set8(Reg8::A, 0x01);
    let mut bus = TestBus::default();

    // SET 7,A
    let cycles = handler(&mut cpu, &mut bus, &Instruction::new(&[0xCB, 0xFF]));

    assert_eq!(cycles, 8);
    assert_eq!(cpu.regs.a(), 0x81);
    assert_eq!(cpu.regs.pc(), 2);
}
