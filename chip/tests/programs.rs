use chip::{
    chip8::ChipSet,
    devices::{Display, Keyboard},
    opcode::Operation,
    quirks::CompatLevel,
    resources::Rom,
    ProcessError, StackError,
};

fn get_chip(program: &[u8]) -> ChipSet<Display, Keyboard> {
    let rom = Rom::new("TEST", program).expect("The program has to fit.");
    ChipSet::with_rom(&rom, Display::new(), Keyboard::new())
}

/// steps the chip, any fault fails the test
fn run(chip: &mut ChipSet<Display, Keyboard>, steps: usize) {
    for _ in 0..steps {
        if let Err(err) = chip.step() {
            panic!("unexpected {}", err);
        }
    }
}

#[test]
fn test_set_and_add() {
    let mut chip = get_chip(&[0x60, 0x05, 0x70, 0x05]);
    run(&mut chip, 2);
    assert_eq!(10, chip.get_registers()[0]);
    assert_eq!(0x204, chip.get_program_counter());
}

#[test]
fn test_clear_then_spin() {
    let mut chip = get_chip(&[0x00, 0xE0, 0x12, 0x02]);
    assert_eq!(Ok(Operation::Draw), chip.step());
    for _ in 0..100 {
        assert_eq!(Ok(Operation::None), chip.step());
        assert_eq!(0x202, chip.get_program_counter());
    }
}

#[test]
fn test_counting_subroutine() {
    let mut chip = get_chip(&[
        0x60, 0x00, // V0 = 0
        0x22, 0x0A, // call 0x20A
        0x30, 0x0A, // skip if V0 == 10
        0x12, 0x02, // jump 0x202
        0x12, 0x08, // spin
        0x70, 0x01, // V0 += 1
        0x00, 0xEE, // return
    ]);
    run(&mut chip, 100);
    assert_eq!(10, chip.get_registers()[0]);
    assert_eq!(0x208, chip.get_program_counter());
    assert!(chip.get_stack().is_empty());
}

#[test]
fn test_draw_digit() {
    let mut chip = get_chip(&[
        0x60, 0x07, // V0 = 7
        0xF0, 0x29, // I = glyph(V0)
        0x61, 0x3E, // V1 = 62
        0x62, 0x1E, // V2 = 30
        0xD1, 0x25, // draw at (62, 30), wraps on both axes
    ]);
    run(&mut chip, 4);
    assert_eq!(Ok(Operation::Draw), chip.step());

    let display = chip.get_display();
    // glyph `7` is F0 10 20 40 40
    assert_eq!(8, display.lit());
    assert!(display.pixel(62, 30));
    assert!(display.pixel(1, 30));
    assert!(display.pixel(63, 30));
    assert!(display.pixel(1, 31));
    assert!(display.pixel(0, 0));
    assert!(display.pixel(63, 1));
    assert!(display.pixel(63, 2));
    assert_eq!(0, chip.get_registers()[0xF]);
}

#[test]
fn test_wait_for_key() {
    let mut chip = get_chip(&[0xF5, 0x0A, 0x12, 0x02]);
    for _ in 0..10 {
        assert_eq!(Ok(Operation::Wait), chip.step());
    }
    assert_eq!(0x200, chip.get_program_counter());

    chip.get_input_mut().set_key(0x7, true);
    run(&mut chip, 1);
    assert_eq!(0x7, chip.get_registers()[0x5]);
    assert_eq!(0x202, chip.get_program_counter());
}

#[test]
fn test_runaway_recursion_faults() {
    // calls itself until the stack is exhausted
    let mut chip = get_chip(&[0x22, 0x00]);
    run(&mut chip, 16);
    assert_eq!(16, chip.get_stack().pointer());

    let err = chip.step().unwrap_err();
    assert_eq!(0x200, err.pc);
    assert_eq!(Some(0x2200), err.opcode);
    assert_eq!(ProcessError::Stack(StackError::Full), err.source);
    assert_eq!(0x200, chip.get_program_counter());
}

#[test]
fn test_levels_differ_on_shift() {
    // V1 = 0x01, V2 = 0x80, V1 = shift left
    let program = [0x61, 0x01, 0x62, 0x80, 0x81, 0x2E];

    let mut chip = get_chip(&program).with_compat_level(CompatLevel::Chip8);
    run(&mut chip, 3);
    assert_eq!(0x00, chip.get_registers()[0x1]);
    assert_eq!(0x01, chip.get_registers()[0xF]);

    let mut chip = get_chip(&program).with_compat_level(CompatLevel::SChip11);
    run(&mut chip, 3);
    assert_eq!(0x02, chip.get_registers()[0x1]);
    assert_eq!(0x00, chip.get_registers()[0xF]);
}

#[test]
fn test_reset_runs_program_again() {
    let mut chip = get_chip(&[0x60, 0x05, 0x70, 0x05]);
    run(&mut chip, 2);
    chip.reset();
    assert_eq!(0, chip.get_registers()[0]);
    run(&mut chip, 2);
    assert_eq!(10, chip.get_registers()[0]);
}

#[test]
fn test_xo_chip_shifts_vy() {
    // V1 = 0x01, V2 = 0x80, V1 = V2 >> 1
    let program = [0x61, 0x01, 0x62, 0x80, 0x81, 0x26];

    let mut chip = get_chip(&program).with_compat_level(CompatLevel::XoChip);
    run(&mut chip, 3);
    assert_eq!(0x40, chip.get_registers()[0x1]);
    assert_eq!(0x00, chip.get_registers()[0xF]);

    let mut chip = get_chip(&program).with_compat_level(CompatLevel::SChip11);
    run(&mut chip, 3);
    assert_eq!(0x00, chip.get_registers()[0x1]);
    assert_eq!(0x01, chip.get_registers()[0xF]);
}
