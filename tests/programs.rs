use chip8_vm::{
    Chip8Error, Config, Interpreter, MAX_PROGRAM_SIZE, Machine, Opcode, StepResult,
    UnknownOpcodePolicy, u4,
};

fn interpreter() -> Interpreter {
    Interpreter::new(Config::default().with_seed(0xC8))
}

fn run(program: &[u8], steps: usize) -> Machine {
    let mut interpreter = interpreter();
    let mut machine = Machine::with_program(program).unwrap();
    for _ in 0..steps {
        interpreter.step(&mut machine).unwrap();
    }
    machine
}

#[test]
fn load_then_add_immediate_wraps() {
    for x in 0..0xFu8 {
        for (a, b) in [(0x00, 0x00), (0x7F, 0x01), (0xFF, 0x01), (0x80, 0x80), (0x12, 0xED)] {
            let program = [0x60 | x, a, 0x70 | x, b];
            let m = run(&program, 2);
            assert_eq!(m.v()[x as usize], a.wrapping_add(b), "V{x:X} {a:#04X}+{b:#04X}");
        }
    }
}

#[test]
fn add_registers_carry_matches_unmodded_sum() {
    let values = [0x00, 0x01, 0x7F, 0x80, 0xFE, 0xFF];
    for a in values {
        for b in values {
            // V1 = a, V2 = b, V1 += V2
            let m = run(&[0x61, a, 0x62, b, 0x81, 0x24], 3);
            let sum = a as u16 + b as u16;
            assert_eq!(m.v()[1], (sum % 256) as u8);
            assert_eq!(m.v()[0xF], (sum > 255) as u8);
        }
    }
}

#[test]
fn drawing_twice_restores_blank_screen() {
    // CLS ; I = 0x20E ; V0 = 62 ; V1 = 30 ; DRW V0, V1, 3 ; DRW V0, V1, 3 ; sprite data
    let program = [
        0x00, 0xE0, 0xA2, 0x0E, 0x60, 0x3E, 0x61, 0x1E, 0xD0, 0x13, 0xD0, 0x13, 0x00, 0x00, 0xFF,
        0x81, 0xFF,
    ];
    let mut interpreter = interpreter();
    let mut m = Machine::with_program(&program).unwrap();

    for _ in 0..5 {
        interpreter.step(&mut m).unwrap();
    }
    assert_eq!(m.v()[0xF], 0);
    assert!(m.pixel(62, 30) && m.pixel(63, 30));
    assert!(m.pixel(62, 0) && !m.pixel(63, 31));
    assert!(!m.pixel(0, 30), "columns past the right edge are dropped");

    assert_eq!(interpreter.step(&mut m).unwrap(), StepResult::WaitForNextFrame);
    assert_eq!(m.v()[0xF], 1);
    assert!(m.display().iter().flatten().all(|&p| !p));
}

#[test]
fn register_dump_and_load_round_trip() {
    // V0..V4 = 1..5 ; I = 0x400 ; dump V0..V4 ; V0..V4 = 0 ; load V0..V4
    let program = [
        0x60, 0x01, 0x61, 0x02, 0x62, 0x03, 0x63, 0x04, 0x64, 0x05, 0xA4, 0x00, 0xF4, 0x55, 0x60,
        0x00, 0x61, 0x00, 0x62, 0x00, 0x63, 0x00, 0x64, 0x00, 0xF4, 0x65,
    ];
    let mut interpreter = interpreter();
    let mut m = Machine::with_program(&program).unwrap();
    for _ in 0..13 {
        interpreter.step(&mut m).unwrap();
    }
    assert_eq!(&m.v()[..5], &[1, 2, 3, 4, 5]);
    assert_eq!(&m.memory()[0x400..0x405], &[1, 2, 3, 4, 5]);
}

#[test]
fn call_then_return_resumes_after_call() {
    // 0x200: CALL 0x300
    let mut program = vec![0u8; 0x102];
    program[0] = 0x23;
    program[1] = 0x00;
    program[0x100] = 0x00;
    program[0x101] = 0xEE;

    let m = run(&program, 2);
    assert_eq!(m.pc(), 0x202);
    assert_eq!(m.sp(), 0);
}

#[test]
fn font_glyph_for_a() {
    let m = run(&[0x6A, 0x0A, 0xFA, 0x29], 2);
    assert_eq!(m.i(), 0x082);
    assert_eq!(&m.memory()[0x082..0x087], &[0xF0, 0x90, 0xF0, 0x90, 0x90]);
}

#[test]
fn random_with_zero_mask_is_zero() {
    let mut interpreter = Interpreter::default();
    for _ in 0..32 {
        let mut m = Machine::with_program(&[0x6C, 0xFF, 0xCC, 0x00]).unwrap();
        interpreter.step(&mut m).unwrap();
        interpreter.step(&mut m).unwrap();
        assert_eq!(m.v()[0xC], 0);
    }
}

#[test]
fn program_size_boundary() {
    assert!(Machine::with_program(&vec![0; MAX_PROGRAM_SIZE]).is_ok());
    assert!(matches!(
        Machine::with_program(&vec![0; MAX_PROGRAM_SIZE + 1]),
        Err(Chip8Error::ProgramTooLarge { size: 3585, .. })
    ));
}

#[test]
fn countdown_loop_terminates() {
    // 0x200: V0 = 5
    // 0x202: V0 += 0xFF (decrement)
    // 0x204: SE V0, 0
    // 0x206: JP 0x202
    // 0x208: JP 0x208
    let program = [0x60, 0x05, 0x70, 0xFF, 0x30, 0x00, 0x12, 0x02, 0x12, 0x08];
    let m = run(&program, 1 + 5 * 3);
    assert_eq!(m.v()[0], 0);
    assert_eq!(m.pc(), 0x208);
}

#[test]
fn wait_for_key_then_display_digit() {
    // LD V0, K ; LD F, V0 ; DRW V1, V1, 5
    let program = [0xF0, 0x0A, 0xF0, 0x29, 0xD1, 0x15];
    let mut interpreter = interpreter();
    let mut m = Machine::with_program(&program).unwrap();

    for _ in 0..10 {
        interpreter.step(&mut m).unwrap();
    }
    assert_eq!(m.pc(), 0x200);

    m.set_key(u4::new(7), true);
    for _ in 0..3 {
        interpreter.step(&mut m).unwrap();
    }

    assert_eq!(m.v()[0], 7);
    assert_eq!(m.i(), 0x050 + 7 * 5);
    // '7' starts with a full row of four pixels
    assert!((0..4).all(|x| m.pixel(x, 0)));
    assert!(m.display_changed());
}

#[test]
fn unknown_opcode_policy() {
    let program = [0x01, 0x23, 0x60, 0x09];

    let mut m = Machine::with_program(&program).unwrap();
    let err = interpreter().step(&mut m).unwrap_err();
    assert_eq!(err, Chip8Error::UnknownOpcode { opcode: 0x0123, pc: 0x200 });
    assert_eq!(err.to_string(), "Unknown opcode 0x0123 at address 0x200");

    let mut lenient =
        Interpreter::new(Config::default().with_unknown_opcode(UnknownOpcodePolicy::Lenient));
    let mut m = Machine::with_program(&program).unwrap();
    lenient.step(&mut m).unwrap();
    lenient.step(&mut m).unwrap();
    assert_eq!(m.v()[0], 9);
}

#[test]
fn independent_machines_do_not_share_state() {
    let mut interpreter = interpreter();
    let mut a = Machine::with_program(&[0x61, 0x11]).unwrap();
    let mut b = Machine::with_program(&[0x61, 0x22]).unwrap();

    interpreter.step(&mut a).unwrap();
    interpreter.step(&mut b).unwrap();

    assert_eq!(a.v()[1], 0x11);
    assert_eq!(b.v()[1], 0x22);
}

#[test]
fn reset_through_interpreter() {
    let mut interpreter = interpreter();
    let mut m = run(&[0x61, 0x11, 0x12, 0x00], 3);
    interpreter.reset(&mut m);
    assert_eq!(m.pc(), 0x200);
    assert_eq!(m.v()[1], 0);
    assert_eq!(m.memory()[0x200], 0);
    assert_eq!(Opcode::decode(0x6111), Opcode::LoadImm { x: u4::new(1), nn: 0x11 });
}
