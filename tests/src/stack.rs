use crate::util::run_ok;

use common::asm::Reg;
use common::constants::STACK_START;

#[test]
fn push_pop() {
    let run = run_ok(r#"
        10000010 # LDI R0,42
        00000000
        00101010
        01000101 # PUSH R0
        00000000
        10000010 # LDI R0,0
        00000000
        00000000
        01000110 # POP R1
        00000001
        01000111 # PRN R1
        00000001
        00000001 # HLT
    "#);

    assert_eq!(run.out, vec![42]);
    assert_eq!(run.emu.reg_read(Reg::R0), 0);
    assert_eq!(run.emu.reg_read(Reg::R1), 42);
    assert_eq!(run.emu.reg_read(Reg::SP), STACK_START as i64);
    assert_eq!(run.emu.get_state().mem_read(STACK_START as i64 - 1), Ok(42));
}

#[test]
fn lifo() {
    let run = run_ok(r#"
        10000010 # LDI R0,1
        00000000
        00000001
        10000010 # LDI R1,2
        00000001
        00000010
        01000101 # PUSH R0
        00000000
        01000101 # PUSH R1
        00000001
        10000010 # LDI R0,3
        00000000
        00000011
        01000110 # POP R0
        00000000
        01000111 # PRN R0
        00000000
        10000010 # LDI R0,4
        00000000
        00000100
        01000101 # PUSH R0
        00000000
        01000110 # POP R2
        00000010
        01000110 # POP R1
        00000001
        01000111 # PRN R2
        00000010
        01000111 # PRN R1
        00000001
        00000001 # HLT
    "#);

    assert_eq!(run.out, vec![2, 4, 1]);
    assert_eq!(run.emu.reg_read(Reg::SP), STACK_START as i64);
}

#[test]
fn sp_moves_down() {
    let run = run_ok(r#"
        01000101 # PUSH R0
        00000000
        01000101 # PUSH R0
        00000000
        01000101 # PUSH R0
        00000000
        00000001 # HLT
    "#);
    assert_eq!(run.emu.reg_read(Reg::SP), STACK_START as i64 - 3);
}

#[test]
fn push_pop_keeps_whole_value() {
    let run = run_ok(r#"
        10000010 # LDI R0,255
        00000000
        11111111
        01100101 # INC R0
        00000000
        01100101 # INC R0
        00000000
        01000101 # PUSH R0
        00000000
        01000110 # POP R1
        00000001
        00000001 # HLT
    "#);

    assert_eq!(run.emu.reg_read(Reg::R0), 257);
    assert_eq!(run.emu.reg_read(Reg::R1), 257);
}

#[test]
fn push_pop_negative() {
    let run = run_ok(r#"
        01100110 # DEC R0
        00000000
        01000101 # PUSH R0
        00000000
        01000110 # POP R1
        00000001
        00000001 # HLT
    "#);

    assert_eq!(run.emu.reg_read(Reg::R0), -1);
    assert_eq!(run.emu.reg_read(Reg::R1), -1);
    assert_eq!(run.emu.reg_read(Reg::SP), STACK_START as i64);
}
