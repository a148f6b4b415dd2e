use crate::util::run_ok;

use common::asm::Reg;

#[test]
fn print8() {
    let run = run_ok(r#"
        # print8.ls8: prints the number 8

        10000010 # LDI R0,8
        00000000
        00001000
        01000111 # PRN R0
        00000000
        00000001 # HLT
    "#);
    assert_eq!(run.out, vec![8]);
}

#[test]
fn add() {
    let run = run_ok(r#"
        10000010 # LDI R0,5
        00000000
        00000101
        10000010 # LDI R1,3
        00000001
        00000011
        10100000 # ADD R0,R1
        00000000
        00000001
        01000111 # PRN R0
        00000000
        00000001 # HLT
    "#);
    assert_eq!(run.out, vec![8]);
}

#[test]
fn mult() {
    let run = run_ok(r#"
        10000010 # LDI R0,8
        00000000
        00001000
        10000010 # LDI R1,9
        00000001
        00001001
        10100010 # MUL R0,R1
        00000000
        00000001
        01000111 # PRN R0
        00000000
        00000001 # HLT
    "#);
    assert_eq!(run.out, vec![72, 72]);
}

#[test]
fn ldi_prn_sequence() {
    let vals: [u8; 6] = [0, 1, 42, 127, 128, 255];
    let mut asm = String::new();
    for (i, val) in vals.iter().enumerate() {
        let reg = i % 7;
        asm += &format!("10000010\n{reg:08b}\n{val:08b}\n01000111\n{reg:08b}\n");
    }
    asm += "00000001\n";

    let run = run_ok(&asm);
    let expected: Vec<i64> = vals.iter().map(|v| *v as i64).collect();
    assert_eq!(run.out, expected);
}

#[test]
fn sum_to_ten() {
    let run = run_ok(r#"
        10000010 # LDI R0,0
        00000000
        00000000
        10000010 # LDI R1,1
        00000001
        00000001
        10000010 # LDI R2,11
        00000010
        00001011
        10000010 # LDI R3,loop
        00000011
        00001100

        # loop (12):
        10100000 # ADD R0,R1
        00000000
        00000001
        01100101 # INC R1
        00000001
        10100111 # CMP R1,R2
        00000001
        00000010
        01010110 # JNE R3
        00000011
        01000111 # PRN R0
        00000000
        00000001 # HLT
    "#);
    assert_eq!(run.out, vec![55]);
}

#[test]
fn factorial() {
    let run = run_ok(r#"
        # Prints 1!, 2!, ... 5! by calling a subroutine that keeps a running
        # product in R0.

        10000010 # LDI R0,1
        00000000
        00000001
        10000010 # LDI R1,0, the counter
        00000001
        00000000
        10000010 # LDI R2,5
        00000010
        00000101
        10000010 # LDI R3,step
        00000011
        00011000
        10000010 # LDI R4,loop
        00000100
        00001111

        # loop (15):
        01010000 # CALL R3
        00000011
        10100111 # CMP R1,R2
        00000001
        00000010
        01010110 # JNE R4
        00000100
        00000001 # HLT
        00000000

        # step (24):
        01100101 # INC R1
        00000001
        10100010 # MUL R0,R1
        00000000
        00000001
        00010001 # RET
    "#);
    assert_eq!(run.out, vec![1, 2, 6, 24, 120]);
    assert_eq!(run.emu.reg_read(Reg::R1), 5);
}

#[test]
fn copy_with_ld() {
    let run = run_ok(r#"
        10000010 # LDI R6,200
        00000110
        11001000
        10000011 # LD R5,R6
        00000101
        00000110
        10101000 # AND R5,R5
        00000101
        00000101
        01000111 # PRN R5
        00000101
        00000001 # HLT
    "#);
    assert_eq!(run.out, vec![200]);
}
