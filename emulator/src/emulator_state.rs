use common::asm::{NUM_REGS, Ins, Opcode, Reg};
use common::constants::{MEM_SIZE, STACK_START};

use crate::AluOp;

use std::fmt::Write;

use log::trace;
use num_traits::ToPrimitive;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("address {0} is outside of memory")]
    AddressOutOfRange(i64),

    #[error("operand {0} doesn't name a register")]
    InvalidRegister(u8),

    #[error("{0:?} overflowed")]
    Overflow(AluOp),

    #[error("{0} isn't an ALU operation")]
    UnsupportedOperation(Opcode),

    #[error("cell {addr:#04x} holds {val}, which can't be executed")]
    NotAByte { addr: usize, val: i64 },
}

// Laid out 00000LGE. Only E is ever set.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flags(u8);

impl Flags {
    pub const EQUAL_SHIFT: u8 = 0;
    pub const E: u8 = 0x1 << Self::EQUAL_SHIFT;

    pub fn new() -> Flags {
        Default::default()
    }

    pub fn from_raw(raw: u8) -> Self {
        Flags(raw)
    }

    pub fn to_raw(&self) -> u8 {
        self.0
    }

    pub fn get_equal(&self) -> bool {
        (self.0 & Self::E) != 0
    }

    pub fn set_equal(&mut self, val: bool) {
        self.0 &= !Self::E;
        self.0 |= (val as u8) << Self::EQUAL_SHIFT;
    }
}

fn to_addr(val: i64) -> Result<usize, Fault> {
    val.to_usize()
        .filter(|addr| *addr < MEM_SIZE)
        .ok_or(Fault::AddressOutOfRange(val))
}

// Hex with a sign, so a negative cell or register stays short.
fn hex(val: i64) -> String {
    if val < 0 {
        format!("-{:02X}", val.unsigned_abs())
    } else {
        format!("{val:02X}")
    }
}

pub struct EmulatorState {
    num_ins: usize,
    // Cells hold whole register values; the program image only ever writes bytes.
    mem: [i64; MEM_SIZE],
    regs: [i64; NUM_REGS],
    flags: Flags,
    // May sit past the end of memory once a jump sends it there.
    pc: usize,
}

impl EmulatorState {
    pub fn new() -> Self {
        let mut regs = [0; NUM_REGS];
        regs[Reg::SP.index()] = STACK_START as i64;
        EmulatorState {
            num_ins: 0usize,
            mem: [0; MEM_SIZE],
            regs,
            flags: Flags::new(),
            pc: 0,
        }
    }

    pub fn inc_ins(&mut self) {
        self.num_ins += 1;
    }

    pub fn num_ins(&self) -> usize {
        self.num_ins
    }

    pub fn mem_read(&self, addr: i64) -> Result<i64, Fault> {
        Ok(self.mem[to_addr(addr)?])
    }

    pub fn mem_write(&mut self, addr: i64, val: i64) -> Result<(), Fault> {
        trace!("Mem: writing {val} to {addr:#04x}");
        self.mem[to_addr(addr)?] = val;
        Ok(())
    }

    pub fn reg_read(&self, reg: Reg) -> i64 {
        self.regs[reg.index()]
    }

    pub fn reg_write(&mut self, reg: Reg, val: i64) {
        trace!("Reg: writing {val} to {reg}");
        self.regs[reg.index()] = val;
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn set_pc(&mut self, pc: usize) {
        self.pc = pc;
    }

    pub fn get_flags(&self) -> &Flags {
        &self.flags
    }

    pub fn get_flags_mut(&mut self) -> &mut Flags {
        &mut self.flags
    }

    pub fn push(&mut self, val: i64) -> Result<(), Fault> {
        let sp = self.reg_read(Reg::SP) - 1;
        self.mem_write(sp, val)?;
        self.reg_write(Reg::SP, sp);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<i64, Fault> {
        let sp = self.reg_read(Reg::SP);
        let val = self.mem_read(sp)?;
        self.reg_write(Reg::SP, sp + 1);
        Ok(val)
    }

    fn code_byte(&self, addr: usize) -> Result<u8, Fault> {
        let val = *self.mem.get(addr).ok_or(Fault::AddressOutOfRange(addr as i64))?;
        u8::try_from(val).map_err(|_| Fault::NotAByte { addr, val })
    }

    // The instruction at pc, operands included.
    pub fn next_ins(&self) -> Result<Ins, Fault> {
        let ir = self.code_byte(self.pc)?;
        let len = 1 + Ins::operand_bytes(ir);
        let end = self.pc + len;
        if end > MEM_SIZE {
            return Err(Fault::AddressOutOfRange(end as i64 - 1));
        }

        let mut bytes = [0u8; 1 + Ins::MAX_OPERANDS];
        for (byte, addr) in bytes.iter_mut().zip(self.pc..end) {
            *byte = self.code_byte(addr)?;
        }
        // Sized for the operands above, so decode can't come up short.
        Ins::decode(&bytes[..len]).ok_or(Fault::AddressOutOfRange(self.pc as i64))
    }

    pub fn trace_line(&self) -> String {
        let peek = |offset: usize| self.mem.get(self.pc + offset).copied().unwrap_or(0);
        let mut line = format!(
            "TRACE: {:02X} | {} {} {} |",
            self.pc, hex(peek(0)), hex(peek(1)), hex(peek(2))
        );
        for reg in self.regs {
            let _ = write!(line, " {}", hex(reg));
        }
        line
    }
}

impl Default for EmulatorState {
    fn default() -> Self {
        Self::new()
    }
}
