use common::asm::{Opcode, Reg};

use crate::{EmulatorState, Fault};

use log::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Mul,
    And,
    Dec,
    Inc,
    Cmp,
    Mod,
    Div,
}

impl TryFrom<Opcode> for AluOp {
    type Error = Fault;

    fn try_from(op: Opcode) -> Result<AluOp, Fault> {
        Ok(match op {
            Opcode::Add => AluOp::Add,
            Opcode::Mul => AluOp::Mul,
            Opcode::And => AluOp::And,
            Opcode::Dec => AluOp::Dec,
            Opcode::Inc => AluOp::Inc,
            Opcode::Cmp => AluOp::Cmp,
            Opcode::Mod => AluOp::Mod,
            Opcode::Div => AluOp::Div,
            _ => return Err(Fault::UnsupportedOperation(op)),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluRet {
    Ok,
    DivideByZero,
}

// Floored, so the remainder takes the sign of the divisor.
fn div_floor(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if (a % b != 0) && ((a < 0) != (b < 0)) {
        q.checked_sub(1)
    } else {
        Some(q)
    }
}

fn mod_floor(a: i64, b: i64) -> Option<i64> {
    let r = a.checked_rem(b)?;
    if r != 0 && ((r < 0) != (b < 0)) {
        Some(r + b)
    } else {
        Some(r)
    }
}

impl EmulatorState {
    // Unary operations ignore b. Registers are not truncated to 8 bits; leaving
    // the i64 range is a fault.
    pub fn alu(&mut self, op: AluOp, a: Reg, b: Reg) -> Result<AluRet, Fault> {
        let lhs = self.reg_read(a);
        let rhs = self.reg_read(b);

        let res = match op {
            AluOp::Add => lhs.checked_add(rhs),
            AluOp::Mul => lhs.checked_mul(rhs),
            AluOp::And => Some(lhs & rhs),
            AluOp::Dec => lhs.checked_sub(1),
            AluOp::Inc => lhs.checked_add(1),
            AluOp::Cmp => {
                self.get_flags_mut().set_equal(lhs == rhs);
                return Ok(AluRet::Ok);
            }
            AluOp::Mod | AluOp::Div if rhs == 0 => {
                warn!("{op:?} of {a} by zero in {b}, halting");
                return Ok(AluRet::DivideByZero);
            }
            AluOp::Mod => mod_floor(lhs, rhs),
            AluOp::Div => div_floor(lhs, rhs),
        };

        self.reg_write(a, res.ok_or(Fault::Overflow(op))?);
        Ok(AluRet::Ok)
    }
}
