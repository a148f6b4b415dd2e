
use std::fmt;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;


#[derive(Debug, Clone, Copy, FromPrimitive, PartialEq, Eq, Hash)]
pub enum Opcode {
    Hlt = 0b0000_0001,
    Ret = 0b0001_0001,

    Push = 0b0100_0101,
    Pop = 0b0100_0110,
    Prn = 0b0100_0111,
    Call = 0b0101_0000,
    Jmp = 0b0101_0100,
    Jeq = 0b0101_0101,
    Jne = 0b0101_0110,
    Inc = 0b0110_0101,
    Dec = 0b0110_0110,

    Ldi = 0b1000_0010,
    Ld = 0b1000_0011,
    Add = 0b1010_0000,
    Mul = 0b1010_0010,
    Div = 0b1010_0011,
    Mod = 0b1010_0100,
    Cmp = 0b1010_0111,
    And = 0b1010_1000,
}

impl Opcode {
    pub const ALL: &'static [Opcode] = &[
        Opcode::Hlt, Opcode::Ret,
        Opcode::Push, Opcode::Pop, Opcode::Prn, Opcode::Call,
        Opcode::Jmp, Opcode::Jeq, Opcode::Jne, Opcode::Inc, Opcode::Dec,
        Opcode::Ldi, Opcode::Ld, Opcode::Add, Opcode::Mul,
        Opcode::Div, Opcode::Mod, Opcode::Cmp, Opcode::And,
    ];

    pub fn from_byte(byte: u8) -> Option<Opcode> {
        Opcode::from_u8(byte)
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }

    pub fn num_operands(self) -> u8 {
        Ins::num_operands(self.to_byte())
    }

    pub fn uses_alu(self) -> bool {
        self.to_byte() & Ins::ALU_BIT != 0
    }

    pub fn sets_pc(self) -> bool {
        self.to_byte() & Ins::SETS_PC_BIT != 0
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}


////////////////////////////////////////////////////////////////////////////////


#[derive(Debug, Clone, Copy, FromPrimitive, PartialEq, Eq, Hash)]
pub enum Reg {
    R0 = 0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    SP,
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

pub const NUM_REGS: usize = 8;

impl Reg {
    pub const ALL: [Reg; NUM_REGS] = [
        Reg::R0, Reg::R1, Reg::R2, Reg::R3, Reg::R4, Reg::R5, Reg::R6, Reg::SP,
    ];

    pub fn from_operand(operand: u8) -> Option<Reg> {
        Reg::from_u8(operand)
    }

    pub fn index(self) -> usize {
        self as usize
    }
}


////////////////////////////////////////////////////////////////////////////////


// A decoded instruction. Bytes that aren't a known opcode still decode, so the
// engine can step over them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ins {
    pub raw: u8,
    pub op: Option<Opcode>,
    operands: [u8; Ins::MAX_OPERANDS],
}

impl Ins {
    pub const OPERAND_COUNT_SHIFT: u8 = 6;
    pub const ALU_BIT: u8 = 1 << 5;
    pub const SETS_PC_BIT: u8 = 1 << 4;
    pub const MAX_OPERANDS: usize = 2;

    /// Number of operand bytes following the opcode, from its two high bits.
    pub fn num_operands(raw: u8) -> u8 {
        raw >> Self::OPERAND_COUNT_SHIFT
    }

    /// Operand bytes actually present in memory. A count of 3 isn't used by
    /// any opcode; nothing is read for it, though it still advances by 4.
    pub fn operand_bytes(raw: u8) -> usize {
        let count = Self::num_operands(raw) as usize;
        if count <= Self::MAX_OPERANDS { count } else { 0 }
    }

    pub fn decode(input: &[u8]) -> Option<Ins> {
        let (&raw, rest) = input.split_first()?;
        let count = Self::operand_bytes(raw);
        if rest.len() < count {
            return None;
        }

        let mut operands = [0u8; Self::MAX_OPERANDS];
        operands[..count].copy_from_slice(&rest[..count]);
        Some(Ins{raw, op: Opcode::from_byte(raw), operands})
    }

    /// Bytes the default advance moves the pc by.
    pub fn size(&self) -> usize {
        Self::num_operands(self.raw) as usize + 1
    }

    pub fn operand_a(&self) -> u8 {
        self.operands[0]
    }

    pub fn operand_b(&self) -> u8 {
        self.operands[1]
    }
}

struct RegOperand(u8);

impl fmt::Display for RegOperand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match Reg::from_operand(self.0) {
            Some(reg) => write!(f, "{reg}"),
            None => write!(f, "r?{}", self.0),
        }
    }
}

impl fmt::Display for Ins {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Some(op) = self.op else {
            return write!(f, ".byte\t{:#04x}", self.raw);
        };

        let a = RegOperand(self.operand_a());
        let b = RegOperand(self.operand_b());
        match (op, op.num_operands()) {
            (Opcode::Ldi, _) => write!(f, "{op}\t{a}, {}", self.operand_b()),
            (_, 0) => write!(f, "{op}"),
            (_, 1) => write!(f, "{op}\t{a}"),
            (_, _) => write!(f, "{op}\t{a}, {b}"),
        }
    }
}
