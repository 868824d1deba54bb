//! # Opcode Definitions
//!
//! One opcode byte per instruction, values 0x00-0x09. PUSH is the only
//! opcode that carries an operand (a 4-byte little-endian signed integer).

use serde::{Deserialize, Serialize};

/// Instruction opcode (one byte, values 0x00-0x09)
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    /// END: halt the decode loop, success
    End = 0x00,
    /// PUSH imm: push operand onto the stack
    Push = 0x01,
    /// POP: remove the top element
    Pop = 0x02,
    /// OUT: emit the top element without popping
    Out = 0x03,
    /// ADD: pop b, pop a, push a + b
    Add = 0x04,
    /// SUB: pop b, pop a, push a - b
    Sub = 0x05,
    /// MUL: pop b, pop a, push a * b
    Mul = 0x06,
    /// DIV: pop b, pop a, push a / b
    Div = 0x07,
    /// DUP: push a copy of the top element
    Dup = 0x08,
    /// ABORT: halt the decode loop, abnormal termination
    Abort = 0x09,
}

impl Opcode {
    /// Every opcode, in encoding order.
    pub const ALL: [Opcode; 10] = [
        Opcode::End,
        Opcode::Push,
        Opcode::Pop,
        Opcode::Out,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::Dup,
        Opcode::Abort,
    ];

    /// Byte width of the operand following the opcode (0 or 4).
    pub const OPERAND_WIDTH: usize = 4;

    /// Try to convert from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Opcode::End),
            0x01 => Some(Opcode::Push),
            0x02 => Some(Opcode::Pop),
            0x03 => Some(Opcode::Out),
            0x04 => Some(Opcode::Add),
            0x05 => Some(Opcode::Sub),
            0x06 => Some(Opcode::Mul),
            0x07 => Some(Opcode::Div),
            0x08 => Some(Opcode::Dup),
            0x09 => Some(Opcode::Abort),
            _ => None,
        }
    }

    /// Convert to u8
    #[inline]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Source-file mnemonic, case-sensitive.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Opcode::End => "END",
            Opcode::Push => "PUSH",
            Opcode::Pop => "POP",
            Opcode::Out => "OUT",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Dup => "DUP",
            Opcode::Abort => "ABORT",
        }
    }

    /// Number of operand bytes following this opcode in the stream.
    #[inline]
    pub const fn operand_width(self) -> usize {
        match self {
            Opcode::Push => Self::OPERAND_WIDTH,
            _ => 0,
        }
    }

    /// Whether this opcode takes an operand.
    #[inline]
    pub const fn has_operand(self) -> bool {
        self.operand_width() != 0
    }

    /// Whether this opcode terminates the decode loop.
    #[inline]
    pub const fn is_terminator(self) -> bool {
        matches!(self, Opcode::End | Opcode::Abort)
    }

    /// Whether this opcode pops two values and pushes one.
    #[inline]
    pub const fn is_arithmetic(self) -> bool {
        matches!(self, Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div)
    }

    /// Human-readable description for listings and documentation.
    pub const fn description(self) -> &'static str {
        match self {
            Opcode::End => "end program",
            Opcode::Push => "push element to the stack",
            Opcode::Pop => "remove element from the stack",
            Opcode::Out => "print top element of the stack",
            Opcode::Add => "add last two elements",
            Opcode::Sub => "subtract last two elements",
            Opcode::Mul => "multiply last two elements",
            Opcode::Div => "divide last two elements",
            Opcode::Dup => "push copy of the last element",
            Opcode::Abort => "abort program execution",
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}
