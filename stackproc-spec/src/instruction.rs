//! # Instruction Encoding
//!
//! One opcode byte, optionally followed by a 4-byte little-endian signed
//! operand. The operand width and endianness are a fixed wire contract:
//! the assembler and the runtime must agree on them bit for bit.

use crate::error::SpecError;
use crate::opcode::Opcode;
use serde::{Deserialize, Serialize};

/// A decoded instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// Halt, success.
    End,
    /// Push the operand onto the stack.
    Push(i32),
    /// Remove the top element.
    Pop,
    /// Emit the top element without popping.
    Out,
    /// Pop b, pop a, push a + b.
    Add,
    /// Pop b, pop a, push a - b.
    Sub,
    /// Pop b, pop a, push a * b.
    Mul,
    /// Pop b, pop a, push a / b.
    Div,
    /// Push a copy of the top element.
    Dup,
    /// Halt, abnormal termination.
    Abort,
}

impl Instruction {
    /// The opcode byte for this instruction.
    pub const fn opcode(&self) -> Opcode {
        match self {
            Instruction::End => Opcode::End,
            Instruction::Push(_) => Opcode::Push,
            Instruction::Pop => Opcode::Pop,
            Instruction::Out => Opcode::Out,
            Instruction::Add => Opcode::Add,
            Instruction::Sub => Opcode::Sub,
            Instruction::Mul => Opcode::Mul,
            Instruction::Div => Opcode::Div,
            Instruction::Dup => Opcode::Dup,
            Instruction::Abort => Opcode::Abort,
        }
    }

    /// Encoded length in bytes: 1, plus 4 for the PUSH operand.
    pub const fn encoded_len(&self) -> usize {
        1 + self.opcode().operand_width()
    }

    /// Append the wire encoding of this instruction to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.push(self.opcode().to_u8());
        if let Instruction::Push(value) = self {
            buf.extend_from_slice(&value.to_le_bytes());
        }
    }

    /// Wire encoding of this instruction as a fresh vector.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        buf
    }

    /// Decode one instruction from the front of `bytes`.
    ///
    /// Returns the instruction and the number of bytes it occupied.
    pub fn decode(bytes: &[u8]) -> Result<(Instruction, usize), SpecError> {
        let &first = bytes.first().ok_or(SpecError::UnexpectedEof)?;
        let opcode = Opcode::from_u8(first).ok_or(SpecError::IllegalOpcode(first))?;

        let inst = match opcode {
            Opcode::Push => {
                let needed = Opcode::OPERAND_WIDTH;
                let operand = bytes
                    .get(1..1 + needed)
                    .ok_or(SpecError::TruncatedOperand {
                        opcode,
                        needed,
                        available: bytes.len() - 1,
                    })?;
                let value = i32::from_le_bytes([operand[0], operand[1], operand[2], operand[3]]);
                Instruction::Push(value)
            }
            Opcode::End => Instruction::End,
            Opcode::Pop => Instruction::Pop,
            Opcode::Out => Instruction::Out,
            Opcode::Add => Instruction::Add,
            Opcode::Sub => Instruction::Sub,
            Opcode::Mul => Instruction::Mul,
            Opcode::Div => Instruction::Div,
            Opcode::Dup => Instruction::Dup,
            Opcode::Abort => Instruction::Abort,
        };

        Ok((inst, inst.encoded_len()))
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Push(value) => write!(f, "{} {}", self.opcode(), value),
            _ => write!(f, "{}", self.opcode()),
        }
    }
}
