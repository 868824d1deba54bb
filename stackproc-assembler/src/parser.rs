//! Line parser
//!
//! One instruction per line: a mnemonic token resolved through the shared
//! catalog, followed by an integer operand where the opcode requires one.
//! Trailing tokens after a complete instruction are ignored, matching the
//! original toolchain.

use crate::error::{AssemblerError, Result};
use crate::lexer::Token;
use logos::Logos;
use stackproc_spec::{Catalog, Instruction, Opcode};

/// Parse a single source line.
///
/// Returns `Ok(None)` for blank and comment-only lines. `line_no` is the
/// 1-based line number used in diagnostics.
pub fn parse_line(line_no: usize, text: &str) -> Result<Option<Instruction>> {
    let mut lex = Token::lexer(text);

    let mnemonic = match lex.next() {
        None => return Ok(None),
        Some(Ok(Token::Word(word))) => word,
        Some(_) => {
            return Err(AssemblerError::SyntaxError {
                line: line_no,
                message: format!("expected mnemonic, found \"{}\"", lex.slice()),
            })
        }
    };

    let opcode = Catalog::global()
        .lookup(&mnemonic)
        .ok_or(AssemblerError::UnknownMnemonic {
            line: line_no,
            mnemonic,
        })?;

    let inst = match opcode {
        Opcode::Push => {
            let value = parse_operand(line_no, opcode, &mut lex)?;
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

    Ok(Some(inst))
}

fn parse_operand(line_no: usize, opcode: Opcode, lex: &mut logos::Lexer<Token>) -> Result<i32> {
    match lex.next() {
        Some(Ok(Token::Number(value))) => {
            i32::try_from(value).map_err(|_| AssemblerError::OperandOutOfRange {
                line: line_no,
                value,
            })
        }
        Some(_) => Err(AssemblerError::InvalidOperand {
            line: line_no,
            found: lex.slice().to_string(),
        }),
        None => Err(AssemblerError::MissingOperand {
            line: line_no,
            mnemonic: opcode.mnemonic(),
        }),
    }
}
