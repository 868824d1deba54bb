//! # Binary Program Format
//!
//! A fixed 16-byte header followed by the flat instruction stream.
//!
//! ```text
//! Offset  Size  Field
//! ──────────────────────────────────
//! 0x00    4     magic ("KITy")
//! 0x04    4     version (LE i32)
//! 0x08    8     reserved, zero
//! 0x10    ...   instruction stream
//! ```

use crate::error::SpecError;
use crate::instruction::Instruction;
use std::fmt;

/// Magic tag at the start of every program file.
pub const MAGIC: [u8; 4] = *b"KITy";

/// Current format version. Files with a greater version are rejected;
/// files with a lesser one stay loadable.
pub const VERSION: i32 = 1;

/// Total header size in bytes, including reserved padding.
pub const HEADER_SIZE: usize = 16;

/// Program file header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgramHeader {
    /// Format version the file was written with.
    pub version: i32,
}

impl ProgramHeader {
    /// Header size in bytes
    pub const SIZE: usize = HEADER_SIZE;

    /// Create a header for the current version.
    pub fn new() -> Self {
        Self { version: VERSION }
    }

    /// Validate the header against this build's capabilities.
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.version > VERSION {
            return Err(SpecError::UnsupportedVersion {
                found: self.version,
                supported: VERSION,
            });
        }
        Ok(())
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&MAGIC);
        bytes[4..8].copy_from_slice(&self.version.to_le_bytes());
        // bytes 8..16 stay zero (reserved)
        bytes
    }

    /// Deserialize from bytes, checking magic and version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SpecError> {
        if bytes.len() < Self::SIZE {
            return Err(SpecError::TruncatedHeader {
                expected: Self::SIZE,
                found: bytes.len(),
            });
        }

        let found = [bytes[0], bytes[1], bytes[2], bytes[3]];
        if found != MAGIC {
            return Err(SpecError::InvalidMagic { found });
        }

        let header = Self {
            version: i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        };
        header.validate()?;
        Ok(header)
    }
}

impl Default for ProgramHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProgramHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Program header")?;
        writeln!(f, "  Magic:   \"{}\"", String::from_utf8_lossy(&MAGIC))?;
        writeln!(f, "  Version: {}", self.version)?;
        Ok(())
    }
}

/// A complete binary program: header plus raw instruction stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
    /// Program header
    pub header: ProgramHeader,

    /// Instruction stream (raw bytes, as laid out on disk)
    pub code: Vec<u8>,
}

impl Program {
    /// Create an empty program with a current-version header.
    pub fn new() -> Self {
        Self {
            header: ProgramHeader::new(),
            code: Vec::new(),
        }
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(ProgramHeader::SIZE + self.code.len());
        bytes.extend_from_slice(&self.header.to_bytes());
        bytes.extend_from_slice(&self.code);
        bytes
    }

    /// Deserialize from bytes. The header is validated; the instruction
    /// stream is kept raw for the runtime to decode incrementally.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SpecError> {
        let header = ProgramHeader::from_bytes(bytes)?;
        let code = bytes[ProgramHeader::SIZE..].to_vec();
        Ok(Self { header, code })
    }

    /// Decode the whole instruction stream at once.
    ///
    /// Stops at the first terminating opcode or end of buffer. Intended for
    /// diagnostics and tests; the runtime decodes one instruction at a time.
    pub fn decode_all(&self) -> Result<Vec<Instruction>, SpecError> {
        let mut out = Vec::new();
        let mut cursor = 0;
        while cursor < self.code.len() {
            let (inst, len) = Instruction::decode(&self.code[cursor..])?;
            let done = inst.opcode().is_terminator();
            out.push(inst);
            cursor += len;
            if done {
                break;
            }
        }
        Ok(out)
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_default() {
        let header = ProgramHeader::new();
        assert_eq!(header.version, VERSION);
        assert!(header.validate().is_ok());
    }

    #[test]
    fn test_header_layout() {
        let bytes = ProgramHeader::new().to_bytes();
        assert_eq!(&bytes[0..4], b"KITy");
        assert_eq!(&bytes[4..8], &1i32.to_le_bytes());
        assert_eq!(&bytes[8..16], &[0u8; 8]);
    }

    #[test]
    fn test_header_roundtrip() {
        let header = ProgramHeader::new();
        let restored = ProgramHeader::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(header, restored);
    }

    #[test]
    fn test_header_wrong_magic() {
        let mut bytes = ProgramHeader::new().to_bytes();
        bytes[0] = b'X';
        let err = ProgramHeader::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, SpecError::InvalidMagic { .. }));
    }

    #[test]
    fn test_header_newer_version_rejected() {
        let mut bytes = ProgramHeader::new().to_bytes();
        bytes[4..8].copy_from_slice(&(VERSION + 1).to_le_bytes());
        let err = ProgramHeader::from_bytes(&bytes).unwrap_err();
        assert!(matches!(
            err,
            SpecError::UnsupportedVersion { found, supported }
                if found == VERSION + 1 && supported == VERSION
        ));
    }

    #[test]
    fn test_header_older_version_accepted() {
        let mut bytes = ProgramHeader::new().to_bytes();
        bytes[4..8].copy_from_slice(&0i32.to_le_bytes());
        let header = ProgramHeader::from_bytes(&bytes).unwrap();
        assert_eq!(header.version, 0);
    }

    #[test]
    fn test_header_truncated() {
        let err = ProgramHeader::from_bytes(&[b'K', b'I', b'T']).unwrap_err();
        assert!(matches!(
            err,
            SpecError::TruncatedHeader {
                expected: 16,
                found: 3
            }
        ));
    }

    #[test]
    fn test_program_roundtrip() {
        let mut program = Program::new();
        Instruction::Push(3).encode_into(&mut program.code);
        Instruction::Push(4).encode_into(&mut program.code);
        Instruction::Add.encode_into(&mut program.code);
        Instruction::End.encode_into(&mut program.code);

        let bytes = program.to_bytes();
        assert_eq!(bytes.len(), HEADER_SIZE + 5 + 5 + 1 + 1);

        let restored = Program::from_bytes(&bytes).unwrap();
        assert_eq!(restored, program);
    }

    #[test]
    fn test_decode_all_stops_at_end() {
        let mut program = Program::new();
        Instruction::Push(1).encode_into(&mut program.code);
        Instruction::End.encode_into(&mut program.code);
        // Trailing garbage past END is never decoded.
        program.code.push(0xFF);

        let decoded = program.decode_all().unwrap();
        assert_eq!(decoded, vec![Instruction::Push(1), Instruction::End]);
    }
}
