//! Main assembler logic

use crate::error::AssemblerError;
use crate::listing::{Listing, ListingEntry};
use crate::parser::parse_line;
use stackproc_spec::Program;
use tracing::{debug, warn};

/// Result of one assembly run.
#[derive(Debug, Clone)]
pub struct Assembly {
    /// The assembled binary program (header + instruction stream).
    pub program: Program,

    /// Diagnostic listing pairing source lines with emitted bytes.
    pub listing: Listing,

    /// Per-line errors for the lines that were skipped.
    pub errors: Vec<AssemblerError>,
}

impl Assembly {
    /// Number of source lines skipped due to parse errors.
    pub fn skipped(&self) -> usize {
        self.errors.len()
    }

    /// True when every line assembled.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Assemble source code into a binary program.
///
/// Lines are processed strictly in file order. A line that fails to parse
/// is logged and skipped; assembly always runs to the end of the source.
pub fn assemble(source: &str) -> Assembly {
    let mut program = Program::new();
    let mut listing = Listing::new();
    let mut errors = Vec::new();

    for (index, raw_line) in source.lines().enumerate() {
        let line_no = index + 1;
        let inst = match parse_line(line_no, raw_line) {
            Ok(Some(inst)) => inst,
            Ok(None) => continue,
            Err(e) => {
                warn!(line = line_no, source = raw_line.trim(), "skipping line: {e}");
                errors.push(e);
                continue;
            }
        };

        let offset = program.code.len();
        inst.encode_into(&mut program.code);
        debug!(line = line_no, offset, %inst, "assembled");

        listing.push(ListingEntry {
            line: line_no,
            offset,
            bytes: program.code[offset..].to_vec(),
            source: raw_line.trim().to_string(),
        });
    }

    Assembly {
        program,
        listing,
        errors,
    }
}
