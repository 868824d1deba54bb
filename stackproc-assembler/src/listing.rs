//! Diagnostic listing
//!
//! Pairs each source line with the bytes it produced. Write-only output
//! for humans; nothing reads it back.

use std::fmt;

/// One assembled line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// 1-based source line number
    pub line: usize,

    /// Byte offset within the code section
    pub offset: usize,

    /// Emitted bytes (opcode plus operand)
    pub bytes: Vec<u8>,

    /// Source text, trimmed
    pub source: String,
}

/// Ordered collection of listing entries for one assembly run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    entries: Vec<ListingEntry>,
}

impl Listing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ListingEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ListingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "line  offset  bytes            source")?;
        for entry in &self.entries {
            let hex: Vec<String> = entry.bytes.iter().map(|b| format!("{:02X}", b)).collect();
            writeln!(
                f,
                "{:<5} {:#06x}  {:<16} {}",
                entry.line,
                entry.offset,
                hex.join(" "),
                entry.source
            )?;
        }
        Ok(())
    }
}
