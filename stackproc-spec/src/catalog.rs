//! # Instruction Catalog
//!
//! The mnemonic-to-opcode table shared by the assembler and the runtime.
//! Built once on first use behind a `OnceLock`; no load-time side effects.
//!
//! Lookup is an exact, case-sensitive string match. The map's internal
//! hashing is a dispatch optimization only: a collision can degrade to a
//! probe, never to a mis-dispatch.

use crate::opcode::Opcode;
use std::collections::HashMap;
use std::sync::OnceLock;

static CATALOG: OnceLock<Catalog> = OnceLock::new();

/// Immutable mnemonic lookup table.
#[derive(Debug)]
pub struct Catalog {
    by_mnemonic: HashMap<&'static str, Opcode>,
}

impl Catalog {
    fn build() -> Self {
        let mut by_mnemonic = HashMap::with_capacity(Opcode::ALL.len());
        for op in Opcode::ALL {
            by_mnemonic.insert(op.mnemonic(), op);
        }
        Self { by_mnemonic }
    }

    /// Shared process-wide catalog instance.
    pub fn global() -> &'static Catalog {
        CATALOG.get_or_init(Catalog::build)
    }

    /// Resolve a source mnemonic to its opcode. Case-sensitive.
    pub fn lookup(&self, mnemonic: &str) -> Option<Opcode> {
        self.by_mnemonic.get(mnemonic).copied()
    }

    /// Operand byte width declared for an opcode.
    pub fn operand_width(&self, opcode: Opcode) -> usize {
        opcode.operand_width()
    }

    /// Number of catalog entries.
    pub fn len(&self) -> usize {
        self.by_mnemonic.len()
    }

    /// Whether the catalog is empty (it never is once built).
    pub fn is_empty(&self) -> bool {
        self.by_mnemonic.is_empty()
    }

    /// Iterate all `(mnemonic, opcode)` entries in encoding order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, Opcode)> {
        Opcode::ALL.into_iter().map(|op| (op.mnemonic(), op))
    }
}
