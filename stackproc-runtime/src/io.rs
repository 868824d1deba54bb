//! Output handling
//!
//! OUT emissions are collected in program order and logged as they
//! happen; the caller decides how to present them.

use crate::stack::Cell;
use tracing::info;

/// Collects the values emitted by OUT instructions.
#[derive(Debug, Default)]
pub struct IoHandler {
    outputs: Vec<Cell>,
}

impl IoHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one emitted value.
    pub fn emit(&mut self, value: Cell) {
        info!(value, "out");
        self.outputs.push(value);
    }

    /// Values emitted so far, in order.
    pub fn outputs(&self) -> &[Cell] {
        &self.outputs
    }

    /// Consume the handler, keeping the emitted values.
    pub fn into_outputs(self) -> Vec<Cell> {
        self.outputs
    }
}
