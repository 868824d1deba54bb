//! Integrity-checked growable stack
//!
//! The execution stack validates itself before every mutation. Unused
//! slots hold a poison sentinel, guard cells with a fixed pattern bracket
//! the cell region, and a rolling checksum covers size, capacity, and the
//! whole buffer. `status()` and `dump()` stay usable on a corrupt stack:
//! diagnostics must work exactly when the data they describe is broken.
//!
//! Buffer layout: `[guard][cells; capacity][guard]`.

use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

/// Stack cell type.
pub type Cell = i64;

/// Sentinel written into every slot at index >= size. A legitimately
/// pushed value equal to the sentinel is indistinguishable from poison in
/// a dump; that collision is a documented limitation, never an error.
pub const POISON: Cell = 0xDEAD_BABE_C0FE_BEEFu64 as i64;

/// Fixed pattern held by the guard cells ("CANARY" packed little-endian).
pub const GUARD: Cell = u64::from_le_bytes(*b"CANARY\0\0") as i64;

/// Growth factor for both directions; the shrink threshold uses its
/// square so push/pop oscillation near a boundary cannot thrash.
pub const GROWTH_FACTOR: usize = 2;

/// Capacity never shrinks below this many cells.
const MIN_CAPACITY: usize = 1;

/// Maximum cell rows included in a dump.
const DUMP_MAX_ROWS: usize = 64;

/// Bitmask of independently detectable corruption conditions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StackStatus(u32);

impl StackStatus {
    /// No corruption detected.
    pub const CLEAN: StackStatus = StackStatus(0);
    /// Buffer is missing or too small to hold its guards.
    pub const NULL_BUFFER: StackStatus = StackStatus(1 << 0);
    /// Recorded size exceeds recorded capacity.
    pub const OVERSIZE: StackStatus = StackStatus(1 << 1);
    /// Guard cell before the cell region lost its pattern.
    pub const LEFT_GUARD: StackStatus = StackStatus(1 << 2);
    /// Guard cell after the cell region lost its pattern.
    pub const RIGHT_GUARD: StackStatus = StackStatus(1 << 3);
    /// Stored checksum no longer matches a fresh recomputation.
    pub const CHECKSUM: StackStatus = StackStatus(1 << 4);

    const DESCRIPTIONS: [(StackStatus, &'static str); 5] = [
        (StackStatus::NULL_BUFFER, "stack has no buffer"),
        (StackStatus::OVERSIZE, "stack size is bigger than its capacity"),
        (StackStatus::LEFT_GUARD, "left guard is corrupt"),
        (StackStatus::RIGHT_GUARD, "right guard is corrupt"),
        (StackStatus::CHECKSUM, "checksum mismatch"),
    ];

    /// True when no condition bit is set.
    #[inline]
    pub const fn is_clean(self) -> bool {
        self.0 == 0
    }

    /// True when every bit of `other` is set in `self`.
    #[inline]
    pub const fn contains(self, other: StackStatus) -> bool {
        self.0 & other.0 == other.0
    }

    /// Raw bit representation.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Human-readable descriptions of every set bit.
    pub fn descriptions(self) -> impl Iterator<Item = &'static str> {
        Self::DESCRIPTIONS
            .into_iter()
            .filter(move |(bit, _)| self.contains(*bit))
            .map(|(_, text)| text)
    }
}

impl std::ops::BitOr for StackStatus {
    type Output = StackStatus;
    fn bitor(self, rhs: StackStatus) -> StackStatus {
        StackStatus(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for StackStatus {
    fn bitor_assign(&mut self, rhs: StackStatus) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for StackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return write!(f, "OK");
        }
        let parts: Vec<&str> = self.descriptions().collect();
        write!(f, "CORRUPT [{}]", parts.join(", "))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StackError {
    #[error("failed to allocate buffer for {capacity} cells")]
    Allocation { capacity: usize },

    #[error("operation on empty stack")]
    Empty,

    #[error("stack integrity check failed: {0}")]
    Corrupt(StackStatus),
}

/// Growable LIFO container of [`Cell`]s with woven-in self-validation.
///
/// Exclusively owned by its caller; every mutating operation checks
/// [`Stack::status`] first and refuses to touch a stack already known to
/// be invalid.
#[derive(Debug)]
pub struct Stack {
    /// `[guard][cells; capacity][guard]`
    buf: Box<[Cell]>,
    size: usize,
    capacity: usize,
    checksum: u64,
}

impl Stack {
    /// Create an empty stack sized for `initial_capacity` cells.
    pub fn new(initial_capacity: usize) -> Result<Self, StackError> {
        let buf = alloc_buffer(initial_capacity)?;
        let mut stack = Self {
            buf,
            size: 0,
            capacity: initial_capacity,
            checksum: 0,
        };
        stack.refresh_checksum();
        Ok(stack)
    }

    /// Live element count.
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Allocated cell count.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Push a value, growing the buffer by doubling when full.
    pub fn push(&mut self, value: Cell) -> Result<(), StackError> {
        self.ensure_valid()?;

        if self.size == self.capacity {
            let grown = (self.capacity * GROWTH_FACTOR).max(MIN_CAPACITY);
            self.resize(grown)?;
        }

        self.buf[1 + self.size] = value;
        self.size += 1;
        self.refresh_checksum();
        Ok(())
    }

    /// Remove and return the top value, re-poisoning its slot.
    ///
    /// Shrinks only after the removal, and only once the new size falls
    /// below `capacity / growth_factor²`; the squared threshold keeps a
    /// push/pop oscillation at the boundary from reallocating every call.
    pub fn pop(&mut self) -> Result<Cell, StackError> {
        self.ensure_valid()?;
        if self.size == 0 {
            return Err(StackError::Empty);
        }

        let value = self.buf[self.size];
        self.buf[self.size] = POISON;
        self.size -= 1;
        self.refresh_checksum();

        let shrunk = self.capacity / GROWTH_FACTOR;
        if self.size * GROWTH_FACTOR * GROWTH_FACTOR < self.capacity && shrunk >= MIN_CAPACITY {
            self.resize(shrunk)?;
        }

        Ok(value)
    }

    /// Return the top value without removing it.
    pub fn peek(&self) -> Result<Cell, StackError> {
        self.ensure_valid()?;
        if self.size == 0 {
            return Err(StackError::Empty);
        }
        Ok(self.buf[self.size])
    }

    /// Report every detectable corruption condition as a bitmask.
    ///
    /// Never panics and never mutates; intended to be callable on a stack
    /// suspected to be corrupt, any number of times.
    pub fn status(&self) -> StackStatus {
        let mut status = StackStatus::CLEAN;

        if self.buf.len() < 2 {
            status |= StackStatus::NULL_BUFFER;
        }
        if self.size > self.capacity {
            status |= StackStatus::OVERSIZE;
        }
        if self.buf.first() != Some(&GUARD) {
            status |= StackStatus::LEFT_GUARD;
        }
        if self.buf.last() != Some(&GUARD) {
            status |= StackStatus::RIGHT_GUARD;
        }
        if self.checksum != self.compute_checksum() {
            status |= StackStatus::CHECKSUM;
        }

        status
    }

    /// Produce a diagnostic snapshot for logging.
    ///
    /// Non-mutating and safe to call regardless of `status()`.
    pub fn dump(&self) -> StackDump {
        let rows = self.capacity.min(DUMP_MAX_ROWS);
        let cells = (0..rows)
            .filter_map(|index| {
                self.buf.get(1 + index).map(|&value| CellSnapshot {
                    index,
                    value,
                    poisoned: value == POISON,
                })
            })
            .collect();

        StackDump {
            status: self.status(),
            size: self.size,
            capacity: self.capacity,
            stored_checksum: self.checksum,
            computed_checksum: self.compute_checksum(),
            left_guard: self.buf.first().copied(),
            right_guard: self.buf.last().copied(),
            cells,
            truncated: self.capacity > DUMP_MAX_ROWS,
        }
    }

    fn ensure_valid(&self) -> Result<(), StackError> {
        let status = self.status();
        if status.is_clean() {
            Ok(())
        } else {
            Err(StackError::Corrupt(status))
        }
    }

    /// Reallocate to `new_capacity` cells, copying the live region.
    fn resize(&mut self, new_capacity: usize) -> Result<(), StackError> {
        let mut buf = alloc_buffer(new_capacity)?;
        let live = self.size.min(new_capacity);
        buf[1..1 + live].copy_from_slice(&self.buf[1..1 + live]);

        self.buf = buf;
        self.capacity = new_capacity;
        self.refresh_checksum();
        Ok(())
    }

    fn refresh_checksum(&mut self) {
        self.checksum = self.compute_checksum();
    }

    /// Checksum over the metadata and the whole buffer, guards included.
    fn compute_checksum(&self) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update((self.size as u64).to_le_bytes());
        hasher.update((self.capacity as u64).to_le_bytes());
        for &cell in self.buf.iter() {
            hasher.update(cell.to_le_bytes());
        }
        let digest = hasher.finalize();
        u64::from_le_bytes([
            digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
        ])
    }
}

/// Allocate `[guard][poison; capacity][guard]`, reporting failure as a
/// typed error instead of aborting.
fn alloc_buffer(capacity: usize) -> Result<Box<[Cell]>, StackError> {
    let total = capacity + 2;
    let mut v: Vec<Cell> = Vec::new();
    v.try_reserve_exact(total)
        .map_err(|_| StackError::Allocation { capacity })?;

    v.push(GUARD);
    v.extend(std::iter::repeat(POISON).take(capacity));
    v.push(GUARD);
    Ok(v.into_boxed_slice())
}

/// One cell row in a [`StackDump`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSnapshot {
    pub index: usize,
    pub value: Cell,
    pub poisoned: bool,
}

/// Structured diagnostic snapshot of a stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackDump {
    pub status: StackStatus,
    pub size: usize,
    pub capacity: usize,
    pub stored_checksum: u64,
    pub computed_checksum: u64,
    pub left_guard: Option<Cell>,
    pub right_guard: Option<Cell>,
    pub cells: Vec<CellSnapshot>,
    pub truncated: bool,
}

impl fmt::Display for StackDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "----- stack dump -----")?;
        writeln!(f, "  status:   {}", self.status)?;
        writeln!(f, "  capacity: {}", self.capacity)?;
        writeln!(f, "  size:     {}", self.size)?;
        if let Some(guard) = self.left_guard {
            writeln!(f, "  [----] = {:#018x}", guard)?;
        }
        for cell in &self.cells {
            writeln!(
                f,
                "  [{:04}] = ({}) {:#018x}",
                cell.index,
                if cell.poisoned { "POISON" } else { "VALUE " },
                cell.value,
            )?;
        }
        if self.truncated {
            writeln!(f, "  [....] (truncated)")?;
        }
        if let Some(guard) = self.right_guard {
            writeln!(f, "  [####] = {:#018x}", guard)?;
        }
        writeln!(f, "  checksum:      {:#018x}", self.stored_checksum)?;
        writeln!(f, "  est. checksum: {:#018x}", self.computed_checksum)?;
        Ok(())
    }
}
