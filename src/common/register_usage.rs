//! Register usage tracking for assembled routines.
//!
//! Every builder records which registers each emitted instruction writes
//! (def) and reads (use). Shim verification compares the written set against
//! the operands and clobbers a routine declares.

use core::fmt;
use crate::common::Register;
use hashbrown::HashSet;

#[cfg(feature = "std")]
use std::vec::Vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Information about register usage in a collection of instructions.
///
/// Registers returned as vectors are sorted by register id so that logs and
/// error messages are stable across runs.
///
/// # Example
///
/// ```rust,ignore
/// let mut usage_info = RegisterUsageInfo::new();
/// usage_info.add_written_register(reg::EAX);
/// usage_info.add_read_register(reg::EDI);
///
/// println!("Written (def): {:?}", usage_info.written_registers());
/// println!("Read (use): {:?}", usage_info.read_registers());
/// ```
#[derive(Debug, Clone)]
pub struct RegisterUsageInfo<R: Register> {
    /// Set of registers that are written to (def)
    written_registers: HashSet<R>,
    /// Set of registers that are read from (use)
    read_registers: HashSet<R>,
}

fn sorted<'a, R: Register + 'a>(registers: impl Iterator<Item = &'a R>) -> Vec<R> {
    let mut registers: Vec<R> = registers.copied().collect();
    registers.sort_by_key(|reg| reg.id());
    registers.dedup();
    registers
}

impl<R: Register> RegisterUsageInfo<R> {
    /// Create a new empty register usage tracker.
    pub fn new() -> Self {
        Self {
            written_registers: HashSet::new(),
            read_registers: HashSet::new(),
        }
    }

    /// Add a register that is written to (destination register).
    pub fn add_written_register(&mut self, register: R) {
        self.written_registers.insert(register);
    }

    /// Add a register that is read from (source register).
    pub fn add_read_register(&mut self, register: R) {
        self.read_registers.insert(register);
    }

    /// Get all written registers (def).
    pub fn written_registers(&self) -> Vec<R> {
        sorted(self.written_registers.iter())
    }

    /// Get all read registers (use).
    pub fn read_registers(&self) -> Vec<R> {
        sorted(self.read_registers.iter())
    }

    /// Get all used registers (def ∪ use).
    pub fn used_registers(&self) -> Vec<R> {
        sorted(self.written_registers.iter().chain(self.read_registers.iter()))
    }

    /// Get the written registers that are not in `allowed`.
    ///
    /// For a shim body, `allowed` is its output operands, its declared
    /// clobbers and its loaded operands; anything left over destroys a value
    /// the caller may still rely on.
    pub fn written_outside(&self, allowed: &[R]) -> Vec<R> {
        sorted(self.written_registers.iter().filter(|reg| !allowed.contains(*reg)))
    }

    /// Get the total number of unique registers used.
    pub fn register_count(&self) -> usize {
        self.used_registers().len()
    }

    /// Check if any registers are used.
    pub fn has_used_registers(&self) -> bool {
        !self.written_registers.is_empty() || !self.read_registers.is_empty()
    }

    /// Check if any callee-saved registers are written to.
    pub fn needs_stack_frame(&self) -> bool {
        self.written_registers.iter().any(|reg| reg.is_callee_saved())
    }

    /// Clear all register usage information.
    pub fn clear(&mut self) {
        self.written_registers.clear();
        self.read_registers.clear();
    }

    /// Check if a specific register is used (written or read).
    pub fn contains_register(&self, register: &R) -> bool {
        self.written_registers.contains(register) || self.read_registers.contains(register)
    }

    /// Check if a specific register is written to.
    pub fn contains_written_register(&self, register: &R) -> bool {
        self.written_registers.contains(register)
    }

    /// Check if a specific register is read from.
    pub fn contains_read_register(&self, register: &R) -> bool {
        self.read_registers.contains(register)
    }

    /// Merge another register usage info into this one.
    pub fn merge(&mut self, other: &RegisterUsageInfo<R>) {
        self.written_registers.extend(other.written_registers.iter().copied());
        self.read_registers.extend(other.read_registers.iter().copied());
    }
}

impl<R: Register> Default for RegisterUsageInfo<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Register> fmt::Display for RegisterUsageInfo<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "writes [")?;
        for (i, reg) in self.written_registers().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            f.write_str(reg.name())?;
        }
        write!(f, "] reads [")?;
        for (i, reg) in self.read_registers().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            f.write_str(reg.name())?;
        }
        write!(f, "]")?;

        if self.needs_stack_frame() {
            write!(f, " [needs stack frame]")?;
        }

        Ok(())
    }
}
