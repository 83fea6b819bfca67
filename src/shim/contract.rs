//! Operand contracts: what a routine reads, writes and destroys.
//!
//! Numbering follows extended asm: outputs (including in/out operands)
//! first, in declaration order, then inputs. `contract[n]` is `%n`.

use core::ops::Index;

use super::ShimError;
use crate::common::Register;

#[cfg(feature = "std")]
use std::vec::Vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// How a routine uses an operand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Written by the routine, its incoming value is ignored (`=r`)
    Out,
    /// Read and written (`+r`)
    InOut,
    /// Only read (`r`); the routine must leave it untouched
    In,
}

impl Direction {
    pub fn is_output(self) -> bool {
        matches!(self, Direction::Out | Direction::InOut)
    }

    /// Whether the operand is loaded from an argument register on entry
    pub fn is_loaded(self) -> bool {
        matches!(self, Direction::InOut | Direction::In)
    }
}

/// A register bound to one operand slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand<R: Register> {
    pub name: Option<&'static str>,
    pub register: R,
    pub direction: Direction,
}

/// The operand list and clobber list of one routine.
///
/// ```rust,ignore
/// let contract = OperandContract::new()
///     .named_inout("val", reg::EDX)
///     .clobber(reg::EAX);
/// assert_eq!(contract.named("val")?, reg::EDX);
/// assert_eq!(contract[0], reg::EDX);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperandContract<R: Register> {
    outputs: Vec<Operand<R>>,
    inputs: Vec<Operand<R>>,
    clobbers: Vec<R>,
}

impl<R: Register> OperandContract<R> {
    pub fn new() -> Self {
        Self {
            outputs: Vec::new(),
            inputs: Vec::new(),
            clobbers: Vec::new(),
        }
    }

    fn with(mut self, name: Option<&'static str>, register: R, direction: Direction) -> Self {
        let operand = Operand { name, register, direction };
        if direction.is_output() {
            self.outputs.push(operand);
        } else {
            self.inputs.push(operand);
        }
        self
    }

    pub fn output(self, register: R) -> Self {
        self.with(None, register, Direction::Out)
    }

    pub fn named_output(self, name: &'static str, register: R) -> Self {
        self.with(Some(name), register, Direction::Out)
    }

    pub fn inout(self, register: R) -> Self {
        self.with(None, register, Direction::InOut)
    }

    pub fn named_inout(self, name: &'static str, register: R) -> Self {
        self.with(Some(name), register, Direction::InOut)
    }

    pub fn input(self, register: R) -> Self {
        self.with(None, register, Direction::In)
    }

    pub fn named_input(self, name: &'static str, register: R) -> Self {
        self.with(Some(name), register, Direction::In)
    }

    /// Declare a register the routine destroys without binding it to an operand
    pub fn clobber(mut self, register: R) -> Self {
        if !self.clobbers.contains(&register) {
            self.clobbers.push(register);
        }
        self
    }

    /// All operands in `%n` order
    pub fn operands(&self) -> impl Iterator<Item = &Operand<R>> + '_ {
        self.outputs.iter().chain(self.inputs.iter())
    }

    /// Operands loaded from argument registers, in argument order
    pub fn loaded(&self) -> impl Iterator<Item = &Operand<R>> + '_ {
        self.operands().filter(|op| op.direction.is_loaded())
    }

    pub fn clobbers(&self) -> &[R] {
        &self.clobbers
    }

    pub fn len(&self) -> usize {
        self.outputs.len() + self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The operand returned to the caller (`%0`), if it is an output
    pub fn result(&self) -> Option<&Operand<R>> {
        self.outputs.first()
    }

    /// Register of operand `%index`
    pub fn operand(&self, index: usize) -> Result<R, ShimError> {
        self.operands()
            .nth(index)
            .map(|op| op.register)
            .ok_or(ShimError::OperandOutOfRange { index, count: self.len() })
    }

    /// Register of the operand declared as `%[name]`
    pub fn named(&self, name: &'static str) -> Result<R, ShimError> {
        self.operands()
            .find(|op| op.name == Some(name))
            .map(|op| op.register)
            .ok_or(ShimError::UnknownOperand(name))
    }

    /// Registers written legitimately: every output operand and clobber
    pub fn writable(&self) -> Vec<R> {
        self.outputs
            .iter()
            .map(|op| op.register)
            .chain(self.clobbers.iter().copied())
            .collect()
    }

    /// Check the contract on its own, before any code is emitted.
    pub fn validate(&self, argument_registers: usize) -> Result<(), ShimError> {
        let count = self.loaded().count();
        if count > argument_registers {
            return Err(ShimError::TooManyInputs { count, available: argument_registers });
        }

        for clobber in &self.clobbers {
            if self.operands().any(|op| op.register == *clobber) {
                return Err(ShimError::ClobberConflict(clobber.name()));
            }
            if !clobber.is_caller_saved() {
                return Err(ShimError::CalleeSavedClobber(clobber.name()));
            }
        }

        Ok(())
    }
}

impl<R: Register> Default for OperandContract<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Register> Index<usize> for OperandContract<R> {
    type Output = R;

    /// `contract[n]` is `%n`; panics when out of range, see [`OperandContract::operand`]
    fn index(&self, index: usize) -> &R {
        if index < self.outputs.len() {
            &self.outputs[index].register
        } else {
            &self.inputs[index - self.outputs.len()].register
        }
    }
}
