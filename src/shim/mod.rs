//! Machine-code shims: tiny routines assembled at runtime.
//!
//! A shim is the out-of-line counterpart of an `asm!` block. Its operands
//! are described by an [`OperandContract`]; [`Shim::assemble`] lowers the
//! contract onto a calling convention (argument registers in, return
//! register out), runs the body, and then checks from the tracked register
//! usage that the body kept the contract: no write to an input-only operand,
//! no write to a register it did not declare.
//!
//! ```rust,ignore
//! let shim = Shim::<SysV>::assemble(
//!     OperandContract::new()
//!         .named_inout("val", reg::EDX)
//!         .clobber(reg::EAX),
//!     |b, ops| {
//!         b.mov_imm(reg::EAX, 100).add(ops.named("val")?, reg::EAX);
//!         Ok(())
//!     },
//! )?;
//! let func = unsafe { shim.function::<fn(i32) -> i32>() }?;
//! assert_eq!(func.call(42), 142);
//! ```

pub mod contract;

pub use contract::{Direction, Operand, OperandContract};

use core::fmt;
use log::{debug, warn};

use crate::common::register_usage::RegisterUsageInfo;
use crate::common::{
    BuildError,
    Instruction,
    InstructionBuilder,
    InstructionCollection,
    InstructionCollectionWithUsage,
    Register,
};

#[cfg(feature = "std")]
use std::vec::Vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// How arguments and results are passed on one architecture
pub trait CallingConvention {
    type Register: Register + 'static;
    type Instruction: Instruction;
    type Builder: InstructionBuilder<Self::Instruction, Register = Self::Register>;

    /// Name used in logs, e.g. `sysv-x86_64`
    const NAME: &'static str;

    /// Integer argument registers, in order
    fn argument_registers() -> &'static [Self::Register];

    /// Register holding an integer return value
    fn return_register() -> Self::Register;

    /// Emit `dst = src`
    fn emit_move(builder: &mut Self::Builder, dst: Self::Register, src: Self::Register);

    /// Emit the return to the caller
    fn emit_return(builder: &mut Self::Builder);
}

/// Errors raised while lowering or verifying a shim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShimError {
    /// More loaded operands than the convention has argument registers
    TooManyInputs { count: usize, available: usize },
    /// A clobber names a register already bound to an operand
    ClobberConflict(&'static str),
    /// A clobber names a register the callee would have to preserve
    CalleeSavedClobber(&'static str),
    /// Loading an operand would overwrite an argument not read yet
    OperandConflict { index: usize, register: &'static str },
    /// The body wrote an input-only operand
    InputOverwritten(&'static str),
    /// The routine wrote a register it did not declare
    UndeclaredClobber(&'static str),
    /// `%index` does not exist
    OperandOutOfRange { index: usize, count: usize },
    /// No operand is declared with this name
    UnknownOperand(&'static str),
    /// The contract has no output operand to return
    NoOutput,
    /// An instruction could not be encoded
    Build(BuildError),
}

impl fmt::Display for ShimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShimError::TooManyInputs { count, available } => {
                write!(f, "{} input operands but only {} argument registers", count, available)
            }
            ShimError::ClobberConflict(reg) => {
                write!(f, "clobber {} is also bound to an operand", reg)
            }
            ShimError::CalleeSavedClobber(reg) => {
                write!(f, "clobber {} is not caller-saved", reg)
            }
            ShimError::OperandConflict { index, register } => {
                write!(f, "loading %{} into {} overwrites an argument still to be read", index, register)
            }
            ShimError::InputOverwritten(reg) => {
                write!(f, "input-only operand {} is written", reg)
            }
            ShimError::UndeclaredClobber(reg) => {
                write!(f, "{} is written but neither an output nor a declared clobber", reg)
            }
            ShimError::OperandOutOfRange { index, count } => {
                write!(f, "operand %{} out of range ({} operands)", index, count)
            }
            ShimError::UnknownOperand(name) => write!(f, "no operand named %[{}]", name),
            ShimError::NoOutput => write!(f, "no output operand to return"),
            ShimError::Build(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ShimError {}

impl From<BuildError> for ShimError {
    fn from(e: BuildError) -> Self {
        ShimError::Build(e)
    }
}

/// A verified routine for calling convention `C`
pub struct Shim<C: CallingConvention> {
    code: InstructionCollectionWithUsage<C::Instruction, C::Register>,
    contract: OperandContract<C::Register>,
}

impl<C: CallingConvention> Shim<C> {
    /// Lower `contract` onto `C`, emit `body` between argument loading and
    /// the return sequence, and verify the result.
    pub fn assemble<F>(contract: OperandContract<C::Register>, body: F) -> Result<Self, ShimError>
    where
        F: FnOnce(&mut C::Builder, &OperandContract<C::Register>) -> Result<(), ShimError>,
    {
        contract.validate(C::argument_registers().len())?;
        let result = contract.result().copied().ok_or(ShimError::NoOutput)?;

        let prologue = Self::load_arguments(&contract)?;

        let mut builder = C::Builder::new();
        body(&mut builder, &contract)?;
        let body = InstructionCollectionWithUsage::from_builder(&builder);
        Self::check_inputs(&contract, body.register_usage())?;

        // The return register is only exempt for the epilogue's own move
        let routine = prologue + body;
        Self::check_writes(&contract, routine.register_usage())?;

        let mut builder = C::Builder::new();
        if result.register != C::return_register() {
            C::emit_move(&mut builder, C::return_register(), result.register);
        }
        C::emit_return(&mut builder);
        let epilogue = InstructionCollectionWithUsage::from_builder(&builder);

        let code = routine + epilogue;

        if !code.register_usage().contains_written_register(&result.register) {
            warn!(
                "{}: result operand %0 ({}) is never written, the returned value is unspecified",
                C::NAME,
                result.register.name()
            );
        }
        debug!(
            "{}: assembled {} bytes, {}",
            C::NAME,
            code.instructions().total_size(),
            code.register_usage()
        );

        Ok(Shim { code, contract })
    }

    /// Move each loaded operand out of its argument register.
    fn load_arguments(
        contract: &OperandContract<C::Register>,
    ) -> Result<InstructionCollectionWithUsage<C::Instruction, C::Register>, ShimError> {
        let arguments = C::argument_registers();
        let mut builder = C::Builder::new();

        for (position, (index, operand)) in contract
            .operands()
            .enumerate()
            .filter(|(_, op)| op.direction.is_loaded())
            .enumerate()
        {
            let source = arguments[position];
            if operand.register == source {
                continue;
            }
            if arguments[position + 1..contract.loaded().count()].contains(&operand.register) {
                return Err(ShimError::OperandConflict { index, register: operand.register.name() });
            }
            debug!("{}: %{} <- {}", C::NAME, index, source.name());
            C::emit_move(&mut builder, operand.register, source);
        }

        Ok(InstructionCollectionWithUsage::from_builder(&builder))
    }

    fn check_inputs(
        contract: &OperandContract<C::Register>,
        body: &RegisterUsageInfo<C::Register>,
    ) -> Result<(), ShimError> {
        let writable = contract.writable();
        for operand in contract.operands().filter(|op| op.direction == Direction::In) {
            if body.contains_written_register(&operand.register) && !writable.contains(&operand.register) {
                return Err(ShimError::InputOverwritten(operand.register.name()));
            }
        }
        Ok(())
    }

    fn check_writes(
        contract: &OperandContract<C::Register>,
        usage: &RegisterUsageInfo<C::Register>,
    ) -> Result<(), ShimError> {
        let mut allowed: Vec<C::Register> = contract.writable();
        allowed.extend(contract.loaded().map(|op| op.register));

        match usage.written_outside(&allowed).first() {
            Some(reg) => Err(ShimError::UndeclaredClobber(reg.name())),
            None => Ok(()),
        }
    }

    pub fn instructions(&self) -> &InstructionCollection<C::Instruction> {
        self.code.instructions()
    }

    pub fn register_usage(&self) -> &RegisterUsageInfo<C::Register> {
        self.code.register_usage()
    }

    pub fn contract(&self) -> &OperandContract<C::Register> {
        &self.contract
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.code.instructions().to_bytes()
    }

    /// Map the shim into executable memory (std-only)
    ///
    /// # Safety
    ///
    /// The host must be the shim's architecture and `F` must match the
    /// contract: one argument per loaded operand, returning `%0`.
    #[cfg(feature = "std")]
    pub unsafe fn function<F>(&self) -> Result<crate::common::jit::CallableJitFunction<F>, crate::common::jit::JitError> {
        crate::common::jit::CallableJitFunction::<F>::new(&self.bytes())
    }
}

#[cfg(test)]
mod tests;
