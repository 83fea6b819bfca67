//! Common types and traits shared across all target architectures.

use core::fmt;

/// Register usage tracking functionality
pub mod register_usage;

use register_usage::RegisterUsageInfo;

#[cfg(feature = "std")]
use std::vec::Vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// A collection of instructions with associated register usage information.
///
/// Shims are lowered in three parts (argument marshalling, the body, and the
/// return sequence), each from its own builder. This struct lets those parts
/// be concatenated while keeping an accurate picture of which registers the
/// whole routine reads and writes.
///
/// # Example
///
/// ```rust,ignore
/// let prologue = InstructionCollectionWithUsage::new(
///     prologue.instructions(),
///     prologue.register_usage().clone()
/// );
/// let body = InstructionCollectionWithUsage::new(
///     body.instructions(),
///     body.register_usage().clone()
/// );
///
/// let combined = prologue + body;
/// let usage = combined.register_usage();
/// ```
#[derive(Debug, Clone)]
pub struct InstructionCollectionWithUsage<I: Instruction, R: Register> {
    instructions: InstructionCollection<I>,
    register_usage: RegisterUsageInfo<R>,
}

impl<I: Instruction, R: Register> InstructionCollectionWithUsage<I, R> {
    /// Create a new tracked instruction collection.
    pub fn new(instructions: InstructionCollection<I>, register_usage: RegisterUsageInfo<R>) -> Self {
        Self {
            instructions,
            register_usage,
        }
    }

    /// Capture everything a builder has emitted so far.
    pub fn from_builder<B: InstructionBuilder<I, Register = R>>(builder: &B) -> Self {
        Self::new(builder.instructions(), builder.register_usage().clone())
    }

    /// Get a reference to the instructions.
    pub fn instructions(&self) -> &InstructionCollection<I> {
        &self.instructions
    }

    /// Get a reference to the register usage information.
    pub fn register_usage(&self) -> &RegisterUsageInfo<R> {
        &self.register_usage
    }

    /// Consume this collection and return the instructions and register usage.
    pub fn into_parts(self) -> (InstructionCollection<I>, RegisterUsageInfo<R>) {
        (self.instructions, self.register_usage)
    }

    /// Merge another tracked collection into this one.
    ///
    /// This appends the instructions and merges the register usage information.
    pub fn append(&mut self, other: InstructionCollectionWithUsage<I, R>) {
        self.instructions.append(other.instructions);
        self.register_usage.merge(&other.register_usage);
    }

    /// Concatenate two tracked collections, consuming both.
    pub fn concat(mut self, other: InstructionCollectionWithUsage<I, R>) -> Self {
        self.append(other);
        self
    }
}

impl<I: Instruction, R: Register> core::ops::Add for InstructionCollectionWithUsage<I, R> {
    type Output = InstructionCollectionWithUsage<I, R>;

    /// Concatenate two tracked instruction collections using the `+` operator.
    fn add(self, other: InstructionCollectionWithUsage<I, R>) -> InstructionCollectionWithUsage<I, R> {
        self.concat(other)
    }
}

/// A machine instruction that can be encoded to bytes
pub trait Instruction: Copy + Clone + fmt::Debug + fmt::Display {
    /// Get the instruction as bytes (little-endian)
    fn bytes(&self) -> Vec<u8>;

    /// Get the size of this instruction in bytes
    fn size(&self) -> usize;
}

/// ABI classification for registers based on preservation requirements.
///
/// A shim has no prologue, so only caller-saved registers may be declared
/// clobbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbiClass {
    /// Caller-saved registers that don't need to be preserved across calls.
    ///
    /// Argument, return and scratch registers. A routine may destroy these
    /// as long as it declares them.
    CallerSaved,

    /// Callee-saved registers that must be preserved across calls.
    CalleeSaved,

    /// Special-purpose registers with specific ABI requirements.
    ///
    /// Stack pointer, frame pointer, link register and the zero register.
    Special,
}

impl fmt::Display for AbiClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiClass::CallerSaved => write!(f, "caller-saved"),
            AbiClass::CalleeSaved => write!(f, "callee-saved"),
            AbiClass::Special => write!(f, "special"),
        }
    }
}

/// A register identifier for a target architecture
pub trait Register: Copy + Clone + fmt::Debug + core::hash::Hash + Eq {
    /// Get the register number/identifier
    fn id(&self) -> u32;

    /// Assembler name of the register
    fn name(&self) -> &'static str;

    /// Get the ABI classification for this register.
    fn abi_class(&self) -> AbiClass;

    /// Check if this register is caller-saved.
    fn is_caller_saved(&self) -> bool {
        self.abi_class() == AbiClass::CallerSaved
    }

    /// Check if this register is callee-saved.
    fn is_callee_saved(&self) -> bool {
        self.abi_class() == AbiClass::CalleeSaved
    }

    /// Check if this register is special-purpose.
    fn is_special(&self) -> bool {
        self.abi_class() == AbiClass::Special
    }
}

/// An instruction builder for a specific architecture
pub trait InstructionBuilder<I: Instruction> {
    /// The register type used by this architecture
    type Register: Register;

    /// Create a new instruction builder
    fn new() -> Self;

    /// Get the generated instructions
    fn instructions(&self) -> InstructionCollection<I>;

    /// Add an instruction to the builder
    fn push(&mut self, instr: I);

    /// Clear all instructions and register usage
    fn clear(&mut self);

    /// Get register usage information
    ///
    /// Returns which registers have been written and read by the
    /// instructions in this builder. Shim verification relies on it.
    fn register_usage(&self) -> &RegisterUsageInfo<Self::Register>;
}

/// Convert a sequence of instructions into one byte vector
pub fn instructions_to_bytes<I: Instruction>(instructions: &[I]) -> Vec<u8> {
    let mut result = Vec::new();
    for instr in instructions {
        result.extend_from_slice(&instr.bytes());
    }
    result
}

/// Get the total size in bytes of a collection of instructions
pub fn instructions_total_size<I: Instruction>(instructions: &[I]) -> usize {
    instructions.iter().map(|i| i.size()).sum()
}

/// A collection of instructions with convenient methods for byte manipulation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionCollection<I: Instruction> {
    instructions: Vec<I>,
}

impl<I: Instruction> InstructionCollection<I> {
    /// Create a new empty instruction collection
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
        }
    }

    /// Create from a slice of instructions
    pub fn from_slice(instructions: &[I]) -> Self {
        Self {
            instructions: instructions.to_vec(),
        }
    }

    /// Get the instructions as a slice
    pub fn as_slice(&self) -> &[I] {
        &self.instructions
    }

    /// Convert instructions to a single byte vector
    pub fn to_bytes(&self) -> Vec<u8> {
        instructions_to_bytes(&self.instructions)
    }

    /// Get the total size in bytes of all instructions
    pub fn total_size(&self) -> usize {
        instructions_total_size(&self.instructions)
    }

    /// Append another instruction collection to this one (consumes other).
    pub fn append(&mut self, mut other: InstructionCollection<I>) {
        self.instructions.append(&mut other.instructions);
    }
}

impl<I: Instruction> Default for InstructionCollection<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Instruction> fmt::Display for InstructionCollection<I> {
    /// One instruction per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, instr) in self.instructions.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", instr)?;
        }
        Ok(())
    }
}

impl<I: Instruction> core::ops::Deref for InstructionCollection<I> {
    type Target = [I];

    fn deref(&self) -> &Self::Target {
        &self.instructions
    }
}

/// Errors that can occur during instruction encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    /// Immediate does not fit the instruction's immediate field
    InvalidImmediate(i64),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::InvalidImmediate(val) => write!(f, "Invalid immediate value: {}", val),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BuildError {}

/// JIT execution functionality (std-only)
#[cfg(feature = "std")]
pub mod jit {
    use std::marker::PhantomData;
    use jit_allocator2::JitAllocator;

    /// A JIT-compiled function that can be called directly
    ///
    /// This structure owns executable memory holding a shim and provides
    /// type-safe calling methods. While the type parameter `F` represents a
    /// Rust function signature, the call goes through the C ABI.
    ///
    /// Supported signatures: `fn() -> R`, `fn(A1) -> R`, `fn(A1, A2) -> R`.
    pub struct CallableJitFunction<F> {
        _allocator: Box<JitAllocator>,
        exec_ptr: *const u8,
        _phantom: PhantomData<F>,
    }

    impl<F> CallableJitFunction<F> {
        /// Create a new callable JIT function from instruction bytes
        pub fn new(code: &[u8]) -> Result<Self, JitError> {
            let mut allocator = JitAllocator::new(Default::default());
            let (exec_ptr, mut_ptr) = allocator.alloc(code.len()).map_err(JitError::AllocationFailed)?;

            unsafe {
                std::ptr::copy_nonoverlapping(code.as_ptr(), mut_ptr, code.len());
            }

            Ok(CallableJitFunction {
                _allocator: allocator,
                exec_ptr,
                _phantom: PhantomData,
            })
        }
    }

    impl<R> CallableJitFunction<fn() -> R> {
        /// Call with no arguments
        pub fn call(&self) -> R {
            let func: extern "C" fn() -> R = unsafe { std::mem::transmute_copy(&self.exec_ptr) };
            func()
        }
    }

    impl<A1, R> CallableJitFunction<fn(A1) -> R> {
        /// Call with one argument
        pub fn call(&self, arg1: A1) -> R {
            let func: extern "C" fn(A1) -> R = unsafe { std::mem::transmute_copy(&self.exec_ptr) };
            func(arg1)
        }
    }

    impl<A1, A2, R> CallableJitFunction<fn(A1, A2) -> R> {
        /// Call with two arguments
        pub fn call(&self, arg1: A1, arg2: A2) -> R {
            let func: extern "C" fn(A1, A2) -> R = unsafe { std::mem::transmute_copy(&self.exec_ptr) };
            func(arg1, arg2)
        }
    }

    /// Errors that can occur during JIT execution
    #[derive(Debug)]
    pub enum JitError {
        AllocationFailed(jit_allocator2::Error),
    }

    impl std::fmt::Display for JitError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                JitError::AllocationFailed(e) => write!(f, "Failed to allocate JIT memory: {:?}", e),
            }
        }
    }

    impl std::error::Error for JitError {}
}
