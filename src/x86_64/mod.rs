//! x86-64 instruction set support.
//!
//! Just enough of the integer instruction set to express the idiom shims,
//! always with a 32-bit operand size:
//!
//! - **MOV**: register to register, 32-bit immediate to register
//! - **ADD**: register to register, immediate to register (shortest form)
//! - **RET**
//!
//! ## Register Conventions (System V AMD64)
//!
//! - **EAX**: return value (caller-saved)
//! - **EDI, ESI, EDX, ECX, R8D, R9D**: arguments (caller-saved)
//! - **R10D, R11D**: scratch (caller-saved)
//! - **EBX, R12D-R15D**: callee-saved
//! - **ESP, EBP**: stack and frame pointer
//!
//! ## Examples
//!
//! ```rust
//! use asm_idioms::x86_64::{reg, X86_64InstructionBuilder};
//! use asm_idioms::common::InstructionBuilder;
//!
//! let mut builder = X86_64InstructionBuilder::new();
//! builder
//!     .mov(reg::EAX, reg::EDI)   // mov eax, edi
//!     .add(reg::EAX, reg::ESI)   // add eax, esi
//!     .ret();
//!
//! assert_eq!(builder.instructions().to_bytes(), [0x89, 0xf8, 0x01, 0xf0, 0xc3]);
//! ```

pub mod instruction;
pub mod builder;
pub mod abi;

#[cfg(test)]
mod tests;

// Re-export commonly used items
pub use instruction::{Register, Instruction, reg};
pub use builder::X86_64InstructionBuilder;
pub use abi::SysV;
