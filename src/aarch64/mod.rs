//! AArch64 instruction set support.
//!
//! All instructions are 32-bit fixed width. Only the W (32-bit) register
//! forms the idiom shims need are provided:
//!
//! - **ADD**: register and 12-bit immediate
//! - **MOV**: register (ORR with WZR) and 16-bit immediate (MOVZ)
//! - **RET**
//!
//! ## Register Conventions (AAPCS64)
//!
//! - **W0-W7**: Argument/result registers (caller-saved)
//! - **W8-W17**: Caller-saved temporary registers
//! - **W18**: Platform register (treated as special)
//! - **W19-W28**: Callee-saved registers
//! - **W29/W30**: Frame pointer and link register
//! - **31**: Zero register (WZR) or stack pointer
//!
//! ## Examples
//!
//! ```rust
//! use asm_idioms::aarch64::{reg, Aarch64InstructionBuilder};
//! use asm_idioms::common::InstructionBuilder;
//!
//! let mut builder = Aarch64InstructionBuilder::new();
//! builder
//!     .add(reg::W0, reg::W0, reg::W1)  // W0 = W0 + W1
//!     .ret();
//!
//! assert_eq!(builder.instructions()[0].value(), 0x0b010000);
//! ```

pub mod instruction;
pub mod builder;
pub mod abi;


// Re-export commonly used items
pub use instruction::{Register, Instruction, reg};
pub use builder::Aarch64InstructionBuilder;
pub use abi::Aapcs64;
