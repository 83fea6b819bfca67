#![cfg_attr(not(feature = "std"), no_std)]

//! # Extended Inline Assembly Idioms
//!
//! Three small assembly contracts, each a separately testable call site:
//!
//! - **Operand binding** ([`idioms::operand_binding`]): named output operands,
//!   kept with its defect (the inputs are never wired in and the
//!   result operand is never written).
//! - **Clobber declaration** ([`idioms::clobber`]): a scratch register declared
//!   clobbered so the caller never relies on it.
//! - **Numbered operands** ([`idioms::numbered`]): operands referenced by
//!   position instead of by name.
//!
//! ## Backends
//!
//! - **`inline`**: `core::arch::asm!` on x86-64 and AArch64 hosts
//! - **`shim`**: a routine assembled to machine code at runtime and called
//!   through an `extern "C"` function pointer (`std` feature)
//! - **`portable`**: plain Rust arithmetic for every other host
//!
//! Shims are assembled host-independently: an AArch64 shim can be built and
//! inspected on an x86-64 machine, only calling it requires a matching host.
//!
//! ## Usage
//!
//! ```rust
//! use asm_idioms::idioms::{Backend, Idiom};
//!
//! let value = Idiom::NumberedOperand.run(Backend::Portable).unwrap();
//! assert_eq!(Idiom::NumberedOperand.render(value), "Sum is: 30");
//! ```

#[cfg(not(feature = "std"))]
extern crate alloc;

// Common types and traits shared across architectures
pub mod common;

// Architecture-specific encoders
#[cfg(feature = "x86_64")]
pub mod x86_64;

#[cfg(feature = "aarch64")]
pub mod aarch64;

pub mod shim;
pub mod idioms;
pub mod error;

#[cfg(feature = "std")]
pub mod config;

pub use error::Error;
pub use idioms::{Backend, Idiom};
