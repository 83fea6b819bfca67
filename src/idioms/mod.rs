//! The three idioms and the backends that run them.
//!
//! Every idiom exposes the same surface: `inline()` on hosts with an
//! `asm!` backend, `x86_64_shim()` / `aarch64_shim()` building its shim on
//! any host, `shim()` executing the host's shim (std-only), `portable()`,
//! and `run(backend)` choosing among them.

pub mod operand_binding;
pub mod clobber;
pub mod numbered;

use core::fmt;

use crate::error::Error;

#[cfg(feature = "std")]
use std::string::String;
#[cfg(not(feature = "std"))]
use alloc::{format, string::String};

/// Architecture of the host, as far as the backends care
#[cfg(target_arch = "x86_64")]
pub const HOST_ARCH: &str = "x86_64";
#[cfg(target_arch = "aarch64")]
pub const HOST_ARCH: &str = "aarch64";
#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
pub const HOST_ARCH: &str = "unsupported";

/// How an idiom's assembly block is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// `core::arch::asm!` compiled into the caller
    Inline,
    /// Machine code assembled at runtime and called through a function pointer
    Shim,
    /// Plain Rust arithmetic
    Portable,
}

impl Backend {
    /// `Inline` where the host has an `asm!` backend, `Portable` elsewhere
    pub const fn host_default() -> Self {
        if cfg!(any(target_arch = "x86_64", target_arch = "aarch64")) {
            Backend::Inline
        } else {
            Backend::Portable
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Backend::Inline => "inline",
            Backend::Shim => "shim",
            Backend::Portable => "portable",
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Backend::host_default()
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One of the three demonstrated idioms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Idiom {
    /// Named output operands, inputs never wired in
    OperandBinding,
    /// A scratch register declared clobbered
    ClobberDeclaration,
    /// Operands referenced as `%0`, `%1`, `%2`
    NumberedOperand,
}

impl Idiom {
    pub const ALL: [Idiom; 3] = [Idiom::OperandBinding, Idiom::ClobberDeclaration, Idiom::NumberedOperand];

    /// Name of the program demonstrating this idiom
    pub fn program(self) -> &'static str {
        match self {
            Idiom::OperandBinding => "add",
            Idiom::ClobberDeclaration => "clobber",
            Idiom::NumberedOperand => "numbered",
        }
    }

    /// Text printed before the value
    pub fn label(self) -> &'static str {
        match self {
            Idiom::OperandBinding => "Result",
            Idiom::ClobberDeclaration => "Final value",
            Idiom::NumberedOperand => "Sum is",
        }
    }

    /// Execute the idiom's assembly block on `backend` with its fixed inputs
    pub fn run(self, backend: Backend) -> Result<i32, Error> {
        match self {
            Idiom::OperandBinding => operand_binding::run(backend),
            Idiom::ClobberDeclaration => clobber::run(backend),
            Idiom::NumberedOperand => numbered::run(backend),
        }
    }

    /// The program's output line, without the trailing newline
    pub fn render(self, value: i32) -> String {
        format!("{}: {}", self.label(), value)
    }
}

impl fmt::Display for Idiom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

fn unsupported(backend: Backend) -> Error {
    Error::UnsupportedHost { backend, arch: HOST_ARCH }
}
