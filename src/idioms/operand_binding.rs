//! Operand binding: three named *output* operands around a single add.
//!
//! `a` and `b` are bound as outputs only, so their values never reach the
//! instruction, and `output_res` is never written. The value returned is
//! whatever the register picked for `output_res` held. This is the defect
//! being demonstrated and it is kept as is.

#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
use core::arch::asm;
use log::{debug, warn};

use super::{unsupported, Backend};
use crate::error::Error;
#[cfg(any(feature = "x86_64", feature = "aarch64"))]
use crate::shim::{OperandContract, Shim, ShimError};

pub const A: i32 = 5;
pub const B: i32 = 7;

pub fn run(backend: Backend) -> Result<i32, Error> {
    match backend {
        #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
        Backend::Inline => Ok(inline()),
        Backend::Shim => shim(),
        Backend::Portable => Ok(portable()),
        #[allow(unreachable_patterns)]
        other => Err(unsupported(other)),
    }
}

#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
pub fn inline() -> i32 {
    let mut a: i32 = A;
    let mut b: i32 = B;
    let result: i32;
    debug!("operand binding: a = {}, b = {} before the block", a, b);

    // `output_res` only appears in a comment: it must be referenced, never written
    #[cfg(target_arch = "x86_64")]
    unsafe {
        asm!(
            "add {output_a:e}, {output_b:e}",
            "/* {output_res:e} */",
            output_res = out(reg) result,
            output_a = out(reg) a,
            output_b = out(reg) b,
            options(nomem, nostack),
        );
    }
    #[cfg(target_arch = "aarch64")]
    unsafe {
        asm!(
            "add {output_a:w}, {output_a:w}, {output_b:w}",
            "/* {output_res:w} */",
            output_res = out(reg) result,
            output_a = out(reg) a,
            output_b = out(reg) b,
            options(nomem, nostack),
        );
    }

    debug!("operand binding: a = {}, b = {}, result = {} after the block", a, b, result);
    result
}

/// The result slot starts at zero and nothing writes it.
pub fn portable() -> i32 {
    let result: i32 = 0;
    let a = A;
    let b = B;
    warn!("operand binding: a = {} and b = {} are never inputs, result is never written", a, b);
    result
}

#[cfg(feature = "x86_64")]
pub fn x86_64_shim() -> Result<Shim<crate::x86_64::SysV>, ShimError> {
    use crate::x86_64::{reg, SysV};

    Shim::<SysV>::assemble(
        OperandContract::new()
            .named_output("output_res", reg::EAX)
            .named_output("output_a", reg::EDX)
            .named_output("output_b", reg::ECX),
        |b, ops| {
            b.add(ops.named("output_a")?, ops.named("output_b")?);
            Ok(())
        },
    )
}

#[cfg(feature = "aarch64")]
pub fn aarch64_shim() -> Result<Shim<crate::aarch64::Aapcs64>, ShimError> {
    use crate::aarch64::{reg, Aapcs64};

    Shim::<Aapcs64>::assemble(
        OperandContract::new()
            .named_output("output_res", reg::W0)
            .named_output("output_a", reg::W2)
            .named_output("output_b", reg::W3),
        |b, ops| {
            let output_a = ops.named("output_a")?;
            b.add(output_a, output_a, ops.named("output_b")?);
            Ok(())
        },
    )
}

/// Assemble the host's shim and call it
pub fn shim() -> Result<i32, Error> {
    match super::HOST_ARCH {
        #[cfg(all(feature = "std", feature = "x86_64"))]
        "x86_64" => {
            let shim = x86_64_shim()?;
            let func = unsafe { shim.function::<fn() -> i32>() }?;
            Ok(func.call())
        }
        #[cfg(all(feature = "std", feature = "aarch64"))]
        "aarch64" => {
            let shim = aarch64_shim()?;
            let func = unsafe { shim.function::<fn() -> i32>() }?;
            Ok(func.call())
        }
        _ => Err(unsupported(Backend::Shim)),
    }
}
