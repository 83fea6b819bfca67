//! Clobber declaration: a scratch register loaded with a constant and added
//! into an in/out operand. The scratch register is declared clobbered, so
//! the compiler keeps nothing live in it across the block.

#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
use core::arch::asm;
use log::debug;

use super::{unsupported, Backend};
use crate::error::Error;
#[cfg(any(feature = "x86_64", feature = "aarch64"))]
use crate::shim::{OperandContract, Shim, ShimError};

pub const INPUT: i32 = 42;

/// Constant loaded into the scratch register
pub const SCRATCH: i32 = 100;

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
    let mut val: i32 = INPUT;

    #[cfg(target_arch = "x86_64")]
    unsafe {
        asm!(
            "mov eax, 100",
            "add {val:e}, eax",
            val = inout(reg) val,
            out("eax") _,
            options(nomem, nostack),
        );
    }
    #[cfg(target_arch = "aarch64")]
    unsafe {
        asm!(
            "mov w9, #100",
            "add {val:w}, {val:w}, w9",
            val = inout(reg) val,
            out("x9") _,
            options(nomem, nostack),
        );
    }

    debug!("clobber: {} + {} = {}", INPUT, SCRATCH, val);
    val
}

pub fn portable() -> i32 {
    INPUT.wrapping_add(SCRATCH)
}

#[cfg(feature = "x86_64")]
pub fn x86_64_shim() -> Result<Shim<crate::x86_64::SysV>, ShimError> {
    use crate::x86_64::{reg, SysV};

    // `val` must not share eax with the scratch load
    Shim::<SysV>::assemble(
        OperandContract::new()
            .named_inout("val", reg::EDX)
            .clobber(reg::EAX),
        |b, ops| {
            b.mov_imm(reg::EAX, SCRATCH as u32)
                .add(ops.named("val")?, reg::EAX);
            Ok(())
        },
    )
}

#[cfg(feature = "aarch64")]
pub fn aarch64_shim() -> Result<Shim<crate::aarch64::Aapcs64>, ShimError> {
    use crate::aarch64::{reg, Aapcs64};

    Shim::<Aapcs64>::assemble(
        OperandContract::new()
            .named_inout("val", reg::W0)
            .clobber(reg::W9),
        |b, ops| {
            let val = ops.named("val")?;
            b.mov_imm(reg::W9, SCRATCH as u32)?.add(val, val, reg::W9);
            Ok(())
        },
    )
}

/// Assemble the host's shim and call it with [`INPUT`]
pub fn shim() -> Result<i32, Error> {
    match super::HOST_ARCH {
        #[cfg(all(feature = "std", feature = "x86_64"))]
        "x86_64" => {
            let shim = x86_64_shim()?;
            let func = unsafe { shim.function::<fn(i32) -> i32>() }?;
            Ok(func.call(INPUT))
        }
        #[cfg(all(feature = "std", feature = "aarch64"))]
        "aarch64" => {
            let shim = aarch64_shim()?;
            let func = unsafe { shim.function::<fn(i32) -> i32>() }?;
            Ok(func.call(INPUT))
        }
        _ => Err(unsupported(Backend::Shim)),
    }
}
