//! Numbered operands: `%0` is the output, `%1` and `%2` the inputs, and the
//! assembly refers to them by position only.

#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
use core::arch::asm;
use log::debug;

use super::{unsupported, Backend};
use crate::error::Error;
#[cfg(any(feature = "x86_64", feature = "aarch64"))]
use crate::shim::{OperandContract, Shim, ShimError};

pub const X: i32 = 10;
pub const Y: i32 = 20;

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
    let x: i32 = X;
    let y: i32 = Y;
    let sum: i32;

    // `out`, not `lateout`: %0 is written before %2 is read
    #[cfg(target_arch = "x86_64")]
    unsafe {
        asm!(
            "mov {0:e}, {1:e}",
            "add {0:e}, {2:e}",
            out(reg) sum,
            in(reg) x,
            in(reg) y,
            options(pure, nomem, nostack),
        );
    }
    #[cfg(target_arch = "aarch64")]
    unsafe {
        asm!(
            "mov {0:w}, {1:w}",
            "add {0:w}, {0:w}, {2:w}",
            out(reg) sum,
            in(reg) x,
            in(reg) y,
            options(pure, nomem, nostack),
        );
    }

    debug!("numbered: %0 = %1 + %2 = {} + {} = {}", x, y, sum);
    sum
}

pub fn portable() -> i32 {
    X.wrapping_add(Y)
}

#[cfg(feature = "x86_64")]
pub fn x86_64_shim() -> Result<Shim<crate::x86_64::SysV>, ShimError> {
    use crate::x86_64::{reg, SysV};

    Shim::<SysV>::assemble(
        OperandContract::new()
            .output(reg::EAX)
            .input(reg::EDI)
            .input(reg::ESI),
        |b, ops| {
            b.mov(ops[0], ops[1]).add(ops[0], ops[2]);
            Ok(())
        },
    )
}

#[cfg(feature = "aarch64")]
pub fn aarch64_shim() -> Result<Shim<crate::aarch64::Aapcs64>, ShimError> {
    use crate::aarch64::{reg, Aapcs64};

    // %0 lives in w9 so that w0 still holds %1 while the sum is formed
    Shim::<Aapcs64>::assemble(
        OperandContract::new()
            .output(reg::W9)
            .input(reg::W0)
            .input(reg::W1),
        |b, ops| {
            b.mov(ops[0], ops[1]).add(ops[0], ops[0], ops[2]);
            Ok(())
        },
    )
}

/// Assemble the host's shim and call it with [`X`] and [`Y`]
pub fn shim() -> Result<i32, Error> {
    match super::HOST_ARCH {
        #[cfg(all(feature = "std", feature = "x86_64"))]
        "x86_64" => {
            let shim = x86_64_shim()?;
            let func = unsafe { shim.function::<fn(i32, i32) -> i32>() }?;
            Ok(func.call(X, Y))
        }
        #[cfg(all(feature = "std", feature = "aarch64"))]
        "aarch64" => {
            let shim = aarch64_shim()?;
            let func = unsafe { shim.function::<fn(i32, i32) -> i32>() }?;
            Ok(func.call(X, Y))
        }
        _ => Err(unsupported(Backend::Shim)),
    }
}
