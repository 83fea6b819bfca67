//! System V AMD64 calling convention for shims.

use super::builder::X86_64InstructionBuilder;
use super::instruction::{reg, Instruction, Register};
use crate::shim::CallingConvention;

/// System V AMD64: integer arguments in `edi, esi, edx, ecx, r8d, r9d`,
/// result in `eax`.
pub struct SysV;

const ARGUMENT_REGISTERS: [Register; 6] = [reg::EDI, reg::ESI, reg::EDX, reg::ECX, reg::R8D, reg::R9D];

impl CallingConvention for SysV {
    type Register = Register;
    type Instruction = Instruction;
    type Builder = X86_64InstructionBuilder;

    const NAME: &'static str = "sysv-x86_64";

    fn argument_registers() -> &'static [Register] {
        &ARGUMENT_REGISTERS
    }

    fn return_register() -> Register {
        reg::EAX
    }

    fn emit_move(builder: &mut X86_64InstructionBuilder, dst: Register, src: Register) {
        builder.mov(dst, src);
    }

    fn emit_return(builder: &mut X86_64InstructionBuilder) {
        builder.ret();
    }
}
