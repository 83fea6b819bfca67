//! AAPCS64 calling convention for shims.

use super::builder::Aarch64InstructionBuilder;
use super::instruction::{reg, Instruction, Register};
use crate::shim::CallingConvention;

/// AAPCS64: integer arguments in `w0..w7`, result in `w0`.
pub struct Aapcs64;

const ARGUMENT_REGISTERS: [Register; 8] = [
    reg::W0, reg::W1, reg::W2, reg::W3, reg::W4, reg::W5, reg::W6, reg::W7,
];

impl CallingConvention for Aapcs64 {
    type Register = Register;
    type Instruction = Instruction;
    type Builder = Aarch64InstructionBuilder;

    const NAME: &'static str = "aapcs64";

    fn argument_registers() -> &'static [Register] {
        &ARGUMENT_REGISTERS
    }

    fn return_register() -> Register {
        reg::W0
    }

    fn emit_move(builder: &mut Aarch64InstructionBuilder, dst: Register, src: Register) {
        builder.mov(dst, src);
    }

    fn emit_return(builder: &mut Aarch64InstructionBuilder) {
        builder.ret();
    }
}
