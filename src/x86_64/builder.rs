/// Instruction builder interface for x86-64 assembly generation
use super::instruction::*;
use crate::common::register_usage::RegisterUsageInfo;
use crate::common::{InstructionBuilder, InstructionCollection};

#[cfg(feature = "std")]
use std::vec::Vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Instruction builder for generating x86-64 instructions.
///
/// Operands follow Intel order (`dst, src`) and use the 32-bit operand
/// size, so writes zero the upper half of the 64-bit register.
pub struct X86_64InstructionBuilder {
    instructions: Vec<Instruction>,
    register_usage: RegisterUsageInfo<Register>,
}

impl X86_64InstructionBuilder {
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
            register_usage: RegisterUsageInfo::new(),
        }
    }

    fn track_written_register(&mut self, reg: Register) {
        self.register_usage.add_written_register(reg);
    }

    fn track_read_registers(&mut self, regs: &[Register]) {
        for &reg in regs {
            self.register_usage.add_read_register(reg);
        }
    }

    /// Returns a slice of the raw instructions.
    pub fn raw_instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn push(&mut self, instr: Instruction) -> &mut Self {
        self.instructions.push(instr);
        self
    }

    /// Generate MOV instruction (register to register)
    /// MOV dst, src
    pub fn mov(&mut self, dst: Register, src: Register) -> &mut Self {
        self.track_written_register(dst);
        self.track_read_registers(&[src]);
        let instr = encode_rm_reg(opcode::MOV_RM_REG, dst, src);
        self.push(instr)
    }

    /// Generate MOV instruction with a 32-bit immediate
    /// MOV dst, imm32
    pub fn mov_imm(&mut self, dst: Register, imm: u32) -> &mut Self {
        self.track_written_register(dst);
        let instr = encode_mov_imm(dst, imm);
        self.push(instr)
    }

    /// Generate ADD instruction (register to register)
    /// ADD dst, src (dst = dst + src)
    pub fn add(&mut self, dst: Register, src: Register) -> &mut Self {
        self.track_written_register(dst);
        self.track_read_registers(&[dst, src]);
        let instr = encode_rm_reg(opcode::ADD_RM_REG, dst, src);
        self.push(instr)
    }

    /// Generate ADD instruction with an immediate
    /// ADD dst, imm
    pub fn add_imm(&mut self, dst: Register, imm: i32) -> &mut Self {
        self.track_written_register(dst);
        self.track_read_registers(&[dst]);
        let instr = encode_alu_imm(opcode::ADD_EXT, dst, imm);
        self.push(instr)
    }

    /// Generate RET instruction
    /// Pops the return address, so it reads the stack pointer.
    pub fn ret(&mut self) -> &mut Self {
        self.track_read_registers(&[reg::ESP]);
        self.push(encode_ret())
    }
}

impl Default for X86_64InstructionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InstructionBuilder<Instruction> for X86_64InstructionBuilder {
    type Register = Register;

    fn new() -> Self {
        X86_64InstructionBuilder::new()
    }

    fn instructions(&self) -> InstructionCollection<Instruction> {
        InstructionCollection::from_slice(&self.instructions)
    }

    fn push(&mut self, instr: Instruction) {
        self.instructions.push(instr);
    }

    fn clear(&mut self) {
        self.instructions.clear();
        self.register_usage.clear();
    }

    fn register_usage(&self) -> &RegisterUsageInfo<Register> {
        &self.register_usage
    }
}
