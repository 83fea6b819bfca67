/// Instruction builder interface for AArch64 assembly generation
use super::instruction::*;
use crate::common::register_usage::RegisterUsageInfo;
use crate::common::{BuildError, InstructionBuilder, InstructionCollection};

#[cfg(feature = "std")]
use std::vec::Vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Instruction builder for generating AArch64 instructions (32-bit W forms)
pub struct Aarch64InstructionBuilder {
    instructions: Vec<Instruction>,
    register_usage: RegisterUsageInfo<Register>,
}

impl Aarch64InstructionBuilder {
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
            register_usage: RegisterUsageInfo::new(),
        }
    }

    fn track_written_register(&mut self, reg: Register) {
        self.register_usage.add_written_register(reg);
    }

    fn track_read_register(&mut self, reg: Register) {
        self.register_usage.add_read_register(reg);
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

    /// Generate ADD instruction (32-bit register)
    /// ADD Wd, Wn, Wm
    pub fn add(&mut self, rd: Register, rn: Register, rm: Register) -> &mut Self {
        self.track_written_register(rd);
        self.track_read_registers(&[rn, rm]);
        let instr = encode_add_sub_reg(0, 0, 0, rm, 0, rn, rd); // sf=0 (32-bit), op=0 (ADD), s=0
        self.push(instr)
    }

    /// Generate ADD immediate instruction (32-bit)
    /// ADD Wd, Wn, #imm (imm must fit in 12 bits)
    pub fn add_imm(&mut self, rd: Register, rn: Register, imm: u32) -> Result<&mut Self, BuildError> {
        if imm > 0xfff {
            return Err(BuildError::InvalidImmediate(imm as i64));
        }
        self.track_written_register(rd);
        self.track_read_register(rn);
        let instr = encode_add_sub_imm(0, 0, 0, 0, imm as u16, rn, rd); // sf=0, op=0 (ADD), s=0, sh=0
        Ok(self.push(instr))
    }

    /// Generate MOV instruction (register to register)
    /// MOV Wd, Wm (implemented as ORR Wd, WZR, Wm)
    pub fn mov(&mut self, rd: Register, rm: Register) -> &mut Self {
        self.track_written_register(rd);
        self.track_read_register(rm);
        let instr = encode_move_reg(0, rm, rd);
        self.push(instr)
    }

    /// Generate MOV immediate instruction
    /// MOV Wd, #imm (implemented as MOVZ Wd, #imm, imm must fit in 16 bits)
    pub fn mov_imm(&mut self, rd: Register, imm: u32) -> Result<&mut Self, BuildError> {
        let imm16 = u16::try_from(imm).map_err(|_| BuildError::InvalidImmediate(imm as i64))?;
        self.track_written_register(rd);
        let instr = encode_move_wide(0, 0b10, 0, imm16, rd);
        Ok(self.push(instr))
    }

    /// Generate RET instruction (returns to LR)
    pub fn ret(&mut self) -> &mut Self {
        self.track_read_register(reg::LR);
        let instr = encode_ret(reg::LR);
        self.push(instr)
    }
}

impl Default for Aarch64InstructionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InstructionBuilder<Instruction> for Aarch64InstructionBuilder {
    type Register = Register;

    fn new() -> Self {
        Aarch64InstructionBuilder::new()
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
