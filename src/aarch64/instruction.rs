/// AArch64 instruction formats and encoding
use core::fmt;
use crate::common::{
    AbiClass,
    Instruction as InstructionTrait,
    Register as RegisterTrait,
};

#[cfg(feature = "std")]
use std::vec::Vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// AArch64 register, used through its 32-bit W view (`w0`..`w30`).
/// Number 31 is `wzr` or `wsp` depending on the instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Register(pub u8);

const NAMES: [&str; 32] = [
    "w0", "w1", "w2", "w3", "w4", "w5", "w6", "w7",
    "w8", "w9", "w10", "w11", "w12", "w13", "w14", "w15",
    "w16", "w17", "w18", "w19", "w20", "w21", "w22", "w23",
    "w24", "w25", "w26", "w27", "w28", "w29", "w30", "wzr",
];

impl Register {
    pub const fn new(reg: u8) -> Self {
        Self(reg)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(RegisterTrait::name(self))
    }
}

impl RegisterTrait for Register {
    fn id(&self) -> u32 {
        self.0 as u32
    }

    fn name(&self) -> &'static str {
        NAMES.get(self.0 as usize).copied().unwrap_or("?")
    }

    fn abi_class(&self) -> AbiClass {
        match self.0 {
            // Caller-saved registers (do not need to be preserved across calls)
            0..=7 => AbiClass::CallerSaved,     // X0-X7: Argument/return value registers
            8..=15 => AbiClass::CallerSaved,    // X8-X15: Caller-saved temporary registers
            16..=17 => AbiClass::CallerSaved,   // X16-X17: Intra-procedure-call registers
            18 => AbiClass::Special,            // X18: Platform register, reserved on Darwin and Windows

            // Callee-saved registers (must be preserved across calls)
            19..=28 => AbiClass::CalleeSaved,

            // FP, LR, SP/XZR
            _ => AbiClass::Special,
        }
    }
}

/// AArch64 instruction representation (32-bit fixed-width instructions)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction(pub u32);

impl Instruction {
    /// Create a new 32-bit instruction
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the instruction value as u32
    pub fn value(self) -> u32 {
        self.0
    }
}

impl InstructionTrait for Instruction {
    fn bytes(&self) -> Vec<u8> {
        self.0.to_le_bytes().to_vec()
    }

    fn size(&self) -> usize {
        4
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// Data Processing - Register instruction encoding (ADD/SUB shifted register)
pub fn encode_add_sub_reg(sf: u8, op: u8, s: u8, rm: Register, imm6: u8, rn: Register, rd: Register) -> Instruction {
    // 31: sf (0=32-bit, 1=64-bit)
    // 30: op (0=ADD, 1=SUB)
    // 29: s (0=don't set flags, 1=set flags)
    // 28-24: 01011
    // 23-22: shift (00=LSL)
    // 20-16: Rm, 15-10: imm6, 9-5: Rn, 4-0: Rd
    let instr = ((sf as u32) << 31) |
                ((op as u32) << 30) |
                ((s as u32) << 29) |
                (0b01011 << 24) |
                ((rm.value() as u32) << 16) |
                ((imm6 as u32) << 10) |
                ((rn.value() as u32) << 5) |
                (rd.value() as u32);
    Instruction::new(instr)
}

/// Data Processing - Immediate instruction encoding (ADD/SUB immediate)
pub fn encode_add_sub_imm(sf: u8, op: u8, s: u8, sh: u8, imm12: u16, rn: Register, rd: Register) -> Instruction {
    let instr = ((sf as u32) << 31) |
                ((op as u32) << 30) |
                ((s as u32) << 29) |
                (0b10001 << 24) |
                ((sh as u32) << 22) |
                (((imm12 & 0xfff) as u32) << 10) |
                ((rn.value() as u32) << 5) |
                (rd.value() as u32);
    Instruction::new(instr)
}

/// Logical instruction encoding (shifted register)
pub fn encode_logical_reg(sf: u8, opc: u8, shift: u8, n: u8, rm: Register, imm6: u8, rn: Register, rd: Register) -> Instruction {
    let instr = ((sf as u32) << 31) |
                ((opc as u32) << 29) |
                (0b01010 << 24) |
                ((shift as u32) << 22) |
                ((n as u32) << 21) |
                ((rm.value() as u32) << 16) |
                ((imm6 as u32) << 10) |
                ((rn.value() as u32) << 5) |
                (rd.value() as u32);
    Instruction::new(instr)
}

/// Move instruction encoding (ORR with the zero register)
pub fn encode_move_reg(sf: u8, rm: Register, rd: Register) -> Instruction {
    // MOV Rd, Rm -> ORR Rd, ZR, Rm
    encode_logical_reg(sf, 0b01, 0b00, 0, rm, 0, reg::WZR, rd)
}

/// Move wide immediate encoding (MOVN/MOVZ/MOVK)
pub fn encode_move_wide(sf: u8, opc: u8, hw: u8, imm16: u16, rd: Register) -> Instruction {
    // 31: sf, 30-29: opc (00=MOVN, 10=MOVZ, 11=MOVK), 28-23: 100101
    // 22-21: hw (shift / 16), 20-5: imm16, 4-0: Rd
    let instr = ((sf as u32) << 31) |
                ((opc as u32) << 29) |
                (0b100101 << 23) |
                ((hw as u32) << 21) |
                ((imm16 as u32) << 5) |
                (rd.value() as u32);
    Instruction::new(instr)
}

/// Return instruction encoding (RET Xn)
pub fn encode_ret(rn: Register) -> Instruction {
    // Unconditional branch (register): 1101011 0 0 10 11111 000000 Rn 00000
    let instr = (0b1101011 << 25) |
                (0b0010 << 21) |
                (0b11111 << 16) |
                ((rn.value() as u32) << 5);
    Instruction::new(instr)
}

/// Common registers
pub mod reg {
    use super::Register;

    pub const W0: Register = Register::new(0);
    pub const W1: Register = Register::new(1);
    pub const W2: Register = Register::new(2);
    pub const W3: Register = Register::new(3);
    pub const W4: Register = Register::new(4);
    pub const W5: Register = Register::new(5);
    pub const W6: Register = Register::new(6);
    pub const W7: Register = Register::new(7);
    pub const W8: Register = Register::new(8);
    pub const W9: Register = Register::new(9);
    pub const W10: Register = Register::new(10);
    pub const W11: Register = Register::new(11);
    pub const W16: Register = Register::new(16);
    pub const W17: Register = Register::new(17);
    pub const W19: Register = Register::new(19);
    pub const W20: Register = Register::new(20);
    pub const W29: Register = Register::new(29);
    pub const W30: Register = Register::new(30);

    // Register 31 is the zero register here; none of our forms address SP
    pub const WZR: Register = Register::new(31);

    pub const FP: Register = W29;    // Frame pointer
    pub const LR: Register = W30;    // Link register
}
