/// x86-64 instruction formats and encoding
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

/// x86-64 general-purpose register, used with a 32-bit operand size
/// (`eax`..`r15d`). The number is the hardware encoding 0..=15.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Register(pub u8);

const NAMES: [&str; 16] = [
    "eax", "ecx", "edx", "ebx", "esp", "ebp", "esi", "edi",
    "r8d", "r9d", "r10d", "r11d", "r12d", "r13d", "r14d", "r15d",
];

impl Register {
    pub const fn new(reg: u8) -> Self {
        Self(reg)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Low three bits, as placed in ModRM and opcode fields
    fn low(self) -> u8 {
        self.0 & 0b111
    }

    /// Whether the register needs a REX extension bit
    fn extended(self) -> bool {
        self.0 >= 8
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
            // System V AMD64: rax, rcx, rdx, rsi, rdi, r8-r11
            0..=2 | 6..=11 => AbiClass::CallerSaved,
            // rbx, r12-r15
            3 | 12..=15 => AbiClass::CalleeSaved,
            // rsp, rbp
            4 | 5 => AbiClass::Special,
            _ => AbiClass::Special,
        }
    }
}

/// Longest legal x86 instruction
pub const MAX_INSTRUCTION_LEN: usize = 15;

/// x86-64 instruction representation (variable length, 1..=15 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    bytes: [u8; MAX_INSTRUCTION_LEN],
    len: u8,
}

impl Instruction {
    /// Create an instruction from its encoded bytes
    pub fn new(encoded: &[u8]) -> Self {
        let mut bytes = [0u8; MAX_INSTRUCTION_LEN];
        let len = encoded.len().min(MAX_INSTRUCTION_LEN);
        bytes[..len].copy_from_slice(&encoded[..len]);
        Self { bytes, len: len as u8 }
    }

    /// Encoded bytes of this instruction
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }
}

impl InstructionTrait for Instruction {
    fn bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    fn size(&self) -> usize {
        self.len as usize
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.as_bytes().iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// REX prefix for a `reg, r/m` pair, or `None` when neither is extended
fn rex(reg: Register, rm: Register) -> Option<u8> {
    if reg.extended() || rm.extended() {
        Some(0x40 | ((reg.extended() as u8) << 2) | (rm.extended() as u8))
    } else {
        None
    }
}

/// ModRM byte for register-direct addressing (mod = 11)
fn modrm_direct(reg: u8, rm: Register) -> u8 {
    0b1100_0000 | ((reg & 0b111) << 3) | rm.low()
}

/// `op r/m32, r32` (MR form): `[REX] op ModRM`
///
/// Used for `89 /r` (MOV) and `01 /r` (ADD). `dst` goes in r/m, `src` in reg.
pub fn encode_rm_reg(opcode: u8, dst: Register, src: Register) -> Instruction {
    let mut buf = [0u8; 3];
    let mut n = 0;
    if let Some(prefix) = rex(src, dst) {
        buf[n] = prefix;
        n += 1;
    }
    buf[n] = opcode;
    buf[n + 1] = modrm_direct(src.low(), dst);
    Instruction::new(&buf[..n + 2])
}

/// `MOV r32, imm32` (OI form): `[REX.B] B8+rd id`
pub fn encode_mov_imm(dst: Register, imm: u32) -> Instruction {
    let mut buf = [0u8; 6];
    let mut n = 0;
    if dst.extended() {
        buf[n] = 0x41;
        n += 1;
    }
    buf[n] = 0xb8 + dst.low();
    buf[n + 1..n + 5].copy_from_slice(&imm.to_le_bytes());
    Instruction::new(&buf[..n + 5])
}

/// Group-1 ALU with immediate, opcode extension `ext` (`/0` is ADD).
///
/// Picks the shortest form the GNU assembler would: `83 /ext ib` when the
/// immediate fits in a signed byte, the accumulator short form
/// (`05 id` for ADD) for `eax`, otherwise `81 /ext id`.
pub fn encode_alu_imm(ext: u8, dst: Register, imm: i32) -> Instruction {
    let mut buf = [0u8; 7];
    let mut n = 0;
    if dst.extended() {
        buf[n] = 0x41;
        n += 1;
    }

    if let Ok(imm8) = i8::try_from(imm) {
        buf[n] = 0x83;
        buf[n + 1] = modrm_direct(ext, dst);
        buf[n + 2] = imm8 as u8;
        return Instruction::new(&buf[..n + 3]);
    }

    if dst.value() == 0 {
        buf[0] = 0x05 | ((ext & 0b111) << 3);
        buf[1..5].copy_from_slice(&imm.to_le_bytes());
        return Instruction::new(&buf[..5]);
    }

    buf[n] = 0x81;
    buf[n + 1] = modrm_direct(ext, dst);
    buf[n + 2..n + 6].copy_from_slice(&imm.to_le_bytes());
    Instruction::new(&buf[..n + 6])
}

/// Near return (`C3`)
pub fn encode_ret() -> Instruction {
    Instruction::new(&[0xc3])
}

/// Opcodes used by the builder
pub mod opcode {
    pub const MOV_RM_REG: u8 = 0x89;
    pub const ADD_RM_REG: u8 = 0x01;
    pub const ADD_EXT: u8 = 0;
}

/// Common registers
pub mod reg {
    use super::Register;

    pub const EAX: Register = Register::new(0);
    pub const ECX: Register = Register::new(1);
    pub const EDX: Register = Register::new(2);
    pub const EBX: Register = Register::new(3);
    pub const ESP: Register = Register::new(4);
    pub const EBP: Register = Register::new(5);
    pub const ESI: Register = Register::new(6);
    pub const EDI: Register = Register::new(7);
    pub const R8D: Register = Register::new(8);
    pub const R9D: Register = Register::new(9);
    pub const R10D: Register = Register::new(10);
    pub const R11D: Register = Register::new(11);
    pub const R12D: Register = Register::new(12);
    pub const R13D: Register = Register::new(13);
    pub const R14D: Register = Register::new(14);
    pub const R15D: Register = Register::new(15);
}
