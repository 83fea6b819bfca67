use crate::x86_64::{reg, Instruction, X86_64InstructionBuilder};
use crate::x86_64::instruction::{encode_alu_imm, encode_mov_imm, encode_rm_reg, opcode};
use crate::common::{AbiClass, Instruction as _, InstructionBuilder, Register as _};

#[cfg(feature = "std")]
use std::process::Command;
#[cfg(feature = "std")]
use std::fs;

#[cfg(not(feature = "std"))]
use alloc::{format, vec, vec::Vec};

/// Helper function to assemble x86-64 assembly (Intel syntax) and extract binary data
#[cfg(feature = "std")]
fn assemble_x86_64(assembly: &str) -> Vec<u8> {
    use std::io::Write;

    let mut asm_file = tempfile::NamedTempFile::new().expect("Failed to create temp assembly file");
    writeln!(asm_file, ".intel_syntax noprefix").expect("Failed to write syntax directive");
    writeln!(asm_file, ".text").expect("Failed to write section directive");
    writeln!(asm_file, "{}", assembly).expect("Failed to write assembly");
    asm_file.flush().expect("Failed to flush assembly file");

    let obj_file = tempfile::NamedTempFile::new().expect("Failed to create temp object file");

    let output = Command::new("as")
        .arg("--64")
        .arg("-o")
        .arg(obj_file.path())
        .arg(asm_file.path())
        .output();

    match output {
        Ok(result) => {
            if !result.status.success() {
                // Skip test if GNU assembler fails or targets another architecture
                println!("Warning: GNU assembler (as --64) failed, skipping comparison test: {}",
                        String::from_utf8_lossy(&result.stderr));
                return vec![];
            }
        }
        Err(e) => {
            println!("Warning: GNU assembler (as) not available, skipping comparison test: {}", e);
            return vec![];
        }
    }

    if let Ok(metadata) = fs::metadata(obj_file.path()) {
        if metadata.len() == 0 {
            println!("Warning: GNU assembler produced empty object file, skipping comparison test");
            return vec![];
        }
    }

    let bin_file = tempfile::NamedTempFile::new().expect("Failed to create temp binary file");
    let objcopy_result = Command::new("objcopy")
        .arg("-O")
        .arg("binary")
        .arg("--only-section=.text")
        .arg(obj_file.path())
        .arg(bin_file.path())
        .output();

    match objcopy_result {
        Ok(result) if result.status.success() => {}
        Ok(result) => {
            println!("Warning: objcopy failed, skipping comparison test: {}",
                    String::from_utf8_lossy(&result.stderr));
            return vec![];
        }
        Err(e) => {
            println!("Warning: objcopy not available, skipping comparison test: {}", e);
            return vec![];
        }
    }

    match fs::read(bin_file.path()) {
        Ok(data) => data,
        Err(e) => {
            println!("Warning: Failed to read binary file, skipping comparison test: {}", e);
            vec![]
        }
    }
}

/// Compare our encoding with GNU assembler output for a single instruction
#[cfg(feature = "std")]
fn compare_instruction(instr: Instruction, gnu_assembly: &str) {
    let gnu_bytes = assemble_x86_64(gnu_assembly);

    // Skip comparison if GNU assembler is not available
    if gnu_bytes.is_empty() {
        return;
    }

    let ours = instr.bytes();
    assert!(gnu_bytes.len() >= ours.len(), "GNU output shorter than ours for {}", gnu_assembly);
    assert_eq!(
        ours,
        &gnu_bytes[..ours.len()],
        "Encoding does not match GNU assembler output\nOurs: {:02x?}\nGNU: {:02x?}\nAssembly: {}",
        ours,
        &gnu_bytes[..ours.len()],
        gnu_assembly
    );
}

#[test]
fn test_register_names_and_abi() {
    assert_eq!(reg::EAX.name(), "eax");
    assert_eq!(reg::EDI.name(), "edi");
    assert_eq!(reg::R10D.name(), "r10d");
    assert_eq!(format!("{}", reg::R15D), "r15d");

    assert_eq!(reg::EAX.abi_class(), AbiClass::CallerSaved);
    assert_eq!(reg::R11D.abi_class(), AbiClass::CallerSaved);
    assert_eq!(reg::EBX.abi_class(), AbiClass::CalleeSaved);
    assert_eq!(reg::R12D.abi_class(), AbiClass::CalleeSaved);
    assert_eq!(reg::ESP.abi_class(), AbiClass::Special);
    assert_eq!(reg::EBP.abi_class(), AbiClass::Special);
}

#[test]
fn test_mov_reg_encoding() {
    assert_eq!(encode_rm_reg(opcode::MOV_RM_REG, reg::EAX, reg::EDI).bytes(), [0x89, 0xf8]);
    assert_eq!(encode_rm_reg(opcode::MOV_RM_REG, reg::EDX, reg::EDI).bytes(), [0x89, 0xfa]);
    // REX.B for an extended destination, REX.R for an extended source
    assert_eq!(encode_rm_reg(opcode::MOV_RM_REG, reg::R8D, reg::EAX).bytes(), [0x41, 0x89, 0xc0]);
    assert_eq!(encode_rm_reg(opcode::MOV_RM_REG, reg::EAX, reg::R9D).bytes(), [0x44, 0x89, 0xc8]);
    assert_eq!(encode_rm_reg(opcode::MOV_RM_REG, reg::R10D, reg::R11D).bytes(), [0x45, 0x89, 0xda]);
}

#[test]
fn test_add_reg_encoding() {
    assert_eq!(encode_rm_reg(opcode::ADD_RM_REG, reg::EAX, reg::ESI).bytes(), [0x01, 0xf0]);
    assert_eq!(encode_rm_reg(opcode::ADD_RM_REG, reg::EDX, reg::ECX).bytes(), [0x01, 0xca]);
    assert_eq!(encode_rm_reg(opcode::ADD_RM_REG, reg::EDX, reg::EAX).bytes(), [0x01, 0xc2]);
}

#[test]
fn test_mov_imm_encoding() {
    assert_eq!(encode_mov_imm(reg::EAX, 100).bytes(), [0xb8, 0x64, 0x00, 0x00, 0x00]);
    assert_eq!(encode_mov_imm(reg::ECX, 100).bytes(), [0xb9, 0x64, 0x00, 0x00, 0x00]);
    assert_eq!(encode_mov_imm(reg::R9D, 0xdead_beef).bytes(), [0x41, 0xb9, 0xef, 0xbe, 0xad, 0xde]);
}

#[test]
fn test_add_imm_picks_shortest_form() {
    // imm8
    assert_eq!(encode_alu_imm(opcode::ADD_EXT, reg::EAX, 100).bytes(), [0x83, 0xc0, 0x64]);
    assert_eq!(encode_alu_imm(opcode::ADD_EXT, reg::ECX, -1).bytes(), [0x83, 0xc1, 0xff]);
    // accumulator short form
    assert_eq!(encode_alu_imm(opcode::ADD_EXT, reg::EAX, 1000).bytes(), [0x05, 0xe8, 0x03, 0x00, 0x00]);
    // generic imm32
    assert_eq!(encode_alu_imm(opcode::ADD_EXT, reg::EDX, 1000).bytes(), [0x81, 0xc2, 0xe8, 0x03, 0x00, 0x00]);
    assert_eq!(
        encode_alu_imm(opcode::ADD_EXT, reg::R8D, 1000).bytes(),
        [0x41, 0x81, 0xc0, 0xe8, 0x03, 0x00, 0x00]
    );
}

#[test]
fn test_instruction_display() {
    assert_eq!(format!("{}", encode_mov_imm(reg::EAX, 100)), "b8 64 00 00 00");
    assert_eq!(encode_mov_imm(reg::EAX, 100).size(), 5);
}

#[test]
fn test_builder_tracks_registers() {
    let mut builder = X86_64InstructionBuilder::new();
    builder
        .mov_imm(reg::ECX, 100)
        .add(reg::EDX, reg::ECX)
        .ret();

    let usage = builder.register_usage();
    assert_eq!(usage.written_registers(), [reg::ECX, reg::EDX]);
    assert_eq!(usage.read_registers(), [reg::ECX, reg::EDX, reg::ESP]);
    assert!(!usage.needs_stack_frame());

    assert_eq!(
        builder.instructions().to_bytes(),
        [0xb9, 0x64, 0x00, 0x00, 0x00, 0x01, 0xca, 0xc3]
    );
    assert_eq!(builder.raw_instructions().len(), 3);

    InstructionBuilder::clear(&mut builder);
    assert!(builder.instructions().is_empty());
    assert!(!builder.register_usage().has_used_registers());
}

#[test]
#[cfg(feature = "std")]
fn test_encodings_match_gnu_as() {
    compare_instruction(encode_rm_reg(opcode::MOV_RM_REG, reg::EAX, reg::EDI), "mov eax, edi");
    compare_instruction(encode_rm_reg(opcode::MOV_RM_REG, reg::R10D, reg::R11D), "mov r10d, r11d");
    compare_instruction(encode_rm_reg(opcode::ADD_RM_REG, reg::EDX, reg::ECX), "add edx, ecx");
    compare_instruction(encode_rm_reg(opcode::ADD_RM_REG, reg::EAX, reg::R9D), "add eax, r9d");
    compare_instruction(encode_mov_imm(reg::ECX, 100), "mov ecx, 100");
    compare_instruction(encode_mov_imm(reg::R12D, 7), "mov r12d, 7");
    compare_instruction(encode_alu_imm(opcode::ADD_EXT, reg::EAX, 100), "add eax, 100");
    compare_instruction(encode_alu_imm(opcode::ADD_EXT, reg::EAX, 1000), "add eax, 1000");
    compare_instruction(encode_alu_imm(opcode::ADD_EXT, reg::ESI, 1000), "add esi, 1000");
    compare_instruction(encode_alu_imm(opcode::ADD_EXT, reg::R13D, -5), "add r13d, -5");
    compare_instruction(crate::x86_64::instruction::encode_ret(), "ret");
}
