use super::*;

#[cfg(not(feature = "std"))]
use alloc::vec;

#[cfg(feature = "x86_64")]
mod sysv {
    use super::*;
    use crate::x86_64::{reg, SysV};

    #[test]
    fn test_inout_operand_is_loaded_and_returned() {
        let shim = Shim::<SysV>::assemble(
            OperandContract::new()
                .named_inout("val", reg::EDX)
                .clobber(reg::EAX),
            |b, ops| {
                b.mov_imm(reg::EAX, 100).add(ops.named("val")?, reg::EAX);
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(
            shim.bytes(),
            vec![
                0x89, 0xfa,                         // mov edx, edi
                0xb8, 0x64, 0x00, 0x00, 0x00,       // mov eax, 100
                0x01, 0xc2,                         // add edx, eax
                0x89, 0xd0,                         // mov eax, edx
                0xc3,                               // ret
            ]
        );
        assert_eq!(shim.instructions().len(), 5);
        assert_eq!(shim.register_usage().written_registers(), [reg::EAX, reg::EDX]);
        assert_eq!(shim.contract().clobbers(), [reg::EAX]);
    }

    #[test]
    fn test_operands_already_in_place_emit_no_moves() {
        let shim = Shim::<SysV>::assemble(
            OperandContract::new()
                .output(reg::EAX)
                .input(reg::EDI)
                .input(reg::ESI),
            |b, ops| {
                b.mov(ops[0], ops[1]).add(ops[0], ops[2]);
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(shim.bytes(), vec![0x89, 0xf8, 0x01, 0xf0, 0xc3]);

        let usage = shim.register_usage();
        assert_eq!(usage.written_registers(), [reg::EAX]);
        assert_eq!(usage.read_registers(), [reg::EAX, reg::ESP, reg::ESI, reg::EDI]);
        assert!(!usage.needs_stack_frame());
    }

    #[test]
    fn test_unwritten_result_still_assembles() {
        let shim = Shim::<SysV>::assemble(
            OperandContract::new()
                .named_output("output_res", reg::EAX)
                .named_output("output_a", reg::EDX)
                .named_output("output_b", reg::ECX),
            |b, ops| {
                b.add(ops.named("output_a")?, ops.named("output_b")?);
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(shim.bytes(), vec![0x01, 0xca, 0xc3]);
        assert!(!shim.register_usage().contains_written_register(&reg::EAX));
    }

    #[test]
    fn test_rejects_undeclared_clobber() {
        let result = Shim::<SysV>::assemble(
            OperandContract::new().output(reg::EAX).input(reg::EDI),
            |b, _| {
                b.mov_imm(reg::ECX, 100).mov(reg::EAX, reg::EDI).add(reg::EAX, reg::ECX);
                Ok(())
            },
        );
        assert_eq!(result.err(), Some(ShimError::UndeclaredClobber("ecx")));
    }

    #[test]
    fn test_return_register_is_not_an_implicit_clobber() {
        // eax is the return register but not an operand here
        let result = Shim::<SysV>::assemble(
            OperandContract::new().named_inout("val", reg::EDX),
            |b, ops| {
                b.mov_imm(reg::EAX, 100).add(ops.named("val")?, reg::EAX);
                Ok(())
            },
        );
        assert_eq!(result.err(), Some(ShimError::UndeclaredClobber("eax")));

        let result = Shim::<SysV>::assemble(
            OperandContract::new().output(reg::ECX).input(reg::EDI),
            |b, ops| {
                b.mov_imm(reg::EAX, 1).mov(ops[0], ops[1]).add(ops[0], reg::EAX);
                Ok(())
            },
        );
        assert_eq!(result.err(), Some(ShimError::UndeclaredClobber("eax")));
    }

    #[test]
    fn test_epilogue_may_write_return_register() {
        let shim = Shim::<SysV>::assemble(
            OperandContract::new().output(reg::ECX).input(reg::EDI),
            |b, ops| {
                b.mov(ops[0], ops[1]).add_imm(ops[0], 1);
                Ok(())
            },
        )
        .unwrap();

        // mov ecx, edi; add ecx, 1; mov eax, ecx; ret
        assert_eq!(shim.bytes(), vec![0x89, 0xf9, 0x83, 0xc1, 0x01, 0x89, 0xc8, 0xc3]);
        assert_eq!(shim.register_usage().written_registers(), [reg::EAX, reg::ECX]);
    }

    #[test]
    fn test_declared_clobber_is_accepted() {
        let result = Shim::<SysV>::assemble(
            OperandContract::new().output(reg::EAX).input(reg::EDI).clobber(reg::ECX),
            |b, _| {
                b.mov_imm(reg::ECX, 100).mov(reg::EAX, reg::EDI).add(reg::EAX, reg::ECX);
                Ok(())
            },
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_rejects_overwritten_input() {
        let result = Shim::<SysV>::assemble(
            OperandContract::new()
                .output(reg::EAX)
                .input(reg::EDI)
                .input(reg::ESI),
            |b, ops| {
                b.add(ops[1], ops[2]).mov(ops[0], ops[1]);
                Ok(())
            },
        );
        assert_eq!(result.err(), Some(ShimError::InputOverwritten("edi")));
    }

    #[test]
    fn test_rejects_load_over_pending_argument() {
        // %1 would be moved into esi before the second argument is read from it
        let result = Shim::<SysV>::assemble(
            OperandContract::new()
                .output(reg::EAX)
                .input(reg::ESI)
                .input(reg::EDI),
            |b, ops| {
                b.mov(ops[0], ops[1]).add(ops[0], ops[2]);
                Ok(())
            },
        );
        assert_eq!(
            result.err(),
            Some(ShimError::OperandConflict { index: 1, register: "esi" })
        );
    }

    #[test]
    fn test_rejects_invalid_contracts() {
        let no_output = Shim::<SysV>::assemble(OperandContract::new().input(reg::EDI), |_, _| Ok(()));
        assert_eq!(no_output.err(), Some(ShimError::NoOutput));

        let overlap = Shim::<SysV>::assemble(
            OperandContract::new().inout(reg::EDX).clobber(reg::EDX),
            |_, _| Ok(()),
        );
        assert_eq!(overlap.err(), Some(ShimError::ClobberConflict("edx")));

        let callee_saved = Shim::<SysV>::assemble(
            OperandContract::new().inout(reg::EDX).clobber(reg::EBX),
            |_, _| Ok(()),
        );
        assert_eq!(callee_saved.err(), Some(ShimError::CalleeSavedClobber("ebx")));

        let mut contract = OperandContract::new().output(reg::EAX);
        for register in [reg::EDI, reg::ESI, reg::EDX, reg::ECX, reg::R8D, reg::R9D, reg::R10D] {
            contract = contract.input(register);
        }
        let too_many = Shim::<SysV>::assemble(contract, |_, _| Ok(()));
        assert_eq!(too_many.err(), Some(ShimError::TooManyInputs { count: 7, available: 6 }));
    }

    #[test]
    fn test_body_errors_propagate() {
        let result = Shim::<SysV>::assemble(
            OperandContract::new().output(reg::EAX).input(reg::EDI),
            |b, ops| {
                b.mov(ops.operand(0)?, ops.operand(2)?);
                Ok(())
            },
        );
        assert_eq!(result.err(), Some(ShimError::OperandOutOfRange { index: 2, count: 2 }));
    }

    #[test]
    #[cfg(all(feature = "std", target_arch = "x86_64"))]
    fn test_call_shim() {
        let shim = Shim::<SysV>::assemble(
            OperandContract::new()
                .named_inout("val", reg::EDX)
                .clobber(reg::EAX),
            |b, ops| {
                b.mov_imm(reg::EAX, 100).add(ops.named("val")?, reg::EAX);
                Ok(())
            },
        )
        .unwrap();

        let func = unsafe { shim.function::<fn(i32) -> i32>() }.unwrap();
        assert_eq!(func.call(42), 142);
        assert_eq!(func.call(-100), 0);
        assert_eq!(func.call(i32::MAX), i32::MIN + 99);
    }
}

#[cfg(feature = "aarch64")]
mod aapcs64 {
    use super::*;
    use crate::aarch64::{reg, Aapcs64, Register};
    use crate::common::BuildError;

    #[test]
    fn test_result_moved_into_return_register() {
        let shim = Shim::<Aapcs64>::assemble(
            OperandContract::new()
                .output(reg::W9)
                .input(reg::W0)
                .input(reg::W1),
            |b, ops| {
                b.mov(ops[0], ops[1]).add(ops[0], ops[0], ops[2]);
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(
            shim.bytes(),
            vec![
                0xe9, 0x03, 0x00, 0x2a,     // mov w9, w0
                0x29, 0x01, 0x01, 0x0b,     // add w9, w9, w1
                0xe0, 0x03, 0x09, 0x2a,     // mov w0, w9
                0xc0, 0x03, 0x5f, 0xd6,     // ret
            ]
        );
        assert_eq!(shim.register_usage().written_registers(), [reg::W0, reg::W9]);
    }

    #[test]
    fn test_scratch_clobber() {
        let shim = Shim::<Aapcs64>::assemble(
            OperandContract::new()
                .named_inout("val", reg::W0)
                .clobber(reg::W9),
            |b, ops| {
                let val = ops.named("val")?;
                b.mov_imm(reg::W9, 100)?.add(val, val, reg::W9);
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(shim.instructions().len(), 3);
        assert_eq!(shim.register_usage().written_registers(), [reg::W0, reg::W9]);
    }

    #[test]
    fn test_rejects_platform_register_clobber() {
        let result = Shim::<Aapcs64>::assemble(
            OperandContract::new().inout(reg::W0).clobber(Register::new(18)),
            |_, _| Ok(()),
        );
        assert_eq!(result.err(), Some(ShimError::CalleeSavedClobber("w18")));
    }

    #[test]
    fn test_rejects_undeclared_clobber() {
        let result = Shim::<Aapcs64>::assemble(
            OperandContract::new().named_inout("val", reg::W0),
            |b, ops| {
                let val = ops.named("val")?;
                b.mov_imm(reg::W9, 100)?.add(val, val, reg::W9);
                Ok(())
            },
        );
        assert_eq!(result.err(), Some(ShimError::UndeclaredClobber("w9")));
    }

    #[test]
    fn test_encoding_errors_become_shim_errors() {
        let result = Shim::<Aapcs64>::assemble(
            OperandContract::new().inout(reg::W0).clobber(reg::W9),
            |b, _| {
                b.mov_imm(reg::W9, 0x1_0000)?;
                Ok(())
            },
        );
        assert_eq!(
            result.err(),
            Some(ShimError::Build(BuildError::InvalidImmediate(0x1_0000)))
        );
    }
}
