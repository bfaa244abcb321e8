//! A narrow disassembly shim over `iced-x86`.
//!
//! Per the design's disassembler-coupling note (§9): the resolver only needs
//! to iterate instructions in address order and read a mnemonic plus
//! per-operand `{kind, register, immediate}`. This module is the only place
//! that names an `iced_x86` type, so swapping decoders later touches one file.

use iced_x86::{Decoder, DecoderOptions, Instruction, Mnemonic, OpKind, Register};

/// The handful of mnemonics the resolver's register-tracking cares about;
/// everything else collapses to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedMnemonic {
    /// `mov`.
    Mov,
    /// `xor`.
    Xor,
    /// `syscall`.
    Syscall,
    /// Any other instruction.
    Other,
}

/// The register class relevant to `last_rax` tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegClass {
    /// `RAX`.
    Rax,
    /// `EAX`.
    Eax,
    /// Any other register.
    Other,
}

/// A decoded operand, reduced to the minimal surface the resolver needs.
#[derive(Debug, Clone, Copy)]
pub enum Operand {
    /// A register operand.
    Register(RegClass),
    /// An immediate operand.
    Immediate(i64),
    /// A memory operand.
    Memory,
}

/// One decoded instruction.
#[derive(Debug, Clone)]
pub struct DecodedInsn {
    /// Virtual address of this instruction.
    pub address: u64,
    /// Mnemonic, reduced to the variants the resolver matches on.
    pub mnemonic: DecodedMnemonic,
    /// Operands in encoding order.
    pub operands: Vec<Operand>,
}

fn reg_class(reg: Register) -> RegClass {
    match reg {
        Register::RAX => RegClass::Rax,
        Register::EAX => RegClass::Eax,
        _ => RegClass::Other,
    }
}

fn operand(instr: &Instruction, index: u32) -> Operand {
    match instr.op_kind(index) {
        OpKind::Register => Operand::Register(reg_class(instr.op_register(index))),
        OpKind::Immediate8
        | OpKind::Immediate16
        | OpKind::Immediate32
        | OpKind::Immediate64
        | OpKind::Immediate8to16
        | OpKind::Immediate8to32
        | OpKind::Immediate8to64
        | OpKind::Immediate32to64 => {
            #[expect(clippy::cast_possible_wrap, reason = "syscall-number immediates fit in i64")]
            let value = instr.immediate(index) as i64;
            Operand::Immediate(value)
        }
        _ => Operand::Memory,
    }
}

/// Decodes `code` as a linear sweep of x86-64 instructions starting at virtual
/// address `ip`, stopping when the decoder runs out of bytes or can no longer
/// make progress.
#[must_use]
pub fn decode(code: &[u8], ip: u64) -> Vec<DecodedInsn> {
    let mut decoder = Decoder::with_ip(64, code, ip, DecoderOptions::NONE);
    let mut instr = Instruction::default();
    let mut out = Vec::new();

    while decoder.can_decode() {
        decoder.decode_out(&mut instr);
        if instr.is_invalid() {
            break;
        }

        let mnemonic = match instr.mnemonic() {
            Mnemonic::Mov => DecodedMnemonic::Mov,
            Mnemonic::Xor => DecodedMnemonic::Xor,
            Mnemonic::Syscall => DecodedMnemonic::Syscall,
            _ => DecodedMnemonic::Other,
        };

        let operands = (0..instr.op_count())
            .map(|i| operand(&instr, i))
            .collect();

        out.push(DecodedInsn {
            address: instr.ip(),
            mnemonic,
            operands,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_mov_eax_immediate_then_syscall() {
        // mov eax, 0x27 ; syscall
        let code: &[u8] = &[0xB8, 0x27, 0x00, 0x00, 0x00, 0x0F, 0x05];
        let insns = decode(code, 0x1000);
        assert_eq!(insns.len(), 2);
        assert_eq!(insns[0].mnemonic, DecodedMnemonic::Mov);
        assert!(matches!(insns[0].operands[0], Operand::Register(RegClass::Eax)));
        assert!(matches!(insns[0].operands[1], Operand::Immediate(0x27)));
        assert_eq!(insns[1].mnemonic, DecodedMnemonic::Syscall);
        assert_eq!(insns[1].address, 0x1005);
    }

    #[test]
    fn decodes_xor_eax_eax() {
        // xor eax, eax
        let code: &[u8] = &[0x31, 0xC0];
        let insns = decode(code, 0);
        assert_eq!(insns.len(), 1);
        assert_eq!(insns[0].mnemonic, DecodedMnemonic::Xor);
        assert!(matches!(insns[0].operands[0], Operand::Register(RegClass::Eax)));
        assert!(matches!(insns[0].operands[1], Operand::Register(RegClass::Eax)));
    }

    #[test]
    fn stops_on_invalid_bytes() {
        let code: &[u8] = &[0x0F, 0x05, 0xFF];
        let insns = decode(code, 0);
        assert_eq!(insns[0].mnemonic, DecodedMnemonic::Syscall);
    }
}
