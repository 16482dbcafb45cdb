//! CIL opcode table.
//!
//! Every ECMA-335 opcode with the attributes the rest of the crate needs:
//! mnemonic, encoded value, operand type, flow control and the intrinsic
//! stack behaviour (what it pops and what it pushes).
//!
//! Two-byte opcodes carry the `0xFE` prefix in the high byte of `value`.

use crate::utils::config::TWO_BYTE_OPCODE_PREFIX;
use std::fmt;

/// Kind of inline operand an opcode carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandType {
    InlineNone,
    ShortInlineI,
    ShortInlineVar,
    ShortInlineArg,
    ShortInlineR,
    ShortInlineBrTarget,
    InlineVar,
    InlineArg,
    InlineI,
    InlineI8,
    InlineR,
    InlineBrTarget,
    InlineSwitch,
    InlineString,
    InlineField,
    InlineMethod,
    InlineType,
    InlineTok,
    InlineSig,
}

impl OperandType {
    /// Encoded operand bytes that do not depend on the operand value.
    ///
    /// `InlineSwitch` returns only the count prefix; the target table
    /// adds four bytes per target.
    pub fn fixed_size(self) -> usize {
        match self {
            OperandType::InlineNone => 0,
            OperandType::ShortInlineI
            | OperandType::ShortInlineVar
            | OperandType::ShortInlineArg
            | OperandType::ShortInlineBrTarget => 1,
            OperandType::InlineVar | OperandType::InlineArg => 2,
            OperandType::InlineI
            | OperandType::ShortInlineR
            | OperandType::InlineBrTarget
            | OperandType::InlineSwitch
            | OperandType::InlineString
            | OperandType::InlineField
            | OperandType::InlineMethod
            | OperandType::InlineType
            | OperandType::InlineTok
            | OperandType::InlineSig => 4,
            OperandType::InlineI8 | OperandType::InlineR => 8,
        }
    }

    /// Whether the operand is a metadata token
    pub fn is_token(self) -> bool {
        matches!(
            self,
            OperandType::InlineString
                | OperandType::InlineField
                | OperandType::InlineMethod
                | OperandType::InlineType
                | OperandType::InlineTok
                | OperandType::InlineSig
        )
    }

    /// Whether the operand references one or more branch targets
    pub fn is_branch_target(self) -> bool {
        matches!(
            self,
            OperandType::ShortInlineBrTarget | OperandType::InlineBrTarget | OperandType::InlineSwitch
        )
    }
}

/// How an opcode affects control flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowControl {
    Next,
    Branch,
    CondBranch,
    Call,
    Return,
    Throw,
    Break,
    Meta,
}

impl FlowControl {
    /// Nothing flows past this opcode on the fall-through path
    pub fn is_terminator(self) -> bool {
        matches!(
            self,
            FlowControl::Branch | FlowControl::Break | FlowControl::Throw | FlowControl::Return
        )
    }
}

/// Values an opcode pops, named after the value kinds involved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackPop {
    Pop0,
    Pop1,
    Pop1Pop1,
    PopI,
    PopIPop1,
    PopIPopI,
    PopIPopI8,
    PopIPopIPopI,
    PopIPopR4,
    PopIPopR8,
    PopRef,
    PopRefPop1,
    PopRefPopI,
    PopRefPopIPopI,
    PopRefPopIPopI8,
    PopRefPopIPopR4,
    PopRefPopIPopR8,
    PopRefPopIPopRef,
    PopAll,
    VarPop,
}

/// Values an opcode pushes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackPush {
    Push0,
    Push1,
    Push1Push1,
    PushI,
    PushI8,
    PushR4,
    PushR8,
    PushRef,
    VarPush,
}

/// Static description of one opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpCode {
    pub code: Code,
    pub name: &'static str,
    pub value: u16,
    pub operand_type: OperandType,
    pub flow_control: FlowControl,
    pub pop: StackPop,
    pub push: StackPush,
}

impl OpCode {
    /// Encoded size of the opcode itself (1 or 2 bytes)
    pub fn size(&self) -> usize {
        if (self.value >> 8) as u8 == TWO_BYTE_OPCODE_PREFIX {
            2
        } else {
            1
        }
    }
}

macro_rules! opcodes {
    ($($variant:ident => $value:literal, $name:literal, $operand:ident, $flow:ident, $pop:ident, $push:ident;)*) => {
        /// Opcode identity
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Code {
            $($variant,)*
        }

        impl Code {
            /// Every opcode, in encoding order
            pub const ALL: &'static [Code] = &[$(Code::$variant,)*];

            /// Full static description of this opcode
            pub const fn opcode(self) -> OpCode {
                match self {
                    $(Code::$variant => OpCode {
                        code: Code::$variant,
                        name: $name,
                        value: $value,
                        operand_type: OperandType::$operand,
                        flow_control: FlowControl::$flow,
                        pop: StackPop::$pop,
                        push: StackPush::$push,
                    },)*
                }
            }

            /// Decode an encoded opcode value (`0xFExx` for two-byte opcodes)
            pub fn from_value(value: u16) -> Option<Code> {
                match value {
                    $($value => Some(Code::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

opcodes! {
    Nop => 0x00, "nop", InlineNone, Next, Pop0, Push0;
    Break => 0x01, "break", InlineNone, Break, Pop0, Push0;
    Ldarg0 => 0x02, "ldarg.0", InlineNone, Next, Pop0, Push1;
    Ldarg1 => 0x03, "ldarg.1", InlineNone, Next, Pop0, Push1;
    Ldarg2 => 0x04, "ldarg.2", InlineNone, Next, Pop0, Push1;
    Ldarg3 => 0x05, "ldarg.3", InlineNone, Next, Pop0, Push1;
    Ldloc0 => 0x06, "ldloc.0", InlineNone, Next, Pop0, Push1;
    Ldloc1 => 0x07, "ldloc.1", InlineNone, Next, Pop0, Push1;
    Ldloc2 => 0x08, "ldloc.2", InlineNone, Next, Pop0, Push1;
    Ldloc3 => 0x09, "ldloc.3", InlineNone, Next, Pop0, Push1;
    Stloc0 => 0x0A, "stloc.0", InlineNone, Next, Pop1, Push0;
    Stloc1 => 0x0B, "stloc.1", InlineNone, Next, Pop1, Push0;
    Stloc2 => 0x0C, "stloc.2", InlineNone, Next, Pop1, Push0;
    Stloc3 => 0x0D, "stloc.3", InlineNone, Next, Pop1, Push0;
    LdargS => 0x0E, "ldarg.s", ShortInlineArg, Next, Pop0, Push1;
    LdargaS => 0x0F, "ldarga.s", ShortInlineArg, Next, Pop0, PushI;
    StargS => 0x10, "starg.s", ShortInlineArg, Next, Pop1, Push0;
    LdlocS => 0x11, "ldloc.s", ShortInlineVar, Next, Pop0, Push1;
    LdlocaS => 0x12, "ldloca.s", ShortInlineVar, Next, Pop0, PushI;
    StlocS => 0x13, "stloc.s", ShortInlineVar, Next, Pop1, Push0;
    Ldnull => 0x14, "ldnull", InlineNone, Next, Pop0, PushRef;
    LdcI4M1 => 0x15, "ldc.i4.m1", InlineNone, Next, Pop0, PushI;
    LdcI40 => 0x16, "ldc.i4.0", InlineNone, Next, Pop0, PushI;
    LdcI41 => 0x17, "ldc.i4.1", InlineNone, Next, Pop0, PushI;
    LdcI42 => 0x18, "ldc.i4.2", InlineNone, Next, Pop0, PushI;
    LdcI43 => 0x19, "ldc.i4.3", InlineNone, Next, Pop0, PushI;
    LdcI44 => 0x1A, "ldc.i4.4", InlineNone, Next, Pop0, PushI;
    LdcI45 => 0x1B, "ldc.i4.5", InlineNone, Next, Pop0, PushI;
    LdcI46 => 0x1C, "ldc.i4.6", InlineNone, Next, Pop0, PushI;
    LdcI47 => 0x1D, "ldc.i4.7", InlineNone, Next, Pop0, PushI;
    LdcI48 => 0x1E, "ldc.i4.8", InlineNone, Next, Pop0, PushI;
    LdcI4S => 0x1F, "ldc.i4.s", ShortInlineI, Next, Pop0, PushI;
    LdcI4 => 0x20, "ldc.i4", InlineI, Next, Pop0, PushI;
    LdcI8 => 0x21, "ldc.i8", InlineI8, Next, Pop0, PushI8;
    LdcR4 => 0x22, "ldc.r4", ShortInlineR, Next, Pop0, PushR4;
    LdcR8 => 0x23, "ldc.r8", InlineR, Next, Pop0, PushR8;
    Dup => 0x25, "dup", InlineNone, Next, Pop1, Push1Push1;
    Pop => 0x26, "pop", InlineNone, Next, Pop1, Push0;
    Jmp => 0x27, "jmp", InlineMethod, Call, Pop0, Push0;
    Call => 0x28, "call", InlineMethod, Call, VarPop, VarPush;
    Calli => 0x29, "calli", InlineSig, Call, VarPop, VarPush;
    Ret => 0x2A, "ret", InlineNone, Return, VarPop, Push0;
    BrS => 0x2B, "br.s", ShortInlineBrTarget, Branch, Pop0, Push0;
    BrfalseS => 0x2C, "brfalse.s", ShortInlineBrTarget, CondBranch, PopI, Push0;
    BrtrueS => 0x2D, "brtrue.s", ShortInlineBrTarget, CondBranch, PopI, Push0;
    BeqS => 0x2E, "beq.s", ShortInlineBrTarget, CondBranch, Pop1Pop1, Push0;
    BgeS => 0x2F, "bge.s", ShortInlineBrTarget, CondBranch, Pop1Pop1, Push0;
    BgtS => 0x30, "bgt.s", ShortInlineBrTarget, CondBranch, Pop1Pop1, Push0;
    BleS => 0x31, "ble.s", ShortInlineBrTarget, CondBranch, Pop1Pop1, Push0;
    BltS => 0x32, "blt.s", ShortInlineBrTarget, CondBranch, Pop1Pop1, Push0;
    BneUnS => 0x33, "bne.un.s", ShortInlineBrTarget, CondBranch, Pop1Pop1, Push0;
    BgeUnS => 0x34, "bge.un.s", ShortInlineBrTarget, CondBranch, Pop1Pop1, Push0;
    BgtUnS => 0x35, "bgt.un.s", ShortInlineBrTarget, CondBranch, Pop1Pop1, Push0;
    BleUnS => 0x36, "ble.un.s", ShortInlineBrTarget, CondBranch, Pop1Pop1, Push0;
    BltUnS => 0x37, "blt.un.s", ShortInlineBrTarget, CondBranch, Pop1Pop1, Push0;
    Br => 0x38, "br", InlineBrTarget, Branch, Pop0, Push0;
    Brfalse => 0x39, "brfalse", InlineBrTarget, CondBranch, PopI, Push0;
    Brtrue => 0x3A, "brtrue", InlineBrTarget, CondBranch, PopI, Push0;
    Beq => 0x3B, "beq", InlineBrTarget, CondBranch, Pop1Pop1, Push0;
    Bge => 0x3C, "bge", InlineBrTarget, CondBranch, Pop1Pop1, Push0;
    Bgt => 0x3D, "bgt", InlineBrTarget, CondBranch, Pop1Pop1, Push0;
    Ble => 0x3E, "ble", InlineBrTarget, CondBranch, Pop1Pop1, Push0;
    Blt => 0x3F, "blt", InlineBrTarget, CondBranch, Pop1Pop1, Push0;
    BneUn => 0x40, "bne.un", InlineBrTarget, CondBranch, Pop1Pop1, Push0;
    BgeUn => 0x41, "bge.un", InlineBrTarget, CondBranch, Pop1Pop1, Push0;
    BgtUn => 0x42, "bgt.un", InlineBrTarget, CondBranch, Pop1Pop1, Push0;
    BleUn => 0x43, "ble.un", InlineBrTarget, CondBranch, Pop1Pop1, Push0;
    BltUn => 0x44, "blt.un", InlineBrTarget, CondBranch, Pop1Pop1, Push0;
    Switch => 0x45, "switch", InlineSwitch, CondBranch, PopI, Push0;
    LdindI1 => 0x46, "ldind.i1", InlineNone, Next, PopI, PushI;
    LdindU1 => 0x47, "ldind.u1", InlineNone, Next, PopI, PushI;
    LdindI2 => 0x48, "ldind.i2", InlineNone, Next, PopI, PushI;
    LdindU2 => 0x49, "ldind.u2", InlineNone, Next, PopI, PushI;
    LdindI4 => 0x4A, "ldind.i4", InlineNone, Next, PopI, PushI;
    LdindU4 => 0x4B, "ldind.u4", InlineNone, Next, PopI, PushI;
    LdindI8 => 0x4C, "ldind.i8", InlineNone, Next, PopI, PushI8;
    LdindI => 0x4D, "ldind.i", InlineNone, Next, PopI, PushI;
    LdindR4 => 0x4E, "ldind.r4", InlineNone, Next, PopI, PushR4;
    LdindR8 => 0x4F, "ldind.r8", InlineNone, Next, PopI, PushR8;
    LdindRef => 0x50, "ldind.ref", InlineNone, Next, PopI, PushRef;
    StindRef => 0x51, "stind.ref", InlineNone, Next, PopIPopI, Push0;
    StindI1 => 0x52, "stind.i1", InlineNone, Next, PopIPopI, Push0;
    StindI2 => 0x53, "stind.i2", InlineNone, Next, PopIPopI, Push0;
    StindI4 => 0x54, "stind.i4", InlineNone, Next, PopIPopI, Push0;
    StindI8 => 0x55, "stind.i8", InlineNone, Next, PopIPopI8, Push0;
    StindR4 => 0x56, "stind.r4", InlineNone, Next, PopIPopR4, Push0;
    StindR8 => 0x57, "stind.r8", InlineNone, Next, PopIPopR8, Push0;
    Add => 0x58, "add", InlineNone, Next, Pop1Pop1, Push1;
    Sub => 0x59, "sub", InlineNone, Next, Pop1Pop1, Push1;
    Mul => 0x5A, "mul", InlineNone, Next, Pop1Pop1, Push1;
    Div => 0x5B, "div", InlineNone, Next, Pop1Pop1, Push1;
    DivUn => 0x5C, "div.un", InlineNone, Next, Pop1Pop1, Push1;
    Rem => 0x5D, "rem", InlineNone, Next, Pop1Pop1, Push1;
    RemUn => 0x5E, "rem.un", InlineNone, Next, Pop1Pop1, Push1;
    And => 0x5F, "and", InlineNone, Next, Pop1Pop1, Push1;
    Or => 0x60, "or", InlineNone, Next, Pop1Pop1, Push1;
    Xor => 0x61, "xor", InlineNone, Next, Pop1Pop1, Push1;
    Shl => 0x62, "shl", InlineNone, Next, Pop1Pop1, Push1;
    Shr => 0x63, "shr", InlineNone, Next, Pop1Pop1, Push1;
    ShrUn => 0x64, "shr.un", InlineNone, Next, Pop1Pop1, Push1;
    Neg => 0x65, "neg", InlineNone, Next, Pop1, Push1;
    Not => 0x66, "not", InlineNone, Next, Pop1, Push1;
    ConvI1 => 0x67, "conv.i1", InlineNone, Next, Pop1, PushI;
    ConvI2 => 0x68, "conv.i2", InlineNone, Next, Pop1, PushI;
    ConvI4 => 0x69, "conv.i4", InlineNone, Next, Pop1, PushI;
    ConvI8 => 0x6A, "conv.i8", InlineNone, Next, Pop1, PushI8;
    ConvR4 => 0x6B, "conv.r4", InlineNone, Next, Pop1, PushR4;
    ConvR8 => 0x6C, "conv.r8", InlineNone, Next, Pop1, PushR8;
    ConvU4 => 0x6D, "conv.u4", InlineNone, Next, Pop1, PushI;
    ConvU8 => 0x6E, "conv.u8", InlineNone, Next, Pop1, PushI8;
    Callvirt => 0x6F, "callvirt", InlineMethod, Call, VarPop, VarPush;
    Cpobj => 0x70, "cpobj", InlineType, Next, PopIPopI, Push0;
    Ldobj => 0x71, "ldobj", InlineType, Next, PopI, Push1;
    Ldstr => 0x72, "ldstr", InlineString, Next, Pop0, PushRef;
    Newobj => 0x73, "newobj", InlineMethod, Call, VarPop, PushRef;
    Castclass => 0x74, "castclass", InlineType, Next, PopRef, PushRef;
    Isinst => 0x75, "isinst", InlineType, Next, PopRef, PushI;
    ConvRUn => 0x76, "conv.r.un", InlineNone, Next, Pop1, PushR8;
    Unbox => 0x79, "unbox", InlineType, Next, PopRef, PushI;
    Throw => 0x7A, "throw", InlineNone, Throw, PopRef, Push0;
    Ldfld => 0x7B, "ldfld", InlineField, Next, PopRef, Push1;
    Ldflda => 0x7C, "ldflda", InlineField, Next, PopRef, PushI;
    Stfld => 0x7D, "stfld", InlineField, Next, PopRefPop1, Push0;
    Ldsfld => 0x7E, "ldsfld", InlineField, Next, Pop0, Push1;
    Ldsflda => 0x7F, "ldsflda", InlineField, Next, Pop0, PushI;
    Stsfld => 0x80, "stsfld", InlineField, Next, Pop1, Push0;
    Stobj => 0x81, "stobj", InlineType, Next, PopIPop1, Push0;
    ConvOvfI1Un => 0x82, "conv.ovf.i1.un", InlineNone, Next, Pop1, PushI;
    ConvOvfI2Un => 0x83, "conv.ovf.i2.un", InlineNone, Next, Pop1, PushI;
    ConvOvfI4Un => 0x84, "conv.ovf.i4.un", InlineNone, Next, Pop1, PushI;
    ConvOvfI8Un => 0x85, "conv.ovf.i8.un", InlineNone, Next, Pop1, PushI8;
    ConvOvfU1Un => 0x86, "conv.ovf.u1.un", InlineNone, Next, Pop1, PushI;
    ConvOvfU2Un => 0x87, "conv.ovf.u2.un", InlineNone, Next, Pop1, PushI;
    ConvOvfU4Un => 0x88, "conv.ovf.u4.un", InlineNone, Next, Pop1, PushI;
    ConvOvfU8Un => 0x89, "conv.ovf.u8.un", InlineNone, Next, Pop1, PushI8;
    ConvOvfIUn => 0x8A, "conv.ovf.i.un", InlineNone, Next, Pop1, PushI;
    ConvOvfUUn => 0x8B, "conv.ovf.u.un", InlineNone, Next, Pop1, PushI;
    Box => 0x8C, "box", InlineType, Next, Pop1, PushRef;
    Newarr => 0x8D, "newarr", InlineType, Next, PopI, PushRef;
    Ldlen => 0x8E, "ldlen", InlineNone, Next, PopRef, PushI;
    Ldelema => 0x8F, "ldelema", InlineType, Next, PopRefPopI, PushI;
    LdelemI1 => 0x90, "ldelem.i1", InlineNone, Next, PopRefPopI, PushI;
    LdelemU1 => 0x91, "ldelem.u1", InlineNone, Next, PopRefPopI, PushI;
    LdelemI2 => 0x92, "ldelem.i2", InlineNone, Next, PopRefPopI, PushI;
    LdelemU2 => 0x93, "ldelem.u2", InlineNone, Next, PopRefPopI, PushI;
    LdelemI4 => 0x94, "ldelem.i4", InlineNone, Next, PopRefPopI, PushI;
    LdelemU4 => 0x95, "ldelem.u4", InlineNone, Next, PopRefPopI, PushI;
    LdelemI8 => 0x96, "ldelem.i8", InlineNone, Next, PopRefPopI, PushI8;
    LdelemI => 0x97, "ldelem.i", InlineNone, Next, PopRefPopI, PushI;
    LdelemR4 => 0x98, "ldelem.r4", InlineNone, Next, PopRefPopI, PushR4;
    LdelemR8 => 0x99, "ldelem.r8", InlineNone, Next, PopRefPopI, PushR8;
    LdelemRef => 0x9A, "ldelem.ref", InlineNone, Next, PopRefPopI, PushRef;
    StelemI => 0x9B, "stelem.i", InlineNone, Next, PopRefPopIPopI, Push0;
    StelemI1 => 0x9C, "stelem.i1", InlineNone, Next, PopRefPopIPopI, Push0;
    StelemI2 => 0x9D, "stelem.i2", InlineNone, Next, PopRefPopIPopI, Push0;
    StelemI4 => 0x9E, "stelem.i4", InlineNone, Next, PopRefPopIPopI, Push0;
    StelemI8 => 0x9F, "stelem.i8", InlineNone, Next, PopRefPopIPopI8, Push0;
    StelemR4 => 0xA0, "stelem.r4", InlineNone, Next, PopRefPopIPopR4, Push0;
    StelemR8 => 0xA1, "stelem.r8", InlineNone, Next, PopRefPopIPopR8, Push0;
    StelemRef => 0xA2, "stelem.ref", InlineNone, Next, PopRefPopIPopRef, Push0;
    LdelemAny => 0xA3, "ldelem.any", InlineType, Next, PopRefPopI, Push1;
    StelemAny => 0xA4, "stelem.any", InlineType, Next, PopRefPopIPopRef, Push0;
    UnboxAny => 0xA5, "unbox.any", InlineType, Next, PopRef, Push1;
    ConvOvfI1 => 0xB3, "conv.ovf.i1", InlineNone, Next, Pop1, PushI;
    ConvOvfU1 => 0xB4, "conv.ovf.u1", InlineNone, Next, Pop1, PushI;
    ConvOvfI2 => 0xB5, "conv.ovf.i2", InlineNone, Next, Pop1, PushI;
    ConvOvfU2 => 0xB6, "conv.ovf.u2", InlineNone, Next, Pop1, PushI;
    ConvOvfI4 => 0xB7, "conv.ovf.i4", InlineNone, Next, Pop1, PushI;
    ConvOvfU4 => 0xB8, "conv.ovf.u4", InlineNone, Next, Pop1, PushI;
    ConvOvfI8 => 0xB9, "conv.ovf.i8", InlineNone, Next, Pop1, PushI8;
    ConvOvfU8 => 0xBA, "conv.ovf.u8", InlineNone, Next, Pop1, PushI8;
    Refanyval => 0xC2, "refanyval", InlineType, Next, Pop1, PushI;
    Ckfinite => 0xC3, "ckfinite", InlineNone, Next, Pop1, PushR8;
    Mkrefany => 0xC6, "mkrefany", InlineType, Next, PopI, Push1;
    Ldtoken => 0xD0, "ldtoken", InlineTok, Next, Pop0, PushI;
    ConvU2 => 0xD1, "conv.u2", InlineNone, Next, Pop1, PushI;
    ConvU1 => 0xD2, "conv.u1", InlineNone, Next, Pop1, PushI;
    ConvI => 0xD3, "conv.i", InlineNone, Next, Pop1, PushI;
    ConvOvfI => 0xD4, "conv.ovf.i", InlineNone, Next, Pop1, PushI;
    ConvOvfU => 0xD5, "conv.ovf.u", InlineNone, Next, Pop1, PushI;
    AddOvf => 0xD6, "add.ovf", InlineNone, Next, Pop1Pop1, Push1;
    AddOvfUn => 0xD7, "add.ovf.un", InlineNone, Next, Pop1Pop1, Push1;
    MulOvf => 0xD8, "mul.ovf", InlineNone, Next, Pop1Pop1, Push1;
    MulOvfUn => 0xD9, "mul.ovf.un", InlineNone, Next, Pop1Pop1, Push1;
    SubOvf => 0xDA, "sub.ovf", InlineNone, Next, Pop1Pop1, Push1;
    SubOvfUn => 0xDB, "sub.ovf.un", InlineNone, Next, Pop1Pop1, Push1;
    Endfinally => 0xDC, "endfinally", InlineNone, Return, Pop0, Push0;
    Leave => 0xDD, "leave", InlineBrTarget, Branch, PopAll, Push0;
    LeaveS => 0xDE, "leave.s", ShortInlineBrTarget, Branch, PopAll, Push0;
    StindI => 0xDF, "stind.i", InlineNone, Next, PopIPopI, Push0;
    ConvU => 0xE0, "conv.u", InlineNone, Next, Pop1, PushI;
    Arglist => 0xFE00, "arglist", InlineNone, Next, Pop0, PushI;
    Ceq => 0xFE01, "ceq", InlineNone, Next, Pop1Pop1, PushI;
    Cgt => 0xFE02, "cgt", InlineNone, Next, Pop1Pop1, PushI;
    CgtUn => 0xFE03, "cgt.un", InlineNone, Next, Pop1Pop1, PushI;
    Clt => 0xFE04, "clt", InlineNone, Next, Pop1Pop1, PushI;
    CltUn => 0xFE05, "clt.un", InlineNone, Next, Pop1Pop1, PushI;
    Ldftn => 0xFE06, "ldftn", InlineMethod, Next, Pop0, PushI;
    Ldvirtftn => 0xFE07, "ldvirtftn", InlineMethod, Next, PopRef, PushI;
    Ldarg => 0xFE09, "ldarg", InlineArg, Next, Pop0, Push1;
    Ldarga => 0xFE0A, "ldarga", InlineArg, Next, Pop0, PushI;
    Starg => 0xFE0B, "starg", InlineArg, Next, Pop1, Push0;
    Ldloc => 0xFE0C, "ldloc", InlineVar, Next, Pop0, Push1;
    Ldloca => 0xFE0D, "ldloca", InlineVar, Next, Pop0, PushI;
    Stloc => 0xFE0E, "stloc", InlineVar, Next, Pop1, Push0;
    Localloc => 0xFE0F, "localloc", InlineNone, Next, PopI, PushI;
    Endfilter => 0xFE11, "endfilter", InlineNone, Return, PopI, Push0;
    Unaligned => 0xFE12, "unaligned.", ShortInlineI, Meta, Pop0, Push0;
    Volatile => 0xFE13, "volatile.", InlineNone, Meta, Pop0, Push0;
    Tail => 0xFE14, "tail.", InlineNone, Meta, Pop0, Push0;
    Initobj => 0xFE15, "initobj", InlineType, Next, PopI, Push0;
    Constrained => 0xFE16, "constrained.", InlineType, Meta, Pop0, Push0;
    Cpblk => 0xFE17, "cpblk", InlineNone, Next, PopIPopIPopI, Push0;
    Initblk => 0xFE18, "initblk", InlineNone, Next, PopIPopIPopI, Push0;
    No => 0xFE19, "no.", ShortInlineI, Meta, Pop0, Push0;
    Rethrow => 0xFE1A, "rethrow", InlineNone, Throw, Pop0, Push0;
    Sizeof => 0xFE1C, "sizeof", InlineType, Next, Pop0, PushI;
    Refanytype => 0xFE1D, "refanytype", InlineNone, Next, Pop1, PushI;
    Readonly => 0xFE1E, "readonly.", InlineNone, Meta, Pop0, Push0;
}

impl Code {
    pub fn name(self) -> &'static str {
        self.opcode().name
    }

    pub fn operand_type(self) -> OperandType {
        self.opcode().operand_type
    }

    pub fn flow_control(self) -> FlowControl {
        self.opcode().flow_control
    }

    /// Encoded size of the opcode bytes, without the operand
    pub fn size(self) -> usize {
        self.opcode().size()
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
