use callgraph_trace::cil::{
    CallSignature, Code, FlowControl, InstructionSequence, MetadataResolver, MetadataToken,
    MethodBody, Operand, OperandType, TokenType,
};
use callgraph_trace::utils::{InstructionError, ResolveError};
use pretty_assertions::assert_eq;

/// Every call resolves to a static method taking two arguments
struct TwoArgStatics;

impl MetadataResolver for TwoArgStatics {
    fn resolve_method(&self, _token: MetadataToken) -> Result<CallSignature, ResolveError> {
        Ok(CallSignature {
            has_this: false,
            explicit_this: false,
            param_count: 2,
            has_return_value: false,
        })
    }

    fn resolve_signature(&self, token: MetadataToken) -> Result<Vec<u8>, ResolveError> {
        Err(ResolveError::WrongTable(token))
    }
}

fn listing(seq: &InstructionSequence) -> Vec<String> {
    seq.ids().iter().map(|id| seq.display(*id).to_string()).collect()
}

#[test]
fn test_opcode_table_lookups() {
    assert_eq!(Code::from_value(0x28), Some(Code::Call));
    assert_eq!(Code::from_value(0xFE06), Some(Code::Ldftn));
    assert_eq!(Code::from_value(0xFE), None);
    assert_eq!(Code::Ldftn.size(), 2);
    assert_eq!(Code::Switch.operand_type(), OperandType::InlineSwitch);
    assert_eq!(Code::Newobj.flow_control(), FlowControl::Call);
    assert!(Code::ALL.len() > 200);
    assert!(Code::ALL
        .iter()
        .all(|code| Code::from_value(code.opcode().value) == Some(*code)));
}

#[test]
fn test_tokens_split_table_and_row() {
    let token = MetadataToken::from_parts(TokenType::MemberRef, 0x12);
    assert_eq!(token.raw(), 0x0A00_0012);
    assert_eq!(token.rid(), 0x12);
    assert_eq!(token.token_type(), Some(TokenType::MemberRef));
    assert_eq!(token.to_string(), "0x0a000012");
    assert!(MetadataToken::NULL.is_null());
}

#[test]
fn test_string_operand_accepts_token_or_literal() {
    let mut seq = InstructionSequence::new();
    assert!(seq.create(Code::Ldstr, Operand::String("x".into())).is_ok());
    assert!(seq
        .create(Code::Ldstr, Operand::Token(MetadataToken::from_parts(TokenType::String, 1)))
        .is_ok());
    assert!(matches!(
        seq.create(Code::Call, Operand::String("x".into())),
        Err(InstructionError::OperandMismatch { opcode: "call", .. })
    ));
}

#[test]
fn test_instrumented_prologue_shifts_offsets_and_labels() {
    let hook = MetadataToken::from_parts(TokenType::Method, 7);

    let mut body = MethodBody::new();
    let seq = &mut body.instructions;
    let exit = seq.create(Code::Ret, Operand::None).unwrap();
    seq.push(Code::Ldarg0, Operand::None).unwrap();
    seq.push(Code::BrtrueS, Operand::Target(exit)).unwrap();
    seq.push(Code::Nop, Operand::None).unwrap();
    seq.append(exit).unwrap();

    assert_eq!(
        listing(seq),
        vec![
            "IL_0000: ldarg.0",
            "IL_0001: brtrue.s IL_0004",
            "IL_0003: nop",
            "IL_0004: ret",
        ]
    );

    // hook(handle, 0) ahead of the method body
    let handle = seq.create(Code::LdcI8, Operand::Int64(0x7F00_0001)).unwrap();
    let zero = seq.create(Code::LdcI40, Operand::None).unwrap();
    let call = seq.create(Code::Call, Operand::Token(hook)).unwrap();
    seq.insert(0, handle).unwrap();
    seq.insert(1, zero).unwrap();
    seq.insert(2, call).unwrap();

    assert_eq!(
        listing(seq),
        vec![
            "IL_0000: ldc.i8 2130706433",
            "IL_0009: ldc.i4.0",
            "IL_000a: call 0x06000007",
            "IL_000f: ldarg.0",
            "IL_0010: brtrue.s IL_0013",
            "IL_0012: nop",
            "IL_0013: ret",
        ]
    );
    assert_eq!(seq.code_size(), 0x14);

    assert_eq!(body.recalculate_max_stack_size(&TwoArgStatics).unwrap(), 2);
    assert_eq!(body.max_stack_size, 2);
}

#[test]
fn test_replace_then_remove_keeps_navigation() {
    let mut seq = InstructionSequence::new();
    let a = seq.push(Code::Nop, Operand::None).unwrap();
    let b = seq.push(Code::Nop, Operand::None).unwrap();
    let c = seq.push(Code::Ret, Operand::None).unwrap();

    let load = seq.create(Code::LdcI4S, Operand::Int8(-1)).unwrap();
    assert_eq!(seq.replace(1, load).unwrap(), b);
    assert_eq!(seq.get(a).unwrap().next(), Some(load));
    assert_eq!(seq.get(c).unwrap().previous(), Some(load));
    assert_eq!(seq.position(load), Some(1));
    assert_eq!(seq.position(b), None);

    seq.remove(1).unwrap();
    assert_eq!(seq.get(a).unwrap().next(), Some(c));
    assert_eq!(seq.first(), Some(a));
    assert_eq!(seq.last(), Some(c));
    assert_eq!(
        seq.replace(5, b),
        Err(InstructionError::OutOfRange { index: 5, len: 2 })
    );
}
