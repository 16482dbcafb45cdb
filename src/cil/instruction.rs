//! Instructions and the arena-backed instruction sequence of one method body.
//!
//! Instructions live in a contiguous arena and are addressed by
//! [`InstructionId`]. The sequence order and the previous/next links are
//! kept as ids, so branch operands stay valid across reordering and removal.
//!
//! An instruction is created unlinked through [`InstructionSequence::create`],
//! which validates its operand, and is then linked with `append`, `insert`
//! or `replace`. Offsets are derived from the linked order and recomputed
//! after every edit.

use super::opcode::{Code, OpCode, OperandType};
use super::token::MetadataToken;
use crate::utils::error::InstructionError;
use std::fmt;

/// Handle to an instruction in its sequence's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstructionId(usize);

impl InstructionId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for InstructionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Inline operand of an instruction
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    None,
    /// `ldc.i4.s` immediate
    Int8(i8),
    /// Short local/argument index, `unaligned.` and `no.` immediates
    UInt8(u8),
    /// Local/argument index
    UInt16(u16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    String(String),
    Token(MetadataToken),
    Target(InstructionId),
    Switch(Vec<InstructionId>),
}

impl Operand {
    /// Short name of the operand variant, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Operand::None => "none",
            Operand::Int8(_) => "int8",
            Operand::UInt8(_) => "uint8",
            Operand::UInt16(_) => "uint16",
            Operand::Int32(_) => "int32",
            Operand::Int64(_) => "int64",
            Operand::Float32(_) => "float32",
            Operand::Float64(_) => "float64",
            Operand::String(_) => "string",
            Operand::Token(_) => "token",
            Operand::Target(_) => "branch target",
            Operand::Switch(_) => "switch table",
        }
    }
}

/// One instruction of a method body
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    offset: usize,
    code: Code,
    operand: Operand,
    previous: Option<InstructionId>,
    next: Option<InstructionId>,
    linked: bool,
}

impl Instruction {
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn opcode(&self) -> OpCode {
        self.code.opcode()
    }

    pub fn operand(&self) -> &Operand {
        &self.operand
    }

    pub fn previous(&self) -> Option<InstructionId> {
        self.previous
    }

    pub fn next(&self) -> Option<InstructionId> {
        self.next
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// Metadata token operand, if the instruction carries one
    pub fn token(&self) -> Option<MetadataToken> {
        match self.operand {
            Operand::Token(token) => Some(token),
            _ => None,
        }
    }

    /// Branch targets named by the operand (empty for non-branches)
    pub fn branch_targets(&self) -> &[InstructionId] {
        match &self.operand {
            Operand::Target(target) => std::slice::from_ref(target),
            Operand::Switch(targets) => targets,
            _ => &[],
        }
    }

    /// Encoded size in bytes: opcode plus operand
    pub fn size(&self) -> usize {
        let opcode = self.code.opcode();
        let operand_size = match (&self.operand, opcode.operand_type) {
            (Operand::Switch(targets), OperandType::InlineSwitch) => (targets.len() + 1) * 4,
            (_, operand_type) => operand_type.fixed_size(),
        };
        opcode.size() + operand_size
    }
}

/// Check that `operand` fits the operand type declared by `code`
fn validate_operand(code: Code, operand: &Operand) -> Result<(), InstructionError> {
    let opcode = code.opcode();
    let matches = match (operand, opcode.operand_type) {
        (Operand::None, OperandType::InlineNone) => true,
        (Operand::None, _) => return Err(InstructionError::MissingOperand(opcode.name)),
        (Operand::Int8(_), OperandType::ShortInlineI) => code == Code::LdcI4S,
        (Operand::UInt8(_), OperandType::ShortInlineI) => code != Code::LdcI4S,
        (Operand::UInt8(_), OperandType::ShortInlineVar | OperandType::ShortInlineArg) => true,
        (Operand::UInt16(_), OperandType::InlineVar | OperandType::InlineArg) => true,
        (Operand::Int32(_), OperandType::InlineI) => true,
        (Operand::Int64(_), OperandType::InlineI8) => true,
        (Operand::Float32(_), OperandType::ShortInlineR) => true,
        (Operand::Float64(_), OperandType::InlineR) => true,
        (Operand::String(_), OperandType::InlineString) => true,
        (Operand::Token(token), operand_type) if operand_type.is_token() => {
            if token.is_null() {
                return Err(InstructionError::NullToken(opcode.name));
            }
            true
        }
        (Operand::Target(_), OperandType::ShortInlineBrTarget | OperandType::InlineBrTarget) => {
            true
        }
        (Operand::Switch(_), OperandType::InlineSwitch) => true,
        _ => false,
    };

    if matches {
        Ok(())
    } else {
        Err(InstructionError::OperandMismatch {
            opcode: opcode.name,
            expected: opcode.operand_type,
            found: operand.kind(),
        })
    }
}

/// Ordered, doubly linked instructions of one method body
#[derive(Debug, Clone, Default)]
pub struct InstructionSequence {
    arena: Vec<Instruction>,
    order: Vec<InstructionId>,
}

impl InstructionSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unlinked instruction after validating its operand.
    ///
    /// Branch targets must already exist in this sequence's arena; they do
    /// not need to be linked yet.
    ///
    /// # Errors
    /// * `InstructionError::MissingOperand` - opcode needs an operand, got none
    /// * `InstructionError::OperandMismatch` - operand variant does not fit the opcode
    /// * `InstructionError::NullToken` - token operand is the null token
    /// * `InstructionError::UnknownTarget` - branch target not allocated here
    pub fn create(&mut self, code: Code, operand: Operand) -> Result<InstructionId, InstructionError> {
        validate_operand(code, &operand)?;

        let targets: &[InstructionId] = match &operand {
            Operand::Target(target) => std::slice::from_ref(target),
            Operand::Switch(targets) => targets,
            _ => &[],
        };
        if let Some(unknown) = targets.iter().find(|t| t.0 >= self.arena.len()) {
            return Err(InstructionError::UnknownTarget(*unknown));
        }

        let id = InstructionId(self.arena.len());
        self.arena.push(Instruction {
            offset: 0,
            code,
            operand,
            previous: None,
            next: None,
            linked: false,
        });
        Ok(id)
    }

    /// Create an instruction and append it in one step
    pub fn push(&mut self, code: Code, operand: Operand) -> Result<InstructionId, InstructionError> {
        let id = self.create(code, operand)?;
        self.append(id)?;
        Ok(id)
    }

    /// Link an unlinked instruction at the end of the sequence
    pub fn append(&mut self, id: InstructionId) -> Result<(), InstructionError> {
        self.check_unlinked(id)?;

        let previous = self.order.last().copied();
        if let Some(previous) = previous {
            self.arena[previous.0].next = Some(id);
        }
        let item = &mut self.arena[id.0];
        item.previous = previous;
        item.next = None;
        item.linked = true;

        self.order.push(id);
        self.recompute_offsets(self.order.len() - 1);
        Ok(())
    }

    /// Link an unlinked instruction before the one at `index`.
    ///
    /// `index == len()` appends.
    pub fn insert(&mut self, index: usize, id: InstructionId) -> Result<(), InstructionError> {
        self.check_unlinked(id)?;
        if index > self.order.len() {
            return Err(InstructionError::OutOfRange {
                index,
                len: self.order.len(),
            });
        }
        if index == self.order.len() {
            return self.append(id);
        }

        let current = self.order[index];
        let previous = self.arena[current.0].previous;
        if let Some(previous) = previous {
            self.arena[previous.0].next = Some(id);
        }
        self.arena[current.0].previous = Some(id);

        let item = &mut self.arena[id.0];
        item.previous = previous;
        item.next = Some(current);
        item.linked = true;

        self.order.insert(index, id);
        self.recompute_offsets(index);
        Ok(())
    }

    /// Swap the instruction at `index` for an unlinked one.
    ///
    /// Returns the replaced instruction, now unlinked with cleared links.
    pub fn replace(&mut self, index: usize, id: InstructionId) -> Result<InstructionId, InstructionError> {
        self.check_unlinked(id)?;
        let current = self.linked_at(index)?;

        let (previous, next) = {
            let old = &self.arena[current.0];
            (old.previous, old.next)
        };
        if let Some(previous) = previous {
            self.arena[previous.0].next = Some(id);
        }
        if let Some(next) = next {
            self.arena[next.0].previous = Some(id);
        }

        let item = &mut self.arena[id.0];
        item.previous = previous;
        item.next = next;
        item.linked = true;

        self.unlink(current);
        self.order[index] = id;
        self.recompute_offsets(index);
        Ok(current)
    }

    /// Unlink the instruction at `index` and return it
    pub fn remove(&mut self, index: usize) -> Result<InstructionId, InstructionError> {
        let current = self.linked_at(index)?;

        let (previous, next) = {
            let old = &self.arena[current.0];
            (old.previous, old.next)
        };
        if let Some(previous) = previous {
            self.arena[previous.0].next = next;
        }
        if let Some(next) = next {
            self.arena[next.0].previous = previous;
        }

        self.unlink(current);
        self.order.remove(index);
        self.recompute_offsets(index);
        Ok(current)
    }

    pub fn get(&self, id: InstructionId) -> Option<&Instruction> {
        self.arena.get(id.0)
    }

    /// Id of the linked instruction at `index`
    pub fn at(&self, index: usize) -> Option<InstructionId> {
        self.order.get(index).copied()
    }

    /// Index of a linked instruction in the sequence
    pub fn position(&self, id: InstructionId) -> Option<usize> {
        self.order.iter().position(|linked| *linked == id)
    }

    pub fn first(&self) -> Option<InstructionId> {
        self.order.first().copied()
    }

    pub fn last(&self) -> Option<InstructionId> {
        self.order.last().copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Linked ids in sequence order
    pub fn ids(&self) -> &[InstructionId] {
        &self.order
    }

    /// Linked instructions in sequence order
    pub fn iter(&self) -> impl Iterator<Item = (InstructionId, &Instruction)> + '_ {
        self.order.iter().map(move |id| (*id, &self.arena[id.0]))
    }

    /// Total encoded size of the linked instructions
    pub fn code_size(&self) -> usize {
        self.iter().map(|(_, instruction)| instruction.size()).sum()
    }

    /// IL listing line for one instruction
    pub fn display(&self, id: InstructionId) -> InstructionDisplay<'_> {
        InstructionDisplay { sequence: self, id }
    }

    fn check_unlinked(&self, id: InstructionId) -> Result<(), InstructionError> {
        match self.arena.get(id.0) {
            None => Err(InstructionError::UnknownInstruction(id)),
            Some(item) if item.linked => Err(InstructionError::AlreadyLinked(id)),
            Some(_) => Ok(()),
        }
    }

    fn linked_at(&self, index: usize) -> Result<InstructionId, InstructionError> {
        self.at(index).ok_or(InstructionError::OutOfRange {
            index,
            len: self.order.len(),
        })
    }

    fn unlink(&mut self, id: InstructionId) {
        let item = &mut self.arena[id.0];
        item.previous = None;
        item.next = None;
        item.linked = false;
        item.offset = 0;
    }

    fn recompute_offsets(&mut self, from: usize) {
        let mut offset = match from.checked_sub(1).and_then(|i| self.order.get(i)) {
            Some(previous) => {
                let previous = &self.arena[previous.0];
                previous.offset + previous.size()
            }
            None => 0,
        };
        for id in &self.order[from.min(self.order.len())..] {
            let item = &mut self.arena[id.0];
            item.offset = offset;
            offset += item.size();
        }
    }
}

/// Renders `IL_0004: br.s IL_0010` style listing lines
pub struct InstructionDisplay<'a> {
    sequence: &'a InstructionSequence,
    id: InstructionId,
}

impl InstructionDisplay<'_> {
    fn label(&self, f: &mut fmt::Formatter<'_>, target: InstructionId) -> fmt::Result {
        match self.sequence.get(target) {
            Some(target) => write!(f, "IL_{:04x}", target.offset),
            None => write!(f, "{}", target),
        }
    }
}

impl fmt::Display for InstructionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(instruction) = self.sequence.get(self.id) else {
            return write!(f, "{}: <unknown>", self.id);
        };

        write!(f, "IL_{:04x}: {}", instruction.offset, instruction.code.name())?;
        match &instruction.operand {
            Operand::None => Ok(()),
            Operand::Int8(value) => write!(f, " {}", value),
            Operand::UInt8(value) => write!(f, " {}", value),
            Operand::UInt16(value) => write!(f, " {}", value),
            Operand::Int32(value) => write!(f, " {}", value),
            Operand::Int64(value) => write!(f, " {}", value),
            Operand::Float32(value) => write!(f, " {}", value),
            Operand::Float64(value) => write!(f, " {}", value),
            Operand::String(value) => write!(f, " \"{}\"", value),
            Operand::Token(token) => write!(f, " {}", token),
            Operand::Target(target) => {
                f.write_str(" ")?;
                self.label(f, *target)
            }
            Operand::Switch(targets) => {
                f.write_str(" ")?;
                for (i, target) in targets.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    self.label(f, *target)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cil::token::TokenType;

    fn assert_links_consistent(seq: &InstructionSequence) {
        let ids = seq.ids();
        for (i, id) in ids.iter().enumerate() {
            let item = seq.get(*id).unwrap();
            assert_eq!(item.previous(), i.checked_sub(1).map(|p| ids[p]));
            assert_eq!(item.next(), ids.get(i + 1).copied());
        }
    }

    #[test]
    fn test_create_rejects_mismatched_operand() {
        let mut seq = InstructionSequence::new();
        let err = seq.create(Code::Nop, Operand::Int32(1)).unwrap_err();
        assert!(matches!(err, InstructionError::OperandMismatch { opcode: "nop", .. }));
        assert!(seq.get(InstructionId(0)).is_none());
    }

    #[test]
    fn test_create_rejects_missing_operand() {
        let mut seq = InstructionSequence::new();
        let err = seq.create(Code::Br, Operand::None).unwrap_err();
        assert_eq!(err, InstructionError::MissingOperand("br"));
    }

    #[test]
    fn test_ldc_i4_s_takes_signed_byte() {
        let mut seq = InstructionSequence::new();
        assert!(seq.create(Code::LdcI4S, Operand::Int8(-3)).is_ok());
        assert!(seq.create(Code::LdcI4S, Operand::UInt8(3)).is_err());
        assert!(seq.create(Code::Unaligned, Operand::UInt8(1)).is_ok());
        assert!(seq.create(Code::Unaligned, Operand::Int8(1)).is_err());
    }

    #[test]
    fn test_null_token_rejected() {
        let mut seq = InstructionSequence::new();
        let err = seq.create(Code::Call, Operand::Token(MetadataToken::NULL)).unwrap_err();
        assert_eq!(err, InstructionError::NullToken("call"));
    }

    #[test]
    fn test_unknown_branch_target_rejected() {
        let mut seq = InstructionSequence::new();
        let err = seq.create(Code::Br, Operand::Target(InstructionId(7))).unwrap_err();
        assert_eq!(err, InstructionError::UnknownTarget(InstructionId(7)));
    }

    #[test]
    fn test_sizes() {
        let mut seq = InstructionSequence::new();
        let ret = seq.create(Code::Ret, Operand::None).unwrap();
        let cases = [
            (Code::Nop, Operand::None, 1),
            (Code::LdcI4S, Operand::Int8(1), 2),
            (Code::Ldloc, Operand::UInt16(1), 4),
            (Code::LdcI4, Operand::Int32(1), 5),
            (Code::LdcI8, Operand::Int64(1), 9),
            (Code::LdcR4, Operand::Float32(1.0), 5),
            (Code::LdcR8, Operand::Float64(1.0), 9),
            (Code::BrS, Operand::Target(ret), 2),
            (Code::Br, Operand::Target(ret), 5),
            (Code::Switch, Operand::Switch(vec![ret, ret, ret]), 17),
            (
                Code::Ldftn,
                Operand::Token(MetadataToken::from_parts(TokenType::Method, 1)),
                6,
            ),
        ];
        for (code, operand, size) in cases {
            let id = seq.create(code, operand).unwrap();
            assert_eq!(seq.get(id).unwrap().size(), size, "{}", code);
        }
    }

    #[test]
    fn test_append_links_and_offsets() {
        let mut seq = InstructionSequence::new();
        let a = seq.push(Code::LdcI4, Operand::Int32(5)).unwrap();
        let b = seq.push(Code::Pop, Operand::None).unwrap();
        let c = seq.push(Code::Ret, Operand::None).unwrap();

        assert_links_consistent(&seq);
        assert_eq!(seq.get(a).unwrap().offset(), 0);
        assert_eq!(seq.get(b).unwrap().offset(), 5);
        assert_eq!(seq.get(c).unwrap().offset(), 6);
        assert_eq!(seq.code_size(), 7);
    }

    #[test]
    fn test_insert_at_front_middle_and_end() {
        let mut seq = InstructionSequence::new();
        let a = seq.push(Code::Nop, Operand::None).unwrap();
        let b = seq.push(Code::Ret, Operand::None).unwrap();

        let front = seq.create(Code::Ldarg0, Operand::None).unwrap();
        seq.insert(0, front).unwrap();
        let middle = seq.create(Code::Pop, Operand::None).unwrap();
        seq.insert(2, middle).unwrap();
        let end = seq.create(Code::Nop, Operand::None).unwrap();
        seq.insert(seq.len(), end).unwrap();

        assert_eq!(seq.ids(), &[front, a, middle, b, end]);
        assert_links_consistent(&seq);
        assert_eq!(seq.get(b).unwrap().offset(), 3);
    }

    #[test]
    fn test_insert_out_of_range() {
        let mut seq = InstructionSequence::new();
        let id = seq.create(Code::Nop, Operand::None).unwrap();
        assert_eq!(
            seq.insert(2, id),
            Err(InstructionError::OutOfRange { index: 2, len: 0 })
        );
    }

    #[test]
    fn test_replace_clears_old_links() {
        let mut seq = InstructionSequence::new();
        let a = seq.push(Code::Nop, Operand::None).unwrap();
        let b = seq.push(Code::Nop, Operand::None).unwrap();
        let c = seq.push(Code::Ret, Operand::None).unwrap();

        let wide = seq.create(Code::LdcI4, Operand::Int32(9)).unwrap();
        let old = seq.replace(1, wide).unwrap();

        assert_eq!(old, b);
        let old = seq.get(b).unwrap();
        assert!(!old.is_linked());
        assert_eq!(old.previous(), None);
        assert_eq!(old.next(), None);
        assert_eq!(seq.ids(), &[a, wide, c]);
        assert_links_consistent(&seq);
        assert_eq!(seq.get(c).unwrap().offset(), 6);
    }

    #[test]
    fn test_remove_repairs_neighbors() {
        let mut seq = InstructionSequence::new();
        let a = seq.push(Code::Nop, Operand::None).unwrap();
        let b = seq.push(Code::LdcI4, Operand::Int32(1)).unwrap();
        let c = seq.push(Code::Ret, Operand::None).unwrap();

        assert_eq!(seq.remove(1).unwrap(), b);
        assert_eq!(seq.ids(), &[a, c]);
        assert_links_consistent(&seq);
        assert!(!seq.get(b).unwrap().is_linked());
        assert_eq!(seq.get(c).unwrap().offset(), 1);

        assert_eq!(seq.remove(0).unwrap(), a);
        assert_eq!(seq.get(c).unwrap().previous(), None);
        assert_eq!(seq.get(c).unwrap().offset(), 0);
    }

    #[test]
    fn test_cannot_link_twice() {
        let mut seq = InstructionSequence::new();
        let a = seq.push(Code::Nop, Operand::None).unwrap();
        assert_eq!(seq.append(a), Err(InstructionError::AlreadyLinked(a)));
        assert_eq!(seq.insert(0, a), Err(InstructionError::AlreadyLinked(a)));
    }

    #[test]
    fn test_removed_instruction_can_be_relinked() {
        let mut seq = InstructionSequence::new();
        let a = seq.push(Code::Nop, Operand::None).unwrap();
        let b = seq.push(Code::Ret, Operand::None).unwrap();
        seq.remove(0).unwrap();
        seq.append(a).unwrap();
        assert_eq!(seq.ids(), &[b, a]);
        assert_links_consistent(&seq);
    }

    #[test]
    fn test_display_renders_labels() {
        let mut seq = InstructionSequence::new();
        let ret = seq.create(Code::Ret, Operand::None).unwrap();
        let br = seq.push(Code::BrS, Operand::Target(ret)).unwrap();
        let ldstr = seq.push(Code::Ldstr, Operand::String("hi".to_string())).unwrap();
        let switch = seq.push(Code::Switch, Operand::Switch(vec![ret, br])).unwrap();
        seq.append(ret).unwrap();

        assert_eq!(seq.display(br).to_string(), "IL_0000: br.s IL_0014");
        assert_eq!(seq.display(ldstr).to_string(), "IL_0002: ldstr \"hi\"");
        assert_eq!(
            seq.display(switch).to_string(),
            "IL_0007: switch IL_0014,IL_0000"
        );
    }
}
