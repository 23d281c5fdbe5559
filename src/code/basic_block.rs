use crate::code::error::RopError;
use crate::code::insn::Insn;
use crate::code::register_spec::RegisterSpecTable;
use crate::code::rop::Branchingness;
use crate::fail;
use crate::types::TypeList;
use std::fmt;

/// A straight-line run of instructions ending in a branch, return or
/// throwing instruction, with its outgoing edges.
///
/// For a throwing block the successors are one handler per catch type of
/// the last instruction, in order, followed by the normal path if there is
/// one. `primary_successor` is the normal path, when the block has one.
#[derive(Debug, Clone)]
pub struct BasicBlock {
    label: u32,
    insns: Vec<Insn>,
    successors: Vec<u32>,
    primary_successor: Option<u32>,
}

impl BasicBlock {
    pub fn new(
        label: u32,
        insns: Vec<Insn>,
        successors: Vec<u32>,
        primary_successor: Option<u32>,
    ) -> Result<BasicBlock, RopError> {
        let (last, body) = match insns.split_last() {
            Some(split) => split,
            None => fail!(InvalidArgument, "block {:04x} has no instructions", label),
        };
        if let Some(i) = body
            .iter()
            .position(|insn| insn.opcode().branchingness() != Branchingness::None)
        {
            fail!(InvalidArgument, "insns[{}] is a branch or can throw", i);
        }

        let branching = last.opcode().branchingness();
        let n = successors.len();
        let catches = last.catches().len();
        let legal = match branching {
            Branchingness::None => fail!(
                InvalidArgument,
                "insns does not end with a branch or throwing instruction"
            ),
            Branchingness::Return => n == 0,
            Branchingness::Goto => n == 1,
            Branchingness::If => n == 2,
            Branchingness::Switch => n >= 1,
            Branchingness::Throw => n == catches || n == catches + 1,
        };
        if !legal {
            fail!(
                InvalidArgument,
                "{} successors for a block ending in {}",
                n,
                last.opcode().nickname()
            );
        }
        // Handlers come first; the normal path, if any, is the trailing edge.
        if branching == Branchingness::Throw && n == catches + 1 && primary_successor != successors.last().copied() {
            fail!(
                InvalidArgument,
                "primary successor of a throwing block must be its last successor, got {:?} in {:?}",
                primary_successor,
                successors
            );
        }
        if let Some(primary) = primary_successor {
            if !successors.contains(&primary) {
                fail!(
                    InvalidArgument,
                    "primary successor {:04x} not in successors {:?}",
                    primary,
                    successors
                );
            }
        }
        Ok(BasicBlock {
            label,
            insns,
            successors,
            primary_successor,
        })
    }

    pub fn label(&self) -> u32 {
        self.label
    }

    pub fn insns(&self) -> &[Insn] {
        &self.insns
    }

    pub fn successors(&self) -> &[u32] {
        &self.successors
    }

    pub fn primary_successor(&self) -> Option<u32> {
        self.primary_successor
    }

    /// The successor that isn't primary. Only meaningful for two-way
    /// blocks.
    pub fn secondary_successor(&self) -> Result<u32, RopError> {
        match self.successors.as_slice() {
            [a, b] => Ok(if Some(*a) == self.primary_successor { *b } else { *a }),
            _ => fail!(
                UnsupportedOperation,
                "block doesn't have exactly two successors"
            ),
        }
    }

    pub fn first_insn(&self) -> &Insn {
        &self.insns[0]
    }

    pub fn last_insn(&self) -> &Insn {
        &self.insns[self.insns.len() - 1]
    }

    pub fn can_throw(&self) -> bool {
        self.last_insn().can_throw()
    }

    pub fn has_exception_handlers(&self) -> bool {
        !self.last_insn().catches().is_empty()
    }

    pub fn exception_handler_types(&self) -> &TypeList {
        self.last_insn().catches()
    }

    pub fn with_register_offset(&self, table: &RegisterSpecTable, delta: i32) -> Result<BasicBlock, RopError> {
        let insns = self
            .insns
            .iter()
            .map(|insn| insn.with_register_offset(table, delta))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(BasicBlock { insns, ..self.clone() })
    }
}

impl fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{{:04x}}}", self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::error::RopErrorKind;
    use crate::code::position::SourcePosition;
    use crate::code::register_spec_list::RegisterSpecList;
    use crate::code::rops::*;
    use crate::types::Type;

    fn goto() -> Insn {
        Insn::plain(GOTO.clone(), SourcePosition::NO_INFO, None, RegisterSpecList::empty()).unwrap()
    }

    fn nop() -> Insn {
        Insn::plain(NOP.clone(), SourcePosition::NO_INFO, None, RegisterSpecList::empty()).unwrap()
    }

    fn if_eqz(table: &RegisterSpecTable) -> Insn {
        let src = RegisterSpecList::of(&[table.make(0, Type::Int)]);
        Insn::plain(IF_EQZ_INT.clone(), SourcePosition::NO_INFO, None, src).unwrap()
    }

    #[test]
    fn validation() {
        let e = BasicBlock::new(0, vec![], vec![], None).unwrap_err();
        assert_eq!(e.kind(), RopErrorKind::InvalidArgument);
        assert!(BasicBlock::new(0, vec![nop()], vec![1], None).is_err());
        assert!(BasicBlock::new(0, vec![goto(), goto()], vec![1], Some(1)).is_err());
        assert!(BasicBlock::new(0, vec![goto()], vec![1, 2], None).is_err());
        assert!(BasicBlock::new(0, vec![goto()], vec![1], Some(2)).is_err());

        let b = BasicBlock::new(3, vec![nop(), goto()], vec![1], Some(1)).unwrap();
        assert_eq!(b.to_string(), "{0003}");
        assert!(!b.can_throw());
        assert!(!b.has_exception_handlers());
    }

    #[test]
    fn two_way_blocks() {
        let table = RegisterSpecTable::new();
        let b = BasicBlock::new(0, vec![if_eqz(&table)], vec![4, 7], Some(7)).unwrap();
        assert_eq!(b.secondary_successor().unwrap(), 4);
        let g = BasicBlock::new(0, vec![goto()], vec![4], Some(4)).unwrap();
        assert_eq!(g.secondary_successor().unwrap_err().kind(), RopErrorKind::UnsupportedOperation);
    }

    #[test]
    fn throwing_blocks() {
        let table = RegisterSpecTable::new();
        let src = RegisterSpecList::of(&[table.make(0, Type::Int), table.make(1, Type::Int)]);
        let div = Insn::throwing(
            DIV_INT.clone(),
            SourcePosition::NO_INFO,
            src,
            TypeList::of(&[ARITHMETIC_EXCEPTION]),
        )
        .unwrap();
        let b = BasicBlock::new(0, vec![div.clone()], vec![5, 1], Some(1)).unwrap();
        assert!(b.can_throw());
        assert!(b.has_exception_handlers());
        assert_eq!(b.exception_handler_types(), &TypeList::of(&[ARITHMETIC_EXCEPTION]));
        assert!(BasicBlock::new(0, vec![div.clone()], vec![5, 1, 2], Some(1)).is_err());

        // the normal path trails the handlers
        let e = BasicBlock::new(0, vec![div.clone()], vec![5, 1], Some(5)).unwrap_err();
        assert_eq!(e.kind(), RopErrorKind::InvalidArgument);
        assert!(BasicBlock::new(0, vec![div.clone()], vec![5, 1], None).is_err());
        let handlers_only = BasicBlock::new(0, vec![div], vec![5], None).unwrap();
        assert_eq!(handlers_only.primary_successor(), None);

        let moved = b.with_register_offset(&table, 2).unwrap();
        assert_eq!(moved.last_insn().sources().get(0).map(|s| s.reg()), Some(2));
        assert_eq!(moved.successors(), b.successors());
    }
}
