use crate::code::basic_block::BasicBlock;
use crate::code::error::RopError;
use crate::code::reg_ops::RegOp;
use crate::code::register_spec::RegisterSpecTable;
use crate::{err, fail};
use std::collections::HashMap;

/// The blocks of a method, addressable by label.
#[derive(Debug, Clone, Default)]
pub struct BasicBlockList {
    blocks: Vec<BasicBlock>,
    by_label: HashMap<u32, usize>,
    reg_count: u32,
}

impl BasicBlockList {
    /// Fails if two blocks share a label.
    pub fn new(blocks: Vec<BasicBlock>) -> Result<BasicBlockList, RopError> {
        let mut by_label = HashMap::with_capacity(blocks.len());
        for (i, block) in blocks.iter().enumerate() {
            if by_label.insert(block.label(), i).is_some() {
                fail!(InvalidArgument, "duplicate label: {:04x}", block.label());
            }
        }
        let mut reg_count = 0;
        for insn in blocks.iter().flat_map(BasicBlock::insns) {
            for spec in insn.result().into_iter().chain(insn.sources().iter()) {
                reg_count = reg_count.max(spec.next_reg()?);
            }
        }
        Ok(BasicBlockList {
            blocks,
            by_label,
            reg_count,
        })
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, n: usize) -> Option<&BasicBlock> {
        self.blocks.get(n)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BasicBlock> {
        self.blocks.iter()
    }

    /// Number of registers the instructions refer to, i.e. one past the
    /// highest register any of them touches.
    pub fn reg_count(&self) -> u32 {
        self.reg_count
    }

    /// One more than the largest label in use.
    pub fn max_label(&self) -> u32 {
        self.blocks.iter().map(|b| b.label() + 1).max().unwrap_or(0)
    }

    pub fn index_of_label(&self, label: u32) -> Option<usize> {
        self.by_label.get(&label).copied()
    }

    pub fn label_to_block(&self, label: u32) -> Result<&BasicBlock, RopError> {
        self.index_of_label(label)
            .map(|i| &self.blocks[i])
            .ok_or_else(|| err!(NoSuchBlock, "no such label: {:04x}", label))
    }

    pub fn instruction_count(&self) -> usize {
        self.blocks.iter().map(|b| b.insns().len()).sum()
    }

    /// Instruction count not counting `mark-local`s, which emit no code.
    pub fn effective_instruction_count(&self) -> usize {
        self.blocks
            .iter()
            .flat_map(BasicBlock::insns)
            .filter(|insn| insn.opcode().opcode() != RegOp::MarkLocal)
            .count()
    }

    /// The block control most likely falls into after `block`: its only
    /// successor, else its primary one, else its first.
    pub fn preferred_successor_of(&self, block: &BasicBlock) -> Result<Option<&BasicBlock>, RopError> {
        let label = match (block.successors(), block.primary_successor()) {
            ([], _) => return Ok(None),
            ([only], _) => *only,
            (_, Some(primary)) => primary,
            ([first, ..], None) => *first,
        };
        self.label_to_block(label).map(Some)
    }

    /// Whether both blocks end in the same handlers: equal catch types and
    /// equal successor labels, ignoring where each block's primary
    /// successor goes.
    pub fn catches_equal(&self, a: &BasicBlock, b: &BasicBlock) -> bool {
        if a.exception_handler_types() != b.exception_handler_types() {
            return false;
        }
        let (primary_a, primary_b) = (a.primary_successor(), b.primary_successor());
        if (primary_a.is_none() || primary_b.is_none()) && primary_a != primary_b {
            return false;
        }
        if a.successors().len() != b.successors().len() {
            return false;
        }
        for (la, lb) in a.successors().iter().zip(b.successors()) {
            if Some(*la) == primary_a {
                if Some(*lb) != primary_b {
                    return false;
                }
                continue;
            }
            if la != lb {
                return false;
            }
        }
        true
    }

    pub fn with_register_offset(&self, table: &RegisterSpecTable, delta: i32) -> Result<BasicBlockList, RopError> {
        let blocks = self
            .blocks
            .iter()
            .map(|b| b.with_register_offset(table, delta))
            .collect::<Result<Vec<_>, _>>()?;
        BasicBlockList::new(blocks)
    }
}

impl<'a> IntoIterator for &'a BasicBlockList {
    type Item = &'a BasicBlock;
    type IntoIter = std::slice::Iter<'a, BasicBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}
