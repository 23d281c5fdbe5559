use crate::code::basic_block_list::BasicBlockList;
use crate::code::error::RopError;
use crate::code::register_spec::RegisterSpecTable;
use crate::{err, fail};
use log::trace;
use std::collections::HashMap;

/// A method body in rop form: its blocks plus the label of the entry
/// block.
///
/// Predecessor lists are derived from the successor edges once, when the
/// method is built. Each list is sorted ascending; the entry block always
/// has one, empty if nothing branches back to it. Blocks with no
/// successors are the exit predecessors.
#[derive(Debug, Clone)]
pub struct RopMethod {
    blocks: BasicBlockList,
    first_label: u32,
    predecessors: HashMap<u32, Vec<u32>>,
    exit_predecessors: Vec<u32>,
}

impl RopMethod {
    pub fn new(blocks: BasicBlockList, first_label: u32) -> Result<RopMethod, RopError> {
        if blocks.index_of_label(first_label).is_none() {
            fail!(NoSuchBlock, "no such block: {:04x}", first_label);
        }
        let (predecessors, exit_predecessors) = compute_predecessors(&blocks, first_label);
        Ok(RopMethod {
            blocks,
            first_label,
            predecessors,
            exit_predecessors,
        })
    }

    pub fn blocks(&self) -> &BasicBlockList {
        &self.blocks
    }

    pub fn first_label(&self) -> u32 {
        self.first_label
    }

    /// Labels of the blocks branching to `label`, ascending. Fails for a
    /// label that is neither the entry nor the target of any edge.
    pub fn label_to_predecessors(&self, label: u32) -> Result<&[u32], RopError> {
        self.predecessors
            .get(&label)
            .map(Vec::as_slice)
            .ok_or_else(|| err!(NoSuchBlock, "no such block: {:04x}", label))
    }

    /// Labels of the blocks that leave the method, ascending.
    pub fn exit_predecessors(&self) -> &[u32] {
        &self.exit_predecessors
    }

    /// Same method with every register shifted by `delta`. The control flow
    /// graph is untouched, so the predecessor data is carried over.
    pub fn with_register_offset(&self, table: &RegisterSpecTable, delta: i32) -> Result<RopMethod, RopError> {
        Ok(RopMethod {
            blocks: self.blocks.with_register_offset(table, delta)?,
            first_label: self.first_label,
            predecessors: self.predecessors.clone(),
            exit_predecessors: self.exit_predecessors.clone(),
        })
    }

    /// Block-by-block listing: each block's predecessors, instructions and
    /// successors, the primary one starred.
    pub fn to_human(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            let label = block.label();
            out.push_str(&format!("block {:04x}\n", label));
            for pred in self.predecessors.get(&label).map(Vec::as_slice).unwrap_or_default() {
                out.push_str(&format!("  pred {:04x}\n", pred));
            }
            for insn in block.insns() {
                out.push_str(&format!("  {}\n", insn.to_human()));
            }
            let successors = block.successors();
            if successors.is_empty() {
                out.push_str("  returns\n");
            }
            for succ in successors {
                let primary = successors.len() > 1 && block.primary_successor() == Some(*succ);
                out.push_str(&format!("  next {:04x}{}\n", succ, if primary { " *" } else { "" }));
            }
        }
        out
    }
}

fn compute_predecessors(blocks: &BasicBlockList, first_label: u32) -> (HashMap<u32, Vec<u32>>, Vec<u32>) {
    let mut predecessors: HashMap<u32, Vec<u32>> = HashMap::new();
    let mut exits = Vec::new();
    for block in blocks {
        if block.successors().is_empty() {
            exits.push(block.label());
        }
        for succ in block.successors() {
            predecessors.entry(*succ).or_default().push(block.label());
        }
    }
    for preds in predecessors.values_mut() {
        preds.sort_unstable();
    }
    exits.sort_unstable();
    predecessors.entry(first_label).or_default();
    trace!(
        "predecessors for {} blocks: {} targets, {} exits",
        blocks.len(),
        predecessors.len(),
        exits.len()
    );
    (predecessors, exits)
}
