//! Tracks which registers hold which named local variables: the state at
//! the start of every block, and the instructions that (re)assign a
//! variable.

use crate::code::basic_block::BasicBlock;
use crate::code::error::RopError;
use crate::code::register_spec::{RegisterSpec, RegisterSpecTable};
use crate::code::register_spec_set::RegisterSpecSet;
use crate::code::rop_method::RopMethod;
use crate::err;
use log::{debug, trace};
use std::collections::{BTreeSet, HashMap};

/// Local variable state of a method, as computed by [`extract`].
#[derive(Debug, Clone)]
pub struct LocalVariableInfo {
    reg_count: u32,
    empty_set: RegisterSpecSet,
    block_starts: Vec<Option<RegisterSpecSet>>,
    assignments: HashMap<(u32, usize), RegisterSpec>,
}

impl LocalVariableInfo {
    fn new(method: &RopMethod) -> LocalVariableInfo {
        let blocks = method.blocks();
        let reg_count = blocks.reg_count();
        LocalVariableInfo {
            reg_count,
            empty_set: RegisterSpecSet::new(reg_count as usize),
            block_starts: vec![None; blocks.max_label() as usize],
            assignments: HashMap::with_capacity(blocks.instruction_count()),
        }
    }

    fn starts0(&self, label: u32) -> Result<Option<&RegisterSpecSet>, RopError> {
        self.block_starts
            .get(label as usize)
            .map(Option::as_ref)
            .ok_or_else(|| err!(InvalidArgument, "bogus label: {:04x}", label))
    }

    /// Variables live on entry to block `label`; empty for blocks never
    /// reached.
    pub fn starts(&self, label: u32) -> Result<&RegisterSpecSet, RopError> {
        Ok(self.starts0(label)?.unwrap_or(&self.empty_set))
    }

    pub fn starts_for(&self, block: &BasicBlock) -> Result<&RegisterSpecSet, RopError> {
        self.starts(block.label())
    }

    /// The variable assigned by instruction `index` of block `label`, if
    /// that instruction changes the local state.
    pub fn assignment(&self, label: u32, index: usize) -> Option<&RegisterSpec> {
        self.assignments.get(&(label, index))
    }

    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// One line per reached block: its label and entry state.
    pub fn to_human(&self) -> String {
        let mut out = String::new();
        for (label, start) in self.block_starts.iter().enumerate() {
            if let Some(start) = start {
                out.push_str(&format!("{:04x}: {}\n", label, start));
            }
        }
        out
    }

    fn copy_of_starts(&self, label: u32) -> Result<RegisterSpecSet, RopError> {
        Ok(self
            .starts0(label)?
            .cloned()
            .unwrap_or_else(|| RegisterSpecSet::new(self.reg_count as usize)))
    }

    /// Folds `specs` into the entry state of `label`. Returns whether the
    /// entry state changed.
    fn merge_starts(
        &mut self,
        table: &RegisterSpecTable,
        label: u32,
        specs: &RegisterSpecSet,
    ) -> Result<bool, RopError> {
        let merged = match self.starts0(label)? {
            None => specs.clone(),
            Some(start) => {
                let merged = if start.size() != 0 {
                    let mut merged = start.clone();
                    merged.intersect(table, specs, true);
                    merged
                } else {
                    specs.clone()
                };
                if *start == merged {
                    return Ok(false);
                }
                merged
            }
        };
        trace!("starts of {:04x} now {}", label, merged);
        self.block_starts[label as usize] = Some(merged);
        Ok(true)
    }
}

/// Runs the local variable analysis over `method`, starting from its entry
/// block and revisiting a block whenever its entry state changes.
pub fn extract(method: &RopMethod, table: &RegisterSpecTable) -> Result<LocalVariableInfo, RopError> {
    let mut info = LocalVariableInfo::new(method);
    if method.blocks().reg_count() > 0 {
        let mut work = BTreeSet::new();
        work.insert(method.first_label());
        while let Some(label) = work.pop_first() {
            process_block(method, table, &mut info, label, &mut work)?;
        }
    }
    debug!(
        "locals: {} blocks, {} assignments",
        method.blocks().len(),
        info.assignment_count()
    );
    Ok(info)
}

// Throwing instructions never define a result, so every successor sees the
// state at the end of the block.
fn process_block(
    method: &RopMethod,
    table: &RegisterSpecTable,
    info: &mut LocalVariableInfo,
    label: u32,
    work: &mut BTreeSet<u32>,
) -> Result<(), RopError> {
    let mut state = info.copy_of_starts(label)?;
    let block = method.blocks().label_to_block(label)?;

    for (i, insn) in block.insns().iter().enumerate() {
        let assigned = match insn.local_assignment() {
            Some(local) => local.with_simple_type(table),
            None => {
                // An anonymous write ends whatever variable lived there.
                if let Some(result) = insn.result() {
                    if let Some(existing) = state.get(result.reg())?.cloned() {
                        state.remove(&existing)?;
                    }
                }
                continue;
            }
        };
        if state.get_for(&assigned)? == Some(&assigned) {
            continue;
        }
        let previous = assigned
            .local_item()
            .and_then(|local| state.local_item_to_spec(local))
            .cloned();
        if let Some(previous) = previous {
            if previous.reg() != assigned.reg() {
                state.remove(&previous)?;
            }
        }
        info.assignments.insert((label, i), assigned.clone());
        state.put(assigned)?;
    }

    for succ in block.successors() {
        if info.merge_starts(table, *succ, &state)? {
            work.insert(*succ);
        }
    }
    Ok(())
}
