use crate::code::error::RopError;
use crate::code::register_spec::{RegisterSpec, RegisterSpecTable};
use crate::types::{Type, TypeList};
use crate::{err, fail};
use std::collections::HashSet;
use std::fmt;

/// An ordered, frozen list of register specs, typically the sources of an
/// instruction. Build one slot by slot with [`RegisterSpecListBuilder`] or
/// directly from a vector.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct RegisterSpecList {
    specs: Vec<RegisterSpec>,
}

impl RegisterSpecList {
    pub fn new(specs: Vec<RegisterSpec>) -> RegisterSpecList {
        RegisterSpecList { specs }
    }

    pub fn empty() -> RegisterSpecList {
        RegisterSpecList::default()
    }

    pub fn of(specs: &[RegisterSpec]) -> RegisterSpecList {
        RegisterSpecList { specs: specs.to_vec() }
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn get(&self, n: usize) -> Option<&RegisterSpec> {
        self.specs.get(n)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RegisterSpec> {
        self.specs.iter()
    }

    pub fn as_slice(&self) -> &[RegisterSpec] {
        &self.specs
    }

    pub fn last(&self) -> Option<&RegisterSpec> {
        self.specs.last()
    }

    /// Type of the `n`th element.
    pub fn get_type(&self, n: usize) -> Option<Type> {
        self.specs.get(n).map(RegisterSpec::get_type)
    }

    pub fn to_type_list(&self) -> TypeList {
        TypeList::new(self.specs.iter().map(RegisterSpec::get_type).collect())
    }

    /// Total width of the list in register units.
    pub fn word_count(&self) -> u32 {
        self.specs.iter().map(RegisterSpec::category).sum()
    }

    /// Smallest register file able to hold every element.
    pub fn registers_size(&self) -> Result<u32, RopError> {
        let mut size = 0;
        for spec in &self.specs {
            size = size.max(spec.next_reg()?);
        }
        Ok(size)
    }

    /// The first element naming register `reg`.
    pub fn spec_for_register(&self, reg: u32) -> Option<&RegisterSpec> {
        self.specs.iter().find(|s| s.reg() == reg)
    }

    pub fn index_of_register(&self, reg: u32) -> Option<usize> {
        self.specs.iter().position(|s| s.reg() == reg)
    }

    pub fn with_first(&self, spec: RegisterSpec) -> RegisterSpecList {
        let mut specs = Vec::with_capacity(self.specs.len() + 1);
        specs.push(spec);
        specs.extend(self.specs.iter().cloned());
        RegisterSpecList { specs }
    }

    pub fn without_first(&self) -> Result<RegisterSpecList, RopError> {
        if self.specs.is_empty() {
            fail!(InvalidArgument, "cannot drop the first element of an empty list");
        }
        Ok(RegisterSpecList {
            specs: self.specs[1..].to_vec(),
        })
    }

    pub fn without_last(&self) -> Result<RegisterSpecList, RopError> {
        match self.specs.split_last() {
            Some((_, rest)) => Ok(RegisterSpecList { specs: rest.to_vec() }),
            None => Err(err!(InvalidArgument, "cannot drop the last element of an empty list")),
        }
    }

    /// Copy without the elements at the indices in `excluded`.
    pub fn subset(&self, excluded: &HashSet<usize>) -> RegisterSpecList {
        let specs = self
            .specs
            .iter()
            .enumerate()
            .filter(|(i, _)| !excluded.contains(i))
            .map(|(_, s)| s.clone())
            .collect();
        RegisterSpecList { specs }
    }

    /// Every register shifted by `delta`.
    pub fn with_offset(&self, table: &RegisterSpecTable, delta: i32) -> Result<RegisterSpecList, RopError> {
        if delta == 0 || self.specs.is_empty() {
            return Ok(self.clone());
        }
        let specs = self
            .specs
            .iter()
            .map(|s| s.with_offset(table, delta))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RegisterSpecList { specs })
    }

    /// Renumbers elements onto fresh sequential registers starting at
    /// `base`. Elements whose index is in `compatible` keep their register.
    /// With `duplicate_first`, the first element is placed at `base` without
    /// consuming it, so the next renumbered element lands on the same
    /// register.
    pub fn with_expanded_registers(
        &self,
        table: &RegisterSpecTable,
        base: u32,
        duplicate_first: bool,
        compatible: &HashSet<usize>,
    ) -> Result<RegisterSpecList, RopError> {
        let mut base = base;
        let mut duplicate_first = duplicate_first;
        let mut specs = Vec::with_capacity(self.specs.len());
        for (i, spec) in self.specs.iter().enumerate() {
            if compatible.contains(&i) {
                specs.push(spec.clone());
            } else {
                let expanded = spec.with_reg(table, base);
                if !duplicate_first {
                    base = expanded.next_reg()?;
                }
                specs.push(expanded);
            }
            duplicate_first = false;
        }
        Ok(RegisterSpecList { specs })
    }

    pub fn to_human(&self) -> String {
        let parts: Vec<String> = self.specs.iter().map(RegisterSpec::to_human).collect();
        format!("{{{}}}", parts.join(", "))
    }
}

impl From<Vec<RegisterSpec>> for RegisterSpecList {
    fn from(specs: Vec<RegisterSpec>) -> Self {
        RegisterSpecList { specs }
    }
}

impl<'a> IntoIterator for &'a RegisterSpecList {
    type Item = &'a RegisterSpec;
    type IntoIter = std::slice::Iter<'a, RegisterSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.iter()
    }
}

impl fmt::Display for RegisterSpecList {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, spec) in self.specs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", spec)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Debug for RegisterSpecList {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Fixed-size slot array for assembling a [`RegisterSpecList`].
#[derive(Debug, Clone)]
pub struct RegisterSpecListBuilder {
    slots: Vec<Option<RegisterSpec>>,
}

impl RegisterSpecListBuilder {
    pub fn new(size: usize) -> RegisterSpecListBuilder {
        RegisterSpecListBuilder { slots: vec![None; size] }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn set(&mut self, n: usize, spec: RegisterSpec) -> Result<(), RopError> {
        let len = self.slots.len();
        match self.slots.get_mut(n) {
            Some(slot) => {
                *slot = Some(spec);
                Ok(())
            }
            None => Err(err!(InvalidArgument, "index {} out of range for size {}", n, len)),
        }
    }

    pub fn get(&self, n: usize) -> Option<&RegisterSpec> {
        self.slots.get(n).and_then(Option::as_ref)
    }

    /// Freezes the list. Fails if any slot was never set.
    pub fn build(self) -> Result<RegisterSpecList, RopError> {
        let mut specs = Vec::with_capacity(self.slots.len());
        for (i, slot) in self.slots.into_iter().enumerate() {
            match slot {
                Some(spec) => specs.push(spec),
                None => fail!(NullArgument, "unset: {}", i),
            }
        }
        Ok(RegisterSpecList { specs })
    }
}
