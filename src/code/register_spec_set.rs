use crate::code::error::RopError;
use crate::code::register_spec::{LocalItem, RegisterSpec, RegisterSpecTable};
use crate::{err, fail};
use std::fmt;

/// Register-indexed view of which spec currently lives in each register,
/// used when merging the register state at block entries.
///
/// A category-2 spec occupies its register and the next one; storing a
/// spec clears whatever it overlaps.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct RegisterSpecSet {
    specs: Vec<Option<RegisterSpec>>,
}

impl RegisterSpecSet {
    pub fn new(max_size: usize) -> RegisterSpecSet {
        RegisterSpecSet {
            specs: vec![None; max_size],
        }
    }

    pub fn max_size(&self) -> usize {
        self.specs.len()
    }

    /// Number of registers holding a spec.
    pub fn size(&self) -> usize {
        self.specs.iter().filter(|s| s.is_some()).count()
    }

    pub fn get(&self, reg: u32) -> Result<Option<&RegisterSpec>, RopError> {
        match self.specs.get(reg as usize) {
            Some(slot) => Ok(slot.as_ref()),
            None => Err(err!(InvalidArgument, "bogus reg: {}", reg)),
        }
    }

    /// The spec occupying the same register as `spec`.
    pub fn get_for(&self, spec: &RegisterSpec) -> Result<Option<&RegisterSpec>, RopError> {
        self.get(spec.reg())
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisterSpec> {
        self.specs.iter().flatten()
    }

    /// Lowest-numbered spec holding the same variable as `spec`.
    pub fn find_matching_local(&self, spec: &RegisterSpec) -> Option<&RegisterSpec> {
        self.iter().find(|s| spec.matches_variable(s))
    }

    pub fn local_item_to_spec(&self, local: &LocalItem) -> Option<&RegisterSpec> {
        self.iter().find(|s| s.local_item() == Some(local))
    }

    pub fn remove(&mut self, spec: &RegisterSpec) -> Result<(), RopError> {
        match self.specs.get_mut(spec.reg() as usize) {
            Some(slot) => {
                *slot = None;
                Ok(())
            }
            None => Err(err!(InvalidArgument, "bogus reg: {}", spec.reg())),
        }
    }

    pub fn put(&mut self, spec: RegisterSpec) -> Result<(), RopError> {
        let reg = spec.reg() as usize;
        if spec.next_reg()? as usize > self.specs.len() {
            fail!(InvalidArgument, "register out of range: {}", spec);
        }
        if reg > 0 {
            let prev = &mut self.specs[reg - 1];
            if prev.as_ref().is_some_and(RegisterSpec::is_category2) {
                *prev = None;
            }
        }
        if spec.is_category2() {
            self.specs[reg + 1] = None;
        }
        self.specs[reg] = Some(spec);
        Ok(())
    }

    pub fn put_all(&mut self, other: &RegisterSpecSet) -> Result<(), RopError> {
        for spec in other.iter() {
            self.put(spec.clone())?;
        }
        Ok(())
    }

    /// Keeps, register by register, only the information both sets agree
    /// on. Registers beyond the end of `other` are cleared.
    pub fn intersect(&mut self, table: &RegisterSpecTable, other: &RegisterSpecSet, local_primary: bool) {
        let shared = self.specs.len().min(other.specs.len());
        for (i, slot) in self.specs.iter_mut().enumerate() {
            if i >= shared {
                *slot = None;
                continue;
            }
            let merged = match (slot.as_ref(), &other.specs[i]) {
                (Some(ours), Some(theirs)) => ours.intersect(table, theirs, local_primary),
                _ => None,
            };
            *slot = merged;
        }
    }

    /// Copy with every register shifted by `delta`.
    pub fn with_offset(&self, table: &RegisterSpecTable, delta: i32) -> Result<RegisterSpecSet, RopError> {
        let len = i64::try_from(self.specs.len()).unwrap_or(i64::MAX) + i64::from(delta);
        let len = usize::try_from(len).map_err(|_| err!(InvalidArgument, "negative set size after offset {}", delta))?;
        let mut result = RegisterSpecSet::new(len);
        for spec in self.iter() {
            result.put(spec.with_offset(table, delta)?)?;
        }
        Ok(result)
    }
}

impl fmt::Display for RegisterSpecSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, spec) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", spec)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Debug for RegisterSpecSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::error::RopErrorKind;
    use crate::types::Type;

    #[test]
    fn put_clobbers_wide_neighbours() {
        let table = RegisterSpecTable::new();
        let mut set = RegisterSpecSet::new(6);
        set.put(table.make(0, Type::Long)).unwrap();
        set.put(table.make(3, Type::Int)).unwrap();
        assert_eq!(set.size(), 2);

        // v1 is the upper half of the long in v0
        set.put(table.make(1, Type::Int)).unwrap();
        assert_eq!(set.get(0).unwrap(), None);
        assert_eq!(set.size(), 2);

        // a double in v2 covers v3
        set.put(table.make(2, Type::Double)).unwrap();
        assert_eq!(set.get(3).unwrap(), None);
        assert_eq!(set.to_string(), "{v1:I, v2:D}");
    }

    #[test]
    fn range_checks() {
        let table = RegisterSpecTable::new();
        let mut set = RegisterSpecSet::new(2);
        assert_eq!(set.put(table.make(1, Type::Long)).unwrap_err().kind(), RopErrorKind::InvalidArgument);
        assert!(set.get(2).is_err());
        assert!(set.put(table.make(u32::MAX, Type::Double)).is_err());
        assert!(set.remove(&table.make(5, Type::Int)).is_err());
        set.put(table.make(1, Type::Int)).unwrap();
        set.remove(&table.make(1, Type::Float)).unwrap();
        assert_eq!(set.size(), 0);
    }

    #[test]
    fn locals() {
        let table = RegisterSpecTable::new();
        let x = LocalItem::named("x");
        let mut set = RegisterSpecSet::new(4);
        set.put(table.make(0, Type::Int)).unwrap();
        set.put(table.make_local(2, Type::Int, x.clone())).unwrap();
        let other = table.make_local(3, Type::Int, x.clone());
        assert_eq!(set.find_matching_local(&other).map(RegisterSpec::reg), Some(2));
        assert_eq!(set.local_item_to_spec(&x).map(RegisterSpec::reg), Some(2));
        assert!(set.local_item_to_spec(&LocalItem::named("y")).is_none());
    }

    #[test]
    fn intersect_and_offset() {
        let table = RegisterSpecTable::new();
        let mut a = RegisterSpecSet::new(4);
        a.put(table.make(0, Type::Int)).unwrap();
        a.put(table.make(1, Type::Float)).unwrap();
        a.put(table.make(3, Type::Int)).unwrap();
        let mut b = RegisterSpecSet::new(3);
        b.put(table.make(0, Type::Int)).unwrap();
        b.put(table.make(1, Type::Int)).unwrap();

        a.intersect(&table, &b, false);
        assert_eq!(a.to_string(), "{v0:I}");

        let mut all = RegisterSpecSet::new(2);
        all.put_all(&a).unwrap();
        let shifted = all.with_offset(&table, 2).unwrap();
        assert_eq!(shifted.max_size(), 4);
        assert_eq!(shifted.get(2).unwrap(), Some(&table.make(2, Type::Int)));
        assert!(all.with_offset(&table, -3).is_err());
    }
}
