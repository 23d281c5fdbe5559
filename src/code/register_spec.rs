use crate::code::error::RopError;
use crate::cst::{CstString, TypeBearer};
use crate::err;
use crate::types::{BasicType, Type};
use log::trace;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, PoisonError};

/// Name and generic signature of a local variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalItem {
    pub name: Option<CstString>,
    pub signature: Option<CstString>,
}

impl LocalItem {
    pub fn new(name: Option<&str>, signature: Option<&str>) -> LocalItem {
        LocalItem {
            name: name.map(CstString::new),
            signature: signature.map(CstString::new),
        }
    }

    pub fn named(name: &str) -> LocalItem {
        LocalItem::new(Some(name), None)
    }
}

impl fmt::Display for LocalItem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.name, &self.signature) {
            (None, None) => Ok(()),
            (Some(name), None) => write!(f, "{}", name.to_quoted()),
            (name, signature) => write!(
                f,
                "[{}|{}",
                name.as_ref().map(CstString::to_quoted).unwrap_or_default(),
                signature.as_ref().map(CstString::to_quoted).unwrap_or_default()
            ),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct SpecKey {
    reg: u32,
    type_bearer: TypeBearer,
    local: Option<LocalItem>,
}

/// A register together with the type (or known constant) it holds and,
/// optionally, the local variable it belongs to.
///
/// Specs are created through a [`RegisterSpecTable`], which hands out one
/// shared instance per distinct value, so identical specs made from the
/// same table compare equal by [`RegisterSpec::ptr_eq`] as well.
#[derive(Clone)]
pub struct RegisterSpec(Arc<SpecKey>);

/// Intern table for [`RegisterSpec`]s, owned by a compilation session.
///
/// Safe to share between threads working on different methods.
///
/// ```
///  use rop::code::register_spec::{RegisterSpec, RegisterSpecTable};
///  use rop::types::Type;
///
///  let table = RegisterSpecTable::new();
///  let a = table.make(3, Type::Int);
///  let b = table.make(3, Type::Int);
///  assert!(RegisterSpec::ptr_eq(&a, &b));
///  assert_eq!(a.to_string(), "v3:I");
/// ```
#[derive(Default)]
pub struct RegisterSpecTable {
    interns: Mutex<HashSet<RegisterSpec>>,
}

impl RegisterSpecTable {
    pub fn new() -> RegisterSpecTable {
        RegisterSpecTable::default()
    }

    fn intern(&self, reg: u32, type_bearer: TypeBearer, local: Option<LocalItem>) -> RegisterSpec {
        let spec = RegisterSpec(Arc::new(SpecKey { reg, type_bearer, local }));
        // Entries are only ever inserted, so a poisoned table is still whole.
        let mut interns = self.interns.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(found) = interns.get(&spec) {
            return found.clone();
        }
        interns.insert(spec.clone());
        trace!("interned {} ({} specs)", spec, interns.len());
        spec
    }

    pub fn make(&self, reg: u32, t: impl Into<TypeBearer>) -> RegisterSpec {
        self.intern(reg, t.into(), None)
    }

    pub fn make_local(&self, reg: u32, t: impl Into<TypeBearer>, local: LocalItem) -> RegisterSpec {
        self.intern(reg, t.into(), Some(local))
    }

    pub fn make_local_optional(
        &self,
        reg: u32,
        t: impl Into<TypeBearer>,
        local: Option<LocalItem>,
    ) -> RegisterSpec {
        self.intern(reg, t.into(), local)
    }

    pub fn len(&self) -> usize {
        self.interns.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every interned spec. Specs handed out earlier stay valid but
    /// are no longer identical to newly made ones.
    pub fn clear(&self) {
        self.interns.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl RegisterSpec {
    pub const PREFIX: &'static str = "v";

    pub fn reg_name(reg: u32) -> String {
        format!("{}{}", RegisterSpec::PREFIX, reg)
    }

    pub fn ptr_eq(a: &RegisterSpec, b: &RegisterSpec) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub fn reg(&self) -> u32 {
        self.0.reg
    }

    pub fn type_bearer(&self) -> &TypeBearer {
        &self.0.type_bearer
    }

    pub fn get_type(&self) -> Type {
        self.0.type_bearer.get_type()
    }

    pub fn frame_type(&self) -> Type {
        self.0.type_bearer.frame_type()
    }

    pub fn basic_type(&self) -> BasicType {
        self.0.type_bearer.basic_type()
    }

    pub fn basic_frame_type(&self) -> BasicType {
        self.0.type_bearer.basic_frame_type()
    }

    pub fn local_item(&self) -> Option<&LocalItem> {
        self.0.local.as_ref()
    }

    pub fn category(&self) -> u32 {
        self.0.type_bearer.category()
    }

    pub fn is_category1(&self) -> bool {
        self.category() == 1
    }

    pub fn is_category2(&self) -> bool {
        self.category() == 2
    }

    /// First register past the ones this spec occupies. Fails when that
    /// register is not representable.
    pub fn next_reg(&self) -> Result<u32, RopError> {
        self.0
            .reg
            .checked_add(self.category())
            .ok_or_else(|| err!(InvalidArgument, "register out of range: {}", self))
    }

    pub fn is_even_register(&self) -> bool {
        self.0.reg & 1 == 0
    }

    pub fn reg_string(&self) -> String {
        RegisterSpec::reg_name(self.0.reg)
    }

    /// Same type and local variable, ignoring the register.
    pub fn matches_variable(&self, other: &RegisterSpec) -> bool {
        self.get_type() == other.get_type() && self.0.local == other.0.local
    }

    /// Same register, type and local variable, ignoring any known constant.
    pub fn equals_using_simple_type(&self, other: &RegisterSpec) -> bool {
        self.matches_variable(other) && self.0.reg == other.0.reg
    }

    /// The most specific spec consistent with both `self` and `other`, or
    /// `None` if they disagree on register or type. With `local_primary`,
    /// disagreeing local variables also yield `None`; otherwise the local is
    /// dropped.
    pub fn intersect(
        &self,
        table: &RegisterSpecTable,
        other: &RegisterSpec,
        local_primary: bool,
    ) -> Option<RegisterSpec> {
        if RegisterSpec::ptr_eq(self, other) {
            return Some(self.clone());
        }
        if self.0.reg != other.0.reg {
            return None;
        }
        let same_local = self.0.local.is_some() && self.0.local == other.0.local;
        let result_local = if same_local { self.0.local.clone() } else { None };
        let same_name = result_local == self.0.local;
        if local_primary && !same_name {
            return None;
        }
        let this_type = self.get_type();
        if this_type != other.get_type() {
            return None;
        }
        let same_bearer = self.0.type_bearer == other.0.type_bearer;
        if same_bearer && same_name {
            return Some(self.clone());
        }
        let bearer = if same_bearer {
            self.0.type_bearer.clone()
        } else {
            TypeBearer::Type(this_type)
        };
        Some(table.make_local_optional(self.0.reg, bearer, result_local))
    }

    pub fn with_reg(&self, table: &RegisterSpecTable, new_reg: u32) -> RegisterSpec {
        if self.0.reg == new_reg {
            return self.clone();
        }
        table.make_local_optional(new_reg, self.0.type_bearer.clone(), self.0.local.clone())
    }

    pub fn with_type(&self, table: &RegisterSpecTable, t: impl Into<TypeBearer>) -> RegisterSpec {
        table.make_local_optional(self.0.reg, t, self.0.local.clone())
    }

    /// Fails if the shifted register would be negative.
    pub fn with_offset(&self, table: &RegisterSpecTable, delta: i32) -> Result<RegisterSpec, RopError> {
        if delta == 0 {
            return Ok(self.clone());
        }
        let reg = i64::from(self.0.reg) + i64::from(delta);
        let reg = u32::try_from(reg)
            .map_err(|_| err!(InvalidArgument, "reg < 0: {} offset by {}", self.reg_string(), delta))?;
        Ok(self.with_reg(table, reg))
    }

    /// Same spec with any known constant dropped from the type.
    pub fn with_simple_type(&self, table: &RegisterSpecTable) -> RegisterSpec {
        match &self.0.type_bearer {
            TypeBearer::Type(_) => self.clone(),
            TypeBearer::Constant(c) => table.make_local_optional(self.0.reg, c.type_of(), self.0.local.clone()),
        }
    }

    pub fn with_local_item(&self, table: &RegisterSpecTable, local: Option<LocalItem>) -> RegisterSpec {
        if self.0.local == local {
            return self.clone();
        }
        table.make_local_optional(self.0.reg, self.0.type_bearer.clone(), local)
    }

    pub fn to_human(&self) -> String {
        self.render(true)
    }

    fn render(&self, human: bool) -> String {
        let mut s = format!("{}:", self.reg_string());
        if let Some(local) = &self.0.local {
            s.push_str(&local.to_string());
        }
        s.push_str(&self.get_type().to_string());
        if let TypeBearer::Constant(c) = &self.0.type_bearer {
            s.push('=');
            if human {
                s.push_str(&c.to_human());
            } else {
                s.push_str(&c.to_string());
            }
        }
        s
    }
}

impl PartialEq for RegisterSpec {
    fn eq(&self, other: &Self) -> bool {
        RegisterSpec::ptr_eq(self, other) || self.0 == other.0
    }
}

impl Eq for RegisterSpec {}

impl Hash for RegisterSpec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl PartialOrd for RegisterSpec {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Orders by register, then type, then local variable (absent first).
impl Ord for RegisterSpec {
    fn cmp(&self, other: &Self) -> Ordering {
        if RegisterSpec::ptr_eq(self, other) {
            return Ordering::Equal;
        }
        self.0
            .reg
            .cmp(&other.0.reg)
            .then_with(|| self.get_type().cmp(&other.get_type()))
            .then_with(|| self.0.local.cmp(&other.0.local))
            .then_with(|| self.0.type_bearer.to_string().cmp(&other.0.type_bearer.to_string()))
    }
}

impl fmt::Display for RegisterSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.render(false))
    }
}

impl fmt::Debug for RegisterSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.render(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::error::RopErrorKind;
    use crate::cst::Constant;

    #[test]
    fn interning_is_per_table() {
        let table = RegisterSpecTable::new();
        let a = table.make(1, Type::Long);
        let b = table.make(1, Type::Long);
        assert!(RegisterSpec::ptr_eq(&a, &b));
        assert_eq!(table.len(), 1);

        table.clear();
        let c = table.make(1, Type::Long);
        assert!(!RegisterSpec::ptr_eq(&a, &c));
        assert_eq!(a, c);

        let other = RegisterSpecTable::new();
        assert!(!RegisterSpec::ptr_eq(&c, &other.make(1, Type::Long)));
    }

    #[test]
    fn next_reg_uses_category() {
        let table = RegisterSpecTable::new();
        assert_eq!(table.make(4, Type::Double).next_reg().unwrap(), 6);
        assert_eq!(table.make(4, Type::Int).next_reg().unwrap(), 5);
        assert!(table.make(4, Type::Int).is_even_register());

        assert_eq!(table.make(u32::MAX - 1, Type::Int).next_reg().unwrap(), u32::MAX);
        let e = table.make(u32::MAX, Type::Long).next_reg().unwrap_err();
        assert_eq!(e.kind(), RopErrorKind::InvalidArgument);
    }

    #[test]
    fn rendering() {
        let table = RegisterSpecTable::new();
        assert_eq!(table.make(3, Type::Int).to_string(), "v3:I");
        let k = table.make(0, Constant::Int(7));
        assert_eq!(k.to_string(), "v0:I=int{7}");
        assert_eq!(k.to_human(), "v0:I=7");
        let s = table.make_local(2, Constant::string("hi"), LocalItem::named("x"));
        assert_eq!(s.to_human(), "v2:\"x\"Ljava/lang/String;=\"hi\"");
    }

    #[test]
    fn offsets() {
        let table = RegisterSpecTable::new();
        let a = table.make(2, Type::Int);
        let b = a.with_offset(&table, 3).unwrap();
        assert_eq!(b.reg(), 5);
        assert!(RegisterSpec::ptr_eq(&b.with_offset(&table, -3).unwrap(), &a));
        assert!(RegisterSpec::ptr_eq(&a.with_offset(&table, 0).unwrap(), &a));
        let e = a.with_offset(&table, -3).unwrap_err();
        assert_eq!(e.kind(), RopErrorKind::InvalidArgument);
    }

    #[test]
    fn intersections() {
        let table = RegisterSpecTable::new();
        let x = LocalItem::named("x");
        let a = table.make_local(1, Constant::Int(0), x.clone());
        let b = table.make_local(1, Type::Int, x.clone());
        let c = table.make(1, Type::Int);

        let ab = a.intersect(&table, &b, true).unwrap();
        assert_eq!(ab, table.make_local(1, Type::Int, x.clone()));

        assert!(a.intersect(&table, &c, true).is_none());
        assert_eq!(a.intersect(&table, &c, false).unwrap(), c);
        assert!(a.intersect(&table, &table.make(2, Type::Int), false).is_none());
        assert!(c.intersect(&table, &table.make(1, Type::Float), false).is_none());
        assert!(RegisterSpec::ptr_eq(&a.intersect(&table, &a, true).unwrap(), &a));
    }

    #[test]
    fn functional_updates() {
        let table = RegisterSpecTable::new();
        let a = table.make(1, Constant::Int(4));
        assert_eq!(a.with_simple_type(&table), table.make(1, Type::Int));
        assert!(a.equals_using_simple_type(&table.make(1, Type::Int)));
        assert_eq!(a.with_type(&table, Type::Float).get_type(), Type::Float);
        let named = a.with_local_item(&table, Some(LocalItem::named("n")));
        assert_eq!(named.local_item(), Some(&LocalItem::named("n")));
        assert!(named.matches_variable(&table.make_local(9, Type::Int, LocalItem::named("n"))));
    }

    #[test]
    fn ordering() {
        let table = RegisterSpecTable::new();
        let mut specs = vec![
            table.make(2, Type::Int),
            table.make_local(1, Type::Int, LocalItem::named("a")),
            table.make(1, Type::Int),
            table.make(1, Type::Float),
        ];
        specs.sort();
        let rendered: Vec<String> = specs.iter().map(|s| s.to_string()).collect();
        assert_eq!(rendered, vec!["v1:F", "v1:I", "v1:\"a\"I", "v2:I"]);
    }
}
