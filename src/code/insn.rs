use crate::code::error::RopError;
use crate::code::position::SourcePosition;
use crate::code::reg_ops::RegOp;
use crate::code::register_spec::{RegisterSpec, RegisterSpecTable};
use crate::code::register_spec_list::RegisterSpecList;
use crate::code::rop::{Branchingness, Rop};
use crate::code::rops;
use crate::cst::{CstMethodRef, Constant, VAR_HANDLE_RETURNS_BOOLEAN, VAR_HANDLE_RETURNS_OBJECT, VAR_HANDLE_RETURNS_VOID};
use crate::types::{Prototype, Type, TypeList};
use crate::{err, fail};
use log::debug;
use std::fmt;

const DEFAULT_POLYMORPHIC_DESCRIPTOR: &str = "([Ljava/lang/Object;)Ljava/lang/Object;";
const VAR_HANDLE_SET_DESCRIPTOR: &str = "([Ljava/lang/Object;)V";
const VAR_HANDLE_COMPARE_AND_SET_DESCRIPTOR: &str = "([Ljava/lang/Object;)Z";

static NO_CATCHES: TypeList = TypeList::EMPTY;

/// Variant-specific payload of an [`Insn`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InsnKind {
    /// Non-throwing instruction over registers only.
    Plain,
    /// Non-throwing instruction with a folded-in constant operand.
    PlainCst { constant: Constant },
    /// May throw; the owning block's successors are one handler per catch
    /// type, in order, then the normal path.
    Throwing { catches: TypeList },
    /// Throwing instruction with a constant operand (invokes, field access,
    /// `new-instance`, `const-string`...).
    ThrowingCst { catches: TypeList, constant: Constant },
    /// Multi-way branch on an int; successors follow `cases`, then the
    /// default.
    Switch { cases: Vec<i32> },
    /// Literal initializer for an already-allocated array.
    FillArrayData { values: Vec<Constant>, array_type: Type },
    /// Call to a signature-polymorphic method. `polymorphic_method` is the
    /// erased method that is actually linked, `call_site_proto` the
    /// prototype the caller used.
    InvokePolymorphic {
        catches: TypeList,
        call_site_method: CstMethodRef,
        polymorphic_method: CstMethodRef,
        call_site_proto: Prototype,
    },
}

/// One rop instruction: a [`Rop`], where it came from, the register it
/// defines (if any) and the registers it reads.
///
/// Instructions are immutable; every transform builds a new one.
#[derive(Debug, Clone)]
pub struct Insn {
    opcode: Rop,
    position: SourcePosition,
    result: Option<RegisterSpec>,
    sources: RegisterSpecList,
    kind: InsnKind,
}

impl Insn {
    fn build(
        opcode: Rop,
        position: SourcePosition,
        result: Option<RegisterSpec>,
        sources: RegisterSpecList,
        kind: InsnKind,
    ) -> Result<Insn, RopError> {
        let branching = opcode.branchingness();
        let valid = match &kind {
            InsnKind::Plain => !matches!(branching, Branchingness::Switch | Branchingness::Throw),
            InsnKind::PlainCst { .. } | InsnKind::FillArrayData { .. } => branching == Branchingness::None,
            InsnKind::Throwing { .. } | InsnKind::ThrowingCst { .. } | InsnKind::InvokePolymorphic { .. } => {
                branching == Branchingness::Throw
            }
            InsnKind::Switch { .. } => branching == Branchingness::Switch,
        };
        if !valid {
            fail!(InvalidArgument, "opcode with invalid branchingness: {:?}", branching);
        }
        if result.is_some() && branching != Branchingness::None {
            fail!(InvalidArgument, "can't mix branchingness with result");
        }
        Ok(Insn { opcode, position, result, sources, kind })
    }

    /// Branchingness must be none, return, goto or if; only the
    /// fall-through form may define a result.
    pub fn plain(
        opcode: Rop,
        position: SourcePosition,
        result: Option<RegisterSpec>,
        sources: RegisterSpecList,
    ) -> Result<Insn, RopError> {
        Insn::build(opcode, position, result, sources, InsnKind::Plain)
    }

    pub fn plain_cst(
        opcode: Rop,
        position: SourcePosition,
        result: Option<RegisterSpec>,
        sources: RegisterSpecList,
        constant: Constant,
    ) -> Result<Insn, RopError> {
        Insn::build(opcode, position, result, sources, InsnKind::PlainCst { constant })
    }

    pub fn throwing(
        opcode: Rop,
        position: SourcePosition,
        sources: RegisterSpecList,
        catches: TypeList,
    ) -> Result<Insn, RopError> {
        Insn::build(opcode, position, None, sources, InsnKind::Throwing { catches })
    }

    pub fn throwing_cst(
        opcode: Rop,
        position: SourcePosition,
        sources: RegisterSpecList,
        catches: TypeList,
        constant: Constant,
    ) -> Result<Insn, RopError> {
        Insn::build(opcode, position, None, sources, InsnKind::ThrowingCst { catches, constant })
    }

    pub fn switch(
        opcode: Rop,
        position: SourcePosition,
        sources: RegisterSpecList,
        cases: Vec<i32>,
    ) -> Result<Insn, RopError> {
        Insn::build(opcode, position, None, sources, InsnKind::Switch { cases })
    }

    pub fn fill_array_data(
        opcode: Rop,
        position: SourcePosition,
        sources: RegisterSpecList,
        values: Vec<Constant>,
        array_type: Type,
    ) -> Result<Insn, RopError> {
        Insn::build(opcode, position, None, sources, InsnKind::FillArrayData { values, array_type })
    }

    /// Fails with `InvalidArgument` unless `call_site_method` is one of
    /// `MethodHandle.invoke`/`invokeExact` or a known `VarHandle` access
    /// mode, and with `UnknownMethod` for any other `VarHandle` method.
    pub fn invoke_polymorphic(
        opcode: Rop,
        position: SourcePosition,
        sources: RegisterSpecList,
        catches: TypeList,
        call_site_method: CstMethodRef,
    ) -> Result<Insn, RopError> {
        let polymorphic_method = polymorphic_method_for(&call_site_method)?;
        let call_site_proto = call_site_method.prototype(true);
        Insn::build(
            opcode,
            position,
            None,
            sources,
            InsnKind::InvokePolymorphic {
                catches,
                call_site_method,
                polymorphic_method,
                call_site_proto,
            },
        )
    }

    pub fn opcode(&self) -> &Rop {
        &self.opcode
    }

    pub fn position(&self) -> &SourcePosition {
        &self.position
    }

    pub fn result(&self) -> Option<&RegisterSpec> {
        self.result.as_ref()
    }

    pub fn sources(&self) -> &RegisterSpecList {
        &self.sources
    }

    pub fn kind(&self) -> &InsnKind {
        &self.kind
    }

    pub fn constant(&self) -> Option<&Constant> {
        match &self.kind {
            InsnKind::PlainCst { constant } | InsnKind::ThrowingCst { constant, .. } => Some(constant),
            _ => None,
        }
    }

    /// Exception types with a handler edge out of this instruction.
    pub fn catches(&self) -> &TypeList {
        match &self.kind {
            InsnKind::Throwing { catches }
            | InsnKind::ThrowingCst { catches, .. }
            | InsnKind::InvokePolymorphic { catches, .. } => catches,
            _ => &NO_CATCHES,
        }
    }

    pub fn can_throw(&self) -> bool {
        self.opcode.can_throw()
    }

    /// The register this instruction assigns a local variable to, if any.
    pub fn local_assignment(&self) -> Option<&RegisterSpec> {
        let assignment = if self.opcode.opcode() == RegOp::MarkLocal {
            self.sources.get(0)
        } else {
            self.result.as_ref()
        };
        assignment.filter(|a| a.local_item().is_some())
    }

    pub fn with_added_catch(&self, t: Type) -> Result<Insn, RopError> {
        let kind = match &self.kind {
            InsnKind::Throwing { catches } => InsnKind::Throwing {
                catches: catches.with_added_type(t),
            },
            InsnKind::ThrowingCst { catches, constant } => InsnKind::ThrowingCst {
                catches: catches.with_added_type(t),
                constant: constant.clone(),
            },
            InsnKind::InvokePolymorphic {
                catches,
                call_site_method,
                polymorphic_method,
                call_site_proto,
            } => InsnKind::InvokePolymorphic {
                catches: catches.with_added_type(t),
                call_site_method: call_site_method.clone(),
                polymorphic_method: polymorphic_method.clone(),
                call_site_proto: call_site_proto.clone(),
            },
            _ => fail!(UnsupportedOperation, "unsupported: catch on {}", self.opcode.nickname()),
        };
        Ok(Insn { kind, ..self.clone() })
    }

    pub fn with_register_offset(&self, table: &RegisterSpecTable, delta: i32) -> Result<Insn, RopError> {
        let result = self.result.as_ref().map(|r| r.with_offset(table, delta)).transpose()?;
        Ok(Insn {
            result,
            sources: self.sources.with_offset(table, delta)?,
            ..self.clone()
        })
    }

    /// Same instruction over different registers. Variants that never
    /// define a result ignore `result`.
    pub fn with_new_registers(
        &self,
        result: Option<RegisterSpec>,
        sources: RegisterSpecList,
    ) -> Result<Insn, RopError> {
        let result = match self.kind {
            InsnKind::Plain | InsnKind::PlainCst { .. } => result,
            _ => None,
        };
        Insn::build(self.opcode.clone(), self.position.clone(), result, sources, self.kind.clone())
    }

    pub fn copy(&self, table: &RegisterSpecTable) -> Result<Insn, RopError> {
        self.with_register_offset(table, 0)
    }

    /// Folds a constant-typed last source into the instruction when a rop
    /// with a constant operand exists for it; a constant first source is
    /// folded only for `sub`, as a reverse subtract. Returns an unchanged
    /// copy when nothing applies.
    pub fn with_source_literal(&self) -> Insn {
        if !matches!(self.kind, InsnKind::Plain) {
            return self.clone();
        }
        let (first, last) = match (self.sources.get(0), self.sources.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return self.clone(),
        };
        let dest = self.result.as_ref().map(RegisterSpec::get_type).unwrap_or(Type::Void);

        if let Some(cst) = last.type_bearer().constant() {
            let new_sources = match self.sources.without_last() {
                Ok(s) => s,
                Err(_) => return self.clone(),
            };
            let mut opcode = self.opcode.opcode();
            let mut cst = cst.clone();
            if let (RegOp::Sub, Constant::Int(v)) = (opcode, &cst) {
                let negated = v.wrapping_neg();
                opcode = RegOp::Add;
                cst = Constant::Int(negated);
            }
            return self.fold_constant(opcode, &dest, new_sources, cst);
        }
        // Only subtraction has a reverse form taking the constant first.
        if self.sources.len() == 2 && self.opcode.opcode() == RegOp::Sub {
            if let Some(cst) = first.type_bearer().constant() {
                let new_sources = match self.sources.without_first() {
                    Ok(s) => s,
                    Err(_) => return self.clone(),
                };
                return self.fold_constant(self.opcode.opcode(), &dest, new_sources, cst.clone());
            }
        }
        self.clone()
    }

    fn fold_constant(&self, opcode: RegOp, dest: &Type, sources: RegisterSpecList, cst: Constant) -> Insn {
        let folded = rops::rop_for(opcode, dest, &sources.to_type_list(), Some(&cst)).and_then(|rop| {
            Insn::plain_cst(rop, self.position.clone(), self.result.clone(), sources, cst)
        });
        match folded {
            Ok(insn) => insn,
            Err(e) => {
                debug!("keeping {}: {}", self.to_human(), e);
                self.clone()
            }
        }
    }

    /// Same rop, position, registers and payload. Unlike a pointer
    /// comparison this also matches copies.
    pub fn content_equals(&self, other: &Insn) -> bool {
        self.opcode == other.opcode
            && self.position == other.position
            && self.result == other.result
            && self.sources == other.sources
            && self.kind == other.kind
    }

    fn inline_string(&self) -> Option<String> {
        match &self.kind {
            InsnKind::Plain => None,
            InsnKind::PlainCst { constant } => Some(constant.to_human()),
            InsnKind::Throwing { catches } => Some(catch_string(catches)),
            InsnKind::ThrowingCst { catches, constant } => {
                Some(format!("{} {}", constant.to_human(), catch_string(catches)))
            }
            InsnKind::Switch { cases } => {
                let cases: Vec<String> = cases.iter().map(i32::to_string).collect();
                Some(format!("{{{}}}", cases.join(", ")))
            }
            InsnKind::FillArrayData { values, array_type } => {
                let values: Vec<String> = values.iter().map(Constant::to_human).collect();
                Some(format!("{} {{{}}}", array_type.to_human(), values.join(", ")))
            }
            InsnKind::InvokePolymorphic {
                catches,
                polymorphic_method,
                call_site_proto,
                ..
            } => Some(format!("{} {} {}", polymorphic_method, call_site_proto, catch_string(catches))),
        }
    }

    /// One-line listing, e.g. `Foo.java:3@0002: add-int v0:I <- v1:I v2:I`.
    pub fn to_human(&self) -> String {
        let mut s = format!("{}: {}", self.position, self.opcode.nickname());
        if let Some(extra) = self.inline_string() {
            s.push_str(&format!("({})", extra));
        }
        match &self.result {
            Some(r) => s.push_str(&format!(" {}", r.to_human())),
            None => s.push_str(" ."),
        }
        s.push_str(" <-");
        if self.sources.is_empty() {
            s.push_str(" .");
        }
        for source in &self.sources {
            s.push(' ');
            s.push_str(&source.to_human());
        }
        s
    }
}

impl fmt::Display for Insn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Insn{{{} {}", self.position, self.opcode)?;
        if let Some(extra) = self.inline_string() {
            write!(f, " {}", extra)?;
        }
        write!(f, " :: ")?;
        if let Some(r) = &self.result {
            write!(f, "{} <- ", r)?;
        }
        write!(f, "{}}}", self.sources)
    }
}

/// Human rendering of a catch list: `catch java.lang.Error ...`.
pub fn catch_string(catches: &TypeList) -> String {
    let mut s = String::from("catch");
    for t in catches {
        s.push(' ');
        s.push_str(&t.to_human());
    }
    s
}

fn polymorphic_method_for(call_site: &CstMethodRef) -> Result<CstMethodRef, RopError> {
    let name = call_site.name.as_str();
    let descriptor = if call_site.defining_class == Type::METHOD_HANDLE {
        if name != "invoke" && name != "invokeExact" {
            fail!(InvalidArgument, "not signature polymorphic: {}", call_site);
        }
        DEFAULT_POLYMORPHIC_DESCRIPTOR
    } else if call_site.defining_class == Type::VAR_HANDLE {
        if VAR_HANDLE_RETURNS_OBJECT.contains(&name) {
            DEFAULT_POLYMORPHIC_DESCRIPTOR
        } else if VAR_HANDLE_RETURNS_VOID.contains(&name) {
            VAR_HANDLE_SET_DESCRIPTOR
        } else if VAR_HANDLE_RETURNS_BOOLEAN.contains(&name) {
            VAR_HANDLE_COMPARE_AND_SET_DESCRIPTOR
        } else {
            return Err(err!(UnknownMethod, "unknown signature polymorphic method: {}", call_site));
        }
    } else {
        fail!(InvalidArgument, "not signature polymorphic: {}", call_site);
    };
    CstMethodRef::new(call_site.defining_class.clone(), name, descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::error::RopErrorKind;
    use crate::code::register_spec::LocalItem;
    use crate::code::rops::*;

    fn pos() -> SourcePosition {
        SourcePosition::new(Some("A.java"), Some(2), Some(3))
    }

    #[test]
    fn plain_construction_rules() {
        let table = RegisterSpecTable::new();
        let v0 = table.make(0, Type::Int);
        let v1 = table.make(1, Type::Int);

        let e = Insn::plain(SWITCH.clone(), pos(), None, RegisterSpecList::of(&[v0.clone()])).unwrap_err();
        assert_eq!(e.kind(), RopErrorKind::InvalidArgument);
        let e = Insn::plain(IF_EQZ_INT.clone(), pos(), Some(v1.clone()), RegisterSpecList::of(&[v0.clone()]))
            .unwrap_err();
        assert_eq!(e.kind(), RopErrorKind::InvalidArgument);

        let add = Insn::plain(ADD_INT.clone(), pos(), Some(v0.clone()), RegisterSpecList::of(&[v0, v1])).unwrap();
        assert!(add.catches().is_empty());
        assert_eq!(add.to_human(), "A.java:3@0002: add-int v0:I <- v0:I v1:I");
        assert_eq!(
            add.to_string(),
            "Insn{A.java:3@0002 Rop{add I <- I I flows} :: v0:I <- {v0:I, v1:I}}"
        );
        let e = add.with_added_catch(Type::THROWABLE).unwrap_err();
        assert_eq!(e.kind(), RopErrorKind::UnsupportedOperation);
    }

    #[test]
    fn throwing_catches() {
        let table = RegisterSpecTable::new();
        let sources = RegisterSpecList::of(&[table.make(0, Type::Int), table.make(1, Type::Int)]);
        let div = Insn::throwing(DIV_INT.clone(), pos(), sources.clone(), TypeList::empty()).unwrap();
        let div = div.with_added_catch(rops::ARITHMETIC_EXCEPTION).unwrap();
        assert_eq!(div.catches(), &TypeList::of(&[rops::ARITHMETIC_EXCEPTION]));
        assert!(div.to_human().contains("(catch java.lang.ArithmeticException)"));
        assert!(div.can_throw());

        assert!(Insn::throwing(ADD_INT.clone(), pos(), sources, TypeList::empty()).is_err());
    }

    #[test]
    fn source_literal_folding() {
        let table = RegisterSpecTable::new();
        let v0 = table.make(0, Type::Int);
        let v1 = table.make(1, Type::Int);
        let k = table.make(2, Constant::Int(5));

        let sub = Insn::plain(SUB_INT.clone(), pos(), Some(v0.clone()), RegisterSpecList::of(&[v1.clone(), k.clone()]))
            .unwrap()
            .with_source_literal();
        assert!(Rop::ptr_eq(sub.opcode(), &ADD_CONST_INT));
        assert_eq!(sub.constant(), Some(&Constant::Int(-5)));
        assert_eq!(sub.sources(), &RegisterSpecList::of(&[v1.clone()]));

        let rsub = Insn::plain(SUB_INT.clone(), pos(), Some(v0.clone()), RegisterSpecList::of(&[k.clone(), v1.clone()]))
            .unwrap()
            .with_source_literal();
        assert!(Rop::ptr_eq(rsub.opcode(), &SUB_CONST_INT));
        assert_eq!(rsub.constant(), Some(&Constant::Int(5)));

        let plain = Insn::plain(ADD_INT.clone(), pos(), Some(v0.clone()), RegisterSpecList::of(&[v0, v1])).unwrap();
        assert!(plain.with_source_literal().content_equals(&plain));
    }

    #[test]
    fn source_literal_keeps_operand_order() {
        let table = RegisterSpecTable::new();
        let v0 = table.make(0, Type::Int);
        let x = table.make(1, Type::Int);
        let k = table.make(2, Constant::Int(3));

        // 3 << x is not x << 3
        let shl = Insn::plain(SHL_INT.clone(), pos(), Some(v0.clone()), RegisterSpecList::of(&[k, x.clone()]))
            .unwrap();
        let same = shl.with_source_literal();
        assert!(same.content_equals(&shl));
        assert_eq!(same.kind(), &InsnKind::Plain);

        let wide = table.make(4, Type::Long);
        let wide_k = table.make(6, Constant::Long(1));
        let cmp = Insn::plain(CMPL_LONG.clone(), pos(), Some(v0.clone()), RegisterSpecList::of(&[wide_k, wide]))
            .unwrap();
        assert!(cmp.with_source_literal().content_equals(&cmp));

        let folded = Insn::plain(
            SHL_INT.clone(),
            pos(),
            Some(v0),
            RegisterSpecList::of(&[x.clone(), table.make(2, Constant::Int(3))]),
        )
        .unwrap()
        .with_source_literal();
        assert!(Rop::ptr_eq(folded.opcode(), &SHL_CONST_INT));
        assert_eq!(folded.sources(), &RegisterSpecList::of(&[x]));
    }

    #[test]
    fn source_literal_falls_back() {
        let table = RegisterSpecTable::new();
        let x = table.make(0, Type::Int);
        let zero = table.make(1, Constant::Int(0));

        // if-eqz-int exists, but a branch cannot carry a constant operand
        let test = Insn::plain(IF_EQ_INT.clone(), pos(), None, RegisterSpecList::of(&[x, zero])).unwrap();
        let same = test.with_source_literal();
        assert!(same.content_equals(&test));
        assert_eq!(same.kind(), &InsnKind::Plain);

        let ret = Insn::plain(
            RETURN_INT.clone(),
            pos(),
            None,
            RegisterSpecList::of(&[table.make(2, Constant::Int(7))]),
        )
        .unwrap();
        assert!(ret.with_source_literal().content_equals(&ret));
    }

    #[test]
    fn register_transforms() {
        let table = RegisterSpecTable::new();
        let insn = Insn::plain(
            MOVE_INT.clone(),
            pos(),
            Some(table.make(0, Type::Int)),
            RegisterSpecList::of(&[table.make(1, Type::Int)]),
        )
        .unwrap();
        let moved = insn.with_register_offset(&table, 4).unwrap();
        assert_eq!(moved.result().map(RegisterSpec::reg), Some(4));
        assert_eq!(moved.sources().get(0).map(RegisterSpec::reg), Some(5));
        assert!(insn.copy(&table).unwrap().content_equals(&insn));
        assert!(!moved.content_equals(&insn));

        let renamed = insn
            .with_new_registers(Some(table.make(7, Type::Int)), RegisterSpecList::of(&[table.make(8, Type::Int)]))
            .unwrap();
        assert_eq!(renamed.result().map(RegisterSpec::reg), Some(7));
    }

    #[test]
    fn local_assignment() {
        let table = RegisterSpecTable::new();
        let x = table.make_local(3, Type::Int, LocalItem::named("x"));
        let mark = Insn::plain(MARK_LOCAL_INT.clone(), pos(), None, RegisterSpecList::of(&[x.clone()])).unwrap();
        assert_eq!(mark.local_assignment(), Some(&x));
        let anon = Insn::plain(
            MOVE_INT.clone(),
            pos(),
            Some(table.make(0, Type::Int)),
            RegisterSpecList::of(&[x]),
        )
        .unwrap();
        assert_eq!(anon.local_assignment(), None);
    }

    #[test]
    fn switches_compare_structurally() {
        let table = RegisterSpecTable::new();
        let sources = RegisterSpecList::of(&[table.make(0, Type::Int)]);
        let a = Insn::switch(SWITCH.clone(), pos(), sources.clone(), vec![1, 2]).unwrap();
        let b = Insn::switch(SWITCH.clone(), pos(), sources.clone(), vec![1, 2]).unwrap();
        let c = Insn::switch(SWITCH.clone(), pos(), sources, vec![1, 3]).unwrap();
        assert!(a.content_equals(&b));
        assert!(!a.content_equals(&c));
        assert_eq!(a.to_human(), "A.java:3@0002: switch({1, 2}) . <- v0:I");
        assert!(a.with_added_catch(Type::THROWABLE).is_err());
    }

    #[test]
    fn fill_array_data() {
        let table = RegisterSpecTable::new();
        let array = table.make(0, Type::Int.array_type());
        let fill = Insn::fill_array_data(
            FILL_ARRAY_DATA.clone(),
            pos(),
            RegisterSpecList::of(&[array]),
            vec![Constant::Int(1), Constant::Int(2)],
            Type::Int.array_type(),
        )
        .unwrap();
        assert!(!fill.can_throw());
        assert_eq!(fill.with_added_catch(Type::THROWABLE).unwrap_err().kind(), RopErrorKind::UnsupportedOperation);
    }

    #[test]
    fn invoke_polymorphic_descriptors() {
        let table = RegisterSpecTable::new();
        let sources = RegisterSpecList::of(&[table.make(0, Type::VAR_HANDLE)]);
        let make = |class: Type, name: &str| {
            let meth = CstMethodRef::new(class, name, "(I)I").unwrap();
            let rop = op_invoke_polymorphic(&meth.prototype(false));
            Insn::invoke_polymorphic(rop, pos(), sources.clone(), TypeList::empty(), meth)
        };

        let get = make(Type::VAR_HANDLE, "get").unwrap();
        match get.kind() {
            InsnKind::InvokePolymorphic { polymorphic_method, call_site_proto, .. } => {
                assert_eq!(polymorphic_method.prototype.descriptor(), "([Ljava/lang/Object;)Ljava/lang/Object;");
                assert_eq!(call_site_proto.descriptor(), "(I)I");
            }
            other => panic!("unexpected {:?}", other),
        }
        let set = make(Type::VAR_HANDLE, "setVolatile").unwrap();
        assert!(set.to_human().contains("([Ljava/lang/Object;)V"));
        let cas = make(Type::VAR_HANDLE, "compareAndSet").unwrap();
        assert!(cas.to_human().contains("([Ljava/lang/Object;)Z"));
        assert!(make(Type::METHOD_HANDLE, "invokeExact").is_ok());

        assert_eq!(make(Type::METHOD_HANDLE, "bindTo").unwrap_err().kind(), RopErrorKind::InvalidArgument);
        assert_eq!(make(Type::VAR_HANDLE, "frob").unwrap_err().kind(), RopErrorKind::UnknownMethod);
        assert_eq!(make(Type::OBJECT, "get").unwrap_err().kind(), RopErrorKind::InvalidArgument);

        let caught = get.with_added_catch(Type::THROWABLE).unwrap();
        assert_eq!(caught.catches().len(), 1);
    }
}
