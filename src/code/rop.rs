use crate::code::error::RopError;
use crate::code::reg_ops::RegOp;
use crate::fail;
use crate::types::{Type, TypeList};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// How an instruction can transfer control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Branchingness {
    /// Falls through to the next instruction.
    None,
    Return,
    Goto,
    If,
    Switch,
    /// May throw; the non-throwing path continues.
    Throw,
}

#[derive(Debug)]
struct RopInner {
    opcode: RegOp,
    result: Type,
    sources: TypeList,
    exceptions: TypeList,
    branchingness: Branchingness,
    is_call_like: bool,
    nickname: Option<String>,
}

/// A typed register operation: an opcode together with its result type,
/// operand types, the exceptions it may throw and how it branches.
///
/// Cloning is cheap; clones share the same underlying value, which lets
/// callers test identity with [`Rop::ptr_eq`]. Equality is structural and
/// ignores the nickname.
#[derive(Clone)]
pub struct Rop(Arc<RopInner>);

impl Rop {
    /// General constructor. Fails if `exceptions` is non-empty while the
    /// branchingness is anything but [`Branchingness::Throw`].
    pub fn new(
        opcode: RegOp,
        result: Type,
        sources: TypeList,
        exceptions: TypeList,
        branchingness: Branchingness,
        is_call_like: bool,
        nickname: Option<&str>,
    ) -> Result<Rop, RopError> {
        if !exceptions.is_empty() && branchingness != Branchingness::Throw {
            fail!(InvalidArgument, "exceptions / branchingness mismatch");
        }
        Ok(Rop::from_parts(opcode, result, sources, exceptions, branchingness, is_call_like, nickname))
    }

    /// Non-throwing, non-call-like rop with the given branchingness.
    pub fn branching(
        opcode: RegOp,
        result: Type,
        sources: TypeList,
        branchingness: Branchingness,
        nickname: Option<&str>,
    ) -> Rop {
        Rop::from_parts(opcode, result, sources, TypeList::empty(), branchingness, false, nickname)
    }

    /// Non-throwing rop that falls through.
    pub fn plain(opcode: RegOp, result: Type, sources: TypeList, nickname: Option<&str>) -> Rop {
        Rop::branching(opcode, result, sources, Branchingness::None, nickname)
    }

    /// Throwing, non-call-like rop.
    pub fn throwing(
        opcode: RegOp,
        result: Type,
        sources: TypeList,
        exceptions: TypeList,
        nickname: Option<&str>,
    ) -> Rop {
        Rop::from_parts(opcode, result, sources, exceptions, Branchingness::Throw, false, nickname)
    }

    /// Call-like rop: no result (it is picked up by a following
    /// `move-result`), always throws, no nickname.
    pub fn call_like(opcode: RegOp, sources: TypeList, exceptions: TypeList) -> Rop {
        Rop::from_parts(opcode, Type::Void, sources, exceptions, Branchingness::Throw, true, None)
    }

    fn from_parts(
        opcode: RegOp,
        result: Type,
        sources: TypeList,
        exceptions: TypeList,
        branchingness: Branchingness,
        is_call_like: bool,
        nickname: Option<&str>,
    ) -> Rop {
        debug_assert!(exceptions.is_empty() || branchingness == Branchingness::Throw);
        Rop(Arc::new(RopInner {
            opcode,
            result,
            sources,
            exceptions,
            branchingness,
            is_call_like,
            nickname: nickname.map(str::to_string),
        }))
    }

    /// True if both handles refer to the same shared instance.
    pub fn ptr_eq(a: &Rop, b: &Rop) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub fn opcode(&self) -> RegOp {
        self.0.opcode
    }

    pub fn result(&self) -> &Type {
        &self.0.result
    }

    pub fn sources(&self) -> &TypeList {
        &self.0.sources
    }

    pub fn exceptions(&self) -> &TypeList {
        &self.0.exceptions
    }

    pub fn branchingness(&self) -> Branchingness {
        self.0.branchingness
    }

    pub fn is_call_like(&self) -> bool {
        self.0.is_call_like
    }

    pub fn can_throw(&self) -> bool {
        !self.0.exceptions.is_empty()
    }

    /// Whether swapping the two sources of a binary form leaves the result
    /// unchanged.
    pub fn is_commutative(&self) -> bool {
        matches!(
            self.0.opcode,
            RegOp::And | RegOp::Or | RegOp::Xor | RegOp::Add | RegOp::Mul
        )
    }

    /// The nickname, or the full rendering if there is none.
    pub fn nickname(&self) -> String {
        match &self.0.nickname {
            Some(n) => n.clone(),
            None => self.to_string(),
        }
    }
}

impl PartialEq for Rop {
    fn eq(&self, other: &Self) -> bool {
        if Rop::ptr_eq(self, other) {
            return true;
        }
        let (a, b) = (&self.0, &other.0);
        a.opcode == b.opcode
            && a.branchingness == b.branchingness
            && a.is_call_like == b.is_call_like
            && a.result == b.result
            && a.sources == b.sources
            && a.exceptions == b.exceptions
    }
}

impl Eq for Rop {}

impl Hash for Rop {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let r = &self.0;
        r.opcode.hash(state);
        r.branchingness.hash(state);
        r.is_call_like.hash(state);
        r.result.hash(state);
        r.sources.hash(state);
        r.exceptions.hash(state);
    }
}

impl fmt::Display for Rop {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let r = &self.0;
        write!(f, "Rop{{{}", r.opcode.name())?;
        if r.result.is_void() {
            write!(f, " .")?;
        } else {
            write!(f, " {}", r.result)?;
        }
        write!(f, " <-")?;
        if r.sources.is_empty() {
            write!(f, " .")?;
        } else {
            for t in &r.sources {
                write!(f, " {}", t)?;
            }
        }
        if r.is_call_like {
            write!(f, " call")?;
        }
        if !r.exceptions.is_empty() {
            write!(f, " throws")?;
            for t in &r.exceptions {
                if *t == Type::THROWABLE {
                    write!(f, " <any>")?;
                } else {
                    write!(f, " {}", t)?;
                }
            }
        } else {
            let s = match r.branchingness {
                Branchingness::None => " flows",
                Branchingness::Return => " returns",
                Branchingness::Goto => " gotos",
                Branchingness::If => " ifs",
                Branchingness::Switch => " switches",
                Branchingness::Throw => " throws",
            };
            write!(f, "{}", s)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Debug for Rop {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::error::RopErrorKind;

    #[test]
    fn exceptions_require_throw() {
        let e = Rop::new(
            RegOp::Div,
            Type::Int,
            TypeList::of(&[Type::Int, Type::Int]),
            TypeList::of(&[Type::THROWABLE]),
            Branchingness::None,
            false,
            None,
        )
        .unwrap_err();
        assert_eq!(e.kind(), RopErrorKind::InvalidArgument);

        let always_throws = Rop::new(
            RegOp::Throw,
            Type::Void,
            TypeList::of(&[Type::THROWABLE]),
            TypeList::empty(),
            Branchingness::Throw,
            false,
            Some("throw"),
        );
        assert!(always_throws.is_ok());
    }

    #[test]
    fn equality_ignores_nickname() {
        let a = Rop::plain(RegOp::Add, Type::Int, TypeList::of(&[Type::Int, Type::Int]), Some("add-int"));
        let b = Rop::plain(RegOp::Add, Type::Int, TypeList::of(&[Type::Int, Type::Int]), None);
        assert_eq!(a, b);
        assert!(!Rop::ptr_eq(&a, &b));
        assert_eq!(a.nickname(), "add-int");
        assert_eq!(b.nickname(), "Rop{add I <- I I flows}");
    }

    #[test]
    fn rendering() {
        let call = Rop::call_like(
            RegOp::InvokeStatic,
            TypeList::of(&[Type::Int]),
            TypeList::of(&[Type::THROWABLE]),
        );
        assert_eq!(call.to_string(), "Rop{invoke-static . <- I call throws <any>}");
        let goto = Rop::branching(RegOp::Goto, Type::Void, TypeList::empty(), Branchingness::Goto, None);
        assert_eq!(goto.to_string(), "Rop{goto . <- . gotos}");
        assert!(call.can_throw());
        assert!(!goto.can_throw());
    }

    #[test]
    fn commutative_ops() {
        for (op, c) in [(RegOp::Add, true), (RegOp::Mul, true), (RegOp::Xor, true), (RegOp::Sub, false), (RegOp::Shl, false)] {
            let r = Rop::plain(op, Type::Int, TypeList::of(&[Type::Int, Type::Int]), None);
            assert_eq!(r.is_commutative(), c, "{}", op);
        }
    }
}
