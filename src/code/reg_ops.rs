use serde::{Deserialize, Serialize};
use std::fmt;

/// Untyped register operations. A [`Rop`](crate::code::rop::Rop) pairs one
/// of these with concrete operand types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum RegOp {
    /// `nop()`
    Nop = 1,
    /// `T: any type; r,x: T :: r = x;`
    Move = 2,
    /// `T: any type; r,param(x): T :: r = param(x)`
    MoveParam = 3,
    /// `T: Throwable; r: T :: r = caught_exception`. Only valid as the
    /// first instruction of a block.
    MoveException = 4,
    /// `T: any type; r: T; c: const<T> :: r = c`
    Const = 5,
    /// `goto label`
    Goto = 6,
    IfEq = 7,
    IfNe = 8,
    IfLt = 9,
    IfGe = 10,
    IfLe = 11,
    IfGt = 12,
    /// `x: int :: goto table[x]`
    Switch = 13,
    Add = 14,
    Sub = 15,
    Mul = 16,
    Div = 17,
    Rem = 18,
    Neg = 19,
    And = 20,
    Or = 21,
    Xor = 22,
    Shl = 23,
    Shr = 24,
    Ushr = 25,
    Not = 26,
    /// Compare with "less" bias for NaN.
    Cmpl = 27,
    /// Compare with "greater" bias for NaN.
    Cmpg = 28,
    Conv = 29,
    ToByte = 30,
    ToChar = 31,
    ToShort = 32,
    Return = 33,
    ArrayLength = 34,
    Throw = 35,
    MonitorEnter = 36,
    MonitorExit = 37,
    Aget = 38,
    Aput = 39,
    NewInstance = 40,
    NewArray = 41,
    FilledNewArray = 42,
    CheckCast = 43,
    InstanceOf = 44,
    GetField = 45,
    GetStatic = 46,
    PutField = 47,
    PutStatic = 48,
    InvokeStatic = 49,
    InvokeVirtual = 50,
    InvokeSuper = 51,
    InvokeDirect = 52,
    InvokeInterface = 53,
    /// Pseudo-op marking the start of a local variable's scope.
    MarkLocal = 54,
    /// Fetches the result of the preceding invoke.
    MoveResult = 55,
    /// Fetches the result of the preceding non-invoke throwing insn.
    MoveResultPseudo = 56,
    FillArrayData = 57,
    InvokePolymorphic = 58,
    InvokeCustom = 59,
}

impl RegOp {
    pub const MIN_VALUE: u8 = RegOp::Nop as u8;
    pub const MAX_VALUE: u8 = RegOp::InvokeCustom as u8;

    pub fn name(self) -> &'static str {
        match self {
            RegOp::Nop => "nop",
            RegOp::Move => "move",
            RegOp::MoveParam => "move-param",
            RegOp::MoveException => "move-exception",
            RegOp::Const => "const",
            RegOp::Goto => "goto",
            RegOp::IfEq => "if-eq",
            RegOp::IfNe => "if-ne",
            RegOp::IfLt => "if-lt",
            RegOp::IfGe => "if-ge",
            RegOp::IfLe => "if-le",
            RegOp::IfGt => "if-gt",
            RegOp::Switch => "switch",
            RegOp::Add => "add",
            RegOp::Sub => "sub",
            RegOp::Mul => "mul",
            RegOp::Div => "div",
            RegOp::Rem => "rem",
            RegOp::Neg => "neg",
            RegOp::And => "and",
            RegOp::Or => "or",
            RegOp::Xor => "xor",
            RegOp::Shl => "shl",
            RegOp::Shr => "shr",
            RegOp::Ushr => "ushr",
            RegOp::Not => "not",
            RegOp::Cmpl => "cmpl",
            RegOp::Cmpg => "cmpg",
            RegOp::Conv => "conv",
            RegOp::ToByte => "to-byte",
            RegOp::ToChar => "to-char",
            RegOp::ToShort => "to-short",
            RegOp::Return => "return",
            RegOp::ArrayLength => "array-length",
            RegOp::Throw => "throw",
            RegOp::MonitorEnter => "monitor-enter",
            RegOp::MonitorExit => "monitor-exit",
            RegOp::Aget => "aget",
            RegOp::Aput => "aput",
            RegOp::NewInstance => "new-instance",
            RegOp::NewArray => "new-array",
            RegOp::FilledNewArray => "filled-new-array",
            RegOp::CheckCast => "check-cast",
            RegOp::InstanceOf => "instance-of",
            RegOp::GetField => "get-field",
            RegOp::GetStatic => "get-static",
            RegOp::PutField => "put-field",
            RegOp::PutStatic => "put-static",
            RegOp::InvokeStatic => "invoke-static",
            RegOp::InvokeVirtual => "invoke-virtual",
            RegOp::InvokeSuper => "invoke-super",
            RegOp::InvokeDirect => "invoke-direct",
            RegOp::InvokeInterface => "invoke-interface",
            RegOp::MarkLocal => "mark-local",
            RegOp::MoveResult => "move-result",
            RegOp::MoveResultPseudo => "move-result-pseudo",
            RegOp::FillArrayData => "fill-array-data",
            RegOp::InvokePolymorphic => "invoke-polymorphic",
            RegOp::InvokeCustom => "invoke-custom",
        }
    }

    /// The `if` that tests the same condition with its operands swapped.
    /// Returns `None` for anything that isn't an `if`.
    pub fn flipped_if(self) -> Option<RegOp> {
        match self {
            RegOp::IfEq | RegOp::IfNe => Some(self),
            RegOp::IfLt => Some(RegOp::IfGt),
            RegOp::IfGe => Some(RegOp::IfLe),
            RegOp::IfLe => Some(RegOp::IfGe),
            RegOp::IfGt => Some(RegOp::IfLt),
            _ => None,
        }
    }

    pub fn is_if(self) -> bool {
        matches!(
            self,
            RegOp::IfEq | RegOp::IfNe | RegOp::IfLt | RegOp::IfGe | RegOp::IfLe | RegOp::IfGt
        )
    }

    pub fn is_invoke(self) -> bool {
        matches!(
            self,
            RegOp::InvokeStatic
                | RegOp::InvokeVirtual
                | RegOp::InvokeSuper
                | RegOp::InvokeDirect
                | RegOp::InvokeInterface
                | RegOp::InvokePolymorphic
                | RegOp::InvokeCustom
        )
    }
}

impl fmt::Display for RegOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flipped_ifs() {
        assert_eq!(RegOp::IfEq.flipped_if(), Some(RegOp::IfEq));
        assert_eq!(RegOp::IfNe.flipped_if(), Some(RegOp::IfNe));
        assert_eq!(RegOp::IfLt.flipped_if(), Some(RegOp::IfGt));
        assert_eq!(RegOp::IfGt.flipped_if(), Some(RegOp::IfLt));
        assert_eq!(RegOp::IfGe.flipped_if(), Some(RegOp::IfLe));
        assert_eq!(RegOp::IfLe.flipped_if(), Some(RegOp::IfGe));
        assert_eq!(RegOp::Add.flipped_if(), None);
    }

    #[test]
    fn names_and_range() {
        assert_eq!(RegOp::MoveResultPseudo.name(), "move-result-pseudo");
        assert_eq!(RegOp::IfGe.to_string(), "if-ge");
        assert_eq!(RegOp::MIN_VALUE, 1);
        assert_eq!(RegOp::MAX_VALUE, 59);
        assert!(RegOp::InvokeCustom.is_invoke());
        assert!(!RegOp::FilledNewArray.is_invoke());
    }
}
