//! The catalog of canonical typed rops and the dispatch from an untyped
//! [`RegOp`] plus operand types to one of them.
//!
//! Catalog entries are process-wide statics, so a lookup that lands on a
//! catalog rop always hands back a handle to the same instance:
//!
//! ```
//!  use rop::code::reg_ops::RegOp;
//!  use rop::code::rop::Rop;
//!  use rop::code::rops::{rop_for, ADD_INT};
//!  use rop::types::{Type, TypeList};
//!
//!  let sources = TypeList::of(&[Type::Int, Type::Int]);
//!  let r = rop_for(RegOp::Add, &Type::Int, &sources, None).unwrap();
//!  assert!(Rop::ptr_eq(&r, &*ADD_INT));
//! ```

use crate::code::error::RopError;
use crate::code::reg_ops::RegOp;
use crate::code::rop::{Branchingness, Rop};
use crate::cst::Constant;
use crate::types::{BasicType, Prototype, Type, TypeList};
use crate::err;
use once_cell::sync::Lazy;
use std::borrow::Cow;

pub const ERROR: Type = Type::Object(Cow::Borrowed("java/lang/Error"));
pub const ARITHMETIC_EXCEPTION: Type = Type::Object(Cow::Borrowed("java/lang/ArithmeticException"));
pub const ARRAY_INDEX_OUT_OF_BOUNDS_EXCEPTION: Type =
    Type::Object(Cow::Borrowed("java/lang/ArrayIndexOutOfBoundsException"));
pub const ARRAY_STORE_EXCEPTION: Type = Type::Object(Cow::Borrowed("java/lang/ArrayStoreException"));
pub const CLASS_CAST_EXCEPTION: Type = Type::Object(Cow::Borrowed("java/lang/ClassCastException"));
pub const ILLEGAL_MONITOR_STATE_EXCEPTION: Type =
    Type::Object(Cow::Borrowed("java/lang/IllegalMonitorStateException"));
pub const NEGATIVE_ARRAY_SIZE_EXCEPTION: Type =
    Type::Object(Cow::Borrowed("java/lang/NegativeArraySizeException"));
pub const NULL_POINTER_EXCEPTION: Type = Type::Object(Cow::Borrowed("java/lang/NullPointerException"));

// Standard exception lists
pub static LIST_ERROR: Lazy<TypeList> = Lazy::new(|| TypeList::of(&[ERROR]));
pub static LIST_ERROR_ARITHMETIC_EXCEPTION: Lazy<TypeList> =
    Lazy::new(|| TypeList::of(&[ERROR, ARITHMETIC_EXCEPTION]));
pub static LIST_ERROR_CLASS_CAST_EXCEPTION: Lazy<TypeList> =
    Lazy::new(|| TypeList::of(&[ERROR, CLASS_CAST_EXCEPTION]));
pub static LIST_ERROR_NEGATIVE_ARRAY_SIZE_EXCEPTION: Lazy<TypeList> =
    Lazy::new(|| TypeList::of(&[ERROR, NEGATIVE_ARRAY_SIZE_EXCEPTION]));
pub static LIST_ERROR_NULL_POINTER_EXCEPTION: Lazy<TypeList> =
    Lazy::new(|| TypeList::of(&[ERROR, NULL_POINTER_EXCEPTION]));
pub static LIST_ERROR_NULL_ILLEGAL_MONITOR_STATE_EXCEPTION: Lazy<TypeList> =
    Lazy::new(|| TypeList::of(&[ERROR, NULL_POINTER_EXCEPTION, ILLEGAL_MONITOR_STATE_EXCEPTION]));
pub static LIST_ERROR_NULL_ARRAY_INDEX_OUT_OF_BOUNDS: Lazy<TypeList> = Lazy::new(|| {
    TypeList::of(&[ERROR, NULL_POINTER_EXCEPTION, ARRAY_INDEX_OUT_OF_BOUNDS_EXCEPTION])
});
pub static LIST_ERROR_NULL_ARRAY_INDEX_ARRAY_STORE: Lazy<TypeList> = Lazy::new(|| {
    TypeList::of(&[
        ERROR,
        NULL_POINTER_EXCEPTION,
        ARRAY_INDEX_OUT_OF_BOUNDS_EXCEPTION,
        ARRAY_STORE_EXCEPTION,
    ])
});
pub static LIST_THROWABLE: Lazy<TypeList> = Lazy::new(|| TypeList::of(&[Type::THROWABLE]));

macro_rules! plain_rop {
    ($name:ident, $op:ident, $result:expr, [$($src:expr),*], $nick:literal) => {
        pub static $name: Lazy<Rop> = Lazy::new(|| {
            Rop::plain(RegOp::$op, $result, TypeList::new(vec![$($src),*]), Some($nick))
        });
    };
}

macro_rules! branch_rop {
    ($name:ident, $op:ident, [$($src:expr),*], $branch:ident, $nick:literal) => {
        pub static $name: Lazy<Rop> = Lazy::new(|| {
            Rop::branching(
                RegOp::$op,
                Type::Void,
                TypeList::new(vec![$($src),*]),
                Branchingness::$branch,
                Some($nick),
            )
        });
    };
}

macro_rules! throwing_rop {
    ($name:ident, $op:ident, $result:expr, [$($src:expr),*], $exc:ident, $nick:literal) => {
        pub static $name: Lazy<Rop> = Lazy::new(|| {
            Rop::throwing(RegOp::$op, $result, TypeList::new(vec![$($src),*]), $exc.clone(), Some($nick))
        });
    };
}

fn obj() -> Type {
    Type::OBJECT
}

fn arr(t: Type) -> Type {
    t.array_type()
}

plain_rop!(NOP, Nop, Type::Void, [], "nop");

plain_rop!(MOVE_INT, Move, Type::Int, [Type::Int], "move-int");
plain_rop!(MOVE_LONG, Move, Type::Long, [Type::Long], "move-long");
plain_rop!(MOVE_FLOAT, Move, Type::Float, [Type::Float], "move-float");
plain_rop!(MOVE_DOUBLE, Move, Type::Double, [Type::Double], "move-double");
plain_rop!(MOVE_OBJECT, Move, obj(), [obj()], "move-object");
plain_rop!(MOVE_RETURN_ADDRESS, Move, Type::ReturnAddress, [Type::ReturnAddress], "move-return-address");

plain_rop!(MOVE_PARAM_INT, MoveParam, Type::Int, [], "move-param-int");
plain_rop!(MOVE_PARAM_LONG, MoveParam, Type::Long, [], "move-param-long");
plain_rop!(MOVE_PARAM_FLOAT, MoveParam, Type::Float, [], "move-param-float");
plain_rop!(MOVE_PARAM_DOUBLE, MoveParam, Type::Double, [], "move-param-double");
plain_rop!(MOVE_PARAM_OBJECT, MoveParam, obj(), [], "move-param-object");

plain_rop!(CONST_INT, Const, Type::Int, [], "const-int");
plain_rop!(CONST_LONG, Const, Type::Long, [], "const-long");
plain_rop!(CONST_FLOAT, Const, Type::Float, [], "const-float");
plain_rop!(CONST_DOUBLE, Const, Type::Double, [], "const-double");
throwing_rop!(CONST_OBJECT, Const, obj(), [], LIST_ERROR, "const-object");
plain_rop!(CONST_OBJECT_NOTHROW, Const, obj(), [], "const-object-nothrow");

branch_rop!(GOTO, Goto, [], Goto, "goto");

branch_rop!(IF_EQZ_INT, IfEq, [Type::Int], If, "if-eqz-int");
branch_rop!(IF_NEZ_INT, IfNe, [Type::Int], If, "if-nez-int");
branch_rop!(IF_LTZ_INT, IfLt, [Type::Int], If, "if-ltz-int");
branch_rop!(IF_GEZ_INT, IfGe, [Type::Int], If, "if-gez-int");
branch_rop!(IF_LEZ_INT, IfLe, [Type::Int], If, "if-lez-int");
branch_rop!(IF_GTZ_INT, IfGt, [Type::Int], If, "if-gtz-int");
branch_rop!(IF_EQZ_OBJECT, IfEq, [obj()], If, "if-eqz-object");
branch_rop!(IF_NEZ_OBJECT, IfNe, [obj()], If, "if-nez-object");
branch_rop!(IF_EQ_INT, IfEq, [Type::Int, Type::Int], If, "if-eq-int");
branch_rop!(IF_NE_INT, IfNe, [Type::Int, Type::Int], If, "if-ne-int");
branch_rop!(IF_LT_INT, IfLt, [Type::Int, Type::Int], If, "if-lt-int");
branch_rop!(IF_GE_INT, IfGe, [Type::Int, Type::Int], If, "if-ge-int");
branch_rop!(IF_LE_INT, IfLe, [Type::Int, Type::Int], If, "if-le-int");
branch_rop!(IF_GT_INT, IfGt, [Type::Int, Type::Int], If, "if-gt-int");
branch_rop!(IF_EQ_OBJECT, IfEq, [obj(), obj()], If, "if-eq-object");
branch_rop!(IF_NE_OBJECT, IfNe, [obj(), obj()], If, "if-ne-object");

branch_rop!(SWITCH, Switch, [Type::Int], Switch, "switch");

plain_rop!(ADD_INT, Add, Type::Int, [Type::Int, Type::Int], "add-int");
plain_rop!(ADD_LONG, Add, Type::Long, [Type::Long, Type::Long], "add-long");
plain_rop!(ADD_FLOAT, Add, Type::Float, [Type::Float, Type::Float], "add-float");
plain_rop!(ADD_DOUBLE, Add, Type::Double, [Type::Double, Type::Double], "add-double");
plain_rop!(SUB_INT, Sub, Type::Int, [Type::Int, Type::Int], "sub-int");
plain_rop!(SUB_LONG, Sub, Type::Long, [Type::Long, Type::Long], "sub-long");
plain_rop!(SUB_FLOAT, Sub, Type::Float, [Type::Float, Type::Float], "sub-float");
plain_rop!(SUB_DOUBLE, Sub, Type::Double, [Type::Double, Type::Double], "sub-double");
plain_rop!(MUL_INT, Mul, Type::Int, [Type::Int, Type::Int], "mul-int");
plain_rop!(MUL_LONG, Mul, Type::Long, [Type::Long, Type::Long], "mul-long");
plain_rop!(MUL_FLOAT, Mul, Type::Float, [Type::Float, Type::Float], "mul-float");
plain_rop!(MUL_DOUBLE, Mul, Type::Double, [Type::Double, Type::Double], "mul-double");
throwing_rop!(DIV_INT, Div, Type::Int, [Type::Int, Type::Int], LIST_ERROR_ARITHMETIC_EXCEPTION, "div-int");
throwing_rop!(DIV_LONG, Div, Type::Long, [Type::Long, Type::Long], LIST_ERROR_ARITHMETIC_EXCEPTION, "div-long");
plain_rop!(DIV_FLOAT, Div, Type::Float, [Type::Float, Type::Float], "div-float");
plain_rop!(DIV_DOUBLE, Div, Type::Double, [Type::Double, Type::Double], "div-double");
throwing_rop!(REM_INT, Rem, Type::Int, [Type::Int, Type::Int], LIST_ERROR_ARITHMETIC_EXCEPTION, "rem-int");
throwing_rop!(REM_LONG, Rem, Type::Long, [Type::Long, Type::Long], LIST_ERROR_ARITHMETIC_EXCEPTION, "rem-long");
plain_rop!(REM_FLOAT, Rem, Type::Float, [Type::Float, Type::Float], "rem-float");
plain_rop!(REM_DOUBLE, Rem, Type::Double, [Type::Double, Type::Double], "rem-double");
plain_rop!(NEG_INT, Neg, Type::Int, [Type::Int], "neg-int");
plain_rop!(NEG_LONG, Neg, Type::Long, [Type::Long], "neg-long");
plain_rop!(NEG_FLOAT, Neg, Type::Float, [Type::Float], "neg-float");
plain_rop!(NEG_DOUBLE, Neg, Type::Double, [Type::Double], "neg-double");
plain_rop!(AND_INT, And, Type::Int, [Type::Int, Type::Int], "and-int");
plain_rop!(AND_LONG, And, Type::Long, [Type::Long, Type::Long], "and-long");
plain_rop!(OR_INT, Or, Type::Int, [Type::Int, Type::Int], "or-int");
plain_rop!(OR_LONG, Or, Type::Long, [Type::Long, Type::Long], "or-long");
plain_rop!(XOR_INT, Xor, Type::Int, [Type::Int, Type::Int], "xor-int");
plain_rop!(XOR_LONG, Xor, Type::Long, [Type::Long, Type::Long], "xor-long");
plain_rop!(SHL_INT, Shl, Type::Int, [Type::Int, Type::Int], "shl-int");
plain_rop!(SHL_LONG, Shl, Type::Long, [Type::Long, Type::Int], "shl-long");
plain_rop!(SHR_INT, Shr, Type::Int, [Type::Int, Type::Int], "shr-int");
plain_rop!(SHR_LONG, Shr, Type::Long, [Type::Long, Type::Int], "shr-long");
plain_rop!(USHR_INT, Ushr, Type::Int, [Type::Int, Type::Int], "ushr-int");
plain_rop!(USHR_LONG, Ushr, Type::Long, [Type::Long, Type::Int], "ushr-long");
plain_rop!(NOT_INT, Not, Type::Int, [Type::Int], "not-int");
plain_rop!(NOT_LONG, Not, Type::Long, [Type::Long], "not-long");

// Forms taking one register and an implicit constant.
plain_rop!(ADD_CONST_INT, Add, Type::Int, [Type::Int], "add-const-int");
plain_rop!(ADD_CONST_LONG, Add, Type::Long, [Type::Long], "add-const-long");
plain_rop!(ADD_CONST_FLOAT, Add, Type::Float, [Type::Float], "add-const-float");
plain_rop!(ADD_CONST_DOUBLE, Add, Type::Double, [Type::Double], "add-const-double");
plain_rop!(SUB_CONST_INT, Sub, Type::Int, [Type::Int], "sub-const-int");
plain_rop!(SUB_CONST_LONG, Sub, Type::Long, [Type::Long], "sub-const-long");
plain_rop!(SUB_CONST_FLOAT, Sub, Type::Float, [Type::Float], "sub-const-float");
plain_rop!(SUB_CONST_DOUBLE, Sub, Type::Double, [Type::Double], "sub-const-double");
plain_rop!(MUL_CONST_INT, Mul, Type::Int, [Type::Int], "mul-const-int");
plain_rop!(MUL_CONST_LONG, Mul, Type::Long, [Type::Long], "mul-const-long");
plain_rop!(MUL_CONST_FLOAT, Mul, Type::Float, [Type::Float], "mul-const-float");
plain_rop!(MUL_CONST_DOUBLE, Mul, Type::Double, [Type::Double], "mul-const-double");
throwing_rop!(DIV_CONST_INT, Div, Type::Int, [Type::Int], LIST_ERROR_ARITHMETIC_EXCEPTION, "div-const-int");
throwing_rop!(DIV_CONST_LONG, Div, Type::Long, [Type::Long], LIST_ERROR_ARITHMETIC_EXCEPTION, "div-const-long");
plain_rop!(DIV_CONST_FLOAT, Div, Type::Float, [Type::Float], "div-const-float");
plain_rop!(DIV_CONST_DOUBLE, Div, Type::Double, [Type::Double], "div-const-double");
throwing_rop!(REM_CONST_INT, Rem, Type::Int, [Type::Int], LIST_ERROR_ARITHMETIC_EXCEPTION, "rem-const-int");
throwing_rop!(REM_CONST_LONG, Rem, Type::Long, [Type::Long], LIST_ERROR_ARITHMETIC_EXCEPTION, "rem-const-long");
plain_rop!(REM_CONST_FLOAT, Rem, Type::Float, [Type::Float], "rem-const-float");
plain_rop!(REM_CONST_DOUBLE, Rem, Type::Double, [Type::Double], "rem-const-double");
plain_rop!(AND_CONST_INT, And, Type::Int, [Type::Int], "and-const-int");
plain_rop!(AND_CONST_LONG, And, Type::Long, [Type::Long], "and-const-long");
plain_rop!(OR_CONST_INT, Or, Type::Int, [Type::Int], "or-const-int");
plain_rop!(OR_CONST_LONG, Or, Type::Long, [Type::Long], "or-const-long");
plain_rop!(XOR_CONST_INT, Xor, Type::Int, [Type::Int], "xor-const-int");
plain_rop!(XOR_CONST_LONG, Xor, Type::Long, [Type::Long], "xor-const-long");
plain_rop!(SHL_CONST_INT, Shl, Type::Int, [Type::Int], "shl-const-int");
plain_rop!(SHL_CONST_LONG, Shl, Type::Long, [Type::Int], "shl-const-long");
plain_rop!(SHR_CONST_INT, Shr, Type::Int, [Type::Int], "shr-const-int");
plain_rop!(SHR_CONST_LONG, Shr, Type::Long, [Type::Int], "shr-const-long");
plain_rop!(USHR_CONST_INT, Ushr, Type::Int, [Type::Int], "ushr-const-int");
plain_rop!(USHR_CONST_LONG, Ushr, Type::Long, [Type::Int], "ushr-const-long");

plain_rop!(CMPL_LONG, Cmpl, Type::Int, [Type::Long, Type::Long], "cmpl-long");
plain_rop!(CMPL_FLOAT, Cmpl, Type::Int, [Type::Float, Type::Float], "cmpl-float");
plain_rop!(CMPL_DOUBLE, Cmpl, Type::Int, [Type::Double, Type::Double], "cmpl-double");
plain_rop!(CMPG_FLOAT, Cmpg, Type::Int, [Type::Float, Type::Float], "cmpg-float");
plain_rop!(CMPG_DOUBLE, Cmpg, Type::Int, [Type::Double, Type::Double], "cmpg-double");

plain_rop!(CONV_L2I, Conv, Type::Int, [Type::Long], "conv-l2i");
plain_rop!(CONV_F2I, Conv, Type::Int, [Type::Float], "conv-f2i");
plain_rop!(CONV_D2I, Conv, Type::Int, [Type::Double], "conv-d2i");
plain_rop!(CONV_I2L, Conv, Type::Long, [Type::Int], "conv-i2l");
plain_rop!(CONV_F2L, Conv, Type::Long, [Type::Float], "conv-f2l");
plain_rop!(CONV_D2L, Conv, Type::Long, [Type::Double], "conv-d2l");
plain_rop!(CONV_I2F, Conv, Type::Float, [Type::Int], "conv-i2f");
plain_rop!(CONV_L2F, Conv, Type::Float, [Type::Long], "conv-l2f");
plain_rop!(CONV_D2F, Conv, Type::Float, [Type::Double], "conv-d2f");
plain_rop!(CONV_I2D, Conv, Type::Double, [Type::Int], "conv-i2d");
plain_rop!(CONV_L2D, Conv, Type::Double, [Type::Long], "conv-l2d");
plain_rop!(CONV_F2D, Conv, Type::Double, [Type::Float], "conv-f2d");

plain_rop!(TO_BYTE, ToByte, Type::Int, [Type::Int], "to-byte");
plain_rop!(TO_CHAR, ToChar, Type::Int, [Type::Int], "to-char");
plain_rop!(TO_SHORT, ToShort, Type::Int, [Type::Int], "to-short");

branch_rop!(RETURN_VOID, Return, [], Return, "return-void");
branch_rop!(RETURN_INT, Return, [Type::Int], Return, "return-int");
branch_rop!(RETURN_LONG, Return, [Type::Long], Return, "return-long");
branch_rop!(RETURN_FLOAT, Return, [Type::Float], Return, "return-float");
branch_rop!(RETURN_DOUBLE, Return, [Type::Double], Return, "return-double");
branch_rop!(RETURN_OBJECT, Return, [obj()], Return, "return-object");

throwing_rop!(ARRAY_LENGTH, ArrayLength, Type::Int, [obj()], LIST_ERROR_NULL_POINTER_EXCEPTION, "array-length");
throwing_rop!(THROW, Throw, Type::Void, [Type::THROWABLE], LIST_THROWABLE, "throw");
throwing_rop!(MONITOR_ENTER, MonitorEnter, Type::Void, [obj()], LIST_ERROR_NULL_POINTER_EXCEPTION, "monitor-enter");
throwing_rop!(
    MONITOR_EXIT,
    MonitorExit,
    Type::Void,
    [obj()],
    LIST_ERROR_NULL_ILLEGAL_MONITOR_STATE_EXCEPTION,
    "monitor-exit"
);

throwing_rop!(AGET_INT, Aget, Type::Int, [arr(Type::Int), Type::Int], LIST_ERROR_NULL_ARRAY_INDEX_OUT_OF_BOUNDS, "aget-int");
throwing_rop!(AGET_LONG, Aget, Type::Long, [arr(Type::Long), Type::Int], LIST_ERROR_NULL_ARRAY_INDEX_OUT_OF_BOUNDS, "aget-long");
throwing_rop!(AGET_FLOAT, Aget, Type::Float, [arr(Type::Float), Type::Int], LIST_ERROR_NULL_ARRAY_INDEX_OUT_OF_BOUNDS, "aget-float");
throwing_rop!(AGET_DOUBLE, Aget, Type::Double, [arr(Type::Double), Type::Int], LIST_ERROR_NULL_ARRAY_INDEX_OUT_OF_BOUNDS, "aget-double");
throwing_rop!(AGET_OBJECT, Aget, obj(), [arr(obj()), Type::Int], LIST_ERROR_NULL_ARRAY_INDEX_OUT_OF_BOUNDS, "aget-object");
throwing_rop!(AGET_BOOLEAN, Aget, Type::Int, [arr(Type::Boolean), Type::Int], LIST_ERROR_NULL_ARRAY_INDEX_OUT_OF_BOUNDS, "aget-boolean");
throwing_rop!(AGET_BYTE, Aget, Type::Int, [arr(Type::Byte), Type::Int], LIST_ERROR_NULL_ARRAY_INDEX_OUT_OF_BOUNDS, "aget-byte");
throwing_rop!(AGET_CHAR, Aget, Type::Int, [arr(Type::Char), Type::Int], LIST_ERROR_NULL_ARRAY_INDEX_OUT_OF_BOUNDS, "aget-char");
throwing_rop!(AGET_SHORT, Aget, Type::Int, [arr(Type::Short), Type::Int], LIST_ERROR_NULL_ARRAY_INDEX_OUT_OF_BOUNDS, "aget-short");

// aput sources are (value, array, index)
throwing_rop!(APUT_INT, Aput, Type::Void, [Type::Int, arr(Type::Int), Type::Int], LIST_ERROR_NULL_ARRAY_INDEX_OUT_OF_BOUNDS, "aput-int");
throwing_rop!(APUT_LONG, Aput, Type::Void, [Type::Long, arr(Type::Long), Type::Int], LIST_ERROR_NULL_ARRAY_INDEX_OUT_OF_BOUNDS, "aput-long");
throwing_rop!(APUT_FLOAT, Aput, Type::Void, [Type::Float, arr(Type::Float), Type::Int], LIST_ERROR_NULL_ARRAY_INDEX_OUT_OF_BOUNDS, "aput-float");
throwing_rop!(APUT_DOUBLE, Aput, Type::Void, [Type::Double, arr(Type::Double), Type::Int], LIST_ERROR_NULL_ARRAY_INDEX_OUT_OF_BOUNDS, "aput-double");
throwing_rop!(APUT_OBJECT, Aput, Type::Void, [obj(), arr(obj()), Type::Int], LIST_ERROR_NULL_ARRAY_INDEX_ARRAY_STORE, "aput-object");
throwing_rop!(APUT_BOOLEAN, Aput, Type::Void, [Type::Int, arr(Type::Boolean), Type::Int], LIST_ERROR_NULL_ARRAY_INDEX_ARRAY_STORE, "aput-boolean");
throwing_rop!(APUT_BYTE, Aput, Type::Void, [Type::Int, arr(Type::Byte), Type::Int], LIST_ERROR_NULL_ARRAY_INDEX_ARRAY_STORE, "aput-byte");
throwing_rop!(APUT_CHAR, Aput, Type::Void, [Type::Int, arr(Type::Char), Type::Int], LIST_ERROR_NULL_ARRAY_INDEX_ARRAY_STORE, "aput-char");
throwing_rop!(APUT_SHORT, Aput, Type::Void, [Type::Int, arr(Type::Short), Type::Int], LIST_ERROR_NULL_ARRAY_INDEX_ARRAY_STORE, "aput-short");

throwing_rop!(NEW_INSTANCE, NewInstance, obj(), [], LIST_ERROR, "new-instance");

throwing_rop!(NEW_ARRAY_INT, NewArray, arr(Type::Int), [Type::Int], LIST_ERROR_NEGATIVE_ARRAY_SIZE_EXCEPTION, "new-array-int");
throwing_rop!(NEW_ARRAY_LONG, NewArray, arr(Type::Long), [Type::Int], LIST_ERROR_NEGATIVE_ARRAY_SIZE_EXCEPTION, "new-array-long");
throwing_rop!(NEW_ARRAY_FLOAT, NewArray, arr(Type::Float), [Type::Int], LIST_ERROR_NEGATIVE_ARRAY_SIZE_EXCEPTION, "new-array-float");
throwing_rop!(NEW_ARRAY_DOUBLE, NewArray, arr(Type::Double), [Type::Int], LIST_ERROR_NEGATIVE_ARRAY_SIZE_EXCEPTION, "new-array-double");
throwing_rop!(NEW_ARRAY_BOOLEAN, NewArray, arr(Type::Boolean), [Type::Int], LIST_ERROR_NEGATIVE_ARRAY_SIZE_EXCEPTION, "new-array-boolean");
throwing_rop!(NEW_ARRAY_BYTE, NewArray, arr(Type::Byte), [Type::Int], LIST_ERROR_NEGATIVE_ARRAY_SIZE_EXCEPTION, "new-array-byte");
throwing_rop!(NEW_ARRAY_CHAR, NewArray, arr(Type::Char), [Type::Int], LIST_ERROR_NEGATIVE_ARRAY_SIZE_EXCEPTION, "new-array-char");
throwing_rop!(NEW_ARRAY_SHORT, NewArray, arr(Type::Short), [Type::Int], LIST_ERROR_NEGATIVE_ARRAY_SIZE_EXCEPTION, "new-array-short");

throwing_rop!(CHECK_CAST, CheckCast, Type::Void, [obj()], LIST_ERROR_CLASS_CAST_EXCEPTION, "check-cast");
throwing_rop!(INSTANCE_OF, InstanceOf, Type::Int, [obj()], LIST_ERROR, "instance-of");

throwing_rop!(GET_FIELD_INT, GetField, Type::Int, [obj()], LIST_ERROR_NULL_POINTER_EXCEPTION, "get-field-int");
throwing_rop!(GET_FIELD_LONG, GetField, Type::Long, [obj()], LIST_ERROR_NULL_POINTER_EXCEPTION, "get-field-long");
throwing_rop!(GET_FIELD_FLOAT, GetField, Type::Float, [obj()], LIST_ERROR_NULL_POINTER_EXCEPTION, "get-field-float");
throwing_rop!(GET_FIELD_DOUBLE, GetField, Type::Double, [obj()], LIST_ERROR_NULL_POINTER_EXCEPTION, "get-field-double");
throwing_rop!(GET_FIELD_OBJECT, GetField, obj(), [obj()], LIST_ERROR_NULL_POINTER_EXCEPTION, "get-field-object");
throwing_rop!(GET_FIELD_BOOLEAN, GetField, Type::Int, [obj()], LIST_ERROR_NULL_POINTER_EXCEPTION, "get-field-boolean");
throwing_rop!(GET_FIELD_BYTE, GetField, Type::Int, [obj()], LIST_ERROR_NULL_POINTER_EXCEPTION, "get-field-byte");
throwing_rop!(GET_FIELD_CHAR, GetField, Type::Int, [obj()], LIST_ERROR_NULL_POINTER_EXCEPTION, "get-field-char");
throwing_rop!(GET_FIELD_SHORT, GetField, Type::Int, [obj()], LIST_ERROR_NULL_POINTER_EXCEPTION, "get-field-short");

throwing_rop!(GET_STATIC_INT, GetStatic, Type::Int, [], LIST_ERROR, "get-static-int");
throwing_rop!(GET_STATIC_LONG, GetStatic, Type::Long, [], LIST_ERROR, "get-static-long");
throwing_rop!(GET_STATIC_FLOAT, GetStatic, Type::Float, [], LIST_ERROR, "get-static-float");
throwing_rop!(GET_STATIC_DOUBLE, GetStatic, Type::Double, [], LIST_ERROR, "get-static-double");
throwing_rop!(GET_STATIC_OBJECT, GetStatic, obj(), [], LIST_ERROR, "get-static-object");
throwing_rop!(GET_STATIC_BOOLEAN, GetStatic, Type::Int, [], LIST_ERROR, "get-static-boolean");
throwing_rop!(GET_STATIC_BYTE, GetStatic, Type::Int, [], LIST_ERROR, "get-static-byte");
throwing_rop!(GET_STATIC_CHAR, GetStatic, Type::Int, [], LIST_ERROR, "get-static-char");
throwing_rop!(GET_STATIC_SHORT, GetStatic, Type::Int, [], LIST_ERROR, "get-static-short");

// put-field sources are (value, object)
throwing_rop!(PUT_FIELD_INT, PutField, Type::Void, [Type::Int, obj()], LIST_ERROR_NULL_POINTER_EXCEPTION, "put-field-int");
throwing_rop!(PUT_FIELD_LONG, PutField, Type::Void, [Type::Long, obj()], LIST_ERROR_NULL_POINTER_EXCEPTION, "put-field-long");
throwing_rop!(PUT_FIELD_FLOAT, PutField, Type::Void, [Type::Float, obj()], LIST_ERROR_NULL_POINTER_EXCEPTION, "put-field-float");
throwing_rop!(PUT_FIELD_DOUBLE, PutField, Type::Void, [Type::Double, obj()], LIST_ERROR_NULL_POINTER_EXCEPTION, "put-field-double");
throwing_rop!(PUT_FIELD_OBJECT, PutField, Type::Void, [obj(), obj()], LIST_ERROR_NULL_POINTER_EXCEPTION, "put-field-object");
throwing_rop!(PUT_FIELD_BOOLEAN, PutField, Type::Void, [Type::Int, obj()], LIST_ERROR_NULL_POINTER_EXCEPTION, "put-field-boolean");
throwing_rop!(PUT_FIELD_BYTE, PutField, Type::Void, [Type::Int, obj()], LIST_ERROR_NULL_POINTER_EXCEPTION, "put-field-byte");
throwing_rop!(PUT_FIELD_CHAR, PutField, Type::Void, [Type::Int, obj()], LIST_ERROR_NULL_POINTER_EXCEPTION, "put-field-char");
throwing_rop!(PUT_FIELD_SHORT, PutField, Type::Void, [Type::Int, obj()], LIST_ERROR_NULL_POINTER_EXCEPTION, "put-field-short");

throwing_rop!(PUT_STATIC_INT, PutStatic, Type::Void, [Type::Int], LIST_ERROR, "put-static-int");
throwing_rop!(PUT_STATIC_LONG, PutStatic, Type::Void, [Type::Long], LIST_ERROR, "put-static-long");
throwing_rop!(PUT_STATIC_FLOAT, PutStatic, Type::Void, [Type::Float], LIST_ERROR, "put-static-float");
throwing_rop!(PUT_STATIC_DOUBLE, PutStatic, Type::Void, [Type::Double], LIST_ERROR, "put-static-double");
throwing_rop!(PUT_STATIC_OBJECT, PutStatic, Type::Void, [obj()], LIST_ERROR, "put-static-object");
throwing_rop!(PUT_STATIC_BOOLEAN, PutStatic, Type::Void, [Type::Int], LIST_ERROR, "put-static-boolean");
throwing_rop!(PUT_STATIC_BYTE, PutStatic, Type::Void, [Type::Int], LIST_ERROR, "put-static-byte");
throwing_rop!(PUT_STATIC_CHAR, PutStatic, Type::Void, [Type::Int], LIST_ERROR, "put-static-char");
throwing_rop!(PUT_STATIC_SHORT, PutStatic, Type::Void, [Type::Int], LIST_ERROR, "put-static-short");

plain_rop!(MARK_LOCAL_INT, MarkLocal, Type::Void, [Type::Int], "mark-local-int");
plain_rop!(MARK_LOCAL_LONG, MarkLocal, Type::Void, [Type::Long], "mark-local-long");
plain_rop!(MARK_LOCAL_FLOAT, MarkLocal, Type::Void, [Type::Float], "mark-local-float");
plain_rop!(MARK_LOCAL_DOUBLE, MarkLocal, Type::Void, [Type::Double], "mark-local-double");
plain_rop!(MARK_LOCAL_OBJECT, MarkLocal, Type::Void, [obj()], "mark-local-object");

plain_rop!(FILL_ARRAY_DATA, FillArrayData, Type::Void, [], "fill-array-data");

fn bad_type(t: &Type) -> RopError {
    err!(InvalidArgument, "bad type: {}", t)
}

fn bad_types(types: &TypeList) -> RopError {
    err!(InvalidArgument, "bad types: {}", types)
}

fn first_source(sources: &TypeList) -> Result<&Type, RopError> {
    sources.get(0).ok_or_else(|| bad_types(sources))
}

fn method_ref_of(opcode: RegOp, cst: Option<&Constant>) -> Result<(Type, Prototype), RopError> {
    match cst {
        Some(Constant::Method(m)) | Some(Constant::InterfaceMethod(m)) => {
            Ok((m.defining_class.clone(), m.prototype.clone()))
        }
        Some(c) => Err(err!(InvalidArgument, "{} needs a method constant, got {}", opcode, c)),
        None => Err(err!(NullArgument, "{} needs a method constant", opcode)),
    }
}

/// Returns the rop for `opcode` applied to values of the given types.
///
/// `dest` is the result type ([`Type::Void`] when there is none) and
/// `cst` the constant operand, required for the invoke family. Fails
/// with [`InvalidArgument`](crate::code::error::RopErrorKind::InvalidArgument)
/// when no rop exists for the combination.
pub fn rop_for(
    opcode: RegOp,
    dest: &Type,
    sources: &TypeList,
    cst: Option<&Constant>,
) -> Result<Rop, RopError> {
    match opcode {
        RegOp::Nop => Ok(NOP.clone()),
        RegOp::Move => op_move(dest),
        RegOp::MoveParam => op_move_param(dest),
        RegOp::MoveException => Ok(op_move_exception(dest)),
        RegOp::Const => op_const(dest),
        RegOp::Goto => Ok(GOTO.clone()),
        RegOp::IfEq => op_if_eq(sources),
        RegOp::IfNe => op_if_ne(sources),
        RegOp::IfLt => op_if_lt(sources),
        RegOp::IfGe => op_if_ge(sources),
        RegOp::IfLe => op_if_le(sources),
        RegOp::IfGt => op_if_gt(sources),
        RegOp::Switch => Ok(SWITCH.clone()),
        RegOp::Add => op_add(sources),
        RegOp::Sub => op_sub(sources),
        RegOp::Mul => op_mul(sources),
        RegOp::Div => op_div(sources),
        RegOp::Rem => op_rem(sources),
        RegOp::Neg => op_neg(dest),
        RegOp::And => op_and(sources),
        RegOp::Or => op_or(sources),
        RegOp::Xor => op_xor(sources),
        RegOp::Shl => op_shl(sources),
        RegOp::Shr => op_shr(sources),
        RegOp::Ushr => op_ushr(sources),
        RegOp::Not => op_not(dest),
        RegOp::Cmpl => op_cmpl(first_source(sources)?),
        RegOp::Cmpg => op_cmpg(first_source(sources)?),
        RegOp::Conv => op_conv(dest, first_source(sources)?),
        RegOp::ToByte => Ok(TO_BYTE.clone()),
        RegOp::ToChar => Ok(TO_CHAR.clone()),
        RegOp::ToShort => Ok(TO_SHORT.clone()),
        RegOp::Return => match sources.get(0) {
            None => Ok(RETURN_VOID.clone()),
            Some(t) => op_return(t),
        },
        RegOp::ArrayLength => Ok(ARRAY_LENGTH.clone()),
        RegOp::Throw => Ok(THROW.clone()),
        RegOp::MonitorEnter => Ok(MONITOR_ENTER.clone()),
        RegOp::MonitorExit => Ok(MONITOR_EXIT.clone()),
        RegOp::Aget => {
            let array = first_source(sources)?;
            // A null array still has to pick some rop; go by the result.
            let component = match array {
                Type::KnownNull => dest.clone(),
                a => a.component_type()?,
            };
            op_aget(&component)
        }
        RegOp::Aput => {
            let array = sources.get(1).ok_or_else(|| bad_types(sources))?;
            let component = match array {
                Type::KnownNull => first_source(sources)?.clone(),
                a => a.component_type()?,
            };
            op_aput(&component)
        }
        RegOp::NewInstance => Ok(NEW_INSTANCE.clone()),
        RegOp::NewArray => op_new_array(dest),
        RegOp::FilledNewArray => op_filled_new_array(dest, sources.len()),
        RegOp::CheckCast => Ok(CHECK_CAST.clone()),
        RegOp::InstanceOf => Ok(INSTANCE_OF.clone()),
        RegOp::GetField => op_get_field(dest),
        RegOp::GetStatic => op_get_static(dest),
        RegOp::PutField => op_put_field(first_source(sources)?),
        RegOp::PutStatic => op_put_static(first_source(sources)?),
        RegOp::InvokeStatic => {
            let (_, proto) = method_ref_of(opcode, cst)?;
            Ok(op_invoke_static(&proto))
        }
        RegOp::InvokeVirtual
        | RegOp::InvokeSuper
        | RegOp::InvokeDirect
        | RegOp::InvokeInterface
        | RegOp::InvokePolymorphic => {
            let (definer, proto) = method_ref_of(opcode, cst)?;
            let meth = proto.with_first_parameter(definer);
            Ok(op_invoke(opcode, &meth))
        }
        RegOp::InvokeCustom => match cst {
            Some(Constant::CallSite(site)) => Ok(op_invoke_custom(&site.prototype)),
            Some(c) => Err(err!(InvalidArgument, "invoke-custom needs a call site, got {}", c)),
            None => Err(err!(NullArgument, "invoke-custom needs a call site")),
        },
        RegOp::MarkLocal => op_mark_local(first_source(sources)?),
        RegOp::MoveResult => Ok(op_move_result(dest)),
        RegOp::MoveResultPseudo => Ok(op_move_result_pseudo(dest)),
        RegOp::FillArrayData => Ok(FILL_ARRAY_DATA.clone()),
    }
}

pub fn op_move(t: &Type) -> Result<Rop, RopError> {
    match t.basic_frame_type() {
        BasicType::Int => Ok(MOVE_INT.clone()),
        BasicType::Long => Ok(MOVE_LONG.clone()),
        BasicType::Float => Ok(MOVE_FLOAT.clone()),
        BasicType::Double => Ok(MOVE_DOUBLE.clone()),
        BasicType::Object => Ok(MOVE_OBJECT.clone()),
        BasicType::Addr => Ok(MOVE_RETURN_ADDRESS.clone()),
        _ => Err(bad_type(t)),
    }
}

pub fn op_move_param(t: &Type) -> Result<Rop, RopError> {
    match t.basic_frame_type() {
        BasicType::Int => Ok(MOVE_PARAM_INT.clone()),
        BasicType::Long => Ok(MOVE_PARAM_LONG.clone()),
        BasicType::Float => Ok(MOVE_PARAM_FLOAT.clone()),
        BasicType::Double => Ok(MOVE_PARAM_DOUBLE.clone()),
        BasicType::Object => Ok(MOVE_PARAM_OBJECT.clone()),
        _ => Err(bad_type(t)),
    }
}

pub fn op_move_exception(t: &Type) -> Rop {
    Rop::plain(RegOp::MoveException, t.clone(), TypeList::empty(), None)
}

pub fn op_move_result(t: &Type) -> Rop {
    Rop::plain(RegOp::MoveResult, t.clone(), TypeList::empty(), None)
}

pub fn op_move_result_pseudo(t: &Type) -> Rop {
    Rop::plain(RegOp::MoveResultPseudo, t.clone(), TypeList::empty(), None)
}

pub fn op_const(t: &Type) -> Result<Rop, RopError> {
    if *t == Type::KnownNull {
        return Ok(CONST_OBJECT_NOTHROW.clone());
    }
    match t.basic_frame_type() {
        BasicType::Int => Ok(CONST_INT.clone()),
        BasicType::Long => Ok(CONST_LONG.clone()),
        BasicType::Float => Ok(CONST_FLOAT.clone()),
        BasicType::Double => Ok(CONST_DOUBLE.clone()),
        BasicType::Object => Ok(CONST_OBJECT.clone()),
        _ => Err(bad_type(t)),
    }
}

pub fn op_if_eq(types: &TypeList) -> Result<Rop, RopError> {
    pick_if(types, &*IF_EQZ_INT, Some(&*IF_EQZ_OBJECT), &*IF_EQ_INT, Some(&*IF_EQ_OBJECT))
}

pub fn op_if_ne(types: &TypeList) -> Result<Rop, RopError> {
    pick_if(types, &*IF_NEZ_INT, Some(&*IF_NEZ_OBJECT), &*IF_NE_INT, Some(&*IF_NE_OBJECT))
}

pub fn op_if_lt(types: &TypeList) -> Result<Rop, RopError> {
    pick_if(types, &*IF_LTZ_INT, None, &*IF_LT_INT, None)
}

pub fn op_if_ge(types: &TypeList) -> Result<Rop, RopError> {
    pick_if(types, &*IF_GEZ_INT, None, &*IF_GE_INT, None)
}

pub fn op_if_le(types: &TypeList) -> Result<Rop, RopError> {
    pick_if(types, &*IF_LEZ_INT, None, &*IF_LE_INT, None)
}

pub fn op_if_gt(types: &TypeList) -> Result<Rop, RopError> {
    pick_if(types, &*IF_GTZ_INT, None, &*IF_GT_INT, None)
}

/// One source picks the compare-with-zero form, two sources of the same
/// frame type pick the two-register form. Only `eq`/`ne` have object
/// variants.
fn pick_if(
    types: &TypeList,
    int_z: &Rop,
    obj_z: Option<&Rop>,
    int_int: &Rop,
    obj_obj: Option<&Rop>,
) -> Result<Rop, RopError> {
    let picked = match types.as_slice() {
        [a] => match a.basic_frame_type() {
            BasicType::Int => Some(int_z),
            BasicType::Object => obj_z,
            _ => None,
        },
        [a, b] if a.basic_frame_type() == b.basic_frame_type() => match a.basic_frame_type() {
            BasicType::Int => Some(int_int),
            BasicType::Object => obj_obj,
            _ => None,
        },
        _ => None,
    };
    picked.cloned().ok_or_else(|| bad_types(types))
}

pub fn op_add(types: &TypeList) -> Result<Rop, RopError> {
    pick_binary_op(
        types,
        [&*ADD_CONST_INT, &*ADD_CONST_LONG],
        [Some(&*ADD_CONST_FLOAT), Some(&*ADD_CONST_DOUBLE)],
        [&*ADD_INT, &*ADD_LONG],
        [Some(&*ADD_FLOAT), Some(&*ADD_DOUBLE)],
    )
}

pub fn op_sub(types: &TypeList) -> Result<Rop, RopError> {
    pick_binary_op(
        types,
        [&*SUB_CONST_INT, &*SUB_CONST_LONG],
        [Some(&*SUB_CONST_FLOAT), Some(&*SUB_CONST_DOUBLE)],
        [&*SUB_INT, &*SUB_LONG],
        [Some(&*SUB_FLOAT), Some(&*SUB_DOUBLE)],
    )
}

pub fn op_mul(types: &TypeList) -> Result<Rop, RopError> {
    pick_binary_op(
        types,
        [&*MUL_CONST_INT, &*MUL_CONST_LONG],
        [Some(&*MUL_CONST_FLOAT), Some(&*MUL_CONST_DOUBLE)],
        [&*MUL_INT, &*MUL_LONG],
        [Some(&*MUL_FLOAT), Some(&*MUL_DOUBLE)],
    )
}

pub fn op_div(types: &TypeList) -> Result<Rop, RopError> {
    pick_binary_op(
        types,
        [&*DIV_CONST_INT, &*DIV_CONST_LONG],
        [Some(&*DIV_CONST_FLOAT), Some(&*DIV_CONST_DOUBLE)],
        [&*DIV_INT, &*DIV_LONG],
        [Some(&*DIV_FLOAT), Some(&*DIV_DOUBLE)],
    )
}

pub fn op_rem(types: &TypeList) -> Result<Rop, RopError> {
    pick_binary_op(
        types,
        [&*REM_CONST_INT, &*REM_CONST_LONG],
        [Some(&*REM_CONST_FLOAT), Some(&*REM_CONST_DOUBLE)],
        [&*REM_INT, &*REM_LONG],
        [Some(&*REM_FLOAT), Some(&*REM_DOUBLE)],
    )
}

pub fn op_and(types: &TypeList) -> Result<Rop, RopError> {
    pick_binary_op(types, [&*AND_CONST_INT, &*AND_CONST_LONG], [None, None], [&*AND_INT, &*AND_LONG], [None, None])
}

pub fn op_or(types: &TypeList) -> Result<Rop, RopError> {
    pick_binary_op(types, [&*OR_CONST_INT, &*OR_CONST_LONG], [None, None], [&*OR_INT, &*OR_LONG], [None, None])
}

pub fn op_xor(types: &TypeList) -> Result<Rop, RopError> {
    pick_binary_op(types, [&*XOR_CONST_INT, &*XOR_CONST_LONG], [None, None], [&*XOR_INT, &*XOR_LONG], [None, None])
}

pub fn op_shl(types: &TypeList) -> Result<Rop, RopError> {
    pick_binary_op(types, [&*SHL_CONST_INT, &*SHL_CONST_LONG], [None, None], [&*SHL_INT, &*SHL_LONG], [None, None])
}

pub fn op_shr(types: &TypeList) -> Result<Rop, RopError> {
    pick_binary_op(types, [&*SHR_CONST_INT, &*SHR_CONST_LONG], [None, None], [&*SHR_INT, &*SHR_LONG], [None, None])
}

pub fn op_ushr(types: &TypeList) -> Result<Rop, RopError> {
    pick_binary_op(
        types,
        [&*USHR_CONST_INT, &*USHR_CONST_LONG],
        [None, None],
        [&*USHR_INT, &*USHR_LONG],
        [None, None],
    )
}

/// Picks by the first source's frame type: one source selects the
/// constant form, two the register form. Floating-point entries are
/// absent for the bitwise ops.
fn pick_binary_op(
    types: &TypeList,
    int_long_1: [&Rop; 2],
    float_double_1: [Option<&Rop>; 2],
    int_long_2: [&Rop; 2],
    float_double_2: [Option<&Rop>; 2],
) -> Result<Rop, RopError> {
    let (int_long, float_double) = match types.len() {
        1 => (int_long_1, float_double_1),
        2 => (int_long_2, float_double_2),
        _ => return Err(bad_types(types)),
    };
    let picked = match first_source(types)?.basic_frame_type() {
        BasicType::Int => Some(int_long[0]),
        BasicType::Long => Some(int_long[1]),
        BasicType::Float => float_double[0],
        BasicType::Double => float_double[1],
        _ => None,
    };
    picked.cloned().ok_or_else(|| bad_types(types))
}

pub fn op_neg(t: &Type) -> Result<Rop, RopError> {
    match t.basic_frame_type() {
        BasicType::Int => Ok(NEG_INT.clone()),
        BasicType::Long => Ok(NEG_LONG.clone()),
        BasicType::Float => Ok(NEG_FLOAT.clone()),
        BasicType::Double => Ok(NEG_DOUBLE.clone()),
        _ => Err(bad_type(t)),
    }
}

pub fn op_not(t: &Type) -> Result<Rop, RopError> {
    match t.basic_frame_type() {
        BasicType::Int => Ok(NOT_INT.clone()),
        BasicType::Long => Ok(NOT_LONG.clone()),
        _ => Err(bad_type(t)),
    }
}

pub fn op_cmpl(t: &Type) -> Result<Rop, RopError> {
    match t.basic_type() {
        BasicType::Long => Ok(CMPL_LONG.clone()),
        BasicType::Float => Ok(CMPL_FLOAT.clone()),
        BasicType::Double => Ok(CMPL_DOUBLE.clone()),
        _ => Err(bad_type(t)),
    }
}

pub fn op_cmpg(t: &Type) -> Result<Rop, RopError> {
    match t.basic_type() {
        BasicType::Float => Ok(CMPG_FLOAT.clone()),
        BasicType::Double => Ok(CMPG_DOUBLE.clone()),
        _ => Err(bad_type(t)),
    }
}

/// Conversion between two distinct numeric frame types.
pub fn op_conv(dest: &Type, source: &Type) -> Result<Rop, RopError> {
    use BasicType::{Double, Float, Int, Long};
    let picked: Option<&Rop> = match (source.basic_frame_type(), dest.basic_frame_type()) {
        (Int, Long) => Some(&*CONV_I2L),
        (Int, Float) => Some(&*CONV_I2F),
        (Int, Double) => Some(&*CONV_I2D),
        (Long, Int) => Some(&*CONV_L2I),
        (Long, Float) => Some(&*CONV_L2F),
        (Long, Double) => Some(&*CONV_L2D),
        (Float, Int) => Some(&*CONV_F2I),
        (Float, Long) => Some(&*CONV_F2L),
        (Float, Double) => Some(&*CONV_F2D),
        (Double, Int) => Some(&*CONV_D2I),
        (Double, Long) => Some(&*CONV_D2L),
        (Double, Float) => Some(&*CONV_D2F),
        _ => None,
    };
    picked
        .cloned()
        .ok_or_else(|| bad_types(&TypeList::of(&[dest.clone(), source.clone()])))
}

pub fn op_return(t: &Type) -> Result<Rop, RopError> {
    match t.basic_frame_type() {
        BasicType::Int => Ok(RETURN_INT.clone()),
        BasicType::Long => Ok(RETURN_LONG.clone()),
        BasicType::Float => Ok(RETURN_FLOAT.clone()),
        BasicType::Double => Ok(RETURN_DOUBLE.clone()),
        BasicType::Object => Ok(RETURN_OBJECT.clone()),
        BasicType::Void => Ok(RETURN_VOID.clone()),
        _ => Err(bad_type(t)),
    }
}

pub fn op_aget(component: &Type) -> Result<Rop, RopError> {
    match component.basic_type() {
        BasicType::Int => Ok(AGET_INT.clone()),
        BasicType::Long => Ok(AGET_LONG.clone()),
        BasicType::Float => Ok(AGET_FLOAT.clone()),
        BasicType::Double => Ok(AGET_DOUBLE.clone()),
        BasicType::Object => Ok(AGET_OBJECT.clone()),
        BasicType::Boolean => Ok(AGET_BOOLEAN.clone()),
        BasicType::Byte => Ok(AGET_BYTE.clone()),
        BasicType::Char => Ok(AGET_CHAR.clone()),
        BasicType::Short => Ok(AGET_SHORT.clone()),
        _ => Err(bad_type(component)),
    }
}

pub fn op_aput(component: &Type) -> Result<Rop, RopError> {
    match component.basic_type() {
        BasicType::Int => Ok(APUT_INT.clone()),
        BasicType::Long => Ok(APUT_LONG.clone()),
        BasicType::Float => Ok(APUT_FLOAT.clone()),
        BasicType::Double => Ok(APUT_DOUBLE.clone()),
        BasicType::Object => Ok(APUT_OBJECT.clone()),
        BasicType::Boolean => Ok(APUT_BOOLEAN.clone()),
        BasicType::Byte => Ok(APUT_BYTE.clone()),
        BasicType::Char => Ok(APUT_CHAR.clone()),
        BasicType::Short => Ok(APUT_SHORT.clone()),
        _ => Err(bad_type(component)),
    }
}

/// Primitive arrays come from the catalog; object arrays get a fresh rop
/// carrying the exact array type.
pub fn op_new_array(array_type: &Type) -> Result<Rop, RopError> {
    let element = array_type.component_type()?;
    match element.basic_type() {
        BasicType::Int => Ok(NEW_ARRAY_INT.clone()),
        BasicType::Long => Ok(NEW_ARRAY_LONG.clone()),
        BasicType::Float => Ok(NEW_ARRAY_FLOAT.clone()),
        BasicType::Double => Ok(NEW_ARRAY_DOUBLE.clone()),
        BasicType::Boolean => Ok(NEW_ARRAY_BOOLEAN.clone()),
        BasicType::Byte => Ok(NEW_ARRAY_BYTE.clone()),
        BasicType::Char => Ok(NEW_ARRAY_CHAR.clone()),
        BasicType::Short => Ok(NEW_ARRAY_SHORT.clone()),
        BasicType::Object => Ok(Rop::throwing(
            RegOp::NewArray,
            array_type.clone(),
            TypeList::of(&[Type::Int]),
            LIST_ERROR_NEGATIVE_ARRAY_SIZE_EXCEPTION.clone(),
            Some("new-array-object"),
        )),
        _ => Err(bad_type(array_type)),
    }
}

/// Call-like rop taking `count` elements of the array's component type.
pub fn op_filled_new_array(array_type: &Type, count: usize) -> Result<Rop, RopError> {
    let element = array_type.component_type()?;
    if element.is_category2() {
        return Err(bad_type(array_type));
    }
    let sources = TypeList::new(vec![element; count]);
    Ok(Rop::call_like(RegOp::FilledNewArray, sources, LIST_ERROR.clone()))
}

pub fn op_get_field(t: &Type) -> Result<Rop, RopError> {
    match t.basic_type() {
        BasicType::Int => Ok(GET_FIELD_INT.clone()),
        BasicType::Long => Ok(GET_FIELD_LONG.clone()),
        BasicType::Float => Ok(GET_FIELD_FLOAT.clone()),
        BasicType::Double => Ok(GET_FIELD_DOUBLE.clone()),
        BasicType::Object => Ok(GET_FIELD_OBJECT.clone()),
        BasicType::Boolean => Ok(GET_FIELD_BOOLEAN.clone()),
        BasicType::Byte => Ok(GET_FIELD_BYTE.clone()),
        BasicType::Char => Ok(GET_FIELD_CHAR.clone()),
        BasicType::Short => Ok(GET_FIELD_SHORT.clone()),
        _ => Err(bad_type(t)),
    }
}

pub fn op_put_field(t: &Type) -> Result<Rop, RopError> {
    match t.basic_type() {
        BasicType::Int => Ok(PUT_FIELD_INT.clone()),
        BasicType::Long => Ok(PUT_FIELD_LONG.clone()),
        BasicType::Float => Ok(PUT_FIELD_FLOAT.clone()),
        BasicType::Double => Ok(PUT_FIELD_DOUBLE.clone()),
        BasicType::Object => Ok(PUT_FIELD_OBJECT.clone()),
        BasicType::Boolean => Ok(PUT_FIELD_BOOLEAN.clone()),
        BasicType::Byte => Ok(PUT_FIELD_BYTE.clone()),
        BasicType::Char => Ok(PUT_FIELD_CHAR.clone()),
        BasicType::Short => Ok(PUT_FIELD_SHORT.clone()),
        _ => Err(bad_type(t)),
    }
}

pub fn op_get_static(t: &Type) -> Result<Rop, RopError> {
    match t.basic_type() {
        BasicType::Int => Ok(GET_STATIC_INT.clone()),
        BasicType::Long => Ok(GET_STATIC_LONG.clone()),
        BasicType::Float => Ok(GET_STATIC_FLOAT.clone()),
        BasicType::Double => Ok(GET_STATIC_DOUBLE.clone()),
        BasicType::Object => Ok(GET_STATIC_OBJECT.clone()),
        BasicType::Boolean => Ok(GET_STATIC_BOOLEAN.clone()),
        BasicType::Byte => Ok(GET_STATIC_BYTE.clone()),
        BasicType::Char => Ok(GET_STATIC_CHAR.clone()),
        BasicType::Short => Ok(GET_STATIC_SHORT.clone()),
        _ => Err(bad_type(t)),
    }
}

pub fn op_put_static(t: &Type) -> Result<Rop, RopError> {
    match t.basic_type() {
        BasicType::Int => Ok(PUT_STATIC_INT.clone()),
        BasicType::Long => Ok(PUT_STATIC_LONG.clone()),
        BasicType::Float => Ok(PUT_STATIC_FLOAT.clone()),
        BasicType::Double => Ok(PUT_STATIC_DOUBLE.clone()),
        BasicType::Object => Ok(PUT_STATIC_OBJECT.clone()),
        BasicType::Boolean => Ok(PUT_STATIC_BOOLEAN.clone()),
        BasicType::Byte => Ok(PUT_STATIC_BYTE.clone()),
        BasicType::Char => Ok(PUT_STATIC_CHAR.clone()),
        BasicType::Short => Ok(PUT_STATIC_SHORT.clone()),
        _ => Err(bad_type(t)),
    }
}

pub fn op_invoke_static(meth: &Prototype) -> Rop {
    op_invoke(RegOp::InvokeStatic, meth)
}

pub fn op_invoke_virtual(meth: &Prototype) -> Rop {
    op_invoke(RegOp::InvokeVirtual, meth)
}

pub fn op_invoke_super(meth: &Prototype) -> Rop {
    op_invoke(RegOp::InvokeSuper, meth)
}

pub fn op_invoke_direct(meth: &Prototype) -> Rop {
    op_invoke(RegOp::InvokeDirect, meth)
}

pub fn op_invoke_interface(meth: &Prototype) -> Rop {
    op_invoke(RegOp::InvokeInterface, meth)
}

pub fn op_invoke_polymorphic(meth: &Prototype) -> Rop {
    op_invoke(RegOp::InvokePolymorphic, meth)
}

pub fn op_invoke_custom(meth: &Prototype) -> Rop {
    op_invoke(RegOp::InvokeCustom, meth)
}

fn op_invoke(opcode: RegOp, meth: &Prototype) -> Rop {
    Rop::call_like(opcode, meth.parameter_frame_types(), LIST_THROWABLE.clone())
}

pub fn op_mark_local(t: &Type) -> Result<Rop, RopError> {
    match t.basic_frame_type() {
        BasicType::Int => Ok(MARK_LOCAL_INT.clone()),
        BasicType::Long => Ok(MARK_LOCAL_LONG.clone()),
        BasicType::Float => Ok(MARK_LOCAL_FLOAT.clone()),
        BasicType::Double => Ok(MARK_LOCAL_DOUBLE.clone()),
        BasicType::Object => Ok(MARK_LOCAL_OBJECT.clone()),
        _ => Err(bad_type(t)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::error::RopErrorKind;
    use crate::cst::CstMethodRef;

    fn tl(types: &[Type]) -> TypeList {
        TypeList::of(types)
    }

    #[test]
    fn add_int_is_canonical() {
        for _ in 0..3 {
            let r = rop_for(RegOp::Add, &Type::Int, &tl(&[Type::Int, Type::Int]), None).unwrap();
            assert!(Rop::ptr_eq(&r, &*ADD_INT));
        }
    }

    #[test]
    fn binary_dispatch() {
        let r = rop_for(RegOp::Add, &Type::Int, &tl(&[Type::Int]), None).unwrap();
        assert!(Rop::ptr_eq(&r, &*ADD_CONST_INT));
        let r = rop_for(RegOp::Mul, &Type::Long, &tl(&[Type::Long, Type::Long]), None).unwrap();
        assert!(Rop::ptr_eq(&r, &*MUL_LONG));
        let r = rop_for(RegOp::Shl, &Type::Long, &tl(&[Type::Long, Type::Int]), None).unwrap();
        assert!(Rop::ptr_eq(&r, &*SHL_LONG));
        let r = rop_for(RegOp::Sub, &Type::Int, &tl(&[Type::Char, Type::Byte]), None).unwrap();
        assert!(Rop::ptr_eq(&r, &*SUB_INT));
    }

    #[test]
    fn bitwise_on_floating_point_fails() {
        let e = rop_for(RegOp::And, &Type::Float, &tl(&[Type::Float, Type::Float]), None).unwrap_err();
        assert_eq!(e.kind(), RopErrorKind::InvalidArgument);
        assert_eq!(e.to_string(), "bad types: {F, F}");
        assert!(rop_for(RegOp::Ushr, &Type::Double, &tl(&[Type::Double]), None).is_err());
    }

    #[test]
    fn if_dispatch() {
        let r = rop_for(RegOp::IfEq, &Type::Void, &tl(&[Type::OBJECT]), None).unwrap();
        assert!(Rop::ptr_eq(&r, &*IF_EQZ_OBJECT));
        let r = rop_for(RegOp::IfLt, &Type::Void, &tl(&[Type::Int, Type::Short]), None).unwrap();
        assert!(Rop::ptr_eq(&r, &*IF_LT_INT));
        assert!(rop_for(RegOp::IfLt, &Type::Void, &tl(&[Type::OBJECT]), None).is_err());
        assert!(rop_for(RegOp::IfEq, &Type::Void, &tl(&[Type::Int, Type::OBJECT]), None).is_err());
        assert!(rop_for(RegOp::IfEq, &Type::Void, &tl(&[Type::Long, Type::Long]), None).is_err());
    }

    #[test]
    fn conversions() {
        let r = rop_for(RegOp::Conv, &Type::Long, &tl(&[Type::Int]), None).unwrap();
        assert!(Rop::ptr_eq(&r, &*CONV_I2L));
        let r = op_conv(&Type::Float, &Type::Double).unwrap();
        assert!(Rop::ptr_eq(&r, &*CONV_D2F));
        let e = op_conv(&Type::Int, &Type::Int).unwrap_err();
        assert_eq!(e.to_string(), "bad types: {I, I}");
    }

    #[test]
    fn arrays() {
        let r = rop_for(RegOp::Aget, &Type::Int, &tl(&[Type::Byte.array_type(), Type::Int]), None).unwrap();
        assert!(Rop::ptr_eq(&r, &*AGET_BYTE));
        let r = rop_for(RegOp::Aget, &Type::Long, &tl(&[Type::KnownNull, Type::Int]), None).unwrap();
        assert!(Rop::ptr_eq(&r, &*AGET_LONG));
        let r = rop_for(RegOp::Aput, &Type::Void, &tl(&[Type::STRING, Type::KnownNull, Type::Int]), None).unwrap();
        assert!(Rop::ptr_eq(&r, &*APUT_OBJECT));
        let strings = Type::STRING.array_type();
        let r = rop_for(RegOp::NewArray, &strings, &tl(&[Type::Int]), None).unwrap();
        assert_eq!(r.result(), &strings);
        assert_eq!(r.exceptions(), &*LIST_ERROR_NEGATIVE_ARRAY_SIZE_EXCEPTION);
        let r = op_filled_new_array(&Type::Int.array_type(), 3).unwrap();
        assert!(r.is_call_like());
        assert_eq!(r.sources().len(), 3);
        assert!(op_filled_new_array(&Type::Long.array_type(), 2).is_err());
    }

    #[test]
    fn invokes_prepend_receiver() {
        let m = CstMethodRef::new(Type::STRING, "charAt", "(I)C").unwrap();
        let cst = Constant::Method(m);
        let r = rop_for(RegOp::InvokeVirtual, &Type::Void, &TypeList::empty(), Some(&cst)).unwrap();
        assert_eq!(r.sources(), &tl(&[Type::STRING, Type::Int]));
        assert_eq!(r.exceptions(), &*LIST_THROWABLE);
        assert!(r.is_call_like());
        let r = rop_for(RegOp::InvokeStatic, &Type::Void, &TypeList::empty(), Some(&cst)).unwrap();
        assert_eq!(r.sources(), &tl(&[Type::Int]));
        let e = rop_for(RegOp::InvokeStatic, &Type::Void, &TypeList::empty(), None).unwrap_err();
        assert_eq!(e.kind(), RopErrorKind::NullArgument);
    }

    #[test]
    fn misc_dispatch() {
        assert!(Rop::ptr_eq(&op_const(&Type::KnownNull).unwrap(), &*CONST_OBJECT_NOTHROW));
        assert!(Rop::ptr_eq(&op_const(&Type::STRING).unwrap(), &*CONST_OBJECT));
        assert!(Rop::ptr_eq(&rop_for(RegOp::Return, &Type::Void, &TypeList::empty(), None).unwrap(), &*RETURN_VOID));
        assert!(Rop::ptr_eq(&op_get_static(&Type::Boolean).unwrap(), &*GET_STATIC_BOOLEAN));
        assert_eq!(GET_STATIC_BOOLEAN.nickname(), "get-static-boolean");
        assert!(op_cmpg(&Type::Long).is_err());
        assert_eq!(op_move(&Type::Void).unwrap_err().to_string(), "bad type: V");
        let e = op_move_exception(&Type::THROWABLE);
        assert_eq!(e.opcode(), RegOp::MoveException);
        assert!(!e.can_throw());
    }

    #[test]
    fn catalog_exceptions() {
        assert_eq!(ADD_CONST_INT.opcode(), RegOp::Add);
        assert_eq!(SHR_CONST_LONG.sources(), &tl(&[Type::Int]));
        assert!(THROW.can_throw());
        assert_eq!(MONITOR_EXIT.exceptions().len(), 3);
        assert_eq!(APUT_BYTE.exceptions(), &*LIST_ERROR_NULL_ARRAY_INDEX_ARRAY_STORE);
        assert_eq!(APUT_INT.exceptions(), &*LIST_ERROR_NULL_ARRAY_INDEX_OUT_OF_BOUNDS);
        assert!(!DIV_FLOAT.can_throw());
        assert!(DIV_CONST_INT.can_throw());
    }
}
