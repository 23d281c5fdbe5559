/* Constants that can appear as instruction operands. */

use crate::code::error::RopError;
use crate::types::{BasicType, Prototype, Type};
use crate::{err, fail};
use cesu8::{from_java_cesu8, to_java_cesu8};
use std::fmt;

/// A string constant.
///
/// Held as a Rust string; the modified UTF-8 form used by class and dex
/// files is produced on demand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CstString(String);

impl CstString {
    pub fn new(s: &str) -> CstString {
        CstString(s.to_string())
    }

    pub fn from_mutf8(bytes: &[u8]) -> Result<CstString, RopError> {
        match from_java_cesu8(bytes) {
            Ok(s) => Ok(CstString(s.to_string())),
            Err(_) => Err(err!(InvalidArgument, "bad MUTF-8 string of {} bytes", bytes.len())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_mutf8(&self) -> Vec<u8> {
        to_java_cesu8(&self.0).to_vec()
    }

    /// Length in UTF-16 code units.
    pub fn utf16_size(&self) -> usize {
        self.0.encode_utf16().count()
    }

    /// The string as a quoted Java literal.
    pub fn to_quoted(&self) -> String {
        let mut out = String::with_capacity(self.0.len() + 2);
        out.push('"');
        for c in self.0.chars() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if (' '..='~').contains(&c) => out.push(c),
                c => {
                    let mut units = [0u16; 2];
                    for u in c.encode_utf16(&mut units) {
                        out.push_str(&format!("\\u{:04x}", u));
                    }
                }
            }
        }
        out.push('"');
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CstFieldRef {
    pub defining_class: Type,
    pub name: String,
    pub field_type: Type,
}

impl CstFieldRef {
    pub fn new(defining_class: Type, name: &str, descriptor: &str) -> Result<CstFieldRef, RopError> {
        Ok(CstFieldRef {
            defining_class,
            name: name.to_string(),
            field_type: Type::from_descriptor(descriptor)?,
        })
    }
}

impl fmt::Display for CstFieldRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}->{}:{}", self.defining_class, self.name, self.field_type)
    }
}

const METHOD_HANDLE_POLYMORPHIC: [&str; 2] = ["invoke", "invokeExact"];

pub(crate) const VAR_HANDLE_RETURNS_OBJECT: [&str; 22] = [
    "compareAndExchange",
    "compareAndExchangeAcquire",
    "compareAndExchangeRelease",
    "get",
    "getAcquire",
    "getAndAdd",
    "getAndAddAcquire",
    "getAndAddRelease",
    "getAndBitwiseAnd",
    "getAndBitwiseAndAcquire",
    "getAndBitwiseAndRelease",
    "getAndBitwiseOr",
    "getAndBitwiseOrAcquire",
    "getAndBitwiseOrRelease",
    "getAndBitwiseXor",
    "getAndBitwiseXorAcquire",
    "getAndBitwiseXorRelease",
    "getAndSet",
    "getAndSetAcquire",
    "getAndSetRelease",
    "getOpaque",
    "getVolatile",
];

pub(crate) const VAR_HANDLE_RETURNS_VOID: [&str; 4] = ["set", "setOpaque", "setRelease", "setVolatile"];

pub(crate) const VAR_HANDLE_RETURNS_BOOLEAN: [&str; 5] = [
    "compareAndSet",
    "weakCompareAndSet",
    "weakCompareAndSetAcquire",
    "weakCompareAndSetPlain",
    "weakCompareAndSetRelease",
];

/// Reference to a method, as named at a call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CstMethodRef {
    pub defining_class: Type,
    pub name: String,
    pub prototype: Prototype,
}

impl CstMethodRef {
    pub fn new(defining_class: Type, name: &str, descriptor: &str) -> Result<CstMethodRef, RopError> {
        if !defining_class.is_reference() || defining_class == Type::KnownNull {
            fail!(InvalidArgument, "bad defining class: {}", defining_class);
        }
        Ok(CstMethodRef {
            defining_class,
            name: name.to_string(),
            prototype: Prototype::from_descriptor(descriptor)?,
        })
    }

    /// The prototype as seen by the callee; instance methods gain the
    /// defining class as an implicit first parameter.
    pub fn prototype(&self, is_static: bool) -> Prototype {
        if is_static {
            self.prototype.clone()
        } else {
            self.prototype.with_first_parameter(self.defining_class.clone())
        }
    }

    pub fn is_instance_init(&self) -> bool {
        self.name == "<init>"
    }

    pub fn is_class_init(&self) -> bool {
        self.name == "<clinit>"
    }

    pub fn is_signature_polymorphic(&self) -> bool {
        let name = self.name.as_str();
        if self.defining_class == Type::METHOD_HANDLE {
            return METHOD_HANDLE_POLYMORPHIC.contains(&name);
        }
        if self.defining_class == Type::VAR_HANDLE {
            return VAR_HANDLE_RETURNS_OBJECT.contains(&name)
                || VAR_HANDLE_RETURNS_VOID.contains(&name)
                || VAR_HANDLE_RETURNS_BOOLEAN.contains(&name);
        }
        false
    }
}

impl fmt::Display for CstMethodRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}->{}{}", self.defining_class, self.name, self.prototype)
    }
}

/// Reference to an `invokedynamic` call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CstCallSiteRef {
    /// Index of the call site in the defining file.
    pub id: u32,
    pub name: String,
    pub prototype: Prototype,
}

impl CstCallSiteRef {
    pub fn new(id: u32, name: &str, descriptor: &str) -> Result<CstCallSiteRef, RopError> {
        Ok(CstCallSiteRef {
            id,
            name: name.to_string(),
            prototype: Prototype::from_descriptor(descriptor)?,
        })
    }
}

impl fmt::Display for CstCallSiteRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "call_site@{} {}{}", self.id, self.name, self.prototype)
    }
}

/// A constant operand.
///
/// Float and double values are held as raw IEEE bits so constants can be
/// compared and hashed exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    Boolean(bool),
    Byte(i8),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(u32),
    Double(u64),
    KnownNull,
    String(CstString),
    Type(Type),
    Field(CstFieldRef),
    Method(CstMethodRef),
    InterfaceMethod(CstMethodRef),
    CallSite(CstCallSiteRef),
}

impl Constant {
    pub fn float(v: f32) -> Constant {
        Constant::Float(v.to_bits())
    }

    pub fn double(v: f64) -> Constant {
        Constant::Double(v.to_bits())
    }

    pub fn string(s: &str) -> Constant {
        Constant::String(CstString::new(s))
    }

    /// The type of the value this constant denotes.
    pub fn type_of(&self) -> Type {
        match self {
            Constant::Boolean(_) => Type::Boolean,
            Constant::Byte(_) => Type::Byte,
            Constant::Char(_) => Type::Char,
            Constant::Short(_) => Type::Short,
            Constant::Int(_) => Type::Int,
            Constant::Long(_) => Type::Long,
            Constant::Float(_) => Type::Float,
            Constant::Double(_) => Type::Double,
            Constant::KnownNull => Type::KnownNull,
            Constant::String(_) => Type::STRING,
            Constant::Type(_) => Type::CLASS,
            Constant::Field(f) => f.field_type.clone(),
            Constant::Method(m) | Constant::InterfaceMethod(m) => m.prototype.return_type().clone(),
            Constant::CallSite(c) => c.prototype.return_type().clone(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Constant::Boolean(_) => "boolean",
            Constant::Byte(_) => "byte",
            Constant::Char(_) => "char",
            Constant::Short(_) => "short",
            Constant::Int(_) => "int",
            Constant::Long(_) => "long",
            Constant::Float(_) => "float",
            Constant::Double(_) => "double",
            Constant::KnownNull => "known-null",
            Constant::String(_) => "string",
            Constant::Type(_) => "type",
            Constant::Field(_) => "field",
            Constant::Method(_) => "method",
            Constant::InterfaceMethod(_) => "ifaceMethod",
            Constant::CallSite(_) => "call-site",
        }
    }

    /// True for literal values held directly in an instruction.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Constant::Boolean(_)
                | Constant::Byte(_)
                | Constant::Char(_)
                | Constant::Short(_)
                | Constant::Int(_)
                | Constant::Long(_)
                | Constant::Float(_)
                | Constant::Double(_)
                | Constant::KnownNull
        )
    }

    /// The 32-bit pattern of a category-1 literal.
    pub fn int_bits(&self) -> Option<i32> {
        match self {
            Constant::Boolean(b) => Some(*b as i32),
            Constant::Byte(v) => Some(*v as i32),
            Constant::Char(v) => Some(*v as i32),
            Constant::Short(v) => Some(*v as i32),
            Constant::Int(v) => Some(*v),
            Constant::Float(bits) => Some(*bits as i32),
            Constant::KnownNull => Some(0),
            _ => None,
        }
    }

    pub fn long_bits(&self) -> Option<i64> {
        match self {
            Constant::Long(v) => Some(*v),
            Constant::Double(bits) => Some(*bits as i64),
            c => c.int_bits().map(i64::from),
        }
    }

    /// Whether this is a zero-valued int-like literal or `null`, i.e. a
    /// value an `if` can compare against implicitly.
    pub fn is_zero_or_null(&self) -> bool {
        match self {
            Constant::KnownNull => true,
            c if c.type_of().basic_frame_type() == BasicType::Int => c.int_bits() == Some(0),
            _ => false,
        }
    }

    pub fn to_human(&self) -> String {
        match self {
            Constant::Boolean(b) => b.to_string(),
            Constant::Byte(v) => v.to_string(),
            Constant::Char(v) => v.to_string(),
            Constant::Short(v) => v.to_string(),
            Constant::Int(v) => v.to_string(),
            Constant::Long(v) => v.to_string(),
            Constant::Float(bits) => f32::from_bits(*bits).to_string(),
            Constant::Double(bits) => f64::from_bits(*bits).to_string(),
            Constant::KnownNull => "null".to_string(),
            Constant::String(s) => s.to_quoted(),
            Constant::Type(t) => t.to_human(),
            Constant::Field(field) => field.to_string(),
            Constant::Method(m) | Constant::InterfaceMethod(m) => m.to_string(),
            Constant::CallSite(c) => c.to_string(),
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{{{}}}", self.type_name(), self.to_human())
    }
}

/// Anything that carries a type: either a plain type, or a constant whose
/// value is known in addition to its type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeBearer {
    Type(Type),
    Constant(Constant),
}

impl TypeBearer {
    pub fn get_type(&self) -> Type {
        match self {
            TypeBearer::Type(t) => t.clone(),
            TypeBearer::Constant(c) => c.type_of(),
        }
    }

    pub fn frame_type(&self) -> Type {
        self.get_type().frame_type()
    }

    pub fn basic_type(&self) -> BasicType {
        self.get_type().basic_type()
    }

    pub fn basic_frame_type(&self) -> BasicType {
        self.get_type().basic_frame_type()
    }

    pub fn category(&self) -> u32 {
        self.get_type().category()
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, TypeBearer::Constant(_))
    }

    pub fn constant(&self) -> Option<&Constant> {
        match self {
            TypeBearer::Constant(c) => Some(c),
            TypeBearer::Type(_) => None,
        }
    }

    pub fn to_human(&self) -> String {
        match self {
            TypeBearer::Type(t) => t.to_human(),
            TypeBearer::Constant(c) => c.to_human(),
        }
    }
}

impl From<Type> for TypeBearer {
    fn from(t: Type) -> Self {
        TypeBearer::Type(t)
    }
}

impl From<Constant> for TypeBearer {
    fn from(c: Constant) -> Self {
        TypeBearer::Constant(c)
    }
}

impl fmt::Display for TypeBearer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypeBearer::Type(t) => write!(f, "{}", t),
            TypeBearer::Constant(c) => write!(f, "{}", c),
        }
    }
}
