/* Value types for the register IR. Descriptors use the JNI/smali form, */
/* e.g. I, [J, Ljava/lang/Object; */

use crate::code::error::RopError;
use crate::err;
use nom::character::complete::{char, one_of};
use nom::bytes::complete::{tag, take_while1};
use nom::combinator::verify;
use nom::multi::many0;
use nom::sequence::delimited;
use nom::{IResult, Parser};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

/// Coarse type buckets used for opcode dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BasicType {
    Void,
    Boolean,
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Object,
    Addr,
}

/// A Java type as seen by the register IR.
///
/// Besides the usual primitives, objects and arrays this includes two
/// IR-only types: the type of the `null` literal and the type of a
/// subroutine return address.
///
/// # Examples
///
/// ```
///  use rop::types::{BasicType, Type};
///
///  let t = Type::from_descriptor("[J").unwrap();
///  assert_eq!(t.component_type().unwrap(), Type::Long);
///  assert_eq!(t.basic_type(), BasicType::Object);
///  assert_eq!(Type::Short.frame_type(), Type::Int);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Void,
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    KnownNull,
    ReturnAddress,
    /// Class type, holding the internal class name, e.g. `java/lang/Object`.
    Object(Cow<'static, str>),
    Array(Box<Type>),
}

impl Type {
    pub const OBJECT: Type = Type::Object(Cow::Borrowed("java/lang/Object"));
    pub const STRING: Type = Type::Object(Cow::Borrowed("java/lang/String"));
    pub const CLASS: Type = Type::Object(Cow::Borrowed("java/lang/Class"));
    pub const THROWABLE: Type = Type::Object(Cow::Borrowed("java/lang/Throwable"));
    pub const CLONEABLE: Type = Type::Object(Cow::Borrowed("java/lang/Cloneable"));
    pub const SERIALIZABLE: Type = Type::Object(Cow::Borrowed("java/io/Serializable"));
    pub const METHOD_HANDLE: Type = Type::Object(Cow::Borrowed("java/lang/invoke/MethodHandle"));
    pub const METHOD_TYPE: Type = Type::Object(Cow::Borrowed("java/lang/invoke/MethodType"));
    pub const VAR_HANDLE: Type = Type::Object(Cow::Borrowed("java/lang/invoke/VarHandle"));

    /// Parses a field-type descriptor. `V` is rejected; use
    /// [`Type::from_return_descriptor`] where void is allowed.
    pub fn from_descriptor(descriptor: &str) -> Result<Type, RopError> {
        match parse_type(descriptor) {
            Ok(("", t)) if !t.innermost().is_void() => Ok(t),
            _ => Err(err!(InvalidArgument, "bad descriptor: {}", descriptor)),
        }
    }

    pub fn from_return_descriptor(descriptor: &str) -> Result<Type, RopError> {
        if descriptor == "V" {
            return Ok(Type::Void);
        }
        Type::from_descriptor(descriptor)
    }

    /// Accepts either an internal class name (`java/lang/String`) or an
    /// array descriptor (`[I`).
    pub fn from_class_name(name: &str) -> Result<Type, RopError> {
        if name.starts_with('[') {
            return Type::from_descriptor(name);
        }
        Type::from_descriptor(&format!("L{};", name))
    }

    pub fn descriptor(&self) -> String {
        match self {
            Type::Void => "V".to_string(),
            Type::Boolean => "Z".to_string(),
            Type::Byte => "B".to_string(),
            Type::Char => "C".to_string(),
            Type::Short => "S".to_string(),
            Type::Int => "I".to_string(),
            Type::Long => "J".to_string(),
            Type::Float => "F".to_string(),
            Type::Double => "D".to_string(),
            Type::KnownNull => "<null>".to_string(),
            Type::ReturnAddress => "<addr>".to_string(),
            Type::Object(name) => format!("L{};", name),
            Type::Array(component) => format!("[{}", component.descriptor()),
        }
    }

    pub fn to_human(&self) -> String {
        match self {
            Type::Void => "void".to_string(),
            Type::Boolean => "boolean".to_string(),
            Type::Byte => "byte".to_string(),
            Type::Char => "char".to_string(),
            Type::Short => "short".to_string(),
            Type::Int => "int".to_string(),
            Type::Long => "long".to_string(),
            Type::Float => "float".to_string(),
            Type::Double => "double".to_string(),
            Type::KnownNull | Type::ReturnAddress => self.descriptor(),
            Type::Object(name) => name.replace('/', "."),
            Type::Array(component) => format!("{}[]", component.to_human()),
        }
    }

    pub fn basic_type(&self) -> BasicType {
        match self {
            Type::Void => BasicType::Void,
            Type::Boolean => BasicType::Boolean,
            Type::Byte => BasicType::Byte,
            Type::Char => BasicType::Char,
            Type::Short => BasicType::Short,
            Type::Int => BasicType::Int,
            Type::Long => BasicType::Long,
            Type::Float => BasicType::Float,
            Type::Double => BasicType::Double,
            Type::KnownNull | Type::Object(_) | Type::Array(_) => BasicType::Object,
            Type::ReturnAddress => BasicType::Addr,
        }
    }

    /// The basic type as it is held in a register: all int-like types
    /// collapse to [`BasicType::Int`].
    pub fn basic_frame_type(&self) -> BasicType {
        match self.basic_type() {
            BasicType::Boolean | BasicType::Byte | BasicType::Char | BasicType::Short => {
                BasicType::Int
            }
            bt => bt,
        }
    }

    pub fn frame_type(&self) -> Type {
        if self.is_intlike() {
            Type::Int
        } else {
            self.clone()
        }
    }

    /// Number of register slots a value of this type occupies.
    pub fn category(&self) -> u32 {
        match self {
            Type::Long | Type::Double => 2,
            _ => 1,
        }
    }

    pub fn is_category1(&self) -> bool {
        self.category() == 1
    }

    pub fn is_category2(&self) -> bool {
        self.category() == 2
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_intlike(&self) -> bool {
        matches!(self, Type::Boolean | Type::Byte | Type::Char | Type::Short | Type::Int)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Type::Void
                | Type::Boolean
                | Type::Byte
                | Type::Char
                | Type::Short
                | Type::Int
                | Type::Long
                | Type::Float
                | Type::Double
        )
    }

    pub fn is_reference(&self) -> bool {
        self.basic_type() == BasicType::Object
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(_))
    }

    pub fn is_array_or_known_null(&self) -> bool {
        matches!(self, Type::Array(_) | Type::KnownNull)
    }

    pub fn array_type(&self) -> Type {
        Type::Array(Box::new(self.clone()))
    }

    pub fn component_type(&self) -> Result<Type, RopError> {
        match self {
            Type::Array(component) => Ok((**component).clone()),
            _ => Err(err!(InvalidArgument, "not an array type: {}", self)),
        }
    }

    /// Internal class name: `java/lang/String` for classes, the full
    /// descriptor for arrays.
    pub fn class_name(&self) -> Result<String, RopError> {
        match self {
            Type::Object(name) => Ok(name.to_string()),
            Type::Array(_) => Ok(self.descriptor()),
            _ => Err(err!(InvalidArgument, "not an object type: {}", self)),
        }
    }

    fn innermost(&self) -> &Type {
        match self {
            Type::Array(component) => component.innermost(),
            t => t,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.descriptor())
    }
}

impl PartialOrd for Type {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Type {
    fn cmp(&self, other: &Self) -> Ordering {
        self.descriptor().cmp(&other.descriptor())
    }
}

/// An ordered list of types, e.g. the operand types of a rop or the
/// exception types an instruction may throw.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeList {
    types: Vec<Type>,
}

impl TypeList {
    pub const EMPTY: TypeList = TypeList { types: Vec::new() };

    pub fn new(types: Vec<Type>) -> TypeList {
        TypeList { types }
    }

    pub fn empty() -> TypeList {
        TypeList { types: Vec::new() }
    }

    pub fn of(types: &[Type]) -> TypeList {
        TypeList { types: types.to_vec() }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn get(&self, n: usize) -> Option<&Type> {
        self.types.get(n)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Type> {
        self.types.iter()
    }

    pub fn as_slice(&self) -> &[Type] {
        &self.types
    }

    /// Total register slots needed to hold one value of each type.
    pub fn word_count(&self) -> u32 {
        self.types.iter().map(Type::category).sum()
    }

    pub fn with_added_type(&self, t: Type) -> TypeList {
        let mut types = self.types.clone();
        types.push(t);
        TypeList { types }
    }

    pub fn with_first(&self, t: Type) -> TypeList {
        let mut types = Vec::with_capacity(self.types.len() + 1);
        types.push(t);
        types.extend(self.types.iter().cloned());
        TypeList { types }
    }

    pub fn to_human(&self) -> String {
        if self.types.is_empty() {
            return "<empty>".to_string();
        }
        self.types
            .iter()
            .map(Type::to_human)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for TypeList {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, t) in self.types.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", t)?;
        }
        write!(f, "}}")
    }
}

impl From<Vec<Type>> for TypeList {
    fn from(types: Vec<Type>) -> Self {
        TypeList::new(types)
    }
}

impl<'a> IntoIterator for &'a TypeList {
    type Item = &'a Type;
    type IntoIter = std::slice::Iter<'a, Type>;

    fn into_iter(self) -> Self::IntoIter {
        self.types.iter()
    }
}

/// A method prototype: parameter types plus return type.
///
/// # Examples
///
/// ```
///  use rop::types::{Prototype, Type};
///
///  let p = Prototype::from_descriptor("(IJLjava/lang/String;)V").unwrap();
///  assert_eq!(p.return_type(), &Type::Void);
///  assert_eq!(p.parameter_types().word_count(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Prototype {
    descriptor: String,
    return_type: Type,
    parameter_types: TypeList,
}

impl Prototype {
    pub fn from_descriptor(descriptor: &str) -> Result<Prototype, RopError> {
        let parsed = parse_prototype(descriptor);
        match parsed {
            Ok(("", (params, return_type)))
                if params.iter().all(|p| !p.innermost().is_void())
                    && !matches!(&return_type, Type::Array(c) if c.innermost().is_void()) =>
            {
                Ok(Prototype {
                    descriptor: descriptor.to_string(),
                    return_type,
                    parameter_types: TypeList::new(params),
                })
            }
            _ => Err(err!(InvalidArgument, "bad descriptor: {}", descriptor)),
        }
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn return_type(&self) -> &Type {
        &self.return_type
    }

    pub fn parameter_types(&self) -> &TypeList {
        &self.parameter_types
    }

    /// Parameter types as held in registers (int-like collapsed to int).
    pub fn parameter_frame_types(&self) -> TypeList {
        TypeList::new(self.parameter_types.iter().map(Type::frame_type).collect())
    }

    /// Prototype with an extra leading parameter, used to model the
    /// receiver of an instance method.
    pub fn with_first_parameter(&self, param: Type) -> Prototype {
        let descriptor = format!("({}{}", param.descriptor(), &self.descriptor[1..]);
        Prototype {
            descriptor,
            return_type: self.return_type.clone(),
            parameter_types: self.parameter_types.with_first(param),
        }
    }
}

impl fmt::Display for Prototype {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.descriptor)
    }
}

fn is_valid_class_name(name: &str) -> bool {
    if name.starts_with('/') || name.ends_with('/') || name.contains("//") {
        return false;
    }
    !name.contains(['[', '.', '(', ')'])
}

pub(crate) fn parse_type(input: &str) -> IResult<&str, Type> {
    // Array
    let b: IResult<&str, &str> = tag("[").parse(input);
    if let Ok((o, _)) = b {
        let (o, t) = parse_type(o)?;
        return Ok((o, Type::Array(Box::new(t))));
    }

    // Object
    let l: IResult<&str, &str> = tag("L").parse(input);
    if let Ok((o, _)) = l {
        let (o, name) = verify(take_while1(|c| c != ';'), |s: &str| is_valid_class_name(s))
            .parse(o)?;
        let (o, _) = char(';')(o)?;
        return Ok((o, Type::Object(Cow::Owned(name.to_string()))));
    }

    // Primitive
    let (o, c) = one_of("ZBCSIJFDV")(input)?;
    let t = match c {
        'Z' => Type::Boolean,
        'B' => Type::Byte,
        'C' => Type::Char,
        'S' => Type::Short,
        'I' => Type::Int,
        'J' => Type::Long,
        'F' => Type::Float,
        'D' => Type::Double,
        _ => Type::Void,
    };
    Ok((o, t))
}

pub(crate) fn parse_prototype(input: &str) -> IResult<&str, (Vec<Type>, Type)> {
    let (o, params) = delimited(char('('), many0(parse_type), char(')')).parse(input)?;
    let (o, return_type) = parse_type(o)?;
    Ok((o, (params, return_type)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_descriptors() {
        assert_eq!(Type::from_descriptor("I").unwrap(), Type::Int);
        assert_eq!(Type::from_descriptor("Ljava/lang/Object;").unwrap(), Type::OBJECT);
        assert_eq!(
            Type::from_descriptor("[[Z").unwrap(),
            Type::Boolean.array_type().array_type()
        );
        assert_eq!(Type::from_return_descriptor("V").unwrap(), Type::Void);
    }

    #[test]
    fn rejects_bad_descriptors() {
        for bad in ["", "V", "[V", "Ljava/lang/Object", "Lfoo//bar;", "L/foo;", "Ljava.lang.Object;", "II", "Q"] {
            assert!(Type::from_descriptor(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn class_names() {
        assert_eq!(Type::from_class_name("java/lang/String").unwrap(), Type::STRING);
        assert_eq!(Type::from_class_name("[I").unwrap(), Type::Int.array_type());
        assert_eq!(Type::STRING.class_name().unwrap(), "java/lang/String");
        assert!(Type::Int.class_name().is_err());
        assert_eq!(Type::STRING.to_human(), "java.lang.String");
        assert_eq!(Type::Int.array_type().to_human(), "int[]");
    }

    #[test]
    fn frame_types_and_categories() {
        for t in [Type::Boolean, Type::Byte, Type::Char, Type::Short, Type::Int] {
            assert_eq!(t.basic_frame_type(), BasicType::Int);
            assert_eq!(t.frame_type(), Type::Int);
        }
        assert_eq!(Type::Long.category(), 2);
        assert_eq!(Type::Double.category(), 2);
        assert_eq!(Type::Float.category(), 1);
        assert_eq!(Type::OBJECT.category(), 1);
        assert_eq!(Type::KnownNull.basic_frame_type(), BasicType::Object);
        assert_eq!(Type::ReturnAddress.basic_type(), BasicType::Addr);
        assert_eq!(Type::Char.basic_type(), BasicType::Char);
    }

    #[test]
    fn prototypes() {
        let p = Prototype::from_descriptor("(ZJ[Ljava/lang/String;)I").unwrap();
        assert_eq!(p.return_type(), &Type::Int);
        assert_eq!(p.parameter_types().len(), 3);
        assert_eq!(p.parameter_frame_types(), TypeList::of(&[Type::Int, Type::Long, Type::STRING.array_type()]));
        let with_this = p.with_first_parameter(Type::OBJECT);
        assert_eq!(with_this.descriptor(), "(Ljava/lang/Object;ZJ[Ljava/lang/String;)I");
        assert_eq!(with_this.parameter_types().word_count(), 5);
        assert!(Prototype::from_descriptor("(V)V").is_err());
        assert!(Prototype::from_descriptor("()").is_err());
        assert!(Prototype::from_descriptor("(I)VX").is_err());
    }

    #[test]
    fn type_list_rendering() {
        let l = TypeList::of(&[Type::Int, Type::STRING]);
        assert_eq!(l.to_string(), "{I, Ljava/lang/String;}");
        assert_eq!(l.to_human(), "int, java.lang.String");
        assert_eq!(TypeList::empty().to_human(), "<empty>");
        assert_eq!(l.with_added_type(Type::Long).word_count(), 4);
    }
}
