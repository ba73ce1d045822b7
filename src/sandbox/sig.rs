//! Parsing of JVM field and method descriptors, such as `[Ljava/lang/String;` and `(IJ)V`.

use std::fmt;

use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::take_till1;
use nom::character::complete::char;
use nom::combinator::{all_consuming, map, value};
use nom::multi::many0;
use nom::sequence::{delimited, pair, preceded};

use crate::bridge::kind::TypeKind;
use crate::sandbox::value::Val;

/// The type of a field, parameter or return value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    /// A class or interface, by binary name with slashes.
    Object(String),
    Array(Box<Type>),
}

impl Type {
    pub fn kind(&self) -> TypeKind {
        match *self {
            Type::Boolean => TypeKind::Boolean,
            Type::Byte => TypeKind::Byte,
            Type::Char => TypeKind::Char,
            Type::Short => TypeKind::Short,
            Type::Int => TypeKind::Int,
            Type::Long => TypeKind::Long,
            Type::Float => TypeKind::Float,
            Type::Double => TypeKind::Double,
            Type::Object(_) | Type::Array(_) => TypeKind::Object,
        }
    }

    /// The value a field of this type holds before it is first written.
    pub fn default_value(&self) -> Val {
        Val::zero(self.kind())
    }

    /// The name of the class object that represents this type: `int`, `java/lang/String` or
    /// `[I`.
    pub fn class_name(&self) -> String {
        match *self {
            Type::Object(ref name) => name.clone(),
            Type::Array(_) => self.to_string(),
            _ => primitive_name(self.kind()).map_or_else(String::new, String::from),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Type::Boolean => write!(f, "Z"),
            Type::Byte => write!(f, "B"),
            Type::Char => write!(f, "C"),
            Type::Short => write!(f, "S"),
            Type::Int => write!(f, "I"),
            Type::Long => write!(f, "J"),
            Type::Float => write!(f, "F"),
            Type::Double => write!(f, "D"),
            Type::Object(ref name) => write!(f, "L{};", name),
            Type::Array(ref component) => write!(f, "[{}", component),
        }
    }
}

/// The Java source name of a primitive type, which is also the name of its class object.
pub fn primitive_name(kind: TypeKind) -> Option<&'static str> {
    match kind {
        TypeKind::Void => Some("void"),
        TypeKind::Boolean => Some("boolean"),
        TypeKind::Byte => Some("byte"),
        TypeKind::Char => Some("char"),
        TypeKind::Short => Some("short"),
        TypeKind::Int => Some("int"),
        TypeKind::Long => Some("long"),
        TypeKind::Float => Some("float"),
        TypeKind::Double => Some("double"),
        TypeKind::Object => None,
    }
}

/// Parameter types and return type of a method; `None` for `void`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub params: Vec<Type>,
    pub ret: Option<Type>,
}

fn base_type(input: &str) -> IResult<&str, Type> {
    alt((
        value(Type::Boolean, char('Z')),
        value(Type::Byte, char('B')),
        value(Type::Char, char('C')),
        value(Type::Short, char('S')),
        value(Type::Int, char('I')),
        value(Type::Long, char('J')),
        value(Type::Float, char('F')),
        value(Type::Double, char('D')),
    ))(input)
}

fn object_type(input: &str) -> IResult<&str, Type> {
    map(delimited(char('L'), take_till1(|c: char| c == ';'), char(';')),
        |name: &str| Type::Object(String::from(name)))(input)
}

fn array_type(input: &str) -> IResult<&str, Type> {
    map(preceded(char('['), field_type), |component| Type::Array(Box::new(component)))(input)
}

fn field_type(input: &str) -> IResult<&str, Type> {
    alt((base_type, object_type, array_type))(input)
}

fn return_type(input: &str) -> IResult<&str, Option<Type>> {
    alt((value(None, char('V')), map(field_type, Some)))(input)
}

fn method_type(input: &str) -> IResult<&str, Method> {
    map(pair(delimited(char('('), many0(field_type), char(')')), return_type),
        |(params, ret)| Method { params: params, ret: ret })(input)
}

/// Parses a complete field descriptor.
pub fn parse_field(descriptor: &str) -> Option<Type> {
    all_consuming(field_type)(descriptor).ok().map(|(_, ty)| ty)
}

/// Parses a complete method descriptor.
pub fn parse_method(descriptor: &str) -> Option<Method> {
    all_consuming(method_type)(descriptor).ok().map(|(_, method)| method)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(name: &str) -> Type {
        Type::Object(String::from(name))
    }

    #[test]
    fn field_descriptors() {
        assert_eq!(parse_field("I"), Some(Type::Int));
        assert_eq!(parse_field("Ljava/lang/String;"), Some(object("java/lang/String")));
        assert_eq!(parse_field("[[J"),
                   Some(Type::Array(Box::new(Type::Array(Box::new(Type::Long))))));
        assert_eq!(parse_field("[Ljava/lang/Class;"),
                   Some(Type::Array(Box::new(object("java/lang/Class")))));
    }

    #[test]
    fn malformed_field_descriptors() {
        assert_eq!(parse_field(""), None);
        assert_eq!(parse_field("V"), None);
        assert_eq!(parse_field("II"), None);
        assert_eq!(parse_field("Ljava/lang/String"), None);
        assert_eq!(parse_field("L;"), None);
        assert_eq!(parse_field("["), None);
    }

    #[test]
    fn method_descriptors() {
        assert_eq!(parse_method("()V"), Some(Method { params: vec![], ret: None }));
        assert_eq!(parse_method("(IJ[BLjava/nio/charset/Charset;)Ljava/lang/String;"),
                   Some(Method {
                       params: vec![Type::Int, Type::Long, Type::Array(Box::new(Type::Byte)),
                                    object("java/nio/charset/Charset")],
                       ret: Some(object("java/lang/String")),
                   }));
        assert_eq!(parse_method("(V)V"), None);
        assert_eq!(parse_method("(I"), None);
        assert_eq!(parse_method("(I)"), None);
    }

    #[test]
    fn descriptors_print_back() {
        for descriptor in &["Z", "C", "[D", "Ljava/lang/Object;", "[[Ljava/lang/String;"] {
            assert_eq!(parse_field(descriptor).map(|ty| ty.to_string()),
                       Some(String::from(*descriptor)));
        }
    }

    #[test]
    fn class_names() {
        assert_eq!(Type::Int.class_name(), "int");
        assert_eq!(object("java/lang/String").class_name(), "java/lang/String");
        assert_eq!(Type::Array(Box::new(Type::Int)).class_name(), "[I");
    }
}
