//! Values on the host side of the bridge.

use std::fmt;

use crate::wrapper::{JavaClass, JavaInstance};

/// A dynamically-typed host value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// A wrapped managed object.
    Instance(JavaInstance),
    /// A wrapped managed class.
    Class(JavaClass),
}

/// The shape of a `Value`, used to index the conversion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    None,
    Bool,
    Int,
    Float,
    Text,
    Instance,
    Class,
}

impl ValueKind {
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match *self {
            Value::None => ValueKind::None,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Text(_) => ValueKind::Text,
            Value::Instance(_) => ValueKind::Instance,
            Value::Class(_) => ValueKind::Class,
        }
    }

    /// Reads a command-line literal: `null`, `true`, `false`, an integer, a float, or else text.
    pub fn parse_literal(literal: &str) -> Value {
        match literal {
            "null" => Value::None,
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => {
                if let Ok(i) = literal.parse::<i64>() {
                    Value::Int(i)
                } else if let Ok(f) = literal.parse::<f64>() {
                    Value::Float(f)
                } else {
                    Value::Text(String::from(literal))
                }
            },
        }
    }

    pub fn is_none(&self) -> bool {
        *self == Value::None
    }

    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Value::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match *self {
            Value::Float(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match *self {
            Value::Text(ref s) => Some(s),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&JavaInstance> {
        match *self {
            Value::Instance(ref instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&JavaClass> {
        match *self {
            Value::Class(ref class) => Some(class),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Value {
        Value::Int(i as i64)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Value {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Value {
        Value::Float(f)
    }
}

impl<'a> From<&'a str> for Value {
    fn from(s: &'a str) -> Value {
        Value::Text(String::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::Text(s)
    }
}

impl From<JavaInstance> for Value {
    fn from(instance: JavaInstance) -> Value {
        Value::Instance(instance)
    }
}

impl From<JavaClass> for Value {
    fn from(class: JavaClass) -> Value {
        Value::Class(class)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Value::None => write!(f, "None"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Text(ref s) => write!(f, "{:?}", s),
            Value::Instance(ref instance) => write!(f, "<{} instance>", instance.class_name()),
            Value::Class(ref class) => write!(f, "<class {}>", class.name()),
        }
    }
}
