//! Internal representations of Java values.

use crate::bridge::kind::TypeKind;

/// Identifies an object in the sandbox heap. Objects are never collected.
pub type ObjId = usize;

/// A value in the sandbox runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Val {
    /// The result of a `void` method.
    Void,
    Boolean(bool),
    Byte(i8),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// A reference, `None` being `null`.
    Ref(Option<ObjId>),
}

impl Val {
    pub const NULL: Val = Val::Ref(None);

    pub fn zero(kind: TypeKind) -> Val {
        match kind {
            TypeKind::Void => Val::Void,
            TypeKind::Boolean => Val::Boolean(false),
            TypeKind::Byte => Val::Byte(0),
            TypeKind::Char => Val::Char(0),
            TypeKind::Short => Val::Short(0),
            TypeKind::Int => Val::Int(0),
            TypeKind::Long => Val::Long(0),
            TypeKind::Float => Val::Float(0.0),
            TypeKind::Double => Val::Double(0.0),
            TypeKind::Object => Val::NULL,
        }
    }

    pub fn kind(&self) -> TypeKind {
        match *self {
            Val::Void => TypeKind::Void,
            Val::Boolean(_) => TypeKind::Boolean,
            Val::Byte(_) => TypeKind::Byte,
            Val::Char(_) => TypeKind::Char,
            Val::Short(_) => TypeKind::Short,
            Val::Int(_) => TypeKind::Int,
            Val::Long(_) => TypeKind::Long,
            Val::Float(_) => TypeKind::Float,
            Val::Double(_) => TypeKind::Double,
            Val::Ref(_) => TypeKind::Object,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match *self {
            Val::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match *self {
            Val::Long(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match *self {
            Val::Double(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<ObjId> {
        match *self {
            Val::Ref(object) => object,
            _ => None,
        }
    }
}

/// A thrown exception, carrying the throwable object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throw(pub ObjId);
