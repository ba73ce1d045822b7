//! Classification of reflected types into the ten kinds the call interface distinguishes.

use std::fmt;

use crate::bridge::Context;
use crate::env::Ref;
use crate::error::{Error, Result};

/// The semantic kind of a Java type: one of the nine primitive types, or a reference.
///
/// `Object` covers every reference type, arrays and `java.lang.String` included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Void,
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Object,
}

impl TypeKind {
    /// The nine kinds that have a canonical primitive class object.
    pub const PRIMITIVES: [TypeKind; 9] = [
        TypeKind::Void,
        TypeKind::Boolean,
        TypeKind::Byte,
        TypeKind::Char,
        TypeKind::Short,
        TypeKind::Int,
        TypeKind::Long,
        TypeKind::Float,
        TypeKind::Double,
    ];

    /// The class whose static `TYPE` field holds this kind's primitive class object.
    pub fn boxed_class_name(self) -> Option<&'static str> {
        match self {
            TypeKind::Void => Some("java/lang/Void"),
            TypeKind::Boolean => Some("java/lang/Boolean"),
            TypeKind::Byte => Some("java/lang/Byte"),
            TypeKind::Char => Some("java/lang/Character"),
            TypeKind::Short => Some("java/lang/Short"),
            TypeKind::Int => Some("java/lang/Integer"),
            TypeKind::Long => Some("java/lang/Long"),
            TypeKind::Float => Some("java/lang/Float"),
            TypeKind::Double => Some("java/lang/Double"),
            TypeKind::Object => None,
        }
    }

    pub fn is_primitive(self) -> bool {
        self != TypeKind::Object
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            TypeKind::Void => "void",
            TypeKind::Boolean => "boolean",
            TypeKind::Byte => "byte",
            TypeKind::Char => "char",
            TypeKind::Short => "short",
            TypeKind::Int => "int",
            TypeKind::Long => "long",
            TypeKind::Float => "float",
            TypeKind::Double => "double",
            TypeKind::Object => "object",
        };
        f.write_str(name)
    }
}

/// Maps type handles to kinds by identity with the canonical primitive class objects.
///
/// Only `Context::new` builds one, after the runtime has started, so classification can never
/// run before the canonical handles are known.
pub struct Classifier {
    primitives: Vec<(TypeKind, Ref)>,
}

impl Classifier {
    pub(crate) fn new(primitives: Vec<(TypeKind, Ref)>) -> Classifier {
        Classifier { primitives: primitives }
    }

    /// Total and pure: anything that is not one of the nine primitive classes is `Object`.
    pub fn classify(&self, ty: &Ref) -> TypeKind {
        self.primitives.iter()
            .find(|&&(_, ref canonical)| ty.same_object(canonical))
            .map_or(TypeKind::Object, |&(kind, _)| kind)
    }

    /// The canonical class object of a primitive kind.
    pub fn primitive_class(&self, kind: TypeKind) -> Option<&Ref> {
        self.primitives.iter().find(|&&(k, _)| k == kind).map(|&(_, ref class)| class)
    }
}

/// A retained type handle together with its classification.
///
/// The kind is cached here because classification is a pure function of the handle.
#[derive(Debug)]
pub struct TypeRef {
    handle: Ref,
    kind: TypeKind,
    is_string: bool,
}

impl TypeRef {
    /// Classifies `ty` and keeps a retained reference to it.
    pub fn new(ctx: &Context, ty: &Ref) -> Result<TypeRef> {
        let kind = ctx.classify(ty);
        let is_string = kind == TypeKind::Object && ty.same_object(ctx.string_class());
        let handle = ty.retain().ok_or(Error::ReferenceExhausted)?;
        Ok(TypeRef {
            handle: handle,
            kind: kind,
            is_string: is_string,
        })
    }

    pub fn handle(&self) -> &Ref {
        &self.handle
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Whether this is exactly `java.lang.String`.
    pub fn is_string(&self) -> bool {
        self.is_string
    }
}
