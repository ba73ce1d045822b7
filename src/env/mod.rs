//! The native call interface driven by the bridge.
//!
//! `Env` is a JNI-shaped set of primitives. Two implementations exist: `jni::JniEnv`, which talks
//! to a real JVM, and `sandbox::Sandbox`, an in-process runtime used for testing. Every method
//! that can throw leaves the exception pending, exactly as JNI does; callers must take it with
//! `take_exception` before making any other call.

mod handle;
#[cfg(feature = "jvm")]
pub mod jni;

use std::fmt;
use std::num::NonZeroUsize;

use crate::bridge::kind::TypeKind;

pub use self::handle::{Ownership, Ref};

/// An opaque, non-null reference to an object in the managed runtime.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(NonZeroUsize);

impl Handle {
    pub fn new(raw: usize) -> Option<Handle> {
        NonZeroUsize::new(raw).map(Handle)
    }

    pub fn as_raw(self) -> usize {
        self.0.get()
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Handle({:#x})", self.0.get())
    }
}

/// Identifies a method or constructor for the typed call primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId(NonZeroUsize);

impl MethodId {
    pub fn new(raw: usize) -> Option<MethodId> {
        NonZeroUsize::new(raw).map(MethodId)
    }

    pub fn as_raw(self) -> usize {
        self.0.get()
    }
}

/// Identifies a field for the typed field primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(NonZeroUsize);

impl FieldId {
    pub fn new(raw: usize) -> Option<FieldId> {
        NonZeroUsize::new(raw).map(FieldId)
    }

    pub fn as_raw(self) -> usize {
        self.0.get()
    }
}

/// A value in its native representation, as passed to and returned from the call primitives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NativeValue {
    /// The result of a `void` call.
    Void,
    Boolean(bool),
    Byte(i8),
    /// A UTF-16 code unit.
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// A reference, `None` being `null`.
    Object(Option<Handle>),
}

impl NativeValue {
    pub fn kind(&self) -> TypeKind {
        match *self {
            NativeValue::Void => TypeKind::Void,
            NativeValue::Boolean(_) => TypeKind::Boolean,
            NativeValue::Byte(_) => TypeKind::Byte,
            NativeValue::Char(_) => TypeKind::Char,
            NativeValue::Short(_) => TypeKind::Short,
            NativeValue::Int(_) => TypeKind::Int,
            NativeValue::Long(_) => TypeKind::Long,
            NativeValue::Float(_) => TypeKind::Float,
            NativeValue::Double(_) => TypeKind::Double,
            NativeValue::Object(_) => TypeKind::Object,
        }
    }

    /// The all-zero value of a kind, which is what a call returns when it throws.
    pub fn zero(kind: TypeKind) -> NativeValue {
        match kind {
            TypeKind::Void => NativeValue::Void,
            TypeKind::Boolean => NativeValue::Boolean(false),
            TypeKind::Byte => NativeValue::Byte(0),
            TypeKind::Char => NativeValue::Char(0),
            TypeKind::Short => NativeValue::Short(0),
            TypeKind::Int => NativeValue::Int(0),
            TypeKind::Long => NativeValue::Long(0),
            TypeKind::Float => NativeValue::Float(0.0),
            TypeKind::Double => NativeValue::Double(0.0),
            TypeKind::Object => NativeValue::Object(None),
        }
    }

    pub fn into_object(self) -> Option<Handle> {
        match self {
            NativeValue::Object(handle) => handle,
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match *self {
            NativeValue::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            NativeValue::Boolean(b) => Some(b),
            _ => None,
        }
    }
}

/// The primitives of the native call interface.
///
/// Handles returned by these methods are local references owned by the caller, who must release
/// them with `delete_local_ref` (the `Ref` guard does this on drop).
pub trait Env {
    /// Looks up a class by its binary name with slashes, e.g. `java/lang/String` or `[I`.
    fn find_class(&self, name: &str) -> Option<Handle>;
    fn get_object_class(&self, object: Handle) -> Handle;
    /// Whether an object of class `sub` can be assigned to a variable of class `sup`.
    fn is_assignable_from(&self, sub: Handle, sup: Handle) -> bool;
    fn is_same_object(&self, a: Option<Handle>, b: Option<Handle>) -> bool;

    fn get_method_id(&self, class: Handle, name: &str, descriptor: &str) -> Option<MethodId>;
    fn get_static_method_id(&self, class: Handle, name: &str, descriptor: &str)
        -> Option<MethodId>;
    fn get_static_field_id(&self, class: Handle, name: &str, descriptor: &str) -> Option<FieldId>;
    /// Converts a `java.lang.reflect.Method` or `Constructor` object to a method id.
    fn from_reflected_method(&self, method: Handle) -> Option<MethodId>;
    /// Converts a `java.lang.reflect.Field` object to a field id.
    fn from_reflected_field(&self, field: Handle) -> Option<FieldId>;

    /// Calls an instance method through the call shape selected by `ret`.
    fn call_method(&self, object: Handle, method: MethodId, ret: TypeKind, args: &[NativeValue])
        -> NativeValue;
    /// Calls a static method through the call shape selected by `ret`.
    fn call_static_method(&self, class: Handle, method: MethodId, ret: TypeKind,
                          args: &[NativeValue]) -> NativeValue;
    fn new_object(&self, class: Handle, constructor: MethodId, args: &[NativeValue])
        -> Option<Handle>;

    fn get_field(&self, object: Handle, field: FieldId, kind: TypeKind) -> NativeValue;
    fn set_field(&self, object: Handle, field: FieldId, value: NativeValue);
    fn get_static_field(&self, class: Handle, field: FieldId, kind: TypeKind) -> NativeValue;
    fn set_static_field(&self, class: Handle, field: FieldId, value: NativeValue);

    fn array_length(&self, array: Handle) -> usize;
    fn object_array_element(&self, array: Handle, index: usize) -> Option<Handle>;
    fn new_byte_array(&self, bytes: &[u8]) -> Option<Handle>;
    fn byte_array_contents(&self, array: Handle) -> Vec<u8>;

    fn new_global_ref(&self, object: Handle) -> Option<Handle>;
    fn delete_global_ref(&self, object: Handle);
    fn delete_local_ref(&self, object: Handle);

    /// Returns the pending exception, if any, and clears it.
    fn take_exception(&self) -> Option<Handle>;
}
