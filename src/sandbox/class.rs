//! Classes of the sandbox runtime, and the builder used to define them.

use crate::bridge::kind::TypeKind;
use crate::sandbox::access_flags::*;
use crate::sandbox::native::NativeMethod;
use crate::sandbox::runtime::Runtime;
use crate::sandbox::sig;
use crate::sandbox::value::{ObjId, Throw, Val};

/// Identifies a loaded class.
pub type ClassId = usize;

/// What kind of type a class object stands for.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// An ordinary class or interface.
    Plain,
    /// One of the nine primitive types, `void` included.
    Primitive(TypeKind),
    /// An array with the given component type.
    Array(sig::Type),
}

/// A loaded class.
#[derive(Debug)]
pub struct Class {
    /// The binary name with slashes; array classes are named by their descriptor.
    pub name: String,
    /// `None` for `java/lang/Object`, interfaces and primitive types.
    pub superclass: Option<ClassId>,
    pub interfaces: Vec<ClassId>,
    pub flags: u16,
    pub shape: Shape,
    /// Indices into the runtime's method table, in declaration order.
    pub methods: Vec<usize>,
    /// Indices into the runtime's field table, in declaration order.
    pub fields: Vec<usize>,
}

impl Class {
    pub fn is_interface(&self) -> bool {
        is_set(self.flags, ACC_INTERFACE)
    }

    pub fn is_abstract(&self) -> bool {
        is_set(self.flags, ACC_ABSTRACT)
    }

    pub fn is_primitive(&self) -> bool {
        match self.shape {
            Shape::Primitive(_) => true,
            _ => false,
        }
    }

    /// The name as `Class.getName()` reports it.
    pub fn java_name(&self) -> String {
        self.name.replace('/', ".")
    }
}

/// A method, constructor or static initializer in the runtime's method table.
#[derive(Debug)]
pub struct MethodInfo {
    pub class: ClassId,
    pub name: String,
    pub descriptor: String,
    pub sig: sig::Method,
    pub flags: u16,
    /// `None` for abstract methods.
    pub body: Option<NativeMethod>,
}

impl MethodInfo {
    pub fn is_static(&self) -> bool {
        is_set(self.flags, ACC_STATIC)
    }

    pub fn is_public(&self) -> bool {
        is_set(self.flags, ACC_PUBLIC)
    }

    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }

    pub fn return_kind(&self) -> TypeKind {
        self.sig.ret.as_ref().map_or(TypeKind::Void, sig::Type::kind)
    }
}

/// A field in the runtime's field table. Static fields keep their value here.
#[derive(Debug)]
pub struct FieldInfo {
    pub class: ClassId,
    pub name: String,
    pub ty: sig::Type,
    pub flags: u16,
    pub value: Val,
}

impl FieldInfo {
    pub fn is_static(&self) -> bool {
        is_set(self.flags, ACC_STATIC)
    }

    pub fn is_public(&self) -> bool {
        is_set(self.flags, ACC_PUBLIC)
    }
}

pub(crate) struct MethodDef {
    pub name: String,
    pub descriptor: String,
    pub flags: u16,
    pub body: Option<NativeMethod>,
}

pub(crate) struct FieldDef {
    pub name: String,
    pub descriptor: String,
    pub flags: u16,
    pub value: Option<Val>,
}

/// The definition of a class, built up member by member and loaded with `Sandbox::define`.
///
/// Method bodies are closures over the runtime; they receive the receiver (`None` for static
/// methods) and the arguments, and either return a value or throw.
///
/// ```
/// use jvm_bridge::sandbox::{ClassDef, Val};
///
/// let counter = ClassDef::new("demo/Counter")
///     .static_field("count", "I", Val::Int(0))
///     .static_method("bump", "()I", |rt, _, _| {
///         let count = rt.get_static("demo/Counter", "count").as_int().unwrap_or(0) + 1;
///         rt.put_static("demo/Counter", "count", Val::Int(count));
///         Ok(Val::Int(count))
///     });
/// ```
pub struct ClassDef {
    pub(crate) name: String,
    pub(crate) superclass: Option<String>,
    pub(crate) interfaces: Vec<String>,
    pub(crate) flags: u16,
    pub(crate) shape: Shape,
    pub(crate) methods: Vec<MethodDef>,
    pub(crate) fields: Vec<FieldDef>,
}

impl ClassDef {
    /// A public class extending `java/lang/Object`.
    pub fn new(name: &str) -> ClassDef {
        let superclass = if name == "java/lang/Object" {
            None
        } else {
            Some(String::from("java/lang/Object"))
        };
        ClassDef {
            name: String::from(name),
            superclass: superclass,
            interfaces: vec![],
            flags: ACC_PUBLIC,
            shape: Shape::Plain,
            methods: vec![],
            fields: vec![],
        }
    }

    pub(crate) fn primitive(kind: TypeKind, name: &str) -> ClassDef {
        ClassDef {
            name: String::from(name),
            superclass: None,
            interfaces: vec![],
            flags: ACC_PUBLIC | ACC_FINAL | ACC_ABSTRACT,
            shape: Shape::Primitive(kind),
            methods: vec![],
            fields: vec![],
        }
    }

    pub fn extends(mut self, superclass: &str) -> ClassDef {
        self.superclass = Some(String::from(superclass));
        self
    }

    pub fn implements(mut self, interface: &str) -> ClassDef {
        self.interfaces.push(String::from(interface));
        self
    }

    pub fn interface(mut self) -> ClassDef {
        self.flags |= ACC_INTERFACE | ACC_ABSTRACT;
        self.superclass = None;
        self
    }

    pub fn abstract_class(mut self) -> ClassDef {
        self.flags |= ACC_ABSTRACT;
        self
    }

    pub fn final_class(mut self) -> ClassDef {
        self.flags |= ACC_FINAL;
        self
    }

    fn member(mut self, flags: u16, name: &str, descriptor: &str, body: Option<NativeMethod>)
              -> ClassDef {
        self.methods.push(MethodDef {
            name: String::from(name),
            descriptor: String::from(descriptor),
            flags: flags,
            body: body,
        });
        self
    }

    /// A public constructor. The receiver is the newly allocated object; a body may instead
    /// return a different object, which then becomes the result of the construction.
    pub fn constructor<F>(self, descriptor: &str, body: F) -> ClassDef
        where F: Fn(&mut Runtime, Option<ObjId>, &[Val]) -> Result<Val, Throw> + 'static
    {
        self.member(ACC_PUBLIC, "<init>", descriptor, Some(NativeMethod::new(body)))
    }

    pub fn method<F>(self, name: &str, descriptor: &str, body: F) -> ClassDef
        where F: Fn(&mut Runtime, Option<ObjId>, &[Val]) -> Result<Val, Throw> + 'static
    {
        self.member(ACC_PUBLIC, name, descriptor, Some(NativeMethod::new(body)))
    }

    pub fn private_method<F>(self, name: &str, descriptor: &str, body: F) -> ClassDef
        where F: Fn(&mut Runtime, Option<ObjId>, &[Val]) -> Result<Val, Throw> + 'static
    {
        self.member(ACC_PRIVATE, name, descriptor, Some(NativeMethod::new(body)))
    }

    pub fn static_method<F>(self, name: &str, descriptor: &str, body: F) -> ClassDef
        where F: Fn(&mut Runtime, Option<ObjId>, &[Val]) -> Result<Val, Throw> + 'static
    {
        self.member(ACC_PUBLIC | ACC_STATIC, name, descriptor, Some(NativeMethod::new(body)))
    }

    pub fn abstract_method(self, name: &str, descriptor: &str) -> ClassDef {
        self.member(ACC_PUBLIC | ACC_ABSTRACT, name, descriptor, None)
    }

    /// Code run once, right after the class is loaded.
    pub fn initializer<F>(self, body: F) -> ClassDef
        where F: Fn(&mut Runtime, Option<ObjId>, &[Val]) -> Result<Val, Throw> + 'static
    {
        self.member(ACC_STATIC, "<clinit>", "()V", Some(NativeMethod::new(body)))
    }

    fn field_with(mut self, flags: u16, name: &str, descriptor: &str, value: Option<Val>)
                  -> ClassDef {
        self.fields.push(FieldDef {
            name: String::from(name),
            descriptor: String::from(descriptor),
            flags: flags,
            value: value,
        });
        self
    }

    /// A public instance field.
    pub fn field(self, name: &str, descriptor: &str) -> ClassDef {
        self.field_with(ACC_PUBLIC, name, descriptor, None)
    }

    pub fn private_field(self, name: &str, descriptor: &str) -> ClassDef {
        self.field_with(ACC_PRIVATE, name, descriptor, None)
    }

    pub fn static_field(self, name: &str, descriptor: &str, value: Val) -> ClassDef {
        self.field_with(ACC_PUBLIC | ACC_STATIC, name, descriptor, Some(value))
    }

    /// A `public static final` field.
    pub fn constant(self, name: &str, descriptor: &str, value: Val) -> ClassDef {
        self.field_with(ACC_PUBLIC | ACC_STATIC | ACC_FINAL, name, descriptor, Some(value))
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
